// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod dashboard; // Adaptateur ratatui : applique la vue aux widgets
pub mod events;    // Gestion des événements clavier
pub mod view;      // Vue déclarative (sans dépendance au terminal)

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
pub use view::{build_view, DashboardView, RowView};
