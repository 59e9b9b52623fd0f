// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Applique la DashboardView aux widgets ratatui
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : Block, Paragraph, Table, Clear
// 3. Layout : découpage de l'espace en zones
// 4. TableState : ligne sélectionnée surlignée
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, PricePhase, Screen};
use crate::models::Metal;
use crate::ui::view::{DashboardView, HeaderView, RowView};

/// Dessine l'interface complète
///
/// Le tableau est toujours redessiné en entier depuis app.view().
pub fn render(frame: &mut Frame, app: &App) {
    let view = app.view();
    let chunks = create_layout(frame.size());

    render_header(frame, app, &view.header, chunks[0]);
    render_table(frame, app, &view, chunks[1]);
    render_footer(frame, app, chunks[2]);

    if app.current_screen == Screen::Alert {
        render_alert(frame, app);
    }
}

/// Crée le layout principal (header, tableau, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Prix spot + mise à jour
            Constraint::Min(0),    // Tableau des pièces
            Constraint::Length(3), // Raccourcis / saisie
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header : prix spot
// ============================================================================

fn metal_color(metal: Metal) -> Color {
    match metal {
        Metal::Gold => Color::Yellow,
        Metal::Silver => Color::Gray,
    }
}

fn render_header(frame: &mut Frame, app: &App, header: &HeaderView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" CoinMelt ")
        .title_alignment(Alignment::Center);

    let label = Style::default().add_modifier(Modifier::BOLD);

    let spot_line = |metal: Metal, per_ozt: &str, per_gram: &str| {
        Line::from(vec![
            Span::styled(format!("{:<7}", metal.label()), label.fg(metal_color(metal))),
            Span::raw(format!("{:>14} / oz t   {:>12} / g", per_ozt, per_gram)),
        ])
    };

    let status = if app.is_loading_data() {
        Span::styled(
            app.loading_message.clone().unwrap_or_default(),
            Style::default().fg(Color::Yellow),
        )
    } else if app.price_phase() == PricePhase::AwaitingPrices {
        Span::styled("Waiting for spot prices", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw("")
    };

    let text = vec![
        spot_line(Metal::Gold, &header.gold.per_ozt, &header.gold.per_gram),
        spot_line(Metal::Silver, &header.silver.per_ozt, &header.silver.per_gram),
        Line::from(vec![
            Span::styled("Updated ", label),
            Span::raw(format!("{}   ", header.last_updated)),
            Span::styled("Currency ", label),
            Span::raw(format!("{} ({})   ", header.currency, header.locale)),
            Span::styled("Filter ", label),
            Span::raw(format!("{}   ", header.filter.label())),
            status,
        ]),
    ];

    frame.render_widget(Paragraph::new(text).block(block), area);
}

// ============================================================================
// Tableau des pièces
// ============================================================================

fn render_table(frame: &mut Frame, app: &App, view: &DashboardView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Holdings ");

    if view.rows.is_empty() {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No coins to show", Style::default().fg(Color::Gray))),
        ])
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(["Name", "Metal", "Fine g", "Qty", "Melt"].map(|title| {
        Cell::from(title).style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    }))
    .bottom_margin(1);

    let rows: Vec<Row> = view
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| table_row(app, index, row))
        .collect();

    let widths = [
        Constraint::Min(24),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD));

    let mut state = TableState::default();
    state.select(Some(app.selected_index));
    frame.render_stateful_widget(table, area, &mut state);
}

fn table_row<'a>(app: &App, index: usize, row: &'a RowView) -> Row<'a> {
    // La ligne en cours d'édition montre le buffer avec un curseur
    let qty = if app.is_editing() && index == app.selected_index {
        format!("{}█", app.input_buffer)
    } else {
        row.qty.to_string()
    };

    let melt_style = if row.priced {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    Row::new(vec![
        Cell::from(row.name.as_str()),
        Cell::from(row.metal.label()).style(Style::default().fg(metal_color(row.metal))),
        Cell::from(Line::from(row.fine_grams.as_str()).alignment(Alignment::Right)),
        Cell::from(Line::from(qty).alignment(Alignment::Right)),
        Cell::from(Line::from(row.melt.as_str()).alignment(Alignment::Right)).style(melt_style),
    ])
}

// ============================================================================
// Footer : raccourcis
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let (line, border) = if app.is_editing() {
        (
            Line::from(vec![
                Span::styled("Quantity: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::raw(format!("{}  ", app.input_buffer)),
                key("[0-9 ⌫]"),
                Span::raw(" Edit  "),
                key("[Enter/ESC]"),
                Span::raw(" Done"),
            ]),
            Color::Green,
        )
    } else if app.is_awaiting_quit_confirmation() {
        (
            Line::from(vec![
                Span::styled("⚠  Press ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::styled(
                    "[q]",
                    Style::default()
                        .fg(Color::Red)
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::SLOW_BLINK),
                ),
                Span::styled(
                    " again to quit, any other key to cancel ⚠",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
            ]),
            Color::Cyan,
        )
    } else {
        (
            Line::from(vec![
                key("[q]"),
                Span::raw(" Quit  "),
                key("[↑↓ / j k]"),
                Span::raw(" Select  "),
                key("[e]"),
                Span::raw(" Qty  "),
                key("[r]"),
                Span::raw(" Refresh  "),
                key("[c/C]"),
                Span::raw(" Currency  "),
                key("[f]"),
                Span::raw(" Filter"),
            ]),
            Color::Cyan,
        )
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let paragraph = Paragraph::new(vec![line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Alerte bloquante
// ============================================================================

fn render_alert(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 7, frame.size());
    let message = app.alert_message.clone().unwrap_or_default();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error ")
        .title_alignment(Alignment::Center);

    let text = vec![
        Line::from(Span::styled(message, Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" OK"),
        ]),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

/// Rectangle centré : largeur en pourcentage, hauteur en lignes
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x.min(100)) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SpotQuotes;
    use crate::models::{Coin, Currency, Locale};
    use crate::storage::{MemoryStore, QuantityStore};
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn app() -> App {
        let coins = vec![Coin::new("Krugerrand", Metal::Gold, 31.1035)];
        App::new(coins, QuantityStore::new(Box::new(MemoryStore::new())), Currency::Usd, Locale::EnUs)
    }

    #[test]
    fn test_centered_rect_fits() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(60, 7, area);
        assert_eq!(rect.width, 60);
        assert_eq!(rect.height, 7);
        assert_eq!(rect.x, 20);
    }

    #[test]
    fn test_render_priced_table() {
        let mut app = app();
        app.apply_quotes(SpotQuotes { gold_ozt: 2000.0, silver_ozt: 25.0 }, chrono::Local::now());

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Krugerrand"));
        assert!(text.contains("$2,000.00"));
        assert!(text.contains("31.104"));
    }

    #[test]
    fn test_render_alert() {
        let mut app = app();
        app.show_alert("Gold price refresh failed".to_string());

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        assert!(buffer_text(&terminal).contains("Gold price refresh failed"));
    }
}
