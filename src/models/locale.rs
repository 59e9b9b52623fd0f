// ============================================================================
// Enum : Locale
// ============================================================================
// Conventions d'écriture des montants de l'utilisateur
//
// Trois familles suffisent pour les langues courantes :
// - EnUs : "$2,000.00"   (symbole devant, virgule pour les milliers)
// - FrFr : "2 000,00 €"  (espace fine insécable, symbole derrière)
// - DeDe : "2.000,00 €"  (point pour les milliers, symbole derrière)
//
// Lue depuis LC_ALL, LC_MONETARY puis LANG (ordre POSIX), ou forcée par
// COINMELT_LOCALE. Langue inconnue ou "C" => EnUs.
// ============================================================================

use std::fmt;

/// Espace fine insécable (séparateur de milliers français)
const NARROW_NBSP: char = '\u{202f}';

/// Espace insécable entre le montant et le symbole
const NBSP: char = '\u{a0}';

/// Variables lues pour déterminer la locale, par priorité
pub const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_MONETARY", "LANG"];

/// Convention de formatage des nombres et des montants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    EnUs,
    FrFr,
    DeDe,
}

impl Locale {
    /// Interprète une étiquette de locale : "fr_FR.UTF-8", "de-CH", "en_US@euro", "C"
    ///
    /// None si la langue n'est pas reconnue.
    pub fn parse(tag: &str) -> Option<Self> {
        let language: String = tag
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase();

        match language.as_str() {
            "c" | "posix" | "en" | "ja" | "zh" | "ko" => Some(Locale::EnUs),
            "fr" => Some(Locale::FrFr),
            "de" | "es" | "it" | "nl" | "pt" | "da" => Some(Locale::DeDe),
            _ => None,
        }
    }

    /// Locale de l'environnement (première variable non vide de LOCALE_VARS)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        LOCALE_VARS
            .iter()
            .filter_map(|key| lookup(*key))
            .find(|value| !value.trim().is_empty())
            .and_then(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    /// Étiquette BCP 47 affichée dans l'en-tête
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::EnUs => "en-US",
            Locale::FrFr => "fr-FR",
            Locale::DeDe => "de-DE",
        }
    }

    pub fn group_separator(&self) -> char {
        match self {
            Locale::EnUs => ',',
            Locale::FrFr => NARROW_NBSP,
            Locale::DeDe => '.',
        }
    }

    pub fn decimal_separator(&self) -> char {
        match self {
            Locale::EnUs => '.',
            Locale::FrFr | Locale::DeDe => ',',
        }
    }

    /// Place le symbole autour du montant déjà formaté (sans signe)
    pub fn place_symbol(&self, symbol: &str, amount: &str) -> String {
        match self {
            Locale::EnUs => format!("{}{}", symbol, amount),
            Locale::FrFr | Locale::DeDe => format!("{}{}{}", amount, NBSP, symbol.trim_end()),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_posix_tags() {
        assert_eq!(Locale::parse("fr_FR.UTF-8"), Some(Locale::FrFr));
        assert_eq!(Locale::parse("de_DE@euro"), Some(Locale::DeDe));
        assert_eq!(Locale::parse("en-GB"), Some(Locale::EnUs));
        assert_eq!(Locale::parse("C.UTF-8"), Some(Locale::EnUs));
        assert_eq!(Locale::parse("FR"), Some(Locale::FrFr));
        assert_eq!(Locale::parse("xx_YY"), None);
        assert_eq!(Locale::parse(""), None);
    }

    #[test]
    fn test_from_lookup_priority() {
        let env = |key: &str| match key {
            "LC_MONETARY" => Some("de_DE.UTF-8".to_string()),
            "LANG" => Some("fr_FR.UTF-8".to_string()),
            _ => None,
        };
        assert_eq!(Locale::from_lookup(env), Locale::DeDe);

        let empty_lc_all = |key: &str| match key {
            "LC_ALL" => Some(String::new()),
            "LANG" => Some("fr_FR.UTF-8".to_string()),
            _ => None,
        };
        assert_eq!(Locale::from_lookup(empty_lc_all), Locale::FrFr);

        assert_eq!(Locale::from_lookup(|_| None), Locale::EnUs);
        assert_eq!(Locale::from_lookup(|_| Some("tlh_KL".to_string())), Locale::EnUs);
    }

    #[test]
    fn test_symbol_position() {
        assert_eq!(Locale::EnUs.place_symbol("€", "2,000.00"), "€2,000.00");
        assert_eq!(Locale::FrFr.place_symbol("€", "2 000,00"), "2 000,00\u{a0}€");
        assert_eq!(Locale::DeDe.place_symbol("CHF ", "12,00"), "12,00\u{a0}CHF");
    }
}
