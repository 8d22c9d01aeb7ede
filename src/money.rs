// Money - currency formatting and amount parsing
// Amounts are plain f64 values; formatting follows the user's monetary locale

use std::fmt;

// ============================================================================
// LOCALE PROFILES
// ============================================================================

/// Where the currency symbol sits relative to the number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    /// `$1,234.56`, `R$ 1.234,56`
    Prefix,
    /// `1.234,56 €`
    Suffix,
}

/// Currency formatting profile for one monetary locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    /// POSIX name this profile answers to (e.g. `pt_BR`)
    pub name: &'static str,
    pub symbol: &'static str,
    pub position: SymbolPosition,
    /// Space between symbol and number
    pub spaced: bool,
    pub decimal_separator: char,
    pub group_separator: char,
}

impl Locale {
    pub const EN_US: Locale = Locale {
        name: "en_US",
        symbol: "$",
        position: SymbolPosition::Prefix,
        spaced: false,
        decimal_separator: '.',
        group_separator: ',',
    };

    pub const EN_GB: Locale = Locale {
        name: "en_GB",
        symbol: "£",
        position: SymbolPosition::Prefix,
        spaced: false,
        decimal_separator: '.',
        group_separator: ',',
    };

    pub const PT_BR: Locale = Locale {
        name: "pt_BR",
        symbol: "R$",
        position: SymbolPosition::Prefix,
        spaced: true,
        decimal_separator: ',',
        group_separator: '.',
    };

    /// Euro area with `.` grouping (pt_PT, de_DE, es_ES, it_IT, nl_NL)
    pub const EURO: Locale = Locale {
        name: "de_DE",
        symbol: "€",
        position: SymbolPosition::Suffix,
        spaced: true,
        decimal_separator: ',',
        group_separator: '.',
    };

    pub const FR_FR: Locale = Locale {
        name: "fr_FR",
        symbol: "€",
        position: SymbolPosition::Suffix,
        spaced: true,
        decimal_separator: ',',
        group_separator: ' ',
    };

    /// Resolve a POSIX locale value such as `pt_BR.UTF-8` or `de_DE@euro`.
    ///
    /// Unknown names, `C` and `POSIX` fall back to [`Locale::EN_US`].
    pub fn from_env_value(value: &str) -> Locale {
        let base = value
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .trim();

        match base {
            "pt_BR" => Locale::PT_BR,
            "en_GB" => Locale::EN_GB,
            "fr_FR" => Locale::FR_FR,
            "pt_PT" | "de_DE" | "de_AT" | "es_ES" | "it_IT" | "nl_NL" => Locale {
                name: Self::static_name(base),
                ..Locale::EURO
            },
            _ => Locale::EN_US,
        }
    }

    /// Resolve the monetary locale the way libc does: `LC_ALL`, then
    /// `LC_MONETARY`, then `LANG`. Empty values are skipped.
    pub fn from_lookup<F>(lookup: F) -> Locale
    where
        F: Fn(&str) -> Option<String>,
    {
        ["LC_ALL", "LC_MONETARY", "LANG"]
            .into_iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.trim().is_empty())
            .map(|value| Locale::from_env_value(&value))
            .unwrap_or(Locale::EN_US)
    }

    fn static_name(base: &str) -> &'static str {
        match base {
            "pt_PT" => "pt_PT",
            "de_AT" => "de_AT",
            "es_ES" => "es_ES",
            "it_IT" => "it_IT",
            "nl_NL" => "nl_NL",
            _ => "de_DE",
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::EN_US
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Format `amount` as grouped currency text with two decimals.
///
/// ```
/// use pocket_ledger::money::{format_currency, Locale};
///
/// assert_eq!(format_currency(1234.5, &Locale::EN_US), "$1,234.50");
/// assert_eq!(format_currency(-600.0, &Locale::PT_BR), "-R$ 600,00");
/// ```
pub fn format_currency(amount: f64, locale: &Locale) -> String {
    // Round through the decimal text so large amounts keep every digit
    let rounded = format!("{:.2}", amount.abs());
    let (units, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let sign = if amount < 0.0 && !is_zero_text(&rounded) { "-" } else { "" };

    let number = format!(
        "{}{}{}",
        group_digits(units, locale.group_separator),
        locale.decimal_separator,
        fraction
    );
    let gap = if locale.spaced { " " } else { "" };

    match locale.position {
        SymbolPosition::Prefix => format!("{sign}{}{gap}{number}", locale.symbol),
        SymbolPosition::Suffix => format!("{sign}{number}{gap}{}", locale.symbol),
    }
}

/// True when `amount` is below zero once rounded to cents, i.e. when
/// [`format_currency`] would print a minus sign.
pub fn is_negative_in_cents(amount: f64) -> bool {
    amount < 0.0 && !is_zero_text(&format!("{:.2}", amount.abs()))
}

fn is_zero_text(text: &str) -> bool {
    text.bytes().all(|b| matches!(b, b'0' | b'.'))
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }

    grouped
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse user-typed amount text. A comma is accepted as the decimal
/// separator by substitution, so `"10,50"` and `"10.50"` are equal.
///
/// Returns `None` unless the result is a finite number strictly above zero.
pub fn parse_amount(text: &str) -> Option<f64> {
    let normalized = text.replace(',', ".");
    let normalized = normalized.trim();

    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_en_us() {
        assert_eq!(format_currency(0.0, &Locale::EN_US), "$0.00");
        assert_eq!(format_currency(12.3, &Locale::EN_US), "$12.30");
        assert_eq!(format_currency(1000.0, &Locale::EN_US), "$1,000.00");
        assert_eq!(format_currency(1234567.891, &Locale::EN_US), "$1,234,567.89");
        assert_eq!(format_currency(-45.99, &Locale::EN_US), "-$45.99");
    }

    #[test]
    fn test_format_pt_br() {
        assert_eq!(format_currency(1000.0, &Locale::PT_BR), "R$ 1.000,00");
        assert_eq!(format_currency(10.5, &Locale::PT_BR), "R$ 10,50");
        assert_eq!(format_currency(-600.0, &Locale::PT_BR), "-R$ 600,00");
    }

    #[test]
    fn test_format_suffix_locales() {
        assert_eq!(format_currency(1234.56, &Locale::EURO), "1.234,56 €");
        assert_eq!(format_currency(1234.56, &Locale::FR_FR), "1 234,56 €");
        assert_eq!(format_currency(-3.0, &Locale::EURO), "-3,00 €");
    }

    #[test]
    fn test_format_rounds_half_cents() {
        assert_eq!(format_currency(0.126, &Locale::EN_US), "$0.13");
        assert_eq!(format_currency(0.124, &Locale::EN_US), "$0.12");
        assert_eq!(format_currency(-0.001, &Locale::EN_US), "$0.00");
    }

    #[test]
    fn test_format_keeps_digits_of_huge_amounts() {
        let amount = parse_amount("1e20").unwrap();
        assert_eq!(
            format_currency(amount, &Locale::EN_US),
            "$100,000,000,000,000,000,000.00"
        );
        assert_eq!(
            format_currency(-amount, &Locale::PT_BR),
            "-R$ 100.000.000.000.000.000.000,00"
        );
    }

    #[test]
    fn test_negative_in_cents_matches_sign_shown() {
        assert!(is_negative_in_cents(-0.01));
        assert!(!is_negative_in_cents(-0.001));
        assert!(!is_negative_in_cents(0.0));
        assert!(!is_negative_in_cents(12.0));
    }

    #[test]
    fn test_locale_from_env_value() {
        assert_eq!(Locale::from_env_value("pt_BR.UTF-8"), Locale::PT_BR);
        assert_eq!(Locale::from_env_value("en_GB.utf8"), Locale::EN_GB);
        assert_eq!(Locale::from_env_value("fr_FR"), Locale::FR_FR);
        assert_eq!(Locale::from_env_value("C"), Locale::EN_US);
        assert_eq!(Locale::from_env_value("POSIX"), Locale::EN_US);

        let german = Locale::from_env_value("de_DE@euro");
        assert_eq!(german.symbol, "€");
        assert_eq!(german.name, "de_DE");
        assert_eq!(Locale::from_env_value("es_ES.UTF-8").name, "es_ES");
    }

    #[test]
    fn test_locale_lookup_precedence() {
        let env = |key: &str| match key {
            "LC_ALL" => Some(String::new()),
            "LC_MONETARY" => Some("pt_BR.UTF-8".to_string()),
            "LANG" => Some("en_GB.UTF-8".to_string()),
            _ => None,
        };
        assert_eq!(Locale::from_lookup(env), Locale::PT_BR);

        let lang_only = |key: &str| (key == "LANG").then(|| "fr_FR.UTF-8".to_string());
        assert_eq!(Locale::from_lookup(lang_only), Locale::FR_FR);

        assert_eq!(Locale::from_lookup(|_| None), Locale::EN_US);
    }

    #[test]
    fn test_parse_amount_accepts_comma_and_dot() {
        assert_eq!(parse_amount("10,50"), Some(10.5));
        assert_eq!(parse_amount("10.50"), Some(10.5));
        assert_eq!(parse_amount("  7 "), Some(7.0));
    }

    #[test]
    fn test_parse_amount_rejects_non_positive_and_garbage() {
        for text in ["0", "-5", "abc", "", "   ", "0,00", "inf", "NaN", "1.234,56"] {
            assert_eq!(parse_amount(text), None, "{text:?} should be rejected");
        }
    }
}
