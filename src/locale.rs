//! Minimal `FormatProvider` stand-in (spec §4.2): locale-aware formatting of
//! interpolated numeric/boolean values at the producer call site, before the
//! resulting string is handed to [`crate::text::LogText::parse`].
//!
//! This is intentionally narrow — a full ICU-style culture database is out
//! of scope; only the detail the spec's scenarios exercise (decimal
//! separator) is implemented.

/// The culture used to format interpolated values into message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Invariant,
    DeDe,
}

impl Locale {
    const fn decimal_separator(self) -> char {
        match self {
            Locale::Invariant => '.',
            Locale::DeDe => ',',
        }
    }
}

/// Format a floating-point value the way the given culture would.
pub fn format_f64(value: f64, locale: Locale) -> String {
    let invariant = format!("{value}");
    if locale.decimal_separator() == '.' {
        invariant
    } else {
        invariant.replace('.', &locale.decimal_separator().to_string())
    }
}

/// Format a boolean the way the source's capitalized `True`/`False` does;
/// this is not culture-sensitive.
pub fn format_bool(value: bool) -> String {
    if value { "True".to_string() } else { "False".to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_uses_dot_decimal() {
        assert_eq!(format_f64(2.5, Locale::Invariant), "2.5");
    }

    #[test]
    fn de_de_uses_comma_decimal() {
        assert_eq!(format_f64(2.5, Locale::DeDe), "2,5");
    }

    #[test]
    fn bool_is_capitalized() {
        assert_eq!(format_bool(true), "True");
        assert_eq!(format_bool(false), "False");
    }
}
