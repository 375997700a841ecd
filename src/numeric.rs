// Text-to-number coercion used by every coach-editable field
use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number pattern")
});

const INFINITY: &str = "Infinity";

/// Round half toward positive infinity.
///
/// `f64::round` rounds half away from zero, which disagrees for negative
/// halves (`-2.5` becomes `-3` there, `-2` here). All derived volume figures
/// go through this function so negative coach input rounds consistently.
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Convert a rounded figure to an integer. Non-finite input becomes `0`.
pub fn round_to_i64(value: f64) -> i64 {
    let rounded = round_half_up(value);
    if rounded.is_finite() { rounded as i64 } else { 0 }
}

/// Parse the whole trimmed text as a number.
///
/// Empty text is `0`, as is anything that is not a complete finite number.
pub fn coerce_field(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Parse the longest leading decimal literal, ignoring whatever follows.
///
/// A leading `Infinity`, optionally signed, is accepted, and literals too
/// large for `f64` become infinite. Returns `None` when the text does not
/// start with a number.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    if let Some(m) = LEADING_NUMBER.find(text) {
        return m.as_str().parse::<f64>().ok();
    }
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, text.strip_prefix('+').unwrap_or(text)),
    };
    rest.starts_with(INFINITY).then_some(sign * f64::INFINITY)
}

/// Leading-number parse with `fallback` for missing or zero values.
pub fn parse_or_nonzero(text: &str, fallback: f64) -> f64 {
    match parse_leading_number(text) {
        Some(v) if v != 0.0 => v,
        _ => fallback,
    }
}

/// Render a number without a trailing `.0` for whole values.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_halves_upward() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(1.3), 1.0);
        assert_eq!(round_half_up(-1.7), -2.0);
        assert_eq!(round_to_i64(18.4 * 0.916), 17);
    }

    #[test]
    fn non_finite_rounds_to_zero() {
        assert_eq!(round_to_i64(f64::NAN), 0);
        assert_eq!(round_to_i64(f64::INFINITY), 0);
    }

    #[test]
    fn field_coercion_falls_back_to_zero() {
        assert_eq!(coerce_field("10"), 10.0);
        assert_eq!(coerce_field(" 2.5 "), 2.5);
        assert_eq!(coerce_field("-3"), -3.0);
        assert_eq!(coerce_field(""), 0.0);
        assert_eq!(coerce_field("abc"), 0.0);
        assert_eq!(coerce_field("4 sets"), 0.0);
        assert_eq!(coerce_field("inf"), 0.0);
    }

    #[test]
    fn leading_number_ignores_suffix() {
        assert_eq!(parse_leading_number("4 sets"), Some(4.0));
        assert_eq!(parse_leading_number("  2.5x"), Some(2.5));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("-2"), Some(-2.0));
        assert_eq!(parse_leading_number("1e1"), Some(10.0));
        assert_eq!(parse_leading_number("sets"), None);
        assert_eq!(parse_leading_number(""), None);
    }

    #[test]
    fn leading_number_accepts_infinity() {
        assert_eq!(parse_leading_number("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_leading_number(" -Infinity sets"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_leading_number("+Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_leading_number("1e999"), Some(f64::INFINITY));
        assert_eq!(parse_leading_number("infinity"), None);
        assert_eq!(parse_or_nonzero("Infinity", 1.0), f64::INFINITY);
    }

    #[test]
    fn zero_and_garbage_use_fallback() {
        assert_eq!(parse_or_nonzero("0", 1.0), 1.0);
        assert_eq!(parse_or_nonzero("x", 1.0), 1.0);
        assert_eq!(parse_or_nonzero("3", 1.0), 3.0);
    }

    #[test]
    fn formats_whole_numbers_without_fraction() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-1.0), "-1");
    }
}
