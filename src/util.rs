// Parsing and statistics helpers.
//
// Everything numeric the loader and the reports need lives here so the
// aggregation code reads as grouping logic only.
use num_format::{Locale, ToFormattedString};
use std::cmp::Ordering;

/// Parse an hours field the forgiving way.
///
/// - Trims whitespace.
/// - Only a leading run of digits, signs, `.` and exponent markers is considered,
///   so words such as `inf` or `nan` never turn into numbers.
/// - Keeps the longest prefix of that run that parses, so `"38.5h"` is `38.5`.
/// - Returns NaN when no numeric prefix exists (including the empty string).
pub fn parse_hours(s: &str) -> f64 {
    let s = s.trim();
    let numeric_len = s
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(s.len());
    let candidate = &s[..numeric_len];
    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Arithmetic mean; 0 for an empty slice so nothing downstream divides by zero.
pub fn average(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().sum();
    sum / v.len() as f64
}

/// Median of the values; the two middle values are averaged for even lengths.
///
/// Takes the `Vec` by value so it can be sorted in place. Returns 0 for an
/// empty input and NaN as soon as any value is NaN, like `average` does.
pub fn median(mut v: Vec<f64>) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    if v.iter().any(|x| x.is_nan()) {
        return f64::NAN;
    }
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        v[mid]
    } else {
        (v[mid - 1] + v[mid]) / 2.0
    }
}

/// Population variance (divides by N). 0 for an empty slice.
pub fn population_variance(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let mean = average(v);
    v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / v.len() as f64
}

/// Round to two decimals through the fixed-point text form, so the value
/// stored in a cell is exactly what a `{:.2}` rendering shows.
pub fn round2(n: f64) -> f64 {
    format!("{:.2}", n).parse().unwrap_or(n)
}

/// Descending order for ranking sorts. NaN goes after every number.
pub fn desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Fixed decimals with `en` thousands separators, e.g. `1,234.50`.
pub fn format_number(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let s = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if n.is_sign_negative() && s.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// Thousands separators for counts in console messages, e.g. `9,855 rows`.
pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hours_accepts_plain_and_prefixed_numbers() {
        assert_eq!(parse_hours("40"), 40.0);
        assert_eq!(parse_hours(" 37.5 "), 37.5);
        assert_eq!(parse_hours("38.5h"), 38.5);
        assert_eq!(parse_hours("40,5"), 40.0);
    }

    #[test]
    fn parse_hours_yields_nan_for_non_numeric() {
        assert!(parse_hours("").is_nan());
        assert!(parse_hours("abc").is_nan());
        assert!(parse_hours("h40").is_nan());
    }

    #[test]
    fn parse_hours_does_not_read_words_as_numbers() {
        assert!(parse_hours("inf").is_nan());
        assert!(parse_hours("Infinity").is_nan());
        assert!(parse_hours("-inf").is_nan());
        assert!(parse_hours("NaN").is_nan());
        assert_eq!(parse_hours("1e1"), 10.0);
        assert_eq!(parse_hours("-3.5e"), -3.5);
    }

    #[test]
    fn median_handles_odd_and_even_lengths() {
        assert_eq!(median(vec![30.0, 10.0, 20.0]), 20.0);
        assert_eq!(median(vec![20.0, 10.0]), 15.0);
        assert_eq!(median(vec![]), 0.0);
    }

    #[test]
    fn median_is_nan_when_any_value_is_nan() {
        assert!(median(vec![10.0, f64::NAN, 30.0]).is_nan());
        assert!(median(vec![f64::NAN, 10.0, 30.0]).is_nan());
        assert!(average(&[10.0, f64::NAN]).is_nan());
    }

    #[test]
    fn variance_is_population_variance() {
        assert_eq!(population_variance(&[40.0, 30.0]), 25.0);
        assert_eq!(population_variance(&[40.0, 40.0, 40.0]), 0.0);
        assert_eq!(population_variance(&[]), 0.0);
    }

    #[test]
    fn average_guards_empty_input() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[10.0, 20.0]), 15.0);
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(5.0), 5.0);
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert!(round2(f64::NAN).is_nan());
    }

    #[test]
    fn desc_puts_nan_last() {
        let mut v = vec![1.0, f64::NAN, 3.0, 2.0];
        v.sort_by(|a, b| desc(*a, *b));
        assert_eq!(&v[..3], &[3.0, 2.0, 1.0]);
        assert!(v[3].is_nan());
    }

    #[test]
    fn format_number_inserts_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 1), "-1,500.0");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(40.0, 0), "40");
        assert_eq!(format_int(9855usize), "9,855");
    }
}
