// Parsing and formatting helpers.
//
// Uploaded sheets come from ad platforms and hand-edited exports, so the
// cell text is cleaned here and the rest of the crate works with typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Largest count accepted in a single cell: 2^53, the last integer an `f64`
/// cell value represents exactly.
pub const MAX_COUNT: u64 = 1 << 53;

/// Parse a currency-like cell into `f64`.
///
/// - Trims whitespace and strips a leading `$` and thousands separators.
/// - Rejects values containing letters, so `inf`/`NaN` text never sneaks in.
/// - Returns `None` for anything that cannot be parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    let s = s.strip_prefix('$').unwrap_or(s).trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a non-negative whole count no larger than [`MAX_COUNT`].
/// Spreadsheets store counts as floats, so `"12.0"` is accepted while
/// `"12.5"` and `"-1"` are not.
pub fn parse_count_safe(s: Option<&str>) -> Option<u64> {
    let v = parse_f64_safe(s)?;
    if v < 0.0 || v.fract() != 0.0 || v > MAX_COUNT as f64 {
        return None;
    }
    Some(v as u64)
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    // Drop a trailing time part: `2024-01-01T10:00:00` or `2024-01-01 10:00`.
    let day = s.split(|c: char| c == 'T' || c == ' ').next().unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

/// Round to two decimals. Non-finite values pass through unchanged.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn average(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Format with a fixed number of decimals and `en` thousands separators,
/// e.g. `1,234,567.89`. Infinite and NaN values render as `inf`, `-inf`, `NaN`.
pub fn format_number(n: f64, decimals: usize) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{:.*}", decimals, n.abs());
    // `-0.001` rounds to `0.00`, which should not keep its sign.
    let neg = n < 0.0 && s.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// `$1,234` style amount.
pub fn format_currency(n: f64, decimals: usize) -> String {
    format!("${}", format_number(n, decimals))
}

/// `2.33x` style ratio.
pub fn format_ratio(n: f64) -> String {
    format!("{}x", format_number(n, 2))
}
