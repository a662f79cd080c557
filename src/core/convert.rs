//! Amount parsing, conversion and display formatting.

use crate::core::currency::RateTable;
use num_format::{Locale, ToFormattedString};

/// Parses a user-entered amount leniently.
///
/// Everything except digits and `.` is discarded, then the longest leading
/// decimal number is read. Input with no usable number parses to `0.0`.
pub fn parse_amount(input: &str) -> f64 {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut seen_dot = false;
    let end = cleaned
        .char_indices()
        .find(|(_, c)| {
            if *c == '.' {
                if seen_dot {
                    return true;
                }
                seen_dot = true;
            }
            false
        })
        .map_or(cleaned.len(), |(i, _)| i);

    cleaned[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Converts `amount` into `target` using a rate table for the base currency.
///
/// Returns `None` when the table has no entry for `target`, which also covers
/// a table that has not been loaded yet, and when the product overflows.
pub fn convert(amount: f64, rates: &RateTable, target: &str) -> Option<f64> {
    rates
        .get(target)
        .filter(|rate| rate.is_finite())
        .map(|rate| amount * rate)
        .filter(|value| value.is_finite())
}

/// Prefix used when displaying amounts in `code`, following en-US
/// conventions. `None` means the code itself is shown, e.g. `CHF 100.00`.
fn display_symbol(code: &str) -> Option<&'static str> {
    let symbol = match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "CNY" => "CN¥",
        "INR" => "₹",
        "KRW" => "₩",
        "AUD" => "A$",
        "CAD" => "CA$",
        "NZD" => "NZ$",
        "HKD" => "HK$",
        "MXN" => "MX$",
        "BRL" => "R$",
        "TWD" => "NT$",
        "ILS" => "₪",
        "VND" => "₫",
        "PHP" => "₱",
        "XCD" => "EC$",
        "XAF" => "FCFA",
        "XOF" => "F\u{202f}CFA",
        "XPF" => "CFPF",
        _ => return None,
    };
    Some(symbol)
}

/// Number of minor-unit digits shown for `code`.
fn fraction_digits(code: &str) -> usize {
    match code {
        "BIF" | "CLP" | "DJF" | "GNF" | "ISK" | "JPY" | "KMF" | "KRW" | "PYG" | "RWF"
        | "UGX" | "VND" | "VUV" | "XAF" | "XOF" | "XPF" => 0,
        _ => 2,
    }
}

/// Formats a monetary value as `<symbol><grouped integer>.<fraction>`.
///
/// Zero-decimal currencies such as `JPY` drop the fraction. Currencies without
/// an en-US symbol are prefixed by their code. Non-finite values render as `-`.
pub fn format_amount(value: f64, code: &str) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let digits = fraction_digits(code);
    let fixed = format!("{:.*}", digits, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };
    let grouped = int_part
        .parse::<u128>()
        .map(|n| n.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| int_part.to_string());
    let number = match frac_part {
        Some(frac_part) => format!("{grouped}.{frac_part}"),
        None => grouped,
    };

    // A small negative keeps its sign even when it rounds to zero.
    let sign = if value.is_sign_negative() && value != 0.0 { "-" } else { "" };
    match display_symbol(code) {
        Some(symbol) => format!("{sign}{symbol}{number}"),
        None => format!("{sign}{code} {number}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(entries: &[(&str, f64)]) -> RateTable {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_parse_amount_lenient() {
        assert_eq!(parse_amount("100"), 100.0);
        assert_eq!(parse_amount("12.5"), 12.5);
        assert_eq!(parse_amount("1,000"), 1000.0);
        assert_eq!(parse_amount("12.5.3"), 12.5);
        assert_eq!(parse_amount("$ 42"), 42.0);
        assert_eq!(parse_amount(".5"), 0.5);
    }

    #[test]
    fn test_parse_amount_non_numeric_is_zero() {
        for input in ["", "abc", ".", "..", "-", "NaN", "inf", "€"] {
            assert_eq!(parse_amount(input), 0.0, "input: {input:?}");
        }
    }

    #[test]
    fn test_convert_scenario_usd_to_eur() {
        let table = rates(&[("EUR", 0.92)]);
        let converted = convert(parse_amount("100"), &table, "EUR").unwrap();
        assert!((converted - 92.0).abs() < 1e-9);
    }

    #[test]
    fn test_convert_matches_amount_times_rate() {
        let table = rates(&[("EUR", 0.92), ("JPY", 149.731), ("GBP", 0.7891)]);
        for amount in [0.0, 1.0, 3.75, 1234.5678, 1e6] {
            for (code, rate) in &table {
                let converted = convert(amount, &table, code).unwrap();
                assert!((converted - amount * rate).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_convert_missing_target_is_none() {
        let table = rates(&[("EUR", 0.92)]);
        assert_eq!(convert(100.0, &table, "XYZ"), None);
        assert_eq!(convert(100.0, &RateTable::new(), "EUR"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(100.0, "USD"), "$100.00");
        assert_eq!(format_amount(92.0, "EUR"), "€92.00");
        assert_eq!(format_amount(1234567.891, "GBP"), "£1,234,567.89");
        assert_eq!(format_amount(1000.0, "XCD"), "EC$1,000.00");
        assert_eq!(format_amount(-5.5, "USD"), "-$5.50");
    }

    #[test]
    fn test_format_amount_uses_code_without_en_symbol() {
        assert_eq!(format_amount(100.0, "CHF"), "CHF 100.00");
        assert_eq!(format_amount(2500.5, "SEK"), "SEK 2,500.50");
        assert_eq!(format_amount(-1.0, "ZAR"), "-ZAR 1.00");
    }

    #[test]
    fn test_format_amount_zero_decimal_currencies() {
        assert_eq!(format_amount(15000.0, "JPY"), "¥15,000");
        assert_eq!(format_amount(149.731, "JPY"), "¥150");
        assert_eq!(format_amount(1382.4, "KRW"), "₩1,382");
        assert_eq!(format_amount(92.0, "EUR"), "€92.00");
    }

    #[test]
    fn test_overflowing_conversion_is_none() {
        let huge = format!("1{}", "0".repeat(308));
        let amount = parse_amount(&huge);
        assert!(amount.is_finite());

        let table = rates(&[("JPY", 149.731)]);
        assert_eq!(convert(amount, &table, "JPY"), None);
        assert_eq!(format_amount(f64::INFINITY, "USD"), "-");
        assert_eq!(format_amount(f64::NAN, "USD"), "-");
    }
}
