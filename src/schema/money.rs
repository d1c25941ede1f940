use std::fmt;

use serde::de::{self, Visitor};
use serde::Deserializer;
use thiserror::Error;

/// Money is represented as integer cents to avoid floating-point precision
/// issues. For USD/EUR, 1 unit = 100 cents, so $50.00 = 5000 cents.
pub type Cents = i64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid money format")]
pub struct ParseCentsError;

/// Format cents as a human-readable decimal string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');

    let parts: Vec<&str> = input.split('.').collect();
    match parts.len() {
        1 => {
            // No decimal point, treat as whole units
            let units: i64 = parts[0].parse().map_err(|_| ParseCentsError)?;
            let cents = units.checked_mul(100).ok_or(ParseCentsError)?;
            Ok(if negative { -cents } else { cents })
        }
        2 => {
            let units: i64 = if parts[0].is_empty() {
                0
            } else {
                parts[0].parse().map_err(|_| ParseCentsError)?
            };

            // The 2-digit truncation below slices bytes; only ASCII digits
            // may reach it.
            let decimal_str = parts[1];
            if !decimal_str.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseCentsError);
            }
            let decimal_cents: i64 = match decimal_str.len() {
                0 => 0,
                1 => {
                    // Single digit like "5" means 50 cents
                    decimal_str.parse::<i64>().map_err(|_| ParseCentsError)? * 10
                }
                2 => decimal_str.parse().map_err(|_| ParseCentsError)?,
                _ => decimal_str[..2].parse().map_err(|_| ParseCentsError)?,
            };

            let cents = units
                .checked_mul(100)
                .and_then(|c| c.checked_add(decimal_cents))
                .ok_or(ParseCentsError)?;
            Ok(if negative { -cents } else { cents })
        }
        _ => Err(ParseCentsError),
    }
}

/// Serde adapter so amounts travel as decimal strings on the wire.
pub mod cents_str {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{format_cents, parse_cents, Cents};

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_cents(*cents))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cents, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_cents(&raw).map_err(Error::custom)
    }
}

/// Accepts an amount as either a JSON string or a JSON number, keeping the
/// raw text so the service can report a field-level error on bad input.
pub fn deserialize_lenient_amount<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct AmountVisitor;

    impl Visitor<'_> for AmountVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a decimal amount as a string or number")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}
