//! Lenient numeric coercion for records arriving over the CRUD boundary.
//!
//! Upstream records are JSON written by forms, so amounts show up as numbers,
//! numeric strings, empty strings or `null`. None of these may fail a read:
//! anything unparseable becomes zero (or `None` for optional fields).

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

/// Parses a user-entered numeric string.
///
/// Surrounding whitespace and `,` thousands separators are ignored.
/// Returns `None` when the string does not hold a number.
///
/// # Examples
///
/// ```
/// use site_ledger::models::parse_decimal;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_decimal(" 1,250.50 "), Some(Decimal::new(125050, 2)));
/// assert_eq!(parse_decimal("abc"), None);
/// assert_eq!(parse_decimal(""), None);
/// ```
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

struct LenientDecimal;

impl<'de> Visitor<'de> for LenientDecimal {
    type Value = Option<Decimal>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Decimal::try_from(v).ok())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(parse_decimal(v))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(LenientDecimal)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

/// `deserialize_with` helper: any malformed or missing value becomes zero.
pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserializer
        .deserialize_any(LenientDecimal)?
        .unwrap_or(Decimal::ZERO))
}

/// `deserialize_with` helper for optional amounts: malformed values become `None`.
pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientDecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Amounts {
        #[serde(default, deserialize_with = "decimal")]
        amount: Decimal,
        #[serde(default, deserialize_with = "optional_decimal")]
        cap: Option<Decimal>,
    }

    fn parse(json: &str) -> Amounts {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_integer_and_string_amounts() {
        assert_eq!(parse(r#"{"amount": 450}"#).amount, Decimal::new(450, 0));
        assert_eq!(parse(r#"{"amount": "450.25"}"#).amount, Decimal::new(45025, 2));
        assert_eq!(parse(r#"{"amount": "1,000"}"#).amount, Decimal::new(1000, 0));
    }

    #[test]
    fn test_float_amount() {
        assert_eq!(parse(r#"{"amount": 0.5}"#).amount, Decimal::new(5, 1));
    }

    #[test]
    fn test_malformed_amounts_become_zero() {
        assert_eq!(parse(r#"{"amount": "twelve"}"#).amount, Decimal::ZERO);
        assert_eq!(parse(r#"{"amount": ""}"#).amount, Decimal::ZERO);
        assert_eq!(parse(r#"{"amount": null}"#).amount, Decimal::ZERO);
        assert_eq!(parse(r#"{"amount": true}"#).amount, Decimal::ZERO);
        assert_eq!(parse(r#"{"amount": [1, 2]}"#).amount, Decimal::ZERO);
        assert_eq!(parse(r#"{"amount": {"v": 1}}"#).amount, Decimal::ZERO);
        assert_eq!(parse(r#"{}"#).amount, Decimal::ZERO);
    }

    #[test]
    fn test_optional_amounts() {
        assert_eq!(parse(r#"{"cap": "12"}"#).cap, Some(Decimal::new(12, 0)));
        assert_eq!(parse(r#"{"cap": "n/a"}"#).cap, None);
        assert_eq!(parse(r#"{"cap": null}"#).cap, None);
        assert_eq!(parse(r#"{}"#).cap, None);
    }

    #[test]
    fn test_scientific_notation_string() {
        assert_eq!(parse_decimal("1e3"), Some(Decimal::new(1000, 0)));
    }
}
