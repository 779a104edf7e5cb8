//! # Decimal Wire Format
//!
//! The front-end sends and reads rupees and percentages as decimals
//! (`1299.5`, `"12.50"`, `10`). Inside the crate the same values are integer
//! hundredths: paise for money, basis points for rates. The codecs here
//! convert at the serde boundary, so no float survives deserialization.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   JSON                          Rust field                              │
//! │                                                                         │
//! │   "price": 1000          ──►    price_paise: 100_000                    │
//! │   "discount": "12.5"     ──►    discount_bps: 1_250                     │
//! │   "total_amount": 2124.0 ◄──    total_paise: 212_400                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Accepted Input
//! - JSON integers and floats (floats are rounded half-away to the hundredth)
//! - Strings holding a plain decimal with at most two fraction digits
//! - Magnitude up to `MAX_AMOUNT_PAISE` hundredths; anything larger is
//!   rejected here, before any arithmetic runs
//!
//! ## Usage
//! ```rust
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Line {
//!     #[serde(rename = "price", with = "maguva_core::decimal::rupees")]
//!     price_paise: i64,
//!     #[serde(rename = "discount", default, with = "maguva_core::decimal::percent")]
//!     discount_bps: u32,
//! }
//!
//! let line: Line = serde_json::from_str(r#"{"price": "999.50", "discount": 10}"#).unwrap();
//! assert_eq!(line.price_paise, 99_950);
//! assert_eq!(line.discount_bps, 1_000);
//! assert_eq!(
//!     serde_json::to_string(&line).unwrap(),
//!     r#"{"price":999.5,"discount":10.0}"#
//! );
//! ```

use serde::de::{self, Deserializer, Visitor};
use serde::Serializer;
use std::fmt;

use crate::MAX_AMOUNT_PAISE;

// =============================================================================
// Conversions
// =============================================================================

/// Parses a plain decimal string into hundredths.
///
/// ## Example
/// ```rust
/// use maguva_core::decimal::parse_hundredths;
///
/// assert_eq!(parse_hundredths("1299.5"), Ok(129_950));
/// assert_eq!(parse_hundredths("-0.05"), Ok(-5));
/// assert!(parse_hundredths("12.345").is_err());
/// assert!(parse_hundredths("1e3").is_err());
/// ```
pub fn parse_hundredths(text: &str) -> Result<i64, String> {
    let text = text.trim();
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(format!("'{text}' is not a decimal number"));
    }
    if fraction.len() > 2 {
        return Err(format!("'{text}' has more than two decimal places"));
    }

    let too_large = || format!("'{text}' is too large");
    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| too_large())?
    };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| too_large())? * 10,
        _ => fraction.parse().map_err(|_| too_large())?,
    };

    let magnitude = whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(too_large)?;
    within_bounds(if negative { -magnitude } else { magnitude })
}

/// Rounds a JSON float to hundredths.
pub fn hundredths_from_f64(value: f64) -> Result<i64, String> {
    if !value.is_finite() {
        return Err(format!("{value} is not a finite number"));
    }
    let scaled = (value * 100.0).round();
    if scaled.abs() > MAX_AMOUNT_PAISE as f64 {
        return Err(format!("{value} is too large"));
    }
    Ok(scaled as i64)
}

/// Hundredths as a JSON decimal, e.g. `212_400` → `2124.0`.
#[inline]
pub fn to_decimal(hundredths: i64) -> f64 {
    hundredths as f64 / 100.0
}

fn within_bounds(hundredths: i64) -> Result<i64, String> {
    if hundredths.unsigned_abs() > MAX_AMOUNT_PAISE as u64 {
        return Err(format!("{} is too large", to_decimal(hundredths)));
    }
    Ok(hundredths)
}

fn to_bps<E: de::Error>(hundredths: i64) -> Result<u32, E> {
    u32::try_from(hundredths).map_err(|_| E::custom("percentage cannot be negative"))
}

// =============================================================================
// Visitors
// =============================================================================

struct HundredthsVisitor;

impl<'de> Visitor<'de> for HundredthsVisitor {
    type Value = i64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal number or a string holding one")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
        value
            .checked_mul(100)
            .ok_or_else(|| format!("{value} is too large"))
            .and_then(within_bounds)
            .map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
        let value = i64::try_from(value).map_err(|_| E::custom(format!("{value} is too large")))?;
        self.visit_i64(value)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<i64, E> {
        hundredths_from_f64(value).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<i64, E> {
        parse_hundredths(value).map_err(E::custom)
    }
}

struct OptionalHundredthsVisitor;

impl<'de> Visitor<'de> for OptionalHundredthsVisitor {
    type Value = Option<i64>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal number, a string holding one, or null")
    }

    fn visit_none<E: de::Error>(self) -> Result<Option<i64>, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Option<i64>, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Option<i64>, D::Error> {
        deserializer.deserialize_any(HundredthsVisitor).map(Some)
    }
}

// =============================================================================
// Field Codecs
// =============================================================================

/// Rupees on the wire, paise in the field (`i64`).
pub mod rupees {
    use super::*;

    pub fn serialize<S: Serializer>(paise: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(to_decimal(*paise))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        deserializer.deserialize_any(HundredthsVisitor)
    }
}

/// Optional rupees (`Option<i64>` paise). Pair with `#[serde(default)]`.
pub mod rupees_opt {
    use super::*;

    pub fn serialize<S: Serializer>(paise: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match paise {
            Some(paise) => serializer.serialize_some(&to_decimal(*paise)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        deserializer.deserialize_option(OptionalHundredthsVisitor)
    }
}

/// Percent on the wire, basis points in the field (`u32`).
pub mod percent {
    use super::*;

    pub fn serialize<S: Serializer>(bps: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(to_decimal(i64::from(*bps)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        to_bps(deserializer.deserialize_any(HundredthsVisitor)?)
    }
}

/// Optional percent (`Option<u32>` basis points). Pair with `#[serde(default)]`.
pub mod percent_opt {
    use super::*;

    pub fn serialize<S: Serializer>(bps: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
        match bps {
            Some(bps) => serializer.serialize_some(&to_decimal(i64::from(*bps))),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u32>, D::Error> {
        deserializer
            .deserialize_option(OptionalHundredthsVisitor)?
            .map(to_bps)
            .transpose()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Priced {
        #[serde(rename = "price", with = "rupees")]
        price_paise: i64,
        #[serde(rename = "discount", default, with = "percent")]
        discount_bps: u32,
    }

    #[derive(Debug, Default, Deserialize)]
    struct Patch {
        #[serde(default, with = "rupees_opt")]
        amount: Option<i64>,
        #[serde(default, with = "percent_opt")]
        rate: Option<u32>,
    }

    fn priced(json: &str) -> Result<Priced, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_numbers_and_strings_become_hundredths() {
        let line = priced(r#"{"price": 1000, "discount": 10}"#).unwrap();
        assert_eq!(line.price_paise, 100_000);
        assert_eq!(line.discount_bps, 1_000);

        let line = priced(r#"{"price": "999.5", "discount": "12.50"}"#).unwrap();
        assert_eq!(line.price_paise, 99_950);
        assert_eq!(line.discount_bps, 1_250);

        let line = priced(r#"{"price": 1000.1}"#).unwrap();
        assert_eq!(line.price_paise, 100_010);
        assert_eq!(line.discount_bps, 0);
    }

    #[test]
    fn test_serializes_as_rupee_decimal() {
        let json = serde_json::to_value(Priced {
            price_paise: 212_400,
            discount_bps: 1_250,
        })
        .unwrap();
        assert_eq!(json["price"], 2124.0);
        assert_eq!(json["discount"], 12.5);
    }

    #[test]
    fn test_rejects_malformed_and_huge_values() {
        assert!(priced(r#"{"price": "12.345"}"#).is_err());
        assert!(priced(r#"{"price": "abc"}"#).is_err());
        assert!(priced(r#"{"price": 9223372036854775807}"#).is_err());
        assert!(priced(r#"{"price": 18446744073709551615}"#).is_err());
        assert!(priced(r#"{"price": 1e300}"#).is_err());
        assert!(priced(r#"{"price": 100, "discount": -5}"#).is_err());
        assert!(priced(r#"{"price": 100000000}"#).is_err());
        assert!(priced(r#"{"price": 99999999.99}"#).is_ok());
    }

    #[test]
    fn test_optional_fields() {
        let patch: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.amount, None);
        assert_eq!(patch.rate, None);

        let patch: Patch = serde_json::from_str(r#"{"amount": null, "rate": 25}"#).unwrap();
        assert_eq!(patch.amount, None);
        assert_eq!(patch.rate, Some(2_500));

        let patch: Patch = serde_json::from_str(r#"{"amount": "1500"}"#).unwrap();
        assert_eq!(patch.amount, Some(150_000));
    }

    #[test]
    fn test_parse_hundredths_edges() {
        assert_eq!(parse_hundredths("0"), Ok(0));
        assert_eq!(parse_hundredths(".5"), Ok(50));
        assert_eq!(parse_hundredths("+7."), Ok(700));
        assert!(parse_hundredths("").is_err());
        assert!(parse_hundredths(".").is_err());
        assert!(parse_hundredths("1,000").is_err());
    }
}
