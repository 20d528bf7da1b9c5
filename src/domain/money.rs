use std::fmt;

/// Money is represented as integer paise (hundredths of a rupee) so that the
/// fractional values typed into the allowance screen stay exact.
/// 1 rupee = 100 paise, so ₹13 = 1300 paise.
pub type Paise = i64;

/// Format paise the way amounts are shown to people: trailing zero decimals are dropped.
/// Example: 1000 -> "10", 250 -> "2.5", 1234 -> "12.34", -800 -> "-8"
pub fn format_amount(paise: Paise) -> String {
    let sign = if paise < 0 { "-" } else { "" };
    let abs = paise.unsigned_abs();
    let units = abs / 100;
    let remainder = abs % 100;
    match remainder {
        0 => format!("{}{}", sign, units),
        r if r % 10 == 0 => format!("{}{}.{}", sign, units, r / 10),
        r => format!("{}{}.{:02}", sign, units, r),
    }
}

/// Parse a decimal string into paise.
/// Example: "13" -> 1300, "2.5" -> 250, "-8" -> -800, ".75" -> 75
pub fn parse_amount(input: &str) -> Result<Paise, ParseAmountError> {
    let input = input.trim();
    let (negative, input) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let (units_str, decimal_str) = match input.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (input, ""),
    };

    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(ParseAmountError::InvalidFormat);
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !decimal_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseAmountError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| ParseAmountError::OutOfRange)?
    };

    // More than two decimals truncate
    let decimal_paise: i64 = match decimal_str.len() {
        0 => 0,
        1 => i64::from(decimal_str.as_bytes()[0] - b'0') * 10,
        _ => decimal_str[..2]
            .parse()
            .map_err(|_| ParseAmountError::InvalidFormat)?,
    };

    let paise = units
        .checked_mul(100)
        .and_then(|p| p.checked_add(decimal_paise))
        .ok_or(ParseAmountError::OutOfRange)?;
    Ok(if negative { -paise } else { paise })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    InvalidFormat,
    OutOfRange,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "empty amount"),
            ParseAmountError::InvalidFormat => write!(f, "invalid amount format"),
            ParseAmountError::OutOfRange => write!(f, "amount out of range"),
        }
    }
}

impl std::error::Error for ParseAmountError {}

/// Serde adapter for amounts carried over the command interface.
/// Accepts either a JSON number (`5`, `2.5`) or a decimal string (`"2.50"`),
/// Serializes as a JSON number: whole rupees as an integer, anything else as
/// a float, so written snapshots stay loadable as fixtures.
pub mod amount_serde {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    use super::{Paise, parse_amount};

    pub fn serialize<S: Serializer>(paise: &Paise, serializer: S) -> Result<S::Ok, S::Error> {
        if paise % 100 == 0 {
            serializer.serialize_i64(paise / 100)
        } else {
            serializer.serialize_f64(*paise as f64 / 100.0)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Paise, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl Visitor<'_> for AmountVisitor {
        type Value = Paise;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a rupee amount as a number or decimal string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Paise, E> {
            v.checked_mul(100)
                .ok_or_else(|| E::custom("amount out of range"))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Paise, E> {
            i64::try_from(v)
                .ok()
                .and_then(|v| v.checked_mul(100))
                .ok_or_else(|| E::custom("amount out of range"))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Paise, E> {
            // Round-trip through the decimal text so 0.1 becomes exactly 10 paise
            parse_amount(&v.to_string()).map_err(E::custom)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Paise, E> {
            parse_amount(v).map_err(E::custom)
        }
    }
}

/// Same as [`amount_serde`] for optional amounts.
pub mod option_amount_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Paise;

    #[derive(Deserialize)]
    struct Wrapped(#[serde(with = "super::amount_serde")] Paise);

    pub fn serialize<S: Serializer>(
        paise: &Option<Paise>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match paise {
            Some(p) => super::amount_serde::serialize(p, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Paise>, D::Error> {
        Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(p)| p))
    }
}
