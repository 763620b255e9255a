use crate::error::ParseIdError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 64-bit, time-ordered unique identifier.
///
/// Ids from one generator compare in the order they were issued. The field
/// split depends on the [`BitLayout`](crate::BitLayout) of the generator that
/// produced it; use [`BitLayout::unpack`](crate::BitLayout::unpack) or
/// [`IdGenerator::decompose`](crate::IdGenerator::decompose) to read them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId(u64);

impl SnowflakeId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for SnowflakeId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.0
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SnowflakeId").field(&self.0).finish()
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SnowflakeId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `u64::from_str` accepts a leading '+'; ids are plain digits only.
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseIdError {
                input: s.to_string(),
            });
        }
        s.parse::<u64>().map(Self).map_err(|_| ParseIdError {
            input: s.to_string(),
        })
    }
}

/// Serialized as a decimal string: JSON readers that store numbers as
/// doubles lose precision above 2^53.
impl Serialize for SnowflakeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SnowflakeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SnowflakeIdVisitor)
    }
}

struct SnowflakeIdVisitor;

impl<'de> Visitor<'de> for SnowflakeIdVisitor {
    type Value = SnowflakeId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a snowflake id as a decimal string or unsigned integer")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(SnowflakeId(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        u64::try_from(value)
            .map(SnowflakeId)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(E::custom)
    }
}

/// The decoded fields of a [`SnowflakeId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdParts {
    /// Milliseconds elapsed between the generator epoch and minting.
    pub timestamp: u64,
    pub datacenter_id: u64,
    pub worker_id: u64,
    /// Position of the id within its millisecond.
    pub sequence: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_and_parses_as_decimal() {
        let id = SnowflakeId::from_raw(1_234_567_890_123_456_789);
        assert_eq!(id.to_string(), "1234567890123456789");
        assert_eq!("1234567890123456789".parse::<SnowflakeId>(), Ok(id));
    }

    #[test]
    fn rejects_non_decimal_text() {
        for input in ["", "+12", "-1", "12a", " 12", "18446744073709551616"] {
            assert!(
                input.parse::<SnowflakeId>().is_err(),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn serializes_as_string() {
        let id = SnowflakeId::from_raw(u64::MAX);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"18446744073709551615\"");
    }

    #[test]
    fn deserializes_from_string_or_number() {
        let from_str: SnowflakeId = serde_json::from_str("\"42\"").unwrap();
        let from_num: SnowflakeId = serde_json::from_str("42").unwrap();
        assert_eq!(from_str, SnowflakeId::from_raw(42));
        assert_eq!(from_num, SnowflakeId::from_raw(42));
    }

    #[test]
    fn deserialize_rejects_negative_numbers() {
        assert!(serde_json::from_str::<SnowflakeId>("-5").is_err());
        assert!(serde_json::from_str::<SnowflakeId>("\"-5\"").is_err());
    }

    #[test]
    fn orders_like_u64() {
        let a = SnowflakeId::from(10);
        let b = SnowflakeId::from(11);
        assert!(a < b);
        assert_eq!(u64::from(b), 11);
    }
}
