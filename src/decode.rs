use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::DecodeError;
use crate::transport::RawPayload;

const WITH_FRACTION: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";
const WHOLE_SECONDS: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Decodes a whole payload; any missing or mistyped required field fails it.
/// Nesting depth is unbounded: comment threads recurse through `replies`.
pub fn decode<T: DeserializeOwned>(payload: &RawPayload) -> Result<T, DecodeError> {
    let mut de = serde_json::Deserializer::from_slice(payload.as_bytes());
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

pub fn parse_timestamp(literal: &str) -> Result<DateTime<Utc>, DecodeError> {
    let normalized = normalize_zulu(literal.trim());
    DateTime::parse_from_str(&normalized, WITH_FRACTION)
        .or_else(|_| DateTime::parse_from_str(&normalized, WHOLE_SECONDS))
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| DecodeError::Timestamp(literal.to_string()))
}

fn normalize_zulu(literal: &str) -> String {
    match literal.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        Some(head) => format!("{head}+00:00"),
        None => literal.to_string(),
    }
}

pub mod timestamp {
    use super::*;
    use serde::de::Error as _;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let literal = String::deserialize(deserializer)?;
        parse_timestamp(&literal).map_err(D::Error::custom)
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(literal) => parse_timestamp(&literal)
                    .map(Some)
                    .map_err(D::Error::custom),
                None => Ok(None),
            }
        }

        pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            match value {
                Some(value) => serializer.serialize_str(&value.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }
    }
}

pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
