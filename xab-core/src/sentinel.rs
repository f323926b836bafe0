//! Serde adapter writing `None` as `-1`, the convention used by experiment
//! data files for "no response".

use serde::{Deserialize, Deserializer, Serializer};

use crate::key::KeyCode;

pub trait SentinelValue: Sized {
    fn to_i64(&self) -> i64;
    fn from_i64(v: i64) -> Option<Self>;
}

impl SentinelValue for u64 {
    fn to_i64(&self) -> i64 {
        *self as i64
    }
    fn from_i64(v: i64) -> Option<Self> {
        u64::try_from(v).ok()
    }
}

impl SentinelValue for KeyCode {
    fn to_i64(&self) -> i64 {
        i64::from(*self)
    }
    fn from_i64(v: i64) -> Option<Self> {
        u32::try_from(v).ok().map(KeyCode)
    }
}

pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: SentinelValue,
    S: Serializer,
{
    serializer.serialize_i64(value.as_ref().map_or(-1, SentinelValue::to_i64))
}

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: SentinelValue,
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    if raw == -1 {
        return Ok(None);
    }
    T::from_i64(raw)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("expected -1 or a non-negative value, got {raw}")))
}
