use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Numeric key code, as reported by keyboard events (`Q` is 81).
///
/// Deserializes from either the numeric code or a single-character string;
/// letters are case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const Q: KeyCode = KeyCode(81);
    pub const P: KeyCode = KeyCode(80);
    pub const SPACE: KeyCode = KeyCode(32);

    pub fn code(&self) -> u32 {
        self.0
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='z' => Some(Self(c.to_ascii_uppercase() as u32)),
            'A'..='Z' | '0'..='9' | ' ' => Some(Self(c as u32)),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("space") {
            return Ok(Self::SPACE);
        }
        if let Ok(code) = trimmed.parse::<u32>() {
            if trimmed.len() > 1 {
                return Ok(Self(code));
            }
        }
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c).ok_or_else(|| ConfigError::InvalidKey(s.into())),
            _ => Err(ConfigError::InvalidKey(s.into())),
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            32 => f.write_str("Space"),
            c @ (48..=57 | 65..=90) => write!(f, "{}", c as u8 as char),
            c => write!(f, "key {c}"),
        }
    }
}

impl From<KeyCode> for i64 {
    fn from(key: KeyCode) -> i64 {
        key.0 as i64
    }
}

impl Serialize for KeyCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for KeyCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(u32),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Code(code) => Ok(KeyCode(code)),
            Repr::Name(name) => KeyCode::parse(&name).map_err(serde::de::Error::custom),
        }
    }
}
