use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// SKIP classification code of a kanji, e.g. `1-3-8`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkipCode {
    pub kind: u8,
    pub first: u8,
    pub second: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipError {
    #[error("Invalid SKIP code: {0}")]
    Invalid(String),
}

impl FromStr for SkipCode {
    type Err = SkipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SkipError::Invalid(s.to_string());
        let mut parts = s.trim().split('-').map(|p| p.parse::<u8>());
        let (Some(Ok(kind)), Some(Ok(first)), Some(Ok(second)), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if !(1..=4).contains(&kind) {
            return Err(invalid());
        }
        Ok(SkipCode {
            kind,
            first,
            second,
        })
    }
}

impl fmt::Display for SkipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.kind, self.first, self.second)
    }
}
