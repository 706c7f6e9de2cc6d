/// ID types for Dharma Player entities
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::Type), sqlx(transparent))]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Track identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::Type), sqlx(transparent))]
pub struct TrackId(i64);

impl TrackId {
    /// Create a new track ID
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TrackId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}
