//! Listening progress types

use super::ids::{TrackId, UserId};
use crate::error::{DharmaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One saved playback position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub user_id: UserId,
    pub track_id: TrackId,
    /// Offset in seconds
    pub current_time: f64,
}

/// Response body for a single progress lookup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub current_time: f64,
}

/// All saved positions of one user, keyed by track
pub type UserProgress = BTreeMap<TrackId, f64>;

/// Positions must be finite and non-negative
pub fn validate_position(seconds: f64) -> Result<()> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(DharmaError::invalid_input(format!(
            "Progress must be a non-negative number of seconds, got {seconds}"
        )));
    }
    Ok(())
}
