//! Domain types

mod ids;
mod progress;
mod settings;
mod track;
mod user;

pub use ids::{TrackId, UserId};
pub use progress::{validate_position, ProgressEntry, ProgressResponse, UserProgress};
pub use settings::{Settings, UpdateSettings};
pub use track::{CreateTrack, DeletedTrack, Track, UpdateTrack};
pub use user::{validate_credentials, UpdateUser, User};

use chrono::{SecondsFormat, TimeZone, Utc};

/// Current time as unix milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format unix milliseconds the way every backend reports `createdAt`
pub fn format_timestamp(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
