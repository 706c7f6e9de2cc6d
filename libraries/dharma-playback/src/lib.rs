//! Dharma Player - Playback
//!
//! Platform-agnostic player core:
//! - Ordered playback source resolution with fallback (`resolver`)
//! - Periodic, best-effort progress saving and restore (`tracker`)
//! - Explicit player state: playlist, position, volume (`state`)
//! - A `Player` tying both to a signed-in session (`player`)
//!
//! Audio output is provided by the platform through the [`MediaBackend`]
//! trait; persistence goes through any [`dharma_core::PersistenceGateway`].
//!
//! # Example
//!
//! ```rust
//! use dharma_playback::{format_time, PlayerState};
//! use dharma_core::{CreateTrack, TrackId};
//!
//! let tracks = vec![
//!     CreateTrack::new("Morning Chant", "local://morning.mp3")
//!         .into_track(TrackId::new(1), "2025-01-01T00:00:00.000Z".to_string()),
//!     CreateTrack::new("Evening Chant", "local://evening.mp3")
//!         .into_track(TrackId::new(2), "2025-01-01T00:00:00.000Z".to_string()),
//! ];
//!
//! let mut state = PlayerState::default();
//! state.load_playlist(tracks);
//!
//! // From nothing playing, "next" starts at the top
//! assert_eq!(state.next_index(), Some(0));
//! assert_eq!(format_time(125.9), "2:05");
//! ```

pub mod error;
pub mod player;
pub mod resolver;
pub mod state;
pub mod tracker;

pub use error::{PlaybackError, Result};
pub use player::Player;
pub use resolver::{
    candidate_urls, resolve, rewrite_local_url, FailedAttempt, FailureCause, MediaBackend,
    MediaError, MediaErrorKind, ProgressLookup, Resolution, ResolveError,
};
pub use state::{format_time, PlayerState};
pub use tracker::{PlaybackSnapshot, ProgressTracker, SavedProgress, DEFAULT_SAVE_INTERVAL};
