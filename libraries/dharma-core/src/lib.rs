//! Dharma Player Core
//!
//! Platform-agnostic domain types, the persistence contract and error handling
//! shared by the server, the storage backends and the player.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `User`, `Settings`, progress entries
//! - **Core Trait**: `PersistenceGateway`, implemented by the `SQLite`, local
//!   blob and remote HTTP backends
//! - **Error Handling**: unified `DharmaError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use dharma_core::types::{CreateTrack, Settings, UpdateSettings};
//!
//! let track = CreateTrack::new("Kinh Pháp Cú", "local://kinh_phap_cu.mp3");
//! assert!(track.validate().is_ok());
//!
//! let mut settings = Settings::default();
//! settings.apply(UpdateSettings {
//!     app_name: Some("Evening Chants".to_string()),
//!     ..Default::default()
//! });
//! assert_eq!(settings.primary_color, "#ffd700");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod gateway;
pub mod types;

pub use error::{DharmaError, Result};
pub use gateway::PersistenceGateway;

pub use types::{
    CreateTrack, DeletedTrack, ProgressEntry, Settings, Track, TrackId, UpdateSettings,
    UpdateTrack, UpdateUser, User, UserId, UserProgress,
};
