//! Dharma Player Server Library
//!
//! Personal music server: user accounts, the track library,
//! listening progress, app settings, uploads and a Google Drive download proxy.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod router;
pub mod services;
pub mod startup;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{ServerConfig, StorageBackend};
pub use error::{Result, ServerError};
pub use router::create_router;
pub use services::{auth::AuthService, drive::DriveService, file_storage::FileStorage};
pub use startup::{build_state, ensure_bootstrap_admin, open_gateway};
pub use state::AppState;
