//! Dharma Player Server Client
//!
//! HTTP client for the Dharma Player server API, exposed as a
//! [`PersistenceGateway`](dharma_core::PersistenceGateway) so the player can
//! use the server exactly like a local store.
//!
//! # Features
//!
//! - **Gateway**: users, tracks, settings and progress over JSON round trips
//! - **Files**: upload, list and delete files in the server's uploads directory
//! - **Drive**: ask the server to fetch a Google Drive file
//!
//! # Example
//!
//! ```ignore
//! use dharma_core::PersistenceGateway;
//! use dharma_server_client::{RemoteGateway, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = RemoteGateway::new(ServerConfig::new("http://localhost:3000"))?;
//!
//!     let health = gateway.health().await?;
//!     println!("Server {} ({})", health.status, health.version);
//!
//!     // Stores the access token for later admin calls
//!     let user = gateway.authenticate("admin@example.com", "secret").await?;
//!     println!("Signed in as {}", user.email);
//!
//!     for track in gateway.list_tracks().await? {
//!         println!("{} - {}", track.id, track.title);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod files;
mod gateway;
mod types;

pub use client::RemoteGateway;
pub use error::{Result, ServerClientError};
pub use types::{
    AuthResponse, DriveDownloadRequest, DriveDownloadResponse, DriveFile, FileList,
    HealthResponse, ServerConfig, StoredFile, UploadedFile,
};
