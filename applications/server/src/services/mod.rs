/// Business logic services
pub mod auth;
pub mod drive;
pub mod file_storage;

pub use auth::AuthService;
pub use drive::DriveService;
pub use file_storage::FileStorage;
