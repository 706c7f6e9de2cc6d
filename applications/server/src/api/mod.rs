/// API route modules
pub mod drive;
pub mod files;
pub mod health;
pub mod progress;
pub mod settings;
pub mod tracks;
pub mod users;
