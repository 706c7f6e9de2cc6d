/// Shared application state
use crate::services::{AuthService, DriveService, FileStorage};
use dharma_core::PersistenceGateway;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn PersistenceGateway>,
    pub auth_service: Arc<AuthService>,
    pub file_storage: Arc<FileStorage>,
    pub drive: Arc<DriveService>,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        auth_service: Arc<AuthService>,
        file_storage: Arc<FileStorage>,
        drive: Arc<DriveService>,
    ) -> Self {
        Self {
            gateway,
            auth_service,
            file_storage,
            drive,
        }
    }
}
