/// Startup wiring: gateway selection, bootstrap admin and application state
use crate::{
    config::{ServerConfig, StorageBackend, StorageSettings},
    error::{Result, ServerError},
    services::{AuthService, DriveService, FileStorage},
    state::AppState,
};
use dharma_core::{DharmaError, PersistenceGateway, UpdateUser};
use dharma_storage::{LocalGateway, SqliteGateway};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Open the persistence backend selected by `storage.backend`
pub async fn open_gateway(storage: &StorageSettings) -> Result<Arc<dyn PersistenceGateway>> {
    match storage.backend {
        StorageBackend::Sqlite => {
            if let Some(parent) = sqlite_file_path(&storage.database_url)
                .as_deref()
                .and_then(|p| p.parent())
            {
                tokio::fs::create_dir_all(parent).await?;
            }
            let gateway = SqliteGateway::connect(&storage.database_url).await?;
            tracing::info!(url = %storage.database_url, "SQLite database connected");
            Ok(Arc::new(gateway))
        }
        StorageBackend::Local => {
            let gateway = LocalGateway::open(&storage.local_path).await?;
            tracing::info!(path = %storage.local_path.display(), "Local store opened");
            Ok(Arc::new(gateway))
        }
    }
}

/// File behind a `sqlite:` URL, `None` for in-memory databases
fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);

    if path.is_empty() || path.contains(":memory:") {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Make sure the configured bootstrap admin exists and is an admin.
///
/// An existing account with that email is promoted, its password is left alone.
pub async fn ensure_bootstrap_admin(
    gateway: &dyn PersistenceGateway,
    email: &str,
    password: &str,
) -> Result<()> {
    let user = match gateway.register(email, password).await {
        Ok(user) => {
            tracing::info!(user = %user.id, "Bootstrap admin created");
            user
        }
        Err(DharmaError::Duplicate(_)) => {
            let users = gateway.list_users().await?;
            let Some(user) = users.into_iter().find(|u| u.email == email) else {
                return Err(ServerError::Internal(format!(
                    "Bootstrap admin {email} reported as duplicate but not found"
                )));
            };
            user
        }
        Err(e) => return Err(e.into()),
    };

    if !user.is_admin {
        gateway
            .update_user(
                user.id,
                UpdateUser {
                    is_admin: Some(true),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(user = %user.id, "Bootstrap admin promoted");
    }

    Ok(())
}

/// Build all services for `config`
pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let gateway = open_gateway(&config.storage).await?;

    if let Some((email, password)) = config.bootstrap_admin() {
        ensure_bootstrap_admin(gateway.as_ref(), email, password).await?;
    }

    let file_storage = FileStorage::new(config.storage.uploads_dir.clone());
    file_storage.initialize().await?;
    tracing::info!(path = %config.storage.uploads_dir.display(), "File storage initialized");

    let auth_service = AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
    );

    let drive = DriveService::new(
        config.drive.api_base.clone(),
        Duration::from_secs(config.drive.timeout_secs),
    )?;

    Ok(AppState::new(
        gateway,
        Arc::new(auth_service),
        Arc::new(file_storage),
        Arc::new(drive),
    ))
}
