/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default = "default_drive")]
    pub drive: DriveSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Built web UI served as the SPA fallback
    #[serde(default = "default_web_dir")]
    pub web_dir: PathBuf,

    /// Largest accepted upload, in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

/// Which persistence backend the server runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Local,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// JSON blob file used by the `local` backend
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,

    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: u64,

    /// Admin account ensured at startup
    #[serde(default)]
    pub bootstrap_admin_email: Option<String>,

    #[serde(default)]
    pub bootstrap_admin_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriveSettings {
    #[serde(default = "default_drive_api_base")]
    pub api_base: String,

    #[serde(default = "default_drive_timeout_secs")]
    pub timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from file and environment.
    ///
    /// `path` defaults to `config.toml` in the working directory; a missing
    /// default file is fine, a missing explicit one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables, e.g. DHARMA_AUTH__JWT_SECRET
        settings = settings.add_source(
            config::Environment::with_prefix("DHARMA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set DHARMA_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ServerError::Config("Port must be non-zero".to_string()));
        }

        if self.auth.bootstrap_admin_email.is_some() != self.auth.bootstrap_admin_password.is_some()
        {
            return Err(ServerError::Config(
                "Bootstrap admin needs both an email and a password".to_string(),
            ));
        }

        if self.drive.timeout_secs == 0 {
            return Err(ServerError::Config(
                "Drive timeout must be at least one second".to_string(),
            ));
        }

        Ok(())
    }

    /// Bootstrap admin credentials, when configured
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        match (
            self.auth.bootstrap_admin_email.as_deref(),
            self.auth.bootstrap_admin_password.as_deref(),
        ) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        }
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
        web_dir: default_web_dir(),
        max_upload_mb: default_max_upload_mb(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_web_dir() -> PathBuf {
    PathBuf::from("./dist")
}

fn default_max_upload_mb() -> usize {
    200
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        backend: StorageBackend::default(),
        database_url: default_database_url(),
        local_path: default_local_path(),
        uploads_dir: default_uploads_dir(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/database.db".to_string()
}

fn default_local_path() -> PathBuf {
    PathBuf::from("./data/local-store.json")
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        jwt_secret: String::new(),
        jwt_expiration_hours: default_jwt_expiration_hours(),
        bootstrap_admin_email: None,
        bootstrap_admin_password: None,
    }
}

fn default_jwt_expiration_hours() -> u64 {
    24
}

fn default_drive() -> DriveSettings {
    DriveSettings {
        api_base: default_drive_api_base(),
        timeout_secs: default_drive_timeout_secs(),
    }
}

fn default_drive_api_base() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_drive_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            auth: default_auth(),
            drive: default_drive(),
        }
    }
}
