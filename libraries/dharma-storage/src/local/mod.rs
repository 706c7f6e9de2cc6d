//! Local blob backend
//!
//! Keeps the whole data set as one serialized JSON document, the way a
//! browser keeps it in `localStorage`. Every operation deserializes the blob,
//! works on it with linear scans and, for writes, serializes it back. When the
//! gateway is opened on a file the blob is written through to disk after each
//! successful write.

use crate::credentials;
use async_trait::async_trait;
use dharma_core::{
    error::{DharmaError, Result},
    gateway::PersistenceGateway,
    types::*,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Logical shape of the stored blob (same tables as the relational schema)
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocalBlob {
    #[serde(default)]
    users: Vec<StoredUser>,
    #[serde(default)]
    tracks: Vec<Track>,
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    progress: Vec<ProgressEntry>,
    #[serde(default)]
    next_user_id: i64,
    #[serde(default)]
    next_track_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredUser {
    #[serde(flatten)]
    user: User,
    password_hash: String,
}

impl LocalBlob {
    fn user_index(&self, id: UserId) -> Result<usize> {
        self.users
            .iter()
            .position(|u| u.user.id == id)
            .ok_or_else(|| DharmaError::not_found("User", id))
    }

    fn track_index(&self, id: TrackId) -> Result<usize> {
        self.tracks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| DharmaError::not_found("Track", id))
    }

    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|u| u.user.email == email && Some(u.user.id) != except)
    }
}

/// Persistence gateway over a single serialized blob
#[derive(Debug)]
pub struct LocalGateway {
    blob: Mutex<String>,
    path: Option<PathBuf>,
}

impl LocalGateway {
    /// Purely in-process store, lost on drop
    pub fn in_memory() -> Self {
        Self {
            blob: Mutex::new(String::new()),
            path: None,
        }
    }

    /// Load the blob from `path` (starting empty if the file does not exist)
    /// and write every change back to it
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let blob = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                // Reject corrupt files up front rather than on first use
                serde_json::from_str::<LocalBlob>(&contents)?;
                contents
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), "Opened local store");

        Ok(Self {
            blob: Mutex::new(blob),
            path: Some(path),
        })
    }

    /// The backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn read<T>(&self, f: impl FnOnce(&LocalBlob) -> Result<T>) -> Result<T> {
        let guard = self.blob.lock().await;
        let blob = decode(&guard)?;
        f(&blob)
    }

    async fn write<T>(&self, f: impl FnOnce(&mut LocalBlob) -> Result<T>) -> Result<T> {
        let mut guard = self.blob.lock().await;
        let mut blob = decode(&guard)?;
        let value = f(&mut blob)?;
        let encoded = serde_json::to_string(&blob)?;

        if let Some(path) = &self.path {
            persist(path, &encoded).await?;
        }
        *guard = encoded;
        Ok(value)
    }
}

fn decode(raw: &str) -> Result<LocalBlob> {
    if raw.is_empty() {
        return Ok(LocalBlob::default());
    }
    Ok(serde_json::from_str(raw)?)
}

async fn persist(path: &Path, encoded: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    // Write then rename so a crash never leaves a half-written blob
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, encoded).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn now_timestamp() -> String {
    format_timestamp(now_millis())
}

#[async_trait]
impl PersistenceGateway for LocalGateway {
    // Users
    async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        validate_credentials(email, password)?;

        let stored = self
            .read(|blob| {
                Ok(blob
                    .users
                    .iter()
                    .find(|u| u.user.email == email)
                    .cloned())
            })
            .await?
            .ok_or_else(DharmaError::bad_credentials)?;

        if !credentials::verify_password(password, &stored.password_hash)? {
            return Err(DharmaError::bad_credentials());
        }
        Ok(stored.user)
    }

    async fn register(&self, email: &str, password: &str) -> Result<User> {
        validate_credentials(email, password)?;
        let password_hash = credentials::hash_password(password)?;

        self.write(|blob| {
            if blob.email_taken(email, None) {
                return Err(DharmaError::Duplicate(format!(
                    "Email already registered: {email}"
                )));
            }

            blob.next_user_id += 1;
            let user = User {
                id: UserId::new(blob.next_user_id),
                email: email.to_string(),
                is_admin: false,
                created_at: now_timestamp(),
            };
            blob.users.push(StoredUser {
                user: user.clone(),
                password_hash,
            });
            Ok(user)
        })
        .await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.read(|blob| Ok(blob.users.iter().map(|u| u.user.clone()).collect()))
            .await
    }

    async fn update_user(&self, id: UserId, update: UpdateUser) -> Result<User> {
        update.validate()?;
        let password_hash = update
            .password
            .as_deref()
            .map(credentials::hash_password)
            .transpose()?;

        self.write(|blob| {
            let index = blob.user_index(id)?;
            if let Some(email) = update.email.as_deref() {
                if blob.email_taken(email, Some(id)) {
                    return Err(DharmaError::Duplicate(format!(
                        "Email already registered: {email}"
                    )));
                }
            }

            let stored = &mut blob.users[index];
            if let Some(email) = update.email {
                stored.user.email = email;
            }
            if let Some(hash) = password_hash {
                stored.password_hash = hash;
            }
            if let Some(is_admin) = update.is_admin {
                stored.user.is_admin = is_admin;
            }
            Ok(stored.user.clone())
        })
        .await
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        self.write(|blob| {
            let index = blob.user_index(id)?;
            blob.users.remove(index);
            Ok(())
        })
        .await
    }

    // Tracks
    async fn list_tracks(&self) -> Result<Vec<Track>> {
        self.read(|blob| {
            let mut tracks = blob.tracks.clone();
            tracks.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            });
            Ok(tracks)
        })
        .await
    }

    async fn create_track(&self, track: CreateTrack) -> Result<Track> {
        track.validate()?;

        self.write(|blob| {
            blob.next_track_id += 1;
            let track = track.into_track(TrackId::new(blob.next_track_id), now_timestamp());
            blob.tracks.push(track.clone());
            Ok(track)
        })
        .await
    }

    async fn update_track(&self, id: TrackId, update: UpdateTrack) -> Result<Track> {
        update.validate()?;

        self.write(|blob| {
            let index = blob.track_index(id)?;
            let track = &mut blob.tracks[index];
            track.apply(update);
            Ok(track.clone())
        })
        .await
    }

    async fn delete_track(&self, id: TrackId) -> Result<DeletedTrack> {
        self.write(|blob| {
            let index = blob.track_index(id)?;
            let track = blob.tracks.remove(index);
            Ok(DeletedTrack {
                url: track.url,
                thumbnail: track.thumbnail,
            })
        })
        .await
    }

    // Settings
    async fn get_settings(&self) -> Result<Settings> {
        self.read(|blob| Ok(blob.settings.clone())).await
    }

    async fn update_settings(&self, update: UpdateSettings) -> Result<Settings> {
        self.write(|blob| {
            blob.settings.apply(update);
            Ok(blob.settings.clone())
        })
        .await
    }

    // Progress
    async fn save_progress(&self, user_id: UserId, track_id: TrackId, seconds: f64) -> Result<()> {
        validate_position(seconds)?;

        self.write(|blob| {
            match blob
                .progress
                .iter_mut()
                .find(|p| p.user_id == user_id && p.track_id == track_id)
            {
                Some(entry) => entry.current_time = seconds,
                None => blob.progress.push(ProgressEntry {
                    user_id,
                    track_id,
                    current_time: seconds,
                }),
            }
            Ok(())
        })
        .await
    }

    async fn get_progress(&self, user_id: UserId, track_id: TrackId) -> Result<f64> {
        self.read(|blob| {
            Ok(blob
                .progress
                .iter()
                .find(|p| p.user_id == user_id && p.track_id == track_id)
                .map_or(0.0, |p| p.current_time))
        })
        .await
    }

    async fn get_user_progress(&self, user_id: UserId) -> Result<UserProgress> {
        self.read(|blob| {
            Ok(blob
                .progress
                .iter()
                .filter(|p| p.user_id == user_id)
                .map(|p| (p.track_id, p.current_time))
                .collect())
        })
        .await
    }
}
