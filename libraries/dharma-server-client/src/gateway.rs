//! `PersistenceGateway` over the server's JSON API.

use crate::client::RemoteGateway;
use crate::types::{AuthResponse, CredentialsRequest};
use async_trait::async_trait;
use dharma_core::{
    types::{validate_position, ProgressResponse},
    CreateTrack, DeletedTrack, PersistenceGateway, Result, Settings,
    Track, TrackId, UpdateSettings, UpdateTrack, UpdateUser, User, UserId, UserProgress,
};
use reqwest::Method;
use serde_json::json;
use tracing::info;

#[async_trait]
impl PersistenceGateway for RemoteGateway {
    async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let request = self
            .request(Method::POST, "/api/users/authenticate")
            .await
            .json(&CredentialsRequest { email, password });
        let response: AuthResponse = self.send_json(request).await?;

        self.set_access_token(response.access_token).await;
        info!(user = %response.user.id, "Authenticated with server");
        Ok(response.user)
    }

    async fn register(&self, email: &str, password: &str) -> Result<User> {
        let request = self
            .request(Method::POST, "/api/users/register")
            .await
            .json(&CredentialsRequest { email, password });
        Ok(self.send_json(request).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let request = self.request(Method::GET, "/api/users").await;
        Ok(self.send_json(request).await?)
    }

    async fn update_user(&self, id: UserId, update: UpdateUser) -> Result<User> {
        let request = self
            .request(Method::PUT, &format!("/api/users/{id}"))
            .await
            .json(&update);
        Ok(self.send_json(request).await?)
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        let request = self.request(Method::DELETE, &format!("/api/users/{id}")).await;
        self.send(request).await?;
        Ok(())
    }

    async fn list_tracks(&self) -> Result<Vec<Track>> {
        let request = self.request(Method::GET, "/api/tracks").await;
        Ok(self.send_json(request).await?)
    }

    async fn create_track(&self, track: CreateTrack) -> Result<Track> {
        let request = self.request(Method::POST, "/api/tracks").await.json(&track);
        Ok(self.send_json(request).await?)
    }

    async fn update_track(&self, id: TrackId, update: UpdateTrack) -> Result<Track> {
        let request = self
            .request(Method::PUT, &format!("/api/tracks/{id}"))
            .await
            .json(&update);
        Ok(self.send_json(request).await?)
    }

    async fn delete_track(&self, id: TrackId) -> Result<DeletedTrack> {
        let request = self.request(Method::DELETE, &format!("/api/tracks/{id}")).await;
        Ok(self.send_json(request).await?)
    }

    async fn get_settings(&self) -> Result<Settings> {
        let request = self.request(Method::GET, "/api/settings").await;
        Ok(self.send_json(request).await?)
    }

    async fn update_settings(&self, update: UpdateSettings) -> Result<Settings> {
        let request = self.request(Method::PUT, "/api/settings").await.json(&update);
        Ok(self.send_json(request).await?)
    }

    async fn save_progress(&self, user_id: UserId, track_id: TrackId, seconds: f64) -> Result<()> {
        // Non-finite floats serialize as null, so reject them before they hit the wire.
        validate_position(seconds)?;
        let request = self.request(Method::POST, "/api/progress").await.json(&json!({
            "userId": user_id,
            "trackId": track_id,
            "currentTime": seconds,
        }));
        self.send(request).await?;
        Ok(())
    }

    async fn get_progress(&self, user_id: UserId, track_id: TrackId) -> Result<f64> {
        let request = self
            .request(Method::GET, &format!("/api/progress/{user_id}/{track_id}"))
            .await;
        let response: ProgressResponse = self.send_json(request).await?;
        Ok(response.current_time)
    }

    async fn get_user_progress(&self, user_id: UserId) -> Result<UserProgress> {
        let request = self
            .request(Method::GET, &format!("/api/progress/{user_id}"))
            .await;
        Ok(self.send_json(request).await?)
    }
}
