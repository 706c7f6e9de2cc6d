//! Remote gateway behaviour against a mock server.
//!
//! Every test checks both the request the client sends and how it maps the
//! server's answer onto gateway results.

use dharma_core::{
    CreateTrack, DharmaError, PersistenceGateway, TrackId, UpdateSettings, UserId,
};
use dharma_server_client::{DriveDownloadRequest, RemoteGateway, ServerClientError, ServerConfig};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json(id: i64, email: &str, is_admin: bool) -> serde_json::Value {
    json!({
        "id": id,
        "email": email,
        "isAdmin": is_admin,
        "createdAt": "2025-01-01T00:00:00.000Z"
    })
}

fn track_json(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "artist": null,
        "url": format!("local://{id}.mp3"),
        "alternativeUrls": [],
        "thumbnail": null,
        "duration": 0.0,
        "fileSize": null,
        "fileType": null,
        "createdAt": "2025-01-01T00:00:00.000Z"
    })
}

async fn gateway(server: &MockServer) -> RemoteGateway {
    RemoteGateway::new(ServerConfig::new(server.uri())).expect("valid url")
}

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    #[test]
    fn test_empty_url_rejected() {
        match RemoteGateway::new(ServerConfig::new("")) {
            Err(ServerClientError::InvalidUrl(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected InvalidUrl error"),
        }
    }

    #[test]
    fn test_token_from_config() {
        let client = RemoteGateway::new(ServerConfig::with_token("http://localhost:3000", "abc"))
            .unwrap();
        let token = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(client.access_token());
        assert_eq!(token.as_deref(), Some("abc"));
    }
}

// =============================================================================
// Users
// =============================================================================

mod users {
    use super::*;

    #[tokio::test]
    async fn test_authenticate_stores_token_for_later_calls() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/users/authenticate"))
            .and(body_json(json!({"email": "admin@example.com", "password": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": user_json(1, "admin@example.com", true),
                "accessToken": "jwt-token"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/users"))
            .and(header("authorization", "Bearer jwt-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                user_json(1, "admin@example.com", true),
                user_json(2, "monk@example.com", false)
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = gateway(&server).await;
        let user = client
            .authenticate("admin@example.com", "secret")
            .await
            .unwrap();
        assert!(user.is_admin);
        assert!(client.is_authenticated().await);

        let users = client.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].email, "monk@example.com");
    }

    #[tokio::test]
    async fn test_wrong_password_is_auth_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/users/authenticate"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"error": "Invalid email or password"})),
            )
            .mount(&server)
            .await;

        let client = gateway(&server).await;
        let err = client.authenticate("a@example.com", "bad").await.unwrap_err();

        match err {
            DharmaError::AuthFailed(msg) => assert_eq!(msg, "Invalid email or password"),
            other => panic!("Expected AuthFailed, got {other:?}"),
        }
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_duplicate_register_is_duplicate() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/users/register"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({"error": "Email already registered"})),
            )
            .mount(&server)
            .await;

        let err = gateway(&server)
            .await
            .register("a@example.com", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, DharmaError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_non_admin_gets_permission_denied() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/users/3"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"error": "Admin access required"})),
            )
            .mount(&server)
            .await;

        let err = gateway(&server)
            .await
            .delete_user(UserId::new(3))
            .await
            .unwrap_err();
        assert!(matches!(err, DharmaError::PermissionDenied(_)));
    }
}

// =============================================================================
// Tracks
// =============================================================================

mod tracks {
    use super::*;

    #[tokio::test]
    async fn test_list_and_create_tracks() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tracks"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([track_json(2, "Second"), track_json(1, "First")])),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/tracks"))
            .respond_with(ResponseTemplate::new(201).set_body_json(track_json(3, "Third")))
            .expect(1)
            .mount(&server)
            .await;

        let client = gateway(&server).await;
        let tracks = client.list_tracks().await.unwrap();
        assert_eq!(tracks[0].id, TrackId::new(2));

        let created = client
            .create_track(CreateTrack::new("Third", "local://3.mp3"))
            .await
            .unwrap();
        assert_eq!(created.title, "Third");
    }

    #[tokio::test]
    async fn test_delete_missing_track_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/tracks/99"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "Track not found: 99"})),
            )
            .mount(&server)
            .await;

        let err = gateway(&server)
            .await
            .delete_track(TrackId::new(99))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

// =============================================================================
// Settings & progress
// =============================================================================

mod settings_and_progress {
    use super::*;

    #[tokio::test]
    async fn test_partial_settings_update_sends_only_given_fields() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/settings"))
            .and(body_json(json!({"appName": "Evening Chants"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "appName": "Evening Chants",
                "primaryColor": "#ffd700",
                "secondaryColor": "#1a1a2e"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let settings = gateway(&server)
            .await
            .update_settings(UpdateSettings {
                app_name: Some("Evening Chants".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(settings.primary_color, "#ffd700");
    }

    #[tokio::test]
    async fn test_progress_round_trip() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/progress"))
            .and(body_json(json!({"userId": 1, "trackId": 5, "currentTime": 42.5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/progress/1/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"currentTime": 42.5})))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/progress/1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"5": 42.5, "7": 10.0})),
            )
            .mount(&server)
            .await;

        let client = gateway(&server).await;
        client
            .save_progress(UserId::new(1), TrackId::new(5), 42.5)
            .await
            .unwrap();
        assert_eq!(
            client
                .get_progress(UserId::new(1), TrackId::new(5))
                .await
                .unwrap(),
            42.5
        );

        let all = client.get_user_progress(UserId::new(1)).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[&TrackId::new(7)], 10.0);
    }

    #[tokio::test]
    async fn test_save_progress_rejects_non_finite_without_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(0)
            .mount(&server)
            .await;

        let client = gateway(&server).await;
        for seconds in [f64::NAN, f64::INFINITY, -3.0] {
            let result = client
                .save_progress(UserId::new(1), TrackId::new(5), seconds)
                .await;
            assert!(
                matches!(result, Err(DharmaError::InvalidInput(_))),
                "{seconds} should be rejected locally, got {result:?}"
            );
        }
    }
}

// =============================================================================
// Files & Drive proxy
// =============================================================================

mod files {
    use super::*;

    #[tokio::test]
    async fn test_upload_file_sends_multipart() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("chant.mp3");
        std::fs::write(&file_path, b"ID3 fake audio").unwrap();

        Mock::given(method("POST"))
            .and(path("/api/upload-file"))
            .and(header_exists("content-type"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fileName": "chant_1700000000000.mp3",
                "originalName": "chant.mp3",
                "fileSize": 14,
                "fileType": "audio/mpeg",
                "fileUrl": "/uploads/chant_1700000000000.mp3"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let uploaded = gateway(&server).await.upload_file(&file_path).await.unwrap();
        assert_eq!(uploaded.original_name, "chant.mp3");
        assert_eq!(uploaded.file_url, "/uploads/chant_1700000000000.mp3");
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let server = MockServer::start().await;
        let err = gateway(&server)
            .await
            .upload_file(std::path::Path::new("/definitely/not/here.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerClientError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_drive_error_details_surface() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/download-from-drive"))
            .respond_with(ResponseTemplate::new(502).set_body_json(json!({
                "error": "Failed to download from Google Drive",
                "details": "Drive API error: 403 - check the file is shared"
            })))
            .mount(&server)
            .await;

        let err = gateway(&server)
            .await
            .download_from_drive(&DriveDownloadRequest {
                file_id: "abc".to_string(),
                file_name: "talk.mp3".to_string(),
                api_key: "key".to_string(),
            })
            .await
            .unwrap_err();

        match err {
            ServerClientError::ServerError { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("Drive API error: 403"));
            }
            other => panic!("Expected ServerError, got {other:?}"),
        }
    }
}

// =============================================================================
// Transport failures
// =============================================================================

mod transport {
    use super::*;

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/settings"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = RemoteGateway::new(
            ServerConfig::new(server.uri()).timeout(Duration::from_millis(200)),
        )
        .unwrap();

        let err = client.get_settings().await.unwrap_err();
        assert!(matches!(err, DharmaError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Nothing listens on port 9 locally
        let client = RemoteGateway::new(ServerConfig::new("http://127.0.0.1:9")).unwrap();

        let err = client.list_tracks().await.unwrap_err();
        assert!(matches!(err, DharmaError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "message": "Server is running",
                "timestamp": "2025-01-01T00:00:00.000Z",
                "version": "0.1.0"
            })))
            .mount(&server)
            .await;

        let health = gateway(&server).await.health().await.unwrap();
        assert_eq!(health.status, "OK");
    }
}
