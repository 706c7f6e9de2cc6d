//! Behaviour every persistence backend must share.
//!
//! Each scenario is written once against `&dyn PersistenceGateway` and run
//! against both the SQLite and the local blob backend.


use dharma_core::{
    CreateTrack, DharmaError, PersistenceGateway, TrackId, UpdateSettings, UpdateTrack,
    UpdateUser, UserId,
};
use test_helpers::{TestBlob, TestDb};

macro_rules! for_each_backend {
    ($($scenario:ident),* $(,)?) => {
        mod sqlite {
            use super::*;
            $(
                #[tokio::test]
                async fn $scenario() {
                    let db = TestDb::new().await;
                    super::$scenario(&db.gateway).await;
                }
            )*
        }

        mod local {
            use super::*;
            $(
                #[tokio::test]
                async fn $scenario() {
                    let blob = TestBlob::new().await;
                    super::$scenario(&blob.gateway).await;
                }
            )*
        }
    };
}

for_each_backend!(
    register_then_authenticate,
    duplicate_email_rejected_and_count_unchanged,
    authenticate_failures_are_indistinguishable,
    empty_credentials_are_bad_input,
    update_user_fields,
    update_user_to_taken_email_is_duplicate,
    delete_missing_user_is_not_found,
    tracks_listed_newest_first,
    update_track_keeps_unspecified_fields,
    update_missing_track_is_not_found,
    delete_track_returns_file_references,
    delete_missing_track_is_not_found,
    invalid_track_rejected,
    settings_default_then_partial_update,
    progress_defaults_to_zero,
    progress_last_write_wins,
    progress_is_per_user_and_track,
    negative_progress_rejected,
    ids_are_not_reused_after_delete,
);

async fn register_then_authenticate(gateway: &dyn PersistenceGateway) {
    let user = gateway.register("monk@example.com", "lotus").await.unwrap();
    assert_eq!(user.id, UserId::new(1));
    assert_eq!(user.email, "monk@example.com");
    assert!(!user.is_admin);

    let authed = gateway.authenticate("monk@example.com", "lotus").await.unwrap();
    assert_eq!(authed, user);
}

async fn duplicate_email_rejected_and_count_unchanged(gateway: &dyn PersistenceGateway) {
    gateway.register("dup@example.com", "first").await.unwrap();
    let before = gateway.list_users().await.unwrap().len();

    let err = gateway.register("dup@example.com", "second").await.unwrap_err();
    assert!(matches!(err, DharmaError::Duplicate(_)), "got {err:?}");

    assert_eq!(gateway.list_users().await.unwrap().len(), before);
}

async fn authenticate_failures_are_indistinguishable(gateway: &dyn PersistenceGateway) {
    gateway.register("a@example.com", "right").await.unwrap();

    let wrong_password = gateway.authenticate("a@example.com", "wrong").await.unwrap_err();
    let unknown_email = gateway.authenticate("b@example.com", "right").await.unwrap_err();

    assert!(matches!(wrong_password, DharmaError::AuthFailed(_)));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

async fn empty_credentials_are_bad_input(gateway: &dyn PersistenceGateway) {
    let err = gateway.register("", "pw").await.unwrap_err();
    assert!(matches!(err, DharmaError::InvalidInput(_)));
    assert!(gateway.list_users().await.unwrap().is_empty());
}

async fn update_user_fields(gateway: &dyn PersistenceGateway) {
    let user = gateway.register("old@example.com", "pw").await.unwrap();

    let updated = gateway
        .update_user(
            user.id,
            UpdateUser {
                email: Some("new@example.com".to_string()),
                password: Some("new-pw".to_string()),
                is_admin: Some(true),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, user.id);
    assert_eq!(updated.email, "new@example.com");
    assert!(updated.is_admin);
    assert_eq!(updated.created_at, user.created_at);

    assert!(gateway.authenticate("new@example.com", "new-pw").await.is_ok());
    assert!(gateway.authenticate("new@example.com", "pw").await.is_err());
    assert!(gateway.authenticate("old@example.com", "pw").await.is_err());
}

async fn update_user_to_taken_email_is_duplicate(gateway: &dyn PersistenceGateway) {
    gateway.register("taken@example.com", "pw").await.unwrap();
    let other = gateway.register("other@example.com", "pw").await.unwrap();

    let err = gateway
        .update_user(
            other.id,
            UpdateUser {
                email: Some("taken@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DharmaError::Duplicate(_)));

    // Re-saving your own email is fine
    let same = gateway
        .update_user(
            other.id,
            UpdateUser {
                email: Some("other@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(same.email, "other@example.com");
}

async fn delete_missing_user_is_not_found(gateway: &dyn PersistenceGateway) {
    let err = gateway.delete_user(UserId::new(999)).await.unwrap_err();
    assert!(err.is_not_found());

    let err = gateway
        .update_user(UserId::new(999), UpdateUser::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

async fn tracks_listed_newest_first(gateway: &dyn PersistenceGateway) {
    let first = gateway
        .create_track(CreateTrack::new("First", "local://first.mp3"))
        .await
        .unwrap();
    let second = gateway
        .create_track(CreateTrack::new("Second", "https://cdn.example.com/second.mp3"))
        .await
        .unwrap();

    let ids: Vec<TrackId> = gateway
        .list_tracks()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

async fn update_track_keeps_unspecified_fields(gateway: &dyn PersistenceGateway) {
    let mut create = CreateTrack::new("Heart Sutra", "local://heart_sutra.mp3");
    create.artist = Some("Sangha".to_string());
    create.duration = 310.0;
    let track = gateway.create_track(create).await.unwrap();

    let updated = gateway
        .update_track(
            track.id,
            UpdateTrack {
                alternative_urls: Some(vec!["https://mirror.example.com/hs.mp3".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Heart Sutra");
    assert_eq!(updated.artist.as_deref(), Some("Sangha"));
    assert_eq!(updated.duration, 310.0);
    assert_eq!(updated.alternative_urls, vec!["https://mirror.example.com/hs.mp3"]);

    let listed = gateway.list_tracks().await.unwrap();
    assert_eq!(listed, vec![updated]);
}

async fn update_missing_track_is_not_found(gateway: &dyn PersistenceGateway) {
    let err = gateway
        .update_track(TrackId::new(42), UpdateTrack::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

async fn delete_track_returns_file_references(gateway: &dyn PersistenceGateway) {
    let mut create = CreateTrack::new("Bell", "/uploads/bell_1700000000000.mp3");
    create.thumbnail = Some("/uploads/bell.jpg".to_string());
    let track = gateway.create_track(create).await.unwrap();

    let deleted = gateway.delete_track(track.id).await.unwrap();
    assert_eq!(deleted.url, "/uploads/bell_1700000000000.mp3");
    assert_eq!(deleted.thumbnail.as_deref(), Some("/uploads/bell.jpg"));
    assert!(gateway.list_tracks().await.unwrap().is_empty());
}

async fn delete_missing_track_is_not_found(gateway: &dyn PersistenceGateway) {
    let err = gateway.delete_track(TrackId::new(7)).await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}

async fn invalid_track_rejected(gateway: &dyn PersistenceGateway) {
    let err = gateway
        .create_track(CreateTrack::new("No URL", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, DharmaError::InvalidInput(_)));
}

async fn settings_default_then_partial_update(gateway: &dyn PersistenceGateway) {
    let defaults = gateway.get_settings().await.unwrap();
    assert_eq!(defaults.app_name, "Lời Phật Dạy");

    let updated = gateway
        .update_settings(UpdateSettings {
            secondary_color: Some("#000000".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.secondary_color, "#000000");
    assert_eq!(updated.app_name, defaults.app_name);
    assert_eq!(updated.primary_color, defaults.primary_color);
    assert_eq!(gateway.get_settings().await.unwrap(), updated);
}

async fn progress_defaults_to_zero(gateway: &dyn PersistenceGateway) {
    let position = gateway
        .get_progress(UserId::new(1), TrackId::new(1))
        .await
        .unwrap();
    assert_eq!(position, 0.0);
}

async fn progress_last_write_wins(gateway: &dyn PersistenceGateway) {
    let (user, track) = (UserId::new(1), TrackId::new(5));

    gateway.save_progress(user, track, 12.0).await.unwrap();
    gateway.save_progress(user, track, 95.5).await.unwrap();
    gateway.save_progress(user, track, 30.25).await.unwrap();

    assert_eq!(gateway.get_progress(user, track).await.unwrap(), 30.25);
    assert_eq!(gateway.get_user_progress(user).await.unwrap().len(), 1);
}

async fn progress_is_per_user_and_track(gateway: &dyn PersistenceGateway) {
    gateway
        .save_progress(UserId::new(1), TrackId::new(1), 10.0)
        .await
        .unwrap();
    gateway
        .save_progress(UserId::new(1), TrackId::new(2), 20.0)
        .await
        .unwrap();
    gateway
        .save_progress(UserId::new(2), TrackId::new(1), 30.0)
        .await
        .unwrap();

    let progress = gateway.get_user_progress(UserId::new(1)).await.unwrap();
    assert_eq!(progress.len(), 2);
    assert_eq!(progress[&TrackId::new(1)], 10.0);
    assert_eq!(progress[&TrackId::new(2)], 20.0);
    assert_eq!(
        gateway
            .get_progress(UserId::new(2), TrackId::new(1))
            .await
            .unwrap(),
        30.0
    );
}

async fn negative_progress_rejected(gateway: &dyn PersistenceGateway) {
    let err = gateway
        .save_progress(UserId::new(1), TrackId::new(1), -3.0)
        .await
        .unwrap_err();
    assert!(matches!(err, DharmaError::InvalidInput(_)));
    assert!(gateway
        .get_user_progress(UserId::new(1))
        .await
        .unwrap()
        .is_empty());
}

async fn ids_are_not_reused_after_delete(gateway: &dyn PersistenceGateway) {
    let first = gateway
        .create_track(CreateTrack::new("One", "local://one.mp3"))
        .await
        .unwrap();
    gateway.delete_track(first.id).await.unwrap();

    let second = gateway
        .create_track(CreateTrack::new("Two", "local://two.mp3"))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);
}
