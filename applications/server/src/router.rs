/// HTTP router
use crate::{
    api,
    config::ServerConfig,
    error::ServerError,
    middleware,
    state::AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the full application: `/api`, `/uploads` and the SPA
pub fn create_router(app_state: AppState, config: &ServerConfig) -> Router {
    let upload_limit = config.server.max_upload_mb.saturating_mul(1024 * 1024);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/users/authenticate", post(api::users::authenticate))
        .route("/users/register", post(api::users::register))
        // Tracks
        .route(
            "/tracks",
            get(api::tracks::list_tracks).post(api::tracks::create_track),
        )
        .route(
            "/tracks/:id",
            put(api::tracks::update_track).delete(api::tracks::delete_track),
        )
        // Settings
        .route(
            "/settings",
            get(api::settings::get_settings).put(api::settings::update_settings),
        )
        // Progress
        .route("/progress", post(api::progress::save_progress))
        .route("/progress/:user_id", get(api::progress::get_user_progress))
        .route(
            "/progress/:user_id/:track_id",
            get(api::progress::get_progress),
        )
        // Files
        .route(
            "/upload-file",
            post(api::files::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/uploaded-files", get(api::files::list_files))
        .route("/delete-file/:file_name", delete(api::files::delete_file))
        .route(
            "/download-from-drive",
            post(api::drive::download_from_drive),
        );

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/users", get(api::users::list_users))
        .route(
            "/users/:id",
            put(api::users::update_user).delete(api::users::delete_user),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::clone(&app_state.auth_service),
            middleware::auth_middleware,
        ));

    let api_routes = public_routes
        .merge(protected_routes)
        .fallback(endpoint_not_found);

    let uploads = ServeDir::new(&config.storage.uploads_dir)
        .not_found_service(endpoint_not_found.into_service());

    // SPA with fallback to index.html
    let web_dir = &config.server.web_dir;
    let spa = ServeDir::new(web_dir).fallback(ServeFile::new(web_dir.join("index.html")));

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/uploads", uploads)
        .fallback_service(spa)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn endpoint_not_found() -> ServerError {
    ServerError::NotFound("API endpoint does not exist".to_string())
}
