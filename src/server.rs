use std::{net::SocketAddr, sync::Arc};

use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::{
    Res,
    api::{self, AppState},
    management::SharedSession,
    spotify::AuthorizationServer,
};

/// Largest accepted cover upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn dashboard_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/logout", post(api::logout))
        .route("/api/session", get(api::session_status))
        .route("/api/playlists", get(api::list_playlists))
        .route("/api/playlists/{id}/stats", get(api::playlist_stats))
        .route("/api/playlists/{id}/artists", get(api::playlist_artists))
        .route("/api/playlists/{id}/map", get(api::playlist_map))
        .route(
            "/api/playlists/{id}/recommendations",
            post(api::recommendations).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}

/// Serves the dashboard until the process is stopped.
pub async fn start_dashboard(addr: SocketAddr, state: AppState) -> Res<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Dashboard listening");
    axum::serve(listener, dashboard_router(state)).await?;
    Ok(())
}

/// Router of the CLI's login: only the callback for a single in-memory session.
pub fn callback_router(session: SharedSession, authorizer: Arc<dyn AuthorizationServer>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::terminal_callback))
        .layer(Extension(session))
        .layer(Extension(authorizer))
}

pub async fn start_callback_server(
    addr: SocketAddr,
    session: SharedSession,
    authorizer: Arc<dyn AuthorizationServer>,
) -> Res<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::debug!(%addr, "Login callback server listening");
    axum::serve(listener, callback_router(session, authorizer)).await?;
    Ok(())
}
