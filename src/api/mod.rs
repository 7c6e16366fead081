//! # API Module
//!
//! HTTP handlers of the dashboard. The browser keeps a session cookie; every
//! handler resolves it to the [`Session`](crate::management::Session) owning
//! the OAuth state, token and lookup caches of that browser.
//!
//! ## Endpoints
//!
//! - [`index`], [`login`], [`callback`], [`logout`] - HTML login flow
//! - [`session_status`] - whether the browser is logged in
//! - [`list_playlists`], [`playlist_stats`], [`playlist_artists`],
//!   [`playlist_map`] - JSON views of a playlist
//! - [`recommendations`] - recommendation card with the vinyl cover
//! - [`health`] - liveness check
//! - [`terminal_callback`] - login callback of the CLI's one-shot server
//!
//! Errors are rendered as `{"error": "..."}` with a status derived from the
//! error kind, see [`AppError`]'s `IntoResponse` implementation.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    Res,
    config::Settings,
    error::{AppError, AuthError},
    geocoding::{Geocoder, GoogleGeocoder},
    management::{
        DataAggregator, GeoResolver, RecommendationRequester, SessionStore, SharedSession,
    },
    musicbrainz::{ArtistLocator, MusicBrainzClient},
    spotify::{AuthorizationServer, SpotifyAuthorizer, SpotifyClient, StreamingApi},
};

mod auth;
mod error;
mod health;
mod playlists;
mod recommendations;

pub use auth::{callback, index, login, logout, session_status, terminal_callback};
pub use health::health;
pub use playlists::{list_playlists, playlist_artists, playlist_map, playlist_stats};
pub use recommendations::recommendations;

pub const SESSION_COOKIE: &str = "analyzer_session";

/// Shared state of the dashboard handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub authorizer: Arc<dyn AuthorizationServer>,
    pub streaming: Arc<dyn StreamingApi>,
    pub aggregator: Arc<DataAggregator>,
    pub geo: Arc<GeoResolver>,
    pub recommender: Arc<RecommendationRequester>,
}

impl AppState {
    pub fn new(
        authorizer: Arc<dyn AuthorizationServer>,
        streaming: Arc<dyn StreamingApi>,
        locator: Arc<dyn ArtistLocator>,
        geocoder: Arc<dyn Geocoder>,
        lookup_concurrency: usize,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            aggregator: Arc::new(DataAggregator::new(
                Arc::clone(&streaming),
                lookup_concurrency,
            )),
            geo: Arc::new(GeoResolver::new(locator, geocoder, lookup_concurrency)),
            recommender: Arc::new(RecommendationRequester::new(Arc::clone(&streaming))),
            authorizer,
            streaming,
        }
    }

    /// Wires the real HTTP clients from the settings.
    pub fn from_settings(settings: &Settings) -> Res<Self> {
        let timeout = settings.http_timeout;
        Ok(Self::new(
            Arc::new(SpotifyAuthorizer::new(&settings.spotify, timeout)?),
            Arc::new(SpotifyClient::new(&settings.spotify, timeout)?),
            Arc::new(MusicBrainzClient::new(&settings.musicbrainz, timeout)?),
            Arc::new(GoogleGeocoder::new(&settings.geocoding, timeout)?),
            settings.lookup_concurrency,
        ))
    }
}

/// Session of the requesting browser, created together with its cookie when
/// the browser starts its first login.
async fn browser_session(state: &AppState, jar: CookieJar) -> (CookieJar, SharedSession) {
    let id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let (id, session, created) = state.sessions.get_or_create(id.as_deref()).await;

    if !created {
        return (jar, session);
    }

    let cookie = Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), session)
}

/// Session of the requesting browser if it has one; API calls never create sessions.
async fn existing_session(state: &AppState, jar: &CookieJar) -> Res<SharedSession> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Err(AuthError::NotAuthenticated.into());
    };
    state
        .sessions
        .get(cookie.value())
        .await
        .ok_or(AppError::Auth(AuthError::NotAuthenticated))
}

/// Drops the browser's session from the store and expires its cookie.
async fn forget_session(state: &AppState, jar: CookieJar) -> (CookieJar, Option<SharedSession>) {
    let Some(id) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };
    let session = state.sessions.remove(&id).await;
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    (jar, session)
}
