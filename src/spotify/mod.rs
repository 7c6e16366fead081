//! # Spotify Integration Module
//!
//! Thin async callers for the parts of the Spotify Web API the dashboard reads:
//!
//! - `GET /me/playlists` - the current user's playlists
//! - `GET /playlists/{id}/tracks` - first page of a playlist's tracks
//! - `GET /audio-features` - batched audio features by track id
//! - `GET /artists/{id}` - artist metadata including genres
//! - `GET /recommendations` - recommended tracks for seed track ids
//!
//! plus the OAuth authorization-code endpoints in [`auth`].
//!
//! Higher layers only see the [`StreamingApi`] and [`AuthorizationServer`]
//! traits, so tests can swap the HTTP clients for in-memory fakes. A `401`
//! from any endpoint becomes [`AuthError::TokenRejected`]; every other
//! non-success status is an upstream error. Nothing here retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::{
    Res,
    config::SpotifySettings,
    error::{AppError, AuthError, Service},
    types::{AccessToken, Artist, AudioFeatures, Playlist, Token, Track},
};

pub mod artists;
pub mod auth;
pub mod playlists;
pub mod recommendations;
pub mod tracks;

pub use auth::SpotifyAuthorizer;

/// Catalog operations of the streaming service.
#[async_trait]
pub trait StreamingApi: Send + Sync {
    async fn current_user_playlists(&self, token: &AccessToken) -> Res<Vec<Playlist>>;

    async fn playlist_tracks(&self, token: &AccessToken, playlist_id: &str) -> Res<Vec<Track>>;

    /// Audio features for `track_ids`; entries are `None` where the service has none.
    async fn audio_features(
        &self,
        token: &AccessToken,
        track_ids: &[String],
    ) -> Res<Vec<Option<AudioFeatures>>>;

    async fn artist(&self, token: &AccessToken, artist_id: &str) -> Res<Artist>;

    async fn recommendations(
        &self,
        token: &AccessToken,
        seed_track_ids: &[String],
        limit: u8,
    ) -> Res<Vec<Track>>;
}

/// OAuth authorization-code grant of the streaming service.
#[async_trait]
pub trait AuthorizationServer: Send + Sync {
    /// URL the user follows to grant access.
    fn authorize_url(&self, state: &str, code_challenge: &str) -> Res<String>;

    /// Exchanges a one-time authorization code for a token.
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Res<Token>;
}

/// reqwest based [`StreamingApi`] implementation.
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: Url,
}

impl SpotifyClient {
    pub fn new(settings: &SpotifySettings, timeout: Duration) -> Res<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::from_reqwest(Service::Spotify, e))?;

        let api_url = Url::parse(&settings.api_url)
            .map_err(|e| AppError::Config(format!("invalid SPOTIFY_API_URL: {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "SPOTIFY_API_URL is not a base URL: {api_url}"
            )));
        }

        Ok(Self { http, api_url })
    }

    /// Endpoint URL below the API base. Each segment is percent-encoded, so an
    /// id holding `/` or `?` stays a single path segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Res<T> {
        let response = self
            .http
            .get(self.url(segments))
            .query(query)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(Service::Spotify, e))?;

        read_json(check_status(response).await?).await
    }
}

/// Turns error statuses into typed errors; `401` means the token is no longer valid.
pub(crate) async fn check_status(response: Response) -> Res<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), "Spotify returned an error response");

    if status == StatusCode::UNAUTHORIZED {
        return Err(AuthError::TokenRejected.into());
    }

    Err(AppError::upstream(
        Service::Spotify,
        Some(status.as_u16()),
        error_message(&body).unwrap_or_else(|| status.to_string()),
    ))
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Res<T> {
    let body = response
        .bytes()
        .await
        .map_err(|e| AppError::from_reqwest(Service::Spotify, e))?;
    serde_json::from_slice(&body).map_err(|e| AppError::data_shape(Service::Spotify, e.to_string()))
}

/// Extracts `error.message` (Web API) or `error_description` (accounts service).
fn error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json["error"]["message"]
        .as_str()
        .or_else(|| json["error_description"].as_str())
        .or_else(|| json["error"].as_str())
        .map(str::to_string)
}

#[async_trait]
impl StreamingApi for SpotifyClient {
    async fn current_user_playlists(&self, token: &AccessToken) -> Res<Vec<Playlist>> {
        self.get_current_user_playlists(token).await
    }

    async fn playlist_tracks(&self, token: &AccessToken, playlist_id: &str) -> Res<Vec<Track>> {
        self.get_playlist_tracks(token, playlist_id).await
    }

    async fn audio_features(
        &self,
        token: &AccessToken,
        track_ids: &[String],
    ) -> Res<Vec<Option<AudioFeatures>>> {
        self.get_audio_features(token, track_ids).await
    }

    async fn artist(&self, token: &AccessToken, artist_id: &str) -> Res<Artist> {
        self.get_artist(token, artist_id).await
    }

    async fn recommendations(
        &self,
        token: &AccessToken,
        seed_track_ids: &[String],
        limit: u8,
    ) -> Res<Vec<Track>> {
        self.get_recommendations(token, seed_track_ids, limit).await
    }
}
