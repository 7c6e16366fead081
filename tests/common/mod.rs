#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use playlist_analyzer::{
    Res,
    error::{AppError, AuthError, Service},
    geocoding::Geocoder,
    management::{Session, SharedSession},
    musicbrainz::ArtistLocator,
    spotify::{AuthorizationServer, StreamingApi},
    types::{
        AccessToken, AlbumRef, Artist, ArtistRef, AudioFeatures, Coordinates, Playlist, Token,
        Track,
    },
};

pub const TEST_TOKEN: &str = "test-access-token";

pub fn track(id: &str, name: &str, artist_id: &str, artist_name: &str) -> Track {
    Track {
        id: Some(id.to_string()),
        name: name.to_string(),
        artists: vec![ArtistRef {
            id: Some(artist_id.to_string()),
            name: artist_name.to_string(),
        }],
        album: AlbumRef {
            name: format!("{name} (album)"),
            release_date: Some("2020-01-01".to_string()),
        },
        duration_ms: 180_000,
        popularity: 50,
    }
}

pub fn features(id: &str, tempo: f64) -> AudioFeatures {
    AudioFeatures {
        id: id.to_string(),
        tempo,
        energy: 0.5,
        danceability: 0.6,
        valence: 0.7,
        loudness: -6.0,
    }
}

pub fn artist(id: &str, name: &str, genres: &[&str]) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
    }
}

/// Authorization server answering from memory and counting exchanges.
#[derive(Default)]
pub struct FakeAuthServer {
    pub exchanges: AtomicUsize,
    pub fail_exchange: bool,
    /// Token handed out instead of [`TEST_TOKEN`].
    pub issued_token: Option<String>,
}

impl FakeAuthServer {
    pub fn failing() -> Self {
        Self {
            fail_exchange: true,
            ..Default::default()
        }
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthorizationServer for FakeAuthServer {
    fn authorize_url(&self, state: &str, code_challenge: &str) -> Res<String> {
        Ok(format!(
            "https://accounts.test/authorize?code_challenge={code_challenge}&state={state}"
        ))
    }

    async fn exchange_code(&self, code: &str, _code_verifier: &str) -> Res<Token> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if self.fail_exchange {
            return Err(AuthError::ExchangeFailed(format!("code {code} expired")).into());
        }
        Ok(Token {
            access_token: AccessToken::new(
                self.issued_token.as_deref().unwrap_or(TEST_TOKEN),
            ),
            refresh_token: None,
            scope: "playlist-read-private".to_string(),
            expires_in: 3600,
            obtained_at: 1_700_000_000,
        })
    }
}

/// The `state` parameter of an authorize URL built by [`FakeAuthServer`].
pub fn state_of(url: &str) -> String {
    url.rsplit("state=").next().unwrap_or_default().to_string()
}

/// A session that went through a full login against `server`.
pub async fn logged_in(server: &FakeAuthServer) -> SharedSession {
    let session = Session::shared();
    {
        let mut guard = session.lock().await;
        let url = guard.begin_login(server).unwrap().unwrap();
        guard
            .complete_login(server, "code-1", &state_of(&url))
            .await
            .unwrap();
    }
    session
}

/// In-memory catalog with call counters.
#[derive(Default)]
pub struct FakeStreaming {
    pub playlists: Vec<Playlist>,
    pub tracks: Vec<Track>,
    pub features: HashMap<String, AudioFeatures>,
    pub artists: HashMap<String, Artist>,
    pub recommended: Vec<Track>,
    pub reject_token: bool,
    pub artist_calls: AtomicUsize,
    pub feature_calls: AtomicUsize,
    pub recommendation_calls: AtomicUsize,
}

impl FakeStreaming {
    fn check(&self, token: &AccessToken) -> Res<()> {
        if self.reject_token || token.secret() != TEST_TOKEN {
            return Err(AuthError::TokenRejected.into());
        }
        Ok(())
    }

    pub fn artist_call_count(&self) -> usize {
        self.artist_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamingApi for FakeStreaming {
    async fn current_user_playlists(&self, token: &AccessToken) -> Res<Vec<Playlist>> {
        self.check(token)?;
        Ok(self.playlists.clone())
    }

    async fn playlist_tracks(&self, token: &AccessToken, _playlist_id: &str) -> Res<Vec<Track>> {
        self.check(token)?;
        Ok(self.tracks.clone())
    }

    async fn audio_features(
        &self,
        token: &AccessToken,
        track_ids: &[String],
    ) -> Res<Vec<Option<AudioFeatures>>> {
        self.check(token)?;
        self.feature_calls.fetch_add(1, Ordering::SeqCst);
        Ok(track_ids
            .iter()
            .map(|id| self.features.get(id).cloned())
            .collect())
    }

    async fn artist(&self, token: &AccessToken, artist_id: &str) -> Res<Artist> {
        self.check(token)?;
        self.artist_calls.fetch_add(1, Ordering::SeqCst);
        self.artists.get(artist_id).cloned().ok_or_else(|| {
            AppError::upstream(Service::Spotify, Some(404), "non existing id".to_string())
        })
    }

    async fn recommendations(
        &self,
        token: &AccessToken,
        _seed_track_ids: &[String],
        _limit: u8,
    ) -> Res<Vec<Track>> {
        self.check(token)?;
        self.recommendation_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.recommended.clone())
    }
}

/// Origin lookup by artist name; names listed in `failing` return an error.
#[derive(Default)]
pub struct FakeLocator {
    pub origins: HashMap<String, String>,
    pub failing: Vec<String>,
    pub calls: AtomicUsize,
    /// Time every lookup takes, so concurrent lookups overlap.
    pub delay: Option<Duration>,
}

impl FakeLocator {
    pub fn with(origins: &[(&str, &str)]) -> Self {
        Self {
            origins: origins
                .iter()
                .map(|(a, c)| (a.to_string(), c.to_string()))
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ArtistLocator for FakeLocator {
    async fn artist_origin(&self, artist_name: &str) -> Res<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.iter().any(|name| name == artist_name) {
            return Err(AppError::upstream(
                Service::MusicBrainz,
                Some(503),
                "rate limited".to_string(),
            ));
        }
        Ok(self.origins.get(artist_name).cloned())
    }
}

#[derive(Default)]
pub struct FakeGeocoder {
    pub places: HashMap<String, Coordinates>,
    pub calls: AtomicUsize,
    pub delay: Option<Duration>,
}

impl FakeGeocoder {
    pub fn with(places: &[(&str, f64, f64)]) -> Self {
        Self {
            places: places
                .iter()
                .map(|(name, latitude, longitude)| {
                    (
                        name.to_string(),
                        Coordinates {
                            latitude: *latitude,
                            longitude: *longitude,
                        },
                    )
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, place: &str) -> Res<Option<Coordinates>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.places.get(place).copied())
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
