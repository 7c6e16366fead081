//! Configuration management for the playlist analyzer.
//!
//! Configuration is read from environment variables. Before that, an optional
//! `.env` file in the local data directory is loaded so credentials never have
//! to live in the repository or the shipped binary:
//!
//! - Linux: `~/.local/share/playlist-analyzer/.env`
//! - macOS: `~/Library/Application Support/playlist-analyzer/.env`
//! - Windows: `%LOCALAPPDATA%/playlist-analyzer/.env`
//!
//! Variables already present in the process environment take precedence over
//! the file.

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use crate::error::AppError;

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8501";
const DEFAULT_SCOPE: &str = "user-library-read playlist-read-private";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_GEOCODING_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const DEFAULT_MUSICBRAINZ_URL: &str = "https://musicbrainz.org/ws/2";
const DEFAULT_LOOKUP_CONCURRENCY: usize = 4;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Loads environment variables from the `.env` file in the local data directory.
///
/// A missing file is not an error, the variables may come from the process
/// environment instead. A file that exists but cannot be parsed is reported.
pub async fn load_env() -> Result<(), String> {
    let path = env_file_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(_)) => Ok(()),
        Err(e) => Err(format!("{}: {}", path.display(), e)),
    }
}

/// Location of the `.env` file the application reads at startup.
pub fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("playlist-analyzer/.env");
    path
}

/// Credentials and endpoints of the Spotify Web API.
#[derive(Clone)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
}

impl std::fmt::Debug for SpotifySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifySettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Clone)]
pub struct GeocodingSettings {
    pub api_key: String,
    pub url: String,
}

impl std::fmt::Debug for GeocodingSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingSettings")
            .field("api_key", &"<redacted>")
            .field("url", &self.url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct MusicBrainzSettings {
    pub url: String,
    /// Contact address sent in the User-Agent, required by the MusicBrainz usage policy.
    pub contact: String,
}

/// Typed application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server_address: SocketAddr,
    pub spotify: SpotifySettings,
    pub geocoding: GeocodingSettings,
    pub musicbrainz: MusicBrainzSettings,
    pub lookup_concurrency: usize,
    pub http_timeout: Duration,
}

impl Settings {
    /// Builds the settings from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the settings from an arbitrary key lookup.
    ///
    /// Every required variable that is missing is reported in one error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            value(key).unwrap_or_else(|| {
                missing.push(key);
                String::new()
            })
        };

        let client_id = required("SPOTIFY_API_AUTH_CLIENT_ID");
        let client_secret = required("SPOTIFY_API_AUTH_CLIENT_SECRET");
        let redirect_uri = required("SPOTIFY_API_REDIRECT_URI");
        let api_key = required("GOOGLE_MAPS_API_KEY");
        let contact = required("MUSICBRAINZ_CONTACT");

        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "missing environment variables: {}",
                missing.join(", ")
            )));
        }

        let or_default = |key: &str, default: &str| value(key).unwrap_or_else(|| default.to_string());

        let server_address = parse_var(
            "SERVER_ADDRESS",
            &or_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
        )?;
        let lookup_concurrency: usize = match value("LOOKUP_CONCURRENCY") {
            Some(raw) => parse_var("LOOKUP_CONCURRENCY", &raw)?,
            None => DEFAULT_LOOKUP_CONCURRENCY,
        };
        let timeout_secs: u64 = match value("HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_var("HTTP_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Settings {
            server_address,
            spotify: SpotifySettings {
                client_id,
                client_secret,
                redirect_uri,
                scope: or_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
                auth_url: or_default("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
                token_url: or_default("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
                api_url: or_default("SPOTIFY_API_URL", DEFAULT_API_URL)
                    .trim_end_matches('/')
                    .to_string(),
            },
            geocoding: GeocodingSettings {
                api_key,
                url: or_default("GEOCODING_API_URL", DEFAULT_GEOCODING_URL),
            },
            musicbrainz: MusicBrainzSettings {
                url: or_default("MUSICBRAINZ_API_URL", DEFAULT_MUSICBRAINZ_URL)
                    .trim_end_matches('/')
                    .to_string(),
                contact,
            },
            lookup_concurrency: lookup_concurrency.max(1),
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid {key} '{raw}': {e}")))
}
