//! MusicBrainz artist search, used to find where an artist comes from.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    Res,
    config::MusicBrainzSettings,
    error::{AppError, Service},
};

/// Looks up an artist's place of origin by name.
#[async_trait]
pub trait ArtistLocator: Send + Sync {
    /// City (begin area) of the best matching artist, `Ok(None)` if there is
    /// no match or the match has no origin.
    async fn artist_origin(&self, artist_name: &str) -> Res<Option<String>>;
}

#[derive(Deserialize)]
struct ArtistSearchResponse {
    #[serde(default)]
    artists: Vec<MBArtist>,
}

#[derive(Deserialize)]
struct MBArtist {
    #[serde(rename = "begin-area")]
    begin_area: Option<MBArea>,
}

#[derive(Deserialize)]
struct MBArea {
    name: Option<String>,
}

/// MusicBrainz allows one request per second and client.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Spaces requests at least `min_interval` apart, however many callers share it.
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("MusicBrainz rate limit: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

pub struct MusicBrainzClient {
    http: Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl MusicBrainzClient {
    pub fn new(settings: &MusicBrainzSettings, timeout: Duration) -> Res<Self> {
        let http = Client::builder()
            .user_agent(user_agent(&settings.contact))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::from_reqwest(Service::MusicBrainz, e))?;

        Ok(Self {
            http,
            base_url: settings.url.clone(),
            rate_limiter: Arc::new(RateLimiter::new(MIN_REQUEST_INTERVAL)),
        })
    }
}

/// Application name, version and contact as the usage policy asks for.
pub fn user_agent(contact: &str) -> String {
    format!(
        "{}/{} ( {} )",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        contact
    )
}

/// Lucene query matching the artist name as a phrase.
fn artist_query(artist_name: &str) -> String {
    let escaped = artist_name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("artist:\"{escaped}\"")
}

#[async_trait]
impl ArtistLocator for MusicBrainzClient {
    async fn artist_origin(&self, artist_name: &str) -> Res<Option<String>> {
        let url = format!("{}/artist", self.base_url);
        let query = artist_query(artist_name);

        self.rate_limiter.wait().await;
        let response = self
            .http
            .get(&url)
            .query(&[("query", query.as_str()), ("limit", "1"), ("fmt", "json")])
            .send()
            .await
            .map_err(|e| AppError::from_reqwest(Service::MusicBrainz, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::upstream(
                Service::MusicBrainz,
                Some(status.as_u16()),
                status.to_string(),
            ));
        }

        let body: ArtistSearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::from_reqwest(Service::MusicBrainz, e))?;

        Ok(body
            .artists
            .into_iter()
            .next()
            .and_then(|artist| artist.begin_area)
            .and_then(|area| area.name)
            .filter(|name| !name.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_request_is_not_delayed() {
        let limiter = RateLimiter::new(Duration::from_secs(5));

        let start = Instant::now();
        limiter.wait().await;

        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(Duration::from_millis(200));

        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        limiter.wait().await;

        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[test]
    fn test_query_escapes_quotes() {
        assert_eq!(artist_query(r#"The "Band""#), r#"artist:"The \"Band\"""#);
    }
}
