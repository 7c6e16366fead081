use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Opaque OAuth access token. Never printed, `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: AccessToken,
    pub refresh_token: Option<String>,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Token {
    pub fn expires_at(&self) -> u64 {
        self.obtained_at + self.expires_in
    }
}

/// Raw token endpoint payload.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

impl From<TokenResponse> for Token {
    fn from(res: TokenResponse) -> Self {
        Token {
            access_token: AccessToken::new(res.access_token),
            refresh_token: res.refresh_token,
            scope: res.scope,
            expires_in: res.expires_in,
            obtained_at: Utc::now().timestamp() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<PlaylistOwner>,
    #[serde(default)]
    pub tracks: Option<PlaylistTracksRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistOwner {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistTracksRef {
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetUserPlaylistsResponse {
    pub items: Vec<Playlist>,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub id: String,
    pub name: String,
    pub tracks: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumRef {
    pub name: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    /// Local files carry no id.
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: AlbumRef,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub popularity: u32,
}

impl Track {
    pub fn primary_artist(&self) -> Option<&ArtistRef> {
        self.artists.first()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTrackItem {
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracksResponse {
    pub items: Vec<PlaylistTrackItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioFeatures {
    pub id: String,
    pub tempo: f64,
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
    pub loudness: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsResponse {
    pub tracks: Vec<Track>,
}

/// Geographic coordinates in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapMarker {
    pub artist: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

impl MapMarker {
    pub fn new(artist: &str, city: &str, coordinates: Coordinates) -> Self {
        MapMarker {
            artist: artist.to_string(),
            city: city.to_string(),
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            label: format!("{artist} ({city})"),
        }
    }
}

#[derive(Tabled)]
pub struct MapMarkerTableRow {
    pub artist: String,
    pub city: String,
    pub latitude: String,
    pub longitude: String,
}

/// Audio feature a chart can plot per track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Valence,
    Energy,
    Danceability,
    Loudness,
    Tempo,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Valence,
        Feature::Energy,
        Feature::Danceability,
        Feature::Loudness,
        Feature::Tempo,
    ];

    pub const DEFAULT_SELECTION: [Feature; 3] =
        [Feature::Valence, Feature::Energy, Feature::Danceability];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Valence => "valence",
            Feature::Energy => "energy",
            Feature::Danceability => "danceability",
            Feature::Loudness => "loudness",
            Feature::Tempo => "tempo",
        }
    }

    pub fn value(&self, features: &AudioFeatures) -> f64 {
        match self {
            Feature::Valence => features.valence,
            Feature::Energy => features.energy,
            Feature::Danceability => features.danceability,
            Feature::Loudness => features.loudness,
            Feature::Tempo => features.tempo,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown feature '{}', expected one of: valence, energy, danceability, loudness, tempo",
                    s.trim()
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TempoPoint {
    pub track: String,
    pub tempo: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeatureRow {
    pub track: String,
    pub values: Vec<Option<f64>>,
}

/// Selected features by track, one row per playlist track.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeatureMatrix {
    pub features: Vec<Feature>,
    pub rows: Vec<FeatureRow>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrackRow {
    pub name: String,
    pub artists: String,
    pub album: String,
    pub release_date: String,
    pub duration_min: f64,
    pub popularity: u32,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
    pub loudness: Option<f64>,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub name: String,
    pub artists: String,
    pub album: String,
    pub released: String,
    pub minutes: String,
    pub popularity: u32,
    pub dance: String,
    pub energy: String,
    pub valence: String,
    pub bpm: String,
    pub db: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Tabled)]
pub struct ArtistGenresRow {
    pub name: String,
    pub genres: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlaylistStats {
    pub tracks: Vec<String>,
    pub tempo: Vec<TempoPoint>,
    pub genres: Vec<GenreCount>,
    pub features: FeatureMatrix,
    pub table: Vec<TrackRow>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationCard {
    pub name: String,
    pub cover_png_base64: String,
    pub songs: Vec<String>,
}
