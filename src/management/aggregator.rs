use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use futures::{StreamExt, TryStreamExt, stream};

use crate::{
    Res,
    management::SessionCaches,
    spotify::StreamingApi,
    types::{
        AccessToken, Artist, ArtistGenresRow, AudioFeatures, Feature, FeatureMatrix, FeatureRow,
        GenreCount, PlaylistStats, TempoPoint, Track, TrackRow,
    },
    utils,
};

/// Everything fetched for one playlist, joined by track and artist id.
#[derive(Debug, Clone, Default)]
pub struct PlaylistData {
    pub tracks: Vec<Track>,
    /// Primary artists in order of first appearance.
    pub artists: Vec<Artist>,
    features: HashMap<String, AudioFeatures>,
}

impl PlaylistData {
    pub fn new(tracks: Vec<Track>, features: Vec<AudioFeatures>, artists: Vec<Artist>) -> Self {
        let features = features.into_iter().map(|f| (f.id.clone(), f)).collect();
        Self {
            tracks,
            artists,
            features,
        }
    }

    pub fn features_for(&self, track: &Track) -> Option<&AudioFeatures> {
        track.id.as_ref().and_then(|id| self.features.get(id))
    }

    /// Numbered "Track - Artist" lines for the sidebar listing.
    pub fn track_listing(&self) -> Vec<String> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(i, track)| match track.primary_artist() {
                Some(artist) => format!("{}. {} - {}", i + 1, track.name, artist.name),
                None => format!("{}. {}", i + 1, track.name),
            })
            .collect()
    }

    /// Tempo by track name. Tracks without features are left out; a repeated
    /// name keeps its first position and takes the later value.
    pub fn tempo_by_track(&self) -> Vec<TempoPoint> {
        let mut points: Vec<TempoPoint> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for track in &self.tracks {
            let Some(features) = self.features_for(track) else {
                continue;
            };
            match positions.get(track.name.as_str()) {
                Some(&i) => points[i].tempo = features.tempo,
                None => {
                    positions.insert(track.name.as_str(), points.len());
                    points.push(TempoPoint {
                        track: track.name.clone(),
                        tempo: features.tempo,
                    });
                }
            }
        }
        points
    }

    /// Occurrences of each genre over the playlist's primary artists.
    /// Genres are compared as-is, without case folding.
    pub fn genre_counts(&self) -> Vec<GenreCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for genre in self.artists.iter().flat_map(|a| a.genres.iter()) {
            *counts.entry(genre.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(genre, count)| GenreCount {
                genre: genre.to_string(),
                count,
            })
            .collect()
    }

    /// One row per track holding the selected features, `None` where the
    /// track has no audio features.
    pub fn feature_matrix(&self, selected: &[Feature]) -> FeatureMatrix {
        let rows = self
            .tracks
            .iter()
            .map(|track| {
                let features = self.features_for(track);
                FeatureRow {
                    track: track.name.clone(),
                    values: selected
                        .iter()
                        .map(|feature| features.map(|f| feature.value(f)))
                        .collect(),
                }
            })
            .collect();

        FeatureMatrix {
            features: selected.to_vec(),
            rows,
        }
    }

    pub fn track_table(&self) -> Vec<TrackRow> {
        self.tracks
            .iter()
            .map(|track| {
                let features = self.features_for(track);
                TrackRow {
                    name: track.name.clone(),
                    artists: utils::join_names(track.artists.iter().map(|a| a.name.as_str())),
                    album: track.album.name.clone(),
                    release_date: track.album.release_date.clone().unwrap_or_default(),
                    duration_min: utils::duration_minutes(track.duration_ms),
                    popularity: track.popularity,
                    danceability: features.map(|f| f.danceability),
                    energy: features.map(|f| f.energy),
                    valence: features.map(|f| f.valence),
                    tempo: features.map(|f| f.tempo),
                    loudness: features.map(|f| f.loudness),
                }
            })
            .collect()
    }

    pub fn artist_genres(&self) -> Vec<ArtistGenresRow> {
        artist_genre_rows(&self.artists)
    }

    pub fn stats(&self, selected: &[Feature]) -> PlaylistStats {
        PlaylistStats {
            tracks: self.track_listing(),
            tempo: self.tempo_by_track(),
            genres: self.genre_counts(),
            features: self.feature_matrix(selected),
            table: self.track_table(),
        }
    }
}

/// Artist names with their genres joined by ", ".
pub fn artist_genre_rows(artists: &[Artist]) -> Vec<ArtistGenresRow> {
    artists
        .iter()
        .map(|artist| ArtistGenresRow {
            name: artist.name.clone(),
            genres: utils::join_names(artist.genres.iter().map(String::as_str)),
        })
        .collect()
}

/// Primary artist ids, deduplicated in order of first appearance.
pub fn primary_artist_ids(tracks: &[Track]) -> Vec<String> {
    let mut seen = HashSet::new();
    tracks
        .iter()
        .filter_map(|track| track.primary_artist().and_then(|a| a.id.clone()))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Fetches a playlist's tracks, audio features and primary artists.
pub struct DataAggregator {
    api: Arc<dyn StreamingApi>,
    concurrency: usize,
}

impl DataAggregator {
    pub fn new(api: Arc<dyn StreamingApi>, concurrency: usize) -> Self {
        Self {
            api,
            concurrency: concurrency.max(1),
        }
    }

    /// Runs the whole fetch sequence. Any failing call aborts the aggregation.
    pub async fn aggregate(
        &self,
        token: &AccessToken,
        caches: &SessionCaches,
        playlist_id: &str,
    ) -> Res<PlaylistData> {
        let tracks = self.api.playlist_tracks(token, playlist_id).await?;

        let track_ids: Vec<String> = tracks.iter().filter_map(|t| t.id.clone()).collect();
        let features: Vec<AudioFeatures> = if track_ids.is_empty() {
            Vec::new()
        } else {
            self.api
                .audio_features(token, &track_ids)
                .await?
                .into_iter()
                .flatten()
                .collect()
        };

        let artist_ids = primary_artist_ids(&tracks);
        let artists = self.fetch_artists(token, caches, &artist_ids).await?;

        tracing::info!(
            playlist = %playlist_id,
            tracks = tracks.len(),
            features = features.len(),
            artists = artists.len(),
            "Aggregated playlist"
        );

        Ok(PlaylistData::new(tracks, features, artists))
    }

    /// Tracks and primary artists only, for the views that need no audio features.
    pub async fn primary_artists(
        &self,
        token: &AccessToken,
        caches: &SessionCaches,
        playlist_id: &str,
    ) -> Res<Vec<Artist>> {
        let tracks = self.api.playlist_tracks(token, playlist_id).await?;
        self.fetch_artists(token, caches, &primary_artist_ids(&tracks))
            .await
    }

    /// Fetches artists one request each, through the session cache, keeping
    /// the order of `artist_ids`.
    pub async fn fetch_artists(
        &self,
        token: &AccessToken,
        caches: &SessionCaches,
        artist_ids: &[String],
    ) -> Res<Vec<Artist>> {
        let lookups: Vec<_> = artist_ids
            .iter()
            .map(|id| {
                let api = Arc::clone(&self.api);
                let token = token.clone();
                let cache = Arc::clone(&caches.artists);
                let id = id.clone();
                async move {
                    cache
                        .get_or_try_insert_with(id.clone(), || async {
                            api.artist(&token, &id).await
                        })
                        .await
                }
            })
            .collect();

        stream::iter(lookups)
            .buffered(self.concurrency)
            .try_collect()
            .await
    }
}
