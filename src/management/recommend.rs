use std::{ops::RangeInclusive, sync::Arc};

use crate::{
    Res,
    error::AppError,
    spotify::StreamingApi,
    types::{AccessToken, Track},
};

pub const MAX_SEED_TRACKS: usize = 5;
pub const RECOMMENDATION_COUNT: RangeInclusive<u8> = 1..=25;
pub const DEFAULT_RECOMMENDATION_COUNT: u8 = 5;

/// The first `min(5, n)` track ids of the playlist; tracks without id are skipped.
pub fn seed_track_ids(tracks: &[Track]) -> Vec<String> {
    tracks
        .iter()
        .filter_map(|track| track.id.clone())
        .take(MAX_SEED_TRACKS)
        .collect()
}

pub fn validate_count(count: u8) -> Res<u8> {
    if RECOMMENDATION_COUNT.contains(&count) {
        Ok(count)
    } else {
        Err(AppError::validation(format!(
            "number of songs must be between {} and {}",
            RECOMMENDATION_COUNT.start(),
            RECOMMENDATION_COUNT.end()
        )))
    }
}

/// "Track Name – Primary Artist Name".
pub fn display_name(track: &Track) -> String {
    match track.primary_artist() {
        Some(artist) => format!("{} – {}", track.name, artist.name),
        None => track.name.clone(),
    }
}

pub struct RecommendationRequester {
    api: Arc<dyn StreamingApi>,
}

impl RecommendationRequester {
    pub fn new(api: Arc<dyn StreamingApi>) -> Self {
        Self { api }
    }

    /// Requests `count` recommendations seeded by the first tracks of `tracks`.
    /// The result may be shorter than `count`, never longer.
    pub async fn recommend(
        &self,
        token: &AccessToken,
        tracks: &[Track],
        count: u8,
    ) -> Res<Vec<String>> {
        let count = validate_count(count)?;
        let seeds = seed_track_ids(tracks);
        if seeds.is_empty() {
            return Err(AppError::validation(
                "the playlist has no tracks to base recommendations on",
            ));
        }

        let recommended = self.api.recommendations(token, &seeds, count).await?;
        tracing::debug!(
            seeds = seeds.len(),
            requested = count,
            received = recommended.len(),
            "Fetched recommendations"
        );

        Ok(recommended
            .iter()
            .take(count as usize)
            .map(display_name)
            .collect())
    }
}
