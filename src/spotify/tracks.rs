use crate::{
    Res,
    spotify::SpotifyClient,
    types::{AccessToken, AudioFeatures, AudioFeaturesResponse},
};

/// Maximum number of ids the audio features endpoint accepts per call.
pub const AUDIO_FEATURES_BATCH: usize = 100;

impl SpotifyClient {
    /// Fetches audio features for `track_ids` in batches, keeping input order.
    pub async fn get_audio_features(
        &self,
        token: &AccessToken,
        track_ids: &[String],
    ) -> Res<Vec<Option<AudioFeatures>>> {
        let mut features = Vec::with_capacity(track_ids.len());

        for chunk in track_ids.chunks(AUDIO_FEATURES_BATCH) {
            let response: AudioFeaturesResponse = self
                .get_json(token, &["audio-features"], &[("ids", chunk.join(","))])
                .await?;
            features.extend(response.audio_features);
        }

        Ok(features)
    }
}
