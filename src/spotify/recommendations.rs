use crate::{
    Res,
    spotify::SpotifyClient,
    types::{AccessToken, RecommendationsResponse, Track},
};

impl SpotifyClient {
    /// Requests up to `limit` recommended tracks for the given seed tracks.
    pub async fn get_recommendations(
        &self,
        token: &AccessToken,
        seed_track_ids: &[String],
        limit: u8,
    ) -> Res<Vec<Track>> {
        let response: RecommendationsResponse = self
            .get_json(
                token,
                &["recommendations"],
                &[
                    ("seed_tracks", seed_track_ids.join(",")),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(response.tracks)
    }
}
