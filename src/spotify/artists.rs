use crate::{
    Res,
    spotify::SpotifyClient,
    types::{AccessToken, Artist},
};

impl SpotifyClient {
    pub async fn get_artist(&self, token: &AccessToken, artist_id: &str) -> Res<Artist> {
        self.get_json(token, &["artists", artist_id], &[])
            .await
    }
}
