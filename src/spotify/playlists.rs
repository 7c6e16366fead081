use crate::{
    Res,
    spotify::SpotifyClient,
    types::{
        AccessToken, GetUserPlaylistsResponse, Playlist, PlaylistTracksResponse, Track,
    },
};

/// Page size of the playlist picker; later pages are not fetched.
pub const PLAYLIST_PAGE_LIMIT: u32 = 50;

/// Page size of a playlist's track listing; later pages are not fetched.
pub const TRACK_PAGE_LIMIT: u32 = 100;

impl SpotifyClient {
    /// Retrieves the first page of the current user's playlists.
    pub async fn get_current_user_playlists(&self, token: &AccessToken) -> Res<Vec<Playlist>> {
        let response: GetUserPlaylistsResponse = self
            .get_json(
                token,
                &["me", "playlists"],
                &[("limit", PLAYLIST_PAGE_LIMIT.to_string())],
            )
            .await?;

        tracing::debug!(count = response.items.len(), "Fetched playlists");
        Ok(response.items)
    }

    /// Retrieves the first page of a playlist's tracks.
    ///
    /// Items without a track (removed or unavailable entries) are skipped.
    pub async fn get_playlist_tracks(
        &self,
        token: &AccessToken,
        playlist_id: &str,
    ) -> Res<Vec<Track>> {
        let response: PlaylistTracksResponse = self
            .get_json(
                token,
                &["playlists", playlist_id, "tracks"],
                &[("limit", TRACK_PAGE_LIMIT.to_string())],
            )
            .await?;

        let tracks: Vec<Track> = response
            .items
            .into_iter()
            .filter_map(|item| item.track)
            .collect();

        tracing::debug!(playlist = %playlist_id, count = tracks.len(), "Fetched playlist tracks");
        Ok(tracks)
    }
}
