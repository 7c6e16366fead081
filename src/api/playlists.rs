use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::{
    Res,
    api::{AppState, existing_session},
    error::AppError,
    management::{artist_genre_rows, run_authorized},
    types::{ArtistGenresRow, Feature, MapMarker, Playlist, PlaylistStats},
    utils,
};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Comma separated feature names, e.g. `valence,energy`.
    pub features: Option<String>,
}

impl StatsQuery {
    fn selected_features(&self) -> Res<Vec<Feature>> {
        match self.features.as_deref() {
            None => Ok(Feature::DEFAULT_SELECTION.to_vec()),
            Some(raw) => utils::parse_list(raw).map_err(AppError::Validation),
        }
    }
}

pub async fn list_playlists(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Res<Json<Vec<Playlist>>> {
    let session = existing_session(&state, &jar).await?;
    let playlists = run_authorized(&session, |token, _| async move {
        state.streaming.current_user_playlists(&token).await
    })
    .await?;

    Ok(Json(playlists))
}

pub async fn playlist_stats(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(playlist_id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Res<Json<PlaylistStats>> {
    let selected = query.selected_features()?;
    let session = existing_session(&state, &jar).await?;

    let data = run_authorized(&session, |token, caches| async move {
        state
            .aggregator
            .aggregate(&token, &caches, &playlist_id)
            .await
    })
    .await?;

    Ok(Json(data.stats(&selected)))
}

/// Primary artists of the playlist with their genres.
pub async fn playlist_artists(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(playlist_id): Path<String>,
) -> Res<Json<Vec<ArtistGenresRow>>> {
    let session = existing_session(&state, &jar).await?;

    let artists = run_authorized(&session, |token, caches| async move {
        state
            .aggregator
            .primary_artists(&token, &caches, &playlist_id)
            .await
    })
    .await?;

    Ok(Json(artist_genre_rows(&artists)))
}

/// Origin markers of the playlist's primary artists. Artists that cannot be
/// placed are missing from the list, they do not fail the request.
pub async fn playlist_map(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(playlist_id): Path<String>,
) -> Res<Json<Vec<MapMarker>>> {
    let session = existing_session(&state, &jar).await?;

    let markers = run_authorized(&session, |token, caches| async move {
        let artists = state
            .aggregator
            .primary_artists(&token, &caches, &playlist_id)
            .await?;
        Ok::<_, AppError>(state.geo.resolve(&artists, &caches).await)
    })
    .await?;

    Ok(Json(markers))
}
