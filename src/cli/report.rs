use std::sync::Arc;

use tabled::{Table, builder::Builder};

use crate::{
    Res,
    api::AppState,
    cli::{load_settings, login, spinner},
    error,
    error::AppError,
    info,
    management::{PlaylistData, SharedSession, run_authorized},
    success,
    types::{
        Feature, MapMarkerTableRow, Playlist, PlaylistTableRow, TrackRow, TrackTableRow,
    },
    utils, warning,
};

/// Prints the views of one playlist, or the user's playlists when none is given.
///
/// `playlist` matches a playlist id or, case-insensitively, its name.
pub async fn report(
    playlist: Option<String>,
    features: Vec<Feature>,
    recommend: Option<u8>,
    map: bool,
) {
    let settings = load_settings();
    let state = match AppState::from_settings(&settings) {
        Ok(state) => state,
        Err(e) => error!("Cannot set up service clients: {}", e),
    };

    let session = login(&settings, Arc::clone(&state.authorizer)).await;

    let pb = spinner("Fetching playlists...");
    let playlists = run_authorized(&session, |token, _| {
        let streaming = &state.streaming;
        async move { streaming.current_user_playlists(&token).await }
    })
    .await;
    pb.finish_and_clear();

    let playlists = match playlists {
        Ok(playlists) => playlists,
        Err(e) => error!("Failed to fetch playlists: {}", e),
    };

    let Some(wanted) = playlist else {
        print_playlists(&playlists);
        info!("Pass --playlist <id|name> to analyze one of them.");
        return;
    };

    let Some(selected) = find_playlist(&playlists, &wanted) else {
        error!("No playlist matches '{}'", wanted);
    };

    let pb = spinner(&format!("Analyzing {}...", selected.name));
    let data = run_authorized(&session, |token, caches| {
        let aggregator = &state.aggregator;
        let id = selected.id.as_str();
        async move { aggregator.aggregate(&token, &caches, id).await }
    })
    .await;
    pb.finish_and_clear();

    let data = match data {
        Ok(data) => data,
        Err(e) => error!("Failed to analyze {}: {}", selected.name, e),
    };

    print_views(&selected.name, &data, &features);

    if map {
        print_map(&state, &session, &data).await;
    }

    if let Some(count) = recommend {
        print_recommendations(&state, &session, &data, count).await;
    }
}

pub(crate) fn find_playlist<'a>(playlists: &'a [Playlist], wanted: &str) -> Option<&'a Playlist> {
    let wanted = wanted.trim();
    playlists
        .iter()
        .find(|p| p.id == wanted)
        .or_else(|| playlists.iter().find(|p| p.name.eq_ignore_ascii_case(wanted)))
}

fn print_playlists(playlists: &[Playlist]) {
    if playlists.is_empty() {
        warning!("No playlists found for this account.");
        return;
    }

    let rows: Vec<PlaylistTableRow> = playlists
        .iter()
        .map(|p| PlaylistTableRow {
            id: p.id.clone(),
            name: p.name.clone(),
            tracks: p
                .tracks
                .as_ref()
                .map(|t| t.total.to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    println!("{}", Table::new(rows));
}

fn print_views(name: &str, data: &PlaylistData, features: &[Feature]) {
    if data.tracks.is_empty() {
        warning!("{} has no tracks.", name);
        return;
    }

    info!("Tracks in {}:", name);
    for line in data.track_listing() {
        println!("  {}", line);
    }

    let tempo = data.tempo_by_track();
    if tempo.is_empty() {
        warning!("No tempo data available for the selected tracks.");
    } else {
        let mut builder = Builder::default();
        builder.push_record(["Track", "BPM"]);
        for point in tempo {
            builder.push_record([point.track, format!("{:.1}", point.tempo)]);
        }
        info!("Tempo:");
        println!("{}", builder.build());
    }

    let genres = data.genre_counts();
    if genres.is_empty() {
        warning!("No genre data available for this playlist.");
    } else {
        let mut builder = Builder::default();
        builder.push_record(["Genre", "Songs"]);
        for genre in genres {
            builder.push_record([genre.genre, genre.count.to_string()]);
        }
        info!("Genres:");
        println!("{}", builder.build());
    }

    if !features.is_empty() {
        let matrix = data.feature_matrix(features);
        let mut builder = Builder::default();
        builder.push_record(
            std::iter::once("Track".to_string()).chain(features.iter().map(|f| f.to_string())),
        );
        for row in matrix.rows {
            builder.push_record(
                std::iter::once(row.track)
                    .chain(row.values.into_iter().map(|v| utils::format_optional(v, 3))),
            );
        }
        info!("Audio features:");
        println!("{}", builder.build());
    }

    let rows: Vec<TrackTableRow> = data.track_table().into_iter().map(track_table_row).collect();
    info!("Track details:");
    println!("{}", Table::new(rows));

    let artists = data.artist_genres();
    if !artists.is_empty() {
        info!("Artists and genres:");
        println!("{}", Table::new(artists));
    }
}

fn track_table_row(row: TrackRow) -> TrackTableRow {
    TrackTableRow {
        name: row.name,
        artists: row.artists,
        album: row.album,
        released: row.release_date,
        minutes: format!("{:.2}", row.duration_min),
        popularity: row.popularity,
        dance: utils::format_optional(row.danceability, 3),
        energy: utils::format_optional(row.energy, 3),
        valence: utils::format_optional(row.valence, 3),
        bpm: utils::format_optional(row.tempo, 1),
        db: utils::format_optional(row.loudness, 1),
    }
}

async fn print_map(state: &AppState, session: &SharedSession, data: &PlaylistData) {
    let pb = spinner("Locating artists...");
    let markers = run_authorized(session, |_, caches| {
        let geo = &state.geo;
        let artists = data.artists.as_slice();
        async move { Ok::<_, AppError>(geo.resolve(artists, &caches).await) }
    })
    .await;
    pb.finish_and_clear();

    match markers {
        Ok(markers) if markers.is_empty() => {
            warning!("None of the artists could be placed on the map.")
        }
        Ok(markers) => {
            let rows: Vec<MapMarkerTableRow> = markers
                .into_iter()
                .map(|m| MapMarkerTableRow {
                    artist: m.artist,
                    city: m.city,
                    latitude: format!("{:.4}", m.latitude),
                    longitude: format!("{:.4}", m.longitude),
                })
                .collect();
            info!("Artist origins:");
            println!("{}", Table::new(rows));
        }
        Err(e) => warning!("Cannot build the artist map: {}", e),
    }
}

async fn print_recommendations(
    state: &AppState,
    session: &SharedSession,
    data: &PlaylistData,
    count: u8,
) {
    let pb = spinner("Fetching recommendations...");
    let songs: Res<Vec<String>> = run_authorized(session, |token, _| {
        let recommender = &state.recommender;
        let tracks = data.tracks.as_slice();
        async move { recommender.recommend(&token, tracks, count).await }
    })
    .await;
    pb.finish_and_clear();

    match songs {
        Ok(songs) if songs.is_empty() => warning!("No recommendations were returned."),
        Ok(songs) => {
            success!("Recommended songs:");
            for (i, song) in songs.iter().enumerate() {
                println!("  {}. {}", i + 1, song);
            }
        }
        Err(e) => warning!("Cannot fetch recommendations: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(id: &str, name: &str) -> Playlist {
        Playlist {
            id: id.to_string(),
            name: name.to_string(),
            owner: None,
            tracks: None,
        }
    }

    #[test]
    fn finds_playlist_by_id_before_name() {
        let playlists = vec![playlist("abc", "Road Trip"), playlist("road trip", "Other")];

        assert_eq!(find_playlist(&playlists, "road trip").map(|p| p.name.as_str()), Some("Other"));
        assert_eq!(find_playlist(&playlists, "ROAD TRIP").map(|p| p.id.as_str()), Some("abc"));
        assert!(find_playlist(&playlists, "missing").is_none());
    }
}
