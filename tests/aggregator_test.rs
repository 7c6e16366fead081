mod common;

use std::sync::Arc;

use common::{FakeStreaming, TEST_TOKEN, artist, features, track};
use playlist_analyzer::{
    management::{DataAggregator, PlaylistData, SessionCaches, primary_artist_ids},
    types::{AccessToken, Feature},
};

fn catalog() -> FakeStreaming {
    let mut api = FakeStreaming {
        tracks: vec![
            track("t1", "Intro", "a1", "Alpha"),
            track("t2", "Second", "a2", "Beta"),
            track("t3", "Third", "a1", "Alpha"),
        ],
        ..Default::default()
    };
    // t2 has no audio features
    api.features.insert("t1".into(), features("t1", 120.0));
    api.features.insert("t3".into(), features("t3", 90.0));
    api.artists
        .insert("a1".into(), artist("a1", "Alpha", &["indie", "rock"]));
    api.artists.insert("a2".into(), artist("a2", "Beta", &["rock"]));
    api
}

async fn aggregate(api: Arc<FakeStreaming>, caches: &SessionCaches) -> PlaylistData {
    DataAggregator::new(api, 4)
        .aggregate(&AccessToken::new(TEST_TOKEN), caches, "playlist")
        .await
        .unwrap()
}

#[tokio::test]
async fn test_views_have_one_row_per_track() {
    let data = aggregate(Arc::new(catalog()), &SessionCaches::default()).await;

    assert_eq!(data.track_listing().len(), 3);
    assert_eq!(data.track_table().len(), 3);
    assert_eq!(data.feature_matrix(&Feature::DEFAULT_SELECTION).rows.len(), 3);
    assert_eq!(data.track_listing()[0], "1. Intro - Alpha");
}

#[tokio::test]
async fn test_features_are_joined_by_track_id() {
    let data = aggregate(Arc::new(catalog()), &SessionCaches::default()).await;

    let matrix = data.feature_matrix(&[Feature::Tempo]);
    assert_eq!(matrix.rows[0].values, vec![Some(120.0)]);
    assert_eq!(matrix.rows[1].values, vec![None]);
    assert_eq!(matrix.rows[2].values, vec![Some(90.0)]);

    let table = data.track_table();
    assert_eq!(table[1].tempo, None);
    assert_eq!(table[2].tempo, Some(90.0));
    assert_eq!(table[0].duration_min, 3.0);
}

#[tokio::test]
async fn test_tempo_skips_tracks_without_features() {
    let data = aggregate(Arc::new(catalog()), &SessionCaches::default()).await;

    let tempo = data.tempo_by_track();
    let names: Vec<&str> = tempo.iter().map(|p| p.track.as_str()).collect();
    assert_eq!(names, vec!["Intro", "Third"]);
}

#[tokio::test]
async fn test_genres_counted_over_distinct_primary_artists() {
    let data = aggregate(Arc::new(catalog()), &SessionCaches::default()).await;

    let genres: Vec<(String, usize)> = data
        .genre_counts()
        .into_iter()
        .map(|g| (g.genre, g.count))
        .collect();
    assert_eq!(
        genres,
        vec![("indie".to_string(), 1), ("rock".to_string(), 2)]
    );

    let artists = data.artist_genres();
    assert_eq!(artists.len(), 2);
    assert_eq!(artists[0].genres, "indie, rock");
}

#[tokio::test]
async fn test_artists_are_cached_per_session() {
    let api = Arc::new(catalog());
    let caches = SessionCaches::default();

    aggregate(Arc::clone(&api), &caches).await;
    aggregate(Arc::clone(&api), &caches).await;

    assert_eq!(api.artist_call_count(), 2);
    assert_eq!(caches.artists.len(), 2);
}

#[tokio::test]
async fn test_empty_playlist_gives_empty_views() {
    let api = Arc::new(FakeStreaming::default());
    let data = aggregate(Arc::clone(&api), &SessionCaches::default()).await;

    let stats = data.stats(&Feature::DEFAULT_SELECTION);
    assert!(stats.tracks.is_empty());
    assert!(stats.tempo.is_empty());
    assert!(stats.genres.is_empty());
    assert!(stats.features.rows.is_empty());
    assert!(stats.table.is_empty());
    assert_eq!(
        api.feature_calls.load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn test_failing_artist_call_aborts_aggregation() {
    let mut api = catalog();
    api.artists.remove("a2");

    let result = DataAggregator::new(Arc::new(api), 2)
        .aggregate(
            &AccessToken::new(TEST_TOKEN),
            &SessionCaches::default(),
            "playlist",
        )
        .await;

    assert!(result.is_err());
}

#[test]
fn test_repeated_track_name_keeps_first_position() {
    let tracks = vec![
        track("t1", "Same", "a1", "Alpha"),
        track("t2", "Other", "a1", "Alpha"),
        track("t3", "Same", "a1", "Alpha"),
    ];
    let data = PlaylistData::new(
        tracks,
        vec![
            features("t1", 100.0),
            features("t2", 110.0),
            features("t3", 130.0),
        ],
        vec![],
    );

    let tempo = data.tempo_by_track();
    assert_eq!(tempo.len(), 2);
    assert_eq!(tempo[0].track, "Same");
    assert_eq!(tempo[0].tempo, 130.0);
}

#[test]
fn test_primary_artist_ids_deduplicated_in_order() {
    let tracks = vec![
        track("t1", "One", "a2", "Beta"),
        track("t2", "Two", "a1", "Alpha"),
        track("t3", "Three", "a2", "Beta"),
    ];

    assert_eq!(primary_artist_ids(&tracks), vec!["a2", "a1"]);
}
