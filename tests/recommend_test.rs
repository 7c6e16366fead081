mod common;

use std::sync::{Arc, atomic::Ordering};

use common::{FakeStreaming, TEST_TOKEN, track};
use playlist_analyzer::{
    AppError,
    management::{
        MAX_SEED_TRACKS, RecommendationRequester, display_name, seed_track_ids, validate_count,
    },
    types::{AccessToken, Track},
};

fn numbered_tracks(n: usize) -> Vec<Track> {
    (0..n)
        .map(|i| track(&format!("t{i}"), &format!("Song {i}"), "a1", "Alpha"))
        .collect()
}

#[test]
fn test_seeds_use_at_most_five_tracks() {
    assert_eq!(seed_track_ids(&numbered_tracks(3)).len(), 3);
    assert_eq!(seed_track_ids(&numbered_tracks(12)).len(), MAX_SEED_TRACKS);
    assert_eq!(
        seed_track_ids(&numbered_tracks(12))[0],
        "t0".to_string()
    );
}

#[test]
fn test_seeds_skip_tracks_without_id() {
    let mut tracks = numbered_tracks(2);
    tracks[0].id = None;

    assert_eq!(seed_track_ids(&tracks), vec!["t1"]);
}

#[test]
fn test_count_bounds() {
    assert!(validate_count(0).is_err());
    assert_eq!(validate_count(1).unwrap(), 1);
    assert_eq!(validate_count(25).unwrap(), 25);
    assert!(matches!(validate_count(26), Err(AppError::Validation(_))));
}

#[test]
fn test_display_name_uses_primary_artist() {
    let mut song = track("t1", "Song", "a1", "Alpha");
    assert_eq!(display_name(&song), "Song – Alpha");

    song.artists.clear();
    assert_eq!(display_name(&song), "Song");
}

#[tokio::test]
async fn test_result_never_exceeds_requested_count() {
    let api = Arc::new(FakeStreaming {
        recommended: numbered_tracks(30),
        ..Default::default()
    });
    let requester = RecommendationRequester::new(api);
    let token = AccessToken::new(TEST_TOKEN);
    let seeds = numbered_tracks(8);

    for count in 1..=25u8 {
        let songs = requester.recommend(&token, &seeds, count).await.unwrap();
        assert_eq!(songs.len(), count as usize);
    }
}

#[tokio::test]
async fn test_shorter_answer_is_returned_as_is() {
    let api = Arc::new(FakeStreaming {
        recommended: numbered_tracks(2),
        ..Default::default()
    });
    let requester = RecommendationRequester::new(api);

    let songs = requester
        .recommend(&AccessToken::new(TEST_TOKEN), &numbered_tracks(1), 10)
        .await
        .unwrap();

    assert_eq!(songs, vec!["Song 0 – Alpha", "Song 1 – Alpha"]);
}

#[tokio::test]
async fn test_invalid_requests_make_no_call() {
    let api = Arc::new(FakeStreaming::default());
    let requester = RecommendationRequester::new(api.clone());
    let token = AccessToken::new(TEST_TOKEN);

    assert!(requester.recommend(&token, &numbered_tracks(3), 0).await.is_err());
    assert!(requester.recommend(&token, &[], 5).await.is_err());
    assert_eq!(api.recommendation_calls.load(Ordering::SeqCst), 0);
}
