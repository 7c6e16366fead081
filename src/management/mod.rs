mod aggregator;
mod cache;
mod geo;
mod recommend;
mod session;

pub use aggregator::{DataAggregator, PlaylistData, artist_genre_rows, primary_artist_ids};
pub use cache::LookupCache;
pub use geo::GeoResolver;
pub use recommend::{
    DEFAULT_RECOMMENDATION_COUNT, MAX_SEED_TRACKS, RECOMMENDATION_COUNT,
    RecommendationRequester, display_name, seed_track_ids, validate_count,
};
pub use session::{
    AuthState, LoginOutcome, Session, SessionCaches, SessionStore, SharedSession, run_authorized,
};
