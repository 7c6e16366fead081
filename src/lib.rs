//! Spotify Playlist Analyzer Library
//!
//! This library provides the building blocks of the playlist analyzer: an OAuth
//! session per user, clients for the Spotify Web API, Google Geocoding and
//! MusicBrainz, the aggregation of a playlist into chart friendly views, the
//! artist origin map, recommendations and the vinyl cover compositor.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the dashboard
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy shared by all layers
//! - `geocoding` - Google Geocoding API client
//! - `management` - Sessions, caches and the data pipelines
//! - `musicbrainz` - MusicBrainz artist origin lookup
//! - `server` - Dashboard and login callback servers
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//! - `vinyl` - Vinyl record image compositor

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod management;
pub mod musicbrainz;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;
pub mod vinyl;

pub use error::{AppError, AuthError, Service};

/// Result type used throughout the crate.
pub type Res<T> = std::result::Result<T, AppError>;

// Terminal output of the CLI. Library code logs through `tracing` instead.

/// Prints an informational line with a blue bullet.
///
/// ```
/// info!("Fetching playlist {}", playlist_id);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success line with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error line and terminates the process with exit code 1.
///
/// Only for failures the CLI cannot continue after, such as missing
/// configuration or a failed login.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning line with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
