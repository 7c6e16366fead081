//! # CLI Module
//!
//! Command implementations behind `main.rs`:
//!
//! - [`serve`] - runs the web dashboard
//! - [`report`] - logs in through the browser and prints a playlist's views
//!   as terminal tables
//! - [`vinyl`] - renders the vinyl cover of a local image file
//!
//! Commands report to the terminal with the crate's `info!`, `success!`,
//! `warning!` and `error!` macros; `error!` ends the process, so it is only
//! used where the command cannot go on.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{config::Settings, error};

mod auth;
mod report;
mod serve;
mod vinyl;

pub use auth::login;
pub use report::report;
pub use serve::serve;
pub use vinyl::vinyl;

/// Settings from the environment, or exit with the list of what is missing.
fn load_settings() -> Settings {
    match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!(
            "{}\nSet them in the environment or in {}",
            e,
            crate::config::env_file_path().display()
        ),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
