//! # CLI Module
//!
//! User-facing commands of plsort. Each command builds the engine from the
//! configuration, runs one operation and reports the outcome with the
//! colored status macros.
//!
//! ## Commands
//!
//! - [`playlists`] - Lists the user's playlists, optionally filtered by name
//! - [`sort`] - Sorts one playlist by a sort key, or previews the new order
//! - [`keys`] - Lists the available sort keys
//!
//! ## Usage
//!
//! ```bash
//! plsort playlists                           # Show playlists and their ids
//! plsort sort "Road Trip" --by artist        # Sort by first artist
//! plsort sort 37i9dQZF1DX --by "release date" --dry-run
//! ```
//!
//! Fatal problems (missing token, unknown playlist) end the process with
//! exit code 1 through [`crate::error!`].

mod keys;
mod playlists;
mod sort;

use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

pub use keys::keys;
pub use playlists::playlists;
pub use sort::sort;

use crate::{config, engine::SortOrchestrator, error, spotify::SpotifyClient};

/// Builds the engine on top of the Spotify client, or exits.
pub(crate) fn build_engine() -> SortOrchestrator {
    let settings = match config::Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!(
            "Invalid configuration: {}\nEdit {}",
            e,
            config::env_path().display()
        ),
    };

    let client = match SpotifyClient::new(
        settings.credential,
        settings.api_url,
        settings.page_size,
        settings.timeout,
    ) {
        Ok(client) => client,
        Err(e) => error!("Cannot create HTTP client: {}", e),
    };

    SortOrchestrator::new(Arc::new(client), settings.engine)
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
