//! # CLI Module
//!
//! Command implementations behind the `spotdeck` binary. Each command loads
//! the stored token, talks to Spotify through [`crate::spotify::SpotifyClient`]
//! and hands the real work to [`crate::management`].
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Management Layer (Coordinator, TrackListManager, DuplicateCleanup)
//!     ↓
//! Spotify Layer (PlayerApi, LibraryApi)
//! ```
//!
//! ## Commands
//!
//! - [`auth`] - OAuth PKCE login, stores the token
//! - [`me`] - profile and subscription tier
//! - [`list_tracks`] - playlist, saved library or top tracks as a table
//! - [`play`], [`pause`], [`toggle`], [`seek`] - playback through the coordinator
//! - [`dedupe`] - find duplicate tracks and remove them after confirmation
//! - [`remove`] - remove a single track from a playlist or the library
//!
//! ## Usage
//!
//! ```bash
//! spotdeck auth
//! spotdeck tracks --playlist 37i9dQZF1DXcBWIGoYBM5M
//! spotdeck play 4 --playlist 37i9dQZF1DXcBWIGoYBM5M
//! spotdeck dedupe --library
//! ```

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    error,
    management::{TokenManager, TrackSource, resolve_library, resolve_playlist},
    spotify::{ApiError, SpotifyClient},
};

mod auth;
mod dedupe;
mod me;
mod play;
mod tracks;

pub use auth::auth;
pub use dedupe::{dedupe, remove};
pub use me::me;
pub use play::{pause, play, seek, toggle};
pub use tracks::list_tracks;

/// Which track list a command works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Playlist(String),
    Library,
    Top,
}

/// Number of long-term top tracks fetched for `--top`.
const TOP_TRACKS_LIMIT: usize = 50;

async fn access_token() -> String {
    let mut token_mgr = match TokenManager::load().await {
        Ok(t) => t,
        Err(e) => {
            error!(
                "Failed to load token. Please run spotdeck auth\n Error: {}",
                e
            );
        }
    };
    token_mgr.get_valid_token().await
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

async fn resolve_source(
    client: &SpotifyClient,
    token: &str,
    source: &Source,
) -> Result<Option<TrackSource>, ApiError> {
    match source {
        Source::Playlist(id) => resolve_playlist(client, token, id).await.map(Some),
        Source::Library => resolve_library(client, token).await.map(Some),
        Source::Top => Ok(None),
    }
}
