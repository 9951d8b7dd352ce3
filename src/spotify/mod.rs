//! # Spotify Integration Module
//!
//! Interface to the Spotify Web API used by spotdeck: authentication, the
//! remote-device playback controls and the library/playlist endpoints the
//! duplicate cleanup works against.
//!
//! ## Architecture
//!
//! ```text
//! CLI Layer
//!     ↓
//! Management Layer (playback coordinator, library reconciliation)
//!     ↓  PlayerApi / LibraryApi
//! SpotifyClient (reqwest, JSON)
//!     ↓
//! Spotify Web API
//! ```
//!
//! The management layer only sees the [`PlayerApi`] and [`LibraryApi`]
//! capability traits. [`SpotifyClient`] is the production implementation; the
//! integration tests plug in recording fakes.
//!
//! ## Authentication
//!
//! Every call takes the bearer token explicitly. Obtaining and refreshing it is
//! the job of [`auth`] and `management::TokenManager`.
//!
//! ## API Coverage
//!
//! - `GET /me`, `GET /me/top/tracks`, `GET /me/tracks/contains`
//! - `GET /me/player/devices`, `PUT /me/player/play`, `PUT /me/player/pause`,
//!   `PUT /me/player/seek`
//! - `GET /playlists/{id}`, `GET /playlists/{id}/tracks`,
//!   `DELETE /playlists/{id}/tracks`
//! - `GET /me/tracks`, `DELETE /me/tracks`
//! - `POST /api/token` (accounts service)
//!
//! ## Rate limiting
//!
//! Read requests that hit `429 Too Many Requests` wait for the `Retry-After`
//! delay once (up to 120 seconds) and are re-sent. Mutating requests are never
//! repeated.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::time::sleep;

use crate::{
    config,
    types::{Device, Page, PlayRequest, PlaylistDetails, PlaylistTrackItem, SavedTrackItem},
    warning,
};

pub mod auth;
mod error;
mod library;
mod player;
mod user;

pub use error::ApiError;

/// Longest `Retry-After` we are willing to sit through.
const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Remote-device playback controls (Spotify Connect).
#[async_trait]
pub trait PlayerApi: Send + Sync {
    async fn devices(&self, token: &str) -> Result<Vec<Device>, ApiError>;

    /// Starts playback of a context or URI list on `device_id`.
    async fn play(&self, token: &str, device_id: &str, request: &PlayRequest)
    -> Result<(), ApiError>;

    /// Resumes whatever the device had loaded.
    async fn resume(&self, token: &str, device_id: &str) -> Result<(), ApiError>;

    async fn pause(&self, token: &str, device_id: &str) -> Result<(), ApiError>;

    async fn seek(&self, token: &str, device_id: &str, position_ms: u64) -> Result<(), ApiError>;
}

/// Playlist and saved-library endpoints used for listing and removal.
#[async_trait]
pub trait LibraryApi: Send + Sync {
    async fn playlist(&self, token: &str, playlist_id: &str) -> Result<PlaylistDetails, ApiError>;

    async fn playlist_tracks(
        &self,
        token: &str,
        playlist_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<PlaylistTrackItem>, ApiError>;

    async fn saved_tracks(
        &self,
        token: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<SavedTrackItem>, ApiError>;

    /// Removes the tracks at `positions`, guarded by `snapshot_id`.
    /// Returns the playlist's new snapshot id.
    async fn remove_playlist_positions(
        &self,
        token: &str,
        playlist_id: &str,
        positions: &[usize],
        snapshot_id: &str,
    ) -> Result<String, ApiError>;

    /// Removes at most 50 tracks from the saved library.
    async fn remove_saved_tracks(&self, token: &str, ids: &[String]) -> Result<(), ApiError>;
}

/// reqwest-backed Web API client.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    base_url: String,
}

impl Default for SpotifyClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SpotifyClient {
    pub fn new() -> Self {
        Self::with_base_url(config::spotify_apiurl())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a mutating request and turns any non-success status into an error.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        check_status(response).await
    }

    /// Sends a `GET`, honouring one `Retry-After` on 429.
    async fn get(&self, token: &str, url: &str) -> Result<Response, ApiError> {
        let response = self.http.get(url).bearer_auth(token).send().await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(1);

            if retry_after <= MAX_RETRY_AFTER_SECS {
                sleep(Duration::from_secs(retry_after)).await;
                let retried = self.http.get(url).bearer_auth(token).send().await?;
                return check_status(retried).await;
            }

            warning!(
                "Retry after has reached an abnormal high of {} seconds.",
                retry_after
            );
        }

        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}
