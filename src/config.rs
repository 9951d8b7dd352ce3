//! Configuration management for spotdeck.
//!
//! Values come from environment variables, optionally loaded from a `.env`
//! file in the local data directory:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in `<data_local_dir>/spotdeck/`
//! 3. Spotify's public endpoints as defaults for the URL settings

use std::{env, path::PathBuf, time::Duration};

const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_SCOPE: &str = "user-read-private user-library-read user-library-modify user-top-read playlist-read-private playlist-modify-private playlist-modify-public user-read-playback-state user-modify-playback-state";
const DEFAULT_DEVICE_WAIT_SECS: u64 = 10;

/// Root of everything spotdeck keeps on disk.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotdeck");
    path
}

/// Loads environment variables from `<data_local_dir>/spotdeck/.env`.
///
/// The directory is created when missing. A missing `.env` file is not an
/// error, since every setting can also come from the process environment.
///
/// # Example
///
/// ```
/// if let Err(e) = spotdeck::config::load_env().await {
///     eprintln!("Configuration error: {}", e);
/// }
/// ```
pub async fn load_env() -> Result<(), String> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| e.to_string())?;

    let path = dir.join(".env");
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn required(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("{} must be set", name))
}

fn with_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Address the local OAuth callback server binds to, e.g. `127.0.0.1:8888`.
pub fn server_addr() -> Result<String, String> {
    required("SERVER_ADDRESS")
}

/// Client id of the application registered on Spotify's developer dashboard.
pub fn spotify_client_id() -> Result<String, String> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Callback URL registered for the application. Must point at `server_addr()`.
pub fn spotify_redirect_uri() -> Result<String, String> {
    required("SPOTIFY_API_REDIRECT_URI")
}

pub fn spotify_scope() -> String {
    with_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    with_default("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn spotify_apiurl() -> String {
    with_default("SPOTIFY_API_URL", DEFAULT_API_URL)
}

pub fn spotify_apitoken_url() -> String {
    with_default("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// How long playback waits for a Spotify Connect device to show up.
pub fn device_wait() -> Duration {
    let secs = env::var("SPOTDECK_DEVICE_WAIT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_DEVICE_WAIT_SECS);
    Duration::from_secs(secs)
}
