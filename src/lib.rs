//! spotdeck library
//!
//! Plays tracks from a Spotify library and cleans duplicate tracks out of
//! playlists and the saved library. The CLI in `main.rs` is a thin shell
//! around these modules.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration from environment variables and `.env`
//! - `management` - Token store, now-playing store, playback coordinator,
//!   player handles, library reconciliation and the removal dialog
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client and capability traits
//! - `types` - Data structures and type definitions
//! - `utils` - Pure helpers (PKCE, duplicate detection, batching)
//!
//! # Example
//!
//! ```
//! use spotdeck::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> spotdeck::Res<()> {
//!     config::load_env().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Result type for top-level plumbing where any error can surface.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational line with a blue `o` marker.
///
/// ```
/// info!("Fetching {} tracks...", total);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success line with a green checkmark.
///
/// ```
/// success!("Removed {} duplicates", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error line with a red `!` marker and exits with status 1.
///
/// Only for fatal errors in the CLI layer; library code returns `Result`.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning line with a yellow `!` marker.
///
/// ```
/// warning!("No device found, only the playing context was recorded");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
