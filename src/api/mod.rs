//! # API Module
//!
//! HTTP handlers for the short-lived local server that `spotdeck auth` runs:
//!
//! - [`callback`] - receives Spotify's redirect, exchanges the authorization
//!   code with the PKCE verifier and stores the token in the shared state
//! - [`health`] - reports status and version
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use spotdeck::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
