use std::fmt;

use reqwest::StatusCode;

#[derive(Debug)]
pub enum ApiError {
    Transport(reqwest::Error),
    Status { status: StatusCode, body: String },
    SnapshotConflict(String),
    Decode(serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Transport(e) => e.status(),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(e) => write!(f, "request failed: {}", e),
            ApiError::Status { status, body } if body.is_empty() => {
                write!(f, "Spotify answered {}", status)
            }
            ApiError::Status { status, body } => write!(f, "Spotify answered {}: {}", status, body),
            ApiError::SnapshotConflict(snapshot) => write!(
                f,
                "playlist changed since snapshot {}; reload it and try again",
                snapshot
            ),
            ApiError::Decode(e) => write!(f, "unexpected response: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(e) => Some(e),
            ApiError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err)
    }
}
