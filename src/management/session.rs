use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

use crate::{
    config,
    management::NowPlaying,
    spotify::{ApiError, PlayerApi},
};

#[derive(Debug)]
pub enum SessionError {
    IoError(std::io::Error),
    SerdeError(serde_json::Error),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::IoError(e) => write!(f, "{}", e),
            SessionError::SerdeError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::IoError(err)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::SerdeError(err)
    }
}

/// What survives between two CLI invocations: the chosen device and the
/// now-playing record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub device_id: Option<String>,
    pub premium: bool,
    #[serde(default)]
    pub now_playing: NowPlaying,
}

pub struct SessionManager {
    path: PathBuf,
    state: SessionState,
}

impl SessionManager {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: SessionState::default(),
        }
    }

    /// Session file in the data dir; starts empty when there is none yet.
    pub async fn load_default() -> Self {
        let mut manager = Self::new(Self::default_path());
        if let Ok(state) = manager.read().await {
            manager.state = state;
        }
        manager
    }

    async fn read(&self) -> Result<SessionState, SessionError> {
        let json = async_fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&json)?)
    }

    pub async fn load(path: PathBuf) -> Result<Self, SessionError> {
        let mut manager = Self::new(path);
        manager.state = manager.read().await?;
        Ok(manager)
    }

    pub async fn persist(&self) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&self.state)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    fn default_path() -> PathBuf {
        config::data_dir().join("state/session.json")
    }
}

/// Waits for a Spotify Connect device to become available.
///
/// Polls once per second until `max_wait` has passed. `preferred` wins when
/// it is listed, then the active device, then the first one with an id.
pub async fn wait_for_device(
    api: &dyn PlayerApi,
    token: &str,
    preferred: Option<&str>,
    max_wait: Duration,
) -> Result<Option<String>, ApiError> {
    let start = Instant::now();

    loop {
        let devices = api.devices(token).await?;

        let preferred_match = preferred.and_then(|wanted| {
            devices
                .iter()
                .find(|d| d.id.as_deref() == Some(wanted))
                .and_then(|d| d.id.clone())
        });
        let chosen = preferred_match
            .or_else(|| devices.iter().find(|d| d.is_active).and_then(|d| d.id.clone()))
            .or_else(|| devices.iter().find_map(|d| d.id.clone()));

        if chosen.is_some() {
            return Ok(chosen);
        }
        if start.elapsed() >= max_wait {
            return Ok(None);
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}
