use std::{io, sync::Arc};

use async_trait::async_trait;

use crate::{
    management::PlaybackError,
    spotify::PlayerApi,
    types::{PlayRequest, Track},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    /// Plays 30 second preview clips locally; used for free accounts.
    Preview,
    /// Drives a Spotify Connect device; used for premium accounts.
    Remote,
}

/// The capabilities the playback coordinator needs from whichever player is
/// active.
#[async_trait]
pub trait PlayerHandle: Send {
    fn kind(&self) -> PlayerKind;

    fn set_source(&mut self, source: &str);

    /// Hands the player the surrounding track list so it can step through it
    /// on its own. Players that keep their queue remotely ignore it.
    fn set_queue(&mut self, tracks: Vec<Track>);

    async fn play(&mut self) -> Result<(), PlaybackError>;

    async fn pause(&mut self) -> Result<(), PlaybackError>;

    /// Flips between playing and paused; returns whether it is now playing.
    async fn toggle(&mut self) -> Result<bool, PlaybackError>;

    async fn seek(&mut self, position_ms: u64) -> Result<(), PlaybackError>;
}

type Launcher = fn(&str) -> io::Result<()>;

/// Local preview player.
///
/// Behaves like a media element: a source, a current time and a play/pause
/// flag. Actual audio output is delegated to the launcher, which by default
/// hands the preview URL to the system's default handler.
pub struct PreviewPlayer {
    src: Option<String>,
    current_time_ms: u64,
    queue: Vec<Track>,
    paused: bool,
    launcher: Launcher,
}

impl Default for PreviewPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewPlayer {
    pub fn new() -> Self {
        Self::with_launcher(webbrowser::open)
    }

    pub fn with_launcher(launcher: Launcher) -> Self {
        Self {
            src: None,
            current_time_ms: 0,
            queue: Vec::new(),
            paused: true,
            launcher,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn current_time_ms(&self) -> u64 {
        self.current_time_ms
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The queued track `step` entries away from the one whose preview is
    /// loaded, skipping tracks without a preview.
    pub fn adjacent(&self, step: isize) -> Option<&Track> {
        let src = self.src.as_deref()?;
        let current = self
            .queue
            .iter()
            .position(|t| t.preview_url.as_deref() == Some(src))?;

        let playable: Vec<(usize, &Track)> = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, t)| t.preview_url.is_some())
            .collect();
        let at = playable.iter().position(|(i, _)| *i == current)?;
        let target = at as isize + step;
        if target < 0 {
            return None;
        }
        playable.get(target as usize).map(|(_, t)| *t)
    }
}

#[async_trait]
impl PlayerHandle for PreviewPlayer {
    fn kind(&self) -> PlayerKind {
        PlayerKind::Preview
    }

    fn set_source(&mut self, source: &str) {
        self.src = Some(source.to_string());
    }

    fn set_queue(&mut self, tracks: Vec<Track>) {
        self.queue = tracks;
    }

    async fn play(&mut self) -> Result<(), PlaybackError> {
        let Some(src) = self.src.as_deref() else {
            return Err(PlaybackError::Media("no preview source loaded".to_string()));
        };
        (self.launcher)(src).map_err(|e| PlaybackError::Media(e.to_string()))?;
        self.paused = false;
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), PlaybackError> {
        self.paused = true;
        Ok(())
    }

    async fn toggle(&mut self) -> Result<bool, PlaybackError> {
        if self.paused {
            self.play().await?;
        } else {
            self.pause().await?;
        }
        Ok(!self.paused)
    }

    async fn seek(&mut self, position_ms: u64) -> Result<(), PlaybackError> {
        self.current_time_ms = position_ms;
        Ok(())
    }
}

/// Remote player bound to one Spotify Connect device.
pub struct RemotePlayer {
    api: Arc<dyn PlayerApi>,
    token: String,
    device_id: String,
    pending_uri: Option<String>,
    paused: bool,
}

impl RemotePlayer {
    pub fn new(api: Arc<dyn PlayerApi>, token: String, device_id: String) -> Self {
        Self {
            api,
            token,
            device_id,
            pending_uri: None,
            paused: true,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

#[async_trait]
impl PlayerHandle for RemotePlayer {
    fn kind(&self) -> PlayerKind {
        PlayerKind::Remote
    }

    fn set_source(&mut self, source: &str) {
        self.pending_uri = Some(source.to_string());
    }

    fn set_queue(&mut self, _tracks: Vec<Track>) {}

    async fn play(&mut self) -> Result<(), PlaybackError> {
        match self.pending_uri.take() {
            Some(uri) => {
                let request = PlayRequest::for_uris(vec![uri], 0);
                self.api.play(&self.token, &self.device_id, &request).await?
            }
            None => self.api.resume(&self.token, &self.device_id).await?,
        }
        self.paused = false;
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), PlaybackError> {
        self.api.pause(&self.token, &self.device_id).await?;
        self.paused = true;
        Ok(())
    }

    async fn toggle(&mut self) -> Result<bool, PlaybackError> {
        if self.paused {
            self.play().await?;
        } else {
            self.pause().await?;
        }
        Ok(!self.paused)
    }

    async fn seek(&mut self, position_ms: u64) -> Result<(), PlaybackError> {
        self.api
            .seek(&self.token, &self.device_id, position_ms)
            .await?;
        Ok(())
    }
}
