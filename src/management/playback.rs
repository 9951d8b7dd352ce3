use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::{
    management::{NowPlayingStore, PlayerHandle, PlayerKind},
    spotify::{ApiError, PlayerApi},
    types::{PlayRequest, Track},
    utils,
};

#[derive(Debug)]
pub enum PlaybackError {
    Api(ApiError),
    /// The local media output failed.
    Media(String),
    /// The preview branch was chosen but the active handle is not the local player.
    PlayerMismatch { expected: PlayerKind },
    /// A newer playback request was issued while this one was in flight; its
    /// result was not applied.
    Superseded,
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::Api(e) => write!(f, "{}", e),
            PlaybackError::Media(e) => write!(f, "preview playback failed: {}", e),
            PlaybackError::PlayerMismatch { expected } => {
                write!(f, "expected the {:?} player to be active", expected)
            }
            PlaybackError::Superseded => write!(f, "superseded by a newer playback request"),
        }
    }
}

impl std::error::Error for PlaybackError {}

impl From<ApiError> for PlaybackError {
    fn from(err: ApiError) -> Self {
        PlaybackError::Api(err)
    }
}

/// Everything `start_playback` needs to know about the current session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Full, ordered track list of the context the track belongs to.
    pub tracks: Vec<Track>,
    pub premium: bool,
    pub device_id: Option<String>,
    pub access_token: Option<String>,
    pub context_uri: Option<String>,
    pub context_id: Option<String>,
    /// Set for single-track mode: play the context's URIs as an explicit list
    /// starting at this offset instead of addressing the context.
    pub queue_position: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackOutcome {
    Preview,
    Remote(PlayRequest),
    /// Nothing started (no device or credential yet); only the playing
    /// context was recorded.
    ContextOnly,
}

/// Which player a track should be started on.
pub fn select_player(premium: bool, track: &Track) -> PlayerKind {
    if !premium && track.preview_url.is_some() {
        PlayerKind::Preview
    } else {
        PlayerKind::Remote
    }
}

/// Builds the remote play request for `track`.
///
/// In single-track mode the request lists every URI of the context (tracks
/// without one are skipped) and starts at `queue_position`. Otherwise it
/// addresses the context and starts at the track's own position.
pub fn build_play_request(track: &Track, session: &SessionConfig) -> PlayRequest {
    match session.queue_position {
        Some(position) => PlayRequest::for_uris(utils::playable_uris(&session.tracks), position),
        None => PlayRequest::for_context(session.context_uri.clone(), track.position),
    }
}

/// Sole writer of the now-playing record.
///
/// Every play invocation takes a sequence number; only the invocation holding
/// the latest number may write its result, so a slow response can never
/// overwrite a newer choice.
pub struct Coordinator {
    api: Arc<dyn PlayerApi>,
    store: NowPlayingStore,
    issued: AtomicU64,
}

impl Coordinator {
    pub fn new(api: Arc<dyn PlayerApi>, store: NowPlayingStore) -> Self {
        Self {
            api,
            store,
            issued: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &NowPlayingStore {
        &self.store
    }

    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == seq
    }

    pub async fn start_playback(
        &self,
        track: &Track,
        session: &SessionConfig,
        player: &mut dyn PlayerHandle,
    ) -> Result<PlaybackOutcome, PlaybackError> {
        let seq = self.issue();

        if select_player(session.premium, track) == PlayerKind::Preview {
            if player.kind() != PlayerKind::Preview {
                return Err(PlaybackError::PlayerMismatch {
                    expected: PlayerKind::Preview,
                });
            }
            let Some(preview) = track.preview_url.as_deref() else {
                return Err(PlaybackError::Media("track has no preview".to_string()));
            };

            player.seek(0).await?;
            player.set_source(preview);
            player.set_queue(session.tracks.clone());

            // optimistic: the pointer moves even if the media output fails
            self.store.set_track(track.clone());
            self.store.set_context(session.context_id.clone());

            player.play().await?;
            return Ok(PlaybackOutcome::Preview);
        }

        let (Some(token), Some(device_id)) = (&session.access_token, &session.device_id) else {
            self.store.set_context(session.context_id.clone());
            return Ok(PlaybackOutcome::ContextOnly);
        };

        let request = build_play_request(track, session);
        let result = self.api.play(token, device_id, &request).await;

        if !self.is_latest(seq) {
            return Err(PlaybackError::Superseded);
        }

        // applied whether or not the request succeeded
        self.store.set_context(session.context_id.clone());
        self.store.set_track(track.clone());

        result?;
        Ok(PlaybackOutcome::Remote(request))
    }

    /// Pauses when `track` is the one playing, starts it otherwise.
    pub async fn play_or_pause(
        &self,
        track: &Track,
        session: &SessionConfig,
        player: &mut dyn PlayerHandle,
    ) -> Result<Option<PlaybackOutcome>, PlaybackError> {
        let now = self.store.snapshot();
        if now.is_playing && now.is_current(track) {
            self.pause(player).await?;
            self.store.set_context(session.context_id.clone());
            return Ok(None);
        }

        self.start_playback(track, session, player).await.map(Some)
    }

    pub async fn pause(&self, player: &mut dyn PlayerHandle) -> Result<(), PlaybackError> {
        player.pause().await?;
        self.store.set_playing(false);
        Ok(())
    }

    pub async fn toggle(&self, player: &mut dyn PlayerHandle) -> Result<bool, PlaybackError> {
        let playing = player.toggle().await?;
        self.store.set_playing(playing);
        Ok(playing)
    }

    pub async fn seek(
        &self,
        player: &mut dyn PlayerHandle,
        position_ms: u64,
    ) -> Result<(), PlaybackError> {
        player.seek(position_ms).await?;
        self.store.set_progress(position_ms, None);
        Ok(())
    }

    /// Position tick reported by the active player.
    pub fn record_progress(&self, position_ms: u64, duration_ms: u64) {
        self.store.set_progress(position_ms, Some(duration_ms));
    }
}
