use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::types::Track;

/// The single "what is playing" record every view reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub track: Option<Track>,
    /// Id of the playlist/collection the track was started from.
    pub context_id: Option<String>,
    pub is_playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
}

impl NowPlaying {
    /// Whether `track` is the one currently loaded.
    pub fn is_current(&self, track: &Track) -> bool {
        match &self.track {
            Some(current) => match (&current.uri, &track.uri) {
                (Some(a), Some(b)) => a == b,
                _ => {
                    current.name == track.name
                        && current.artists == track.artists
                        && current.album == track.album
                }
            },
            None => false,
        }
    }
}

/// Observable holder of the [`NowPlaying`] record.
///
/// Anyone can read or subscribe; only the playback coordinator in this crate
/// writes.
#[derive(Debug, Clone)]
pub struct NowPlayingStore {
    tx: Arc<watch::Sender<NowPlaying>>,
}

impl Default for NowPlayingStore {
    fn default() -> Self {
        Self::new(NowPlaying::default())
    }
}

impl NowPlayingStore {
    pub fn new(initial: NowPlaying) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> NowPlaying {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<NowPlaying> {
        self.tx.subscribe()
    }

    pub(crate) fn set_context(&self, context_id: Option<String>) {
        self.tx.send_modify(|np| np.context_id = context_id);
    }

    pub(crate) fn set_track(&self, track: Track) {
        self.tx.send_modify(|np| {
            np.duration_ms = track.duration_ms;
            np.position_ms = 0;
            np.is_playing = true;
            np.track = Some(track);
        });
    }

    pub(crate) fn set_playing(&self, is_playing: bool) {
        self.tx.send_modify(|np| np.is_playing = is_playing);
    }

    pub(crate) fn set_progress(&self, position_ms: u64, duration_ms: Option<u64>) {
        self.tx.send_modify(|np| {
            np.position_ms = position_ms;
            if let Some(duration) = duration_ms {
                np.duration_ms = duration;
            }
        });
    }
}
