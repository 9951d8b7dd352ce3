mod auth;
mod dialog;
mod library;
mod now_playing;
mod playback;
mod player;
mod session;

pub use auth::TokenManager;
pub use dialog::{DialogError, DialogState, DuplicateCleanup, RemovalDialog, Toast, ToastVariant};
pub use library::{
    LIBRARY_PAGE_SIZE, LIBRARY_REMOVE_BATCH, PLAYLIST_PAGE_SIZE, RemovalError, TrackListManager,
    TrackSource, analyze_for_duplicates, fetch_all_tracks, remove_from_library,
    remove_from_playlist, resolve_library, resolve_playlist,
};
pub use now_playing::{NowPlaying, NowPlayingStore};
pub use playback::{
    Coordinator, PlaybackError, PlaybackOutcome, SessionConfig, build_play_request, select_player,
};
pub use player::{PlayerHandle, PlayerKind, PreviewPlayer, RemotePlayer};
pub use session::{SessionError, SessionManager, SessionState, wait_for_device};
