use std::sync::Arc;

use crate::{
    config, error, info,
    management::{
        Coordinator, NowPlayingStore, PlaybackError, PlaybackOutcome, PlayerHandle, PlayerKind,
        PreviewPlayer, RemotePlayer, SessionConfig, SessionManager, select_player,
        wait_for_device,
    },
    spotify::{PlayerApi, SpotifyClient},
    success,
    types::Track,
    warning,
};

use super::{Source, access_token, spinner, tracks::load_tracks};

const TOP_TRACKS_CONTEXT: &str = "top-tracks";

/// Starts the track shown as `position` (1-based) in `source`, or pauses it
/// when it is the one already playing.
pub async fn play(position: usize, source: Source, device: Option<String>) {
    let token = access_token().await;
    let client = Arc::new(SpotifyClient::new());
    let mut session = SessionManager::load_default().await;

    let profile = match client.me(&token).await {
        Ok(p) => p,
        Err(e) => error!("Failed to load profile: {}", e),
    };
    let premium = profile.is_premium();

    let pb = spinner("Fetching tracks...");
    let loaded = load_tracks(&client, &token, &source).await;
    pb.finish_and_clear();
    let (tracks, track_source) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => error!("Failed to load tracks: {}", e),
    };

    let Some(track) = position.checked_sub(1).and_then(|i| tracks.get(i)).cloned() else {
        error!("No track at position {} ({} tracks)", position, tracks.len());
    };

    if !track.is_playable_for(premium) {
        warning!("{} is not playable with this account", track.name);
        return;
    }

    let (context_uri, context_id, queue_position) = match &track_source {
        Some(ts) => (ts.context_uri(Some(&profile.id)), Some(ts.context_id()), None),
        None => (None, Some(TOP_TRACKS_CONTEXT.to_string()), Some(track.position)),
    };

    let api: Arc<dyn PlayerApi> = client.clone();
    let mut player: Box<dyn PlayerHandle> = match select_player(premium, &track) {
        PlayerKind::Preview => Box::new(PreviewPlayer::new()),
        PlayerKind::Remote => {
            let preferred = device.as_deref().or(session.state().device_id.as_deref());
            let pb = spinner("Waiting for a Spotify device...");
            let found = wait_for_device(api.as_ref(), &token, preferred, config::device_wait()).await;
            pb.finish_and_clear();

            let device_id = match found {
                Ok(d) => d,
                Err(e) => {
                    warning!("Failed to list devices: {}", e);
                    None
                }
            };
            session.state_mut().device_id = device_id.clone();
            Box::new(RemotePlayer::new(
                api.clone(),
                token.clone(),
                device_id.unwrap_or_default(),
            ))
        }
    };

    let config = SessionConfig {
        tracks,
        premium,
        device_id: session.state().device_id.clone(),
        access_token: Some(token),
        context_uri,
        context_id,
        queue_position,
    };

    let store = NowPlayingStore::new(session.state().now_playing.clone());
    let coordinator = Coordinator::new(api, store);
    // asking for the track that is already playing pauses it
    let result = coordinator
        .play_or_pause(&track, &config, player.as_mut())
        .await;

    session.state_mut().premium = premium;
    session.state_mut().now_playing = coordinator.store().snapshot();
    if let Err(e) = session.persist().await {
        warning!("Failed to save session: {}", e);
    }

    report(&track, result);
}

fn report(track: &Track, result: Result<Option<PlaybackOutcome>, PlaybackError>) {
    match result {
        Ok(None) => success!("Paused {}", track.name),
        Ok(Some(PlaybackOutcome::Preview)) => {
            success!("Playing preview of {} - {}", track.name, track.artist_names())
        }
        Ok(Some(PlaybackOutcome::Remote(_))) => {
            success!("Playing {} - {}", track.name, track.artist_names())
        }
        Ok(Some(PlaybackOutcome::ContextOnly)) => warning!(
            "No Spotify device available. Open Spotify on any device and try again."
        ),
        Err(e) => warning!("Failed to play {}: {}", track.name, e),
    }
}

/// Rebuilds the coordinator and the remote player from the saved session.
/// Returns `None` when the last playback was a local preview.
async fn remote_session() -> Option<(SessionManager, Coordinator, RemotePlayer)> {
    let session = SessionManager::load_default().await;
    if !session.state().premium {
        warning!("Previews play in your browser; control them there.");
        return None;
    }

    let Some(device_id) = session.state().device_id.clone() else {
        warning!("Nothing is playing yet. Start something with spotdeck play.");
        return None;
    };

    let token = access_token().await;
    let api: Arc<dyn PlayerApi> = Arc::new(SpotifyClient::new());
    let store = NowPlayingStore::new(session.state().now_playing.clone());
    let coordinator = Coordinator::new(api.clone(), store);
    let player = RemotePlayer::new(api, token, device_id);

    Some((session, coordinator, player))
}

async fn save(mut session: SessionManager, coordinator: &Coordinator) {
    session.state_mut().now_playing = coordinator.store().snapshot();
    if let Err(e) = session.persist().await {
        warning!("Failed to save session: {}", e);
    }
}

pub async fn pause() {
    let Some((session, coordinator, mut player)) = remote_session().await else {
        return;
    };

    match coordinator.pause(&mut player).await {
        Ok(()) => success!("Paused"),
        Err(e) => warning!("Failed to pause: {}", e),
    }
    save(session, &coordinator).await;
}

pub async fn toggle() {
    let Some((session, coordinator, mut player)) = remote_session().await else {
        return;
    };

    let result = if coordinator.store().snapshot().is_playing {
        coordinator.pause(&mut player).await.map(|_| false)
    } else {
        coordinator.toggle(&mut player).await
    };

    match result {
        Ok(true) => success!("Playing"),
        Ok(false) => success!("Paused"),
        Err(e) => warning!("Failed to toggle playback: {}", e),
    }
    save(session, &coordinator).await;
}

pub async fn seek(seconds: u64) {
    let Some((session, coordinator, mut player)) = remote_session().await else {
        return;
    };

    match coordinator.seek(&mut player, seconds * 1000).await {
        Ok(()) => info!("Jumped to {}:{:02}", seconds / 60, seconds % 60),
        Err(e) => warning!("Failed to seek: {}", e),
    }
    save(session, &coordinator).await;
}
