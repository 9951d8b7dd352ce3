use std::io::{self, BufRead, Write};

use tabled::Table;

use crate::{
    error, info,
    management::{DialogState, DuplicateCleanup, RemovalError, Toast, ToastVariant, TrackListManager},
    spotify::SpotifyClient,
    success,
    types::TrackTableRow,
    warning,
};

use super::{Source, access_token, resolve_source, spinner};

fn confirm(question: &str) -> bool {
    print!("{} [y/N] ", question);
    let _ = io::stdout().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn show_toast(toast: &Toast, detail: Option<String>) {
    let message = match detail {
        Some(detail) => format!("{} ({})", toast.message, detail),
        None => toast.message.clone(),
    };
    match toast.variant {
        ToastVariant::Success => success!("{}", message),
        ToastVariant::Error => warning!("{}", message),
    }
}

fn describe_failure(error: &RemovalError) -> String {
    match error {
        RemovalError::Batches {
            removed, failed, ..
        } => format!(
            "{} already removed on Spotify, {} still saved; list left unchanged until the next refresh",
            removed.len(),
            failed.len()
        ),
        RemovalError::Api(e) => e.to_string(),
    }
}

/// Finds duplicate tracks in a playlist or the library and removes them after
/// confirmation (or right away with `yes`).
pub async fn dedupe(source: Source, yes: bool) {
    let token = access_token().await;
    let client = SpotifyClient::new();

    let track_source = match resolve_source(&client, &token, &source).await {
        Ok(Some(ts)) => ts,
        Ok(None) => error!("Duplicate cleanup works on a playlist or the library."),
        Err(e) => error!("Failed to load {:?}: {}", source, e),
    };

    let pb = spinner("Analyzing tracks...");
    let (mut cleanup, toast) = DuplicateCleanup::analyze(&client, &token, track_source).await;
    pb.finish_and_clear();

    if let Some(toast) = toast {
        show_toast(&toast, None);
        return;
    }

    match cleanup.dialog().state() {
        DialogState::ReadyNoDuplicates => {
            success!("No duplicate tracks");
            return;
        }
        DialogState::ReadyWithDuplicates => {}
        other => error!("Unexpected cleanup state {:?}", other),
    }

    let shown: Vec<TrackTableRow> = cleanup
        .duplicate_tracks()
        .into_iter()
        .filter(|t| !t.corrupted)
        .map(TrackTableRow::from)
        .collect();

    match cleanup.dialog().duplicates().len() {
        1 => info!("There is one duplicate track"),
        n => info!("There are {} duplicate tracks", n),
    }
    if !shown.is_empty() {
        println!("{}", Table::new(shown));
    }

    if !yes && !confirm("Remove them?") {
        let _ = cleanup.dialog_mut().dismiss();
        info!("Nothing removed.");
        return;
    }

    let pb = spinner("Removing tracks...");
    let confirmed = cleanup.confirm(&client, &token).await;
    pb.finish_and_clear();

    match confirmed {
        Ok((toast, Ok(_))) => show_toast(&toast, None),
        Ok((toast, Err(e))) => show_toast(&toast, Some(describe_failure(&e))),
        Err(e) => warning!("{}", e),
    }
}

/// Removes one track, identified by id, from the library or from a playlist at
/// the given 1-based position.
pub async fn remove(track_id: String, source: Source, position: Option<usize>) {
    let token = access_token().await;
    let client = SpotifyClient::new();

    let track_source = match resolve_source(&client, &token, &source).await {
        Ok(Some(ts)) => ts,
        Ok(None) => error!("Tracks can only be removed from a playlist or the library."),
        Err(e) => error!("Failed to load {:?}: {}", source, e),
    };

    let pb = spinner("Fetching tracks...");
    let loaded = TrackListManager::load(&client, &token, track_source).await;
    pb.finish_and_clear();
    let mut list = match loaded {
        Ok(list) => list,
        Err(e) => error!("Failed to load tracks: {}", e),
    };

    let index = match position {
        Some(p) => p
            .checked_sub(1)
            .filter(|&i| list.tracks().get(i).and_then(|t| t.id.as_deref()) == Some(track_id.as_str())),
        None => list
            .tracks()
            .iter()
            .position(|t| t.id.as_deref() == Some(track_id.as_str())),
    };

    let Some(index) = index else {
        error!("Track {} not found at the given position", track_id);
    };

    let name = list.tracks()[index].name.clone();
    match list.remove(&client, &token, &[index]).await {
        Ok(0) => warning!("{} cannot be removed (unavailable track)", name),
        Ok(_) => success!("Removed {}", name),
        Err(e) => warning!("Failed to remove {}: {}", name, describe_failure(&e)),
    }
}
