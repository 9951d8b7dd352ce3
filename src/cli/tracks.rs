use tabled::Table;

use crate::{
    error, info,
    management::{TrackListManager, TrackSource},
    spotify::{ApiError, SpotifyClient},
    types::{Track, TrackTableRow},
    warning,
};

use super::{Source, TOP_TRACKS_LIMIT, access_token, resolve_source, spinner};

/// Loads the full track list for `source`.
pub(super) async fn load_tracks(
    client: &SpotifyClient,
    token: &str,
    source: &Source,
) -> Result<(Vec<Track>, Option<TrackSource>), ApiError> {
    match resolve_source(client, token, source).await? {
        Some(track_source) => {
            let list = TrackListManager::load(client, token, track_source).await?;
            let track_source = list.source().clone();
            Ok((list.tracks().to_vec(), Some(track_source)))
        }
        None => Ok((client.top_tracks(token, TOP_TRACKS_LIMIT).await?, None)),
    }
}

pub async fn list_tracks(source: Source) {
    let token = access_token().await;
    let client = SpotifyClient::new();

    let pb = spinner("Fetching tracks...");
    let result = load_tracks(&client, &token, &source).await;
    pb.finish_and_clear();

    let (tracks, _) = match result {
        Ok(loaded) => loaded,
        Err(e) => error!("Failed to load tracks: {}", e),
    };

    if tracks.is_empty() {
        info!("No tracks.");
        return;
    }

    let ids: Vec<String> = tracks.iter().filter_map(|t| t.id.clone()).collect();
    let saved = if source == Source::Library {
        vec![true; ids.len()]
    } else {
        match client.tracks_in_library(&token, &ids).await {
            Ok(saved) => saved,
            Err(e) => {
                warning!("Could not check saved tracks: {}", e);
                vec![false; ids.len()]
            }
        }
    };

    let mut saved_iter = saved.into_iter();
    let rows: Vec<TrackTableRow> = tracks
        .iter()
        .map(|track| {
            let mut row = TrackTableRow::from(track);
            if track.id.is_some() && saved_iter.next().unwrap_or(false) {
                row.flags = format!("♥ {}", row.flags).trim_end().to_string();
            }
            row
        })
        .collect();

    println!("{}", Table::new(rows));
    info!("{} tracks", tracks.len());
}
