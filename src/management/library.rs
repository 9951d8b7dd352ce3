use std::{collections::HashSet, fmt};

use futures::future::join_all;

use crate::{
    spotify::{ApiError, LibraryApi},
    types::Track,
    utils,
};

pub const PLAYLIST_PAGE_SIZE: usize = 100;
pub const LIBRARY_PAGE_SIZE: usize = 50;
/// Most ids `DELETE /me/tracks` accepts per request.
pub const LIBRARY_REMOVE_BATCH: usize = 50;

/// Where a track list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSource {
    Playlist {
        id: String,
        uri: String,
        snapshot_id: String,
        total: usize,
    },
    Library {
        total: usize,
    },
}

impl TrackSource {
    pub fn page_size(&self) -> usize {
        match self {
            TrackSource::Playlist { .. } => PLAYLIST_PAGE_SIZE,
            TrackSource::Library { .. } => LIBRARY_PAGE_SIZE,
        }
    }

    pub fn total(&self) -> usize {
        match self {
            TrackSource::Playlist { total, .. } | TrackSource::Library { total } => *total,
        }
    }

    pub fn is_library(&self) -> bool {
        matches!(self, TrackSource::Library { .. })
    }

    /// URI used to start contextual playback.
    pub fn context_uri(&self, user_id: Option<&str>) -> Option<String> {
        match self {
            TrackSource::Playlist { uri, .. } => Some(uri.clone()),
            TrackSource::Library { .. } => user_id.map(|id| format!("spotify:user:{}:collection", id)),
        }
    }

    pub fn context_id(&self) -> String {
        match self {
            TrackSource::Playlist { id, .. } => id.clone(),
            TrackSource::Library { .. } => "collection".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum RemovalError {
    Api(ApiError),
    /// Some library batches failed. `removed` already left the library on
    /// the server; `failed` did not.
    Batches {
        removed: Vec<String>,
        failed: Vec<String>,
        source: ApiError,
    },
}

impl fmt::Display for RemovalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalError::Api(e) => write!(f, "{}", e),
            RemovalError::Batches {
                removed,
                failed,
                source,
            } => write!(
                f,
                "{} tracks could not be removed ({} were): {}",
                failed.len(),
                removed.len(),
                source
            ),
        }
    }
}

impl std::error::Error for RemovalError {}

impl From<ApiError> for RemovalError {
    fn from(err: ApiError) -> Self {
        RemovalError::Api(err)
    }
}

pub async fn resolve_playlist(
    api: &dyn LibraryApi,
    token: &str,
    playlist_id: &str,
) -> Result<TrackSource, ApiError> {
    let details = api.playlist(token, playlist_id).await?;
    Ok(TrackSource::Playlist {
        id: details.id,
        uri: details.uri,
        snapshot_id: details.snapshot_id,
        total: details.tracks.total,
    })
}

pub async fn resolve_library(api: &dyn LibraryApi, token: &str) -> Result<TrackSource, ApiError> {
    let page = api.saved_tracks(token, 1, 0).await?;
    Ok(TrackSource::Library { total: page.total })
}

/// Fetches every track of `source`, one page at a time and in order, each
/// annotated with its absolute position.
pub async fn fetch_all_tracks(
    api: &dyn LibraryApi,
    token: &str,
    source: &TrackSource,
) -> Result<Vec<Track>, ApiError> {
    let limit = source.page_size();
    let pages = utils::page_count(source.total(), limit);
    let mut tracks = Vec::with_capacity(source.total());

    for page in 0..pages {
        let offset = limit * page;
        match source {
            TrackSource::Playlist { id, .. } => {
                let items = api.playlist_tracks(token, id, limit, offset).await?.items;
                tracks.extend(
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(i, item)| Track::from_playlist_item(item, offset + i)),
                );
            }
            TrackSource::Library { .. } => {
                let items = api.saved_tracks(token, limit, offset).await?.items;
                tracks.extend(
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(i, item)| Track::from_api(item.track, offset + i, item.added_at)),
                );
            }
        }
    }

    Ok(tracks)
}

/// Indices (into `tracks`) of every repeat of an earlier track.
pub fn analyze_for_duplicates(tracks: &[Track]) -> Vec<usize> {
    utils::find_duplicate_tracks(tracks)
}

/// Removes `positions` from a playlist in one request guarded by `snapshot_id`.
/// Returns the new snapshot id.
pub async fn remove_from_playlist(
    api: &dyn LibraryApi,
    token: &str,
    playlist_id: &str,
    positions: &[usize],
    snapshot_id: &str,
) -> Result<String, RemovalError> {
    Ok(api
        .remove_playlist_positions(token, playlist_id, positions, snapshot_id)
        .await?)
}

/// Removes `ids` from the saved library in parallel batches of at most
/// [`LIBRARY_REMOVE_BATCH`].
///
/// Repeated ids are sent once. Succeeds only if every batch succeeds. On
/// failure the error lists which ids were removed anyway and which were not.
pub async fn remove_from_library(
    api: &dyn LibraryApi,
    token: &str,
    ids: &[String],
) -> Result<(), RemovalError> {
    let mut seen = HashSet::new();
    let unique: Vec<String> = ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();

    let batches = utils::batch_ids(&unique, LIBRARY_REMOVE_BATCH);
    let results = join_all(
        batches
            .iter()
            .map(|batch| api.remove_saved_tracks(token, batch)),
    )
    .await;

    let mut removed = Vec::new();
    let mut failed = Vec::new();
    let mut first_error = None;

    for (batch, result) in batches.into_iter().zip(results) {
        match result {
            Ok(()) => removed.extend(batch),
            Err(e) => {
                failed.extend(batch);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        None => Ok(()),
        Some(source) => Err(RemovalError::Batches {
            removed,
            failed,
            source,
        }),
    }
}

/// Owner of one in-memory track list and the only code that mutates it.
#[derive(Debug, Clone)]
pub struct TrackListManager {
    source: TrackSource,
    tracks: Vec<Track>,
}

impl TrackListManager {
    pub fn new(source: TrackSource, tracks: Vec<Track>) -> Self {
        Self { source, tracks }
    }

    pub async fn load(
        api: &dyn LibraryApi,
        token: &str,
        source: TrackSource,
    ) -> Result<Self, ApiError> {
        let tracks = fetch_all_tracks(api, token, &source).await?;
        Ok(Self::new(source, tracks))
    }

    pub fn source(&self) -> &TrackSource {
        &self.source
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn duplicates(&self) -> Vec<usize> {
        analyze_for_duplicates(&self.tracks)
    }

    /// Of `indices`, the ones that can actually be targeted: playlist entries
    /// need a URI, library entries need an id as well. Repeats are dropped,
    /// first-seen order is kept.
    pub fn removable(&self, indices: &[usize]) -> Vec<usize> {
        let library = self.source.is_library();
        let mut seen = HashSet::new();
        indices
            .iter()
            .copied()
            .filter(|&i| match self.tracks.get(i) {
                Some(t) => !t.corrupted && t.uri.is_some() && (!library || t.id.is_some()),
                None => false,
            })
            .filter(|&i| seen.insert(i))
            .collect()
    }

    /// Removes the tracks at `indices` on the server and, only on success,
    /// from this list. Returns how many tracks were removed.
    pub async fn remove(
        &mut self,
        api: &dyn LibraryApi,
        token: &str,
        indices: &[usize],
    ) -> Result<usize, RemovalError> {
        let targets = self.removable(indices);
        if targets.is_empty() {
            return Ok(0);
        }

        match &mut self.source {
            TrackSource::Playlist {
                id,
                snapshot_id,
                total,
                ..
            } => {
                let positions: Vec<usize> =
                    targets.iter().map(|&i| self.tracks[i].position).collect();
                let new_snapshot =
                    remove_from_playlist(api, token, id, &positions, snapshot_id).await?;

                *snapshot_id = new_snapshot;
                *total = total.saturating_sub(targets.len());
                utils::prune_positions(&mut self.tracks, &targets);
            }
            TrackSource::Library { total } => {
                let ids: Vec<String> = targets
                    .iter()
                    .filter_map(|&i| self.tracks[i].id.clone())
                    .collect();
                remove_from_library(api, token, &ids).await?;

                let before = self.tracks.len();
                utils::prune_ids(&mut self.tracks, &ids);
                *total = total.saturating_sub(before - self.tracks.len());
            }
        }

        // server positions shift down after a removal
        for (index, track) in self.tracks.iter_mut().enumerate() {
            track.position = index;
        }

        Ok(targets.len())
    }
}
