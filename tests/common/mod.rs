#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use spotdeck::{
    spotify::{ApiError, LibraryApi, PlayerApi},
    types::{
        ApiTrack, Device, Page, PlayRequest, PlaylistDetails, PlaylistTrackItem,
        PlaylistTracksRef, SavedTrackItem, Track, TrackAlbum, TrackArtist,
    },
};

pub fn api_track(id: &str, name: &str, artist: &str) -> ApiTrack {
    ApiTrack {
        id: Some(id.to_string()),
        uri: Some(format!("spotify:track:{}", id)),
        name: name.to_string(),
        artists: vec![TrackArtist {
            id: Some(format!("{}_artist", artist)),
            name: artist.to_string(),
        }],
        album: TrackAlbum {
            id: None,
            name: "Album".to_string(),
            images: Vec::new(),
        },
        duration_ms: 180_000,
        ..Default::default()
    }
}

pub fn track(id: &str, name: &str, artist: &str, position: usize) -> Track {
    Track::from_api(api_track(id, name, artist), position, None)
}

pub fn corrupted(position: usize) -> Track {
    Track {
        position,
        corrupted: true,
        name: format!("missing {}", position),
        ..Default::default()
    }
}

pub fn status_error(status: StatusCode) -> ApiError {
    ApiError::Status {
        status,
        body: String::new(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCall {
    Play {
        device_id: String,
        request: PlayRequest,
    },
    Resume,
    Pause,
    Seek(u64),
    Devices,
}

/// Records every call; `play` can be delayed or failed per offset.
#[derive(Default)]
pub struct FakePlayerApi {
    pub calls: Mutex<Vec<PlayerCall>>,
    pub devices: Mutex<Vec<Device>>,
    pub fail_play: bool,
    pub delays: HashMap<usize, Duration>,
}

impl FakePlayerApi {
    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn play_requests(&self) -> Vec<PlayRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PlayerCall::Play { request, .. } => Some(request),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PlayerApi for FakePlayerApi {
    async fn devices(&self, _token: &str) -> Result<Vec<Device>, ApiError> {
        self.calls.lock().unwrap().push(PlayerCall::Devices);
        Ok(self.devices.lock().unwrap().clone())
    }

    async fn play(
        &self,
        _token: &str,
        device_id: &str,
        request: &PlayRequest,
    ) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(PlayerCall::Play {
            device_id: device_id.to_string(),
            request: request.clone(),
        });

        if let Some(delay) = request
            .offset_position()
            .and_then(|p| self.delays.get(&p))
        {
            tokio::time::sleep(*delay).await;
        }

        if self.fail_play {
            return Err(status_error(StatusCode::BAD_GATEWAY));
        }
        Ok(())
    }

    async fn resume(&self, _token: &str, _device_id: &str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(PlayerCall::Resume);
        Ok(())
    }

    async fn pause(&self, _token: &str, _device_id: &str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(PlayerCall::Pause);
        Ok(())
    }

    async fn seek(&self, _token: &str, _device_id: &str, position_ms: u64) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(PlayerCall::Seek(position_ms));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistRemoval {
    pub playlist_id: String,
    pub positions: Vec<usize>,
    pub snapshot_id: String,
}

/// In-memory playlist + library.
#[derive(Default)]
pub struct FakeLibraryApi {
    pub playlist_items: Vec<PlaylistTrackItem>,
    pub saved_items: Vec<SavedTrackItem>,
    pub snapshot_id: String,
    pub page_requests: Mutex<Vec<(usize, usize)>>,
    pub playlist_removals: Mutex<Vec<PlaylistRemoval>>,
    pub library_batches: Mutex<Vec<Vec<String>>>,
    /// Any library batch containing one of these ids fails.
    pub failing_ids: HashSet<String>,
    pub fail_playlist_removal: Option<StatusCode>,
    pub fail_pages: bool,
}

impl FakeLibraryApi {
    pub fn with_playlist(tracks: Vec<Option<ApiTrack>>, snapshot_id: &str) -> Self {
        Self {
            playlist_items: tracks
                .into_iter()
                .map(|track| PlaylistTrackItem {
                    added_at: None,
                    is_local: false,
                    track,
                })
                .collect(),
            snapshot_id: snapshot_id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_library(tracks: Vec<ApiTrack>) -> Self {
        Self {
            saved_items: tracks
                .into_iter()
                .map(|track| SavedTrackItem {
                    added_at: Some("2024-01-01T00:00:00Z".to_string()),
                    track,
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn page_requests(&self) -> Vec<(usize, usize)> {
        self.page_requests.lock().unwrap().clone()
    }

    pub fn playlist_removals(&self) -> Vec<PlaylistRemoval> {
        self.playlist_removals.lock().unwrap().clone()
    }

    pub fn library_batches(&self) -> Vec<Vec<String>> {
        self.library_batches.lock().unwrap().clone()
    }
}

fn slice<T: Clone>(items: &[T], limit: usize, offset: usize) -> Vec<T> {
    items.iter().skip(offset).take(limit).cloned().collect()
}

#[async_trait]
impl LibraryApi for FakeLibraryApi {
    async fn playlist(&self, _token: &str, playlist_id: &str) -> Result<PlaylistDetails, ApiError> {
        Ok(PlaylistDetails {
            id: playlist_id.to_string(),
            name: "Fake".to_string(),
            uri: format!("spotify:playlist:{}", playlist_id),
            snapshot_id: self.snapshot_id.clone(),
            tracks: PlaylistTracksRef {
                total: self.playlist_items.len(),
            },
        })
    }

    async fn playlist_tracks(
        &self,
        _token: &str,
        _playlist_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<PlaylistTrackItem>, ApiError> {
        self.page_requests.lock().unwrap().push((limit, offset));
        if self.fail_pages {
            return Err(status_error(StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(Page {
            items: slice(&self.playlist_items, limit, offset),
            total: self.playlist_items.len(),
            next: None,
        })
    }

    async fn saved_tracks(
        &self,
        _token: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<SavedTrackItem>, ApiError> {
        self.page_requests.lock().unwrap().push((limit, offset));
        if self.fail_pages {
            return Err(status_error(StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(Page {
            items: slice(&self.saved_items, limit, offset),
            total: self.saved_items.len(),
            next: None,
        })
    }

    async fn remove_playlist_positions(
        &self,
        _token: &str,
        playlist_id: &str,
        positions: &[usize],
        snapshot_id: &str,
    ) -> Result<String, ApiError> {
        self.playlist_removals.lock().unwrap().push(PlaylistRemoval {
            playlist_id: playlist_id.to_string(),
            positions: positions.to_vec(),
            snapshot_id: snapshot_id.to_string(),
        });

        match self.fail_playlist_removal {
            Some(StatusCode::CONFLICT) => Err(ApiError::SnapshotConflict(snapshot_id.to_string())),
            Some(status) => Err(status_error(status)),
            None => Ok(format!("{}-next", snapshot_id)),
        }
    }

    async fn remove_saved_tracks(&self, _token: &str, ids: &[String]) -> Result<(), ApiError> {
        self.library_batches.lock().unwrap().push(ids.to_vec());
        if ids.iter().any(|id| self.failing_ids.contains(id)) {
            return Err(status_error(StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(())
    }
}
