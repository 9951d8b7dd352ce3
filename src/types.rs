use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::utils;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackAlbum {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Track object as returned by the Web API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiTrack {
    pub id: Option<String>,
    pub uri: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
    #[serde(default)]
    pub album: TrackAlbum,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub explicit: bool,
    pub is_playable: Option<bool>,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub is_local: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrackItem {
    pub added_at: Option<String>,
    #[serde(default)]
    pub is_local: bool,
    pub track: Option<ApiTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrackItem {
    pub added_at: Option<String>,
    pub track: ApiTrack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: usize,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksRef {
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistDetails {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub snapshot_id: String,
    pub tracks: PlaylistTracksRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Followers {
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub product: Option<String>,
    pub country: Option<String>,
    pub followers: Option<Followers>,
}

impl UserProfile {
    pub fn is_premium(&self) -> bool {
        self.product.as_deref() == Some("premium")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesResponse {
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub position: usize,
}

/// Body of `PUT /me/player/play`.
///
/// Either `context_uri` or `uris` is set, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<Offset>,
}

impl PlayRequest {
    pub fn for_context(context_uri: Option<String>, position: usize) -> Self {
        Self {
            context_uri,
            uris: None,
            offset: Some(Offset { position }),
        }
    }

    pub fn for_uris(uris: Vec<String>, position: usize) -> Self {
        Self {
            context_uri: None,
            uris: Some(uris),
            offset: Some(Offset { position }),
        }
    }

    pub fn offset_position(&self) -> Option<usize> {
        self.offset.map(|o| o.position)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovePlaylistPositionsRequest {
    pub positions: Vec<usize>,
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveSavedTracksRequest {
    pub ids: Vec<String>,
}

/// A track as held in an in-memory list, annotated with its position in the
/// containing context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub uri: Option<String>,
    pub name: String,
    pub artists: Vec<TrackArtist>,
    pub album: String,
    pub duration_ms: u64,
    pub explicit: bool,
    pub is_playable: Option<bool>,
    pub is_local: bool,
    pub position: usize,
    pub preview_url: Option<String>,
    pub corrupted: bool,
    pub added_at: Option<String>,
}

impl Track {
    pub fn from_api(track: ApiTrack, position: usize, added_at: Option<String>) -> Self {
        Self {
            corrupted: track.uri.is_none(),
            id: track.id,
            uri: track.uri,
            name: track.name,
            artists: track.artists,
            album: track.album.name,
            duration_ms: track.duration_ms,
            explicit: track.explicit,
            is_playable: track.is_playable,
            is_local: track.is_local,
            position,
            preview_url: track.preview_url,
            added_at,
        }
    }

    pub fn from_playlist_item(item: PlaylistTrackItem, position: usize) -> Self {
        match item.track {
            Some(track) => {
                let mut t = Self::from_api(track, position, item.added_at);
                t.is_local = t.is_local || item.is_local;
                t
            }
            None => Self {
                position,
                corrupted: true,
                is_local: item.is_local,
                added_at: item.added_at,
                ..Default::default()
            },
        }
    }

    /// Free accounts can only play preview audio; premium accounts can play
    /// anything the API did not flag as unplayable.
    pub fn is_playable_for(&self, premium: bool) -> bool {
        if premium {
            self.is_playable != Some(false)
        } else {
            self.preview_url.is_some()
        }
    }

    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub name: String,
    pub artists: String,
    pub album: String,
    pub duration: String,
    pub flags: String,
}

impl From<&Track> for TrackTableRow {
    fn from(track: &Track) -> Self {
        let mut flags = Vec::new();
        if track.explicit {
            flags.push("E");
        }
        if track.is_local {
            flags.push("local");
        }
        if track.corrupted {
            flags.push("unavailable");
        }

        TrackTableRow {
            position: track.position + 1,
            name: track.name.clone(),
            artists: track.artist_names(),
            album: track.album.clone(),
            duration: utils::format_duration(track.duration_ms),
            flags: flags.join(" "),
        }
    }
}
