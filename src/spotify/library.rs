use async_trait::async_trait;
use reqwest::StatusCode;

use super::{ApiError, LibraryApi, SpotifyClient};
use crate::types::{
    Page, PlaylistDetails, PlaylistTrackItem, RemovePlaylistPositionsRequest,
    RemoveSavedTracksRequest, SavedTrackItem, SnapshotResponse,
};

#[async_trait]
impl LibraryApi for SpotifyClient {
    async fn playlist(&self, token: &str, playlist_id: &str) -> Result<PlaylistDetails, ApiError> {
        let url = self.url(&format!(
            "/playlists/{id}?fields=id,name,uri,snapshot_id,tracks.total",
            id = playlist_id
        ));
        let response = self.get(token, &url).await?;
        Ok(response.json::<PlaylistDetails>().await?)
    }

    async fn playlist_tracks(
        &self,
        token: &str,
        playlist_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<PlaylistTrackItem>, ApiError> {
        let url = self.url(&format!(
            "/playlists/{id}/tracks?limit={limit}&offset={offset}",
            id = playlist_id,
            limit = limit,
            offset = offset
        ));
        let response = self.get(token, &url).await?;
        Ok(response.json::<Page<PlaylistTrackItem>>().await?)
    }

    async fn saved_tracks(
        &self,
        token: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<SavedTrackItem>, ApiError> {
        let url = self.url(&format!(
            "/me/tracks?limit={limit}&offset={offset}",
            limit = limit,
            offset = offset
        ));
        let response = self.get(token, &url).await?;
        Ok(response.json::<Page<SavedTrackItem>>().await?)
    }

    async fn remove_playlist_positions(
        &self,
        token: &str,
        playlist_id: &str,
        positions: &[usize],
        snapshot_id: &str,
    ) -> Result<String, ApiError> {
        let url = self.url(&format!("/playlists/{}/tracks", playlist_id));
        let body = RemovePlaylistPositionsRequest {
            positions: positions.to_vec(),
            snapshot_id: snapshot_id.to_string(),
        };

        let response = self
            .send(self.http.delete(url).bearer_auth(token).json(&body))
            .await
            .map_err(|e| removal_error(e, snapshot_id))?;

        Ok(response.json::<SnapshotResponse>().await?.snapshot_id)
    }

    async fn remove_saved_tracks(&self, token: &str, ids: &[String]) -> Result<(), ApiError> {
        let body = RemoveSavedTracksRequest { ids: ids.to_vec() };
        self.send(
            self.http
                .delete(self.url("/me/tracks"))
                .bearer_auth(token)
                .json(&body),
        )
        .await?;
        Ok(())
    }
}

/// Playlist removals rejected because the snapshot went stale become
/// [`ApiError::SnapshotConflict`].
fn removal_error(err: ApiError, snapshot_id: &str) -> ApiError {
    match err {
        ApiError::Status { status, body } if is_snapshot_conflict(status, &body) => {
            ApiError::SnapshotConflict(snapshot_id.to_string())
        }
        other => other,
    }
}

fn is_snapshot_conflict(status: StatusCode, body: &str) -> bool {
    match status {
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => true,
        StatusCode::BAD_REQUEST => body.to_lowercase().contains("snapshot"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: StatusCode, body: &str) -> ApiError {
        ApiError::Status {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_conflict_and_precondition_are_stale_snapshots() {
        for code in [StatusCode::CONFLICT, StatusCode::PRECONDITION_FAILED] {
            match removal_error(status_error(code, ""), "abc") {
                ApiError::SnapshotConflict(snapshot) => assert_eq!(snapshot, "abc"),
                other => panic!("{} mapped to {:?}", code, other),
            }
        }
    }

    #[test]
    fn test_bad_request_naming_snapshot_is_stale_snapshot() {
        let body = r#"{"error":{"status":400,"message":"Invalid Snapshot ID"}}"#;

        assert!(matches!(
            removal_error(status_error(StatusCode::BAD_REQUEST, body), "abc"),
            ApiError::SnapshotConflict(_)
        ));
    }

    #[test]
    fn test_other_failures_keep_their_status() {
        let bad_request = r#"{"error":{"status":400,"message":"Invalid track uri"}}"#;

        for (code, body) in [
            (StatusCode::BAD_REQUEST, bad_request),
            (StatusCode::INTERNAL_SERVER_ERROR, "snapshot store unavailable"),
        ] {
            match removal_error(status_error(code, body), "abc") {
                ApiError::Status { status, .. } => assert_eq!(status, code),
                other => panic!("{} mapped to {:?}", code, other),
            }
        }
    }
}
