use super::{ApiError, SpotifyClient};
use crate::{
    types::{ApiTrack, Page, Track, UserProfile},
    utils,
};

/// Most the `contains` endpoint accepts per call.
const CONTAINS_BATCH: usize = 50;

impl SpotifyClient {
    /// The signed-in user's profile, including the subscription tier.
    pub async fn me(&self, token: &str) -> Result<UserProfile, ApiError> {
        let response = self.get(token, &self.url("/me")).await?;
        Ok(response.json::<UserProfile>().await?)
    }

    /// The user's long-term top tracks, positioned 0..n in ranking order.
    pub async fn top_tracks(&self, token: &str, limit: usize) -> Result<Vec<Track>, ApiError> {
        let url = self.url(&format!(
            "/me/top/tracks?time_range=long_term&limit={}",
            limit
        ));
        let response = self.get(token, &url).await?;
        let page = response.json::<Page<ApiTrack>>().await?;

        Ok(page
            .items
            .into_iter()
            .enumerate()
            .map(|(position, track)| Track::from_api(track, position, None))
            .collect())
    }

    /// Whether each of `ids` is in the saved library, in input order.
    pub async fn tracks_in_library(&self, token: &str, ids: &[String]) -> Result<Vec<bool>, ApiError> {
        let mut saved = Vec::with_capacity(ids.len());
        for batch in utils::batch_ids(ids, CONTAINS_BATCH) {
            let url = self.url(&format!("/me/tracks/contains?ids={}", batch.join(",")));
            let response = self.get(token, &url).await?;
            saved.extend(response.json::<Vec<bool>>().await?);
        }
        Ok(saved)
    }
}
