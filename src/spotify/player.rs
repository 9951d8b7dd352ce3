use async_trait::async_trait;

use super::{ApiError, PlayerApi, SpotifyClient};
use crate::types::{Device, DevicesResponse, PlayRequest};

#[async_trait]
impl PlayerApi for SpotifyClient {
    async fn devices(&self, token: &str) -> Result<Vec<Device>, ApiError> {
        let response = self.get(token, &self.url("/me/player/devices")).await?;
        let json = response.json::<DevicesResponse>().await?;
        Ok(json.devices)
    }

    async fn play(
        &self,
        token: &str,
        device_id: &str,
        request: &PlayRequest,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/me/player/play?device_id={}", device_id));
        self.send(self.http.put(url).bearer_auth(token).json(request))
            .await?;
        Ok(())
    }

    async fn resume(&self, token: &str, device_id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/me/player/play?device_id={}", device_id));
        self.send(
            self.http
                .put(url)
                .bearer_auth(token)
                .header("Content-Length", "0"),
        )
        .await?;
        Ok(())
    }

    async fn pause(&self, token: &str, device_id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/me/player/pause?device_id={}", device_id));
        self.send(
            self.http
                .put(url)
                .bearer_auth(token)
                .header("Content-Length", "0"),
        )
        .await?;
        Ok(())
    }

    async fn seek(&self, token: &str, device_id: &str, position_ms: u64) -> Result<(), ApiError> {
        let url = self.url(&format!(
            "/me/player/seek?position_ms={}&device_id={}",
            position_ms, device_id
        ));
        self.send(
            self.http
                .put(url)
                .bearer_auth(token)
                .header("Content-Length", "0"),
        )
        .await?;
        Ok(())
    }
}
