use crate::{error, info, spotify::SpotifyClient};

use super::access_token;

pub async fn me() {
    let token = access_token().await;
    let client = SpotifyClient::new();

    let profile = match client.me(&token).await {
        Ok(p) => p,
        Err(e) => error!("Failed to load profile: {}", e),
    };

    info!(
        "User: {} ({})",
        profile.display_name.as_deref().unwrap_or("-"),
        profile.id
    );
    info!(
        "Subscription: {}",
        if profile.is_premium() {
            "premium (full tracks on Spotify Connect devices)"
        } else {
            "free (30 second previews)"
        }
    );
    if let Some(country) = &profile.country {
        info!("Country: {}", country);
    }
    if let Some(followers) = &profile.followers {
        info!("Followers: {}", followers.total);
    }
}
