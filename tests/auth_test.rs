use chrono::Utc;
use spotdeck::{management::TokenManager, types::Token};

fn token_obtained(seconds_ago: u64, expires_in: u64) -> Token {
    Token {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        scope: "user-read-private".to_string(),
        expires_in,
        obtained_at: Utc::now().timestamp() as u64 - seconds_ago,
    }
}

#[test]
fn test_fresh_token_is_valid() {
    let manager = TokenManager::new(token_obtained(0, 3600));
    assert!(!manager.is_expired());
}

#[test]
fn test_token_expiring_within_margin_is_stale() {
    // 3 minutes left, below the 4 minute margin
    let manager = TokenManager::new(token_obtained(3600 - 180, 3600));
    assert!(manager.is_expired());
}

#[test]
fn test_expired_token_is_stale() {
    let manager = TokenManager::new(token_obtained(7200, 3600));
    assert!(manager.is_expired());
    assert_eq!(manager.current_token().refresh_token, "refresh");
}
