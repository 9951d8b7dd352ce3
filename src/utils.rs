use std::collections::HashSet;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::Track;

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Number of pages of `limit` items needed to cover `total` items.
pub fn page_count(total: usize, limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

/// Splits `ids` into consecutive batches of at most `size` entries.
pub fn batch_ids(ids: &[String], size: usize) -> Vec<Vec<String>> {
    if size == 0 {
        return Vec::new();
    }
    ids.chunks(size).map(|chunk| chunk.to_vec()).collect()
}

fn duplicate_key(track: &Track) -> Option<String> {
    let name = track.name.trim().to_lowercase();
    if name.is_empty() {
        return None;
    }

    let mut artists: Vec<String> = track
        .artists
        .iter()
        .map(|a| a.name.trim().to_lowercase())
        .collect();
    artists.sort();

    Some(format!("{}|{}", name, artists.join(",")))
}

/// Returns the index of every track that repeats an earlier one.
///
/// Two tracks are equivalent when they share a Spotify id, or when their
/// normalized name and artist set match. The first occurrence of each group is
/// never reported.
pub fn find_duplicate_tracks(tracks: &[Track]) -> Vec<usize> {
    let mut seen_ids = HashSet::new();
    let mut seen_keys = HashSet::new();
    let mut duplicates = Vec::new();

    for (index, track) in tracks.iter().enumerate() {
        let id_seen = match &track.id {
            Some(id) => !seen_ids.insert(id.clone()),
            None => false,
        };
        let key_seen = match duplicate_key(track) {
            Some(key) => !seen_keys.insert(key),
            None => false,
        };

        if id_seen || key_seen {
            duplicates.push(index);
        }
    }

    duplicates
}

/// URIs of every track that has one, in list order.
pub fn playable_uris(tracks: &[Track]) -> Vec<String> {
    tracks.iter().filter_map(|t| t.uri.clone()).collect()
}

/// Drops the entries at `positions` (indices into `tracks`).
pub fn prune_positions(tracks: &mut Vec<Track>, positions: &[usize]) {
    let drop: HashSet<usize> = positions.iter().copied().collect();
    let mut index = 0;
    tracks.retain(|_| {
        let keep = !drop.contains(&index);
        index += 1;
        keep
    });
}

/// Drops every track whose id is in `ids`.
pub fn prune_ids(tracks: &mut Vec<Track>, ids: &[String]) {
    let drop: HashSet<&str> = ids.iter().map(String::as_str).collect();
    tracks.retain(|t| match &t.id {
        Some(id) => !drop.contains(id.as_str()),
        None => true,
    });
}

pub fn format_duration(duration_ms: u64) -> String {
    let total_secs = duration_ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
