use reqwest::StatusCode;
use spotdeck::{
    management::{
        LIBRARY_PAGE_SIZE, PLAYLIST_PAGE_SIZE, RemovalError, TrackListManager, TrackSource,
        analyze_for_duplicates, fetch_all_tracks, remove_from_library, resolve_library,
        resolve_playlist,
    },
    spotify::ApiError,
    types::ApiTrack,
};

mod common;

use common::{FakeLibraryApi, api_track};

fn numbered(count: usize) -> Vec<ApiTrack> {
    (0..count)
        .map(|i| api_track(&format!("id{}", i), &format!("Song {}", i), "Band"))
        .collect()
}

fn ids(list: &TrackListManager) -> Vec<String> {
    list.tracks().iter().filter_map(|t| t.id.clone()).collect()
}

#[tokio::test]
async fn test_playlist_pages_cover_every_position() {
    let api = FakeLibraryApi::with_playlist(numbered(250).into_iter().map(Some).collect(), "s1");
    let source = resolve_playlist(&api, "token", "pl").await.unwrap();

    let tracks = fetch_all_tracks(&api, "token", &source).await.unwrap();

    assert_eq!(
        api.page_requests(),
        vec![
            (PLAYLIST_PAGE_SIZE, 0),
            (PLAYLIST_PAGE_SIZE, 100),
            (PLAYLIST_PAGE_SIZE, 200)
        ]
    );
    assert_eq!(tracks.len(), 250);
    assert!(tracks.iter().enumerate().all(|(i, t)| t.position == i));
    assert_eq!(tracks[137].id.as_deref(), Some("id137"));
}

#[tokio::test]
async fn test_empty_playlist_requests_no_pages() {
    let api = FakeLibraryApi::with_playlist(Vec::new(), "s1");
    let source = resolve_playlist(&api, "token", "pl").await.unwrap();

    let tracks = fetch_all_tracks(&api, "token", &source).await.unwrap();

    assert!(tracks.is_empty());
    assert!(api.page_requests().is_empty());
}

#[tokio::test]
async fn test_library_pages_use_smaller_limit() {
    let api = FakeLibraryApi::with_library(numbered(120));
    let source = resolve_library(&api, "token").await.unwrap();
    assert_eq!(source, TrackSource::Library { total: 120 });

    let tracks = fetch_all_tracks(&api, "token", &source).await.unwrap();

    // first request only reads the total
    assert_eq!(
        api.page_requests(),
        vec![
            (1, 0),
            (LIBRARY_PAGE_SIZE, 0),
            (LIBRARY_PAGE_SIZE, 50),
            (LIBRARY_PAGE_SIZE, 100)
        ]
    );
    assert_eq!(tracks.len(), 120);
    assert_eq!(tracks[119].position, 119);
    assert!(tracks.iter().all(|t| t.added_at.is_some()));
}

#[tokio::test]
async fn test_page_failure_fails_the_load() {
    let mut api = FakeLibraryApi::with_playlist(numbered(3).into_iter().map(Some).collect(), "s1");
    api.fail_pages = true;
    let source = resolve_playlist(&api, "token", "pl").await.unwrap();

    let result = TrackListManager::load(&api, "token", source).await;

    assert!(matches!(result, Err(ApiError::Status { .. })));
}

#[tokio::test]
async fn test_missing_playlist_entries_are_corrupted() {
    let api = FakeLibraryApi::with_playlist(
        vec![Some(api_track("a", "A", "X")), None, Some(api_track("c", "C", "X"))],
        "s1",
    );
    let source = resolve_playlist(&api, "token", "pl").await.unwrap();

    let list = TrackListManager::load(&api, "token", source).await.unwrap();

    assert!(list.tracks()[1].corrupted);
    assert_eq!(list.tracks()[1].position, 1);
    assert_eq!(list.removable(&[0, 1, 2]), vec![0, 2]);
}

#[test]
fn test_analysis_is_idempotent() {
    let tracks: Vec<_> = vec![
        api_track("a", "A", "X"),
        api_track("b", "A", "X"),
        api_track("c", "C", "X"),
        api_track("a", "A", "X"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, t)| spotdeck::types::Track::from_api(t, i, None))
    .collect();

    let first = analyze_for_duplicates(&tracks);
    assert_eq!(first, vec![1, 3]);
    assert_eq!(analyze_for_duplicates(&tracks), first);
}

#[tokio::test]
async fn test_playlist_duplicate_removal() {
    let api = FakeLibraryApi::with_playlist(
        vec![
            Some(api_track("a", "Song", "Band")),
            Some(api_track("b", "Song", "Band")),
            Some(api_track("c", "Other", "Band")),
        ],
        "abc",
    );
    let source = resolve_playlist(&api, "token", "pl").await.unwrap();
    let mut list = TrackListManager::load(&api, "token", source).await.unwrap();

    let duplicates = list.duplicates();
    assert_eq!(duplicates, vec![1]);

    let removed = list.remove(&api, "token", &duplicates).await.unwrap();

    assert_eq!(removed, 1);
    let removals = api.playlist_removals();
    assert_eq!(removals.len(), 1);
    assert_eq!(removals[0].playlist_id, "pl");
    assert_eq!(removals[0].positions, vec![1]);
    assert_eq!(removals[0].snapshot_id, "abc");

    assert_eq!(ids(&list), vec!["a", "c"]);
    assert_eq!(list.tracks()[1].position, 1);
    assert!(list.duplicates().is_empty());
    match list.source() {
        TrackSource::Playlist {
            snapshot_id, total, ..
        } => {
            assert_eq!(snapshot_id, "abc-next");
            assert_eq!(*total, 2);
        }
        other => panic!("unexpected source {:?}", other),
    }
}

#[tokio::test]
async fn test_snapshot_conflict_keeps_list() {
    let mut api = FakeLibraryApi::with_playlist(
        vec![
            Some(api_track("a", "Song", "Band")),
            Some(api_track("b", "Song", "Band")),
        ],
        "abc",
    );
    api.fail_playlist_removal = Some(StatusCode::CONFLICT);
    let source = resolve_playlist(&api, "token", "pl").await.unwrap();
    let mut list = TrackListManager::load(&api, "token", source.clone()).await.unwrap();

    let result = list.remove(&api, "token", &[1]).await;

    assert!(matches!(
        result,
        Err(RemovalError::Api(ApiError::SnapshotConflict(_)))
    ));
    assert_eq!(ids(&list), vec!["a", "b"]);
    assert_eq!(list.source(), &source);
}

#[tokio::test]
async fn test_corrupted_entries_are_never_sent() {
    let api = FakeLibraryApi::with_playlist(
        vec![Some(api_track("a", "A", "X")), None, Some(api_track("c", "C", "X"))],
        "s1",
    );
    let source = resolve_playlist(&api, "token", "pl").await.unwrap();
    let mut list = TrackListManager::load(&api, "token", source).await.unwrap();

    assert_eq!(list.remove(&api, "token", &[1]).await.unwrap(), 0);
    assert!(api.playlist_removals().is_empty());
    assert_eq!(list.tracks().len(), 3);
}

#[tokio::test]
async fn test_library_removal_is_batched() {
    let api = FakeLibraryApi::with_library(numbered(120));
    let source = resolve_library(&api, "token").await.unwrap();
    let mut list = TrackListManager::load(&api, "token", source).await.unwrap();
    let all: Vec<usize> = (0..120).collect();

    let removed = list.remove(&api, "token", &all).await.unwrap();

    assert_eq!(removed, 120);
    let mut batches = api.library_batches();
    batches.sort_by_key(|b| std::cmp::Reverse(b.len()));
    assert_eq!(
        batches.iter().map(Vec::len).collect::<Vec<_>>(),
        vec![50, 50, 20]
    );

    let mut sent: Vec<String> = batches.into_iter().flatten().collect();
    sent.sort();
    let mut expected: Vec<String> = (0..120).map(|i| format!("id{}", i)).collect();
    expected.sort();
    assert_eq!(sent, expected);

    assert!(list.tracks().is_empty());
    assert_eq!(list.source(), &TrackSource::Library { total: 0 });
}

#[tokio::test]
async fn test_failed_library_batch_keeps_list_and_reports_ids() {
    let mut api = FakeLibraryApi::with_library(numbered(120));
    api.failing_ids.insert("id60".to_string());
    let source = resolve_library(&api, "token").await.unwrap();
    let mut list = TrackListManager::load(&api, "token", source).await.unwrap();
    let all: Vec<usize> = (0..120).collect();

    let result = list.remove(&api, "token", &all).await;

    match result {
        Err(RemovalError::Batches {
            removed, failed, ..
        }) => {
            assert_eq!(removed.len(), 70);
            assert_eq!(failed.len(), 50);
            assert!(failed.contains(&"id60".to_string()));
            assert!(!removed.contains(&"id60".to_string()));
        }
        other => panic!("expected a batch failure, got {:?}", other),
    }
    assert_eq!(list.tracks().len(), 120);
    assert_eq!(api.library_batches().len(), 3);
}

#[tokio::test]
async fn test_remove_from_library_with_no_ids() {
    let api = FakeLibraryApi::default();

    remove_from_library(&api, "token", &[]).await.unwrap();

    assert!(api.library_batches().is_empty());
}

#[test]
fn test_source_context() {
    let playlist = TrackSource::Playlist {
        id: "pl".to_string(),
        uri: "spotify:playlist:pl".to_string(),
        snapshot_id: "s".to_string(),
        total: 3,
    };
    let library = TrackSource::Library { total: 3 };

    assert_eq!(
        playlist.context_uri(Some("me")).as_deref(),
        Some("spotify:playlist:pl")
    );
    assert_eq!(playlist.context_id(), "pl");
    assert_eq!(
        library.context_uri(Some("me")).as_deref(),
        Some("spotify:user:me:collection")
    );
    assert_eq!(library.context_uri(None), None);
    assert_eq!(library.context_id(), "collection");
}

#[tokio::test]
async fn test_repeated_indices_are_removed_once() {
    let api = FakeLibraryApi::with_playlist(numbered(4).into_iter().map(Some).collect(), "s1");
    let source = resolve_playlist(&api, "token", "pl").await.unwrap();
    let mut list = TrackListManager::load(&api, "token", source).await.unwrap();

    assert_eq!(list.removable(&[3, 1, 3, 1]), vec![3, 1]);
    let removed = list.remove(&api, "token", &[3, 1, 3]).await.unwrap();

    assert_eq!(removed, 2);
    assert_eq!(api.playlist_removals()[0].positions, vec![3, 1]);
    assert_eq!(ids(&list), vec!["id0", "id2"]);
    match list.source() {
        TrackSource::Playlist { total, .. } => assert_eq!(*total, 2),
        other => panic!("unexpected source {:?}", other),
    }
}

#[tokio::test]
async fn test_repeated_library_ids_are_sent_once() {
    let api = FakeLibraryApi::with_library(Vec::new());
    let ids: Vec<String> = (0..60)
        .chain(0..60)
        .map(|i| format!("id{}", i))
        .collect();

    remove_from_library(&api, "token", &ids).await.unwrap();

    let batches = api.library_batches();
    assert_eq!(batches.len(), 2);
    let mut sent: Vec<String> = batches.into_iter().flatten().collect();
    sent.sort();
    sent.dedup();
    assert_eq!(sent.len(), 60);
    assert_eq!(api.library_batches().iter().map(Vec::len).sum::<usize>(), 60);
}
