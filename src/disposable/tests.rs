use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::error_handling::{ErrorType, InfoType, ProcessingStats};

const REMOTE_LIST: &str = "# remote list\ntempmail.test\nthrowaway.test\n";

fn source_with_stats(
    storage_dir: &Path,
    url: String,
) -> (DisposableDomainSource, Arc<ProcessingStats>) {
    let stats = Arc::new(ProcessingStats::new());
    let source = DisposableDomainSource::new(
        DisposableSettings {
            storage_dir: storage_dir.to_path_buf(),
            source_url: url,
            refresh_interval: Duration::from_secs(24 * 60 * 60),
        },
        reqwest::Client::new(),
        Arc::clone(&stats),
    );
    (source, stats)
}

fn source(storage_dir: &Path, url: String) -> DisposableDomainSource {
    source_with_stats(storage_dir, url).0
}

async fn serve_list(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/list.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REMOTE_LIST))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_initialize_downloads_and_matches_suffixes() {
    let server = MockServer::start().await;
    serve_list(&server, 1).await;
    let temp_dir = TempDir::new().unwrap();
    let source = source(temp_dir.path(), format!("{}/list.txt", server.uri()));

    assert!(!source.is_disposable("tempmail.test"));

    let report = source.initialize().await;

    assert!(report.downloaded);
    assert_eq!(report.domains, 2);
    assert_eq!(report.generation, 1);
    assert!(source.is_disposable("tempmail.test"));
    assert!(source.is_disposable("inbox.TempMail.test."));
    assert!(!source.is_disposable("example.test"));
    assert!(!source.is_disposable(""));
    assert!(source.custom_list_path().exists());
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let server = MockServer::start().await;
    serve_list(&server, 1).await;
    let temp_dir = TempDir::new().unwrap();
    let source = source(temp_dir.path(), format!("{}/list.txt", server.uri()));

    let first = source.initialize().await;
    let second = source.initialize().await;

    assert!(!second.downloaded);
    assert_eq!(first.generation, second.generation);
    assert_eq!(source.len(), 2);
}

#[tokio::test]
async fn test_fresh_cache_is_reused() {
    let server = MockServer::start().await;
    serve_list(&server, 1).await;
    let temp_dir = TempDir::new().unwrap();
    let url = format!("{}/list.txt", server.uri());

    source(temp_dir.path(), url.clone()).initialize().await;

    let second = source(temp_dir.path(), url);
    let report = second.initialize().await;

    assert!(!report.downloaded);
    assert!(second.is_disposable("throwaway.test"));
}

#[tokio::test]
async fn test_forced_refresh_downloads_again() {
    let server = MockServer::start().await;
    serve_list(&server, 2).await;
    let temp_dir = TempDir::new().unwrap();
    let source = source(temp_dir.path(), format!("{}/list.txt", server.uri()));

    source.initialize().await;
    let report = source.refresh(true).await;

    assert!(report.downloaded);
    assert_eq!(report.generation, 2);
}

#[tokio::test]
async fn test_failed_download_keeps_cached_copy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REMOTE_LIST))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/list.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let (source, stats) =
        source_with_stats(temp_dir.path(), format!("{}/list.txt", server.uri()));

    source.initialize().await;
    let report = source.refresh(true).await;

    assert!(!report.downloaded);
    assert_eq!(report.domains, 2);
    assert!(source.is_disposable("tempmail.test"));
    assert_eq!(stats.get_error_count(ErrorType::DisposableListFetchError), 1);
    assert_eq!(stats.get_info_count(InfoType::DisposableListDownloaded), 1);
}

#[tokio::test]
async fn test_unreachable_remote_still_serves_custom_list() {
    let temp_dir = TempDir::new().unwrap();
    let (source, stats) = source_with_stats(temp_dir.path(), "http://127.0.0.1:9/list.txt".into());
    std::fs::write(temp_dir.path().join("custom_disposable_domains.txt"), "local.test\n").unwrap();

    let report = source.initialize().await;

    assert!(!report.downloaded);
    assert!(source.is_disposable("local.test"));
    assert_eq!(stats.get_error_count(ErrorType::DisposableListFetchError), 1);
}

#[tokio::test]
async fn test_set_custom_file_reclassifies_immediately() {
    let server = MockServer::start().await;
    serve_list(&server, 1).await;
    let temp_dir = TempDir::new().unwrap();
    let source = source(temp_dir.path(), format!("{}/list.txt", server.uri()));
    source.initialize().await;

    let override_path = temp_dir.path().join("blocked.txt");
    std::fs::write(&override_path, "blocked.test\n").unwrap();
    assert!(!source.is_disposable("blocked.test"));

    let before = source.generation();
    let report = source.set_custom_file(Some(override_path)).await;

    assert_eq!(report.generation, before + 1);
    assert!(source.is_disposable("blocked.test"));
    assert!(source.is_disposable("tempmail.test"));

    source.set_custom_file(None).await;
    assert!(!source.is_disposable("blocked.test"));
}

#[tokio::test]
async fn test_set_custom_file_missing_path_is_not_fatal() {
    let server = MockServer::start().await;
    serve_list(&server, 1).await;
    let temp_dir = TempDir::new().unwrap();
    let source = source(temp_dir.path(), format!("{}/list.txt", server.uri()));
    source.initialize().await;

    let report = source
        .set_custom_file(Some(temp_dir.path().join("does-not-exist.txt")))
        .await;

    assert_eq!(report.domains, 2);
    assert!(source.is_disposable("tempmail.test"));
}

#[tokio::test]
async fn test_check_for_changes_picks_up_edits() {
    let server = MockServer::start().await;
    serve_list(&server, 1).await;
    let temp_dir = TempDir::new().unwrap();
    let source = source(temp_dir.path(), format!("{}/list.txt", server.uri()));
    source.initialize().await;

    assert!(source.check_for_changes().await.is_none());

    let custom = source.custom_list_path();
    let mut content = std::fs::read_to_string(&custom).unwrap();
    content.push_str("edited.test\n");
    std::fs::write(&custom, content).unwrap();

    let report = source.check_for_changes().await.expect("edit detected");
    assert!(!report.downloaded);
    assert_eq!(report.domains, 3);
    assert!(source.is_disposable("edited.test"));
    assert!(source.check_for_changes().await.is_none());
}

#[tokio::test]
async fn test_check_for_changes_backs_off_after_failed_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let source = source(temp_dir.path(), format!("{}/list.txt", server.uri()));

    source.initialize().await;

    // cache is still missing, but the failed attempt suppresses another download
    assert!(source.check_for_changes().await.is_none());
}

#[tokio::test]
async fn test_background_refresh_stops_on_cancel() {
    let server = MockServer::start().await;
    serve_list(&server, 1).await;
    let temp_dir = TempDir::new().unwrap();
    let source = Arc::new(source(temp_dir.path(), format!("{}/list.txt", server.uri())));
    source.initialize().await;

    let cancel = tokio_util::sync::CancellationToken::new();
    let handle = source.spawn_background_refresh(Duration::from_millis(20), cancel.clone());

    let custom = source.custom_list_path();
    std::fs::write(&custom, "watched.test\n").unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !source.is_disposable("watched.test") && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(source.is_disposable("watched.test"));

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("refresher exits after cancellation")
        .unwrap();
}
