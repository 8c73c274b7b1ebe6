//! Integration tests for the download engine.
//!
//! These run the real HTTP fetcher and atomic writer against a mock server
//! and a scratch directory.

use std::path::Path;
use std::time::Duration;

use grabber_core::{
    CatalogEntry, CatalogOptions, DownloadEngine, DownloadTarget, RunConfiguration, prepare,
    resolve_targets,
};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::socket_guard::{should_skip_socket_bound_test, start_mock_server_or_skip};

macro_rules! require_mock_server {
    () => {{
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        mock_server
    }};
}

// ==================== Helper Functions ====================

fn config(dir: &Path, concurrency: usize, timeout: Duration) -> RunConfiguration {
    RunConfiguration::new(concurrency, timeout, false, dir).unwrap()
}

async fn mount_file(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

fn target(server: &MockServer, dir: &Path, name: &str) -> DownloadTarget {
    DownloadTarget::new(format!("{}/media/{name}", server.uri()), dir.join(name))
}

/// Serves `200 OK` announcing `declared` bytes, sends `sent` of them, then
/// holds the connection open without sending more.
async fn spawn_stalling_server(declared: usize, sent: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = [0_u8; 1024];
                let _ = socket.read(&mut request).await;
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: {declared}\r\n\r\n"
                );
                if socket.write_all(head.as_bytes()).await.is_err() {
                    return;
                }
                let _ = socket.write_all(&vec![0xAB_u8; sent]).await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
    });
    format!("http://{addr}")
}

fn temp_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect()
}

// ==================== Batch Scenarios ====================

#[tokio::test]
async fn test_three_targets_limit_two_all_succeed() {
    let mock_server = require_mock_server!();
    for name in ["a.jpg", "b.jpg", "c.jpg"] {
        mount_file(&mock_server, &format!("/media/{name}"), name.as_bytes()).await;
    }
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    let engine = DownloadEngine::new(&config(dir, 2, Duration::from_secs(5))).unwrap();
    let targets = ["a.jpg", "b.jpg", "c.jpg"]
        .iter()
        .map(|name| target(&mock_server, dir, name))
        .collect();
    let summary = engine.run(targets).await.unwrap();

    assert_eq!(
        (summary.succeeded(), summary.skipped(), summary.failed()),
        (3, 0, 0)
    );
    for name in ["a.jpg", "b.jpg", "c.jpg"] {
        assert_eq!(std::fs::read(dir.join(name)).unwrap(), name.as_bytes());
    }
    assert!(temp_files(dir).is_empty());
}

#[tokio::test]
async fn test_timeout_fails_only_its_own_target() {
    let mock_server = require_mock_server!();
    mount_file(&mock_server, "/media/fast.jpg", b"fast").await;
    Mock::given(method("GET"))
        .and(path("/media/slow.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"slow".to_vec())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    let engine = DownloadEngine::new(&config(dir, 2, Duration::from_millis(300))).unwrap();
    let slow = target(&mock_server, dir, "slow.jpg");
    let slow_url = slow.source_url().to_string();
    let summary = engine
        .run(vec![target(&mock_server, dir, "fast.jpg"), slow])
        .await
        .unwrap();

    assert_eq!(
        (summary.succeeded(), summary.skipped(), summary.failed()),
        (1, 0, 1)
    );
    assert_eq!(summary.failed_urls().to_vec(), vec![slow_url]);
    assert!(dir.join("fast.jpg").exists());
    assert!(!dir.join("slow.jpg").exists());
    assert!(temp_files(dir).is_empty());
}

#[tokio::test]
async fn test_second_run_skips_everything() {
    let mock_server = require_mock_server!();
    for name in ["a.jpg", "b.jpg"] {
        Mock::given(method("GET"))
            .and(path(format!("/media/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let engine = DownloadEngine::new(&config(dir, 2, Duration::from_secs(5))).unwrap();
    let targets = || {
        vec![
            target(&mock_server, dir, "a.jpg"),
            target(&mock_server, dir, "b.jpg"),
        ]
    };

    let first = engine.run(targets()).await.unwrap();
    let second = engine.run(targets()).await.unwrap();

    assert_eq!(first.succeeded(), 2);
    assert_eq!(
        (second.succeeded(), second.skipped(), second.failed()),
        (0, 2, 0)
    );
}

#[tokio::test]
async fn test_rerun_with_one_file_present() {
    let mock_server = require_mock_server!();
    mount_file(&mock_server, "/media/b.jpg", b"fresh").await;
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    std::fs::write(dir.join("a.jpg"), b"from an earlier run").unwrap();
    std::fs::write(dir.join("b.jpg.tmp"), b"killed mid-stream").unwrap();

    let engine = DownloadEngine::new(&config(dir, 2, Duration::from_secs(5))).unwrap();
    let summary = engine
        .run(vec![
            target(&mock_server, dir, "a.jpg"),
            target(&mock_server, dir, "b.jpg"),
        ])
        .await
        .unwrap();

    assert_eq!(
        (summary.succeeded(), summary.skipped(), summary.failed()),
        (1, 1, 0)
    );
    assert_eq!(
        std::fs::read(dir.join("a.jpg")).unwrap(),
        b"from an earlier run"
    );
    assert_eq!(std::fs::read(dir.join("b.jpg")).unwrap(), b"fresh");
    assert!(temp_files(dir).is_empty());
}

#[tokio::test]
async fn test_http_errors_are_counted_and_listed() {
    let mock_server = require_mock_server!();
    mount_file(&mock_server, "/media/ok.jpg", b"ok").await;
    Mock::given(method("GET"))
        .and(path("/media/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    let engine = DownloadEngine::new(&config(dir, 1, Duration::from_secs(5))).unwrap();
    let summary = engine
        .run(vec![
            target(&mock_server, dir, "gone.jpg"),
            target(&mock_server, dir, "ok.jpg"),
        ])
        .await
        .unwrap();

    assert_eq!(summary.total(), 2);
    assert_eq!(summary.failed(), 1);
    assert!(summary.failed_urls()[0].ends_with("/media/gone.jpg"));
    assert!(!dir.join("gone.jpg").exists());
}

#[tokio::test]
async fn test_timeout_mid_body_discards_partial_temp_files() {
    if should_skip_socket_bound_test() {
        return;
    }
    let base = spawn_stalling_server(100_000, 20_000).await;
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    let engine = DownloadEngine::new(&config(dir, 2, Duration::from_millis(500))).unwrap();
    let targets = (0..5)
        .map(|i| {
            let name = format!("stall-{i}.jpg");
            DownloadTarget::new(format!("{base}/media/{name}"), dir.join(&name))
        })
        .collect();
    let summary = engine.run(targets).await.unwrap();

    assert_eq!(
        (summary.succeeded(), summary.skipped(), summary.failed()),
        (0, 0, 5)
    );
    assert_eq!(std::fs::read_dir(dir).unwrap().count(), 0);
    // Five stalled fetches through two slots take at least three timeouts.
    assert!(
        summary.elapsed() >= Duration::from_millis(1_400),
        "elapsed {:?}",
        summary.elapsed()
    );
}

// ==================== Catalog To Disk ====================

#[tokio::test]
async fn test_catalog_targets_download_into_prepared_directory() {
    let mock_server = require_mock_server!();
    mount_file(&mock_server, "/media/100/content/S134-E-000001.jpg", b"one").await;
    mount_file(&mock_server, "/media/101/content/S134-E-000002.jpg", b"two").await;
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("download");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("stale.jpg"), b"old").unwrap();

    let entries: Vec<CatalogEntry> = serde_json::from_str(
        r#"[
            {"naId": "100", "localIdentifier": "S134-E-000001.jpg", "title": "STS-134 - Launch"},
            {"naId": "101", "localIdentifier": "S134-E-000002.jpg", "title": "STS-134 - Landing"},
            {"naId": "102", "localIdentifier": "S134-E-000003.tif", "title": "STS-134 - Tiff"},
            {"naId": "103", "title": "no identifier"}
        ]"#,
    )
    .unwrap();
    let options = CatalogOptions {
        media_base_url: format!("{}/media/", mock_server.uri()),
        content_path: "content".to_string(),
        extension: "jpg".to_string(),
    };
    let config = RunConfiguration::new(2, Duration::from_secs(5), true, &dir).unwrap();

    let resolved = resolve_targets(&entries, &options, config.destination_dir()).unwrap();
    prepare(&config).await.unwrap();
    let summary = DownloadEngine::new(&config)
        .unwrap()
        .run(resolved.targets)
        .await
        .unwrap();

    assert_eq!(summary.succeeded(), 2);
    assert!(!dir.join("stale.jpg").exists());
    assert_eq!(std::fs::read(dir.join("S134-E-000001.jpg")).unwrap(), b"one");
    assert_eq!(std::fs::read(dir.join("S134-E-000002.jpg")).unwrap(), b"two");
}
