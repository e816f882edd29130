//! Integration tests for the dashboard module.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log_dashboard::dashboard::{AppState, BasicAuth, DashboardConfig, DashboardServer};
use log_dashboard::index::{EntryFilter, FileDescriptor, IndexMutator, TreeBuilder, TreeNode};
use reqwest::StatusCode;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

struct TestServer {
    _temp_dir: TempDir,
    root: PathBuf,
    addr: SocketAddr,
    cancel: CancellationToken,
    handle: JoinHandle<Result<(), log_dashboard::dashboard::DashboardError>>,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn stop(self) {
        self.cancel.cancel();
        let result = timeout(Duration::from_secs(2), self.handle).await;
        assert!(result.is_ok(), "Server should shut down within timeout");
    }
}

fn populate(root: &Path) {
    std::fs::write(root.join("app.log"), "GET /health 200\n").unwrap();
    std::fs::create_dir(root.join("archive")).unwrap();
    std::fs::write(root.join("archive").join("old.log"), "old entry\n").unwrap();
    std::fs::write(root.join("app-audit.json"), "{}").unwrap();
    std::fs::write(root.join(".secret"), "hidden").unwrap();
}

async fn start_server(auth: Option<BasicAuth>, stream_interval: Duration) -> TestServer {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    populate(&root);

    let mutator = IndexMutator::new(TreeBuilder::new(&root, EntryFilter::default()));
    mutator.on_ready();

    let cancel = CancellationToken::new();
    let state = AppState::new(mutator.reader(), cancel.clone()).with_stream_interval(stream_interval);

    // We need to bind manually to get an available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");

    let server = DashboardServer::new(state).with_config(DashboardConfig {
        port: addr.port(),
        host: "127.0.0.1".to_string(),
        auth,
        ..DashboardConfig::default()
    });
    let handle = tokio::spawn(server.serve(listener));

    TestServer {
        _temp_dir: temp_dir,
        root,
        addr,
        cancel,
        handle,
    }
}

/// Test graceful shutdown via `CancellationToken`.
#[tokio::test]
async fn test_dashboard_server_shutdown() {
    let server = start_server(None, Duration::from_secs(10)).await;
    let addr = server.addr;

    // Give server time to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Verify server is running by attempting a TCP connection
    let connect_result = tokio::net::TcpStream::connect(addr).await;
    assert!(
        connect_result.is_ok(),
        "Server should be accepting connections"
    );
    drop(connect_result);

    server.stop().await;

    // Verify server has stopped by checking connection is refused
    tokio::time::sleep(Duration::from_millis(100)).await;
    let connect_after = tokio::net::TcpStream::connect(addr).await;
    assert!(
        connect_after.is_err(),
        "Server should no longer accept connections"
    );
}

#[tokio::test]
async fn test_root_redirects_to_dashboard() {
    let server = start_server(None, Duration::from_secs(10)).await;

    let response = reqwest::get(server.url("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.url().path(), "/logs");
    let html = response.text().await.unwrap();
    assert!(html.contains("app.log"));
    assert!(html.contains("old.log"));
    assert!(!html.contains("app-audit.json"));
    assert!(!html.contains(".secret"));

    server.stop().await;
}

#[tokio::test]
async fn test_json_endpoints() {
    let server = start_server(None, Duration::from_secs(10)).await;

    let files: Vec<FileDescriptor> = reqwest::get(server.url("/api/files"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let tree: Vec<TreeNode> = reqwest::get(server.url("/api/tree"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let stats: serde_json::Value = reqwest::get(server.url("/api/stats"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let mut names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["app.log", "old.log"]);
    assert_eq!(tree.len(), 2);
    let archive = tree.iter().find(|n| n.name == "archive").unwrap();
    assert_eq!(archive.children.as_ref().map(Vec::len), Some(1));
    assert_eq!(stats["ready"], true);
    assert_eq!(stats["files"], 2);
    assert_eq!(stats["directories"], 1);

    server.stop().await;
}

#[tokio::test]
async fn test_view_and_download_status_mapping() {
    let server = start_server(None, Duration::from_secs(10)).await;
    let client = reqwest::Client::new();

    let view = client
        .get(server.url("/logs/view"))
        .query(&[("file", "app.log")])
        .send()
        .await
        .unwrap();
    assert_eq!(view.status(), StatusCode::OK);
    assert!(view.text().await.unwrap().contains("GET /health 200"));

    let absolute = server.root.join("archive").join("old.log");
    let download = client
        .get(server.url("/logs/download"))
        .query(&[("file", absolute.to_string_lossy().as_ref())])
        .send()
        .await
        .unwrap();
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(
        download
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .unwrap(),
        "attachment; filename=\"old.log\""
    );
    assert_eq!(download.text().await.unwrap(), "old entry\n");

    let cases = [
        (None, StatusCode::BAD_REQUEST),
        (Some("../../../../etc/passwd"), StatusCode::FORBIDDEN),
        (Some("/etc/passwd"), StatusCode::FORBIDDEN),
        (Some("missing.log"), StatusCode::NOT_FOUND),
        (Some("app-audit.json"), StatusCode::NOT_FOUND),
        (Some("archive"), StatusCode::BAD_REQUEST),
    ];
    for route in ["/logs/view", "/logs/download"] {
        for (file, expected) in cases {
            let mut request = client.get(server.url(route));
            if let Some(file) = file {
                request = request.query(&[("file", file)]);
            }
            let response = request.send().await.unwrap();
            assert_eq!(response.status(), expected, "{route} with {file:?}");
        }
    }

    server.stop().await;
}

#[tokio::test]
async fn test_basic_auth_required() {
    let auth = BasicAuth::new("admin", "hunter2", "Logs Dashboard");
    let server = start_server(Some(auth), Duration::from_secs(10)).await;
    let client = reqwest::Client::new();

    let anonymous = client.get(server.url("/api/files")).send().await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        anonymous
            .headers()
            .get(reqwest::header::WWW_AUTHENTICATE)
            .unwrap(),
        "Basic realm=\"Logs Dashboard\""
    );

    let wrong = client
        .get(server.url("/api/files"))
        .basic_auth("admin", Some("wrong"))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let authorized = client
        .get(server.url("/api/files"))
        .basic_auth("admin", Some("hunter2"))
        .send()
        .await
        .unwrap();
    assert_eq!(authorized.status(), StatusCode::OK);

    server.stop().await;
}

#[tokio::test]
async fn test_stream_pushes_immediately() {
    // Long interval: the first event must not wait for it.
    let server = start_server(None, Duration::from_secs(3600)).await;

    let mut response = reqwest::get(server.url("/logs/stream")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let chunk = timeout(Duration::from_secs(2), response.chunk())
        .await
        .expect("First SSE event should arrive immediately")
        .unwrap()
        .expect("Stream ended early");
    let text = String::from_utf8_lossy(&chunk);

    assert!(text.starts_with("data: ["), "Unexpected event: {text}");
    assert!(text.contains("app.log"));
    assert!(text.contains("size_kib"));

    // An open stream must not block graceful shutdown
    server.stop().await;
}

#[tokio::test]
async fn test_stream_repeats_on_interval() {
    let server = start_server(None, Duration::from_millis(50)).await;

    let mut response = reqwest::get(server.url("/logs/stream")).await.unwrap();
    let mut events = 0;
    let received = timeout(Duration::from_secs(3), async {
        while events < 3 {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    events += String::from_utf8_lossy(&chunk).matches("data: ").count();
                }
                _ => break,
            }
        }
    })
    .await;

    assert!(received.is_ok(), "Expected periodic SSE events");
    assert!(events >= 3);

    server.stop().await;
}
