// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn test_config(dir: &TempDir, address: &str) -> Config {
    let mut config = Config::default();
    config.server.address = address.to_string();
    config.osquery.status_log_file = dir.path().join("logs").join("osquery_status");
    config.osquery.result_log_file = dir.path().join("logs").join("osquery_result");
    config
}

async fn get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn startup_serves_and_shuts_down_on_cancel() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = startup(test_config(&dir, "127.0.0.1:0")).await.unwrap();
    let addr = daemon.local_addr().unwrap();
    let cancel = daemon.cancel.clone();
    let server = tokio::spawn(daemon.serve());

    let response = get(addr, "/healthz").await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.ends_with(r#"{"store":true,"bus":true}"#), "{response}");

    cancel.cancel();
    server.await.unwrap().unwrap();
    assert!(dir.path().join("logs").join("osquery_status").exists());
}

#[tokio::test]
async fn startup_fails_when_address_is_taken() {
    let dir = tempfile::tempdir().unwrap();
    let held = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = held.local_addr().unwrap().to_string();

    let err = startup(test_config(&dir, &address)).await.err().unwrap();

    assert!(matches!(err, LifecycleError::BindFailed(ref a, _) if *a == address), "{err}");
}

#[tokio::test]
async fn startup_fails_on_unwritable_log_path() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "").unwrap();
    let mut config = test_config(&dir, "127.0.0.1:0");
    config.osquery.status_log_file = blocker.join("osquery_status");

    assert!(matches!(startup(config).await, Err(LifecycleError::Sink(_))));
}
