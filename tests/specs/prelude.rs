//! Shared fixture: a fully wired control plane behind its router.

use std::sync::Arc;
use std::time::Duration;

pub use axum::http::{Method, StatusCode};
pub use fleet_core::{Clock, Host, HostStatus, Label, LabelType};
pub use fleet_storage::Datastore;
pub use fleet_wire::QueryKey;
pub use serde_json::{json, Value};

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use chrono::TimeZone;
use fleet_core::{FakeClock, User};
use fleet_daemon::{router, AppState, Config, LocalBus, LogSink, ResultStore, Service};
use fleet_storage::MemStore;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

pub const SECRET: &str = "s";

pub struct Fleet {
    pub app: Router,
    pub service: Service,
    pub store: Arc<MemStore>,
    pub bus: Arc<LocalBus>,
    pub clock: FakeClock,
    _dir: TempDir,
}

impl Fleet {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.osquery.enroll_secret = SECRET.to_string();
        config.osquery.status_log_file = dir.path().join("osquery_status");
        config.osquery.result_log_file = dir.path().join("osquery_result");

        let store = Arc::new(MemStore::new());
        let bus = Arc::new(LocalBus::default());
        let clock = FakeClock::at(chrono::Utc.with_ymd_and_hms(2017, 1, 10, 12, 0, 0).unwrap());
        let service = Service::new(
            Arc::clone(&store) as Arc<dyn Datastore>,
            Arc::clone(&bus) as Arc<dyn ResultStore>,
            Arc::new(LogSink::open(&config.osquery.status_log_file).unwrap()),
            Arc::new(LogSink::open(&config.osquery.result_log_file).unwrap()),
            Arc::new(clock.clone()),
            Arc::new(config),
        );
        let app = router(AppState::new(service.clone(), CancellationToken::new()));
        Self { app, service, store, bus, clock, _dir: dir }
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// POST an agent endpoint under `/api/v1/osquery`.
    pub async fn agent(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, &format!("/api/v1/osquery/{path}"), None, Some(body)).await
    }

    /// Enroll `identifier` and return its node key.
    pub async fn enroll(&self, identifier: &str) -> String {
        let body = json!({"enroll_secret": SECRET, "host_identifier": identifier});
        let (status, value) = self.agent("enroll", body).await;
        assert_eq!(status, StatusCode::OK, "{value}");
        value["node_key"].as_str().unwrap().to_string()
    }

    pub async fn host(&self, node_key: &str) -> Host {
        self.store.authenticate_host(node_key).await.unwrap()
    }

    /// Enroll and record `platform` as if the agent reported it.
    pub async fn enroll_on(&self, identifier: &str, platform: &str) -> (String, Host) {
        let key = self.enroll(identifier).await;
        let mut host = self.host(&key).await;
        host.platform = platform.to_string();
        self.store.save_host(&host).await.unwrap();
        (key, host)
    }

    pub async fn read(&self, node_key: &str) -> Value {
        let (status, value) = self.agent("distributed/read", json!({"node_key": node_key})).await;
        assert_eq!(status, StatusCode::OK, "{value}");
        value
    }

    pub async fn write(&self, node_key: &str, queries: Value, statuses: Value) {
        let body = json!({"node_key": node_key, "queries": queries, "statuses": statuses});
        let (status, value) = self.agent("distributed/write", body).await;
        assert_eq!((status, value), (StatusCode::OK, json!({})));
    }

    pub async fn label(&self, name: &str, platform: &str, query: &str) -> Label {
        let label = Label {
            id: Default::default(),
            name: name.to_string(),
            description: String::new(),
            query: query.to_string(),
            platform: platform.to_string(),
            label_type: LabelType::Regular,
        };
        self.store.new_label(label).await.unwrap()
    }

    /// Create an operator and return its bearer token.
    pub async fn operator(&self, username: &str, admin: bool) -> String {
        let user = User::builder()
            .username(username)
            .email(format!("{username}@example.com"))
            .admin(admin)
            .build();
        let user = self.store.new_user(user).await.unwrap();
        let token = format!("token-{username}");
        self.store.new_session(user.id, &token, self.clock.now()).await.unwrap();
        token
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}

pub fn detail_keys(read: &Value) -> usize {
    read["queries"]
        .as_object()
        .map(|q| q.keys().filter(|k| k.starts_with("kolide_detail_query_")).count())
        .unwrap_or(0)
}
