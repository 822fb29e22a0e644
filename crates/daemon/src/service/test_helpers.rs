// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for service-level tests.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use fleet_core::{FakeClock, Host, Label, LabelId, LabelType, User};
use fleet_storage::{Datastore, MemStore};
use tempfile::TempDir;

use super::{Service, Viewer};
use crate::bus::{LocalBus, ResultStore};
use crate::config::Config;
use crate::logsink::LogSink;

pub(crate) const SECRET: &str = "s";

pub(crate) struct Harness {
    pub service: Service,
    pub store: Arc<MemStore>,
    pub bus: Arc<LocalBus>,
    pub clock: FakeClock,
    pub dir: TempDir,
}

pub(crate) fn harness() -> Harness {
    let mut config = Config::default();
    config.osquery.enroll_secret = SECRET.to_string();
    harness_with(config)
}

pub(crate) fn harness_with(mut config: Config) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    config.osquery.status_log_file = dir.path().join("osquery_status");
    config.osquery.result_log_file = dir.path().join("osquery_result");

    let store = Arc::new(MemStore::new());
    let bus = Arc::new(LocalBus::default());
    let clock = FakeClock::at(Utc.with_ymd_and_hms(2017, 1, 10, 12, 0, 0).unwrap());
    let status_log = Arc::new(LogSink::open(&config.osquery.status_log_file).unwrap());
    let result_log = Arc::new(LogSink::open(&config.osquery.result_log_file).unwrap());

    let service = Service::new(
        Arc::clone(&store) as Arc<dyn Datastore>,
        Arc::clone(&bus) as Arc<dyn ResultStore>,
        status_log,
        result_log,
        Arc::new(clock.clone()),
        Arc::new(config),
    );
    Harness { service, store, bus, clock, dir }
}

impl Harness {
    /// Enroll `identifier` and return its node key and host.
    pub async fn enroll(&self, identifier: &str) -> (String, Host) {
        let key = self.service.enroll_agent(SECRET, identifier).await.unwrap();
        let host = self.store.authenticate_host(&key).await.unwrap();
        (key, host)
    }

    /// Enroll `identifier` reporting `platform`.
    pub async fn enroll_on(&self, identifier: &str, platform: &str) -> Host {
        let (_, mut host) = self.enroll(identifier).await;
        host.platform = platform.to_string();
        self.store.save_host(&host).await.unwrap();
        host
    }

    pub async fn label(&self, name: &str, platform: &str) -> Label {
        let label = Label::builder()
            .name(name)
            .query("select 1")
            .platform(platform)
            .label_type(LabelType::Regular)
            .build();
        self.store.new_label(label).await.unwrap()
    }

    /// Record `host` as a member of `label_id`.
    pub async fn join(&self, host: &Host, label_id: LabelId) {
        let results = [(label_id, true)].into_iter().collect();
        self.store.record_label_query_executions(host, &results, self.clock_now()).await.unwrap();
    }

    pub async fn viewer(&self, username: &str, admin: bool) -> Viewer {
        let user = User::builder()
            .username(username)
            .email(format!("{username}@example.com"))
            .admin(admin)
            .build();
        let user = self.store.new_user(user).await.unwrap();
        let key = format!("token-{username}");
        let session = self.store.new_session(user.id, &key, self.clock_now()).await.unwrap();
        Viewer { user, session }
    }

    pub fn clock_now(&self) -> chrono::DateTime<Utc> {
        use fleet_core::Clock;
        self.clock.now()
    }

    pub fn read_log(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).unwrap_or_default()
    }
}
