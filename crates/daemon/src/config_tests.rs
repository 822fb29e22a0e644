// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;
use std::io::Write;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> =
        vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();
    assert_eq!(config.server.address, "0.0.0.0:8080");
    assert_eq!(config.osquery.node_key_size, 24);
    assert_eq!(config.osquery.enroll_secret, "");
    assert_eq!(config.osquery.status_log_file, PathBuf::from("/tmp/osquery_status"));
    assert_eq!(config.osquery.result_log_file, PathBuf::from("/tmp/osquery_result"));
    assert_eq!(config.osquery.detail_update_interval(), Duration::from_secs(3600));
    assert_eq!(config.osquery.label_update_interval(), Duration::from_secs(3600));
    assert_eq!(config.session.expiration(), Duration::from_secs(7_776_000));
    assert_eq!(config.live_query.io_timeout(), Duration::from_secs(3));
    assert_eq!(config.live_query.tick(), Duration::from_secs(1));
    assert_eq!(config.logging.file, None);
}

#[test]
fn partial_file_keeps_defaults_for_missing_keys() {
    let config = Config::parse(
        r#"
        [osquery]
        enroll_secret = "s3cret"
        node_key_size = 32

        [live_query]
        tick_ms = 250
        "#,
    )
    .unwrap();

    assert_eq!(config.osquery.enroll_secret, "s3cret");
    assert_eq!(config.osquery.node_key_size, 32);
    assert_eq!(config.osquery.detail_update_interval, 3600);
    assert_eq!(config.live_query.tick(), Duration::from_millis(250));
    assert_eq!(config.live_query.io_timeout_ms, 3000);
    assert_eq!(config.server, ServerSettings::default());
}

#[test]
fn unknown_keys_are_rejected() {
    let err = Config::parse("[osquery]\nenrol_secret = \"typo\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn overrides_replace_file_values() {
    let mut config = Config::parse("[osquery]\nenroll_secret = \"file\"\n").unwrap();
    config
        .apply_overrides(lookup(&[
            ("FLEET_OSQUERY_ENROLL_SECRET", "env"),
            ("FLEET_SERVER_ADDRESS", "127.0.0.1:9000"),
            ("FLEET_LIVE_QUERY_IO_TIMEOUT_MS", "500"),
            ("FLEET_LOGGING_FILE", "/var/log/fleet/fleetd.log"),
        ]))
        .unwrap();

    assert_eq!(config.osquery.enroll_secret, "env");
    assert_eq!(config.server.address, "127.0.0.1:9000");
    assert_eq!(config.live_query.io_timeout(), Duration::from_millis(500));
    assert_eq!(config.logging.file, Some(PathBuf::from("/var/log/fleet/fleetd.log")));
}

#[yare::parameterized(
    key_size = { "FLEET_OSQUERY_NODE_KEY_SIZE" },
    interval = { "FLEET_OSQUERY_DETAIL_UPDATE_INTERVAL" },
    tick     = { "FLEET_LIVE_QUERY_TICK_MS" },
)]
fn non_numeric_override_is_invalid(name: &str) {
    let mut config = Config::default();
    let err = config.apply_overrides(lookup(&[(name, "soon")])).unwrap_err();
    match err {
        ConfigError::Invalid { key, value } => {
            assert_eq!(key, name);
            assert_eq!(value, "soon");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn from_file_reads_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[session]\nexpiration_seconds = 60").unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.session.expiration(), Duration::from_secs(60));
}

#[test]
fn from_file_reports_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Read { path: p, .. } if p == path));
}

#[test]
#[serial_test::serial]
fn load_applies_process_environment() {
    std::env::set_var("FLEET_OSQUERY_LABEL_UPDATE_INTERVAL", "120");
    let config = Config::load(None);
    std::env::remove_var("FLEET_OSQUERY_LABEL_UPDATE_INTERVAL");

    assert_eq!(config.unwrap().osquery.label_update_interval(), Duration::from_secs(120));
}
