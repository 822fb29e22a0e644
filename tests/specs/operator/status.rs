//! Host status classification specs

use crate::prelude::*;

#[tokio::test]
async fn host_summary_classifies_by_last_check_in() {
    let fleet = Fleet::new();
    let token = fleet.operator("alice", false).await;
    let now = fleet.clock.now();
    for (name, ago) in [
        ("online", chrono::Duration::minutes(20)),
        ("offline", chrono::Duration::hours(2)),
        ("mia", chrono::Duration::days(40)),
    ] {
        let key = fleet.enroll(name).await;
        let mut host = fleet.host(&key).await;
        host.seen_time = now - ago;
        fleet.store.save_host(&host).await.unwrap();
        let expected = match name {
            "online" => HostStatus::Online,
            "offline" => HostStatus::Offline,
            _ => HostStatus::Mia,
        };
        assert_eq!(host.status(now), expected, "{name}");
    }

    let (status, summary) = fleet.call(Method::GET, "/api/v1/kolide/host_summary", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary, json!({"online_count": 1, "offline_count": 1, "mia_count": 1}));
}

#[tokio::test]
async fn host_summary_requires_a_session() {
    let fleet = Fleet::new();

    let (status, _) = fleet.call(Method::GET, "/api/v1/kolide/host_summary", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
