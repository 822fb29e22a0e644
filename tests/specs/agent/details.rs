//! Detail query refresh specs

use crate::prelude::*;
use std::time::Duration;

fn detail_results() -> Value {
    json!({
        "kolide_detail_query_osquery_info": [{"build_platform": "darwin", "version": "1.8.2"}],
        "kolide_detail_query_system_info": [
            {"hostname": "computer.local", "uuid": "uuid", "physical_memory": "17179869184"}
        ],
        "kolide_detail_query_os_version": [{"name": "Mac OS X", "major": "10", "minor": "10", "patch": "6"}],
        "kolide_detail_query_uptime": [{"total_seconds": "1730893"}],
    })
}

#[tokio::test]
async fn new_host_is_asked_for_details_with_acceleration() {
    let fleet = Fleet::new();
    let key = fleet.enroll("host123").await;

    let read = fleet.read(&key).await;

    assert!(detail_keys(&read) > 0, "{read}");
    assert!(read["accelerate"].as_u64().unwrap_or(0) > 0, "{read}");
}

#[tokio::test]
async fn details_are_folded_and_silenced_until_due() {
    let fleet = Fleet::new();
    let key = fleet.enroll("host123").await;
    fleet.read(&key).await;

    fleet.write(&key, detail_results(), json!({})).await;

    let host = fleet.host(&key).await;
    assert_eq!(host.platform, "darwin");
    assert_eq!(host.osquery_version, "1.8.2");
    assert_eq!(host.host_name, "computer.local");
    assert_eq!(host.os_version, "Mac OS X 10.10.6");
    assert_eq!(host.uptime, Duration::from_secs(1_730_893));
    assert_eq!(host.detail_update_time, fleet.clock.now());

    let read = fleet.read(&key).await;
    assert_eq!(detail_keys(&read), 0, "{read}");
    assert!(read.get("accelerate").is_none(), "{read}");

    fleet.advance(Duration::from_secs(3600 + 60));
    let read = fleet.read(&key).await;
    assert!(detail_keys(&read) > 0, "{read}");
}

#[tokio::test]
async fn details_are_due_exactly_at_the_interval() {
    let fleet = Fleet::new();
    let key = fleet.enroll("host123").await;
    fleet.write(&key, detail_results(), json!({})).await;

    fleet.advance(Duration::from_secs(3599));
    assert_eq!(detail_keys(&fleet.read(&key).await), 0);

    fleet.advance(Duration::from_secs(1));
    assert!(detail_keys(&fleet.read(&key).await) > 0);
}
