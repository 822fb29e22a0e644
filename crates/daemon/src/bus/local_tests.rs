// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fleet_core::test_support::row;
use fleet_core::{DistributedQueryResult, HostId, HostIdentity};

fn result(campaign: u64, host: u64, value: &str) -> BusMessage {
    BusMessage::Result(DistributedQueryResult {
        distributed_query_campaign_id: CampaignId::new(campaign),
        host: HostIdentity { id: HostId::new(host), hostname: format!("host-{host}") },
        rows: vec![row(&[("a", value)])],
        error: None,
    })
}

#[tokio::test]
async fn publish_without_subscriber_fails() {
    let bus = LocalBus::default();
    let err = bus.publish(CampaignId::new(1), result(1, 1, "x")).await.unwrap_err();
    assert_eq!(err, BusError::NoSubscriber(CampaignId::new(1)));
}

#[tokio::test]
async fn every_subscriber_receives_every_payload_in_order() {
    let bus = LocalBus::default();
    let campaign = CampaignId::new(7);
    let mut first = bus.subscribe(campaign).await.unwrap();
    let mut second = bus.subscribe(campaign).await.unwrap();
    assert_eq!(bus.subscriber_count(campaign), 2);

    for value in ["1", "2", "3"] {
        bus.publish(campaign, result(7, 1, value)).await.unwrap();
    }

    for sub in [&mut first, &mut second] {
        for value in ["1", "2", "3"] {
            assert_eq!(sub.recv().await, Some(result(7, 1, value)));
        }
    }
}

#[tokio::test]
async fn payloads_before_subscribe_are_not_replayed() {
    let bus = LocalBus::default();
    let campaign = CampaignId::new(3);
    let _early = bus.subscribe(campaign).await.unwrap();
    bus.publish(campaign, result(3, 1, "before")).await.unwrap();

    let mut late = bus.subscribe(campaign).await.unwrap();
    bus.publish(campaign, result(3, 1, "after")).await.unwrap();

    assert_eq!(late.recv().await, Some(result(3, 1, "after")));
}

#[tokio::test]
async fn campaigns_are_isolated() {
    let bus = LocalBus::default();
    let mut one = bus.subscribe(CampaignId::new(1)).await.unwrap();
    let _two = bus.subscribe(CampaignId::new(2)).await.unwrap();

    bus.publish(CampaignId::new(2), result(2, 1, "other")).await.unwrap();
    bus.publish(CampaignId::new(1), result(1, 1, "mine")).await.unwrap();

    assert_eq!(one.recv().await, Some(result(1, 1, "mine")));
}

#[tokio::test]
async fn dropping_subscription_releases_channel() {
    let bus = LocalBus::default();
    let campaign = CampaignId::new(4);
    let first = bus.subscribe(campaign).await.unwrap();
    let second = bus.subscribe(campaign).await.unwrap();

    drop(first);
    assert_eq!(bus.subscriber_count(campaign), 1);
    assert_eq!(bus.open_channels(), 1);

    drop(second);
    assert_eq!(bus.subscriber_count(campaign), 0);
    assert_eq!(bus.open_channels(), 0);
    assert!(matches!(
        bus.publish(campaign, result(4, 1, "late")).await,
        Err(BusError::NoSubscriber(_))
    ));
}

#[tokio::test]
async fn full_buffer_drops_newest_payloads() {
    let bus = LocalBus::new(2);
    let campaign = CampaignId::new(5);
    let mut sub = bus.subscribe(campaign).await.unwrap();

    for value in ["1", "2", "3"] {
        bus.publish(campaign, result(5, 1, value)).await.unwrap();
    }

    assert_eq!(sub.recv().await, Some(result(5, 1, "1")));
    assert_eq!(sub.recv().await, Some(result(5, 1, "2")));
    bus.publish(campaign, result(5, 1, "4")).await.unwrap();
    assert_eq!(sub.recv().await, Some(result(5, 1, "4")));
}

#[tokio::test]
async fn error_payloads_are_delivered() {
    let bus = LocalBus::default();
    let campaign = CampaignId::new(6);
    let mut sub = bus.subscribe(campaign).await.unwrap();

    bus.publish(campaign, BusMessage::Error("decode failed".to_string())).await.unwrap();
    assert_eq!(sub.recv().await, Some(BusMessage::Error("decode failed".to_string())));
    assert!(bus.health_check().await.is_ok());
}
