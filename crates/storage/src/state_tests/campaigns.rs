// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fleet_core::CampaignStatus;

async fn running_campaign(store: &MemStore, sql: &str) -> DistributedQueryCampaign {
    let query = store
        .new_query(Query {
            id: QueryId::default(),
            name: "distributed".to_string(),
            description: String::new(),
            query: sql.to_string(),
            saved: false,
            author_id: None,
        })
        .await
        .unwrap();
    store
        .new_campaign(DistributedQueryCampaign {
            id: CampaignId::default(),
            query_id: query.id,
            user_id: UserId::new(1),
            status: CampaignStatus::Running,
            created_at: t0(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn waiting_execution_exposes_campaign_query() {
    let store = MemStore::new();
    let host = enrolled(&store, "h1", "linux").await;
    let campaign = running_campaign(&store, "select 1").await;

    assert!(store.distributed_queries_for_host(&host).await.unwrap().is_empty());

    store
        .new_distributed_query_execution(DistributedQueryExecution::waiting(host.id, campaign.id))
        .await
        .unwrap();
    let queries = store.distributed_queries_for_host(&host).await.unwrap();
    assert_eq!(queries, BTreeMap::from([(campaign.id, "select 1".to_string())]));

    store
        .update_execution(host.id, campaign.id, ExecutionStatus::Requested, None)
        .await
        .unwrap();
    assert!(store.distributed_queries_for_host(&host).await.unwrap().is_empty());
}

#[tokio::test]
async fn finished_campaigns_are_not_offered() {
    let store = MemStore::new();
    let host = enrolled(&store, "h1", "linux").await;
    let mut campaign = running_campaign(&store, "select 1").await;
    store
        .new_distributed_query_execution(DistributedQueryExecution::waiting(host.id, campaign.id))
        .await
        .unwrap();

    campaign.status = CampaignStatus::Complete;
    store.save_campaign(&campaign).await.unwrap();

    assert!(store.distributed_queries_for_host(&host).await.unwrap().is_empty());
}

#[tokio::test]
async fn execution_moves_forward_only() {
    let store = MemStore::new();
    let host = enrolled(&store, "h1", "linux").await;
    let campaign = running_campaign(&store, "select 1").await;
    store
        .new_distributed_query_execution(DistributedQueryExecution::waiting(host.id, campaign.id))
        .await
        .unwrap();

    let err = store
        .update_execution(host.id, campaign.id, ExecutionStatus::Succeeded, None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    store
        .update_execution(host.id, campaign.id, ExecutionStatus::Requested, None)
        .await
        .unwrap();
    let failed = store
        .update_execution(host.id, campaign.id, ExecutionStatus::Failed, Some("boom".to_string()))
        .await
        .unwrap();
    assert_eq!(failed.error.as_deref(), Some("boom"));

    // same terminal state again is accepted
    store
        .update_execution(host.id, campaign.id, ExecutionStatus::Failed, Some("boom".to_string()))
        .await
        .unwrap();
    let err = store
        .update_execution(host.id, campaign.id, ExecutionStatus::Succeeded, None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn execution_upsert_is_keyed_by_host_and_campaign() {
    let store = MemStore::new();
    let host = enrolled(&store, "h1", "linux").await;
    let campaign = running_campaign(&store, "select 1").await;

    store
        .new_distributed_query_execution(DistributedQueryExecution::waiting(host.id, campaign.id))
        .await
        .unwrap();
    store
        .new_distributed_query_execution(DistributedQueryExecution {
            status: ExecutionStatus::Requested,
            ..DistributedQueryExecution::waiting(host.id, campaign.id)
        })
        .await
        .unwrap();

    let execution = store.distributed_query_execution(host.id, campaign.id).await.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Requested);
}

#[tokio::test]
async fn targets_split_into_hosts_and_labels() {
    let store = MemStore::new();
    let campaign = running_campaign(&store, "select 1").await;
    store.new_campaign_target(campaign.id, Target::Host(HostId::new(4))).await.unwrap();
    store.new_campaign_target(campaign.id, Target::Label(LabelId::new(2))).await.unwrap();
    store.new_campaign_target(campaign.id, Target::Host(HostId::new(4))).await.unwrap();

    let (hosts, labels) = store.campaign_target_ids(campaign.id).await.unwrap();
    assert_eq!(hosts, vec![HostId::new(4)]);
    assert_eq!(labels, vec![LabelId::new(2)]);
}

#[tokio::test]
async fn delete_campaign_cascades() {
    let store = MemStore::new();
    let host = enrolled(&store, "h1", "linux").await;
    let campaign = running_campaign(&store, "select 1").await;
    store.new_campaign_target(campaign.id, Target::Host(host.id)).await.unwrap();
    store
        .new_distributed_query_execution(DistributedQueryExecution::waiting(host.id, campaign.id))
        .await
        .unwrap();

    store.delete_campaign(campaign.id).await.unwrap();

    assert!(store.campaign(campaign.id).await.unwrap_err().is_not_found());
    assert!(store.campaign_target_ids(campaign.id).await.unwrap_err().is_not_found());
    assert!(store
        .distributed_query_execution(host.id, campaign.id)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn campaign_requires_existing_query() {
    let store = MemStore::new();
    let err = store
        .new_campaign(DistributedQueryCampaign {
            id: CampaignId::default(),
            query_id: QueryId::new(42),
            user_id: UserId::new(1),
            status: CampaignStatus::Running,
            created_at: t0(),
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
