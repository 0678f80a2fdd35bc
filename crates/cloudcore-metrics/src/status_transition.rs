use std::sync::Arc;

use cloudcore_domain::entities::StatusDetail;
use cloudcore_reconciler::LifecycleEvent;
use cloudcore_store::{StatusJournal, StoreError};
use uuid::Uuid;

/// How far back into a entity's journal to scan when looking for the
/// `Pending`/`Ready`/`Deleting` rows a transition duration is built from
/// (§4.6). Generous enough to cover a resource that bounced through a few
/// intermediate states before settling.
const JOURNAL_LOOKBACK: u32 = 50;

/// `Record<Resource>StatusTransitionMetrics(ctx, siteID, events[])` (§4.6, C7).
///
/// For a `Created` event, a gauge is only emitted if the journal carries
/// exactly one `Ready` row and at least one `Pending` row — duration is
/// `Ready.Created - earliestPending.Created`. For a `Deleted` event, a gauge
/// is emitted once an earliest `Deleting` row exists — duration is measured
/// to the latest `Deleted` row if one has landed yet, else to now.
pub async fn record_status_transition_metrics(
    journal: &Arc<dyn StatusJournal>,
    site_id: Uuid,
    resource: &str,
    operation_type: &str,
    events: &[LifecycleEvent],
) -> Result<(), StoreError> {
    for event in events {
        let rows = journal.latest_n(event.entity_id, JOURNAL_LOOKBACK).await?;

        if event.created {
            record_ready_transition(site_id, resource, operation_type, &rows);
        }
        if event.deleted {
            record_delete_transition(site_id, resource, operation_type, &rows);
        }
    }
    Ok(())
}

fn record_ready_transition(site_id: Uuid, resource: &str, operation_type: &str, rows: &[StatusDetail]) {
    let ready: Vec<&StatusDetail> = rows.iter().filter(|r| r.status == "ready").collect();
    let pending: Vec<&StatusDetail> = rows.iter().filter(|r| r.status == "pending").collect();

    let (Some(ready_row), Some(earliest_pending)) = (ready.first().filter(|_| ready.len() == 1), pending.first()) else {
        return;
    };

    let duration = ready_row.created - earliest_pending.created;
    emit_duration_gauge(site_id, resource, operation_type, "pending", "ready", duration);
}

fn record_delete_transition(site_id: Uuid, resource: &str, operation_type: &str, rows: &[StatusDetail]) {
    let Some(earliest_deleting) = rows.iter().find(|r| r.status == "deleting") else {
        return;
    };
    let observed_deleted_at = rows.iter().filter(|r| r.status == "deleted").last().map(|r| r.created).unwrap_or_else(chrono::Utc::now);

    let duration = observed_deleted_at - earliest_deleting.created;
    emit_duration_gauge(site_id, resource, operation_type, "deleting", "deleted", duration);
}

fn emit_duration_gauge(site_id: Uuid, resource: &str, operation_type: &str, from_status: &str, to_status: &str, duration: chrono::Duration) {
    let seconds = duration.to_std().map(|d| d.as_secs_f64()).unwrap_or(0.0);
    metrics::gauge!(
        "cloudcore_status_transition_duration_seconds",
        "site" => site_id.to_string(),
        "operation_type" => resource_operation_label(resource, operation_type),
        "from_status" => from_status.to_string(),
        "to_status" => to_status.to_string(),
    )
    .set(seconds);
}

fn resource_operation_label(resource: &str, operation_type: &str) -> String {
    format!("{resource}:{operation_type}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcore_store::journal::memory::InMemoryStatusJournal;

    #[tokio::test]
    async fn emits_duration_for_single_ready_with_a_pending() {
        let journal: Arc<dyn StatusJournal> = InMemoryStatusJournal::new();
        let entity_id = Uuid::new_v4();
        journal.append(&StatusDetail::new(entity_id, "pending", None)).await.unwrap();
        journal.append(&StatusDetail::new(entity_id, "provisioning", None)).await.unwrap();
        journal.append(&StatusDetail::new(entity_id, "ready", None)).await.unwrap();

        let events = vec![LifecycleEvent::created(entity_id)];
        record_status_transition_metrics(&journal, Uuid::new_v4(), "subnet", "create", &events).await.unwrap();
    }

    #[tokio::test]
    async fn skips_when_two_ready_rows_exist() {
        let journal: Arc<dyn StatusJournal> = InMemoryStatusJournal::new();
        let entity_id = Uuid::new_v4();
        journal.append(&StatusDetail::new(entity_id, "pending", None)).await.unwrap();
        journal.append(&StatusDetail::new(entity_id, "ready", None)).await.unwrap();
        journal.append(&StatusDetail::new(entity_id, "error", None)).await.unwrap();
        journal.append(&StatusDetail::new(entity_id, "ready", None)).await.unwrap();

        let rows = journal.latest_n(entity_id, JOURNAL_LOOKBACK).await.unwrap();
        let ready_count = rows.iter().filter(|r| r.status == "ready").count();
        assert_eq!(ready_count, 2);

        let events = vec![LifecycleEvent::created(entity_id)];
        record_status_transition_metrics(&journal, Uuid::new_v4(), "subnet", "create", &events).await.unwrap();
    }

    #[tokio::test]
    async fn skips_when_no_pending_row_present() {
        let journal: Arc<dyn StatusJournal> = InMemoryStatusJournal::new();
        let entity_id = Uuid::new_v4();
        journal.append(&StatusDetail::new(entity_id, "ready", None)).await.unwrap();

        let events = vec![LifecycleEvent::created(entity_id)];
        record_status_transition_metrics(&journal, Uuid::new_v4(), "subnet", "create", &events).await.unwrap();
    }
}
