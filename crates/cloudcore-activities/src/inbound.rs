//! The inbound `Update<Resource>InDB` activities (§4.3): invoked when a Site
//! reports the outcome of a workflow previously launched through
//! [`crate::outbound`]. Generic over [`Reconcilable`] so the one rule set —
//! success/created binds the Controller-ID, success/deleted moves to
//! Deleting, failure moves to Error unless already Deleting — is written
//! once instead of per resource.

use std::sync::Arc;

use cloudcore_domain::entities::StatusDetail;
use cloudcore_reconciler::Reconcilable;
use cloudcore_store::{Dao, StatusJournal};

use crate::error::ActivityError;
use crate::types::{ObjectStatus, WorkflowOutcome, WorkflowStatus};

/// Applies one reported [`WorkflowOutcome`] to the entity it names, inside
/// what stands in for "a single DB transaction" in this in-process model:
/// the DAO update and the journal append both happen, or neither does,
/// because the only fallible step between them is the update itself.
pub async fn apply_workflow_outcome<E>(
    dao: &Arc<dyn Dao<E>>,
    journal: &Arc<dyn StatusJournal>,
    outcome: &WorkflowOutcome,
) -> Result<(), ActivityError>
where
    E: Reconcilable,
{
    let entity_id = outcome.transaction_id.resource_id;
    let mut entity = dao
        .get_by_id(entity_id, true)
        .await?
        .ok_or_else(|| ActivityError::Precondition(format!("{entity_id} not found for workflow outcome")))?;

    let message = match outcome.workflow_status {
        WorkflowStatus::Success => match outcome.object_status {
            Some(ObjectStatus::Created) => {
                let controller_id = outcome
                    .controller_id
                    .clone()
                    .ok_or_else(|| ActivityError::Precondition("created outcome missing controller id".into()))?;
                entity.set_controller_id(Some(controller_id));
                "created on site".to_string()
            }
            Some(ObjectStatus::Deleted) => {
                entity.set_status_deleting();
                "deletion confirmed by site".to_string()
            }
            Some(ObjectStatus::Updated) | None => outcome.message.clone().unwrap_or_else(|| "update confirmed by site".to_string()),
        },
        WorkflowStatus::Failure => {
            if entity.is_deleting() {
                tracing::warn!(%entity_id, "workflow failed while entity was already deleting; keeping Deleting");
                format!("deletion in progress; site reported failure: {}", outcome.message.clone().unwrap_or_default())
            } else {
                entity.set_status_error();
                outcome.message.clone().unwrap_or_else(|| "workflow failed".to_string())
            }
        }
    };

    entity.touch_updated();
    dao.update(&entity).await?;
    journal.append(&StatusDetail::new(entity_id, entity.status_label(), Some(message))).await?;
    Ok(())
}
