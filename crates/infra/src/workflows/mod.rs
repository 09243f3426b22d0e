//! Use-case workflows: receive a shipment, record administered doses, report a loss.
//!
//! Each workflow validates its form completely before writing anything, derives
//! the new counts from the quantity ledger, and then issues its writes in order
//! through [`Stores`]. Multi-step writes are not transactional: when a later
//! step fails after an earlier one committed, the workflow reports
//! [`WorkflowError::PartialFailure`] and leaves the committed record in place.

pub mod administer;
pub mod loss;
pub mod receive;

use serde::Serialize;
use thiserror::Error;

use vaxtrack_core::{DomainError, FieldErrors, RecordId};
use vaxtrack_inventory::VaccineLot;

use crate::store::{StoreError, Stores};

pub use administer::{AdministrationOutcome, RecordAdministration};
pub use loss::{LossForm, LossOutcome, ReportLoss};
pub use receive::{Receipt, ReceiveForm, ReceiveVaccines};

/// Lifecycle of one submission.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Form input rejected; nothing was written.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// A store call failed before anything was committed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An earlier write committed, a later one failed. No rollback is attempted.
    #[error("{step} failed after {committed_table} record {committed_id} was written: {source}")]
    PartialFailure {
        committed_table: &'static str,
        committed_id: RecordId,
        step: &'static str,
        #[source]
        source: StoreError,
    },
}

impl From<FieldErrors> for WorkflowError {
    fn from(errors: FieldErrors) -> Self {
        WorkflowError::Validation(errors)
    }
}

impl From<DomainError> for WorkflowError {
    fn from(err: DomainError) -> Self {
        WorkflowError::Validation(err.into())
    }
}

/// Tracks and logs state transitions of one workflow instance.
#[derive(Debug)]
struct FlowTracker {
    flow: &'static str,
    state: FlowState,
}

impl FlowTracker {
    fn new(flow: &'static str) -> Self {
        Self {
            flow,
            state: FlowState::Idle,
        }
    }

    fn enter(&mut self, next: FlowState) {
        tracing::debug!(flow = self.flow, from = ?self.state, to = ?next, "workflow transition");
        self.state = next;
    }

    /// Record the terminal state for `result` and pass it through.
    fn finish<T>(&mut self, result: Result<T, WorkflowError>) -> Result<T, WorkflowError> {
        match &result {
            Ok(_) => self.enter(FlowState::Succeeded),
            Err(WorkflowError::Validation(errors)) => {
                tracing::info!(flow = self.flow, %errors, "submission rejected by validation");
                self.enter(FlowState::Failed);
            }
            Err(err) => {
                tracing::error!(flow = self.flow, error = %err, "submission failed");
                self.enter(FlowState::Failed);
            }
        }
        result
    }
}

/// Re-read every lot after a successful write. A failed reload is logged and
/// leaves the caller without a refreshed view; the write itself stands.
async fn reload(stores: &Stores, flow: &'static str) -> Option<Vec<VaccineLot>> {
    match stores.vaccines.get_all().await {
        Ok(lots) => Some(lots),
        Err(err) => {
            tracing::warn!(flow, error = %err, "inventory reload failed");
            None
        }
    }
}
