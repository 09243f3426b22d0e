use std::collections::HashMap;

use serde::Serialize;
use tracing::instrument;

use vaxtrack_core::RecordId;
use vaxtrack_inventory::{VaccineLot, VaccineLotPatch, apply_administration};

use super::{FlowState, FlowTracker, WorkflowError, reload};
use crate::store::Stores;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdministrationOutcome {
    pub lot: VaccineLot,
    pub doses: i64,
    /// Refreshed lot list; `None` when the reload after the write failed.
    pub inventory: Option<Vec<VaccineLot>>,
    pub message: String,
}

/// Record doses given from lots in the inventory table.
///
/// Each table row has its own pending dose count. Submitting a row validates it
/// against that row's lot, writes the new balance in one update, and clears the
/// row's input.
#[derive(Debug)]
pub struct RecordAdministration {
    stores: Stores,
    tracker: FlowTracker,
    inputs: HashMap<RecordId, i64>,
}

impl RecordAdministration {
    pub fn new(stores: Stores) -> Self {
        Self {
            stores,
            tracker: FlowTracker::new("record_administration"),
            inputs: HashMap::new(),
        }
    }

    pub fn state(&self) -> FlowState {
        self.tracker.state
    }

    pub fn set_doses(&mut self, lot_id: RecordId, doses: i64) {
        self.inputs.insert(lot_id, doses);
    }

    /// Pending input for a row, 0 when untouched.
    pub fn doses(&self, lot_id: RecordId) -> i64 {
        self.inputs.get(&lot_id).copied().unwrap_or(0)
    }

    #[instrument(skip(self, lot), fields(lot_id = %lot.id, lot_number = %lot.lot_number))]
    pub async fn record(&mut self, lot: &VaccineLot) -> Result<AdministrationOutcome, WorkflowError> {
        self.tracker.enter(FlowState::Validating);
        let result = self.run(lot).await;
        self.tracker.finish(result)
    }

    async fn run(&mut self, lot: &VaccineLot) -> Result<AdministrationOutcome, WorkflowError> {
        let doses = self.doses(lot.id);
        let balance = apply_administration(lot.balance(), doses)?;

        self.tracker.enter(FlowState::Submitting);
        let updated = self
            .stores
            .vaccines
            .update(lot.id, VaccineLotPatch::balance(balance))
            .await?;
        self.inputs.insert(lot.id, 0);

        let message = format!("Recorded {doses} doses administered from lot {}", updated.lot_number);
        tracing::info!(
            on_hand = updated.quantity_on_hand,
            administered = updated.administered_doses,
            "{message}"
        );

        let inventory = reload(&self.stores, "record_administration").await;
        Ok(AdministrationOutcome {
            lot: updated,
            doses,
            inventory,
            message,
        })
    }
}
