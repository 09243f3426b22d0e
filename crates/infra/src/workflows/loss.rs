use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use vaxtrack_core::{FieldErrors, Record, RecordId};
use vaxtrack_inventory::{
    LossReason, LossReport, NewLossReport, VaccineLot, VaccineLotPatch, apply_loss,
};

use super::{FlowState, FlowTracker, WorkflowError, reload};
use crate::store::Stores;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossForm {
    pub vaccine_id: Option<RecordId>,
    pub quantity: i64,
    /// Reason label as picked in the form; empty or missing means none selected.
    pub reason: Option<String>,
    pub details: String,
    pub training_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LossOutcome {
    pub report: LossReport,
    pub lot: VaccineLot,
    /// Refreshed lot list; `None` when the reload after the writes failed.
    pub inventory: Option<Vec<VaccineLot>>,
    pub message: String,
}

/// Report doses lost from a lot: write the loss report, then the lot's new count.
#[derive(Debug)]
pub struct ReportLoss {
    stores: Stores,
    tracker: FlowTracker,
}

impl ReportLoss {
    pub fn new(stores: Stores) -> Self {
        Self {
            stores,
            tracker: FlowTracker::new("report_loss"),
        }
    }

    pub fn state(&self) -> FlowState {
        self.tracker.state
    }

    #[instrument(skip(self, form), fields(vaccine_id = ?form.vaccine_id, quantity = form.quantity))]
    pub async fn submit(&mut self, form: &LossForm, today: NaiveDate) -> Result<LossOutcome, WorkflowError> {
        self.tracker.enter(FlowState::Validating);
        let result = self.run(form, today).await;
        self.tracker.finish(result)
    }

    /// Validate every field. The selected lot is read to check the quantity bound.
    async fn validate(&self, form: &LossForm) -> Result<(VaccineLot, VaccineLotPatch, LossReason), WorkflowError> {
        let mut errors = FieldErrors::new();

        let lot = match form.vaccine_id {
            None => None,
            Some(id) => self.stores.vaccines.get_by_id(id).await?,
        };
        let patch = match &lot {
            None => {
                errors.add("vaccine_id", "Please select a vaccine");
                None
            }
            Some(lot) => match apply_loss(lot.balance(), form.quantity) {
                Ok(balance) => Some(VaccineLotPatch::quantity_on_hand(balance.quantity_on_hand)),
                Err(err) => {
                    errors.absorb(err);
                    None
                }
            },
        };
        if lot.is_none() && form.quantity <= 0 {
            errors.add("quantity", "Quantity must be greater than 0");
        }
        let reason = match form.reason.as_deref().map(str::parse::<LossReason>) {
            Some(Ok(reason)) => Some(reason),
            Some(Err(err)) => {
                errors.absorb(err);
                None
            }
            None => {
                errors.add("reason", "Please select a loss reason");
                None
            }
        };
        if form.details.trim().is_empty() {
            errors.add("details", "Please provide details about the loss");
        }
        if !form.training_completed {
            errors.add("training_completed", "Training completion confirmation is required");
        }

        match (lot, patch, reason) {
            (Some(lot), Some(patch), Some(reason)) if errors.is_empty() => Ok((lot, patch, reason)),
            _ => Err(errors.into()),
        }
    }

    async fn run(&mut self, form: &LossForm, today: NaiveDate) -> Result<LossOutcome, WorkflowError> {
        let (lot, patch, reason) = self.validate(form).await?;

        self.tracker.enter(FlowState::Submitting);
        let report = self
            .stores
            .losses
            .create(NewLossReport {
                vaccine_id: lot.id,
                lot_number: lot.lot_number.clone(),
                quantity: form.quantity,
                reason,
                details: form.details.trim().to_string(),
                report_date: today,
                training_completed: form.training_completed,
            })
            .await?;

        let updated = self
            .stores
            .vaccines
            .update(lot.id, patch)
            .await
            .map_err(|source| WorkflowError::PartialFailure {
                committed_table: LossReport::TABLE,
                committed_id: report.id,
                step: "update vaccine quantity",
                source,
            })?;

        let message = format!(
            "Loss of {} doses from lot {} reported ({})",
            report.quantity, report.lot_number, report.reason
        );
        tracing::info!(report_id = %report.id, on_hand = updated.quantity_on_hand, "{message}");

        let inventory = reload(&self.stores, "report_loss").await;
        Ok(LossOutcome {
            report,
            lot: updated,
            inventory,
            message,
        })
    }
}
