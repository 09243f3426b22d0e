use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use vaxtrack_core::{DomainError, FieldErrors, Record};
use vaxtrack_inventory::{NewQualityCheck, NewVaccineLot, QualityCheck, ReceiptSplit, VaccineLot, split_receipt};

use super::{FlowState, FlowTracker, WorkflowError};
use crate::store::Stores;

/// "Receive shipment" form, including the quality check split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiveForm {
    pub commercial_name: String,
    pub generic_name: String,
    pub lot_number: String,
    pub quantity: i64,
    pub expiration_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub doses_passed: i64,
    pub doses_failed: i64,
    pub discrepancy_reason: String,
}

impl ReceiveForm {
    /// A form for `quantity` doses that all passed inspection.
    pub fn all_passed(quantity: i64) -> Self {
        Self {
            quantity,
            doses_passed: quantity,
            doses_failed: 0,
            ..Self::default()
        }
    }

    /// Check every field; on success returns the ledger split.
    pub fn validate(&self, today: NaiveDate) -> Result<ReceiptSplit, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.commercial_name.trim().is_empty() {
            errors.add("commercial_name", "Commercial name is required");
        }
        if self.generic_name.trim().is_empty() {
            errors.add("generic_name", "Generic name is required");
        }
        if self.lot_number.trim().is_empty() {
            errors.add("lot_number", "Lot number is required");
        }
        if self.quantity <= 0 {
            errors.add("quantity", "Quantity must be greater than 0");
        }
        match self.expiration_date {
            None => errors.add("expiration_date", "Expiration date is required"),
            Some(date) if date <= today => {
                errors.add("expiration_date", "Expiration date must be in the future")
            }
            Some(_) => {}
        }
        if self.received_date.is_none() {
            errors.add("received_date", "Received date is required");
        }

        let split = split_receipt(
            self.quantity,
            self.doses_passed,
            self.doses_failed,
            Some(self.discrepancy_reason.as_str()),
        );
        match split {
            Ok(split) if errors.is_empty() => Ok(split),
            Ok(_) => Err(errors),
            Err(err) => {
                errors.absorb(err);
                Err(errors)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub lot: VaccineLot,
    pub quality_check: QualityCheck,
    pub message: String,
}

/// Receive a shipment: create the lot, then its quality check.
#[derive(Debug)]
pub struct ReceiveVaccines {
    stores: Stores,
    tracker: FlowTracker,
}

impl ReceiveVaccines {
    pub fn new(stores: Stores) -> Self {
        Self {
            stores,
            tracker: FlowTracker::new("receive_vaccines"),
        }
    }

    pub fn state(&self) -> FlowState {
        self.tracker.state
    }

    #[instrument(skip(self, form), fields(lot_number = %form.lot_number.trim()))]
    pub async fn submit(&mut self, form: &ReceiveForm, today: NaiveDate) -> Result<Receipt, WorkflowError> {
        self.tracker.enter(FlowState::Validating);
        let result = self.run(form, today).await;
        self.tracker.finish(result)
    }

    async fn run(&mut self, form: &ReceiveForm, today: NaiveDate) -> Result<Receipt, WorkflowError> {
        let split = form.validate(today)?;
        // validate() rejects missing dates.
        let (Some(expiration_date), Some(received_date)) = (form.expiration_date, form.received_date) else {
            return Err(DomainError::validation("received_date", "Received date is required").into());
        };

        self.tracker.enter(FlowState::Submitting);

        let commercial_name = form.commercial_name.trim().to_string();
        let lot = self
            .stores
            .vaccines
            .create(NewVaccineLot {
                name: commercial_name.clone(),
                commercial_name: commercial_name.clone(),
                generic_name: form.generic_name.trim().to_string(),
                lot_number: form.lot_number.trim().to_string(),
                quantity: form.quantity,
                expiration_date,
                received_date,
                quantity_on_hand: split.quantity_on_hand,
                administered_doses: 0,
            })
            .await?;

        let quality_check = self
            .stores
            .quality_checks
            .create(NewQualityCheck {
                name: format!("Quality Check - {commercial_name}"),
                vaccine_id: lot.id,
                doses_passed: form.doses_passed,
                doses_failed: form.doses_failed,
                discrepancy_reason: form.discrepancy_reason.trim().to_string(),
                check_date: today,
            })
            .await
            .map_err(|source| WorkflowError::PartialFailure {
                committed_table: VaccineLot::TABLE,
                committed_id: lot.id,
                step: "create quality check",
                source,
            })?;

        let message = format!("Successfully received {} doses of {}", form.quantity, commercial_name);
        tracing::info!(lot_id = %lot.id, on_hand = lot.quantity_on_hand, "{message}");
        Ok(Receipt {
            lot,
            quality_check,
            message,
        })
    }
}
