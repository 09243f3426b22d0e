//! Quantity ledger: arithmetic that keeps a lot's counts reconciled.
//!
//! Pure functions over plain numbers. Every failure is a
//! [`DomainError::Validation`] naming the form field it belongs to.

use serde::{Deserialize, Serialize};

use vaxtrack_core::{DomainError, DomainResult};

/// Mutable counts of a lot.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotBalance {
    pub quantity_on_hand: i64,
    pub administered_doses: i64,
}

/// Outcome of a quality check on a received shipment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptSplit {
    pub quantity_on_hand: i64,
}

/// Split a received quantity into passed/failed doses.
///
/// Only passed doses become available stock.
pub fn split_receipt(
    quantity: i64,
    doses_passed: i64,
    doses_failed: i64,
    discrepancy_reason: Option<&str>,
) -> DomainResult<ReceiptSplit> {
    if doses_passed < 0 {
        return Err(DomainError::validation(
            "doses_passed",
            "Passed doses cannot be negative",
        ));
    }
    if doses_failed < 0 {
        return Err(DomainError::validation(
            "doses_failed",
            "Failed doses cannot be negative",
        ));
    }
    if doses_passed.checked_add(doses_failed) != Some(quantity) {
        return Err(DomainError::validation(
            "doses_passed",
            "Passed + Failed doses must equal total quantity",
        ));
    }
    let has_reason = discrepancy_reason.is_some_and(|r| !r.trim().is_empty());
    if doses_failed > 0 && !has_reason {
        return Err(DomainError::validation(
            "discrepancy_reason",
            "Discrepancy reason is required when doses failed",
        ));
    }

    Ok(ReceiptSplit {
        quantity_on_hand: doses_passed,
    })
}

/// Record doses given from a lot.
pub fn apply_administration(current: LotBalance, doses: i64) -> DomainResult<LotBalance> {
    if doses <= 0 {
        return Err(DomainError::validation(
            "doses_administered",
            "Please enter a valid number of doses",
        ));
    }
    if doses > current.quantity_on_hand {
        return Err(DomainError::validation(
            "doses_administered",
            format!(
                "Cannot administer more doses than available ({})",
                current.quantity_on_hand
            ),
        ));
    }

    Ok(LotBalance {
        quantity_on_hand: (current.quantity_on_hand - doses).max(0),
        administered_doses: current.administered_doses.saturating_add(doses),
    })
}

/// Remove lost doses from a lot. Administered doses are untouched.
pub fn apply_loss(current: LotBalance, quantity_lost: i64) -> DomainResult<LotBalance> {
    if quantity_lost <= 0 {
        return Err(DomainError::validation(
            "quantity",
            "Quantity must be greater than 0",
        ));
    }
    if quantity_lost > current.quantity_on_hand {
        return Err(DomainError::validation(
            "quantity",
            format!(
                "Cannot exceed available quantity ({})",
                current.quantity_on_hand
            ),
        ));
    }

    Ok(LotBalance {
        quantity_on_hand: (current.quantity_on_hand - quantity_lost).max(0),
        administered_doses: current.administered_doses,
    })
}
