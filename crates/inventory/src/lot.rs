//! Vaccine lots: the stored record, its draft and the partial update.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vaxtrack_core::{Record, RecordId};

use crate::ledger::LotBalance;

/// A received batch of one vaccine product (provider table `vaccine`).
///
/// Counts that the provider may omit default to zero when the row is read,
/// so callers never coalesce missing values themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccineLot {
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// Display name; mirrors the commercial name.
    #[serde(rename = "Name", default)]
    pub name: String,
    pub commercial_name: String,
    pub generic_name: String,
    pub lot_number: String,
    /// Doses originally received.
    #[serde(default)]
    pub quantity: i64,
    pub expiration_date: NaiveDate,
    pub received_date: NaiveDate,
    #[serde(default)]
    pub quantity_on_hand: i64,
    #[serde(default)]
    pub administered_doses: i64,
}

impl VaccineLot {
    pub fn balance(&self) -> LotBalance {
        LotBalance {
            quantity_on_hand: self.quantity_on_hand,
            administered_doses: self.administered_doses,
        }
    }

    pub fn is_in_stock(&self) -> bool {
        self.quantity_on_hand > 0
    }
}

/// Creation payload for a vaccine lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVaccineLot {
    #[serde(rename = "Name")]
    pub name: String,
    pub commercial_name: String,
    pub generic_name: String,
    pub lot_number: String,
    pub quantity: i64,
    pub expiration_date: NaiveDate,
    pub received_date: NaiveDate,
    pub quantity_on_hand: i64,
    pub administered_doses: i64,
}

/// Partial update of a vaccine lot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccineLotPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commercial_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_on_hand: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administered_doses: Option<i64>,
}

impl VaccineLotPatch {
    /// Patch that writes back a ledger balance.
    pub fn balance(balance: LotBalance) -> Self {
        Self {
            quantity_on_hand: Some(balance.quantity_on_hand),
            administered_doses: Some(balance.administered_doses),
            ..Self::default()
        }
    }

    pub fn quantity_on_hand(quantity_on_hand: i64) -> Self {
        Self {
            quantity_on_hand: Some(quantity_on_hand),
            ..Self::default()
        }
    }
}

impl Record for VaccineLot {
    type Draft = NewVaccineLot;
    type Patch = VaccineLotPatch;

    const TABLE: &'static str = "vaccine";
    const FIELDS: &'static [&'static str] = &[
        "Name",
        "commercial_name",
        "generic_name",
        "lot_number",
        "quantity",
        "expiration_date",
        "received_date",
        "quantity_on_hand",
        "administered_doses",
    ];

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: NewVaccineLot) -> Self {
        Self {
            id,
            name: draft.name,
            commercial_name: draft.commercial_name,
            generic_name: draft.generic_name,
            lot_number: draft.lot_number,
            quantity: draft.quantity,
            expiration_date: draft.expiration_date,
            received_date: draft.received_date,
            quantity_on_hand: draft.quantity_on_hand,
            administered_doses: draft.administered_doses,
        }
    }

    fn apply_patch(&mut self, patch: &VaccineLotPatch) {
        if let Some(v) = &patch.commercial_name {
            self.commercial_name = v.clone();
            self.name = v.clone();
        }
        if let Some(v) = &patch.generic_name {
            self.generic_name = v.clone();
        }
        if let Some(v) = &patch.lot_number {
            self.lot_number = v.clone();
        }
        if let Some(v) = patch.quantity {
            self.quantity = v;
        }
        if let Some(v) = patch.expiration_date {
            self.expiration_date = v;
        }
        if let Some(v) = patch.received_date {
            self.received_date = v;
        }
        if let Some(v) = patch.quantity_on_hand {
            self.quantity_on_hand = v;
        }
        if let Some(v) = patch.administered_doses {
            self.administered_doses = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_counts_default_to_zero() {
        let json = serde_json::json!({
            "Id": 3,
            "commercial_name": "Vaxigrip",
            "generic_name": "Influenza",
            "lot_number": "L-100",
            "expiration_date": "2027-01-31",
            "received_date": "2026-10-01",
        });

        let lot: VaccineLot = serde_json::from_value(json).unwrap();
        assert_eq!(lot.id, RecordId::new(3));
        assert_eq!(lot.quantity_on_hand, 0);
        assert_eq!(lot.administered_doses, 0);
        assert_eq!(lot.quantity, 0);
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = VaccineLotPatch::quantity_on_hand(12);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "quantity_on_hand": 12 }));
    }
}
