//! Secondary records attached to a vaccine lot.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vaxtrack_core::{DomainError, Record, RecordId};

/// Inspection of a received lot (provider table `quality_check`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCheck {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "Name", default)]
    pub name: String,
    pub vaccine_id: RecordId,
    #[serde(default)]
    pub doses_passed: i64,
    #[serde(default)]
    pub doses_failed: i64,
    #[serde(default)]
    pub discrepancy_reason: String,
    pub check_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQualityCheck {
    #[serde(rename = "Name")]
    pub name: String,
    pub vaccine_id: RecordId,
    pub doses_passed: i64,
    pub doses_failed: i64,
    pub discrepancy_reason: String,
    pub check_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCheckPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doses_passed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doses_failed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discrepancy_reason: Option<String>,
}

impl Record for QualityCheck {
    type Draft = NewQualityCheck;
    type Patch = QualityCheckPatch;

    const TABLE: &'static str = "quality_check";
    const FIELDS: &'static [&'static str] = &[
        "Name",
        "vaccine_id",
        "doses_passed",
        "doses_failed",
        "discrepancy_reason",
        "check_date",
    ];

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: NewQualityCheck) -> Self {
        Self {
            id,
            name: draft.name,
            vaccine_id: draft.vaccine_id,
            doses_passed: draft.doses_passed,
            doses_failed: draft.doses_failed,
            discrepancy_reason: draft.discrepancy_reason,
            check_date: draft.check_date,
        }
    }

    fn apply_patch(&mut self, patch: &QualityCheckPatch) {
        if let Some(v) = patch.doses_passed {
            self.doses_passed = v;
        }
        if let Some(v) = patch.doses_failed {
            self.doses_failed = v;
        }
        if let Some(v) = &patch.discrepancy_reason {
            self.discrepancy_reason = v.clone();
        }
    }
}

/// Doses given from a lot (provider table `administration`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdministrationRecord {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub vaccine_id: RecordId,
    #[serde(default)]
    pub lot_number: String,
    #[serde(default)]
    pub doses_administered: i64,
    pub administration_date: NaiveDate,
    #[serde(default)]
    pub administered_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAdministrationRecord {
    pub vaccine_id: RecordId,
    pub lot_number: String,
    pub doses_administered: i64,
    pub administration_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administered_by: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdministrationRecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administered_by: Option<String>,
}

impl Record for AdministrationRecord {
    type Draft = NewAdministrationRecord;
    type Patch = AdministrationRecordPatch;

    const TABLE: &'static str = "administration";
    const FIELDS: &'static [&'static str] = &[
        "vaccine_id",
        "lot_number",
        "doses_administered",
        "administration_date",
        "administered_by",
    ];

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: NewAdministrationRecord) -> Self {
        Self {
            id,
            vaccine_id: draft.vaccine_id,
            lot_number: draft.lot_number,
            doses_administered: draft.doses_administered,
            administration_date: draft.administration_date,
            administered_by: draft.administered_by,
        }
    }

    fn apply_patch(&mut self, patch: &AdministrationRecordPatch) {
        if let Some(v) = &patch.administered_by {
            self.administered_by = Some(v.clone());
        }
    }
}

/// Why doses were lost.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossReason {
    Expired,
    #[serde(rename = "Temperature Excursion")]
    TemperatureExcursion,
    #[serde(rename = "Broken Vial")]
    BrokenVial,
    Contamination,
    #[serde(rename = "Power Outage")]
    PowerOutage,
    #[serde(rename = "Equipment Failure")]
    EquipmentFailure,
    #[serde(rename = "Human Error")]
    HumanError,
    Other,
}

impl LossReason {
    pub const ALL: [LossReason; 8] = [
        LossReason::Expired,
        LossReason::TemperatureExcursion,
        LossReason::BrokenVial,
        LossReason::Contamination,
        LossReason::PowerOutage,
        LossReason::EquipmentFailure,
        LossReason::HumanError,
        LossReason::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LossReason::Expired => "Expired",
            LossReason::TemperatureExcursion => "Temperature Excursion",
            LossReason::BrokenVial => "Broken Vial",
            LossReason::Contamination => "Contamination",
            LossReason::PowerOutage => "Power Outage",
            LossReason::EquipmentFailure => "Equipment Failure",
            LossReason::HumanError => "Human Error",
            LossReason::Other => "Other",
        }
    }
}

impl core::fmt::Display for LossReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LossReason {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LossReason::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::validation("reason", "Please select a loss reason"))
    }
}

/// Doses lost from a lot (provider table `vaccine_loss`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossReport {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub vaccine_id: RecordId,
    #[serde(default)]
    pub lot_number: String,
    #[serde(default)]
    pub quantity: i64,
    pub reason: LossReason,
    #[serde(default)]
    pub details: String,
    pub report_date: NaiveDate,
    #[serde(default)]
    pub training_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLossReport {
    pub vaccine_id: RecordId,
    pub lot_number: String,
    pub quantity: i64,
    pub reason: LossReason,
    pub details: String,
    pub report_date: NaiveDate,
    pub training_completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossReportPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Record for LossReport {
    type Draft = NewLossReport;
    type Patch = LossReportPatch;

    const TABLE: &'static str = "vaccine_loss";
    const FIELDS: &'static [&'static str] = &[
        "vaccine_id",
        "lot_number",
        "quantity",
        "reason",
        "details",
        "report_date",
        "training_completed",
    ];

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: NewLossReport) -> Self {
        Self {
            id,
            vaccine_id: draft.vaccine_id,
            lot_number: draft.lot_number,
            quantity: draft.quantity,
            reason: draft.reason,
            details: draft.details,
            report_date: draft.report_date,
            training_completed: draft.training_completed,
        }
    }

    fn apply_patch(&mut self, patch: &LossReportPatch) {
        if let Some(v) = &patch.details {
            self.details = v.clone();
        }
    }
}

/// Most recent loss reports first (report date, then id).
pub fn recent_losses(mut reports: Vec<LossReport>) -> Vec<LossReport> {
    reports.sort_by(|a, b| {
        b.report_date
            .cmp(&a.report_date)
            .then_with(|| b.id.cmp(&a.id))
    });
    reports
}
