//! Vaccine inventory domain.
//!
//! This crate contains the business rules for vaccine lots, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage): the records, the
//! quantity ledger that keeps their counts reconciled, expiry classification,
//! and the derived dashboard/table/report views.

pub mod expiry;
pub mod ledger;
pub mod lot;
pub mod records;
pub mod report;
pub mod view;

pub use expiry::{ExpiryStatus, ReportStatus, days_until_expiry, expiry_status};
pub use ledger::{LotBalance, ReceiptSplit, apply_administration, apply_loss, split_receipt};
pub use lot::{NewVaccineLot, VaccineLot, VaccineLotPatch};
pub use records::{
    AdministrationRecord, AdministrationRecordPatch, LossReason, LossReport, LossReportPatch,
    NewAdministrationRecord, NewLossReport, NewQualityCheck, QualityCheck, QualityCheckPatch,
    recent_losses,
};
pub use report::{InventoryReport, ReportError, ReportFilter, ReportSummary, StatusFilter};
pub use view::{DashboardMetrics, InventoryTable, SortDirection, SortField, SortState};
