//! Inventory reports and CSV export.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vaxtrack_core::DomainError;

use crate::expiry::{ReportStatus, expiry_status};
use crate::lot::VaccineLot;
use crate::view::{DEFAULT_LOW_STOCK_THRESHOLD, total_administered, total_doses_on_hand};

pub const CSV_HEADER: [&str; 7] = [
    "Commercial Name",
    "Generic Name",
    "Lot Number",
    "Quantity On Hand",
    "Administered",
    "Expiration Date",
    "Status",
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush csv: {0}")]
    Flush(String),

    #[error("csv output is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Expiring,
    Expired,
    Good,
    LowStock,
}

impl FromStr for StatusFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(StatusFilter::All),
            "expiring" => Ok(StatusFilter::Expiring),
            "expired" => Ok(StatusFilter::Expired),
            "good" => Ok(StatusFilter::Good),
            "low_stock" | "low-stock" => Ok(StatusFilter::LowStock),
            other => Err(DomainError::validation(
                "status",
                format!("unknown status filter '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    /// Case-insensitive substring of the generic name.
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
}

impl ReportFilter {
    fn matches(&self, lot: &VaccineLot, as_of: NaiveDate, low_stock_threshold: i64) -> bool {
        if let Some(name) = self.generic_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            if !lot.generic_name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        let status = expiry_status(lot.expiration_date, as_of).report_status();
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Expiring => status == ReportStatus::ExpiringSoon,
            StatusFilter::Expired => status == ReportStatus::Expired,
            StatusFilter::Good => status == ReportStatus::Good,
            StatusFilter::LowStock => {
                lot.quantity_on_hand > 0 && lot.quantity_on_hand <= low_stock_threshold
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_doses: i64,
    pub total_administered: i64,
    pub expiring_count: usize,
    pub expired_count: usize,
    pub low_stock_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryReport {
    pub generated_on: NaiveDate,
    pub filter: ReportFilter,
    pub data: Vec<VaccineLot>,
    pub summary: ReportSummary,
}

impl InventoryReport {
    pub fn build(lots: &[VaccineLot], filter: ReportFilter, as_of: NaiveDate) -> Self {
        Self::build_with_threshold(lots, filter, as_of, DEFAULT_LOW_STOCK_THRESHOLD)
    }

    pub fn build_with_threshold(
        lots: &[VaccineLot],
        filter: ReportFilter,
        as_of: NaiveDate,
        low_stock_threshold: i64,
    ) -> Self {
        let data: Vec<VaccineLot> = lots
            .iter()
            .filter(|l| filter.matches(l, as_of, low_stock_threshold))
            .cloned()
            .collect();

        let status_count = |wanted: ReportStatus| {
            data.iter()
                .filter(|l| expiry_status(l.expiration_date, as_of).report_status() == wanted)
                .count()
        };

        let summary = ReportSummary {
            total_doses: total_doses_on_hand(&data),
            total_administered: total_administered(&data),
            expiring_count: status_count(ReportStatus::ExpiringSoon),
            expired_count: status_count(ReportStatus::Expired),
            low_stock_count: data
                .iter()
                .filter(|l| l.quantity_on_hand > 0 && l.quantity_on_hand <= low_stock_threshold)
                .count(),
        };

        Self {
            generated_on: as_of,
            filter,
            data,
            summary,
        }
    }
}

/// Render lots as CSV, one row per lot, status computed as of `as_of`.
pub fn to_csv(lots: &[VaccineLot], as_of: NaiveDate) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for lot in lots {
        let status = expiry_status(lot.expiration_date, as_of).report_status();
        let on_hand = lot.quantity_on_hand.to_string();
        let administered = lot.administered_doses.to_string();
        let expiration = lot.expiration_date.format("%Y-%m-%d").to_string();
        writer.write_record([
            lot.commercial_name.as_str(),
            lot.generic_name.as_str(),
            lot.lot_number.as_str(),
            on_hand.as_str(),
            administered.as_str(),
            expiration.as_str(),
            status.label(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Flush(e.error().to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn report_file_name(date: NaiveDate) -> String {
    format!("vaccine-inventory-report-{}.csv", date.format("%Y-%m-%d"))
}
