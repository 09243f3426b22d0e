use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vaxtrack_inventory::{
    DashboardMetrics, ExpiryStatus, LossReason, LossReport, SortState, VaccineLot, expiry_status,
};

/// Alert lists on the dashboard show this many lots each.
pub const DASHBOARD_ALERT_LIMIT: usize = 3;
/// The loss page lists this many recent reports by default.
pub const RECENT_LOSSES_LIMIT: usize = 5;

// -------------------------
// Query / request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VaccinesQuery {
    #[serde(default)]
    pub search: String,
    pub sort: Option<String>,
    pub direction: Option<String>,
    /// Column header clicked on top of the current `sort`/`direction`.
    pub select: Option<String>,
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AdministerRequest {
    pub doses: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct LossesQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub generic_name: Option<String>,
    pub status: Option<String>,
    pub as_of: Option<NaiveDate>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub metrics: DashboardMetrics,
    pub expiring_alerts: Vec<VaccineLot>,
    pub low_stock_alerts: Vec<VaccineLot>,
}

impl From<DashboardMetrics> for DashboardResponse {
    fn from(metrics: DashboardMetrics) -> Self {
        let expiring_alerts = metrics.expiring_soon.iter().take(DASHBOARD_ALERT_LIMIT).cloned().collect();
        let low_stock_alerts = metrics.low_stock.iter().take(DASHBOARD_ALERT_LIMIT).cloned().collect();
        Self {
            metrics,
            expiring_alerts,
            low_stock_alerts,
        }
    }
}

/// One inventory table row with its expiration badge.
#[derive(Debug, Serialize)]
pub struct InventoryRow {
    #[serde(flatten)]
    pub lot: VaccineLot,
    pub expiry: ExpiryStatus,
    pub expiry_label: String,
}

impl InventoryRow {
    pub fn new(lot: VaccineLot, as_of: NaiveDate) -> Self {
        let expiry = expiry_status(lot.expiration_date, as_of);
        Self {
            expiry_label: expiry.label(),
            expiry,
            lot,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub as_of: NaiveDate,
    pub sort: SortState,
    pub rows: Vec<InventoryRow>,
}

/// Loss page: lots that can still lose doses, plus the latest reports.
#[derive(Debug, Serialize)]
pub struct LossesResponse {
    pub vaccines: Vec<VaccineLot>,
    pub recent: Vec<LossReport>,
    pub reasons: Vec<LossReason>,
}
