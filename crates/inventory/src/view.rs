//! Inventory view model: aggregates, search and sorting over the lot set.
//!
//! Everything here is pure and total; callers pass the "as of" date.

use core::cmp::Ordering;
use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vaxtrack_core::DomainError;

use crate::expiry::expiry_status;
use crate::lot::VaccineLot;

pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Totals saturate at `i64::MAX` instead of overflowing.
pub fn total_doses_on_hand(lots: &[VaccineLot]) -> i64 {
    lots.iter().fold(0i64, |acc, l| acc.saturating_add(l.quantity_on_hand))
}

pub fn total_administered(lots: &[VaccineLot]) -> i64 {
    lots.iter().fold(0i64, |acc, l| acc.saturating_add(l.administered_doses))
}

/// In-stock lots expiring within 30 days.
pub fn expiring_soon(lots: &[VaccineLot], as_of: NaiveDate) -> Vec<VaccineLot> {
    lots.iter()
        .filter(|l| l.is_in_stock() && expiry_status(l.expiration_date, as_of).is_expiring_soon())
        .cloned()
        .collect()
}

/// In-stock lots already past their expiration date.
pub fn expired_lots(lots: &[VaccineLot], as_of: NaiveDate) -> Vec<VaccineLot> {
    lots.iter()
        .filter(|l| l.is_in_stock() && expiry_status(l.expiration_date, as_of).is_expired())
        .cloned()
        .collect()
}

/// Lots with some, but at most `threshold`, doses left.
pub fn low_stock(lots: &[VaccineLot], threshold: i64) -> Vec<VaccineLot> {
    lots.iter()
        .filter(|l| l.quantity_on_hand > 0 && l.quantity_on_hand <= threshold)
        .cloned()
        .collect()
}

/// Case-insensitive substring match on commercial name, generic name or lot number.
/// An empty term matches everything.
pub fn filter_by_search_term(lots: &[VaccineLot], term: &str) -> Vec<VaccineLot> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return lots.to_vec();
    }
    lots.iter()
        .filter(|l| {
            l.commercial_name.to_lowercase().contains(&needle)
                || l.generic_name.to_lowercase().contains(&needle)
                || l.lot_number.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CommercialName,
    GenericName,
    LotNumber,
    Quantity,
    QuantityOnHand,
    AdministeredDoses,
    ExpirationDate,
    ReceivedDate,
}

impl SortField {
    fn compare(self, a: &VaccineLot, b: &VaccineLot) -> Ordering {
        match self {
            SortField::CommercialName => a.commercial_name.cmp(&b.commercial_name),
            SortField::GenericName => a.generic_name.cmp(&b.generic_name),
            SortField::LotNumber => a.lot_number.cmp(&b.lot_number),
            SortField::Quantity => a.quantity.cmp(&b.quantity),
            SortField::QuantityOnHand => a.quantity_on_hand.cmp(&b.quantity_on_hand),
            SortField::AdministeredDoses => a.administered_doses.cmp(&b.administered_doses),
            SortField::ExpirationDate => a.expiration_date.cmp(&b.expiration_date),
            SortField::ReceivedDate => a.received_date.cmp(&b.received_date),
        }
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "commercial_name" => Ok(SortField::CommercialName),
            "generic_name" => Ok(SortField::GenericName),
            "lot_number" => Ok(SortField::LotNumber),
            "quantity" => Ok(SortField::Quantity),
            "quantity_on_hand" => Ok(SortField::QuantityOnHand),
            "administered_doses" => Ok(SortField::AdministeredDoses),
            "expiration_date" => Ok(SortField::ExpirationDate),
            "received_date" => Ok(SortField::ReceivedDate),
            other => Err(DomainError::validation(
                "sort",
                format!("unknown sort field '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(DomainError::validation(
                "direction",
                format!("unknown sort direction '{other}'"),
            )),
        }
    }
}

/// Stable sort by one field. Dates compare as dates, counts as numbers,
/// everything else lexically.
pub fn sort_by(lots: &mut [VaccineLot], field: SortField, direction: SortDirection) {
    lots.sort_by(|a, b| match direction {
        SortDirection::Asc => field.compare(a, b),
        SortDirection::Desc => field.compare(b, a),
    });
}

/// Current sort column of the inventory table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::CommercialName,
            direction: SortDirection::Asc,
        }
    }
}

impl SortState {
    /// Selecting the ascending column again flips it to descending; anything
    /// else sorts ascending by the selected field.
    pub fn select(&mut self, field: SortField) {
        self.direction = if self.field == field && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.field = field;
    }
}

/// Search + sort state of the inventory table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryTable {
    pub search: String,
    pub sort: SortState,
}

impl InventoryTable {
    pub fn rows(&self, lots: &[VaccineLot]) -> Vec<VaccineLot> {
        let mut rows = filter_by_search_term(lots, &self.search);
        sort_by(&mut rows, self.sort.field, self.sort.direction);
        rows
    }
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardMetrics {
    pub as_of: NaiveDate,
    pub total_doses_on_hand: i64,
    pub total_administered: i64,
    pub active_lots: usize,
    pub expiring_soon_doses: i64,
    pub expired_doses: i64,
    pub expiring_soon: Vec<VaccineLot>,
    pub expired: Vec<VaccineLot>,
    pub low_stock: Vec<VaccineLot>,
}

impl DashboardMetrics {
    pub fn derive(lots: &[VaccineLot], as_of: NaiveDate, low_stock_threshold: i64) -> Self {
        let expiring = expiring_soon(lots, as_of);
        let expired = expired_lots(lots, as_of);
        Self {
            as_of,
            total_doses_on_hand: total_doses_on_hand(lots),
            total_administered: total_administered(lots),
            active_lots: lots.iter().filter(|l| l.is_in_stock()).count(),
            expiring_soon_doses: total_doses_on_hand(&expiring),
            expired_doses: total_doses_on_hand(&expired),
            expiring_soon: expiring,
            expired,
            low_stock: low_stock(lots, low_stock_threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use vaxtrack_core::RecordId;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn lot(id: i64, name: &str, generic: &str, on_hand: i64, expires_in: i64) -> VaccineLot {
        VaccineLot {
            id: RecordId::new(id),
            name: name.to_string(),
            commercial_name: name.to_string(),
            generic_name: generic.to_string(),
            lot_number: format!("LOT-{id}"),
            quantity: 100,
            expiration_date: today() + Duration::days(expires_in),
            received_date: today() - Duration::days(id),
            quantity_on_hand: on_hand,
            administered_doses: 100 - on_hand,
        }
    }

    fn sample() -> Vec<VaccineLot> {
        vec![
            lot(1, "Vaxigrip", "Influenza", 40, 200),
            lot(2, "Gardasil", "HPV", 4, 10),
            lot(3, "Engerix", "Hepatitis B", 0, 5),
            lot(4, "Boostrix", "Tdap", 12, -2),
        ]
    }

    #[test]
    fn aggregates() {
        let lots = sample();
        assert_eq!(total_doses_on_hand(&lots), 56);
        assert_eq!(total_administered(&lots), 60 + 96 + 100 + 88);

        let expiring = expiring_soon(&lots, today());
        assert_eq!(expiring.iter().map(|l| l.id.get()).collect::<Vec<_>>(), vec![2]);

        let expired = expired_lots(&lots, today());
        assert_eq!(expired.iter().map(|l| l.id.get()).collect::<Vec<_>>(), vec![4]);

        let low = low_stock(&lots, DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(low.iter().map(|l| l.id.get()).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn dashboard_metrics() {
        let m = DashboardMetrics::derive(&sample(), today(), DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(m.total_doses_on_hand, 56);
        assert_eq!(m.active_lots, 3);
        assert_eq!(m.expiring_soon_doses, 4);
        assert_eq!(m.expired_doses, 12);
        assert_eq!(m.low_stock.len(), 1);
    }

    #[test]
    fn totals_saturate_on_huge_lots() {
        let half = i64::MAX / 2 + 1;
        let lots = vec![lot(1, "Vaxigrip", "Influenza", half, 200), lot(2, "Vaxigrip", "Influenza", half, 10)];

        assert_eq!(total_doses_on_hand(&lots), i64::MAX);
        let m = DashboardMetrics::derive(&lots, today(), DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(m.total_doses_on_hand, i64::MAX);
        assert_eq!(m.expiring_soon_doses, half);
    }

    #[test]
    fn search_matches_any_text_column() {
        let lots = sample();
        assert_eq!(filter_by_search_term(&lots, "HEPATITIS").len(), 1);
        assert_eq!(filter_by_search_term(&lots, "lot-4")[0].commercial_name, "Boostrix");
        assert_eq!(filter_by_search_term(&lots, "gar")[0].id.get(), 2);
        assert_eq!(filter_by_search_term(&lots, "  ").len(), 4);
        assert!(filter_by_search_term(&lots, "zzz").is_empty());
    }

    #[test]
    fn sort_by_typed_fields() {
        let mut lots = sample();
        sort_by(&mut lots, SortField::ExpirationDate, SortDirection::Asc);
        assert_eq!(lots.iter().map(|l| l.id.get()).collect::<Vec<_>>(), vec![4, 3, 2, 1]);

        sort_by(&mut lots, SortField::QuantityOnHand, SortDirection::Desc);
        assert_eq!(lots.iter().map(|l| l.id.get()).collect::<Vec<_>>(), vec![1, 4, 2, 3]);

        sort_by(&mut lots, SortField::CommercialName, SortDirection::Asc);
        assert_eq!(lots[0].commercial_name, "Boostrix");
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut lots = vec![
            lot(1, "A", "same", 5, 50),
            lot(2, "B", "same", 5, 50),
            lot(3, "C", "same", 5, 50),
        ];
        sort_by(&mut lots, SortField::GenericName, SortDirection::Desc);
        assert_eq!(lots.iter().map(|l| l.id.get()).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn selecting_same_field_toggles_direction() {
        let mut state = SortState::default();
        state.select(SortField::CommercialName);
        assert_eq!(state.direction, SortDirection::Desc);
        state.select(SortField::CommercialName);
        assert_eq!(state.direction, SortDirection::Asc);
        state.select(SortField::ExpirationDate);
        assert_eq!(state, SortState { field: SortField::ExpirationDate, direction: SortDirection::Asc });
    }

    #[test]
    fn table_rows_filter_then_sort() {
        let table = InventoryTable {
            search: "i".into(),
            sort: SortState { field: SortField::QuantityOnHand, direction: SortDirection::Asc },
        };
        let rows = table.rows(&sample());
        assert_eq!(rows.iter().map(|l| l.id.get()).collect::<Vec<_>>(), vec![3, 2, 4, 1]);
    }
}
