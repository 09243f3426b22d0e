use chrono::NaiveDate;

use vaxtrack_infra::{StoreConfig, StoreResult, Stores};
use vaxtrack_inventory::view::DEFAULT_LOW_STOCK_THRESHOLD;

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub stores: Stores,
    pub low_stock_threshold: i64,
}

impl AppServices {
    /// Empty in-memory stores, no latency (dev/test).
    pub fn local() -> Self {
        Self {
            stores: Stores::local(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    /// Calendar date used for expiry and form validation.
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

pub fn build_services(config: &StoreConfig) -> StoreResult<AppServices> {
    Ok(AppServices {
        stores: Stores::from_config(config)?,
        low_stock_threshold: config.low_stock_threshold,
    })
}
