use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    response::IntoResponse,
};

use vaxtrack_inventory::DashboardMetrics;

use crate::app::dto::{AsOfQuery, DashboardResponse};
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn get_dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<AsOfQuery>,
) -> axum::response::Response {
    let lots = match services.stores.vaccines.get_all().await {
        Ok(lots) => lots,
        Err(e) => return errors::store_error_to_response(e),
    };
    let as_of = query.as_of.unwrap_or_else(|| services.today());

    let metrics = DashboardMetrics::derive(&lots, as_of, services.low_stock_threshold);
    Json(DashboardResponse::from(metrics)).into_response()
}
