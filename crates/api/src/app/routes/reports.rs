use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    http::{StatusCode, header},
    response::IntoResponse,
};

use vaxtrack_inventory::report::{report_file_name, to_csv};
use vaxtrack_inventory::{InventoryReport, ReportFilter, StatusFilter};

use crate::app::dto::ReportQuery;
use crate::app::errors;
use crate::app::services::AppServices;

fn filter_for(query: &ReportQuery) -> Result<ReportFilter, axum::response::Response> {
    let status = match query.status.as_deref() {
        None => StatusFilter::All,
        Some(raw) => raw.parse().map_err(errors::domain_error_to_response)?,
    };
    Ok(ReportFilter {
        generic_name: query.generic_name.clone(),
        status,
    })
}

async fn build_report(services: &AppServices, query: &ReportQuery) -> Result<InventoryReport, axum::response::Response> {
    let filter = filter_for(query)?;
    let lots = services
        .stores
        .vaccines
        .get_all()
        .await
        .map_err(errors::store_error_to_response)?;
    let as_of = query.as_of.unwrap_or_else(|| services.today());
    Ok(InventoryReport::build_with_threshold(
        &lots,
        filter,
        as_of,
        services.low_stock_threshold,
    ))
}

pub async fn get_report(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReportQuery>,
) -> axum::response::Response {
    match build_report(&services, &query).await {
        Ok(report) => Json(report).into_response(),
        Err(resp) => resp,
    }
}

/// Same filters as `GET /reports`, rendered as a CSV attachment.
pub async fn export_csv(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReportQuery>,
) -> axum::response::Response {
    let report = match build_report(&services, &query).await {
        Ok(report) => report,
        Err(resp) => return resp,
    };
    let body = match to_csv(&report.data, report.generated_on) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "csv export failed");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "export_error", e.to_string());
        }
    };

    let disposition = format!("attachment; filename=\"{}\"", report_file_name(report.generated_on));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}
