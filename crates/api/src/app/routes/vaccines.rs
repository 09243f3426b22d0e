use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use vaxtrack_core::{DomainError, RecordId};
use vaxtrack_infra::workflows::RecordAdministration;
use vaxtrack_inventory::{InventoryTable, SortDirection, SortField, SortState, VaccineLot};

use crate::app::dto::{AdministerRequest, InventoryResponse, InventoryRow, VaccinesQuery};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_vaccines))
        .route("/:id", get(get_vaccine))
        .route("/:id/quality-checks", get(list_quality_checks))
        .route("/:id/administrations", get(list_administrations))
        .route("/:id/administer", post(administer))
}

fn parse_id(raw: &str) -> Result<RecordId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid vaccine id"))
}

fn table_for(query: &VaccinesQuery) -> Result<InventoryTable, DomainError> {
    let mut sort = SortState::default();
    if let Some(field) = query.sort.as_deref() {
        sort.field = field.parse::<SortField>()?;
    }
    if let Some(direction) = query.direction.as_deref() {
        sort.direction = direction.parse::<SortDirection>()?;
    }
    if let Some(field) = query.select.as_deref() {
        sort.select(field.parse::<SortField>()?);
    }
    Ok(InventoryTable {
        search: query.search.clone(),
        sort,
    })
}

async fn load_lot(services: &AppServices, id: RecordId) -> Result<VaccineLot, axum::response::Response> {
    match services.stores.vaccines.get_by_id(id).await {
        Ok(Some(lot)) => Ok(lot),
        Ok(None) => Err(errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("vaccine {id} not found"),
        )),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

pub async fn list_vaccines(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<VaccinesQuery>,
) -> axum::response::Response {
    let table = match table_for(&query) {
        Ok(t) => t,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let as_of = query.as_of.unwrap_or_else(|| services.today());
    match services.stores.vaccines.get_all().await {
        Ok(lots) => Json(InventoryResponse {
            as_of,
            sort: table.sort,
            rows: table
                .rows(&lots)
                .into_iter()
                .map(|lot| InventoryRow::new(lot, as_of))
                .collect(),
        })
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_vaccine(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match load_lot(&services, id).await {
        Ok(lot) => Json(lot).into_response(),
        Err(resp) => resp,
    }
}

pub async fn list_quality_checks(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.stores.quality_checks.query_by_field("vaccine_id", &json!(id)).await {
        Ok(checks) => Json(checks).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_administrations(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.stores.administrations.query_by_field("vaccine_id", &json!(id)).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn administer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<AdministerRequest>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let lot = match load_lot(&services, id).await {
        Ok(lot) => lot,
        Err(resp) => return resp,
    };

    let mut flow = RecordAdministration::new(services.stores.clone());
    flow.set_doses(lot.id, body.doses);
    match flow.record(&lot).await {
        Ok(outcome) => Json(json!({
            "lot": outcome.lot,
            "doses": outcome.doses,
            "message": outcome.message,
        }))
        .into_response(),
        Err(e) => errors::workflow_error_to_response(e),
    }
}
