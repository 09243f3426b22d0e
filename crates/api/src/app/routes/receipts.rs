use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use vaxtrack_infra::workflows::{ReceiveForm, ReceiveVaccines};

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn receive(
    Extension(services): Extension<Arc<AppServices>>,
    Json(form): Json<ReceiveForm>,
) -> axum::response::Response {
    let mut flow = ReceiveVaccines::new(services.stores.clone());
    match flow.submit(&form, services.today()).await {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(e) => errors::workflow_error_to_response(e),
    }
}
