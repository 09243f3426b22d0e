use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use vaxtrack_infra::workflows::{LossForm, ReportLoss};
use vaxtrack_inventory::{LossReason, recent_losses};

use crate::app::dto::{LossesQuery, LossesResponse, RECENT_LOSSES_LIMIT};
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn list_losses(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<LossesQuery>,
) -> axum::response::Response {
    let (lots, losses) = match tokio::try_join!(
        services.stores.vaccines.get_all(),
        services.stores.losses.get_all()
    ) {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };

    let mut recent = recent_losses(losses);
    recent.truncate(query.limit.unwrap_or(RECENT_LOSSES_LIMIT));

    Json(LossesResponse {
        vaccines: lots.into_iter().filter(|l| l.is_in_stock()).collect(),
        recent,
        reasons: LossReason::ALL.to_vec(),
    })
    .into_response()
}

pub async fn report_loss(
    Extension(services): Extension<Arc<AppServices>>,
    Json(form): Json<LossForm>,
) -> axum::response::Response {
    let mut flow = ReportLoss::new(services.stores.clone());
    match flow.submit(&form, services.today()).await {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(json!({
                "report": outcome.report,
                "lot": outcome.lot,
                "message": outcome.message,
            })),
        )
            .into_response(),
        Err(e) => errors::workflow_error_to_response(e),
    }
}
