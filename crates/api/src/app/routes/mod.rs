use axum::{
    Router,
    routing::{get, post},
};

pub mod dashboard;
pub mod losses;
pub mod receipts;
pub mod reports;
pub mod system;
pub mod vaccines;

/// Router for every inventory endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        .nest("/vaccines", vaccines::router())
        .route("/receipts", post(receipts::receive))
        .route("/losses", get(losses::list_losses).post(losses::report_loss))
        .route("/reports", get(reports::get_report))
        .route("/reports/export.csv", get(reports::export_csv))
}
