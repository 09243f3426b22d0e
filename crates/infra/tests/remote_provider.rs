//! RemoteProvider against an in-process mock of the provider's table API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{Value, json};

use vaxtrack_core::RecordId;
use vaxtrack_infra::{ProviderClient, ProviderConfig, RecordStore, RemoteProvider, StoreError};
use vaxtrack_inventory::{LossReason, LossReport, NewLossReport, NewVaccineLot, VaccineLot, VaccineLotPatch};

const PROJECT_ID: &str = "proj-test";

#[derive(Default)]
struct MockState {
    tables: HashMap<String, Vec<Value>>,
    next_id: i64,
    reject_writes: bool,
    last_fetch: Option<Value>,
}

type Shared = Arc<Mutex<MockState>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("x-project-id").and_then(|v| v.to_str().ok()) == Some(PROJECT_ID)
        && headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("Bearer "))
}

async fn fetch(
    State(state): State<Shared>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"success": false})));
    }
    let mut state = state.lock().unwrap();
    state.last_fetch = Some(body.clone());
    let rows = state.tables.get(&table).cloned().unwrap_or_default();
    let rows: Vec<Value> = match body["where"].as_array() {
        None => rows,
        Some(conditions) => rows
            .into_iter()
            .filter(|row| {
                conditions.iter().all(|c| {
                    let field = c["FieldName"].as_str().unwrap_or_default();
                    c["Values"].as_array().is_some_and(|vs| vs.contains(&row[field]))
                })
            })
            .collect(),
    };
    (StatusCode::OK, Json(json!({"success": true, "data": rows})))
}

async fn get_one(State(state): State<Shared>, Path((table, id)): Path<(String, i64)>) -> (StatusCode, Json<Value>) {
    let state = state.lock().unwrap();
    let found = state
        .tables
        .get(&table)
        .and_then(|rows| rows.iter().find(|r| r["Id"] == json!(id)).cloned());
    match found {
        Some(row) => (StatusCode::OK, Json(json!({"success": true, "data": row}))),
        None => (StatusCode::OK, Json(json!({"success": false, "message": "Record not found"}))),
    }
}

async fn create(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    if state.reject_writes {
        return Json(json!({"success": true, "results": [{"success": false, "message": "quota exceeded"}]}));
    }
    let mut results = Vec::new();
    for record in body["records"].as_array().cloned().unwrap_or_default() {
        state.next_id += 1;
        let mut row = record;
        row["Id"] = json!(state.next_id);
        state.tables.entry(table.clone()).or_default().push(row.clone());
        results.push(json!({"success": true, "data": row}));
    }
    Json(json!({"success": true, "results": results}))
}

async fn update(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    let mut results = Vec::new();
    for patch in body["records"].as_array().cloned().unwrap_or_default() {
        let row = state
            .tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|r| r["Id"] == patch["Id"]));
        match row {
            Some(row) => {
                for (key, value) in patch.as_object().unwrap() {
                    row[key] = value.clone();
                }
                results.push(json!({"success": true, "data": row.clone()}));
            }
            None => results.push(json!({"success": false, "message": "Record does not exist"})),
        }
    }
    Json(json!({"success": true, "results": results}))
}

async fn delete(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    let ids = body["RecordIds"].as_array().cloned().unwrap_or_default();
    let rows = state.tables.entry(table).or_default();
    let before = rows.len();
    rows.retain(|r| !ids.contains(&r["Id"]));
    let results: Vec<Value> = if rows.len() < before {
        ids.iter().map(|id| json!({"success": true, "data": id})).collect()
    } else {
        Vec::new()
    };
    Json(json!({"success": true, "results": results}))
}

struct MockProvider {
    base_url: String,
    state: Shared,
    handle: tokio::task::JoinHandle<()>,
}

impl MockProvider {
    async fn spawn() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new()
            .route("/tables/:table/fetch", post(fetch))
            .route("/tables/:table/records/:id", get(get_one))
            .route("/tables/:table/records", post(create).patch(update).delete(delete))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            state,
            handle,
        }
    }

    fn client(&self, project_id: &str) -> Arc<ProviderClient> {
        Arc::new(ProviderClient::new(ProviderConfig::new(&self.base_url, project_id, "pk-test")).unwrap())
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn lot(lot_number: &str, on_hand: i64) -> NewVaccineLot {
    NewVaccineLot {
        name: "Vaxigrip".into(),
        commercial_name: "Vaxigrip".into(),
        generic_name: "Influenza".into(),
        lot_number: lot_number.into(),
        quantity: on_hand,
        expiration_date: date(2027, 4, 1),
        received_date: date(2026, 10, 1),
        quantity_on_hand: on_hand,
        administered_doses: 0,
    }
}

#[tokio::test]
async fn create_fetch_and_update_round_trip() {
    let mock = MockProvider::spawn().await;
    let vaccines = RemoteProvider::<VaccineLot>::new(mock.client(PROJECT_ID));

    let created = vaccines.create(lot("FLU-1", 95)).await.unwrap();
    vaccines.create(lot("FLU-2", 10)).await.unwrap();
    assert_eq!(created.id, RecordId::new(1));
    assert_eq!(created.quantity_on_hand, 95);

    let all = vaccines.get_all().await.unwrap();
    assert_eq!(all.len(), 2);

    let fetch = mock.state.lock().unwrap().last_fetch.clone().unwrap();
    assert_eq!(fetch["fields"][0]["field"]["Name"], "Name");
    assert!(fetch.get("where").is_none());

    let updated = vaccines
        .update(created.id, VaccineLotPatch::quantity_on_hand(85))
        .await
        .unwrap();
    assert_eq!(updated.quantity_on_hand, 85);
    assert_eq!(updated.lot_number, "FLU-1");

    let fetched = vaccines.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn query_sends_equal_to_condition() {
    let mock = MockProvider::spawn().await;
    let vaccines = RemoteProvider::<VaccineLot>::new(mock.client(PROJECT_ID));
    vaccines.create(lot("FLU-1", 5)).await.unwrap();
    vaccines.create(lot("FLU-2", 5)).await.unwrap();

    let hits = vaccines.query_by_field("lot_number", &json!("FLU-2")).await.unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].lot_number, "FLU-2");
    let fetch = mock.state.lock().unwrap().last_fetch.clone().unwrap();
    assert_eq!(fetch["where"][0]["Operator"], "EqualTo");
    assert_eq!(fetch["where"][0]["FieldName"], "lot_number");
}

#[tokio::test]
async fn missing_records_are_none_or_not_found() {
    let mock = MockProvider::spawn().await;
    let vaccines = RemoteProvider::<VaccineLot>::new(mock.client(PROJECT_ID));

    assert!(vaccines.get_by_id(RecordId::new(42)).await.unwrap().is_none());

    let err = vaccines
        .update(RecordId::new(42), VaccineLotPatch::quantity_on_hand(1))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Rejected(ref m) if m == "Record does not exist"));
}

#[tokio::test]
async fn rejected_record_maps_to_store_error() {
    let mock = MockProvider::spawn().await;
    let losses = RemoteProvider::<LossReport>::new(mock.client(PROJECT_ID));
    mock.state.lock().unwrap().reject_writes = true;

    let err = losses
        .create(NewLossReport {
            vaccine_id: RecordId::new(1),
            lot_number: "FLU-1".into(),
            quantity: 2,
            reason: LossReason::BrokenVial,
            details: "Dropped tray".into(),
            report_date: date(2026, 10, 18),
            training_completed: true,
        })
        .await
        .unwrap_err();

    assert_eq!(err, StoreError::Rejected("quota exceeded".into()));
}

#[tokio::test]
async fn wrong_project_is_rejected() {
    let mock = MockProvider::spawn().await;
    let vaccines = RemoteProvider::<VaccineLot>::new(mock.client("someone-else"));

    let err = vaccines.get_all().await.unwrap_err();
    assert!(matches!(err, StoreError::Rejected(ref m) if m.starts_with("HTTP 401")));
}

#[tokio::test]
async fn delete_reports_whether_anything_was_removed() {
    let mock = MockProvider::spawn().await;
    let vaccines = RemoteProvider::<VaccineLot>::new(mock.client(PROJECT_ID));
    let created = vaccines.create(lot("FLU-1", 5)).await.unwrap();

    assert!(vaccines.delete(created.id).await.unwrap());
    assert!(!vaccines.delete(created.id).await.unwrap());
    assert!(vaccines.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let mut config = ProviderConfig::new(format!("http://127.0.0.1:{port}"), PROJECT_ID, "pk-test");
    config.timeout = std::time::Duration::from_secs(2);
    let vaccines = RemoteProvider::<VaccineLot>::new(Arc::new(ProviderClient::new(config).unwrap()));

    let err = vaccines.get_all().await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
}
