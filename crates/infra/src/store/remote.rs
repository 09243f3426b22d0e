//! Remote persistence provider.
//!
//! Speaks the provider's JSON envelope protocol over HTTP. Every response carries
//! a top-level `success` flag; mutations additionally report per-record results.
//!
//! ## Error Mapping
//!
//! | Provider outcome | StoreError |
//! |------------------|------------|
//! | connection / timeout failure | `Transport` |
//! | non-2xx status | `Rejected` (status + body) |
//! | `success: false` | `Rejected` (provider message) |
//! | failed entry in `results` | `Rejected` (record message) |
//! | missing `results` / `data`, undecodable body | `Decode` |
//!
//! `get_by_id` is the exception: a 404 or `success: false` means "not found"
//! and yields `Ok(None)`.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::instrument;

use vaxtrack_core::{Record, RecordId};

use super::r#trait::{RecordStore, StoreError, StoreResult};
use crate::config::ProviderConfig;

#[derive(Debug, Serialize)]
struct FieldName<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct FieldRef<'a> {
    field: FieldName<'a>,
}

#[derive(Debug, Serialize)]
struct WhereClause<'a> {
    #[serde(rename = "FieldName")]
    field_name: &'a str,
    #[serde(rename = "Operator")]
    operator: &'static str,
    #[serde(rename = "Values")]
    values: Vec<JsonValue>,
}

#[derive(Debug, Serialize)]
struct FetchRequest<'a> {
    fields: Vec<FieldRef<'a>>,
    #[serde(rename = "where", skip_serializing_if = "Vec::is_empty")]
    conditions: Vec<WhereClause<'a>>,
}

#[derive(Debug, Serialize)]
struct RecordsRequest<R> {
    records: Vec<R>,
}

#[derive(Debug, Serialize)]
struct UpdateRow<'a, P> {
    #[serde(rename = "Id")]
    id: RecordId,
    #[serde(flatten)]
    patch: &'a P,
}

#[derive(Debug, Serialize)]
struct DeleteRequest {
    #[serde(rename = "RecordIds")]
    record_ids: Vec<RecordId>,
}

#[derive(Debug, Deserialize)]
struct DataResponse<D> {
    success: bool,
    message: Option<String>,
    data: Option<D>,
}

#[derive(Debug, Deserialize)]
struct RecordResult<D> {
    success: bool,
    message: Option<String>,
    data: Option<D>,
}

#[derive(Debug, Deserialize)]
struct ResultsResponse<D> {
    success: bool,
    message: Option<String>,
    results: Option<Vec<RecordResult<D>>>,
}

fn rejected(message: Option<String>, fallback: &str) -> StoreError {
    StoreError::Rejected(message.filter(|m| !m.is_empty()).unwrap_or_else(|| fallback.to_string()))
}

/// Collapse per-record mutation results into the first successful record.
fn first_result<D>(table: &str, op: &str, response: ResultsResponse<D>) -> StoreResult<Option<D>> {
    if !response.success {
        tracing::error!(table, op, message = ?response.message, "provider rejected request");
        return Err(rejected(response.message, "request rejected"));
    }
    let results = response
        .results
        .ok_or_else(|| StoreError::Decode(format!("no results returned from {op} operation")))?;

    let (ok, failed): (Vec<_>, Vec<_>) = results.into_iter().partition(|r| r.success);
    if let Some(first_failure) = failed.into_iter().next() {
        tracing::error!(table, op, message = ?first_failure.message, "provider rejected record");
        return Err(rejected(first_failure.message, "record rejected"));
    }
    Ok(ok.into_iter().next().and_then(|r| r.data))
}

/// Shared HTTP client for one provider project.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl ProviderClient {
    pub fn new(config: ProviderConfig) -> StoreResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    fn url(&self, table: &str, suffix: &str) -> String {
        format!(
            "{}/tables/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            table,
            suffix
        )
    }

    async fn send<B, R>(&self, method: Method, url: String, body: Option<&B>) -> StoreResult<(StatusCode, Option<R>)>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self
            .http
            .request(method, &url)
            .header("X-Project-Id", &self.config.project_id)
            .bearer_auth(&self.config.public_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(%url, error = %e, "provider request failed");
            StoreError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok((status, None));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(%url, %status, body = %text, "provider returned error status");
            return Err(StoreError::Rejected(format!("HTTP {status}: {text}")));
        }

        let decoded = response
            .json::<R>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok((status, Some(decoded)))
    }

    async fn fetch<T: Record>(&self, conditions: Vec<WhereClause<'_>>) -> StoreResult<Vec<T>> {
        let body = FetchRequest {
            fields: T::FIELDS
                .iter()
                .map(|name| FieldRef { field: FieldName { name: *name } })
                .collect(),
            conditions,
        };
        let (status, response) = self
            .send::<_, DataResponse<Vec<T>>>(Method::POST, self.url(T::TABLE, "fetch"), Some(&body))
            .await?;
        let response = response
            .ok_or_else(|| StoreError::Rejected(format!("HTTP {status}: table {} not found", T::TABLE)))?;

        if !response.success {
            tracing::error!(table = T::TABLE, message = ?response.message, "fetch rejected");
            return Err(rejected(response.message, "fetch rejected"));
        }
        Ok(response.data.unwrap_or_default())
    }
}

/// Record store backed by the remote provider.
#[derive(Debug)]
pub struct RemoteProvider<T> {
    client: Arc<ProviderClient>,
    _record: PhantomData<fn() -> T>,
}

impl<T> RemoteProvider<T> {
    pub fn new(client: Arc<ProviderClient>) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for RemoteProvider<T> {
    #[instrument(skip(self, draft), fields(table = T::TABLE))]
    async fn create(&self, draft: T::Draft) -> StoreResult<T> {
        let body = RecordsRequest { records: vec![draft] };
        let (status, response) = self
            .client
            .send::<_, ResultsResponse<T>>(Method::POST, self.client.url(T::TABLE, "records"), Some(&body))
            .await?;
        let response =
            response.ok_or_else(|| StoreError::Rejected(format!("HTTP {status}: create failed")))?;

        first_result(T::TABLE, "create", response)?
            .ok_or_else(|| StoreError::Decode("create returned no record".to_string()))
    }

    #[instrument(skip(self), fields(table = T::TABLE))]
    async fn get_all(&self) -> StoreResult<Vec<T>> {
        self.client.fetch::<T>(Vec::new()).await
    }

    #[instrument(skip(self), fields(table = T::TABLE))]
    async fn get_by_id(&self, id: RecordId) -> StoreResult<Option<T>> {
        let url = self.client.url(T::TABLE, &format!("records/{id}"));
        let (_, response) = self
            .client
            .send::<(), DataResponse<T>>(Method::GET, url, None)
            .await?;

        match response {
            Some(r) if r.success => Ok(r.data),
            Some(r) => {
                tracing::warn!(%id, message = ?r.message, "record lookup rejected");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, patch), fields(table = T::TABLE))]
    async fn update(&self, id: RecordId, patch: T::Patch) -> StoreResult<T> {
        let body = RecordsRequest {
            records: vec![UpdateRow { id, patch: &patch }],
        };
        let (_, response) = self
            .client
            .send::<_, ResultsResponse<T>>(Method::PATCH, self.client.url(T::TABLE, "records"), Some(&body))
            .await?;
        let response = response.ok_or(StoreError::NotFound { table: T::TABLE, id })?;

        first_result(T::TABLE, "update", response)?.ok_or(StoreError::NotFound { table: T::TABLE, id })
    }

    #[instrument(skip(self, value), fields(table = T::TABLE))]
    async fn query_by_field(&self, field: &str, value: &JsonValue) -> StoreResult<Vec<T>> {
        let conditions = vec![WhereClause {
            field_name: field,
            operator: "EqualTo",
            values: vec![value.clone()],
        }];
        self.client.fetch::<T>(conditions).await
    }

    #[instrument(skip(self), fields(table = T::TABLE))]
    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        let body = DeleteRequest { record_ids: vec![id] };
        let (_, response) = self
            .client
            .send::<_, ResultsResponse<JsonValue>>(Method::DELETE, self.client.url(T::TABLE, "records"), Some(&body))
            .await?;

        let Some(response) = response else {
            return Ok(false);
        };
        if !response.success {
            tracing::error!(table = T::TABLE, message = ?response.message, "delete rejected");
            return Err(rejected(response.message, "delete rejected"));
        }
        let results = response.results.unwrap_or_default();
        if let Some(failed) = results.iter().find(|r| !r.success) {
            tracing::error!(table = T::TABLE, %id, message = ?failed.message, "provider rejected delete");
            return Err(rejected(failed.message.clone(), "delete rejected"));
        }
        Ok(!results.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // No `Default` impl, like every stored record type.
    #[derive(Debug, PartialEq, Deserialize)]
    struct Row {
        #[serde(rename = "Id")]
        id: i64,
    }

    #[test]
    fn envelopes_decode_without_optional_fields() {
        let data: DataResponse<Row> = serde_json::from_value(json!({"success": false})).unwrap();
        assert!(!data.success);
        assert!(data.message.is_none() && data.data.is_none());

        let results: ResultsResponse<Row> = serde_json::from_value(json!({
            "success": true,
            "results": [{"success": true, "data": {"Id": 7}}, {"success": true}]
        }))
        .unwrap();
        assert_eq!(first_result("vaccine", "create", results).unwrap(), Some(Row { id: 7 }));
    }

    #[test]
    fn missing_results_is_a_decode_error() {
        let response: ResultsResponse<Row> = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(matches!(first_result("vaccine", "update", response), Err(StoreError::Decode(_))));
    }

    #[test]
    fn failed_record_is_rejected_with_its_message() {
        let response: ResultsResponse<Row> = serde_json::from_value(json!({
            "success": true,
            "results": [{"success": false, "message": "quota exceeded"}]
        }))
        .unwrap();
        assert_eq!(
            first_result("vaccine", "create", response).unwrap_err(),
            StoreError::Rejected("quota exceeded".into())
        );
    }
}
