use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

use vaxtrack_core::{Record, RecordId};

pub type StoreResult<T> = Result<T, StoreError>;

/// Record store operation error.
///
/// These are **persistence errors** (provider rejection, transport, decoding) as
/// opposed to domain errors (validation). Callers surface them generically and
/// keep the cause for diagnostics.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{table} record {id} not found")]
    NotFound { table: &'static str, id: RecordId },

    #[error("provider rejected the request: {0}")]
    Rejected(String),

    #[error("provider unreachable: {0}")]
    Transport(String),

    #[error("malformed provider response: {0}")]
    Decode(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Uniform create/read/update/query access to one record kind.
///
/// ## Semantics
///
/// - `create` assigns the id and returns the persisted record.
/// - `get_all` order is unspecified; sort in the view layer.
/// - `get_by_id` returns `Ok(None)` for unknown ids.
/// - `update` applies a partial patch and fails with `NotFound` for unknown ids.
/// - `query_by_field` matches records whose serialized `field` equals `value`.
/// - `delete` reports whether a record was removed.
///
/// Every returned record is an owned copy; nothing a caller holds aliases the
/// store's state. No operation is transactional across calls.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    async fn create(&self, draft: T::Draft) -> StoreResult<T>;

    async fn get_all(&self) -> StoreResult<Vec<T>>;

    async fn get_by_id(&self, id: RecordId) -> StoreResult<Option<T>>;

    async fn update(&self, id: RecordId, patch: T::Patch) -> StoreResult<T>;

    async fn query_by_field(&self, field: &str, value: &JsonValue) -> StoreResult<Vec<T>>;

    async fn delete(&self, id: RecordId) -> StoreResult<bool>;
}

#[async_trait]
impl<T, S> RecordStore<T> for Arc<S>
where
    T: Record,
    S: RecordStore<T> + ?Sized,
{
    async fn create(&self, draft: T::Draft) -> StoreResult<T> {
        (**self).create(draft).await
    }

    async fn get_all(&self) -> StoreResult<Vec<T>> {
        (**self).get_all().await
    }

    async fn get_by_id(&self, id: RecordId) -> StoreResult<Option<T>> {
        (**self).get_by_id(id).await
    }

    async fn update(&self, id: RecordId, patch: T::Patch) -> StoreResult<T> {
        (**self).update(id, patch).await
    }

    async fn query_by_field(&self, field: &str, value: &JsonValue) -> StoreResult<Vec<T>> {
        (**self).query_by_field(field, value).await
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        (**self).delete(id).await
    }
}
