use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use vaxtrack_core::{Record, RecordId};

use super::r#trait::{RecordStore, StoreError, StoreResult};

#[derive(Debug)]
struct Rows<T> {
    records: Vec<T>,
    next_id: i64,
}

/// In-memory record collection.
///
/// Lives as long as the owning process or test fixture. Ids start at 1 and
/// are never reused, even after a delete.
#[derive(Debug)]
pub struct LocalCollection<T> {
    rows: RwLock<Rows<T>>,
}

impl<T: Record> LocalCollection<T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Seed the collection; new ids continue after the largest seeded id.
    pub fn with_records(records: Vec<T>) -> Self {
        let next_id = records.iter().map(|r| r.id().get()).max().unwrap_or(0) + 1;
        Self {
            rows: RwLock::new(Rows { records, next_id }),
        }
    }

    fn poisoned() -> StoreError {
        StoreError::Storage(format!("{} collection lock poisoned", T::TABLE))
    }
}

impl<T: Record> Default for LocalCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn field_matches<T: Record>(record: &T, field: &str, value: &JsonValue) -> StoreResult<bool> {
    let encoded = serde_json::to_value(record).map_err(|e| StoreError::Decode(e.to_string()))?;
    Ok(encoded.get(field) == Some(value))
}

#[async_trait]
impl<T: Record> RecordStore<T> for LocalCollection<T> {
    async fn create(&self, draft: T::Draft) -> StoreResult<T> {
        let mut rows = self.rows.write().map_err(|_| Self::poisoned())?;
        let id = RecordId::new(rows.next_id);
        rows.next_id += 1;

        let record = T::from_draft(id, draft);
        rows.records.push(record.clone());
        tracing::debug!(table = T::TABLE, %id, "record created");
        Ok(record)
    }

    async fn get_all(&self) -> StoreResult<Vec<T>> {
        let rows = self.rows.read().map_err(|_| Self::poisoned())?;
        Ok(rows.records.clone())
    }

    async fn get_by_id(&self, id: RecordId) -> StoreResult<Option<T>> {
        let rows = self.rows.read().map_err(|_| Self::poisoned())?;
        Ok(rows.records.iter().find(|r| r.id() == id).cloned())
    }

    async fn update(&self, id: RecordId, patch: T::Patch) -> StoreResult<T> {
        let mut rows = self.rows.write().map_err(|_| Self::poisoned())?;
        let record = rows
            .records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(StoreError::NotFound { table: T::TABLE, id })?;

        record.apply_patch(&patch);
        tracing::debug!(table = T::TABLE, %id, "record updated");
        Ok(record.clone())
    }

    async fn query_by_field(&self, field: &str, value: &JsonValue) -> StoreResult<Vec<T>> {
        let rows = self.rows.read().map_err(|_| Self::poisoned())?;
        let mut matches = Vec::new();
        for record in &rows.records {
            if field_matches(record, field, value)? {
                matches.push(record.clone());
            }
        }
        Ok(matches)
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        let mut rows = self.rows.write().map_err(|_| Self::poisoned())?;
        let before = rows.records.len();
        rows.records.retain(|r| r.id() != id);
        Ok(rows.records.len() != before)
    }
}
