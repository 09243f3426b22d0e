//! Record trait: identity + the shapes used to create and patch a persisted row.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::id::RecordId;

/// A persisted entity kind managed by a record store.
///
/// Field names on the serialized form are the external (provider) column
/// names, so the same struct travels to the remote provider and lives in the
/// local collection.
pub trait Record:
    Clone + core::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Creation payload (everything except the store-assigned id).
    type Draft: Clone + core::fmt::Debug + Serialize + Send + Sync + 'static;

    /// Partial update; unset fields are left untouched.
    type Patch: Clone + core::fmt::Debug + Serialize + Send + Sync + 'static;

    /// Provider table name.
    const TABLE: &'static str;

    /// Column names requested when fetching from the provider.
    const FIELDS: &'static [&'static str];

    fn id(&self) -> RecordId;

    /// Materialize a record once the store has assigned an id.
    fn from_draft(id: RecordId, draft: Self::Draft) -> Self;

    fn apply_patch(&mut self, patch: &Self::Patch);
}
