//! Record store boundary.
//!
//! One `RecordStore<T>` per record kind, backed either by the remote provider or
//! by a process-local collection. The backend is chosen once, when [`Stores`] is
//! built; nothing downstream knows which one it talks to.

pub mod local;
pub mod remote;
pub mod r#trait;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use vaxtrack_core::{Record, RecordId};
use vaxtrack_inventory::{AdministrationRecord, LossReport, QualityCheck, VaccineLot};

pub use local::LocalCollection;
pub use remote::{ProviderClient, RemoteProvider};
pub use r#trait::{RecordStore, StoreError, StoreResult};

use crate::config::{StoreBackend, StoreConfig};

/// Adapter that waits a fixed delay before every call to the wrapped store.
pub struct SimulatedLatency<S> {
    inner: S,
    delay: Duration,
}

impl<S> SimulatedLatency<S> {
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl<T, S> RecordStore<T> for SimulatedLatency<S>
where
    T: Record,
    S: RecordStore<T>,
{
    async fn create(&self, draft: T::Draft) -> StoreResult<T> {
        self.pause().await;
        self.inner.create(draft).await
    }

    async fn get_all(&self) -> StoreResult<Vec<T>> {
        self.pause().await;
        self.inner.get_all().await
    }

    async fn get_by_id(&self, id: RecordId) -> StoreResult<Option<T>> {
        self.pause().await;
        self.inner.get_by_id(id).await
    }

    async fn update(&self, id: RecordId, patch: T::Patch) -> StoreResult<T> {
        self.pause().await;
        self.inner.update(id, patch).await
    }

    async fn query_by_field(&self, field: &str, value: &JsonValue) -> StoreResult<Vec<T>> {
        self.pause().await;
        self.inner.query_by_field(field, value).await
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        self.pause().await;
        self.inner.delete(id).await
    }
}

fn shared<T, S>(store: S, delay: Duration) -> Arc<dyn RecordStore<T>>
where
    T: Record,
    S: RecordStore<T> + 'static,
{
    if delay.is_zero() {
        Arc::new(store)
    } else {
        Arc::new(SimulatedLatency::new(store, delay))
    }
}

/// One store per record kind, all on the same backend.
#[derive(Clone)]
pub struct Stores {
    pub vaccines: Arc<dyn RecordStore<VaccineLot>>,
    pub quality_checks: Arc<dyn RecordStore<QualityCheck>>,
    pub administrations: Arc<dyn RecordStore<AdministrationRecord>>,
    pub losses: Arc<dyn RecordStore<LossReport>>,
}

impl core::fmt::Debug for Stores {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

impl Stores {
    /// Fresh, empty local collections.
    pub fn local() -> Self {
        Self::local_with_latency(Duration::ZERO)
    }

    pub fn local_with_latency(delay: Duration) -> Self {
        Self {
            vaccines: shared(LocalCollection::<VaccineLot>::new(), delay),
            quality_checks: shared(LocalCollection::<QualityCheck>::new(), delay),
            administrations: shared(LocalCollection::<AdministrationRecord>::new(), delay),
            losses: shared(LocalCollection::<LossReport>::new(), delay),
        }
    }

    pub fn remote(client: Arc<ProviderClient>, delay: Duration) -> Self {
        Self {
            vaccines: shared(RemoteProvider::<VaccineLot>::new(client.clone()), delay),
            quality_checks: shared(RemoteProvider::<QualityCheck>::new(client.clone()), delay),
            administrations: shared(RemoteProvider::<AdministrationRecord>::new(client.clone()), delay),
            losses: shared(RemoteProvider::<LossReport>::new(client), delay),
        }
    }

    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        match &config.backend {
            StoreBackend::Local => {
                tracing::info!("using local in-memory record store");
                Ok(Self::local_with_latency(config.latency))
            }
            StoreBackend::Remote(provider) => {
                tracing::info!(base_url = %provider.base_url, "using remote record provider");
                let client = Arc::new(ProviderClient::new(provider.clone())?);
                Ok(Self::remote(client, config.latency))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use vaxtrack_inventory::NewVaccineLot;

    #[tokio::test(start_paused = true)]
    async fn latency_is_applied_before_each_call() {
        let stores = Stores::local_with_latency(Duration::from_millis(300));
        let date = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();

        let started = tokio::time::Instant::now();
        stores
            .vaccines
            .create(NewVaccineLot {
                name: "Vaxigrip".into(),
                commercial_name: "Vaxigrip".into(),
                generic_name: "Influenza".into(),
                lot_number: "L-1".into(),
                quantity: 10,
                expiration_date: date,
                received_date: date,
                quantity_on_hand: 10,
                administered_doses: 0,
            })
            .await
            .unwrap();
        let all = stores.vaccines.get_all().await.unwrap();

        assert_eq!(all.len(), 1);
        assert!(started.elapsed() >= Duration::from_millis(600));
    }

    #[tokio::test]
    async fn local_stores_start_empty() {
        let stores = Stores::from_config(&StoreConfig::default()).unwrap();
        assert!(stores.vaccines.get_all().await.unwrap().is_empty());
        assert!(stores.losses.get_all().await.unwrap().is_empty());
    }
}
