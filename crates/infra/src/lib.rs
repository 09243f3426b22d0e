//! Infrastructure layer: record stores, configuration, and the use-case workflows
//! that write through them.

pub mod config;
pub mod store;
pub mod workflows;

pub use config::{ConfigError, ProviderConfig, StoreBackend, StoreConfig};
pub use store::{LocalCollection, ProviderClient, RecordStore, RemoteProvider, StoreError, StoreResult, Stores};
