//! `vaxtrack-core` — shared building blocks for the vaccine inventory.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! record identity, the persisted-record contract, and the error model.

pub mod error;
pub mod id;
pub mod record;

pub use error::{DomainError, DomainResult, FieldErrors};
pub use id::RecordId;
pub use record::Record;
