//! `introcheck-report`: intro detection reports and their reconciliation.
//!
//! Pure engine crate: receives already-fetched report documents, returns
//! indexed collections, classified pairs and validation outcomes.
//! No CLI, network or filesystem dependencies.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod index;
pub mod model;
pub mod schema;
pub mod summary;

pub use classify::{reconcile, Classification, TOLERANCE_SECS};
pub use config::{PluginConfiguration, ServerInfo};
pub use engine::{compare, ComparisonReport};
pub use error::ReportError;
pub use index::CollectionIndex;
pub use model::{IntroRecord, ReconciliationPair, ReportCollection};
pub use schema::{validate_payload, validate_record};
pub use summary::CollectionSummary;
