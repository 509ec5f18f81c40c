//! Activity sync: discover upstream containers that have not been ingested
//! yet, download and parse their records, and persist them.
//!
//! The [`reconcile`] step is storage-agnostic and talks to the world through
//! the [`ActivitySource`] and [`ProcessedIndex`] traits. [`run_sync`] wires it
//! to Postgres, the `sync_runs` ledger, and a single-transaction write.

pub mod error;
pub mod reconciler;
pub mod run;
pub mod source;

pub use error::SyncError;
pub use reconciler::{reconcile, SyncOutcome, SyncStats};
pub use run::{run_sync, SyncOptions, SyncReport};
pub use source::{ActivitySource, ProcessedIndex};
