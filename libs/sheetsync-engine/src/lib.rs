//! Incremental, idempotent export of store records into a sheet.
//!
//! One run: select the lookback window → drop records the sheet already
//! has → flatten → extend the header → materialize → header write + append.
//! See [`export::run_export`].

pub mod config;
pub mod dedup;
pub mod error;
pub mod export;
pub mod flatten;
pub mod materialize;
pub mod schema;
pub mod window;
pub mod writer;

pub use config::{DedupStrategy, ExportConfig};
pub use error::{ExportError, WriteStage};
pub use export::{ExportReport, run_export};
