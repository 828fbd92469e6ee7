use chrono::{DateTime, Utc};

use sheetsync_api::{RecordStore, SheetSink};

use crate::config::ExportConfig;
use crate::dedup::{read_destination, resolve_new};
use crate::error::ExportError;
use crate::flatten::{FlatRow, flatten_record};
use crate::materialize::{force_text, materialize_rows};
use crate::schema::unify_header;
use crate::window::select_window;
use crate::writer::write_batch;

/// Summary of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Records found in the lookback window.
    pub candidates: usize,
    /// Candidates not yet present in the sheet.
    pub new_records: usize,
    pub header_rewritten: bool,
    pub columns_added: usize,
    /// Rows the sink reported as appended.
    pub rows_appended: usize,
    pub dry_run: bool,
}

/// One export run: window → dedup → flatten → header → rows → write.
///
/// Strictly sequential. Ends early, without touching the sheet further, when
/// the window or the dedup pass leaves nothing to write. `now` is injected so
/// callers and tests control the window.
pub async fn run_export(
    store: &dyn RecordStore,
    sink: &dyn SheetSink,
    config: &ExportConfig,
    now: DateTime<Utc>,
) -> Result<ExportReport, ExportError> {
    config.validate()?;
    let mut report = ExportReport { dry_run: config.dry_run, ..Default::default() };

    let candidates = select_window(store, now, config.lookback).await?;
    report.candidates = candidates.len();
    if candidates.is_empty() {
        tracing::info!("no records in window, nothing to export");
        return Ok(report);
    }

    let state = read_destination(sink, config).await?;
    let fresh = resolve_new(candidates, &state, config.dedup);
    report.new_records = fresh.len();
    if fresh.is_empty() {
        tracing::info!(candidates = report.candidates, "every record already exported");
        return Ok(report);
    }

    let rows: Vec<FlatRow> = fresh.iter().map(|r| flatten_record(r, &config.id_column)).collect();
    let plan = unify_header(&state.header, &rows);
    report.columns_added = plan.columns_added;
    let mut cells = materialize_rows(&plan.header, &rows);
    if config.text_ids {
        if let Some(col) = plan.header.iter().position(|c| c == &config.id_column) {
            force_text(&mut cells, col);
        }
    }

    if config.dry_run {
        tracing::info!(
            new_records = report.new_records,
            columns = plan.header.len(),
            columns_added = plan.columns_added,
            header_rewrite = plan.changed(),
            "dry run, skipping sheet writes"
        );
        return Ok(report);
    }

    let outcome = write_batch(sink, &plan, cells).await?;
    report.header_rewritten = outcome.header_written;
    report.rows_appended = outcome.rows_appended;

    tracing::info!(
        candidates = report.candidates,
        new_records = report.new_records,
        rows_appended = report.rows_appended,
        header_rewritten = report.header_rewritten,
        "export complete"
    );
    Ok(report)
}
