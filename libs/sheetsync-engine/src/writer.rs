use sheetsync_api::{CellRange, SheetSink};

use crate::error::{ExportError, WriteStage};
use crate::schema::HeaderPlan;

/// What the writer actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub header_written: bool,
    pub rows_appended: usize,
}

/// Rewrite the header row when the plan changed it, then append `rows`.
///
/// Not atomic: if the append fails after a header rewrite, the header stays
/// extended with no new rows. The next run's id lookup picks the records up.
pub async fn write_batch(
    sink: &dyn SheetSink,
    plan: &HeaderPlan,
    rows: Vec<Vec<String>>,
) -> Result<WriteOutcome, ExportError> {
    let mut outcome = WriteOutcome::default();

    if plan.changed() {
        sink.write_range(CellRange::row_span(0, plan.header.len()), vec![plan.header.clone()])
            .await
            .map_err(|source| ExportError::SinkWrite { stage: WriteStage::Header, source })?;
        outcome.header_written = true;
        tracing::info!(columns = plan.header.len(), added = plan.columns_added, "header rewritten");
    }

    if rows.is_empty() {
        return Ok(outcome);
    }

    outcome.rows_appended = sink
        .append_rows(rows)
        .await
        .map_err(|source| ExportError::SinkWrite { stage: WriteStage::Append, source })?;
    Ok(outcome)
}
