use std::collections::HashSet;

use sheetsync_api::{CellRange, RangeRead, Record, SheetSink};

use crate::config::{DedupStrategy, ExportConfig};
use crate::error::ExportError;

/// What the sheet holds at the start of a run. Read once, never refreshed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationState {
    /// First row of the sheet; empty for a fresh worksheet.
    pub header: Vec<String>,
    /// Canonical identifiers found in the id column (`Ids` strategy only).
    pub existing_ids: HashSet<String>,
}

/// Read the header row and, for the `Ids` strategy, the whole identifier column.
///
/// `RangeRead::Empty` means "nothing there yet"; any sink error aborts.
pub async fn read_destination(
    sink: &dyn SheetSink,
    config: &ExportConfig,
) -> Result<DestinationState, ExportError> {
    let header = sink
        .read_range(CellRange::row(0))
        .await
        .map_err(|source| ExportError::SinkRead { what: "header", source })?
        .into_rows()
        .into_iter()
        .next()
        .unwrap_or_default();

    let mut state = DestinationState { header, existing_ids: HashSet::new() };
    if config.dedup == DedupStrategy::Window || state.header.is_empty() {
        return Ok(state);
    }

    let Some(col) = state.header.iter().position(|c| c == &config.id_column) else {
        tracing::warn!(
            id_column = %config.id_column,
            columns = state.header.len(),
            "id column missing from sheet header, treating every record as new"
        );
        return Ok(state);
    };

    let col = u32::try_from(col)
        .map_err(|_| ExportError::Config(format!("id column index {col} out of range")))?;
    let rows = match sink
        .read_range(CellRange::column_from(col, 1))
        .await
        .map_err(|source| ExportError::SinkRead { what: "identifiers", source })?
    {
        RangeRead::Empty => Vec::new(),
        RangeRead::Rows(rows) => rows,
    };

    state.existing_ids = rows
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .map(|cell| cell.trim().trim_start_matches('\'').to_string())
        .filter(|cell| !cell.is_empty())
        .collect();
    tracing::info!(existing = state.existing_ids.len(), "read existing identifiers");
    Ok(state)
}

/// Keep the candidates judged new, in their original order.
pub fn resolve_new(
    candidates: Vec<Record>,
    state: &DestinationState,
    strategy: DedupStrategy,
) -> Vec<Record> {
    match strategy {
        DedupStrategy::Window => candidates,
        DedupStrategy::Ids => candidates
            .into_iter()
            .filter(|r| !state.existing_ids.contains(&r.id.to_hex()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use sheetsync_api::RecordId;
    use sheetsync_storage_memory::MemorySheet;

    use super::*;

    fn rec(secs: u32) -> Record {
        Record::with_fields(RecordId::new(secs, 1), vec![])
    }

    #[test]
    fn ids_strategy_drops_known_records() {
        let (a, b, c) = (rec(1), rec(2), rec(3));
        let state = DestinationState {
            header: vec!["_id".into()],
            existing_ids: [a.id.to_hex(), b.id.to_hex()].into_iter().collect(),
        };

        let fresh = resolve_new(vec![a, b, c.clone()], &state, DedupStrategy::Ids);
        assert_eq!(fresh, vec![c]);
    }

    #[test]
    fn window_strategy_keeps_everything() {
        let a = rec(1);
        let state = DestinationState {
            header: vec!["_id".into()],
            existing_ids: [a.id.to_hex()].into_iter().collect(),
        };
        assert_eq!(resolve_new(vec![a.clone()], &state, DedupStrategy::Window), vec![a]);
    }

    #[tokio::test]
    async fn fresh_sheet_is_empty_state() {
        let sheet = MemorySheet::new();
        let state = read_destination(&sheet, &ExportConfig::default()).await.unwrap();
        assert_eq!(state, DestinationState::default());
    }

    #[tokio::test]
    async fn reads_id_column_by_header_position() {
        let sheet = MemorySheet::with_rows(vec![
            vec!["name".into(), "_id".into()],
            vec!["a".into(), "aaa".into()],
            vec!["b".into(), "".into()],
            vec!["c".into(), "ccc".into()],
        ]);

        let state = read_destination(&sheet, &ExportConfig::default()).await.unwrap();
        assert_eq!(state.header, vec!["name", "_id"]);
        assert_eq!(state.existing_ids, ["aaa".to_string(), "ccc".to_string()].into_iter().collect());
    }

    #[tokio::test]
    async fn text_marker_is_stripped_from_ids() {
        let sheet = MemorySheet::with_rows(vec![vec!["_id".into()], vec!["'0123".into()]]);
        let state = read_destination(&sheet, &ExportConfig::default()).await.unwrap();
        assert_eq!(state.existing_ids, ["0123".to_string()].into_iter().collect());
    }

    #[tokio::test]
    async fn missing_id_column_yields_no_ids() {
        let sheet = MemorySheet::with_rows(vec![vec!["name".into()], vec!["a".into()]]);
        let state = read_destination(&sheet, &ExportConfig::default()).await.unwrap();
        assert!(state.existing_ids.is_empty());
    }

    #[tokio::test]
    async fn read_failure_is_not_empty() {
        let sheet = MemorySheet::new();
        sheet.fail_reads(true);
        let err = read_destination(&sheet, &ExportConfig::default()).await.unwrap_err();
        assert!(matches!(err, ExportError::SinkRead { what: "header", .. }));
    }
}
