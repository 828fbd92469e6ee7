use std::future::Future;
use std::pin::Pin;

use crate::error::PluginError;
use crate::range::CellRange;

/// Result of reading a range from the sheet.
///
/// `Empty` is the sink's explicit "no values in this range" signal,
/// a legitimate state for a fresh worksheet. Transport, auth and API
/// failures are `Err(PluginError)`, never `Empty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeRead {
    Empty,
    Rows(Vec<Vec<String>>),
}

impl RangeRead {
    pub fn row_count(&self) -> usize {
        match self {
            RangeRead::Empty => 0,
            RangeRead::Rows(rows) => rows.len(),
        }
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        match self {
            RangeRead::Empty => Vec::new(),
            RangeRead::Rows(rows) => rows,
        }
    }
}

/// Tabular destination bound to one worksheet.
pub trait SheetSink: Send + Sync {
    /// Read a rectangular range as rows of string cells.
    fn read_range(
        &self,
        range: CellRange,
    ) -> Pin<Box<dyn Future<Output = Result<RangeRead, PluginError>> + Send + '_>>;

    /// Overwrite `range` with `rows`, anchored at the range's top-left cell.
    fn write_range(
        &self,
        range: CellRange,
        rows: Vec<Vec<String>>,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + '_>>;

    /// Append `rows` after the last row with content, inserting new rows
    /// rather than overwriting. Returns the number of rows appended.
    fn append_rows(
        &self,
        rows: Vec<Vec<String>>,
    ) -> Pin<Box<dyn Future<Output = Result<usize, PluginError>> + Send + '_>>;
}
