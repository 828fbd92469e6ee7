use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::RwLock;

use sheetsync_api::{CellRange, PluginError, RangeRead, Record, RecordId, RecordStore, SheetSink};

// ═══════════════════════════════════════════════════════════════
//  MemoryStore
// ═══════════════════════════════════════════════════════════════

/// In-memory record store ordered by identifier, for tests and local
/// dry runs without a database.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<RecordId, Record>>,
    fail_queries: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: Record) {
        self.records.write().await.insert(record.id, record);
    }

    pub async fn insert_many(&self, records: impl IntoIterator<Item = Record>) {
        let mut buf = self.records.write().await;
        for record in records {
            buf.insert(record.id, record);
        }
    }

    /// Make every following query fail with an I/O error.
    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }
}

impl RecordStore for MemoryStore {
    fn find_from(
        &self,
        min_id: RecordId,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Record>, PluginError>> + Send + '_>> {
        Box::pin(async move {
            if self.fail_queries.load(Ordering::SeqCst) {
                return Err(PluginError::io("memory store: injected query failure"));
            }
            let buf = self.records.read().await;
            Ok(buf.range(min_id..).map(|(_, r)| r.clone()).collect())
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemorySheet
// ═══════════════════════════════════════════════════════════════

/// In-memory worksheet with the read/write/append semantics of a real
/// spreadsheet API:
/// - reads drop trailing empty cells and trailing empty rows, and report
///   `RangeRead::Empty` when nothing is left;
/// - writes must stay inside a bounded range;
/// - appends insert after the last row that has content.
#[derive(Default)]
pub struct MemorySheet {
    grid: RwLock<Vec<Vec<String>>>,
    range_writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_appends: AtomicBool,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self { grid: RwLock::new(rows), ..Default::default() }
    }

    /// Snapshot of the grid as stored.
    pub async fn rows(&self) -> Vec<Vec<String>> {
        self.grid.read().await.clone()
    }

    /// Number of successful `write_range` calls.
    pub fn range_writes(&self) -> usize {
        self.range_writes.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(String::is_empty)
}

fn read_grid(grid: &[Vec<String>], range: CellRange) -> RangeRead {
    let first = range.start_row as usize;
    let last = range.end_row.map_or(grid.len(), |r| (r as usize + 1).min(grid.len()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for row in grid.get(first..last).unwrap_or_default() {
        let start = (range.start_col as usize).min(row.len());
        let end = range.end_col.map_or(row.len(), |c| (c as usize + 1).min(row.len()));
        let mut cells: Vec<String> = row.get(start..end).unwrap_or_default().to_vec();
        while cells.last().is_some_and(String::is_empty) {
            cells.pop();
        }
        rows.push(cells);
    }
    while rows.last().is_some_and(|r| r.is_empty()) {
        rows.pop();
    }

    if rows.is_empty() { RangeRead::Empty } else { RangeRead::Rows(rows) }
}

impl SheetSink for MemorySheet {
    fn read_range(
        &self,
        range: CellRange,
    ) -> Pin<Box<dyn Future<Output = Result<RangeRead, PluginError>> + Send + '_>> {
        Box::pin(async move {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(PluginError::io("memory sheet: injected read failure"));
            }
            let grid = self.grid.read().await;
            Ok(read_grid(&grid, range))
        })
    }

    fn write_range(
        &self,
        range: CellRange,
        rows: Vec<Vec<String>>,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + '_>> {
        Box::pin(async move {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(PluginError::io("memory sheet: injected write failure"));
            }

            for (i, row) in rows.iter().enumerate() {
                let (r, last_c) = (range.start_row as usize + i, range.start_col as usize + row.len());
                if !row.is_empty() && !range.contains(r as u32, (last_c - 1) as u32) {
                    return Err(PluginError::new(format!(
                        "write to row {} column {} is outside range {range}",
                        r + 1,
                        last_c
                    )));
                }
            }

            let mut grid = self.grid.write().await;
            for (i, row) in rows.into_iter().enumerate() {
                let r = range.start_row as usize + i;
                for (j, cell) in row.into_iter().enumerate() {
                    let c = range.start_col as usize + j;
                    if grid.len() <= r {
                        grid.resize_with(r + 1, Vec::new);
                    }
                    let target = &mut grid[r];
                    if target.len() <= c {
                        target.resize(c + 1, String::new());
                    }
                    target[c] = cell;
                }
            }
            self.range_writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn append_rows(
        &self,
        rows: Vec<Vec<String>>,
    ) -> Pin<Box<dyn Future<Output = Result<usize, PluginError>> + Send + '_>> {
        Box::pin(async move {
            if self.fail_appends.load(Ordering::SeqCst) {
                return Err(PluginError::io("memory sheet: injected append failure"));
            }

            let mut grid = self.grid.write().await;
            let at = grid.iter().rposition(|r| !is_blank(r)).map_or(0, |i| i + 1);
            let count = rows.len();
            let tail = grid.split_off(at);
            grid.extend(rows);
            grid.extend(tail);
            Ok(count)
        })
    }
}
