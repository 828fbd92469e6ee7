use std::fmt;

/// Spreadsheet column letters for a zero-based column index:
/// `0 → A`, `25 → Z`, `26 → AA`, `52 → BA`.
pub fn column_letters(index: u32) -> String {
    let mut n = u64::from(index) + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        out.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Rectangular cell range, zero-based and inclusive.
///
/// `end_row = None`: open-ended downwards (every row from `start_row` on).
/// `end_col = None`: open-ended to the right (the whole row).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: Option<u32>,
    pub end_col: Option<u32>,
}

impl CellRange {
    /// A single cell.
    pub fn cell(row: u32, col: u32) -> Self {
        Self { start_row: row, start_col: col, end_row: None, end_col: None }
    }

    /// The whole of one row.
    pub fn row(row: u32) -> Self {
        Self { start_row: row, start_col: 0, end_row: Some(row), end_col: None }
    }

    /// The first `width` cells of one row.
    pub fn row_span(row: u32, width: usize) -> Self {
        let last = u32::try_from(width.saturating_sub(1)).unwrap_or(u32::MAX);
        Self { start_row: row, start_col: 0, end_row: Some(row), end_col: Some(last) }
    }

    /// One column, from `start_row` to the last row with data.
    pub fn column_from(col: u32, start_row: u32) -> Self {
        Self { start_row, start_col: col, end_row: None, end_col: Some(col) }
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row
            && col >= self.start_col
            && self.end_row.is_none_or(|r| row <= r)
            && self.end_col.is_none_or(|c| col <= c)
    }

    /// A1 notation without a worksheet prefix: `A1:C1`, `A2:A`, `1:1`.
    pub fn to_a1(&self) -> String {
        let start = format!("{}{}", column_letters(self.start_col), self.start_row + 1);
        match (self.end_row, self.end_col) {
            (Some(r), Some(c)) => format!("{start}:{}{}", column_letters(c), r + 1),
            (None, Some(c)) => format!("{start}:{}", column_letters(c)),
            (Some(r), None) if self.start_col == 0 => format!("{}:{}", self.start_row + 1, r + 1),
            (Some(r), None) => format!("{start}:{}", r + 1),
            (None, None) => start,
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}
