use sheetsync_api::Value;

use crate::flatten::FlatRow;

/// Text for one cell.
///
/// Null → empty; arrays and maps → compact JSON (display form if that
/// fails); everything else → its natural string form.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        composite if composite.is_composite() => {
            serde_json::to_string(composite).unwrap_or_else(|_| composite.to_string())
        }
        scalar => scalar.to_string(),
    }
}

/// Project `row` onto `header` positionally; absent fields become `""`.
pub fn materialize_row(header: &[String], row: &FlatRow) -> Vec<String> {
    header
        .iter()
        .map(|column| row.get(column).map(render_cell).unwrap_or_default())
        .collect()
}

pub fn materialize_rows(header: &[String], rows: &[FlatRow]) -> Vec<Vec<String>> {
    rows.iter().map(|row| materialize_row(header, row)).collect()
}

/// Mark every non-empty cell of column `col` as literal text (`'` prefix).
pub fn force_text(rows: &mut [Vec<String>], col: usize) {
    for cell in rows.iter_mut().filter_map(|row| row.get_mut(col)) {
        if !cell.is_empty() {
            cell.insert(0, '\'');
        }
    }
}
