use std::collections::HashSet;

use crate::flatten::FlatRow;

/// Header for this run's rows and how it relates to the sheet's current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPlan {
    /// Existing columns in place, then novel columns in first-seen order.
    pub header: Vec<String>,
    /// Number of columns appended to the existing header.
    pub columns_added: usize,
}

impl HeaderPlan {
    /// The header row must be rewritten before rows are appended.
    pub fn changed(&self) -> bool {
        self.columns_added > 0
    }
}

/// Extend `existing` with every key seen in `rows` that it lacks.
///
/// First-seen order is record order, then key order within a record, so the
/// result is reproducible for the same input. Existing positions never move.
pub fn unify_header(existing: &[String], rows: &[FlatRow]) -> HeaderPlan {
    let mut header = existing.to_vec();
    let mut known: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let mut columns_added = 0;

    for row in rows {
        for key in row.keys() {
            if known.insert(key) {
                header.push(key.to_string());
                columns_added += 1;
            }
        }
    }

    HeaderPlan { header, columns_added }
}

#[cfg(test)]
mod tests {
    use sheetsync_api::Value;

    use super::*;

    fn row(keys: &[&str]) -> FlatRow {
        let mut r = FlatRow::new();
        for k in keys {
            r.insert(*k, Value::Int(1));
        }
        r
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fresh_header_uses_first_seen_order() {
        let plan = unify_header(&[], &[row(&["_id", "b", "a"]), row(&["_id", "c", "a"])]);
        assert_eq!(plan.header, strings(&["_id", "b", "a", "c"]));
        assert_eq!(plan.columns_added, 4);
        assert!(plan.changed());
    }

    #[test]
    fn existing_columns_keep_position() {
        let existing = strings(&["_id", "z", "y"]);
        let plan = unify_header(&existing, &[row(&["y", "new", "_id"])]);
        assert_eq!(plan.header, strings(&["_id", "z", "y", "new"]));
        assert_eq!(plan.columns_added, 1);
        assert!(plan.header.starts_with(&existing));
    }

    #[test]
    fn no_new_keys_means_no_rewrite() {
        let existing = strings(&["_id", "a", "b"]);
        let plan = unify_header(&existing, &[row(&["a"]), row(&["b", "_id"])]);
        assert_eq!(plan.header, existing);
        assert!(!plan.changed());
    }
}
