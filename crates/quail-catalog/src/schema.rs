//! Schema snapshots handed to the binder

use crate::column::Column;

/// An ordered snapshot of a table's columns.
///
/// Column order is the table's storage and insert order. Names are unique
/// case-insensitively; lookups fold case, storage keeps original spelling.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Schema { columns }
    }

    /// Get a column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Get a column by position
    pub fn get_column_by_index(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
