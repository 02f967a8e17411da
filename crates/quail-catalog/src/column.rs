//! Column metadata

use crate::oid::ColumnOid;
use quail_common::{Value, ValueType};

/// A column in a table schema
#[derive(Debug, Clone)]
pub struct Column {
    /// Stable identifier of the column
    pub oid: ColumnOid,
    /// Column name as originally spelled
    pub name: String,
    /// Column type
    pub value_type: ValueType,
    /// Whether the column allows NULL values
    pub nullable: bool,
    /// Default value for the column (if any)
    pub default: Option<Value>,
}

impl Column {
    pub fn new(oid: ColumnOid, name: String, value_type: ValueType) -> Self {
        Column {
            oid,
            name,
            value_type,
            nullable: true,
            default: None,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}
