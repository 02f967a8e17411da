//! Bound statements

use super::BoundExpression;
use quail_catalog::{ColumnOid, DatabaseOid, Schema, TableOid};
use quail_common::ValueType;

/// A bound statement ready for planning
#[derive(Debug, Clone)]
pub enum BoundStatement {
    Select(BoundSelect),
    Insert(BoundInsert),
    Update(BoundUpdate),
    Delete(BoundDelete),
    Copy(BoundCopy),
    CreateDatabase(BoundCreateDatabase),
    CreateTable(BoundCreateTable),
    CreateIndex(BoundCreateIndex),
    CreateTrigger(BoundCreateTrigger),
    CreateView(BoundCreateView),
    CreateSchema(BoundCreateSchema),
    CreateFunction(BoundCreateFunction),
    Drop(BoundDrop),
    Analyze(BoundAnalyze),
    Prepare(BoundPrepare),
    Execute(BoundExecute),
    Transaction(TransactionKind),
}

/// Bound SELECT statement
#[derive(Debug, Clone)]
pub struct BoundSelect {
    /// SELECT expressions, with `*` already expanded
    pub select_list: Vec<BoundExpression>,
    /// FROM clause (table references)
    pub from: Vec<BoundTableRef>,
    /// WHERE clause
    pub where_clause: Option<BoundExpression>,
    /// GROUP BY expressions
    pub group_by: Vec<BoundExpression>,
    /// HAVING clause
    pub having: Option<BoundExpression>,
    /// ORDER BY expressions
    pub order_by: Vec<BoundOrderBy>,
    /// LIMIT
    pub limit: Option<u64>,
    /// OFFSET
    pub offset: Option<u64>,
    /// Nesting depth of the scope this SELECT was bound in
    pub depth: u32,
}

impl BoundSelect {
    /// Names and types of the projected columns, in order. This is the
    /// shape a derived table exposes to its enclosing scope.
    pub fn output_columns(&self) -> Vec<(String, ValueType)> {
        self.select_list
            .iter()
            .map(|e| (e.name(), e.return_type))
            .collect()
    }
}

/// Bound table reference
#[derive(Debug, Clone)]
pub enum BoundTableRef {
    /// Base table backed by the catalog
    BaseTable {
        database: String,
        db_oid: DatabaseOid,
        table_oid: TableOid,
        name: String,
        alias: Option<String>,
        schema: Schema,
    },
    /// Query-derived table: (SELECT ...) AS alias
    Derived {
        subquery: Box<BoundSelect>,
        alias: String,
    },
    /// Join
    Join {
        left: Box<BoundTableRef>,
        right: Box<BoundTableRef>,
        join_type: BoundJoinType,
        condition: Option<BoundExpression>,
    },
}

/// Join types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundJoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// ORDER BY expression
#[derive(Debug, Clone)]
pub struct BoundOrderBy {
    pub expr: BoundExpression,
    pub ascending: bool,
    pub nulls_first: bool,
}

/// Bound INSERT statement
#[derive(Debug, Clone)]
pub struct BoundInsert {
    pub database: String,
    pub table: String,
    pub table_oid: TableOid,
    /// Explicitly named insert columns; empty means the full schema
    pub columns: Vec<String>,
    /// VALUES rows, with value coercions already applied in place
    pub values: Vec<Vec<BoundExpression>>,
    /// Source query for INSERT ... SELECT
    pub source: Option<Box<BoundSelect>>,
}

/// Bound UPDATE statement
#[derive(Debug, Clone)]
pub struct BoundUpdate {
    pub database: String,
    pub table: String,
    pub table_oid: TableOid,
    pub assignments: Vec<BoundAssignment>,
    pub where_clause: Option<BoundExpression>,
}

/// One SET clause of an UPDATE
#[derive(Debug, Clone)]
pub struct BoundAssignment {
    pub column: String,
    pub column_oid: ColumnOid,
    pub value: BoundExpression,
}

/// Bound DELETE statement
#[derive(Debug, Clone)]
pub struct BoundDelete {
    pub database: String,
    pub table: String,
    pub table_oid: TableOid,
    pub where_clause: Option<BoundExpression>,
}

/// Bound COPY statement
#[derive(Debug, Clone)]
pub struct BoundCopy {
    /// Table form: all of the table's columns, expanded
    pub table: Option<String>,
    pub columns: Vec<BoundExpression>,
    /// Query form
    pub query: Option<Box<BoundSelect>>,
    /// true for COPY ... TO, false for COPY ... FROM
    pub to: bool,
}

/// Bound CREATE DATABASE statement
#[derive(Debug, Clone)]
pub struct BoundCreateDatabase {
    pub name: String,
}

/// Bound CREATE TABLE statement
#[derive(Debug, Clone)]
pub struct BoundCreateTable {
    pub database: String,
    pub name: String,
    pub columns: Vec<BoundColumnDef>,
    pub foreign_keys: Vec<BoundForeignKey>,
}

/// Column definition
#[derive(Debug, Clone)]
pub struct BoundColumnDef {
    pub name: String,
    pub value_type: ValueType,
    pub nullable: bool,
    pub default: Option<BoundExpression>,
    pub check: Option<BoundExpression>,
}

/// A validated foreign key
#[derive(Debug, Clone)]
pub struct BoundForeignKey {
    pub source_columns: Vec<String>,
    pub sink_table: String,
    pub sink_table_oid: TableOid,
    pub sink_columns: Vec<String>,
}

/// Bound CREATE INDEX statement
#[derive(Debug, Clone)]
pub struct BoundCreateIndex {
    pub name: String,
    pub database: String,
    pub table: String,
    pub table_oid: TableOid,
    pub unique: bool,
    pub attributes: Vec<BoundIndexAttribute>,
}

/// One indexed attribute: a bare column or an expression
#[derive(Debug, Clone)]
pub enum BoundIndexAttribute {
    Column(String),
    Expression(BoundExpression),
}

/// Bound CREATE TRIGGER statement
#[derive(Debug, Clone)]
pub struct BoundCreateTrigger {
    pub name: String,
    pub database: String,
    pub table: String,
    pub when: Option<BoundExpression>,
}

/// Bound CREATE VIEW statement
#[derive(Debug, Clone)]
pub struct BoundCreateView {
    pub database: String,
    pub name: String,
    pub query: Box<BoundSelect>,
}

/// Bound CREATE SCHEMA statement
#[derive(Debug, Clone)]
pub struct BoundCreateSchema {
    pub name: String,
    pub if_not_exists: bool,
}

/// Bound CREATE FUNCTION statement; the body is opaque to the binder
#[derive(Debug, Clone)]
pub struct BoundCreateFunction {
    pub name: String,
}

/// Bound DROP statement
#[derive(Debug, Clone)]
pub struct BoundDrop {
    pub object_type: DropObjectType,
    pub name: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropObjectType {
    Database,
    Table,
    Index,
    Schema,
    View,
    Trigger,
    PreparedStatement,
}

/// Bound ANALYZE statement; the table reference carries the defaulted
/// database name
#[derive(Debug, Clone)]
pub struct BoundAnalyze {
    pub database: String,
    pub table: String,
}

/// Bound PREPARE statement
#[derive(Debug, Clone)]
pub struct BoundPrepare {
    pub name: String,
}

/// Bound EXECUTE statement
#[derive(Debug, Clone)]
pub struct BoundExecute {
    pub name: String,
}

/// Transaction control statements pass through the binder untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Begin,
    Commit,
    Rollback,
}
