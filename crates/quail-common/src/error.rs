//! Error types for Quail

use thiserror::Error;

/// The main error type for Quail operations
#[derive(Error, Debug)]
pub enum Error {
    // Parser errors
    #[error("Parse error: {0}")]
    Parse(String),

    // Catalog lookups
    #[error("Database {0} does not exist")]
    DatabaseNotFound(String),

    #[error("Accessing non-existing table {0}")]
    TableNotFound(String),

    #[error("Cannot find column {0}")]
    ColumnNotFound(String),

    #[error("Index {0} does not exist")]
    IndexNotFound(String),

    // CREATE collisions
    #[error("Database name {0} already exists")]
    DatabaseAlreadyExists(String),

    #[error("Table name {0} already exists")]
    TableAlreadyExists(String),

    #[error("Index {0} already exists")]
    IndexAlreadyExists(String),

    // Scope and reference errors
    #[error("Ambiguous column reference {0}")]
    AmbiguousColumn(String),

    #[error("Alias not found for query derived table")]
    MissingAlias,

    #[error("Duplicate alias {0}")]
    DuplicateAlias(String),

    #[error("Invalid table reference {0}")]
    InvalidTableReference(String),

    #[error("Invalid use of * with no tables in scope")]
    InvalidStar,

    // Arity errors
    #[error("Mismatch in number of insert columns and number of insert values")]
    InsertArityMismatch,

    #[error("Number of columns in foreign key does not match number of referenced columns")]
    ForeignKeyArityMismatch,

    // Foreign key resolution
    #[error("Foreign key referencing non-existing table {0}")]
    ForeignKeyTableNotFound(String),

    #[error("Foreign key referencing non-existing column {0}")]
    ForeignKeyColumnNotFound(String),

    #[error("Cannot find column {0} in foreign key source")]
    ForeignKeySourceColumnNotFound(String),

    // Type errors
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    // General errors
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using Quail's Error
pub type Result<T> = std::result::Result<T, Error>;
