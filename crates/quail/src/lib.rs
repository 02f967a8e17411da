//! Quail - the semantic front end of a SQL database
//!
//! Quail parses SQL text and binds it against a catalog: every name is
//! resolved to a stable catalog identifier, statement structure is
//! validated, and each expression is annotated with its return type, scope
//! depth, subquery presence and display name. The bound tree is what a
//! planner consumes; planning and execution live elsewhere.
//!
//! # Example
//!
//! ```rust
//! use quail::{Session, ValueType};
//!
//! let session = Session::new("main");
//! session
//!     .catalog()
//!     .create_table("main", "users", vec![("id".to_string(), ValueType::Integer)])
//!     .unwrap();
//!
//! let bound = session.bind_sql("SELECT id FROM users").unwrap();
//! assert_eq!(bound.len(), 1);
//! ```

pub use quail_binder as binder;
pub use quail_catalog as catalog;
pub use quail_common as common;

pub use quail_binder::{Binder, BoundStatement};
pub use quail_catalog::Catalog;
pub use quail_common::{Error, Result, Value, ValueType};
pub use sqlparser::ast::Statement;

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use std::sync::Arc;

/// Parse SQL text into parse trees, in the PostgreSQL dialect this front
/// end speaks (which also covers trigger definition syntax). The trees are
/// what `Binder::bind` consumes.
pub fn parse_sql(sql: &str) -> Result<Vec<Statement>> {
    Parser::parse_sql(&PostgreSqlDialect {}, sql).map_err(|e| Error::Parse(e.to_string()))
}

/// A binding session: a catalog plus the default database applied to
/// unqualified table references.
pub struct Session {
    catalog: Arc<Catalog>,
    default_database: String,
}

impl Session {
    /// Create a session with a fresh catalog; the default database is
    /// created in it.
    pub fn new(default_database: impl Into<String>) -> Self {
        let default_database = default_database.into();
        let catalog = Arc::new(Catalog::new());
        catalog
            .create_database(&default_database)
            .expect("fresh catalog cannot already contain the default database");
        Session {
            catalog,
            default_database,
        }
    }

    /// Create a session over an existing catalog
    pub fn with_catalog(catalog: Arc<Catalog>, default_database: impl Into<String>) -> Self {
        Session {
            catalog,
            default_database: default_database.into(),
        }
    }

    /// Get the catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Parse and bind every statement in `sql`
    pub fn bind_sql(&self, sql: &str) -> Result<Vec<BoundStatement>> {
        let statements = parse_sql(sql)?;
        let mut bound = Vec::with_capacity(statements.len());
        for statement in &statements {
            let mut binder = Binder::new(self.catalog.clone(), self.default_database.clone());
            bound.push(binder.bind(statement)?);
        }
        Ok(bound)
    }
}
