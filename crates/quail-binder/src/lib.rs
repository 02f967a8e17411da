//! Quail Binder - Semantic analysis and name binding
//!
//! The binder takes a parsed SQL statement and resolves:
//! - Table and column references, against the catalog and a stack of
//!   lexical scope frames (one per query nesting level)
//! - Statement structure: insert arity, foreign keys, index attributes
//! - Expression annotations: return type, scope depth, subquery presence
//!   and display name
//!
//! The result is an annotated `BoundStatement` tree ready for planning.

mod binder_context;
mod bound_expression;
mod bound_statement;
mod coercion;
mod expression_binder;
mod statement_binder;

#[cfg(test)]
mod tests;

pub use binder_context::{
    BinderContext, NestedTableBinding, NewTableBinding, RegularTableBinding, ResolvedColumn,
};
pub use bound_expression::*;
pub use bound_statement::*;
pub use coercion::coerce;

use quail_catalog::Catalog;
use quail_common::{Error, Result};
use sqlparser::ast as sql;
use std::sync::Arc;

/// The binder. One instance binds one statement at a time; the scope-frame
/// stack lives here for the duration of a `bind` call and is empty between
/// calls, successful or not.
pub struct Binder {
    catalog: Arc<Catalog>,
    /// Database applied to table references that do not name one
    default_database: String,
    /// Innermost scope frame, linked to its ancestors
    context: Option<Box<BinderContext>>,
}

impl Binder {
    pub fn new(catalog: Arc<Catalog>, default_database: impl Into<String>) -> Self {
        Binder {
            catalog,
            default_database: default_database.into(),
            context: None,
        }
    }

    /// Bind a parsed statement
    pub fn bind(&mut self, statement: &sql::Statement) -> Result<BoundStatement> {
        let result = statement_binder::bind_statement(self, statement);
        if result.is_err() {
            // Binding functions pop their own frames on the way out; a
            // failure must still never leave the stack non-empty.
            self.context = None;
        }
        debug_assert_eq!(self.frame_count(), 0);
        result
    }

    /// Get the catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub(crate) fn catalog_arc(&self) -> Arc<Catalog> {
        self.catalog.clone()
    }

    /// Get the default database name
    pub fn default_database(&self) -> &str {
        &self.default_database
    }

    /// Number of frames currently on the scope stack
    pub fn frame_count(&self) -> usize {
        let mut count = 0;
        let mut frame = self.context.as_deref();
        while let Some(ctx) = frame {
            count += 1;
            frame = ctx.parent();
        }
        count
    }

    pub(crate) fn push_frame(&mut self) {
        let parent = self.context.take();
        self.context = Some(Box::new(BinderContext::new(parent)));
    }

    pub(crate) fn pop_frame(&mut self) {
        if let Some(ctx) = self.context.take() {
            self.context = ctx.into_parent();
        }
    }

    pub(crate) fn context(&self) -> Option<&BinderContext> {
        self.context.as_deref()
    }

    pub(crate) fn active_context(&self) -> Result<&BinderContext> {
        self.context
            .as_deref()
            .ok_or_else(|| Error::Internal("no active scope frame".to_string()))
    }

    pub(crate) fn active_context_mut(&mut self) -> Result<&mut BinderContext> {
        self.context
            .as_deref_mut()
            .ok_or_else(|| Error::Internal("no active scope frame".to_string()))
    }
}
