//! Scope frames and name resolution
//!
//! A `BinderContext` is one frame of the lexical scope stack: the tables
//! visible at one level of query nesting, plus a link to the enclosing
//! frame. The link makes correlated subqueries work: a reference that does
//! not resolve in the innermost frame is retried against each enclosing
//! frame in turn.
//!
//! Frames are owned by the binding call that pushed them; the parent link
//! is an owned `Box`, so popping a frame hands back the enclosing one and
//! a dropped stack releases frames in reverse-push order.

use super::bound_expression::{BoundExpression, BoundExpressionKind};
use quail_catalog::{Catalog, ColumnOid, DatabaseOid, Schema, TableOid};
use quail_common::{Error, Result, ValueType};

/// A regular (catalog-backed) table visible in a frame
#[derive(Debug, Clone)]
pub struct RegularTableBinding {
    /// Alias the table is visible under; defaults to the table name
    pub alias: String,
    pub database: String,
    pub db_oid: DatabaseOid,
    pub table_oid: TableOid,
    pub schema: Schema,
}

/// A virtual table derived from a bound subselect
#[derive(Debug, Clone)]
pub struct NestedTableBinding {
    pub alias: String,
    /// Projected columns in output order
    pub columns: Vec<(String, ValueType)>,
}

/// The table being declared by an in-progress CREATE TABLE, so that
/// per-column DEFAULT and CHECK expressions can reference sibling columns
#[derive(Debug, Clone)]
pub struct NewTableBinding {
    pub name: String,
    pub columns: Vec<(String, ValueType)>,
}

/// Outcome of resolving a column reference
#[derive(Debug, Clone)]
pub enum ResolvedColumn {
    /// Resolved against a catalog-backed table
    Base {
        database_oid: DatabaseOid,
        table_oid: TableOid,
        column_oid: ColumnOid,
        table_alias: String,
        column_name: String,
        value_type: ValueType,
        depth: u32,
    },
    /// Resolved against a nested or in-progress table
    Derived {
        table_alias: String,
        column_name: String,
        column_index: usize,
        value_type: ValueType,
        depth: u32,
    },
}

impl ResolvedColumn {
    /// Turn the resolution into a column-reference expression node
    pub fn into_expression(self) -> BoundExpression {
        match self {
            ResolvedColumn::Base {
                database_oid,
                table_oid,
                column_oid,
                table_alias,
                column_name,
                value_type,
                depth,
            } => BoundExpression::leaf(
                BoundExpressionKind::ColumnValue {
                    database_oid,
                    table_oid,
                    column_oid,
                    table_name: table_alias,
                    column_name: column_name.clone(),
                },
                value_type,
                column_name,
                depth,
            ),
            ResolvedColumn::Derived {
                table_alias,
                column_name,
                column_index,
                value_type,
                depth,
            } => BoundExpression::leaf(
                BoundExpressionKind::DerivedColumn {
                    table_alias,
                    column_name: column_name.clone(),
                    column_index,
                },
                value_type,
                column_name,
                depth,
            ),
        }
    }
}

/// One frame of the scope stack
#[derive(Debug)]
pub struct BinderContext {
    /// Regular tables in insertion order
    regular: Vec<RegularTableBinding>,
    /// Subselect-derived tables in insertion order
    nested: Vec<NestedTableBinding>,
    /// Tables declared by an in-progress CREATE TABLE
    new_tables: Vec<NewTableBinding>,
    parent: Option<Box<BinderContext>>,
    depth: u32,
}

impl BinderContext {
    pub fn new(parent: Option<Box<BinderContext>>) -> Self {
        let depth = parent.as_ref().map(|p| p.depth + 1).unwrap_or(0);
        BinderContext {
            regular: Vec::new(),
            nested: Vec::new(),
            new_tables: Vec::new(),
            parent,
            depth,
        }
    }

    /// Hand back the enclosing frame, consuming this one
    pub fn into_parent(self) -> Option<Box<BinderContext>> {
        self.parent
    }

    pub fn parent(&self) -> Option<&BinderContext> {
        self.parent.as_deref()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Install a catalog-backed table under `alias`
    pub fn add_regular_table(
        &mut self,
        catalog: &Catalog,
        database: &str,
        table_name: &str,
        alias: &str,
    ) -> Result<()> {
        if self
            .regular
            .iter()
            .any(|b| b.alias.eq_ignore_ascii_case(alias))
        {
            return Err(Error::DuplicateAlias(alias.to_string()));
        }
        let db_oid = catalog.get_database_oid(database);
        if !db_oid.is_valid() {
            return Err(Error::DatabaseNotFound(database.to_string()));
        }
        let table_oid = catalog.get_table_oid(table_name);
        if !table_oid.is_valid() {
            return Err(Error::TableNotFound(table_name.to_string()));
        }
        let schema = catalog
            .get_schema(table_oid)
            .ok_or_else(|| Error::Internal(format!("table {} has no schema", table_name)))?;
        self.regular.push(RegularTableBinding {
            alias: alias.to_string(),
            database: database.to_string(),
            db_oid,
            table_oid,
            schema,
        });
        Ok(())
    }

    /// Install a subselect-derived table under its mandatory alias
    pub fn add_nested_table(&mut self, alias: &str, columns: Vec<(String, ValueType)>) {
        self.nested.push(NestedTableBinding {
            alias: alias.to_string(),
            columns,
        });
    }

    /// Install the table being declared by a CREATE TABLE
    pub fn add_new_table(&mut self, name: &str, columns: Vec<(String, ValueType)>) {
        self.new_tables.push(NewTableBinding {
            name: name.to_string(),
            columns,
        });
    }

    /// Whether this frame has at least one regular table; `*` is only
    /// legal when it does
    pub fn has_regular_tables(&self) -> bool {
        !self.regular.is_empty()
    }

    /// Resolve an unqualified column reference, innermost frame first.
    ///
    /// Within a frame, regular tables are tried in insertion order and two
    /// matches in the same frame are ambiguous; nested tables and then the
    /// in-progress CREATE TABLE are consulted only when no regular table
    /// matched. A match in an inner frame shadows any outer match.
    pub fn resolve_unqualified(&self, column: &str) -> Result<ResolvedColumn> {
        let mut frame = Some(self);
        while let Some(ctx) = frame {
            let mut found: Option<ResolvedColumn> = None;
            for binding in &ctx.regular {
                if let Some(col) = binding.schema.get_column(column) {
                    if found.is_some() {
                        return Err(Error::AmbiguousColumn(column.to_string()));
                    }
                    found = Some(ResolvedColumn::Base {
                        database_oid: binding.db_oid,
                        table_oid: binding.table_oid,
                        column_oid: col.oid,
                        table_alias: binding.alias.clone(),
                        column_name: col.name.clone(),
                        value_type: col.value_type,
                        depth: ctx.depth,
                    });
                }
            }
            if let Some(resolved) = found {
                return Ok(resolved);
            }

            for binding in &ctx.nested {
                if let Some(resolved) = ctx.find_nested_column(binding, column) {
                    return Ok(resolved);
                }
            }

            for binding in &ctx.new_tables {
                if let Some((index, (name, value_type))) = binding
                    .columns
                    .iter()
                    .enumerate()
                    .find(|(_, (name, _))| name.eq_ignore_ascii_case(column))
                {
                    return Ok(ResolvedColumn::Derived {
                        table_alias: binding.name.clone(),
                        column_name: name.clone(),
                        column_index: index,
                        value_type: *value_type,
                        depth: ctx.depth,
                    });
                }
            }

            frame = ctx.parent.as_deref();
        }
        Err(Error::ColumnNotFound(column.to_string()))
    }

    /// Resolve a table-qualified column reference.
    ///
    /// Regular bindings win over nested bindings with the same alias:
    /// nested tables are consulted only after regular lookup has failed at
    /// every frame. Within the chosen binding the column must exist.
    pub fn resolve_qualified(&self, table: &str, column: &str) -> Result<ResolvedColumn> {
        let mut frame = Some(self);
        while let Some(ctx) = frame {
            if let Some(binding) = ctx
                .regular
                .iter()
                .find(|b| b.alias.eq_ignore_ascii_case(table))
            {
                let col = binding
                    .schema
                    .get_column(column)
                    .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;
                return Ok(ResolvedColumn::Base {
                    database_oid: binding.db_oid,
                    table_oid: binding.table_oid,
                    column_oid: col.oid,
                    table_alias: binding.alias.clone(),
                    column_name: col.name.clone(),
                    value_type: col.value_type,
                    depth: ctx.depth,
                });
            }
            frame = ctx.parent.as_deref();
        }

        let mut frame = Some(self);
        while let Some(ctx) = frame {
            if let Some(binding) = ctx
                .nested
                .iter()
                .find(|b| b.alias.eq_ignore_ascii_case(table))
            {
                return ctx
                    .find_nested_column(binding, column)
                    .ok_or_else(|| Error::ColumnNotFound(column.to_string()));
            }
            if let Some(binding) = ctx
                .new_tables
                .iter()
                .find(|b| b.name.eq_ignore_ascii_case(table))
            {
                let (index, (name, value_type)) = binding
                    .columns
                    .iter()
                    .enumerate()
                    .find(|(_, (name, _))| name.eq_ignore_ascii_case(column))
                    .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;
                return Ok(ResolvedColumn::Derived {
                    table_alias: binding.name.clone(),
                    column_name: name.clone(),
                    column_index: index,
                    value_type: *value_type,
                    depth: ctx.depth,
                });
            }
            frame = ctx.parent.as_deref();
        }
        Err(Error::InvalidTableReference(table.to_string()))
    }

    fn find_nested_column(
        &self,
        binding: &NestedTableBinding,
        column: &str,
    ) -> Option<ResolvedColumn> {
        binding
            .columns
            .iter()
            .enumerate()
            .find(|(_, (name, _))| name.eq_ignore_ascii_case(column))
            .map(|(index, (name, value_type))| ResolvedColumn::Derived {
                table_alias: binding.alias.clone(),
                column_name: name.clone(),
                column_index: index,
                value_type: *value_type,
                depth: self.depth,
            })
    }

    /// The ordered projection of every column of every regular table in
    /// this frame: binding insertion order, then schema column order.
    /// This is what `*` and COPY expand to.
    pub fn generate_all_column_expressions(&self) -> Vec<BoundExpression> {
        let mut expressions = Vec::new();
        for binding in &self.regular {
            for col in binding.schema.columns() {
                expressions.push(BoundExpression::leaf(
                    BoundExpressionKind::ColumnValue {
                        database_oid: binding.db_oid,
                        table_oid: binding.table_oid,
                        column_oid: col.oid,
                        table_name: binding.alias.clone(),
                        column_name: col.name.clone(),
                    },
                    col.value_type,
                    col.name.clone(),
                    self.depth,
                ));
            }
        }
        expressions
    }

    /// Expand `alias.*`: every column of the named binding in this frame
    pub fn expand_table_columns(&self, table: &str) -> Result<Vec<BoundExpression>> {
        if let Some(binding) = self
            .regular
            .iter()
            .find(|b| b.alias.eq_ignore_ascii_case(table))
        {
            return Ok(binding
                .schema
                .columns()
                .iter()
                .map(|col| {
                    BoundExpression::leaf(
                        BoundExpressionKind::ColumnValue {
                            database_oid: binding.db_oid,
                            table_oid: binding.table_oid,
                            column_oid: col.oid,
                            table_name: binding.alias.clone(),
                            column_name: col.name.clone(),
                        },
                        col.value_type,
                        col.name.clone(),
                        self.depth,
                    )
                })
                .collect());
        }
        if let Some(binding) = self
            .nested
            .iter()
            .find(|b| b.alias.eq_ignore_ascii_case(table))
        {
            return Ok(binding
                .columns
                .iter()
                .enumerate()
                .map(|(index, (name, value_type))| {
                    BoundExpression::leaf(
                        BoundExpressionKind::DerivedColumn {
                            table_alias: binding.alias.clone(),
                            column_name: name.clone(),
                            column_index: index,
                        },
                        *value_type,
                        name.clone(),
                        self.depth,
                    )
                })
                .collect());
        }
        Err(Error::InvalidTableReference(table.to_string()))
    }
}
