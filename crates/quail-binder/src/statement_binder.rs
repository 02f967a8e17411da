//! Statement binding
//!
//! One binding function per statement kind. Every function that opens a
//! scope frame does so through `with_frame`, which pops the frame on both
//! the success and the error path, so the stack is always unwound exactly
//! to where it was on entry.

use super::coercion;
use super::expression_binder::{bind_data_type, bind_expression};
use super::{
    Binder, BoundAnalyze, BoundAssignment, BoundColumnDef, BoundCopy, BoundCreateDatabase,
    BoundCreateFunction, BoundCreateIndex, BoundCreateSchema, BoundCreateTable,
    BoundCreateTrigger, BoundCreateView, BoundDelete, BoundDrop, BoundExecute,
    BoundExpressionKind, BoundForeignKey, BoundIndexAttribute, BoundInsert, BoundJoinType,
    BoundOrderBy, BoundPrepare, BoundSelect, BoundStatement, BoundTableRef, BoundUpdate,
    DropObjectType, TransactionKind,
};
use quail_catalog::Catalog;
use quail_common::{Error, Result};
use sqlparser::ast as sql;
use tracing::{debug, trace};

/// Run `f` inside a fresh scope frame. The frame is popped whether `f`
/// succeeds or fails.
fn with_frame<T>(binder: &mut Binder, f: impl FnOnce(&mut Binder) -> Result<T>) -> Result<T> {
    binder.push_frame();
    let result = f(binder);
    binder.pop_frame();
    result
}

/// Bind a statement
pub(crate) fn bind_statement(
    binder: &mut Binder,
    stmt: &sql::Statement,
) -> Result<BoundStatement> {
    match stmt {
        sql::Statement::Query(query) => {
            trace!("binding SELECT statement");
            let select = bind_select_statement(binder, query)?;
            Ok(BoundStatement::Select(select))
        }

        sql::Statement::Insert(insert) => {
            trace!("binding INSERT statement");
            let bound = with_frame(binder, |b| bind_insert(b, insert))?;
            Ok(BoundStatement::Insert(bound))
        }

        sql::Statement::Update {
            table,
            assignments,
            selection,
            ..
        } => {
            trace!("binding UPDATE statement");
            let bound = with_frame(binder, |b| bind_update(b, table, assignments, selection))?;
            Ok(BoundStatement::Update(bound))
        }

        sql::Statement::Delete(delete) => {
            trace!("binding DELETE statement");
            let bound = with_frame(binder, |b| bind_delete(b, delete))?;
            Ok(BoundStatement::Delete(bound))
        }

        sql::Statement::Copy { source, to, .. } => {
            trace!("binding COPY statement");
            let bound = with_frame(binder, |b| bind_copy(b, source, *to))?;
            Ok(BoundStatement::Copy(bound))
        }

        sql::Statement::CreateDatabase { db_name, .. } => {
            trace!("binding CREATE DATABASE statement");
            let name = last_name_part(db_name);
            if binder.catalog().get_database_oid(&name).is_valid() {
                return Err(Error::DatabaseAlreadyExists(name));
            }
            Ok(BoundStatement::CreateDatabase(BoundCreateDatabase { name }))
        }

        sql::Statement::CreateTable(create) => {
            trace!("binding CREATE TABLE statement");
            let bound = with_frame(binder, |b| bind_create_table(b, create))?;
            Ok(BoundStatement::CreateTable(bound))
        }

        sql::Statement::CreateIndex(create) => {
            trace!("binding CREATE INDEX statement");
            let bound = with_frame(binder, |b| bind_create_index(b, create))?;
            Ok(BoundStatement::CreateIndex(bound))
        }

        sql::Statement::CreateTrigger {
            name,
            table_name,
            condition,
            ..
        } => {
            trace!("binding CREATE TRIGGER statement");
            let bound = with_frame(binder, |b| bind_create_trigger(b, name, table_name, condition))?;
            Ok(BoundStatement::CreateTrigger(bound))
        }

        sql::Statement::CreateView { name, query, .. } => {
            trace!("binding CREATE VIEW statement");
            let (database, view_name) = split_object_name(binder, name);
            let bound_query = bind_select_statement(binder, query)?;
            Ok(BoundStatement::CreateView(BoundCreateView {
                database,
                name: view_name,
                query: Box::new(bound_query),
            }))
        }

        sql::Statement::CreateSchema {
            schema_name,
            if_not_exists,
            ..
        } => {
            trace!("binding CREATE SCHEMA statement");
            Ok(BoundStatement::CreateSchema(BoundCreateSchema {
                name: schema_name.to_string(),
                if_not_exists: *if_not_exists,
            }))
        }

        sql::Statement::CreateFunction(create_function) => {
            trace!("binding CREATE FUNCTION statement");
            Ok(BoundStatement::CreateFunction(BoundCreateFunction {
                name: last_name_part(&create_function.name),
            }))
        }

        sql::Statement::Drop {
            object_type,
            names,
            if_exists,
            ..
        } => {
            trace!("binding DROP statement");
            bind_drop(binder, object_type, names, *if_exists)
        }

        sql::Statement::DropTrigger { trigger_name, if_exists, .. } => {
            trace!("binding DROP TRIGGER statement");
            Ok(BoundStatement::Drop(BoundDrop {
                object_type: DropObjectType::Trigger,
                name: last_name_part(trigger_name),
                if_exists: *if_exists,
            }))
        }

        sql::Statement::Deallocate { name, .. } => {
            trace!("binding DEALLOCATE statement");
            Ok(BoundStatement::Drop(BoundDrop {
                object_type: DropObjectType::PreparedStatement,
                name: name.to_string(),
                if_exists: false,
            }))
        }

        sql::Statement::Analyze { table_name, .. } => {
            trace!("binding ANALYZE statement");
            let (database, table) = split_object_name(binder, table_name);
            Ok(BoundStatement::Analyze(BoundAnalyze { database, table }))
        }

        sql::Statement::Prepare { name, .. } => {
            trace!("binding PREPARE statement");
            Ok(BoundStatement::Prepare(BoundPrepare {
                name: name.to_string(),
            }))
        }

        sql::Statement::Execute { name, .. } => {
            trace!("binding EXECUTE statement");
            Ok(BoundStatement::Execute(BoundExecute {
                name: name.to_string(),
            }))
        }

        sql::Statement::StartTransaction { .. } => {
            Ok(BoundStatement::Transaction(TransactionKind::Begin))
        }
        sql::Statement::Commit { .. } => Ok(BoundStatement::Transaction(TransactionKind::Commit)),
        sql::Statement::Rollback { .. } => {
            Ok(BoundStatement::Transaction(TransactionKind::Rollback))
        }

        other => Err(Error::NotImplemented(format!("statement: {:?}", other))),
    }
}

/// Split a possibly qualified object name into (database, object),
/// applying the default database when unspecified
fn split_object_name(binder: &Binder, name: &sql::ObjectName) -> (String, String) {
    let parts: Vec<_> = name.0.iter().map(|i| i.value.clone()).collect();
    match parts.len() {
        0 => (binder.default_database().to_string(), String::new()),
        1 => (binder.default_database().to_string(), parts[0].clone()),
        n => (parts[n - 2].clone(), parts[n - 1].clone()),
    }
}

fn last_name_part(name: &sql::ObjectName) -> String {
    name.0.last().map(|i| i.value.clone()).unwrap_or_default()
}

/// Bind a query inside its own scope frame. Also the entry point for
/// subqueries reached from expressions; the frame's parent link is what
/// lets correlated references escape to the enclosing query.
pub(crate) fn bind_subquery(binder: &mut Binder, query: &sql::Query) -> Result<BoundSelect> {
    bind_select_statement(binder, query)
}

pub(crate) fn bind_select_statement(
    binder: &mut Binder,
    query: &sql::Query,
) -> Result<BoundSelect> {
    with_frame(binder, |b| bind_query(b, query))
}

fn bind_query(binder: &mut Binder, query: &sql::Query) -> Result<BoundSelect> {
    if query.with.is_some() {
        return Err(Error::NotImplemented("WITH clause".to_string()));
    }

    let select = match query.body.as_ref() {
        sql::SetExpr::Select(select) => select,
        sql::SetExpr::Query(inner) => return bind_query(binder, inner),
        other => return Err(Error::NotImplemented(format!("query body: {:?}", other))),
    };

    // FROM first: it populates the frame everything else resolves against
    let from = bind_from(binder, &select.from)?;

    let where_clause = select
        .selection
        .as_ref()
        .map(|e| bind_expression(binder, e))
        .transpose()?;

    let mut order_by = Vec::new();
    if let Some(ob) = &query.order_by {
        for order in &ob.exprs {
            order_by.push(BoundOrderBy {
                expr: bind_expression(binder, &order.expr)?,
                ascending: order.asc.unwrap_or(true),
                nulls_first: order.nulls_first.unwrap_or(false),
            });
        }
    }

    let limit = match &query.limit {
        Some(sql::Expr::Value(sql::Value::Number(n, _))) => Some(
            n.parse()
                .map_err(|_| Error::Parse("Invalid LIMIT".to_string()))?,
        ),
        Some(other) => {
            return Err(Error::NotImplemented(format!("LIMIT {:?}", other)));
        }
        None => None,
    };

    let offset = match &query.offset {
        Some(offset) => match &offset.value {
            sql::Expr::Value(sql::Value::Number(n, _)) => Some(
                n.parse()
                    .map_err(|_| Error::Parse("Invalid OFFSET".to_string()))?,
            ),
            other => return Err(Error::NotImplemented(format!("OFFSET {:?}", other))),
        },
        None => None,
    };

    let mut group_by = Vec::new();
    match &select.group_by {
        sql::GroupByExpr::All(_) => {
            return Err(Error::NotImplemented("GROUP BY ALL".to_string()));
        }
        sql::GroupByExpr::Expressions(exprs, _) => {
            for expr in exprs {
                group_by.push(bind_expression(binder, expr)?);
            }
        }
    }

    let having = select
        .having
        .as_ref()
        .map(|e| bind_expression(binder, e))
        .transpose()?;

    // Expand the select list last, once every table is in scope
    let mut select_list = Vec::new();
    for item in &select.projection {
        match item {
            sql::SelectItem::Wildcard(_) => {
                let ctx = binder.active_context()?;
                if !ctx.has_regular_tables() {
                    return Err(Error::InvalidStar);
                }
                select_list.extend(ctx.generate_all_column_expressions());
            }
            sql::SelectItem::QualifiedWildcard(name, _) => {
                let target = last_name_part(name);
                let ctx = binder.active_context()?;
                select_list.extend(ctx.expand_table_columns(&target)?);
            }
            sql::SelectItem::UnnamedExpr(expr) => {
                select_list.push(bind_expression(binder, expr)?);
            }
            sql::SelectItem::ExprWithAlias { expr, alias } => {
                select_list.push(bind_expression(binder, expr)?.with_alias(alias.value.clone()));
            }
        }
    }

    let depth = binder.active_context()?.depth();
    Ok(BoundSelect {
        select_list,
        from,
        where_clause,
        group_by,
        having,
        order_by,
        limit,
        offset,
        depth,
    })
}

/// Bind FROM clause
fn bind_from(binder: &mut Binder, from: &[sql::TableWithJoins]) -> Result<Vec<BoundTableRef>> {
    let mut refs = Vec::new();
    for table_with_joins in from {
        refs.push(bind_table_with_joins(binder, table_with_joins)?);
    }
    Ok(refs)
}

fn bind_table_with_joins(
    binder: &mut Binder,
    table_with_joins: &sql::TableWithJoins,
) -> Result<BoundTableRef> {
    let mut current = bind_table_factor(binder, &table_with_joins.relation)?;
    for join in &table_with_joins.joins {
        let right = bind_table_factor(binder, &join.relation)?;
        let (join_type, constraint) = match &join.join_operator {
            sql::JoinOperator::Inner(c) => (BoundJoinType::Inner, Some(c)),
            sql::JoinOperator::LeftOuter(c) => (BoundJoinType::Left, Some(c)),
            sql::JoinOperator::RightOuter(c) => (BoundJoinType::Right, Some(c)),
            sql::JoinOperator::FullOuter(c) => (BoundJoinType::Full, Some(c)),
            sql::JoinOperator::CrossJoin => (BoundJoinType::Cross, None),
            other => {
                return Err(Error::NotImplemented(format!("join operator: {:?}", other)));
            }
        };
        // Both sides are installed in the frame by now, so the condition
        // binds in the combined scope
        let condition = match constraint {
            Some(sql::JoinConstraint::On(expr)) => Some(bind_expression(binder, expr)?),
            Some(sql::JoinConstraint::None) | None => None,
            Some(other) => {
                return Err(Error::NotImplemented(format!(
                    "join constraint: {:?}",
                    other
                )));
            }
        };
        current = BoundTableRef::Join {
            left: Box::new(current),
            right: Box::new(right),
            join_type,
            condition,
        };
    }
    Ok(current)
}

/// Bind a table factor, installing its binding in the current frame
fn bind_table_factor(binder: &mut Binder, factor: &sql::TableFactor) -> Result<BoundTableRef> {
    match factor {
        sql::TableFactor::Table { name, alias, .. } => {
            let (database, table_name) = split_object_name(binder, name);
            let catalog = binder.catalog_arc();
            let table_oid = catalog.get_table_oid(&table_name);
            if !table_oid.is_valid() {
                return Err(Error::TableNotFound(table_name));
            }
            let alias_name = alias
                .as_ref()
                .map(|a| a.name.value.clone())
                .unwrap_or_else(|| table_name.clone());
            binder
                .active_context_mut()?
                .add_regular_table(&catalog, &database, &table_name, &alias_name)?;

            let db_oid = catalog.get_database_oid(&database);
            let schema = catalog
                .get_schema(table_oid)
                .ok_or_else(|| Error::Internal(format!("table {} has no schema", table_name)))?;
            Ok(BoundTableRef::BaseTable {
                database,
                db_oid,
                table_oid,
                name: table_name,
                alias: alias.as_ref().map(|a| a.name.value.clone()),
                schema,
            })
        }

        sql::TableFactor::Derived {
            subquery, alias, ..
        } => {
            let alias = alias.as_ref().ok_or(Error::MissingAlias)?;
            let alias_name = alias.name.value.clone();
            // The subselect binds in its own frame stack; the enclosing
            // frame is current again once it returns
            let bound = bind_subquery(binder, subquery)?;
            let columns = bound.output_columns();
            binder
                .active_context_mut()?
                .add_nested_table(&alias_name, columns);
            Ok(BoundTableRef::Derived {
                subquery: Box::new(bound),
                alias: alias_name,
            })
        }

        sql::TableFactor::NestedJoin {
            table_with_joins, ..
        } => bind_table_with_joins(binder, table_with_joins),

        other => Err(Error::NotImplemented(format!("table factor: {:?}", other))),
    }
}

/// Bind INSERT
fn bind_insert(binder: &mut Binder, insert: &sql::Insert) -> Result<BoundInsert> {
    let (database, table) = split_object_name(binder, &insert.table_name);
    let catalog = binder.catalog_arc();
    let table_oid = catalog.get_table_oid(&table);
    if !table_oid.is_valid() {
        return Err(Error::TableNotFound(table));
    }
    binder
        .active_context_mut()?
        .add_regular_table(&catalog, &database, &table, &table)?;
    let schema = catalog
        .get_schema(table_oid)
        .ok_or_else(|| Error::Internal(format!("table {} has no schema", table)))?;

    let columns: Vec<String> = insert.columns.iter().map(|c| c.value.clone()).collect();

    let source = insert
        .source
        .as_ref()
        .ok_or_else(|| Error::NotImplemented("INSERT without a source".to_string()))?;

    match source.body.as_ref() {
        sql::SetExpr::Select(_) | sql::SetExpr::Query(_) => {
            let bound = bind_select_statement(binder, source)?;
            Ok(BoundInsert {
                database,
                table,
                table_oid,
                columns,
                values: Vec::new(),
                source: Some(Box::new(bound)),
            })
        }
        sql::SetExpr::Values(values) => {
            // Every named insert column must exist in the table schema
            for col in &columns {
                if !schema.contains_column(col) {
                    return Err(Error::ColumnNotFound(col.clone()));
                }
            }

            let num_schema_columns = schema.column_count();
            let num_insert_columns = columns.len();
            let mut rows = Vec::new();
            for row in &values.rows {
                let insert_cols_ok = num_insert_columns != 0 && row.len() == num_insert_columns;
                let insert_schema_ok = num_insert_columns == 0 && row.len() == num_schema_columns;
                if !(insert_cols_ok || insert_schema_ok) {
                    return Err(Error::InsertArityMismatch);
                }

                let mut bound_row = Vec::new();
                for (i, cell) in row.iter().enumerate() {
                    let bound = bind_expression(binder, cell)?;
                    let target = if num_insert_columns != 0 {
                        schema.get_column(&columns[i])
                    } else {
                        schema.get_column_by_index(i)
                    }
                    .ok_or_else(|| Error::Internal("insert column out of range".to_string()))?;

                    let is_cast = matches!(bound.kind, BoundExpressionKind::Cast { .. });
                    if is_cast || bound.return_type != target.value_type {
                        debug!(column = %target.name, "coercing INSERT value");
                        bound_row.push(coercion::coerce(&bound, &target.value_type)?);
                    } else {
                        bound_row.push(bound);
                    }
                }
                rows.push(bound_row);
            }

            Ok(BoundInsert {
                database,
                table,
                table_oid,
                columns,
                values: rows,
                source: None,
            })
        }
        other => Err(Error::NotImplemented(format!("INSERT source: {:?}", other))),
    }
}

/// Bind UPDATE
fn bind_update(
    binder: &mut Binder,
    table: &sql::TableWithJoins,
    assignments: &[sql::Assignment],
    selection: &Option<sql::Expr>,
) -> Result<BoundUpdate> {
    let name = match &table.relation {
        sql::TableFactor::Table { name, .. } => name,
        other => {
            return Err(Error::NotImplemented(format!("UPDATE target: {:?}", other)));
        }
    };
    let (database, table_name) = split_object_name(binder, name);
    let catalog = binder.catalog_arc();
    let table_oid = catalog.get_table_oid(&table_name);
    if !table_oid.is_valid() {
        return Err(Error::TableNotFound(table_name));
    }
    binder
        .active_context_mut()?
        .add_regular_table(&catalog, &database, &table_name, &table_name)?;
    let schema = catalog
        .get_schema(table_oid)
        .ok_or_else(|| Error::Internal(format!("table {} has no schema", table_name)))?;

    let where_clause = selection
        .as_ref()
        .map(|e| bind_expression(binder, e))
        .transpose()?;

    // SET targets resolve against the target table only
    let mut bound_assignments = Vec::new();
    for assignment in assignments {
        let column = match &assignment.target {
            sql::AssignmentTarget::ColumnName(name) => last_name_part(name),
            sql::AssignmentTarget::Tuple(_) => {
                return Err(Error::NotImplemented("tuple assignment".to_string()));
            }
        };
        let column_oid = schema
            .get_column(&column)
            .ok_or_else(|| Error::ColumnNotFound(column.clone()))?
            .oid;
        let value = bind_expression(binder, &assignment.value)?;
        bound_assignments.push(BoundAssignment {
            column,
            column_oid,
            value,
        });
    }

    Ok(BoundUpdate {
        database,
        table: table_name,
        table_oid,
        assignments: bound_assignments,
        where_clause,
    })
}

/// Bind DELETE
fn bind_delete(binder: &mut Binder, delete: &sql::Delete) -> Result<BoundDelete> {
    let tables = match &delete.from {
        sql::FromTable::WithFromKeyword(tables) => tables,
        sql::FromTable::WithoutKeyword(tables) => tables,
    };
    let from = tables
        .first()
        .ok_or_else(|| Error::Parse("DELETE requires a table".to_string()))?;
    let name = match &from.relation {
        sql::TableFactor::Table { name, .. } => name,
        other => {
            return Err(Error::NotImplemented(format!("DELETE target: {:?}", other)));
        }
    };

    let (database, table) = split_object_name(binder, name);
    let catalog = binder.catalog_arc();
    let table_oid = catalog.get_table_oid(&table);
    if !table_oid.is_valid() {
        return Err(Error::TableNotFound(table));
    }
    binder
        .active_context_mut()?
        .add_regular_table(&catalog, &database, &table, &table)?;

    let where_clause = delete
        .selection
        .as_ref()
        .map(|e| bind_expression(binder, e))
        .transpose()?;

    Ok(BoundDelete {
        database,
        table,
        table_oid,
        where_clause,
    })
}

/// Bind COPY. The table form reads or writes every column, so the table's
/// full projection is expanded the same way `*` is.
fn bind_copy(binder: &mut Binder, source: &sql::CopySource, to: bool) -> Result<BoundCopy> {
    match source {
        sql::CopySource::Table { table_name, .. } => {
            let (database, table) = split_object_name(binder, table_name);
            let catalog = binder.catalog_arc();
            let table_oid = catalog.get_table_oid(&table);
            if !table_oid.is_valid() {
                return Err(Error::TableNotFound(table));
            }
            binder
                .active_context_mut()?
                .add_regular_table(&catalog, &database, &table, &table)?;
            let columns = binder.active_context()?.generate_all_column_expressions();
            Ok(BoundCopy {
                table: Some(table),
                columns,
                query: None,
                to,
            })
        }
        sql::CopySource::Query(query) => {
            let bound = bind_select_statement(binder, query)?;
            Ok(BoundCopy {
                table: None,
                columns: Vec::new(),
                query: Some(Box::new(bound)),
                to,
            })
        }
    }
}

/// Bind CREATE TABLE
fn bind_create_table(binder: &mut Binder, create: &sql::CreateTable) -> Result<BoundCreateTable> {
    if create.query.is_some() {
        return Err(Error::NotImplemented("CREATE TABLE AS".to_string()));
    }
    let (database, name) = split_object_name(binder, &create.name);
    let catalog = binder.catalog_arc();
    if catalog.get_table_oid(&name).is_valid() {
        return Err(Error::TableAlreadyExists(name));
    }

    let mut columns = Vec::new();
    for col in &create.columns {
        let value_type = bind_data_type(&col.data_type)?;
        let nullable = !col
            .options
            .iter()
            .any(|opt| matches!(opt.option, sql::ColumnOption::NotNull));
        columns.push(BoundColumnDef {
            name: col.name.value.clone(),
            value_type,
            nullable,
            default: None,
            check: None,
        });
    }

    // The table under declaration is visible to its own DEFAULT and CHECK
    // expressions, so sibling columns resolve
    let declared: Vec<_> = columns
        .iter()
        .map(|c| (c.name.clone(), c.value_type))
        .collect();
    binder.active_context_mut()?.add_new_table(&name, declared);

    for (i, col) in create.columns.iter().enumerate() {
        for opt in &col.options {
            match &opt.option {
                sql::ColumnOption::Default(expr) => {
                    columns[i].default = Some(bind_expression(binder, expr)?);
                }
                sql::ColumnOption::Check(expr) => {
                    columns[i].check = Some(bind_expression(binder, expr)?);
                }
                _ => {}
            }
        }
    }

    let mut foreign_keys = Vec::new();
    for constraint in &create.constraints {
        if let sql::TableConstraint::ForeignKey {
            columns: sources,
            foreign_table,
            referred_columns,
            ..
        } = constraint
        {
            let sources: Vec<String> = sources.iter().map(|i| i.value.clone()).collect();
            foreign_keys.push(validate_foreign_key(
                &catalog,
                &columns,
                sources,
                foreign_table,
                referred_columns,
            )?);
        }
    }
    for col in &create.columns {
        for opt in &col.options {
            if let sql::ColumnOption::ForeignKey {
                foreign_table,
                referred_columns,
                ..
            } = &opt.option
            {
                foreign_keys.push(validate_foreign_key(
                    &catalog,
                    &columns,
                    vec![col.name.value.clone()],
                    foreign_table,
                    referred_columns,
                )?);
            }
        }
    }

    Ok(BoundCreateTable {
        database,
        name,
        columns,
        foreign_keys,
    })
}

/// Check one foreign key: the sink table and its columns must exist, the
/// source columns must be declared by this CREATE, the lists must pair up
/// one to one, and paired columns must agree on type.
fn validate_foreign_key(
    catalog: &Catalog,
    declared: &[BoundColumnDef],
    sources: Vec<String>,
    foreign_table: &sql::ObjectName,
    referred_columns: &[sql::Ident],
) -> Result<BoundForeignKey> {
    let sink_table = foreign_table
        .0
        .last()
        .map(|i| i.value.clone())
        .unwrap_or_default();
    let sink_table_oid = catalog.get_table_oid(&sink_table);
    if !sink_table_oid.is_valid() {
        return Err(Error::ForeignKeyTableNotFound(sink_table));
    }

    let sinks: Vec<String> = referred_columns.iter().map(|i| i.value.clone()).collect();
    if sinks.is_empty() {
        return Err(Error::NotImplemented(
            "foreign key without referenced columns".to_string(),
        ));
    }
    if sources.len() != sinks.len() {
        return Err(Error::ForeignKeyArityMismatch);
    }

    let sink_schema = catalog
        .get_schema(sink_table_oid)
        .ok_or_else(|| Error::Internal(format!("table {} has no schema", sink_table)))?;
    for (source, sink) in sources.iter().zip(&sinks) {
        let sink_col = sink_schema
            .get_column(sink)
            .ok_or_else(|| Error::ForeignKeyColumnNotFound(sink.clone()))?;
        let source_col = declared
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(source))
            .ok_or_else(|| Error::ForeignKeySourceColumnNotFound(source.clone()))?;
        if source_col.value_type != sink_col.value_type {
            return Err(Error::TypeMismatch {
                expected: sink_col.value_type.to_string(),
                got: source_col.value_type.to_string(),
            });
        }
    }

    Ok(BoundForeignKey {
        source_columns: sources,
        sink_table,
        sink_table_oid,
        sink_columns: sinks,
    })
}

/// Bind CREATE INDEX
fn bind_create_index(binder: &mut Binder, create: &sql::CreateIndex) -> Result<BoundCreateIndex> {
    let index_name = create
        .name
        .as_ref()
        .map(last_name_part)
        .ok_or_else(|| Error::Parse("CREATE INDEX requires an index name".to_string()))?;
    let (database, table) = split_object_name(binder, &create.table_name);
    let catalog = binder.catalog_arc();
    let table_oid = catalog.get_table_oid(&table);
    if !table_oid.is_valid() {
        return Err(Error::TableNotFound(table));
    }
    if catalog.get_index_oid(&index_name).is_valid() {
        return Err(Error::IndexAlreadyExists(index_name));
    }
    binder
        .active_context_mut()?
        .add_regular_table(&catalog, &database, &table, &table)?;
    let schema = catalog
        .get_schema(table_oid)
        .ok_or_else(|| Error::Internal(format!("table {} has no schema", table)))?;

    let mut attributes = Vec::new();
    for attr in &create.columns {
        match &attr.expr {
            sql::Expr::Identifier(ident) => {
                if !schema.contains_column(&ident.value) {
                    return Err(Error::ColumnNotFound(ident.value.clone()));
                }
                attributes.push(BoundIndexAttribute::Column(ident.value.clone()));
            }
            expr => {
                attributes.push(BoundIndexAttribute::Expression(bind_expression(
                    binder, expr,
                )?));
            }
        }
    }

    Ok(BoundCreateIndex {
        name: index_name,
        database,
        table,
        table_oid,
        unique: create.unique,
        attributes,
    })
}

/// Bind CREATE TRIGGER. The base table is visible under its own name and
/// under the row aliases `old` and `new` so the WHEN condition can compare
/// row versions.
fn bind_create_trigger(
    binder: &mut Binder,
    name: &sql::ObjectName,
    table_name: &sql::ObjectName,
    condition: &Option<sql::Expr>,
) -> Result<BoundCreateTrigger> {
    let (database, table) = split_object_name(binder, table_name);
    let catalog = binder.catalog_arc();
    let ctx = binder.active_context_mut()?;
    ctx.add_regular_table(&catalog, &database, &table, &table)?;
    ctx.add_regular_table(&catalog, &database, &table, "old")?;
    ctx.add_regular_table(&catalog, &database, &table, "new")?;

    let when = condition
        .as_ref()
        .map(|e| bind_expression(binder, e))
        .transpose()?;

    Ok(BoundCreateTrigger {
        name: last_name_part(name),
        database,
        table,
        when,
    })
}

/// Bind DROP
fn bind_drop(
    binder: &mut Binder,
    object_type: &sql::ObjectType,
    names: &[sql::ObjectName],
    if_exists: bool,
) -> Result<BoundStatement> {
    let name_parts = names
        .first()
        .ok_or_else(|| Error::Parse("Missing object name".to_string()))?;

    let (object_type, name) = match object_type {
        sql::ObjectType::Database => {
            let name = last_name_part(name_parts);
            if !if_exists && !binder.catalog().get_database_oid(&name).is_valid() {
                return Err(Error::DatabaseNotFound(name));
            }
            (DropObjectType::Database, name)
        }
        sql::ObjectType::Table => {
            let (_, table) = split_object_name(binder, name_parts);
            if !if_exists && !binder.catalog().get_table_oid(&table).is_valid() {
                return Err(Error::TableNotFound(table));
            }
            (DropObjectType::Table, table)
        }
        sql::ObjectType::Index => {
            let name = last_name_part(name_parts);
            if !if_exists && !binder.catalog().get_index_oid(&name).is_valid() {
                return Err(Error::IndexNotFound(name));
            }
            (DropObjectType::Index, name)
        }
        // No existence check for these at bind time
        sql::ObjectType::Schema => (DropObjectType::Schema, last_name_part(name_parts)),
        sql::ObjectType::View => (DropObjectType::View, last_name_part(name_parts)),
        other => return Err(Error::NotImplemented(format!("DROP {:?}", other))),
    };

    Ok(BoundStatement::Drop(BoundDrop {
        object_type,
        name,
        if_exists,
    }))
}
