//! End-to-end binder tests: parse a statement, bind it against a fixture
//! catalog, and inspect the bound tree.

use crate::{
    Binder, BoundExpression, BoundExpressionKind, BoundIndexAttribute, BoundSelect,
    BoundStatement, DropObjectType, TransactionKind,
};
use quail_catalog::Catalog;
use quail_common::{Error, Value, ValueType};
use std::sync::Arc;

fn test_catalog() -> Arc<Catalog> {
    let catalog = Catalog::new();
    catalog.create_database("quail").unwrap();
    catalog
        .create_table(
            "quail",
            "users",
            vec![
                ("id".to_string(), ValueType::Integer),
                ("name".to_string(), ValueType::Varchar),
            ],
        )
        .unwrap();
    catalog
        .create_table(
            "quail",
            "orders",
            vec![
                ("id".to_string(), ValueType::Integer),
                ("user_id".to_string(), ValueType::Integer),
                ("total".to_string(), ValueType::Decimal),
            ],
        )
        .unwrap();
    catalog
        .create_table("quail", "events", vec![("ts".to_string(), ValueType::Date)])
        .unwrap();
    catalog
        .create_table("quail", "u", vec![("b".to_string(), ValueType::Varchar)])
        .unwrap();
    Arc::new(catalog)
}

fn parse(sql: &str) -> sqlparser::ast::Statement {
    let dialect = sqlparser::dialect::PostgreSqlDialect {};
    let mut statements =
        sqlparser::parser::Parser::parse_sql(&dialect, sql).expect("statement should parse");
    assert_eq!(statements.len(), 1, "expected a single statement: {}", sql);
    statements.remove(0)
}

fn bind_with(binder: &mut Binder, sql: &str) -> Result<BoundStatement, Error> {
    let stmt = parse(sql);
    let result = binder.bind(&stmt);
    // The frame stack must be fully unwound after every bind
    assert_eq!(binder.frame_count(), 0, "leaked scope frames for: {}", sql);
    result
}

fn bind(sql: &str) -> Result<BoundStatement, Error> {
    let mut binder = Binder::new(test_catalog(), "quail");
    bind_with(&mut binder, sql)
}

fn expect_select(stmt: BoundStatement) -> BoundSelect {
    match stmt {
        BoundStatement::Select(select) => select,
        other => panic!("expected SELECT, got {:?}", other),
    }
}

fn column_oid_of(expr: &BoundExpression) -> quail_catalog::ColumnOid {
    match &expr.kind {
        BoundExpressionKind::ColumnValue { column_oid, .. } => *column_oid,
        other => panic!("expected column reference, got {:?}", other),
    }
}

#[test]
fn select_single_column() {
    let select = expect_select(bind("SELECT name FROM users").unwrap());
    assert_eq!(select.select_list.len(), 1);
    assert_eq!(select.depth, 0);

    let item = &select.select_list[0];
    assert_eq!(item.return_type, ValueType::Varchar);
    assert_eq!(item.depth, 0);
    assert_eq!(item.display_name, "name");
    assert!(!item.has_subquery);
    match &item.kind {
        BoundExpressionKind::ColumnValue {
            database_oid,
            table_oid,
            column_oid,
            column_name,
            ..
        } => {
            assert!(database_oid.is_valid());
            assert!(table_oid.is_valid());
            assert!(column_oid.is_valid());
            assert_eq!(column_name, "name");
        }
        other => panic!("expected column reference, got {:?}", other),
    }
}

#[test]
fn select_unknown_column_fails() {
    match bind("SELECT x FROM users") {
        Err(Error::ColumnNotFound(col)) => assert_eq!(col, "x"),
        other => panic!("expected ColumnNotFound, got {:?}", other),
    }
}

#[test]
fn select_unknown_table_fails() {
    assert!(matches!(
        bind("SELECT a FROM ghost"),
        Err(Error::TableNotFound(_))
    ));
}

#[test]
fn ambiguous_column_across_tables() {
    assert!(matches!(
        bind("SELECT id FROM users, orders"),
        Err(Error::AmbiguousColumn(_))
    ));
    // Columns unique to one table still resolve
    assert!(bind("SELECT total FROM users, orders").is_ok());
}

#[test]
fn derived_table_requires_alias() {
    assert!(matches!(
        bind("SELECT * FROM (SELECT id FROM users)"),
        Err(Error::MissingAlias)
    ));
}

#[test]
fn derived_table_columns_resolve_through_alias() {
    let select = expect_select(
        bind("SELECT sub.id FROM (SELECT id FROM users) sub").unwrap(),
    );
    match &select.select_list[0].kind {
        BoundExpressionKind::DerivedColumn {
            table_alias,
            column_name,
            column_index,
        } => {
            assert_eq!(table_alias, "sub");
            assert_eq!(column_name, "id");
            assert_eq!(*column_index, 0);
        }
        other => panic!("expected derived column, got {:?}", other),
    }
}

#[test]
fn star_expands_regular_tables_in_order() {
    let select = expect_select(bind("SELECT * FROM users, orders").unwrap());
    let names: Vec<_> = select
        .select_list
        .iter()
        .map(|e| e.display_name.clone())
        .collect();
    assert_eq!(names, vec!["id", "name", "id", "user_id", "total"]);
    for item in &select.select_list {
        assert!(column_oid_of(item).is_valid());
    }
}

#[test]
fn star_without_tables_is_invalid() {
    assert!(matches!(bind("SELECT *"), Err(Error::InvalidStar)));
}

#[test]
fn qualified_star_expands_one_table() {
    let select = expect_select(bind("SELECT users.* FROM users, orders").unwrap());
    let names: Vec<_> = select
        .select_list
        .iter()
        .map(|e| e.display_name.clone())
        .collect();
    assert_eq!(names, vec!["id", "name"]);
}

#[test]
fn qualified_star_unknown_table_fails() {
    assert!(matches!(
        bind("SELECT ghost.* FROM users"),
        Err(Error::InvalidTableReference(_))
    ));
}

#[test]
fn select_constant_without_from() {
    let select = expect_select(bind("SELECT 1").unwrap());
    assert_eq!(select.select_list[0].return_type, ValueType::Integer);
    assert!(select.from.is_empty());
}

#[test]
fn select_alias_becomes_output_name() {
    let select = expect_select(bind("SELECT name AS who FROM users").unwrap());
    assert_eq!(select.select_list[0].name(), "who");
    assert_eq!(select.select_list[0].display_name, "name");
}

#[test]
fn case_insensitive_resolution_binds_same_column() {
    let catalog = test_catalog();
    let mut binder = Binder::new(catalog, "quail");

    let lower = expect_select(bind_with(&mut binder, "SELECT name FROM users").unwrap());
    let upper = expect_select(bind_with(&mut binder, "SELECT NAME FROM USERS").unwrap());
    assert_eq!(
        column_oid_of(&lower.select_list[0]),
        column_oid_of(&upper.select_list[0])
    );
}

#[test]
fn correlated_subquery_binds_outer_column() {
    let select = expect_select(
        bind("SELECT * FROM users WHERE id = (SELECT max(user_id) FROM orders WHERE name = 'x')")
            .unwrap(),
    );
    // Star expanded over the outer table
    assert_eq!(select.select_list.len(), 2);

    let where_clause = select.where_clause.expect("WHERE should be bound");
    assert!(where_clause.has_subquery);

    let subselect = match &where_clause.kind {
        BoundExpressionKind::BinaryOp { right, .. } => match &right.kind {
            BoundExpressionKind::ScalarSubquery(sub) => sub,
            other => panic!("expected scalar subquery, got {:?}", other),
        },
        other => panic!("expected comparison, got {:?}", other),
    };
    assert_eq!(subselect.depth, 1);

    // Inside the subquery, `name` resolved against the outer frame
    let inner_where = subselect
        .where_clause
        .as_ref()
        .expect("subquery WHERE should be bound");
    match &inner_where.kind {
        BoundExpressionKind::BinaryOp { left, .. } => {
            assert_eq!(left.depth, 0);
            match &left.kind {
                BoundExpressionKind::ColumnValue { column_name, .. } => {
                    assert_eq!(column_name, "name")
                }
                other => panic!("expected column reference, got {:?}", other),
            }
        }
        other => panic!("expected comparison, got {:?}", other),
    }
}

#[test]
fn inner_scope_shadows_outer() {
    let catalog = test_catalog();
    let users_oid = catalog.get_table_oid("users");
    let mut binder = Binder::new(catalog, "quail");

    let select = expect_select(
        bind_with(&mut binder, "SELECT (SELECT t.id FROM users t) FROM orders t").unwrap(),
    );
    let subselect = match &select.select_list[0].kind {
        BoundExpressionKind::ScalarSubquery(sub) => sub,
        other => panic!("expected scalar subquery, got {:?}", other),
    };
    match &subselect.select_list[0].kind {
        BoundExpressionKind::ColumnValue {
            table_oid, ..
        } => assert_eq!(*table_oid, users_oid),
        other => panic!("expected column reference, got {:?}", other),
    }
}

#[test]
fn exists_subquery_with_qualified_correlation() {
    let select = expect_select(
        bind("SELECT name FROM users WHERE EXISTS (SELECT id FROM orders WHERE user_id = users.id)")
            .unwrap(),
    );
    let where_clause = select.where_clause.expect("WHERE should be bound");
    assert!(where_clause.has_subquery);
    assert!(matches!(
        where_clause.kind,
        BoundExpressionKind::Exists { .. }
    ));
}

#[test]
fn join_condition_binds_in_combined_scope() {
    let select = expect_select(
        bind("SELECT users.name FROM users JOIN orders ON users.id = orders.user_id").unwrap(),
    );
    match &select.from[0] {
        crate::BoundTableRef::Join { condition, .. } => {
            assert!(condition.is_some());
        }
        other => panic!("expected join, got {:?}", other),
    }
}

#[test]
fn group_by_having_order_limit_offset() {
    let select = expect_select(
        bind(
            "SELECT user_id, count(*) FROM orders GROUP BY user_id \
             HAVING count(*) > 1 ORDER BY user_id LIMIT 10 OFFSET 2",
        )
        .unwrap(),
    );
    assert_eq!(select.group_by.len(), 1);
    assert!(select.having.is_some());
    assert_eq!(select.order_by.len(), 1);
    assert_eq!(select.limit, Some(10));
    assert_eq!(select.offset, Some(2));
    assert_eq!(select.select_list[1].return_type, ValueType::BigInt);
    assert_eq!(select.select_list[1].display_name, "count(*)");
}

#[test]
fn aggregate_return_types() {
    let select = expect_select(
        bind("SELECT max(name), avg(id) FROM users").unwrap(),
    );
    assert_eq!(select.select_list[0].return_type, ValueType::Varchar);
    assert_eq!(select.select_list[1].return_type, ValueType::Decimal);
}

#[test]
fn insert_coerces_string_literal_to_date() {
    let stmt = bind("INSERT INTO events VALUES ('2020-01-01')").unwrap();
    let insert = match stmt {
        BoundStatement::Insert(insert) => insert,
        other => panic!("expected INSERT, got {:?}", other),
    };
    assert!(insert.table_oid.is_valid());
    assert_eq!(insert.values.len(), 1);
    let cell = &insert.values[0][0];
    assert_eq!(cell.return_type, ValueType::Date);
    assert!(matches!(
        cell.kind,
        BoundExpressionKind::Constant(Value::Date(_))
    ));
}

#[test]
fn insert_rejects_unparseable_date() {
    assert!(matches!(
        bind("INSERT INTO events VALUES ('not-a-date')"),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn insert_cast_expression_folds_to_literal() {
    let stmt = bind("INSERT INTO events VALUES (CAST('2020-05-05' AS DATE))").unwrap();
    let insert = match stmt {
        BoundStatement::Insert(insert) => insert,
        other => panic!("expected INSERT, got {:?}", other),
    };
    assert!(matches!(
        insert.values[0][0].kind,
        BoundExpressionKind::Constant(Value::Date(_))
    ));
}

#[test]
fn insert_widens_integer_to_decimal_column() {
    let stmt = bind("INSERT INTO orders VALUES (1, 2, 3)").unwrap();
    let insert = match stmt {
        BoundStatement::Insert(insert) => insert,
        other => panic!("expected INSERT, got {:?}", other),
    };
    let cell = &insert.values[0][2];
    assert_eq!(cell.return_type, ValueType::Decimal);
    assert!(matches!(
        cell.kind,
        BoundExpressionKind::Constant(Value::Decimal(_))
    ));
}

#[test]
fn insert_arity_must_match_schema() {
    assert!(matches!(
        bind("INSERT INTO users VALUES (1)"),
        Err(Error::InsertArityMismatch)
    ));
}

#[test]
fn insert_arity_must_match_named_columns() {
    assert!(matches!(
        bind("INSERT INTO users (id) VALUES (1, 'bob')"),
        Err(Error::InsertArityMismatch)
    ));
}

#[test]
fn insert_named_columns_validated_and_ordered() {
    let stmt = bind("INSERT INTO users (name, id) VALUES ('bob', 1)").unwrap();
    let insert = match stmt {
        BoundStatement::Insert(insert) => insert,
        other => panic!("expected INSERT, got {:?}", other),
    };
    assert_eq!(insert.columns, vec!["name", "id"]);
    assert_eq!(insert.values[0][0].return_type, ValueType::Varchar);
    assert_eq!(insert.values[0][1].return_type, ValueType::Integer);
}

#[test]
fn insert_unknown_column_fails() {
    assert!(matches!(
        bind("INSERT INTO users (ghost) VALUES (1)"),
        Err(Error::ColumnNotFound(_))
    ));
}

#[test]
fn insert_from_select() {
    let stmt = bind("INSERT INTO users SELECT id, name FROM users").unwrap();
    let insert = match stmt {
        BoundStatement::Insert(insert) => insert,
        other => panic!("expected INSERT, got {:?}", other),
    };
    assert!(insert.source.is_some());
    assert!(insert.values.is_empty());
}

#[test]
fn update_resolves_set_targets_against_table() {
    let stmt = bind("UPDATE users SET name = 'x' WHERE id = 1").unwrap();
    let update = match stmt {
        BoundStatement::Update(update) => update,
        other => panic!("expected UPDATE, got {:?}", other),
    };
    assert!(update.table_oid.is_valid());
    assert_eq!(update.assignments.len(), 1);
    assert_eq!(update.assignments[0].column, "name");
    assert!(update.assignments[0].column_oid.is_valid());
    assert!(update.where_clause.is_some());
}

#[test]
fn update_unknown_set_column_fails() {
    assert!(matches!(
        bind("UPDATE users SET ghost = 1"),
        Err(Error::ColumnNotFound(_))
    ));
}

#[test]
fn delete_binds_where_against_table() {
    let stmt = bind("DELETE FROM users WHERE name = 'x'").unwrap();
    let delete = match stmt {
        BoundStatement::Delete(delete) => delete,
        other => panic!("expected DELETE, got {:?}", other),
    };
    assert!(delete.table_oid.is_valid());
    assert!(delete.where_clause.is_some());
    assert_eq!(delete.database, "quail");
}

#[test]
fn delete_unknown_table_fails() {
    assert!(matches!(
        bind("DELETE FROM ghost"),
        Err(Error::TableNotFound(_))
    ));
}

#[test]
fn copy_table_expands_all_columns() {
    let stmt = bind("COPY users TO STDOUT").unwrap();
    let copy = match stmt {
        BoundStatement::Copy(copy) => copy,
        other => panic!("expected COPY, got {:?}", other),
    };
    assert_eq!(copy.table.as_deref(), Some("users"));
    assert!(copy.to);
    let names: Vec<_> = copy.columns.iter().map(|e| e.display_name.clone()).collect();
    assert_eq!(names, vec!["id", "name"]);
}

#[test]
fn copy_query_binds_select() {
    let stmt = bind("COPY (SELECT name FROM users) TO STDOUT").unwrap();
    let copy = match stmt {
        BoundStatement::Copy(copy) => copy,
        other => panic!("expected COPY, got {:?}", other),
    };
    assert!(copy.table.is_none());
    assert!(copy.query.is_some());
}

#[test]
fn analyze_applies_default_database() {
    let stmt = bind("ANALYZE TABLE users").unwrap();
    match stmt {
        BoundStatement::Analyze(analyze) => {
            assert_eq!(analyze.database, "quail");
            assert_eq!(analyze.table, "users");
        }
        other => panic!("expected ANALYZE, got {:?}", other),
    }
}

#[test]
fn create_database_collision_fails() {
    assert!(bind("CREATE DATABASE fresh").is_ok());
    assert!(matches!(
        bind("CREATE DATABASE quail"),
        Err(Error::DatabaseAlreadyExists(_))
    ));
}

#[test]
fn create_table_collision_fails() {
    assert!(matches!(
        bind("CREATE TABLE users (id INT)"),
        Err(Error::TableAlreadyExists(_))
    ));
}

#[test]
fn create_table_check_references_sibling_column() {
    let stmt = bind("CREATE TABLE t (a INT, b INT CHECK (b > a))").unwrap();
    let create = match stmt {
        BoundStatement::CreateTable(create) => create,
        other => panic!("expected CREATE TABLE, got {:?}", other),
    };
    assert_eq!(create.columns.len(), 2);
    let check = create.columns[1].check.as_ref().expect("CHECK should bind");
    assert_eq!(check.return_type, ValueType::Boolean);
}

#[test]
fn create_table_default_binds() {
    let stmt = bind("CREATE TABLE t (a INT DEFAULT 0)").unwrap();
    let create = match stmt {
        BoundStatement::CreateTable(create) => create,
        other => panic!("expected CREATE TABLE, got {:?}", other),
    };
    assert!(create.columns[0].default.is_some());
}

#[test]
fn create_table_foreign_key_validates() {
    let stmt = bind("CREATE TABLE t (a INT, FOREIGN KEY (a) REFERENCES orders (id))").unwrap();
    let create = match stmt {
        BoundStatement::CreateTable(create) => create,
        other => panic!("expected CREATE TABLE, got {:?}", other),
    };
    assert_eq!(create.foreign_keys.len(), 1);
    assert!(create.foreign_keys[0].sink_table_oid.is_valid());
}

#[test]
fn create_table_foreign_key_type_mismatch() {
    assert!(matches!(
        bind("CREATE TABLE t (a INT, FOREIGN KEY (a) REFERENCES u (b))"),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn create_table_foreign_key_arity_mismatch() {
    assert!(matches!(
        bind("CREATE TABLE t (a INT, b INT, FOREIGN KEY (a, b) REFERENCES orders (id))"),
        Err(Error::ForeignKeyArityMismatch)
    ));
}

#[test]
fn create_table_foreign_key_unknown_sink_table() {
    assert!(matches!(
        bind("CREATE TABLE t (a INT, FOREIGN KEY (a) REFERENCES ghost (id))"),
        Err(Error::ForeignKeyTableNotFound(_))
    ));
}

#[test]
fn create_table_foreign_key_unknown_sink_column() {
    assert!(matches!(
        bind("CREATE TABLE t (a INT, FOREIGN KEY (a) REFERENCES orders (ghost))"),
        Err(Error::ForeignKeyColumnNotFound(_))
    ));
}

#[test]
fn create_table_foreign_key_unknown_source_column() {
    assert!(matches!(
        bind("CREATE TABLE t (a INT, FOREIGN KEY (z) REFERENCES orders (id))"),
        Err(Error::ForeignKeySourceColumnNotFound(_))
    ));
}

#[test]
fn create_table_column_level_foreign_key() {
    let stmt = bind("CREATE TABLE t (a INT REFERENCES orders (id))").unwrap();
    let create = match stmt {
        BoundStatement::CreateTable(create) => create,
        other => panic!("expected CREATE TABLE, got {:?}", other),
    };
    assert_eq!(create.foreign_keys.len(), 1);
    assert_eq!(create.foreign_keys[0].source_columns, vec!["a"]);
}

#[test]
fn create_index_on_column() {
    let stmt = bind("CREATE INDEX users_by_name ON users (name)").unwrap();
    let create = match stmt {
        BoundStatement::CreateIndex(create) => create,
        other => panic!("expected CREATE INDEX, got {:?}", other),
    };
    assert!(create.table_oid.is_valid());
    assert_eq!(create.attributes.len(), 1);
    assert!(matches!(
        &create.attributes[0],
        BoundIndexAttribute::Column(name) if name == "name"
    ));
}

#[test]
fn create_index_on_expression() {
    let stmt = bind("CREATE INDEX users_by_id_succ ON users ((id + 1))").unwrap();
    let create = match stmt {
        BoundStatement::CreateIndex(create) => create,
        other => panic!("expected CREATE INDEX, got {:?}", other),
    };
    assert!(matches!(
        create.attributes[0],
        BoundIndexAttribute::Expression(_)
    ));
}

#[test]
fn create_index_unknown_column_fails() {
    assert!(matches!(
        bind("CREATE INDEX i ON users (ghost)"),
        Err(Error::ColumnNotFound(_))
    ));
}

#[test]
fn create_index_on_missing_table_fails() {
    assert!(matches!(
        bind("CREATE INDEX i ON ghost (id)"),
        Err(Error::TableNotFound(_))
    ));
}

#[test]
fn create_index_duplicate_name_fails() {
    let catalog = test_catalog();
    catalog.create_index("users_by_name", "users").unwrap();
    let mut binder = Binder::new(catalog, "quail");
    assert!(matches!(
        bind_with(&mut binder, "CREATE INDEX users_by_name ON users (name)"),
        Err(Error::IndexAlreadyExists(_))
    ));
}

#[test]
fn create_trigger_binds_old_and_new_aliases() {
    let stmt = bind(
        "CREATE TRIGGER audit BEFORE UPDATE ON users FOR EACH ROW \
         WHEN (old.id <> new.id) EXECUTE FUNCTION audit_users()",
    )
    .unwrap();
    let trigger = match stmt {
        BoundStatement::CreateTrigger(trigger) => trigger,
        other => panic!("expected CREATE TRIGGER, got {:?}", other),
    };
    assert_eq!(trigger.table, "users");
    let when = trigger.when.expect("WHEN should bind");
    assert_eq!(when.return_type, ValueType::Boolean);
}

#[test]
fn create_trigger_on_missing_table_fails() {
    assert!(matches!(
        bind(
            "CREATE TRIGGER audit BEFORE UPDATE ON ghost FOR EACH ROW \
             EXECUTE FUNCTION audit_users()"
        ),
        Err(Error::TableNotFound(_))
    ));
}

#[test]
fn create_view_binds_query() {
    let stmt = bind("CREATE VIEW v AS SELECT name FROM users").unwrap();
    let view = match stmt {
        BoundStatement::CreateView(view) => view,
        other => panic!("expected CREATE VIEW, got {:?}", other),
    };
    assert_eq!(view.query.select_list.len(), 1);
}

#[test]
fn create_schema_accepted() {
    assert!(matches!(
        bind("CREATE SCHEMA reporting"),
        Ok(BoundStatement::CreateSchema(_))
    ));
}

#[test]
fn create_function_accepted_without_binding() {
    let stmt = bind(
        "CREATE FUNCTION add(INTEGER, INTEGER) RETURNS INTEGER \
         AS 'select $1 + $2;' LANGUAGE SQL",
    )
    .unwrap();
    match stmt {
        BoundStatement::CreateFunction(func) => assert_eq!(func.name, "add"),
        other => panic!("expected CREATE FUNCTION, got {:?}", other),
    }
}

#[test]
fn drop_table_checks_existence() {
    assert!(bind("DROP TABLE users").is_ok());
    assert!(matches!(
        bind("DROP TABLE ghost"),
        Err(Error::TableNotFound(_))
    ));
    assert!(bind("DROP TABLE IF EXISTS ghost").is_ok());
}

#[test]
fn drop_database_checks_existence() {
    assert!(bind("DROP DATABASE quail").is_ok());
    assert!(matches!(
        bind("DROP DATABASE ghost"),
        Err(Error::DatabaseNotFound(_))
    ));
}

#[test]
fn drop_index_checks_existence() {
    let catalog = test_catalog();
    catalog.create_index("users_by_name", "users").unwrap();
    let mut binder = Binder::new(catalog, "quail");
    assert!(bind_with(&mut binder, "DROP INDEX users_by_name").is_ok());
    assert!(matches!(
        bind_with(&mut binder, "DROP INDEX ghost"),
        Err(Error::IndexNotFound(_))
    ));
}

#[test]
fn drop_view_and_schema_skip_existence_check() {
    assert!(matches!(
        bind("DROP VIEW ghost").unwrap(),
        BoundStatement::Drop(drop) if drop.object_type == DropObjectType::View
    ));
    assert!(bind("DROP SCHEMA ghost").is_ok());
}

#[test]
fn drop_trigger_skips_existence_check() {
    match bind("DROP TRIGGER audit ON users").unwrap() {
        BoundStatement::Drop(drop) => {
            assert_eq!(drop.object_type, DropObjectType::Trigger);
            assert_eq!(drop.name, "audit");
        }
        other => panic!("expected DROP, got {:?}", other),
    }
}

#[test]
fn deallocate_drops_prepared_statement_without_check() {
    match bind("DEALLOCATE plan").unwrap() {
        BoundStatement::Drop(drop) => {
            assert_eq!(drop.object_type, DropObjectType::PreparedStatement);
            assert_eq!(drop.name, "plan");
        }
        other => panic!("expected DROP, got {:?}", other),
    }
}

#[test]
fn prepare_and_execute_accepted() {
    assert!(matches!(
        bind("PREPARE plan AS SELECT name FROM users"),
        Ok(BoundStatement::Prepare(_))
    ));
    assert!(matches!(
        bind("EXECUTE plan"),
        Ok(BoundStatement::Execute(_))
    ));
}

#[test]
fn transaction_statements_pass_through() {
    assert!(matches!(
        bind("BEGIN"),
        Ok(BoundStatement::Transaction(TransactionKind::Begin))
    ));
    assert!(matches!(
        bind("COMMIT"),
        Ok(BoundStatement::Transaction(TransactionKind::Commit))
    ));
    assert!(matches!(
        bind("ROLLBACK"),
        Ok(BoundStatement::Transaction(TransactionKind::Rollback))
    ));
}

#[test]
fn binding_is_deterministic() {
    let render = |stmt: &BoundStatement| format!("{:?}", stmt);
    let first = bind("SELECT * FROM users WHERE id = (SELECT max(user_id) FROM orders)").unwrap();
    let second = bind("SELECT * FROM users WHERE id = (SELECT max(user_id) FROM orders)").unwrap();
    assert_eq!(render(&first), render(&second));
}

#[test]
fn failed_bind_leaves_binder_reusable() {
    let mut binder = Binder::new(test_catalog(), "quail");
    assert!(bind_with(&mut binder, "SELECT ghost FROM users").is_err());
    // The same binder instance binds cleanly afterwards
    assert!(bind_with(&mut binder, "SELECT name FROM users").is_ok());
}
