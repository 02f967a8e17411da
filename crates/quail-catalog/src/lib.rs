//! Quail Catalog - name-to-identifier resolution for the binder
//!
//! The catalog issues stable OIDs for databases, tables, columns and
//! indexes and answers the read-only lookups the binder performs: name to
//! OID (with an invalid sentinel for misses) and table OID to schema
//! snapshot. The binder never mutates catalog state; the write surface
//! exists so the embedding system and tests can populate it.

use hashbrown::HashMap;
use parking_lot::RwLock;
use quail_common::{Error, Result, ValueType};
use std::sync::atomic::{AtomicU32, Ordering};

mod column;
mod oid;
mod schema;

pub use column::Column;
pub use oid::{ColumnOid, DatabaseOid, IndexOid, NamespaceOid, TableOid};
pub use schema::Schema;

/// Name of the namespace tables land in when none is specified
pub const DEFAULT_NAMESPACE: &str = "public";

struct TableEntry {
    oid: TableOid,
    database: DatabaseOid,
    namespace: NamespaceOid,
}

struct IndexEntry {
    oid: IndexOid,
    table: TableOid,
}

/// The catalog registry. All name keys are folded to lowercase.
pub struct Catalog {
    databases: RwLock<HashMap<String, DatabaseOid>>,
    tables: RwLock<HashMap<String, TableEntry>>,
    schemas: RwLock<HashMap<TableOid, Schema>>,
    indexes: RwLock<HashMap<String, IndexEntry>>,
    default_namespace: NamespaceOid,
    next_oid: AtomicU32,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog {
            databases: RwLock::new(HashMap::new()),
            tables: RwLock::new(HashMap::new()),
            schemas: RwLock::new(HashMap::new()),
            indexes: RwLock::new(HashMap::new()),
            default_namespace: NamespaceOid(1),
            next_oid: AtomicU32::new(2),
        }
    }

    fn next_oid(&self) -> u32 {
        self.next_oid.fetch_add(1, Ordering::SeqCst)
    }

    /// Look up a database by name. Returns `DatabaseOid::INVALID` on miss.
    pub fn get_database_oid(&self, name: &str) -> DatabaseOid {
        self.databases
            .read()
            .get(&name.to_lowercase())
            .copied()
            .unwrap_or(DatabaseOid::INVALID)
    }

    /// Look up a table by name. Returns `TableOid::INVALID` on miss.
    pub fn get_table_oid(&self, name: &str) -> TableOid {
        self.tables
            .read()
            .get(&name.to_lowercase())
            .map(|e| e.oid)
            .unwrap_or(TableOid::INVALID)
    }

    /// Look up an index by name. Returns `IndexOid::INVALID` on miss.
    pub fn get_index_oid(&self, name: &str) -> IndexOid {
        self.indexes
            .read()
            .get(&name.to_lowercase())
            .map(|e| e.oid)
            .unwrap_or(IndexOid::INVALID)
    }

    /// Snapshot the schema of a table
    pub fn get_schema(&self, table: TableOid) -> Option<Schema> {
        self.schemas.read().get(&table).cloned()
    }

    /// The namespace tables are created in
    pub fn default_namespace_oid(&self) -> NamespaceOid {
        self.default_namespace
    }

    /// Create a database
    pub fn create_database(&self, name: &str) -> Result<DatabaseOid> {
        let mut databases = self.databases.write();
        let key = name.to_lowercase();
        if databases.contains_key(&key) {
            return Err(Error::DatabaseAlreadyExists(name.to_string()));
        }
        let oid = DatabaseOid(self.next_oid());
        databases.insert(key, oid);
        Ok(oid)
    }

    /// Create a table in the given database
    pub fn create_table(
        &self,
        database: &str,
        name: &str,
        columns: Vec<(String, ValueType)>,
    ) -> Result<TableOid> {
        let db_oid = self.get_database_oid(database);
        if !db_oid.is_valid() {
            return Err(Error::DatabaseNotFound(database.to_string()));
        }

        let mut tables = self.tables.write();
        let key = name.to_lowercase();
        if tables.contains_key(&key) {
            return Err(Error::TableAlreadyExists(name.to_string()));
        }

        for (i, (col_name, _)) in columns.iter().enumerate() {
            if columns[..i]
                .iter()
                .any(|(prev, _)| prev.eq_ignore_ascii_case(col_name))
            {
                return Err(Error::Internal(format!(
                    "duplicate column name {} in table {}",
                    col_name, name
                )));
            }
        }

        let table_oid = TableOid(self.next_oid());
        let schema_columns = columns
            .into_iter()
            .map(|(col_name, value_type)| {
                Column::new(ColumnOid(self.next_oid()), col_name, value_type)
            })
            .collect();

        tables.insert(
            key,
            TableEntry {
                oid: table_oid,
                database: db_oid,
                namespace: self.default_namespace,
            },
        );
        self.schemas
            .write()
            .insert(table_oid, Schema::new(schema_columns));
        Ok(table_oid)
    }

    /// Create an index over an existing table
    pub fn create_index(&self, name: &str, table_name: &str) -> Result<IndexOid> {
        let table_oid = self.get_table_oid(table_name);
        if !table_oid.is_valid() {
            return Err(Error::TableNotFound(table_name.to_string()));
        }

        let mut indexes = self.indexes.write();
        let key = name.to_lowercase();
        if indexes.contains_key(&key) {
            return Err(Error::IndexAlreadyExists(name.to_string()));
        }
        let oid = IndexOid(self.next_oid());
        indexes.insert(
            key,
            IndexEntry {
                oid,
                table: table_oid,
            },
        );
        Ok(oid)
    }

    /// The database a table belongs to
    pub fn get_table_database(&self, table: TableOid) -> Option<DatabaseOid> {
        self.tables
            .read()
            .values()
            .find(|e| e.oid == table)
            .map(|e| e.database)
    }

    /// The namespace a table belongs to
    pub fn get_table_namespace(&self, table: TableOid) -> Option<NamespaceOid> {
        self.tables
            .read()
            .values()
            .find(|e| e.oid == table)
            .map(|e| e.namespace)
    }

    /// The table an index is built over
    pub fn get_index_table(&self, index: IndexOid) -> Option<TableOid> {
        self.indexes
            .read()
            .values()
            .find(|e| e.oid == index)
            .map(|e| e.table)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
