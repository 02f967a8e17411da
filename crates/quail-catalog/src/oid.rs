//! Stable identifiers issued by the catalog
//!
//! Each object family gets its own newtype so identifiers cannot be mixed
//! up across families. The zero value is reserved as the "no such object"
//! sentinel returned by failed lookups.

use std::fmt;

macro_rules! oid_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Reserved sentinel meaning "no such object"
            pub const INVALID: $name = $name(0);

            pub fn is_valid(&self) -> bool {
                *self != $name::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

oid_type! {
    /// Identifies a database
    DatabaseOid
}

oid_type! {
    /// Identifies a namespace within a database
    NamespaceOid
}

oid_type! {
    /// Identifies a table
    TableOid
}

oid_type! {
    /// Identifies a column within a table
    ColumnOid
}

oid_type! {
    /// Identifies an index
    IndexOid
}
