//! Logical type system for Quail
//!
//! Every expression the binder touches is annotated with a `ValueType`.
//! The lattice is deliberately small: the front end only needs enough
//! structure to type literals, column references and operator results.

use std::fmt;

/// The logical type of a bound expression or catalog column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// The type of a bare NULL literal
    Null,
    /// Boolean (true/false)
    Boolean,
    /// 8-bit signed integer
    TinyInt,
    /// 16-bit signed integer
    SmallInt,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    BigInt,
    /// Arbitrary-precision decimal
    Decimal,
    /// Variable-length string (UTF-8)
    Varchar,
    /// Date (year, month, day)
    Date,
    /// Timestamp without timezone
    Timestamp,
    /// Not yet derived
    Invalid,
}

impl ValueType {
    /// Returns true if this type is a numeric type
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::TinyInt
                | ValueType::SmallInt
                | ValueType::Integer
                | ValueType::BigInt
                | ValueType::Decimal
        )
    }

    /// Returns true if this type is an integer type
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ValueType::TinyInt | ValueType::SmallInt | ValueType::Integer | ValueType::BigInt
        )
    }

    /// Integer width rank used for promotion; None for non-integers
    fn integer_rank(&self) -> Option<u8> {
        match self {
            ValueType::TinyInt => Some(1),
            ValueType::SmallInt => Some(2),
            ValueType::Integer => Some(3),
            ValueType::BigInt => Some(4),
            _ => None,
        }
    }

    /// Try to find a common supertype for two types
    pub fn common_supertype(&self, other: &ValueType) -> Option<ValueType> {
        if self == other {
            return Some(*self);
        }

        // NULL adopts the other side's type
        if *self == ValueType::Null {
            return Some(*other);
        }
        if *other == ValueType::Null {
            return Some(*self);
        }

        if self.is_numeric() && other.is_numeric() {
            if *self == ValueType::Decimal || *other == ValueType::Decimal {
                return Some(ValueType::Decimal);
            }
            let rank = self.integer_rank()?.max(other.integer_rank()?);
            return match rank {
                1 => Some(ValueType::TinyInt),
                2 => Some(ValueType::SmallInt),
                3 => Some(ValueType::Integer),
                _ => Some(ValueType::BigInt),
            };
        }

        None
    }

    /// Returns true when a value of this type can be carried in a column of
    /// `target` without loss (identity, integer widening, integer to decimal).
    pub fn promotes_to(&self, target: &ValueType) -> bool {
        if self == target || *self == ValueType::Null {
            return true;
        }
        if *target == ValueType::Decimal && self.is_numeric() {
            return true;
        }
        match (self.integer_rank(), target.integer_rank()) {
            (Some(from), Some(to)) => from <= to,
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Null => write!(f, "NULL"),
            ValueType::Boolean => write!(f, "BOOLEAN"),
            ValueType::TinyInt => write!(f, "TINYINT"),
            ValueType::SmallInt => write!(f, "SMALLINT"),
            ValueType::Integer => write!(f, "INTEGER"),
            ValueType::BigInt => write!(f, "BIGINT"),
            ValueType::Decimal => write!(f, "DECIMAL"),
            ValueType::Varchar => write!(f, "VARCHAR"),
            ValueType::Date => write!(f, "DATE"),
            ValueType::Timestamp => write!(f, "TIMESTAMP"),
            ValueType::Invalid => write!(f, "INVALID"),
        }
    }
}

impl Default for ValueType {
    fn default() -> Self {
        ValueType::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric() {
        assert!(ValueType::Integer.is_numeric());
        assert!(ValueType::Decimal.is_numeric());
        assert!(!ValueType::Varchar.is_numeric());
        assert!(!ValueType::Boolean.is_numeric());
    }

    #[test]
    fn test_common_supertype() {
        assert_eq!(
            ValueType::Integer.common_supertype(&ValueType::BigInt),
            Some(ValueType::BigInt)
        );
        assert_eq!(
            ValueType::TinyInt.common_supertype(&ValueType::Decimal),
            Some(ValueType::Decimal)
        );
        assert_eq!(
            ValueType::Null.common_supertype(&ValueType::Date),
            Some(ValueType::Date)
        );
        assert_eq!(ValueType::Varchar.common_supertype(&ValueType::Integer), None);
    }

    #[test]
    fn test_promotes_to() {
        assert!(ValueType::Integer.promotes_to(&ValueType::BigInt));
        assert!(ValueType::Integer.promotes_to(&ValueType::Decimal));
        assert!(!ValueType::BigInt.promotes_to(&ValueType::Integer));
        assert!(ValueType::Null.promotes_to(&ValueType::Date));
        assert!(!ValueType::Varchar.promotes_to(&ValueType::Date));
    }

    #[test]
    fn test_display() {
        assert_eq!(ValueType::Integer.to_string(), "INTEGER");
        assert_eq!(ValueType::Timestamp.to_string(), "TIMESTAMP");
    }
}
