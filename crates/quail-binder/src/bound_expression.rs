//! Bound expressions with resolved names and derived annotations

use quail_catalog::{ColumnOid, DatabaseOid, TableOid};
use quail_common::{Value, ValueType};
use std::fmt;

/// A bound expression.
///
/// Besides its kind, every node carries the annotations later stages depend
/// on: the return type, the deepest scope any column reference inside it
/// resolved at, whether a subquery occurs beneath it, and a canonical
/// display name. Annotations are derived once, bottom-up, when the node is
/// built, and never revised.
#[derive(Debug, Clone)]
pub struct BoundExpression {
    pub kind: BoundExpressionKind,
    pub return_type: ValueType,
    /// Scope depth: the maximum depth of any column reference within, or
    /// the depth of the enclosing scope if there is none
    pub depth: u32,
    /// Whether this expression or any child contains a subquery
    pub has_subquery: bool,
    /// Canonical name used by later stages
    pub display_name: String,
    /// Explicit `AS` alias, if any
    pub alias: Option<String>,
}

impl BoundExpression {
    /// Build a leaf node at the given scope depth
    pub fn leaf(
        kind: BoundExpressionKind,
        return_type: ValueType,
        display_name: String,
        depth: u32,
    ) -> Self {
        let has_subquery = kind.is_subquery();
        BoundExpression {
            kind,
            return_type,
            depth,
            has_subquery,
            display_name,
            alias: None,
        }
    }

    /// Build an interior node. Depth and the subquery flag are derived
    /// from the node's own children: depth is the maximum depth of any
    /// column reference within (falling back to the enclosing scope's
    /// depth), and the subquery flag ORs over the children plus the node
    /// itself. Every interior node goes through here.
    pub fn derive(
        kind: BoundExpressionKind,
        return_type: ValueType,
        display_name: String,
        scope_depth: u32,
    ) -> Self {
        let (depth, has_subquery) = {
            let children = kind.children();
            let depth = children
                .iter()
                .map(|c| c.depth)
                .chain(kind.subselect_depth())
                .max()
                .unwrap_or(scope_depth);
            let has_subquery = kind.is_subquery() || children.iter().any(|c| c.has_subquery);
            (depth, has_subquery)
        };
        BoundExpression {
            kind,
            return_type,
            depth,
            has_subquery,
            display_name,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: String) -> Self {
        self.alias = Some(alias);
        self
    }

    /// The name this expression is known by in a projection
    pub fn name(&self) -> String {
        self.alias
            .clone()
            .unwrap_or_else(|| self.display_name.clone())
    }
}

/// The kind of bound expression
#[derive(Debug, Clone)]
pub enum BoundExpressionKind {
    /// Literal constant
    Constant(Value),

    /// Column reference resolved against the catalog
    ColumnValue {
        database_oid: DatabaseOid,
        table_oid: TableOid,
        column_oid: ColumnOid,
        /// Alias the owning binding is visible under
        table_name: String,
        column_name: String,
    },

    /// Column of a table that has no catalog identity: a subselect-derived
    /// table, or the table being declared by an in-progress CREATE TABLE
    DerivedColumn {
        table_alias: String,
        column_name: String,
        column_index: usize,
    },

    /// Binary operation
    BinaryOp {
        left: Box<BoundExpression>,
        op: BoundBinaryOperator,
        right: Box<BoundExpression>,
    },

    /// Unary operation
    UnaryOp {
        op: BoundUnaryOperator,
        expr: Box<BoundExpression>,
    },

    /// IS NULL
    IsNull(Box<BoundExpression>),

    /// IS NOT NULL
    IsNotNull(Box<BoundExpression>),

    /// BETWEEN
    Between {
        expr: Box<BoundExpression>,
        low: Box<BoundExpression>,
        high: Box<BoundExpression>,
        negated: bool,
    },

    /// IN list
    InList {
        expr: Box<BoundExpression>,
        list: Vec<BoundExpression>,
        negated: bool,
    },

    /// CASE expression
    Case {
        operand: Option<Box<BoundExpression>>,
        when_clauses: Vec<(BoundExpression, BoundExpression)>,
        else_result: Option<Box<BoundExpression>>,
    },

    /// Explicit type cast
    Cast {
        expr: Box<BoundExpression>,
        target_type: ValueType,
    },

    /// Aggregate function call
    Aggregate {
        function: AggregateFunction,
        arg: Option<Box<BoundExpression>>,
        distinct: bool,
    },

    /// Scalar function call
    Function {
        name: String,
        args: Vec<BoundExpression>,
    },

    /// Scalar subquery
    ScalarSubquery(Box<super::BoundSelect>),

    /// EXISTS subquery
    Exists {
        subquery: Box<super::BoundSelect>,
        negated: bool,
    },

    /// IN subquery: expr IN (SELECT ...)
    InSubquery {
        expr: Box<BoundExpression>,
        subquery: Box<super::BoundSelect>,
        negated: bool,
    },

    /// `*`, replaced during select-list expansion
    Star,
}

impl BoundExpressionKind {
    pub fn is_subquery(&self) -> bool {
        matches!(
            self,
            BoundExpressionKind::ScalarSubquery(_)
                | BoundExpressionKind::Exists { .. }
                | BoundExpressionKind::InSubquery { .. }
        )
    }

    /// Immediate child expressions of this node
    pub fn children(&self) -> Vec<&BoundExpression> {
        match self {
            BoundExpressionKind::Constant(_)
            | BoundExpressionKind::ColumnValue { .. }
            | BoundExpressionKind::DerivedColumn { .. }
            | BoundExpressionKind::ScalarSubquery(_)
            | BoundExpressionKind::Exists { .. }
            | BoundExpressionKind::Star => Vec::new(),
            BoundExpressionKind::BinaryOp { left, right, .. } => vec![&**left, &**right],
            BoundExpressionKind::UnaryOp { expr, .. }
            | BoundExpressionKind::IsNull(expr)
            | BoundExpressionKind::IsNotNull(expr)
            | BoundExpressionKind::Cast { expr, .. }
            | BoundExpressionKind::InSubquery { expr, .. } => vec![&**expr],
            BoundExpressionKind::Between {
                expr, low, high, ..
            } => vec![&**expr, &**low, &**high],
            BoundExpressionKind::InList { expr, list, .. } => {
                std::iter::once(&**expr).chain(list.iter()).collect()
            }
            BoundExpressionKind::Case {
                operand,
                when_clauses,
                else_result,
            } => operand
                .as_deref()
                .into_iter()
                .chain(when_clauses.iter().flat_map(|(cond, result)| [cond, result]))
                .chain(else_result.as_deref())
                .collect(),
            BoundExpressionKind::Aggregate { arg, .. } => arg.as_deref().into_iter().collect(),
            BoundExpressionKind::Function { args, .. } => args.iter().collect(),
        }
    }

    /// Depth the subselect under this node was bound at, for subquery nodes
    fn subselect_depth(&self) -> Option<u32> {
        match self {
            BoundExpressionKind::ScalarSubquery(subquery)
            | BoundExpressionKind::Exists { subquery, .. }
            | BoundExpressionKind::InSubquery { subquery, .. } => Some(subquery.depth),
            _ => None,
        }
    }
}

/// Aggregate functions the binder knows the type rules for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    CountStar,
    Count,
    Sum,
    Min,
    Max,
    Avg,
}

impl AggregateFunction {
    /// Result type given the argument type
    pub fn return_type(&self, arg: Option<&ValueType>) -> ValueType {
        match self {
            AggregateFunction::CountStar | AggregateFunction::Count => ValueType::BigInt,
            AggregateFunction::Sum => match arg {
                Some(ValueType::Decimal) => ValueType::Decimal,
                _ => ValueType::BigInt,
            },
            AggregateFunction::Avg => ValueType::Decimal,
            AggregateFunction::Min | AggregateFunction::Max => {
                arg.copied().unwrap_or(ValueType::Invalid)
            }
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateFunction::CountStar | AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Avg => "avg",
        };
        write!(f, "{}", name)
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundBinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    // Logical
    And,
    Or,
}

impl BoundBinaryOperator {
    /// Get the result type of this operator given operand types
    pub fn result_type(&self, left: &ValueType, right: &ValueType) -> ValueType {
        match self {
            BoundBinaryOperator::Equal
            | BoundBinaryOperator::NotEqual
            | BoundBinaryOperator::LessThan
            | BoundBinaryOperator::LessThanOrEqual
            | BoundBinaryOperator::GreaterThan
            | BoundBinaryOperator::GreaterThanOrEqual
            | BoundBinaryOperator::And
            | BoundBinaryOperator::Or => ValueType::Boolean,

            BoundBinaryOperator::Add
            | BoundBinaryOperator::Subtract
            | BoundBinaryOperator::Multiply
            | BoundBinaryOperator::Divide
            | BoundBinaryOperator::Modulo => {
                left.common_supertype(right).unwrap_or(ValueType::Decimal)
            }
        }
    }
}

impl fmt::Display for BoundBinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BoundBinaryOperator::Add => "+",
            BoundBinaryOperator::Subtract => "-",
            BoundBinaryOperator::Multiply => "*",
            BoundBinaryOperator::Divide => "/",
            BoundBinaryOperator::Modulo => "%",
            BoundBinaryOperator::Equal => "=",
            BoundBinaryOperator::NotEqual => "<>",
            BoundBinaryOperator::LessThan => "<",
            BoundBinaryOperator::LessThanOrEqual => "<=",
            BoundBinaryOperator::GreaterThan => ">",
            BoundBinaryOperator::GreaterThanOrEqual => ">=",
            BoundBinaryOperator::And => "AND",
            BoundBinaryOperator::Or => "OR",
        };
        write!(f, "{}", symbol)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundUnaryOperator {
    Negate,
    Not,
}

impl fmt::Display for BoundUnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundUnaryOperator::Negate => write!(f, "-"),
            BoundUnaryOperator::Not => write!(f, "NOT"),
        }
    }
}
