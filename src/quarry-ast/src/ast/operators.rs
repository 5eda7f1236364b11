//! Operators, orderings and constants used inside query trees.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a two-sided or flat join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    /// Inner join.
    Inner,
    /// Left outer join.
    Left,
    /// Right outer join.
    Right,
    /// Full outer join.
    Full,
}

impl JoinType {
    /// Method name used when rendering a two-sided join.
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::Inner => "join",
            Self::Left => "leftJoin",
            Self::Right => "rightJoin",
            Self::Full => "fullJoin",
        }
    }
}

/// Sort ordering attached to a `SortBy`. Carries no bindings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ordering {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
    /// Ascending, nulls first.
    AscNullsFirst,
    /// Descending, nulls first.
    DescNullsFirst,
    /// Ascending, nulls last.
    AscNullsLast,
    /// Descending, nulls last.
    DescNullsLast,
    /// One ordering per element of a tuple criteria.
    Tuple(Vec<Ordering>),
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "Ord.asc"),
            Self::Desc => write!(f, "Ord.desc"),
            Self::AscNullsFirst => write!(f, "Ord.ascNullsFirst"),
            Self::DescNullsFirst => write!(f, "Ord.descNullsFirst"),
            Self::AscNullsLast => write!(f, "Ord.ascNullsLast"),
            Self::DescNullsLast => write!(f, "Ord.descNullsLast"),
            Self::Tuple(elems) => {
                let items = elems
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Ord({items})")
            }
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    /// Equality.
    Eq,
    /// Inequality.
    NotEq,
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
    /// Less than.
    Lt,
    /// Less than or equal.
    LtEq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    GtEq,
    /// Numeric addition.
    Plus,
    /// Numeric subtraction.
    Minus,
    /// Multiplication.
    Multiply,
    /// Division.
    Divide,
    /// String concatenation.
    Concat,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Plus | Self::Concat => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        };
        write!(f, "{symbol}")
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// Logical negation.
    Not,
    /// Numeric negation.
    Negate,
    /// Emptiness test on a sub-query.
    IsEmpty,
    /// Non-emptiness test on a sub-query.
    NonEmpty,
}

/// Aggregation applied to a whole sub-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationOperator {
    /// Minimum.
    Min,
    /// Maximum.
    Max,
    /// Average.
    Avg,
    /// Sum.
    Sum,
    /// Row count.
    Size,
}

impl fmt::Display for AggregationOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Avg => "avg",
            Self::Sum => "sum",
            Self::Size => "size",
        };
        write!(f, "{name}")
    }
}

/// A literal constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// String literal.
    String(String),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Constant {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Constant {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Constant {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Constant {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Constant {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}
