//! Binary and unary operator tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary operators recognized by the parser (spec §3/§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    /// `..` range constructor.
    Range,
    /// `&` string concatenation.
    Concat,
    /// `in` membership test.
    In,
    /// `.` path step join.
    Dot,
    /// `[` filter/index step.
    Filter,
    /// `^` sort/order-by.
    Sort,
    /// `@` tuple focus binding.
    Focus,
    /// `#` tuple index binding.
    Index,
    /// `{` group-by constructor.
    Group,
    /// `:=` variable bind.
    Bind,
    /// `~>` function application/composition.
    Apply,
    And,
    Or,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Range => "..",
            BinaryOperator::Concat => "&",
            BinaryOperator::In => "in",
            BinaryOperator::Dot => ".",
            BinaryOperator::Filter => "[",
            BinaryOperator::Sort => "^",
            BinaryOperator::Focus => "@",
            BinaryOperator::Index => "#",
            BinaryOperator::Group => "{",
            BinaryOperator::Bind => ":=",
            BinaryOperator::Apply => "~>",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        };
        write!(f, "{s}")
    }
}

/// Unary operators (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// Arithmetic negation.
    Negate,
}
