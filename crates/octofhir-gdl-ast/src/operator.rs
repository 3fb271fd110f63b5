//! GDL operators with precedence information

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operators usable in GDL expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorKind {
    // Rank 2 (binds tightest)
    /// Power (`^`)
    Exponent,

    // Rank 1
    /// `*`
    Multiplication,
    /// `/`
    Division,
    /// `%`
    Remainder,

    // Rank 0 - resolved left to right in encounter order
    /// `+`
    Addition,
    /// `-`
    Subtraction,
    /// `==`
    Equality,
    /// `!=`
    Inequality,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `&&`
    And,
    /// `||`
    Or,
    /// Terminology subsumption
    IsA,
    /// Negated terminology subsumption
    IsNotA,

    // Unary
    /// Logical not
    Not,
    /// Rule has fired
    Fired,
    /// Rule has not fired
    NotFired,
    /// Predicate: keep the instance with the greatest value
    Max,
    /// Predicate: keep the instance with the smallest value
    Min,
}

impl OperatorKind {
    /// Rank used when flattening operator chains (higher binds tighter)
    pub const fn precedence_rank(&self) -> u8 {
        match self {
            Self::Exponent => 2,
            Self::Multiplication | Self::Division | Self::Remainder => 1,
            _ => 0,
        }
    }

    /// Operators that require numeric operands and fail on null
    pub const fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Addition
                | Self::Subtraction
                | Self::Multiplication
                | Self::Division
                | Self::Exponent
                | Self::Remainder
        )
    }

    /// Ordering comparisons
    pub const fn is_relational(&self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::LessThanOrEqual | Self::GreaterThan | Self::GreaterThanOrEqual
        )
    }

    pub const fn is_equality(&self) -> bool {
        matches!(self, Self::Equality | Self::Inequality)
    }

    pub const fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Not)
    }

    pub const fn is_subsumption(&self) -> bool {
        matches!(self, Self::IsA | Self::IsNotA)
    }

    /// Operators that only take a single operand
    pub const fn is_unary(&self) -> bool {
        matches!(
            self,
            Self::Not | Self::Fired | Self::NotFired | Self::Max | Self::Min
        )
    }

    /// Get the operator symbol
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Exponent => "^",
            Self::Multiplication => "*",
            Self::Division => "/",
            Self::Remainder => "%",
            Self::Addition => "+",
            Self::Subtraction => "-",
            Self::Equality => "==",
            Self::Inequality => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::IsA => "is_a",
            Self::IsNotA => "!is_a",
            Self::Not => "!",
            Self::Fired => "fired",
            Self::NotFired => "!fired",
            Self::Max => "max",
            Self::Min => "min",
        }
    }

    /// Look up an operator by symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "^" => Self::Exponent,
            "*" => Self::Multiplication,
            "/" => Self::Division,
            "%" => Self::Remainder,
            "+" => Self::Addition,
            "-" => Self::Subtraction,
            "==" => Self::Equality,
            "!=" => Self::Inequality,
            "<" => Self::LessThan,
            "<=" => Self::LessThanOrEqual,
            ">" => Self::GreaterThan,
            ">=" => Self::GreaterThanOrEqual,
            "&&" => Self::And,
            "||" => Self::Or,
            "is_a" => Self::IsA,
            "!is_a" => Self::IsNotA,
            "!" => Self::Not,
            "fired" => Self::Fired,
            "!fired" => Self::NotFired,
            "max" => Self::Max,
            "min" => Self::Min,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        assert!(OperatorKind::Exponent.precedence_rank() > OperatorKind::Multiplication.precedence_rank());
        assert_eq!(
            OperatorKind::Multiplication.precedence_rank(),
            OperatorKind::Remainder.precedence_rank()
        );
        assert!(OperatorKind::Division.precedence_rank() > OperatorKind::Addition.precedence_rank());
        assert_eq!(OperatorKind::Addition.precedence_rank(), OperatorKind::Or.precedence_rank());
        assert_eq!(OperatorKind::LessThan.precedence_rank(), OperatorKind::And.precedence_rank());
    }

    #[test]
    fn test_symbol_round_trip() {
        for op in [
            OperatorKind::Exponent,
            OperatorKind::Remainder,
            OperatorKind::GreaterThanOrEqual,
            OperatorKind::IsNotA,
            OperatorKind::NotFired,
        ] {
            assert_eq!(OperatorKind::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(OperatorKind::from_symbol("<>"), None);
    }
}
