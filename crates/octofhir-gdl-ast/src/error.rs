//! Expression resolution errors

use thiserror::Error;

/// Errors raised while turning an operator chain into a binary tree
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    /// The chain is empty, has a trailing operator, or is missing an
    /// operator between two operands
    #[error("Malformed expression '{expression}': {reason}")]
    Malformed { expression: String, reason: String },

    /// The chain holds a single operand that is not itself binary
    #[error("Expression '{expression}' does not resolve to a binary expression")]
    NotBinary { expression: String },
}

impl ResolveError {
    pub fn malformed(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    pub fn not_binary(expression: impl Into<String>) -> Self {
        Self::NotBinary {
            expression: expression.into(),
        }
    }
}
