//! Value model errors

use thiserror::Error;

/// Errors raised while parsing or projecting values
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// The value has no attribute with this name
    #[error("Attribute '{attribute}' not found on {kind}")]
    AttributeNotFound { attribute: String, kind: String },

    /// Raw text could not be parsed as the requested value type
    #[error("Cannot parse '{raw}' as {kind}")]
    Parse { kind: String, raw: String },
}

impl ValueError {
    /// Create an attribute-not-found error
    pub fn attribute_not_found(attribute: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::AttributeNotFound {
            attribute: attribute.into(),
            kind: kind.into(),
        }
    }

    /// Create a parse error
    pub fn parse(kind: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Parse {
            kind: kind.into(),
            raw: raw.into(),
        }
    }
}
