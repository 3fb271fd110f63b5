//! Literal constants

use serde::{Deserialize, Serialize};
use std::fmt;

/// The value type a constant's raw text is parsed as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantKind {
    Null,
    Boolean,
    Integer,
    Double,
    String,
    /// `72.5,kg`
    Quantity,
    Count,
    /// `1|local::gt0005|Mild|`
    Ordinal,
    /// `local::gt0003|Present|`
    CodedText,
    /// `local::gt0003`
    CodePhrase,
    Date,
    DateTime,
    /// `1,a` / `6,mo`
    Duration,
}

/// A literal constant: kind plus raw text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub kind: ConstantKind,
    pub raw: String,
}

impl Constant {
    pub fn new(kind: ConstantKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }

    pub fn null() -> Self {
        Self::new(ConstantKind::Null, "null")
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConstantKind::String => write!(f, "'{}'", self.raw),
            ConstantKind::Null => f.write_str("null"),
            _ => f.write_str(&self.raw),
        }
    }
}
