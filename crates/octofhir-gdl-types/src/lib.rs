//! GDL value model
//!
//! This crate defines the runtime values a guideline works with:
//! - Clinical data types (Quantity, Count, Ordinal, CodedText, DateTime, ...)
//! - Raw scalars produced by expression evaluation (Int, Double, String)
//! - Calendar and fixed time periods used by temporal arithmetic
//! - Data instances, the path-addressed records guidelines read and write

mod error;
mod instance;
mod temporal;
mod value;

pub use error::*;
pub use instance::*;
pub use temporal::*;
pub use value::*;
