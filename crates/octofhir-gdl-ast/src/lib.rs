//! GDL expression trees and guideline definitions
//!
//! This crate defines the already-parsed form of a GDL guideline:
//! - Expression items (constants, variables, operators, assignments, templates)
//! - Operators with their precedence ranks
//! - The resolver that turns flat operator chains into binary trees
//! - Guideline structure: bindings, rules, ontology, templates and cards

mod card;
mod constant;
mod error;
mod expression;
mod guideline;
mod operator;
mod precedence;

pub use card::*;
pub use constant::*;
pub use error::*;
pub use expression::*;
pub use guideline::*;
pub use operator::*;
