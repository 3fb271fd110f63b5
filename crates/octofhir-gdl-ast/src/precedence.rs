//! Operator precedence resolution for flat operator chains
//!
//! A [`LongExpression`] is an ordered list of operands, each followed by the
//! operator that joins it to the next one. Resolution repeatedly merges the
//! leftmost operand whose trailing operator has the highest rank still
//! present with its right neighbour, so `^` binds before `* / %`, which bind
//! before every other operator, and equal ranks group left to right.

use crate::{BinaryExpression, ExpressionItem, LongExpression, OperatorKind, ResolveError};

impl LongExpression {
    /// Resolve the chain into a single binary tree. The chain itself is left
    /// untouched.
    pub fn to_binary(&self) -> Result<BinaryExpression, ResolveError> {
        let Some(last) = self.items.last() else {
            return Err(ResolveError::malformed(self.to_string(), "empty expression"));
        };
        if last.operator.is_some() {
            return Err(ResolveError::malformed(self.to_string(), "dangling operator"));
        }

        let mut working = Vec::with_capacity(self.items.len());
        for (i, pair) in self.items.iter().enumerate() {
            match pair.operator {
                Some(op) => working.push((pair.item.clone(), Some(op))),
                None if i + 1 == self.items.len() => working.push((pair.item.clone(), None)),
                None => {
                    return Err(ResolveError::malformed(self.to_string(), "missing operator"));
                }
            }
        }

        while working.len() > 1 {
            let index = highest_rank_position(&working);
            let (right, trailing) = working.remove(index + 1);
            let (left, operator) = working.remove(index);
            let operator = operator
                .ok_or_else(|| ResolveError::malformed(self.to_string(), "missing operator"))?;
            let merged = ExpressionItem::Binary(BinaryExpression::new(left, operator, right));
            working.insert(index, (merged, trailing));
        }

        match working.pop() {
            Some((ExpressionItem::Binary(binary), None)) => Ok(binary),
            Some((ExpressionItem::Long(inner), None)) => inner.to_binary(),
            Some((item, _)) => Err(ResolveError::not_binary(item.to_string())),
            None => Err(ResolveError::malformed(self.to_string(), "empty expression")),
        }
    }
}

/// Index of the first operand whose trailing operator carries the highest
/// rank in the chain
fn highest_rank_position(working: &[(ExpressionItem, Option<OperatorKind>)]) -> usize {
    let rank_at = |op: &Option<OperatorKind>| op.map(|o| o.precedence_rank());
    let highest = working.iter().filter_map(|(_, op)| rank_at(op)).max();
    working
        .iter()
        .position(|(_, op)| rank_at(op) == highest)
        .unwrap_or(0)
}
