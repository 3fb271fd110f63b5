//! GDL expression items

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Constant, ConstantKind, OperatorKind};

/// Any node of a GDL expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExpressionItem {
    Constant(Constant),
    Variable(Variable),
    ReferenceVariable(ReferenceVariable),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    /// Flat operator chain awaiting precedence resolution
    Long(LongExpression),
    Functional(FunctionalExpression),
    Any(AnyExpression),
    Assignment(AssignmentExpression),
    CreateInstance(CreateInstanceExpression),
    UseTemplate(UseTemplateExpression),
}

impl ExpressionItem {
    pub fn constant(kind: ConstantKind, raw: impl Into<String>) -> Self {
        Self::Constant(Constant::new(kind, raw))
    }

    pub fn integer(value: i64) -> Self {
        Self::constant(ConstantKind::Integer, value.to_string())
    }

    pub fn boolean(value: bool) -> Self {
        Self::constant(ConstantKind::Boolean, value.to_string())
    }

    pub fn null() -> Self {
        Self::Constant(Constant::null())
    }

    /// Variable referenced by local code, e.g. `$gt0003`
    pub fn variable(code: impl Into<String>) -> Self {
        Self::Variable(Variable::code(code))
    }

    /// Variable attribute, e.g. `$gt0003.magnitude`
    pub fn attribute(code: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::Variable(Variable::code(code).with_attribute(attribute))
    }

    pub fn binary(left: ExpressionItem, operator: OperatorKind, right: ExpressionItem) -> Self {
        Self::Binary(BinaryExpression::new(left, operator, right))
    }

    pub fn unary(operator: OperatorKind, operand: ExpressionItem) -> Self {
        Self::Unary(UnaryExpression {
            operator,
            operand: Box::new(operand),
        })
    }

    pub fn function(name: impl Into<String>, args: Vec<ExpressionItem>) -> Self {
        Self::Functional(FunctionalExpression {
            function: name.into(),
            args,
        })
    }

    pub fn assign(variable: Variable, rhs: ExpressionItem) -> Self {
        Self::Assignment(AssignmentExpression::new(variable, rhs))
    }

    /// Human-readable name of the node kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Constant(_) => "Constant",
            Self::Variable(_) => "Variable",
            Self::ReferenceVariable(_) => "ReferenceVariable",
            Self::Unary(_) => "UnaryExpression",
            Self::Binary(_) => "BinaryExpression",
            Self::Long(_) => "LongExpression",
            Self::Functional(_) => "FunctionalExpression",
            Self::Any(_) => "AnyExpression",
            Self::Assignment(_) => "AssignmentExpression",
            Self::CreateInstance(_) => "CreateInstanceExpression",
            Self::UseTemplate(_) => "UseTemplateExpression",
        }
    }

    fn needs_parens(&self) -> bool {
        matches!(self, Self::Binary(_) | Self::Long(_))
    }
}

/// A data-bound variable. `code` is the local code (`gt0003`), `path` is
/// used by predicates that address instance data directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Variable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Variable {
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Environment key: the code, falling back to the path
    pub fn key(&self) -> Option<&str> {
        self.code.as_deref().or(self.path.as_deref())
    }

    /// Same variable without the attribute
    pub fn without_attribute(&self) -> Self {
        Self {
            attribute: None,
            ..self.clone()
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.path) {
            (Some(code), _) => write!(f, "${code}")?,
            (None, Some(path)) => f.write_str(path)?,
            (None, None) => f.write_str("$")?,
        }
        if let Some(attribute) = &self.attribute {
            write!(f, ".{attribute}")?;
        }
        Ok(())
    }
}

/// Reference to an entry of the guideline's resource description,
/// e.g. `$ref[1].url`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceVariable {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpression {
    pub operator: OperatorKind,
    pub operand: Box<ExpressionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub left: Box<ExpressionItem>,
    pub operator: OperatorKind,
    pub right: Box<ExpressionItem>,
}

impl BinaryExpression {
    pub fn new(left: ExpressionItem, operator: OperatorKind, right: ExpressionItem) -> Self {
        Self {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }
}

/// One operand of a flat chain and the operator following it (`None` for
/// the last operand)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionOperatorPair {
    pub item: ExpressionItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<OperatorKind>,
}

impl ExpressionOperatorPair {
    pub fn new(item: ExpressionItem, operator: Option<OperatorKind>) -> Self {
        Self { item, operator }
    }
}

/// Flat chain such as `$a+$b*$c-$d`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LongExpression {
    pub items: Vec<ExpressionOperatorPair>,
}

impl LongExpression {
    pub fn new(items: Vec<ExpressionOperatorPair>) -> Self {
        Self { items }
    }

    /// Append an operand, attaching `operator` to the previous operand
    pub fn push(mut self, operator: OperatorKind, item: ExpressionItem) -> Self {
        if let Some(last) = self.items.last_mut() {
            last.operator = Some(operator);
        }
        self.items.push(ExpressionOperatorPair::new(item, None));
        self
    }

    /// Start a chain from its first operand
    pub fn starting_with(item: ExpressionItem) -> Self {
        Self {
            items: vec![ExpressionOperatorPair::new(item, None)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalExpression {
    pub function: String,
    pub args: Vec<ExpressionItem>,
}

/// `any[$a,$b](operand)`: true when the operand holds for any index across
/// the bound value lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnyExpression {
    pub input_variables: Vec<Variable>,
    pub operand: Box<ExpressionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentExpression {
    pub variable: Variable,
    pub rhs: Box<ExpressionItem>,
}

impl AssignmentExpression {
    pub fn new(variable: Variable, rhs: ExpressionItem) -> Self {
        Self {
            variable,
            rhs: Box::new(rhs),
        }
    }
}

/// `$x.create(...)`: build a new output instance from nested assignments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInstanceExpression {
    pub variable: Variable,
    pub assignments: Vec<AssignmentExpression>,
}

/// `use_template($x(...))`: fill a guideline template and emit the result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseTemplateExpression {
    /// Template id as the variable code
    pub variable: Variable,
    #[serde(default)]
    pub assignments: Vec<AssignmentExpression>,
    /// Indices where any of these is null are skipped
    #[serde(default)]
    pub if_variables: Vec<Variable>,
    /// Template variable code to the input variable iterated for it
    #[serde(default)]
    pub input_variable_map: IndexMap<String, Variable>,
}

impl fmt::Display for ExpressionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(c) => write!(f, "{c}"),
            Self::Variable(v) => write!(f, "{v}"),
            Self::ReferenceVariable(r) => {
                write!(f, "$ref[{}]", r.index)?;
                if let Some(attribute) = &r.attribute {
                    write!(f, ".{attribute}")?;
                }
                Ok(())
            }
            Self::Unary(u) => match u.operator {
                OperatorKind::Not => write!(f, "!({})", u.operand),
                op => write!(f, "{}({})", op.symbol(), u.operand),
            },
            Self::Binary(b) => write!(f, "{b}"),
            Self::Long(l) => write!(f, "{l}"),
            Self::Functional(func) => {
                write!(f, "{}(", func.function)?;
                write_joined(f, &func.args, ",")?;
                f.write_str(")")
            }
            Self::Any(any) => {
                f.write_str("any[")?;
                write_joined(f, &any.input_variables, ",")?;
                write!(f, "]({})", any.operand)
            }
            Self::Assignment(a) => write!(f, "{a}"),
            Self::CreateInstance(c) => {
                write!(f, "{}.create(", c.variable)?;
                write_joined(f, &c.assignments, ";")?;
                f.write_str(")")
            }
            Self::UseTemplate(t) => {
                write!(f, "use_template({}(", t.variable)?;
                write_joined(f, &t.assignments, ";")?;
                f.write_str("))")
            }
        }
    }
}

impl fmt::Display for BinaryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_operand(f, &self.left)?;
        f.write_str(self.operator.symbol())?;
        write_operand(f, &self.right)
    }
}

impl fmt::Display for LongExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pair in &self.items {
            write_operand(f, &pair.item)?;
            if let Some(op) = pair.operator {
                f.write_str(op.symbol())?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for AssignmentExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.variable, self.rhs)
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, item: &ExpressionItem) -> fmt::Result {
    if item.needs_parens() {
        write!(f, "({item})")
    } else {
        write!(f, "{item}")
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
