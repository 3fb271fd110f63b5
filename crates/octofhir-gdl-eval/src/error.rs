//! Evaluation errors for the GDL engine

use octofhir_gdl_ast::ResolveError;
use octofhir_gdl_types::{DataValue, ValueError};
use thiserror::Error;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur during guideline evaluation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// Invalid engine configuration, rejected at construction
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    /// Expression shape the evaluator cannot handle in this position
    #[error("Unsupported expression type: {expr_type}")]
    UnsupportedExpression { expr_type: String },

    /// Operator not applicable here or to these operand types
    #[error("Unsupported operator: {operator} for types {types}")]
    UnsupportedOperator { operator: String, types: String },

    #[error("Unsupported function: {name}")]
    UnsupportedFunction { name: String },

    /// Type mismatch error
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Attribute projection failed
    #[error("Attribute '{attribute}' not found on {type_name}")]
    AttributeNotFound { attribute: String, type_name: String },

    /// Null operand in an arithmetic operation
    #[error("Null operand not allowed for {operator}")]
    NullOperand { operator: String },

    /// The object creator could not materialise an object. Always
    /// recovered by the statement that triggered it.
    #[error("Cannot create object of model '{model_id}': {message}")]
    ObjectCreation { model_id: String, message: String },

    /// Constant raw text does not parse as its declared kind
    #[error("Invalid {kind} constant '{raw}'")]
    InvalidConstant { kind: String, raw: String },

    /// Operator chain could not be resolved
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Maximum recursion depth exceeded
    #[error("Maximum recursion depth of {max_depth} exceeded")]
    RecursionLimit { max_depth: usize },

    /// Failure inside a specific expression, with the operands involved
    #[error("Error evaluating '{expression}': {source}")]
    InExpression {
        expression: String,
        operands: Vec<DataValue>,
        #[source]
        source: Box<EvalError>,
    },
}

impl EvalError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn unsupported_expression(expr_type: impl Into<String>) -> Self {
        Self::UnsupportedExpression {
            expr_type: expr_type.into(),
        }
    }

    pub fn unsupported_operator(operator: impl Into<String>, types: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
            types: types.into(),
        }
    }

    pub fn unsupported_function(name: impl Into<String>) -> Self {
        Self::UnsupportedFunction { name: name.into() }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a null operand error
    pub fn null_operand(operator: impl Into<String>) -> Self {
        Self::NullOperand {
            operator: operator.into(),
        }
    }

    pub fn object_creation(model_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ObjectCreation {
            model_id: model_id.into(),
            message: message.into(),
        }
    }

    pub fn invalid_constant(kind: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::InvalidConstant {
            kind: kind.into(),
            raw: raw.into(),
        }
    }

    /// Attach the failing expression and its operands. Errors that already
    /// carry an expression keep the innermost one.
    pub fn in_expression(self, expression: impl Into<String>, operands: Vec<DataValue>) -> Self {
        match self {
            Self::InExpression { .. } => self,
            source => Self::InExpression {
                expression: expression.into(),
                operands,
                source: Box::new(source),
            },
        }
    }

    /// The underlying error, without expression context
    pub fn root_cause(&self) -> &EvalError {
        match self {
            Self::InExpression { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether this is a recoverable object creation failure
    pub fn is_object_creation(&self) -> bool {
        matches!(self.root_cause(), Self::ObjectCreation { .. })
    }
}

impl From<ValueError> for EvalError {
    fn from(err: ValueError) -> Self {
        match err {
            ValueError::AttributeNotFound { attribute, kind } => Self::AttributeNotFound {
                attribute,
                type_name: kind,
            },
            ValueError::Parse { kind, raw } => Self::InvalidConstant { kind, raw },
        }
    }
}
