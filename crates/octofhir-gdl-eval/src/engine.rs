//! GDL Evaluation Engine
//!
//! This module provides the main GdlEngine struct which evaluates GDL
//! expression items against a variable environment.

use chrono::NaiveDate;
use octofhir_gdl_ast::{
    Constant, ConstantKind, ExpressionItem, FunctionalExpression, Guideline, OperatorKind,
    ReferenceVariable, UnaryExpression, Variable,
};
use octofhir_gdl_types::{
    CodePhrase, DataValue, DvCodedText, DvDateTime, DvOrdinal, DvQuantity, TimePeriod, TimeUnit,
    parse_boolean,
};

use crate::config::EngineConfig;
use crate::context::EvaluationContext;
use crate::creator::{MapObjectCreator, ObjectCreator};
use crate::environment::VariableEnvironment;
use crate::error::{EvalError, EvalResult};
use crate::operators::logical::logic_not;
use crate::operators::{aggregate, arithmetic};
use crate::terminology::SubsumptionRegistry;

/// Text returned for `$ref[n]` when the reference does not exist
pub const REFERENCE_NOT_FOUND: &str = "Reference not found";

/// Variable code bound to the evaluation's current date-time
pub const CURRENT_DATE_TIME: &str = "currentDateTime";

/// Variable code bound to the evaluation's current date
pub const CURRENT_DATE: &str = "currentDate";

/// The main GDL evaluation engine
///
/// The engine holds only immutable services; every evaluation call owns
/// its environment and context.
pub struct GdlEngine {
    config: EngineConfig,
    subsumption: SubsumptionRegistry,
    creator: Box<dyn ObjectCreator + Send + Sync>,
}

impl Default for GdlEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GdlEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GdlEngine")
            .field("config", &self.config)
            .field("subsumption", &self.subsumption)
            .finish_non_exhaustive()
    }
}

impl GdlEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            subsumption: SubsumptionRegistry::default(),
            creator: Box::new(MapObjectCreator::default()),
        }
    }

    /// Create an engine with a validated configuration
    pub fn with_config(config: EngineConfig) -> EvalResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn with_subsumption(mut self, registry: SubsumptionRegistry) -> Self {
        self.subsumption = registry;
        self
    }

    pub fn with_object_creator(mut self, creator: impl ObjectCreator + Send + Sync + 'static) -> Self {
        self.creator = Box::new(creator);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn subsumption(&self) -> &SubsumptionRegistry {
        &self.subsumption
    }

    pub(crate) fn creator(&self) -> &(dyn ObjectCreator + Send + Sync) {
        self.creator.as_ref()
    }

    /// Create a context with "now" resolved from the configuration
    pub fn context<'g>(&self, guideline: Option<&'g Guideline>) -> EvaluationContext<'g> {
        let now = self.config.now();
        match guideline {
            Some(guideline) => EvaluationContext::for_guideline(guideline, now),
            None => EvaluationContext::new(now),
        }
    }

    /// Main expression evaluation dispatcher
    ///
    /// Statements (assignments, instance creation, templates) are not
    /// expressions and are rejected here; see [`GdlEngine::execute`].
    pub fn evaluate(
        &self,
        item: &ExpressionItem,
        env: &VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<DataValue> {
        if !ctx.enter(self.config.max_depth) {
            return Err(EvalError::RecursionLimit {
                max_depth: self.config.max_depth,
            });
        }
        log::trace!("evaluating {item}");

        let result = match item {
            ExpressionItem::Constant(c) => self.eval_constant(c),
            ExpressionItem::Variable(v) => self.eval_variable(v, env, ctx),
            ExpressionItem::ReferenceVariable(r) => Ok(self.eval_reference(r, ctx)),
            ExpressionItem::Unary(u) => self.eval_unary(u, env, ctx),
            ExpressionItem::Binary(b) => self.eval_binary(b, env, ctx),
            ExpressionItem::Long(l) => {
                let binary = l.to_binary()?;
                self.eval_binary(&binary, env, ctx)
            }
            ExpressionItem::Functional(f) => self.eval_function(f, env, ctx),
            ExpressionItem::Any(a) => self.eval_any(a, env, ctx),
            ExpressionItem::Assignment(_)
            | ExpressionItem::CreateInstance(_)
            | ExpressionItem::UseTemplate(_) => {
                Err(EvalError::unsupported_expression(item.kind_name()))
            }
        };

        ctx.exit();
        result
    }

    /// Evaluate an expression as a condition: only literal `true` passes
    pub fn evaluate_condition(
        &self,
        item: &ExpressionItem,
        env: &VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<bool> {
        let value = self.evaluate(item, env, ctx)?;
        Ok(matches!(value, DataValue::Boolean(true)))
    }

    // ========================================================================
    // Constants
    // ========================================================================

    fn eval_constant(&self, constant: &Constant) -> EvalResult<DataValue> {
        let raw = constant.raw.trim();
        let invalid = || EvalError::invalid_constant(format!("{:?}", constant.kind), raw);

        let value = match constant.kind {
            ConstantKind::Null => DataValue::Null,
            ConstantKind::Boolean => DataValue::Boolean(parse_boolean(raw).ok_or_else(invalid)?),
            ConstantKind::Integer => DataValue::Int(raw.parse().map_err(|_| invalid())?),
            ConstantKind::Double => DataValue::Double(raw.parse().map_err(|_| invalid())?),
            ConstantKind::String => DataValue::String(constant.raw.clone()),
            ConstantKind::Count => DataValue::Count(raw.parse().map_err(|_| invalid())?),
            ConstantKind::Quantity => {
                let quantity = DvQuantity::parse(raw)?;
                match TimeUnit::from_symbol(&quantity.units) {
                    Some(unit) => DataValue::Duration(TimePeriod::new(quantity.magnitude, unit)),
                    None => DataValue::Quantity(quantity),
                }
            }
            ConstantKind::Ordinal => DataValue::Ordinal(DvOrdinal::parse(raw)?),
            ConstantKind::CodedText => DataValue::CodedText(DvCodedText::parse(raw)?),
            ConstantKind::CodePhrase => {
                let code = CodePhrase::parse(raw)?;
                DataValue::CodedText(DvCodedText::new(code.code.clone(), code))
            }
            ConstantKind::Date => DataValue::Date(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?,
            ),
            ConstantKind::DateTime => DataValue::DateTime(DvDateTime::parse(raw)?),
            ConstantKind::Duration => DataValue::Duration(TimePeriod::parse(raw)?),
        };
        Ok(value)
    }

    // ========================================================================
    // Variables
    // ========================================================================

    pub(crate) fn eval_variable(
        &self,
        variable: &Variable,
        env: &VariableEnvironment,
        ctx: &EvaluationContext<'_>,
    ) -> EvalResult<DataValue> {
        let key = variable
            .key()
            .ok_or_else(|| EvalError::unsupported_expression("Variable without code or path"))?;
        let attribute = variable.attribute.as_deref();

        match attribute {
            Some("count") => return Ok(DataValue::Int(env.values(key).len() as i64)),
            Some("sum") => return aggregate::sum_values(env.values(key)),
            Some("null_flavor") => {
                let flavor = env.latest(&null_flavor_key(key)).cloned();
                return Ok(flavor.unwrap_or(DataValue::Null));
            }
            _ => {}
        }

        let value = match key {
            CURRENT_DATE_TIME => Some(DataValue::DateTime(DvDateTime::zoned(ctx.now()))),
            CURRENT_DATE => Some(DataValue::Date(ctx.now().date_naive())),
            _ => env.latest(key).cloned(),
        };

        let Some(value) = value else {
            // Unknown magnitudes read as zero
            return Ok(match attribute {
                Some("magnitude") => DataValue::Double(0.0),
                _ => DataValue::Null,
            });
        };

        match attribute {
            None => Ok(value),
            Some("string") => Ok(DataValue::Text(self.render_string(&value))),
            Some(name) => Ok(value.attribute(name)?),
        }
    }

    /// Text rendering used by the `string` attribute
    pub(crate) fn render_string(&self, value: &DataValue) -> String {
        match (value, self.config.date_time_format.as_deref()) {
            (DataValue::Date(date), Some(pattern)) => date.format(pattern).to_string(),
            (DataValue::DateTime(dt), Some(pattern)) => dt.format(pattern),
            _ => value.to_string(),
        }
    }

    pub(crate) fn eval_reference(&self, reference: &ReferenceVariable, ctx: &EvaluationContext<'_>) -> DataValue {
        let found = ctx.guideline().and_then(|g| g.reference(reference.index));
        let text = match (found, reference.attribute.as_deref()) {
            (Some(r), Some("url")) => r.url.clone(),
            (Some(r), _) => Some(r.label.clone()),
            (None, _) => None,
        };
        DataValue::String(text.unwrap_or_else(|| REFERENCE_NOT_FOUND.to_string()))
    }

    // ========================================================================
    // Unary operators and functions
    // ========================================================================

    fn eval_unary(
        &self,
        expr: &UnaryExpression,
        env: &VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<DataValue> {
        match expr.operator {
            OperatorKind::Fired | OperatorKind::NotFired => {
                let rule_id = match expr.operand.as_ref() {
                    ExpressionItem::Variable(v) => v.key(),
                    _ => None,
                }
                .ok_or_else(|| EvalError::type_mismatch("rule reference", expr.operand.kind_name()))?;
                let fired = ctx.has_fired(rule_id);
                Ok(DataValue::Boolean(if expr.operator == OperatorKind::Fired {
                    fired
                } else {
                    !fired
                }))
            }
            OperatorKind::Not => {
                let operand = self.evaluate(&expr.operand, env, ctx)?;
                logic_not(&operand)
                    .map_err(|e| e.in_expression(format!("!({})", expr.operand), vec![operand.clone()]))
            }
            op @ (OperatorKind::Max | OperatorKind::Min) => Err(EvalError::unsupported_operator(
                op.symbol(),
                "predicate operator outside data binding filtering",
            )),
            op => Err(EvalError::unsupported_operator(op.symbol(), "unary use")),
        }
    }

    fn eval_function(
        &self,
        expr: &FunctionalExpression,
        env: &VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<DataValue> {
        let function = arithmetic::math_function(&expr.function)
            .ok_or_else(|| EvalError::unsupported_function(&expr.function))?;
        let arg = expr
            .args
            .first()
            .ok_or_else(|| EvalError::type_mismatch("one argument", "none"))?;
        let value = self.evaluate(arg, env, ctx)?;

        let number = match &value {
            DataValue::Null => Err(EvalError::null_operand(&expr.function)),
            other => crate::operators::to_double(other, ctx.now())
                .ok_or_else(|| EvalError::type_mismatch("number", other.kind().name())),
        }
        .map_err(|e| e.in_expression(ExpressionItem::Functional(expr.clone()).to_string(), vec![value.clone()]))?;

        Ok(DataValue::Double(function(number)))
    }
}

/// Environment key holding a variable's null flavour
pub(crate) fn null_flavor_key(code: &str) -> String {
    format!("{code}.null_flavor")
}
