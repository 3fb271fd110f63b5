//! Statement execution
//!
//! Assignments write the environment. The attribute on the left-hand side
//! decides how the right-hand value is coerced: `magnitude`, `units` and
//! `precision` build up a quantity piece by piece, `null_flavor` records
//! why a value is missing and `value` stores a plain value.

use octofhir_gdl_ast::{AssignmentExpression, CreateInstanceExpression, DataBinding, ExpressionItem};
use octofhir_gdl_types::{
    DataInstance, DataValue, DvCodedText, DvDateTime, DvQuantity, ValueKind, parse_boolean,
};
use serde_json::Map;

use crate::context::EvaluationContext;
use crate::engine::{GdlEngine, null_flavor_key};
use crate::environment::VariableEnvironment;
use crate::error::{EvalError, EvalResult};
use crate::operators::require_number;

impl GdlEngine {
    /// Execute a statement against the environment.
    ///
    /// Object creation failures are logged and swallowed; every other
    /// error is returned with the statement attached.
    pub fn execute(
        &self,
        item: &ExpressionItem,
        env: &mut VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<()> {
        log::trace!("executing {item}");
        let result = match item {
            ExpressionItem::Assignment(a) => self.perform_assignment(a, env, ctx),
            ExpressionItem::CreateInstance(c) => self.create_instance(c, env, ctx),
            ExpressionItem::UseTemplate(t) => self.use_template(t, env, ctx),
            other => Err(EvalError::unsupported_expression(other.kind_name())),
        };

        match result {
            Err(e) if e.is_object_creation() => {
                log::warn!("{item}: {e}");
                Ok(())
            }
            other => other.map_err(|e| e.in_expression(item.to_string(), vec![])),
        }
    }

    /// Evaluate the right-hand side and store it under the target variable.
    ///
    /// Only `magnitude`, `units`, `precision`, `null_flavor` and `value` are
    /// writable; any other attribute fails with `AttributeNotFound` naming
    /// the kind of the target's current value (or its type hint).
    pub(crate) fn perform_assignment(
        &self,
        assignment: &AssignmentExpression,
        env: &mut VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<()> {
        let code = assignment
            .variable
            .key()
            .ok_or_else(|| EvalError::unsupported_expression("assignment without target variable"))?
            .to_string();
        let rhs = self.evaluate(&assignment.rhs, env, ctx)?;
        let hint = ctx.guideline().and_then(|g| g.type_hint(&code));
        let current = env.latest(&code).cloned();

        match assignment.variable.attribute.as_deref() {
            Some("magnitude") => {
                let magnitude = numeric_rhs(&rhs, ctx)?;
                let value = match current {
                    Some(DataValue::Quantity(q)) => DataValue::Quantity(DvQuantity { magnitude, ..q }),
                    _ if hint == Some(ValueKind::Quantity) => DataValue::quantity(magnitude, "", 0),
                    _ => DataValue::Count(magnitude.trunc() as i64),
                };
                env.write(code, value);
            }
            Some("units" | "unit") => {
                let units = rhs.to_string();
                let value = match current {
                    Some(DataValue::Quantity(q)) => DataValue::Quantity(DvQuantity { units, ..q }),
                    Some(DataValue::Count(c)) => DataValue::quantity(c as f64, units, 0),
                    _ => DataValue::quantity(0.0, units, 0),
                };
                env.write(code, value);
            }
            Some("precision") => {
                let precision = numeric_rhs(&rhs, ctx)?;
                if precision < 0.0 {
                    return Err(EvalError::type_mismatch("non-negative precision", precision.to_string()));
                }
                let precision = precision as u32;
                let value = match current {
                    Some(DataValue::Quantity(q)) => DataValue::Quantity(DvQuantity { precision, ..q }),
                    Some(DataValue::Count(c)) => DataValue::quantity(c as f64, "", precision),
                    _ => DataValue::quantity(0.0, "", precision),
                };
                env.write(code, value);
            }
            Some("null_flavor" | "null_flavour") => {
                let flavor = match self.resolve_term(rhs, ctx) {
                    flavor @ DataValue::CodedText(_) => flavor,
                    other => return Err(EvalError::type_mismatch("CodedText", other.kind().name())),
                };
                env.write(null_flavor_key(&code), flavor);
            }
            Some("value") => {
                let value = match self.coerce(rhs, hint, ctx) {
                    DataValue::String(s) => DataValue::Text(s),
                    other => other,
                };
                env.write(code, value);
            }
            Some(other) => {
                let kind = current.as_ref().map(DataValue::kind).or(hint).unwrap_or(ValueKind::Null);
                return Err(EvalError::AttributeNotFound {
                    attribute: other.to_string(),
                    type_name: kind.name().to_string(),
                });
            }
            None => {
                let value = self.coerce(rhs, hint, ctx);
                env.write(code, value);
            }
        }
        Ok(())
    }

    /// Plain-value coercion shared by `value` and bare assignments
    fn coerce(&self, rhs: DataValue, hint: Option<ValueKind>, ctx: &EvaluationContext<'_>) -> DataValue {
        match rhs {
            DataValue::String(s) | DataValue::Text(s) if parse_boolean(&s).is_some() => {
                DataValue::Boolean(parse_boolean(&s).unwrap_or_default())
            }
            DataValue::Int(_) | DataValue::Double(_)
                if matches!(hint, Some(ValueKind::Date | ValueKind::DateTime)) =>
            {
                epoch_value(&rhs, hint, ctx).unwrap_or(rhs)
            }
            other => self.resolve_term(other, ctx),
        }
    }

    /// Replace the text of a local coded value with its term text in the
    /// configured language
    pub(crate) fn resolve_term(&self, value: DataValue, ctx: &EvaluationContext<'_>) -> DataValue {
        let Some(guideline) = ctx.guideline() else {
            return value;
        };
        let ontology = &guideline.ontology;
        let text_for = |coded: &DvCodedText| {
            if !coded.defining_code.is_local() {
                return None;
            }
            let code = &coded.defining_code.code;
            ontology
                .term_text(&self.config().language, code)
                .or_else(|| ontology.term_text(&guideline.language, code))
                .map(str::to_string)
        };

        match value {
            DataValue::CodedText(mut coded) => {
                if let Some(text) = text_for(&coded) {
                    coded.value = text;
                }
                DataValue::CodedText(coded)
            }
            DataValue::Ordinal(mut ordinal) => {
                if let Some(text) = text_for(&ordinal.symbol) {
                    ordinal.symbol.value = text;
                }
                DataValue::Ordinal(ordinal)
            }
            other => other,
        }
    }

    /// Run the nested assignments, then fold their targets into a data
    /// instance of the declaring output binding and materialise it.
    pub(crate) fn create_instance(
        &self,
        expr: &CreateInstanceExpression,
        env: &mut VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<()> {
        let code = expr
            .variable
            .key()
            .ok_or_else(|| EvalError::unsupported_expression("create without target variable"))?
            .to_string();

        for assignment in &expr.assignments {
            self.perform_assignment(assignment, env, ctx)?;
        }

        let binding = declaring_binding(ctx, &code, expr)
            .ok_or_else(|| EvalError::object_creation(&code, "no output binding declares the instance"))?;

        let mut instance = DataInstance::new(&binding.model_id);
        for assignment in &expr.assignments {
            let Some(element_code) = assignment.variable.key() else {
                continue;
            };
            let Some(element) = binding.elements.get(element_code) else {
                continue;
            };
            if let Some(value) = env.latest(element_code) {
                instance.set(&element.path, value.clone());
            }
            if let Some(flavor) = env.latest(&null_flavor_key(element_code)) {
                instance.set(format!("{}/null_flavour", element.path), flavor.clone());
            }
            ctx.claim(element_code);
        }

        let values: Map<String, serde_json::Value> = instance
            .values
            .iter()
            .map(|(path, value)| (path.clone(), value.to_json()))
            .collect();
        let model_id = instance.model_id.clone();
        ctx.record_created(instance);

        let object = self
            .creator()
            .create(&model_id, values)
            .map_err(|e| EvalError::object_creation(e.model_id(), e.to_string()))?;
        env.append(code, DataValue::Object(object));
        Ok(())
    }
}

/// Output binding a `create` statement fills: the binding named by the
/// target, else the one declaring the target code, else the one declaring
/// the first assigned element
fn declaring_binding<'g>(
    ctx: &EvaluationContext<'g>,
    code: &str,
    expr: &CreateInstanceExpression,
) -> Option<&'g DataBinding> {
    let guideline = ctx.guideline()?;
    guideline
        .output_bindings()
        .find(|b| b.id == code)
        .or_else(|| guideline.output_binding_for(code))
        .or_else(|| {
            expr.assignments
                .iter()
                .filter_map(|a| a.variable.key())
                .find_map(|element| guideline.output_binding_for(element))
        })
}

fn numeric_rhs(rhs: &DataValue, ctx: &EvaluationContext<'_>) -> EvalResult<f64> {
    match rhs {
        DataValue::Null => Err(EvalError::type_mismatch("number", "Null")),
        other => require_number(other, ctx.now()),
    }
}

/// Epoch milliseconds as a date or date-time in the zone of "now"
fn epoch_value(rhs: &DataValue, hint: Option<ValueKind>, ctx: &EvaluationContext<'_>) -> Option<DataValue> {
    let millis = rhs.as_number()? as i64;
    let date_time = DvDateTime::from_epoch_millis(millis, Some(*ctx.now().offset()))?;
    Some(match hint {
        Some(ValueKind::Date) => DataValue::Date(date_time.to_fixed().date_naive()),
        _ => DataValue::DateTime(date_time),
    })
}
