//! Template filling and `use_template` statements
//!
//! Templates are JSON trees whose string leaves may contain tokens:
//! `{$gt0001}`, `{$gt0001.magnitude}`, `{$gt0001.all}` and `{$ref[1].url}`.
//! A string that is exactly one token is replaced by the typed JSON of the
//! value; tokens inside longer strings are replaced by the value's text.
//! Unresolved tokens are left in place.

use once_cell::sync::Lazy;
use octofhir_gdl_ast::{ReferenceVariable, UseTemplateExpression, Variable};
use octofhir_gdl_types::DataValue;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::context::EvaluationContext;
use crate::engine::GdlEngine;
use crate::environment::VariableEnvironment;
use crate::error::{EvalError, EvalResult};

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\$(?:ref\[(\d+)\]|([A-Za-z0-9_]+))(?:\.([A-Za-z_]+))?\}")
        .expect("token pattern is valid")
});

/// A token found in template text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'t> {
    Variable {
        code: &'t str,
        attribute: Option<&'t str>,
    },
    Reference {
        index: usize,
        attribute: Option<&'t str>,
    },
}

impl<'t> Token<'t> {
    fn from_captures(caps: &Captures<'t>) -> Option<Self> {
        let attribute = caps.get(3).map(|m| m.as_str());
        if let Some(index) = caps.get(1) {
            let index = index.as_str().parse().ok()?;
            return Some(Self::Reference { index, attribute });
        }
        caps.get(2).map(|code| Self::Variable {
            code: code.as_str(),
            attribute,
        })
    }
}

/// What a token resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum Substitution {
    One(DataValue),
    /// Every value of a variable (`.all`)
    All(Vec<DataValue>),
}

impl Substitution {
    pub fn to_json(&self) -> Value {
        match self {
            Self::One(value) => value.to_json(),
            Self::All(values) => Value::Array(values.iter().map(DataValue::to_json).collect()),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Self::One(value) => value.to_string(),
            Self::All(values) => values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Fill every string leaf of a JSON tree, producing a new tree
pub fn fill_json<F>(template: &Value, lookup: &F) -> Value
where
    F: Fn(&Token<'_>) -> Option<Substitution>,
{
    match template {
        Value::String(text) => fill_leaf(text, lookup),
        Value::Array(items) => Value::Array(items.iter().map(|item| fill_json(item, lookup)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), fill_json(value, lookup)))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

/// Replace tokens inside a string with text
pub fn fill_text<F>(text: &str, lookup: &F) -> String
where
    F: Fn(&Token<'_>) -> Option<Substitution>,
{
    TOKEN
        .replace_all(text, |caps: &Captures<'_>| {
            Token::from_captures(caps)
                .and_then(|token| lookup(&token))
                .map(|substitution| substitution.to_text())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn fill_leaf<F>(text: &str, lookup: &F) -> Value
where
    F: Fn(&Token<'_>) -> Option<Substitution>,
{
    if let Some(caps) = TOKEN.captures(text) {
        let whole = caps.get(0).is_some_and(|m| m.start() == 0 && m.end() == text.len());
        if whole {
            if let Some(substitution) = Token::from_captures(&caps).and_then(|token| lookup(&token)) {
                return substitution.to_json();
            }
            return Value::String(text.to_string());
        }
    }
    Value::String(fill_text(text, lookup))
}

impl GdlEngine {
    /// Resolve a template token against the environment
    pub(crate) fn substitute(
        &self,
        token: &Token<'_>,
        env: &VariableEnvironment,
        ctx: &EvaluationContext<'_>,
    ) -> Option<Substitution> {
        match token {
            Token::Reference { index, attribute } => {
                let reference = ReferenceVariable {
                    index: *index,
                    attribute: attribute.map(str::to_string),
                };
                Some(Substitution::One(self.eval_reference(&reference, ctx)))
            }
            Token::Variable {
                code,
                attribute: Some("all"),
            } => {
                let values = env.values(code);
                (!values.is_empty()).then(|| Substitution::All(values.to_vec()))
            }
            Token::Variable { code, attribute } => {
                if !env.contains(code) {
                    return None;
                }
                let mut variable = Variable::code(*code);
                variable.attribute = attribute.map(str::to_string);
                self.eval_variable(&variable, env, ctx).ok().map(Substitution::One)
            }
        }
    }

    /// Fill a JSON tree from the environment
    pub(crate) fn fill_from_env(
        &self,
        template: &Value,
        env: &VariableEnvironment,
        ctx: &EvaluationContext<'_>,
    ) -> Value {
        fill_json(template, &|token: &Token<'_>| self.substitute(token, env, ctx))
    }

    /// Fill a guideline template and hand it to the object creator
    pub(crate) fn materialise_template(
        &self,
        template_id: &str,
        env: &VariableEnvironment,
        ctx: &EvaluationContext<'_>,
    ) -> EvalResult<Value> {
        let template = ctx
            .guideline()
            .and_then(|g| g.templates.get(template_id))
            .ok_or_else(|| EvalError::object_creation(template_id, "template not found"))?;

        let filled = match self.fill_from_env(&template.object, env, ctx) {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        self.creator()
            .create(&template.model_id, filled)
            .map_err(|e| EvalError::object_creation(e.model_id(), e.to_string()))
    }

    /// Run `use_template`: once per lock-step position of the mapped input
    /// variables, skipping positions where an `if` variable is null.
    pub(crate) fn use_template(
        &self,
        expr: &UseTemplateExpression,
        env: &mut VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<()> {
        let template_id = expr
            .variable
            .key()
            .ok_or_else(|| EvalError::unsupported_expression("use_template without template id"))?;

        let inputs: Vec<(&str, Vec<DataValue>)> = expr
            .input_variable_map
            .iter()
            .map(|(local, input)| {
                let values = input.key().map(|k| env.values(k).to_vec()).unwrap_or_default();
                (local.as_str(), values)
            })
            .collect();
        let rounds = inputs.iter().map(|(_, values)| values.len()).max().unwrap_or(0).max(1);

        let mut created = Vec::new();
        for index in 0..rounds {
            let mut scope = env.clone();
            scope.begin_firing();
            for (local, values) in &inputs {
                let value = values.get(index).or(values.last()).cloned();
                scope.bind(*local, value.unwrap_or(DataValue::Null));
            }

            let mut skip = false;
            for guard in &expr.if_variables {
                if self.eval_variable(guard, &scope, ctx)?.is_null() {
                    skip = true;
                    break;
                }
            }
            if skip {
                log::debug!("use_template {template_id}: skipping position {index}");
                continue;
            }

            for assignment in &expr.assignments {
                self.perform_assignment(assignment, &mut scope, ctx)?;
            }

            match self.materialise_template(template_id, &scope, ctx) {
                Ok(object) => created.push(object),
                Err(e) if e.is_object_creation() => {
                    log::warn!("use_template {template_id} produced no object: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        for object in created {
            ctx.record_object(object.clone());
            env.append(template_id, DataValue::Object(object));
        }
        Ok(())
    }
}
