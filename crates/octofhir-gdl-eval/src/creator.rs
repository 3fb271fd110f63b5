//! Object creation capability
//!
//! Templates, `create` statements and card actions hand their filled values
//! to an [`ObjectCreator`], which turns them into an external object. The
//! default creator produces an ordered JSON map.

use indexmap::IndexSet;
use serde_json::{Map, Value};
use thiserror::Error;

/// Recoverable failure to materialise an object
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CreationError {
    #[error("Unknown model '{model_id}'")]
    UnknownModel { model_id: String },

    #[error("Invalid values for model '{model_id}': {message}")]
    InvalidValues { model_id: String, message: String },
}

impl CreationError {
    pub fn model_id(&self) -> &str {
        match self {
            Self::UnknownModel { model_id } | Self::InvalidValues { model_id, .. } => model_id,
        }
    }
}

/// Builds an external object of a model from named values
pub trait ObjectCreator {
    fn create(&self, model_id: &str, values: Map<String, Value>) -> Result<Value, CreationError>;
}

/// Creates ordered JSON maps, optionally only for a known set of models
#[derive(Debug, Clone, Default)]
pub struct MapObjectCreator {
    known_models: Option<IndexSet<String>>,
    type_field: Option<String>,
}

impl MapObjectCreator {
    /// Only accept the given model ids
    pub fn restricted_to<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_models: Some(models.into_iter().map(Into::into).collect()),
            type_field: None,
        }
    }

    /// Write the model id into each created object under this field
    /// (e.g. `resourceType`)
    pub fn with_type_field(mut self, field: impl Into<String>) -> Self {
        self.type_field = Some(field.into());
        self
    }
}

impl ObjectCreator for MapObjectCreator {
    fn create(&self, model_id: &str, values: Map<String, Value>) -> Result<Value, CreationError> {
        let unknown = match &self.known_models {
            Some(known) => !known.contains(model_id),
            None => model_id.trim().is_empty(),
        };
        if unknown {
            return Err(CreationError::UnknownModel {
                model_id: model_id.to_string(),
            });
        }

        let mut object = Map::new();
        if let Some(field) = &self.type_field {
            object.insert(field.clone(), Value::String(model_id.to_string()));
        }
        object.extend(values);
        Ok(Value::Object(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preserves_order_and_type_field() {
        let creator = MapObjectCreator::default().with_type_field("resourceType");
        let mut values = Map::new();
        values.insert("status".into(), json!("active"));
        values.insert("code".into(), json!("E10"));

        let object = creator.create("Condition", values).unwrap();
        let keys: Vec<_> = object.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["resourceType", "status", "code"]);
    }

    #[test]
    fn test_unknown_model() {
        let creator = MapObjectCreator::restricted_to(["MedicationRequest"]);
        assert_eq!(
            creator.create("Observation", Map::new()),
            Err(CreationError::UnknownModel {
                model_id: "Observation".into()
            })
        );
        assert!(MapObjectCreator::default().create("", Map::new()).is_err());
    }
}
