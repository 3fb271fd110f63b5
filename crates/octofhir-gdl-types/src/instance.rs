//! Data instances: path-addressed clinical records

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::DataValue;

/// A clinical record of one model (archetype/resource type), holding
/// values addressed by path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataInstance {
    /// Model identifier, e.g. `openEHR-EHR-OBSERVATION.body_weight.v1`
    pub model_id: String,
    /// Values by path, in insertion order
    pub values: IndexMap<String, DataValue>,
}

impl DataInstance {
    /// Create an empty instance of a model
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            values: IndexMap::new(),
        }
    }

    /// Builder-style setter
    pub fn with(mut self, path: impl Into<String>, value: DataValue) -> Self {
        self.set(path, value);
        self
    }

    pub fn get(&self, path: &str) -> Option<&DataValue> {
        self.values.get(path)
    }

    pub fn set(&mut self, path: impl Into<String>, value: DataValue) {
        self.values.insert(path.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Path to value-list view used when evaluating predicates against a
    /// single instance
    pub fn flattened(&self) -> IndexMap<String, Vec<DataValue>> {
        self.values
            .iter()
            .map(|(path, value)| (path.clone(), vec![value.clone()]))
            .collect()
    }

    /// Fold another instance of the same model into this one; values at
    /// paths present in both are taken from `other`.
    pub fn merge(&mut self, other: DataInstance) {
        for (path, value) in other.values {
            self.values.insert(path, value);
        }
    }
}
