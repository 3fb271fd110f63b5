//! Variable environment
//!
//! Each variable code maps to the list of values it has taken, oldest
//! first. Reads see the latest value; list-aware operations (`count`,
//! `sum`, `any`) see the whole history.

use indexmap::{IndexMap, IndexSet};
use octofhir_gdl_types::DataValue;
use smallvec::SmallVec;

/// Values of one variable; almost always a single entry
pub type ValueList = SmallVec<[DataValue; 1]>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableEnvironment {
    values: IndexMap<String, ValueList>,
    /// Codes written by statements (as opposed to projected inputs)
    written: IndexSet<String>,
    /// Codes written by the firing in progress
    firing: IndexSet<String>,
}

impl VariableEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest value of a variable
    pub fn latest(&self, code: &str) -> Option<&DataValue> {
        self.values.get(code).and_then(|list| list.last())
    }

    /// All values of a variable, oldest first
    pub fn values(&self, code: &str) -> &[DataValue] {
        self.values.get(code).map(|list| list.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.values.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DataValue])> {
        self.values.iter().map(|(code, list)| (code.as_str(), list.as_slice()))
    }

    /// Append a projected input value
    pub fn insert(&mut self, code: impl Into<String>, value: DataValue) {
        self.values.entry(code.into()).or_default().push(value);
    }

    /// Rebind a variable to a single value, as a scoped local
    pub fn bind(&mut self, code: impl Into<String>, value: DataValue) {
        let mut list = ValueList::new();
        list.push(value);
        self.values.insert(code.into(), list);
    }

    /// Append a statement result, always as a new entry
    pub fn append(&mut self, code: impl Into<String>, value: DataValue) {
        let code = code.into();
        self.values.entry(code.clone()).or_default().push(value);
        self.firing.insert(code.clone());
        self.written.insert(code);
    }

    /// Store a statement result. The first write of a firing appends; later
    /// writes of the same firing replace that entry.
    pub fn write(&mut self, code: impl Into<String>, value: DataValue) {
        let code = code.into();
        let list = self.values.entry(code.clone()).or_default();
        match list.last_mut() {
            Some(last) if self.firing.contains(&code) => *last = value,
            _ => list.push(value),
        }
        self.firing.insert(code.clone());
        self.written.insert(code);
    }

    /// Start a new firing: subsequent writes append again
    pub fn begin_firing(&mut self) {
        self.firing.clear();
    }

    /// Whether the variable was written by a statement
    pub fn was_written(&self, code: &str) -> bool {
        self.written.contains(code)
    }

    pub fn written_codes(&self) -> impl Iterator<Item = &str> {
        self.written.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_latest_is_last_appended() {
        let mut env = VariableEnvironment::new();
        env.insert("gt0001", DataValue::Int(1));
        env.insert("gt0001", DataValue::Int(2));
        assert_eq!(env.latest("gt0001"), Some(&DataValue::Int(2)));
        assert_eq!(env.values("gt0001"), &[DataValue::Int(1), DataValue::Int(2)]);
        assert!(env.values("gt9999").is_empty());
        assert!(!env.was_written("gt0001"));
    }

    #[test]
    fn test_writes_within_one_firing_replace() {
        let mut env = VariableEnvironment::new();
        env.insert("gt0005", DataValue::Int(1));

        env.begin_firing();
        env.write("gt0005", DataValue::Count(2));
        env.write("gt0005", DataValue::quantity(2.0, "m2", 0));
        assert_eq!(env.values("gt0005").len(), 2);

        env.begin_firing();
        env.write("gt0005", DataValue::Count(3));
        assert_eq!(env.values("gt0005").len(), 3);
        assert_eq!(env.latest("gt0005"), Some(&DataValue::Count(3)));
        assert_eq!(env.written_codes().collect::<Vec<_>>(), ["gt0005"]);
    }

    #[test]
    fn test_append_never_replaces() {
        let mut env = VariableEnvironment::new();
        env.begin_firing();
        env.append("gt0100", DataValue::Int(1));
        env.append("gt0100", DataValue::Int(2));
        assert_eq!(env.values("gt0100").len(), 2);
    }
}
