//! Evaluation context for a single guideline run

use chrono::{DateTime, FixedOffset};
use indexmap::IndexSet;
use octofhir_gdl_ast::Guideline;
use octofhir_gdl_types::DataInstance;
use serde_json::Value;

/// State shared by all expressions of one evaluation call: the guideline
/// being run, the rules fired so far and "now", plus what statements have
/// created along the way.
#[derive(Debug, Clone)]
pub struct EvaluationContext<'g> {
    guideline: Option<&'g Guideline>,
    fired_rules: IndexSet<String>,
    now: DateTime<FixedOffset>,
    depth: usize,
    created: Vec<DataInstance>,
    /// Element codes folded into a created instance
    claimed: IndexSet<String>,
    objects: Vec<Value>,
}

impl<'g> EvaluationContext<'g> {
    /// Create a context without a guideline
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            guideline: None,
            fired_rules: IndexSet::new(),
            now,
            depth: 0,
            created: Vec::new(),
            claimed: IndexSet::new(),
            objects: Vec::new(),
        }
    }

    /// Create a context for evaluating a guideline
    pub fn for_guideline(guideline: &'g Guideline, now: DateTime<FixedOffset>) -> Self {
        Self {
            guideline: Some(guideline),
            ..Self::new(now)
        }
    }

    pub fn guideline(&self) -> Option<&'g Guideline> {
        self.guideline
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }

    pub fn mark_fired(&mut self, rule_id: impl Into<String>) {
        self.fired_rules.insert(rule_id.into());
    }

    pub fn has_fired(&self, rule_id: &str) -> bool {
        self.fired_rules.contains(rule_id)
    }

    /// Fired rule ids in firing order
    pub fn fired_rules(&self) -> impl Iterator<Item = &str> {
        self.fired_rules.iter().map(String::as_str)
    }

    pub fn record_created(&mut self, instance: DataInstance) {
        self.created.push(instance);
    }

    pub fn created(&self) -> &[DataInstance] {
        &self.created
    }

    pub(crate) fn take_created(&mut self) -> Vec<DataInstance> {
        std::mem::take(&mut self.created)
    }

    pub(crate) fn claim(&mut self, code: impl Into<String>) {
        self.claimed.insert(code.into());
    }

    /// Whether an element code already went into a created instance
    pub(crate) fn is_claimed(&self, code: &str) -> bool {
        self.claimed.contains(code)
    }

    /// Record an object materialised from a template
    pub fn record_object(&mut self, object: Value) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[Value] {
        &self.objects
    }

    pub(crate) fn take_objects(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.objects)
    }

    /// Enter a nested evaluation. Returns false once `max_depth` is reached.
    pub(crate) fn enter(&mut self, max_depth: usize) -> bool {
        if self.depth >= max_depth {
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
