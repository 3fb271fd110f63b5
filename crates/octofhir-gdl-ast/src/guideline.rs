//! Guideline definitions
//!
//! A guideline is consumed already structured: bindings that map model
//! paths to local variable codes, preconditions, default actions, rules
//! with when/then clauses, an ontology and output templates.

use indexmap::IndexMap;
use octofhir_gdl_types::{CodePhrase, ValueKind};
use serde::{Deserialize, Serialize};

use crate::{Card, ExpressionItem};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Guideline {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdl_version: Option<String>,
    /// Local code naming the guideline concept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
    /// Original language of the ontology
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<ResourceDescription>,
    #[serde(default)]
    pub ontology: Ontology,
    #[serde(default)]
    pub data_bindings: Vec<DataBinding>,
    #[serde(default)]
    pub pre_conditions: Vec<ExpressionItem>,
    #[serde(default)]
    pub default_actions: Vec<ExpressionItem>,
    /// Rules in declaration order
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub templates: IndexMap<String, Template>,
}

fn default_language() -> String {
    "en".to_string()
}

impl Guideline {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            language: default_language(),
            ..Self::default()
        }
    }

    pub fn with_binding(mut self, binding: DataBinding) -> Self {
        self.data_bindings.push(binding);
        self
    }

    pub fn with_pre_condition(mut self, condition: ExpressionItem) -> Self {
        self.pre_conditions.push(condition);
        self
    }

    pub fn with_default_action(mut self, action: ExpressionItem) -> Self {
        self.default_actions.push(action);
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.templates.insert(template.id.clone(), template);
        self
    }

    pub fn with_ontology(mut self, ontology: Ontology) -> Self {
        self.ontology = ontology;
        self
    }

    pub fn with_description(mut self, description: ResourceDescription) -> Self {
        self.description = Some(description);
        self
    }

    pub fn input_bindings(&self) -> impl Iterator<Item = &DataBinding> {
        self.data_bindings
            .iter()
            .filter(|b| b.binding_type == BindingType::Input)
    }

    pub fn output_bindings(&self) -> impl Iterator<Item = &DataBinding> {
        self.data_bindings
            .iter()
            .filter(|b| b.binding_type == BindingType::Output)
    }

    /// Type hint declared for a variable code by any binding
    pub fn type_hint(&self, code: &str) -> Option<ValueKind> {
        self.data_bindings
            .iter()
            .find_map(|b| b.elements.get(code).and_then(|e| e.type_hint))
    }

    /// First output binding declaring the given variable code
    pub fn output_binding_for(&self, code: &str) -> Option<&DataBinding> {
        self.output_bindings().find(|b| b.elements.contains_key(code))
    }

    /// External reference by 1-based index
    pub fn reference(&self, index: usize) -> Option<&Reference> {
        let description = self.description.as_ref()?;
        index
            .checked_sub(1)
            .and_then(|i| description.references.get(i))
    }
}

/// Descriptive metadata; only the external reference list is evaluated
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reference {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Reference {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: Some(url.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BindingType {
    #[default]
    Input,
    Output,
}

/// Maps paths of one model to local variable codes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataBinding {
    pub id: String,
    pub model_id: String,
    #[serde(default)]
    pub binding_type: BindingType,
    /// Elements by variable code
    #[serde(default)]
    pub elements: IndexMap<String, Element>,
    /// Filters applied to candidate instances before projection
    #[serde(default)]
    pub predicates: Vec<ExpressionItem>,
}

impl DataBinding {
    pub fn input(id: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model_id: model_id.into(),
            binding_type: BindingType::Input,
            ..Self::default()
        }
    }

    pub fn output(id: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            binding_type: BindingType::Output,
            ..Self::input(id, model_id)
        }
    }

    pub fn with_element(mut self, code: impl Into<String>, element: Element) -> Self {
        self.elements.insert(code.into(), element);
        self
    }

    pub fn with_predicate(mut self, predicate: ExpressionItem) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Variable code bound to a path
    pub fn code_for_path(&self, path: &str) -> Option<&str> {
        self.elements
            .iter()
            .find(|(_, e)| e.path == path)
            .map(|(code, _)| code.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Element {
    pub path: String,
    /// Declared value type, consulted by assignments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<ValueKind>,
}

impl Element {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            type_hint: None,
        }
    }

    pub fn typed(path: impl Into<String>, type_hint: ValueKind) -> Self {
        Self {
            path: path.into(),
            type_hint: Some(type_hint),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub when: Vec<ExpressionItem>,
    #[serde(default)]
    pub then: Vec<ExpressionItem>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Rule {
    pub fn new(id: impl Into<String>, priority: i32) -> Self {
        Self {
            id: id.into(),
            priority,
            ..Self::default()
        }
    }

    pub fn when(mut self, condition: ExpressionItem) -> Self {
        self.when.push(condition);
        self
    }

    pub fn then(mut self, action: ExpressionItem) -> Self {
        self.then.push(action);
        self
    }

    pub fn with_card(mut self, card: Card) -> Self {
        self.cards.push(card);
        self
    }
}

/// Output object skeleton filled by `use_template`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub model_id: String,
    pub object: serde_json::Value,
}

impl Template {
    pub fn new(id: impl Into<String>, model_id: impl Into<String>, object: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            name: None,
            model_id: model_id.into(),
            object,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ontology {
    /// Term definitions by language
    #[serde(default)]
    pub term_definitions: IndexMap<String, TermDefinition>,
    /// Term bindings by terminology id
    #[serde(default)]
    pub term_bindings: IndexMap<String, TermBinding>,
}

impl Ontology {
    pub fn with_term(
        mut self,
        language: &str,
        code: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.term_definitions
            .entry(language.to_string())
            .or_default()
            .terms
            .insert(code.into(), Term::new(text));
        self
    }

    pub fn with_binding(mut self, terminology: &str, local_code: impl Into<String>, code: CodePhrase) -> Self {
        self.term_bindings
            .entry(terminology.to_string())
            .or_default()
            .bindings
            .entry(local_code.into())
            .or_default()
            .push(code);
        self
    }

    /// Text of a local term in the given language
    pub fn term_text(&self, language: &str, code: &str) -> Option<&str> {
        self.term_definitions
            .get(language)?
            .terms
            .get(code)?
            .text
            .as_deref()
    }

    /// Codes a local term is bound to in one terminology
    pub fn bindings_in(&self, terminology: &str, local_code: &str) -> &[CodePhrase] {
        self.term_bindings
            .get(terminology)
            .and_then(|tb| tb.bindings.get(local_code))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether a local term has bindings in any terminology
    pub fn is_bound(&self, local_code: &str) -> bool {
        self.term_bindings
            .values()
            .any(|tb| tb.bindings.contains_key(local_code))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TermDefinition {
    #[serde(default)]
    pub terms: IndexMap<String, Term>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Term {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Term {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TermBinding {
    /// Bound codes by local code
    #[serde(default)]
    pub bindings: IndexMap<String, Vec<CodePhrase>>,
}
