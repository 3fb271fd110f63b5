//! Card rendering
//!
//! Cards of a fired rule are rendered against the environment as it stands
//! after the rule's actions: tokens in their texts are substituted and
//! suggested actions with a resource template get the filled resource.

use octofhir_gdl_ast::{Action, Card};

use crate::context::EvaluationContext;
use crate::engine::GdlEngine;
use crate::environment::VariableEnvironment;
use crate::template::{Token, fill_text};

impl GdlEngine {
    pub(crate) fn render_card(
        &self,
        card: &Card,
        env: &VariableEnvironment,
        ctx: &EvaluationContext<'_>,
    ) -> Card {
        let lookup = |token: &Token<'_>| self.substitute(token, env, ctx);
        let text = |raw: &str| fill_text(raw, &lookup);

        let mut rendered = card.clone();
        rendered.summary = text(&card.summary);
        rendered.detail = card.detail.as_deref().map(text);
        if let Some(source) = rendered.source.as_mut() {
            source.label = text(&source.label);
            source.url = source.url.as_deref().map(text);
        }
        for link in &mut rendered.links {
            link.label = text(&link.label);
            link.url = text(&link.url);
        }
        for suggestion in &mut rendered.suggestions {
            suggestion.label = text(&suggestion.label);
            for action in &mut suggestion.actions {
                action.description = text(&action.description);
                self.attach_resource(action, env, ctx);
            }
        }
        rendered
    }

    fn attach_resource(&self, action: &mut Action, env: &VariableEnvironment, ctx: &EvaluationContext<'_>) {
        let Some(template_id) = action.resource_template.as_deref() else {
            return;
        };
        match self.materialise_template(template_id, env, ctx) {
            Ok(resource) => action.resource = Some(resource),
            Err(e) => log::warn!("card action '{}' has no resource: {e}", action.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_gdl_ast::{Guideline, Reference, ResourceDescription, Suggestion, Template};
    use octofhir_gdl_types::DataValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_card_tokens_and_resource() {
        let engine = GdlEngine::new();
        let guideline = Guideline::new("g.v1")
            .with_description(ResourceDescription {
                purpose: None,
                references: vec![Reference::new("NICE CG181", "https://nice.org.uk/cg181")],
            })
            .with_template(Template::new(
                "gt2001",
                "MedicationRequest",
                json!({"medication": "statin", "dose": "{$gt0007.magnitude}"}),
            ));
        let mut env = VariableEnvironment::new();
        env.insert("gt0007", DataValue::quantity(20.0, "mg", 0));
        let ctx = engine.context(Some(&guideline));

        let mut card = Card::new("Dose {$gt0007} ({$ref[1]})").with_detail("See {$ref[1].url} {$gt0099}");
        card.suggestions.push(Suggestion {
            label: "Prescribe".into(),
            actions: vec![Action {
                action_type: "create".into(),
                description: "Start statin".into(),
                resource_template: Some("gt2001".into()),
                resource: None,
            }],
        });

        let rendered = engine.render_card(&card, &env, &ctx);
        assert_eq!(rendered.summary, "Dose 20,mg (NICE CG181)");
        assert_eq!(rendered.detail.as_deref(), Some("See https://nice.org.uk/cg181 {$gt0099}"));
        assert_eq!(
            rendered.suggestions[0].actions[0].resource,
            Some(json!({"medication": "statin", "dose": 20.0}))
        );
    }

    #[test]
    fn test_missing_reference() {
        let engine = GdlEngine::new();
        let guideline = Guideline::new("g.v1");
        let env = VariableEnvironment::new();
        let ctx = engine.context(Some(&guideline));
        let rendered = engine.render_card(&Card::new("{$ref[2]}"), &env, &ctx);
        assert_eq!(rendered.summary, crate::engine::REFERENCE_NOT_FOUND);
    }
}
