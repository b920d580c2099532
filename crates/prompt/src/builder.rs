//! Prompt rendering.

use crate::loader::load_template;
use quorum_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;
use std::path::Path;

/// Resolve a template by id and render it with the given variables.
pub fn render(
    workspace: &Path,
    id: &str,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    let template = load_template(workspace, id)?;
    render_template(&template, variables)
}

/// Render a Handlebars template string with variables.
///
/// HTML escaping is disabled: the output is prompt text, not markup.
pub fn render_template(
    template: &str,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{DISPATCHER_ID, SPECIALIST_CONTEXT_TEMPLATE};
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_template_substitutes() {
        let rendered =
            render_template("Hello {{name}}!", &vars(&[("name", "world")])).unwrap();
        assert_eq!(rendered, "Hello world!");
    }

    #[test]
    fn test_render_no_html_escaping() {
        let rendered =
            render_template("{{text}}", &vars(&[("text", "a < b && c > d")])).unwrap();
        assert_eq!(rendered, "a < b && c > d");
    }

    #[test]
    fn test_render_dispatcher_by_id() {
        let temp_dir = TempDir::new().unwrap();
        let rendered = render(
            temp_dir.path(),
            DISPATCHER_ID,
            &vars(&[
                ("agent_list", "- id: a1, name: HR"),
                ("query", "How do I request leave?"),
            ]),
        )
        .unwrap();

        assert!(rendered.contains("- id: a1, name: HR"));
        assert!(rendered.contains("How do I request leave?"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_specialist_context_conditional() {
        let with_context = render_template(
            SPECIALIST_CONTEXT_TEMPLATE,
            &vars(&[("query", "q"), ("context", "[policy.txt]\nsome text")]),
        )
        .unwrap();
        assert!(with_context.contains("Reference material"));
        assert!(with_context.contains("policy.txt"));

        let without_context = render_template(
            SPECIALIST_CONTEXT_TEMPLATE,
            &vars(&[("query", "q"), ("context", "")]),
        )
        .unwrap();
        assert!(!without_context.contains("Reference material"));
        assert!(without_context.contains("Question: q"));
    }
}
