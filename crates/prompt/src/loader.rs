//! Prompt template loading with workspace overrides.
//!
//! A template is resolved by id: a file at `.quorum/prompts/<id>.md` wins,
//! otherwise the built-in template is used.

use crate::templates;
use quorum_core::{AppError, AppResult};
use std::path::Path;

/// Load a template by id, preferring a workspace override.
///
/// # Arguments
/// * `workspace` - Root workspace directory containing `.quorum/`
/// * `id` - Template identifier (e.g., "dispatcher.route")
pub fn load_template(workspace: &Path, id: &str) -> AppResult<String> {
    let override_path = workspace.join(".quorum/prompts").join(format!("{}.md", id));

    if override_path.exists() {
        tracing::debug!("Loading prompt override from {:?}", override_path);
        let contents = std::fs::read_to_string(&override_path).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt override {:?}: {}",
                override_path, e
            ))
        })?;

        if contents.trim().is_empty() {
            return Err(AppError::Prompt(format!(
                "Prompt override {:?} is empty",
                override_path
            )));
        }

        return Ok(contents);
    }

    templates::builtin(id)
        .map(|t| t.to_string())
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt template: {}", id)))
}

/// List all available template ids: built-ins plus workspace overrides.
pub fn list_templates(workspace: &Path) -> AppResult<Vec<String>> {
    let mut ids: Vec<String> = templates::builtin_ids()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let prompts_dir = workspace.join(".quorum/prompts");
    if prompts_dir.exists() {
        for entry in walkdir::WalkDir::new(&prompts_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if !ids.iter().any(|id| id == stem) {
                        ids.push(stem.to_string());
                    }
                }
            }
        }
    }

    ids.sort();
    Ok(ids)
}
