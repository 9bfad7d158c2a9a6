//! Prompt templates for Jamak.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory:
//! `refine.toml` (keys `correction`, `context`) and `recipe.toml` (key `extraction`).

use crate::error::{JamakError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// The closed set of templates the crate renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    /// Single-segment grammar and fluency correction.
    Correction,
    /// Re-correction of one segment given its neighbors.
    Context,
    /// Recipe extraction from a refined transcript.
    Recipe,
}

impl PromptTemplate {
    /// Variables a caller must supply when rendering this template.
    pub fn required_variables(&self) -> &'static [&'static str] {
        match self {
            PromptTemplate::Correction => &["text"],
            PromptTemplate::Context => &["previous", "current", "next"],
            PromptTemplate::Recipe => &["transcript"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PromptTemplate::Correction => "correction",
            PromptTemplate::Context => "context",
            PromptTemplate::Recipe => "recipe",
        }
    }
}

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub refine: RefinePrompts,
    pub recipe: RecipePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for caption correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinePrompts {
    pub correction: String,
    pub context: String,
}

impl Default for RefinePrompts {
    fn default() -> Self {
        Self {
            correction: r#"The following is an automatically generated caption from a YouTube video.
Fix grammatical errors and unnatural expressions.

Rules:
1. Never summarize the content
2. Leave parts that need no correction exactly as they are
3. Keep the original language; do not translate
4. Reply with the corrected text only

Original text:
{{text}}

Corrected text:"#
                .to_string(),

            context: r#"The following are consecutive caption segments. Considering the context, rewrite the current sentence so it reads naturally.

Rules:
1. Only rewrite the current sentence; never merge in the previous or next sentence
2. Never summarize or drop information
3. Keep the original language; do not translate
4. Reply with the rewritten current sentence only

Previous sentence: {{previous}}
Current sentence: {{current}}
Next sentence: {{next}}

Rewritten current sentence:"#
                .to_string(),
        }
    }
}

/// Prompts for recipe extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipePrompts {
    pub extraction: String,
}

impl Default for RecipePrompts {
    fn default() -> Self {
        Self {
            extraction: r#"The following is the caption of a cooking video. Organize the recipe based on it.

Caption:
{{transcript}}

Use this format:
1. Dish name:
2. Required ingredients:
- ingredient and amount
3. Optional ingredients:
- ingredient and amount
4. Tools needed:
- list of cookware
5. Steps:
- explain each step in detail
6. Important tips:
- tips or warnings mentioned during cooking
7. Estimated time:
- separate preparation time and cooking time

Be as detailed and accurate as possible.
Do not write any section whose content is not in the caption.
Never invent content that is not there."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let refine_path = custom_path.join("refine.toml");
            if refine_path.exists() {
                let content = std::fs::read_to_string(&refine_path)?;
                prompts.refine = toml::from_str(&content)?;
            }

            let recipe_path = custom_path.join("recipe.toml");
            if recipe_path.exists() {
                let content = std::fs::read_to_string(&recipe_path)?;
                prompts.recipe = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Template text for the given id.
    pub fn template(&self, template: PromptTemplate) -> &str {
        match template {
            PromptTemplate::Correction => &self.refine.correction,
            PromptTemplate::Context => &self.refine.context,
            PromptTemplate::Recipe => &self.recipe.extraction,
        }
    }

    /// Check that every template still references each of its required variables.
    ///
    /// A custom template that drops `{{text}}` would send the model no caption.
    pub fn validate(&self) -> Result<()> {
        for template in [
            PromptTemplate::Correction,
            PromptTemplate::Context,
            PromptTemplate::Recipe,
        ] {
            let text = self.template(template);
            let absent: Vec<&str> = template
                .required_variables()
                .iter()
                .copied()
                .filter(|name| !text.contains(&format!("{{{{{}}}}}", name)))
                .collect();

            if !absent.is_empty() {
                return Err(JamakError::Prompt(format!(
                    "template '{}' never uses: {}",
                    template.name(),
                    absent.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Render a template, failing if any of its required variables is missing.
    ///
    /// Custom config variables are merged underneath `vars`. Empty values are
    /// valid (a boundary segment has no previous or next text).
    pub fn render_prompt(
        &self,
        template: PromptTemplate,
        vars: &HashMap<String, String>,
    ) -> Result<String> {
        let missing: Vec<&str> = template
            .required_variables()
            .iter()
            .copied()
            .filter(|name| !vars.contains_key(*name))
            .collect();

        if !missing.is_empty() {
            return Err(JamakError::Prompt(format!(
                "template '{}' is missing variables: {}",
                template.name(),
                missing.join(", ")
            )));
        }

        Ok(self.render_with_custom(self.template(template), vars))
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single left-to-right pass, so a value that itself
    /// contains `{{name}}` is never expanded.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            result.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            match after.find("}}") {
                Some(close) => {
                    let key = &after[..close];
                    match vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after[close + 2..];
                }
                None => {
                    result.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

/// Build a variable map from string pairs.
pub fn prompt_vars<const N: usize>(pairs: [(&str, &str); N]) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        for template in [
            PromptTemplate::Correction,
            PromptTemplate::Context,
            PromptTemplate::Recipe,
        ] {
            let text = prompts.template(template);
            for var in template.required_variables() {
                assert!(
                    text.contains(&format!("{{{{{}}}}}", var)),
                    "{} template lacks {}",
                    template.name(),
                    var
                );
            }
        }
    }

    #[test]
    fn test_validate_flags_dropped_placeholder() {
        assert!(Prompts::default().validate().is_ok());

        let mut prompts = Prompts::default();
        prompts.refine.context = "Fix: {{current}}".to_string();
        let err = prompts.validate().unwrap_err().to_string();
        assert!(err.contains("'context'"));
        assert!(err.contains("previous, next"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let vars = prompt_vars([("name", "Alice"), ("count", "5")]);

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_expand_values() {
        let vars = prompt_vars([("a", "{{b}}"), ("b", "oops")]);
        assert_eq!(Prompts::render("[{{a}}]", &vars), "[{{b}}]");
    }

    #[test]
    fn test_render_prompt_context_with_empty_neighbors() {
        let prompts = Prompts::default();
        let vars = prompt_vars([("previous", ""), ("current", "hello"), ("next", "")]);
        let rendered = prompts.render_prompt(PromptTemplate::Context, &vars).unwrap();

        assert!(rendered.contains("Previous sentence: \n"));
        assert!(rendered.contains("Current sentence: hello\n"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_render_prompt_missing_variable() {
        let prompts = Prompts::default();
        let vars = prompt_vars([("previous", "a"), ("current", "b")]);
        let err = prompts
            .render_prompt(PromptTemplate::Context, &vars)
            .unwrap_err();
        assert!(err.to_string().contains("next"));
    }

    #[test]
    fn test_custom_variables_are_overridden() {
        let mut prompts = Prompts::default();
        prompts.refine.correction = "{{tone}}: {{text}}".to_string();
        prompts
            .variables
            .insert("tone".to_string(), "formal".to_string());
        prompts
            .variables
            .insert("text".to_string(), "ignored".to_string());

        let rendered = prompts
            .render_prompt(PromptTemplate::Correction, &prompt_vars([("text", "hi")]))
            .unwrap();
        assert_eq!(rendered, "formal: hi");
    }

    #[test]
    fn test_load_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("refine.toml"),
            "correction = \"Fix: {{text}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.refine.correction, "Fix: {{text}}");
        // Keys absent from the file keep their defaults.
        assert!(prompts.refine.context.contains("{{previous}}"));
    }
}
