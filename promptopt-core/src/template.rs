//! Prompt template assets.
//!
//! The valuation, summarization, and rewrite prompts are data, not code:
//! markdown files with `{name}` placeholders, embedded as defaults and
//! overridable per file or per directory without touching the core logic.

use std::io;
use std::path::Path;

/// A text template with `{name}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    /// Create a template from text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Load a template from a file.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    /// The raw template text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Fill the template, replacing each `{name}` with its value.
    ///
    /// Placeholders without a supplied value are left intact.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut filled = self.text.clone();
        for (name, value) in vars {
            filled = filled.replace(&format!("{{{name}}}"), value);
        }
        filled
    }
}

/// The three templates driving one optimization run.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    /// Per-example critique template with `{system_prompt}`, `{input}`,
    /// `{llm_generated_output}`, `{ground_truth_output}`
    pub valuation: PromptTemplate,

    /// Critique aggregation template with `{suggestions}`
    pub summarization: PromptTemplate,

    /// Prompt synthesis template with `{original_system_prompt}`,
    /// `{prompt_suggestion}`
    pub rewrite: PromptTemplate,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            valuation: PromptTemplate::new(include_str!("../templates/valuation.md")),
            summarization: PromptTemplate::new(include_str!("../templates/summarization.md")),
            rewrite: PromptTemplate::new(include_str!("../templates/rewrite.md")),
        }
    }
}

impl TemplateSet {
    /// File names looked up by [`from_dir`](Self::from_dir).
    pub const FILE_NAMES: [&'static str; 3] = ["valuation.md", "summarization.md", "rewrite.md"];

    /// Load all three templates from a directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            valuation: PromptTemplate::from_file(dir.join("valuation.md"))?,
            summarization: PromptTemplate::from_file(dir.join("summarization.md"))?,
            rewrite: PromptTemplate::from_file(dir.join("rewrite.md"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_placeholder() {
        let template = PromptTemplate::new("Hello, {name}!");
        assert_eq!(template.render(&[("name", "world")]), "Hello, world!");
    }

    #[test]
    fn test_render_repeated_and_multiple_placeholders() {
        let template = PromptTemplate::new("{a} and {b}, then {a} again");
        let filled = template.render(&[("a", "x"), ("b", "y")]);
        assert_eq!(filled, "x and y, then x again");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let template = PromptTemplate::new("{known} {unknown}");
        assert_eq!(template.render(&[("known", "v")]), "v {unknown}");
    }

    #[test]
    fn test_default_templates_carry_expected_placeholders() {
        let set = TemplateSet::default();

        for placeholder in [
            "{system_prompt}",
            "{input}",
            "{llm_generated_output}",
            "{ground_truth_output}",
        ] {
            assert!(
                set.valuation.text().contains(placeholder),
                "valuation template missing {placeholder}"
            );
        }
        assert!(set.summarization.text().contains("{suggestions}"));
        assert!(set.rewrite.text().contains("{original_system_prompt}"));
        assert!(set.rewrite.text().contains("{prompt_suggestion}"));
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        for name in TemplateSet::FILE_NAMES {
            std::fs::write(dir.path().join(name), format!("custom {name}")).unwrap();
        }

        let set = TemplateSet::from_dir(dir.path()).unwrap();
        assert_eq!(set.valuation.text(), "custom valuation.md");
        assert_eq!(set.rewrite.text(), "custom rewrite.md");
    }

    #[test]
    fn test_from_dir_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TemplateSet::from_dir(dir.path()).is_err());
    }
}
