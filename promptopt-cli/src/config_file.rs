//! Optional TOML config file.
//!
//! Values here fill in for flags the user did not pass; flags always win.
//!
//! ```toml
//! [llm]
//! model = "gpt-4o-mini"
//! temperature = 0.7
//! retry_attempts = 3
//!
//! [optimizer]
//! max_iterations = 2
//! chunk_size = 5
//! shuffle = true
//! seed = 42
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// Root of the config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub optimizer: OptimizerSection,
}

/// `[llm]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmSection {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_base_delay_ms: Option<u64>,
}

/// `[optimizer]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizerSection {
    pub max_iterations: Option<usize>,
    pub chunk_size: Option<usize>,
    pub shuffle: Option<bool>,
    pub seed: Option<u64>,
}

impl FileConfig {
    /// Load a config file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_path_gives_defaults() {
        let config = FileConfig::load(None).unwrap();
        assert!(config.llm.model.is_none());
        assert!(config.optimizer.max_iterations.is_none());
    }

    #[test]
    fn test_load_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[llm]
model = "gpt-4o"
temperature = 0.3
retry_attempts = 5

[optimizer]
max_iterations = 4
chunk_size = 10
shuffle = false
"#,
        )
        .unwrap();

        let config = FileConfig::load(Some(&path)).unwrap();
        assert_eq!(config.llm.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.llm.temperature, Some(0.3));
        assert_eq!(config.llm.retry_attempts, Some(5));
        assert_eq!(config.optimizer.max_iterations, Some(4));
        assert_eq!(config.optimizer.chunk_size, Some(10));
        assert_eq!(config.optimizer.shuffle, Some(false));
        assert!(config.optimizer.seed.is_none());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm]\nmodle = \"typo\"\n").unwrap();

        assert!(FileConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(FileConfig::load(Some(Path::new("/missing/config.toml"))).is_err());
    }
}
