//! Configuration management for Model Sliding

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::router::RoutingRule;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ai: AiConfig,
    pub routing: RoutingConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub base_url: String,
    /// Model id served through the legacy, non-streaming completions endpoint
    pub completion_model: String,
    pub completion_max_tokens: u32,
    pub request_timeout_secs: u64,
    /// Send the routed persona as a leading system message
    #[serde(default)]
    pub persona_as_system: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub default_model: String,
    pub default_role: String,
    pub cache_capacity: usize,
    pub rules: Vec<RoutingRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub word_delay_ms: u64,
    pub cursor: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ai: AiConfig {
                api_key_env: "OPENAI_API_KEY".to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
                completion_model: "fine-tuned-model".to_string(),
                completion_max_tokens: 60,
                request_timeout_secs: 120,
                persona_as_system: false,
            },
            routing: RoutingConfig {
                default_model: "default-general-model".to_string(),
                default_role: "general-purpose assistant".to_string(),
                cache_capacity: 128,
                rules: default_rules(),
            },
            display: DisplayConfig {
                word_delay_ms: 10,
                cursor: "▌".to_string(),
            },
        }
    }
}

/// Built-in rule table, in match order
pub fn default_rules() -> Vec<RoutingRule> {
    vec![
        RoutingRule::new(
            &["code", "programming", "algorithm"],
            "gpt-3.5-turbo",
            "You are a programming assistant that logically weaves code together.",
        )
        .with_help(
            "Assistant specialized in generating Python code",
            "Code a Streamlit app with docstrings.",
        ),
        RoutingRule::new(
            &["essay", "paper", "report", "article"],
            "gpt-4",
            "You are a writing assistant that excels at creating amazing written material.",
        )
        .with_help(
            "Assistant that excels at writing well-structured and grammatically correct text",
            "Write a technical essay on LLMs.",
        ),
        RoutingRule::new(
            &["story", "narrative", "tale", "fable"],
            "gpt-3.5-turbo",
            "You are a storyteller assistant that can weave intricate and compelling stories.",
        )
        .with_help(
            "Assistant that can weave intricate and compelling stories",
            "Tell me a story about AI.",
        ),
        RoutingRule::new(
            &["social media", "post", "content", "engaging"],
            "gpt-4",
            "You are a social media assistant skilled in creating engaging and creative content for social media.",
        )
        .with_help(
            "Assistant skilled in creating engaging and creative content for social media",
            "Craft an engaging social media post with exciting news.",
        ),
    ]
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let config_dir = directories::ProjectDirs::from("com", "model-sliding", "slide")
        .context("Failed to determine config directory")?
        .config_dir()
        .to_path_buf();

    Ok(config_dir.join("config.toml"))
}

/// Load configuration from file or use defaults
pub fn load_config(custom_path: Option<&str>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        PathBuf::from(p)
    } else {
        config_path()?
    };

    if path.exists() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    } else {
        tracing::debug!("No config at {:?}, using defaults", path);
        Ok(Config::default())
    }
}

/// Initialize configuration file with defaults
pub fn init_config(custom_path: Option<&str>) -> Result<()> {
    let path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => config_path()?,
    };

    if path.exists() {
        println!("Configuration file already exists at {:?}", path);
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }

    let content = toml::to_string_pretty(&Config::default())
        .context("Failed to serialize default config")?;

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config to {:?}", path))?;

    println!("Configuration initialized at {:?}", path);
    Ok(())
}

/// Show current configuration
pub fn show_config(config: &Config) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .context("Failed to serialize config")?;
    println!("{}", content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_roundtrips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.routing.rules.len(), 4);
        assert_eq!(parsed.routing.rules[3].keywords[0], "social media");
        assert_eq!(parsed.ai.completion_model, "fine-tuned-model");
        assert_eq!(parsed.display.cursor, "▌");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.routing.default_model, "default-general-model");
    }

    #[test]
    fn test_custom_rules_are_loaded_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.routing.rules = vec![
            RoutingRule::new(&["poem"], "poet-model", "You write verse."),
            RoutingRule::new(&["sql"], "db-model", "You write queries."),
        ];
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = load_config(path.to_str()).unwrap();
        let models: Vec<_> = loaded.routing.rules.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(models, ["poet-model", "db-model"]);
        assert!(!loaded.ai.persona_as_system);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ai\nbroken").unwrap();
        assert!(load_config(path.to_str()).is_err());
    }
}
