//! Configuration management
//!
//! Manages completion-provider settings, the server bind address, the
//! objective proxy URL and local storage locations.

use anyhow::{Result, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion provider settings
    #[serde(default)]
    pub completion: CompletionConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Where clients send objective requests
    #[serde(default)]
    pub proxy: ProxyConfig,
    /// Journal storage settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// API key is stored in keyring, this is just a reference
    #[serde(skip)]
    pub api_key: Option<String>,
    /// OpenAI-compatible base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used for objective summaries
    #[serde(default = "default_model")]
    pub model: String,
    /// Upper bound on generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature (0 = deterministic)
    #[serde(default)]
    pub temperature: f32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_max_tokens() -> u32 {
    300
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Objective proxy endpoint
    #[serde(default = "default_proxy_url")]
    pub url: String,
}

fn default_proxy_url() -> String {
    "http://127.0.0.1:8080/api/core-objective".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            url: default_proxy_url(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Journal database path (defaults to the data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog JSON path (defaults to the bundled catalog)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = config_path()?;
        let parent = config_path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Resolved journal database path
    pub fn journal_path(&self) -> Result<PathBuf> {
        match &self.storage.journal_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("journal.db")),
        }
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "nextmind", "nextmind")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "nextmind", "nextmind")
        .context("Failed to get project directories")?;
    Ok(base.data_dir().to_path_buf())
}

/// Show current configuration
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Configuration ({})", config_path()?.display());
    println!();
    println!("  Completion");
    println!("    base_url:     {}", config.completion.base_url);
    println!("    model:        {}", config.completion.model);
    println!("    max_tokens:   {}", config.completion.max_tokens);
    println!("    temperature:  {}", config.completion.temperature);
    println!("    timeout_secs: {}", config.completion.timeout_secs);
    println!("    api key:      {}", if crate::security::has_api_key() { "Configured" } else { "Not configured" });
    println!("  Server:         {}:{}", config.server.host, config.server.port);
    println!("  Proxy:          {}", config.proxy.url);
    println!("  Journal:        {}", config.journal_path()?.display());
    println!(
        "  Catalog:        {}",
        config.catalog.path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "bundled".to_string())
    );

    Ok(())
}

/// Set API key
pub fn set_api_key(key: &str) -> Result<()> {
    crate::security::keyring::set_api_key(key)?;
    println!("API key stored securely.");
    Ok(())
}

/// Set the completion model
pub fn set_model(model: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.completion.model = model.to_string();
    config.save()?;
    println!("Objective model set to: {}", model);
    Ok(())
}

/// Set the objective proxy URL
pub fn set_proxy_url(raw: &str) -> Result<()> {
    let parsed = url::Url::parse(raw)
        .with_context(|| format!("Invalid proxy URL '{}'", raw))?;
    let mut config = Config::load()?;
    config.proxy.url = parsed.to_string();
    config.save()?;
    println!("Objective proxy set to: {}", config.proxy.url);
    Ok(())
}

/// Reset configuration to defaults
pub fn reset_config() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults.");
    Ok(())
}

/// Get default configuration as TOML string
pub fn default_config_toml() -> String {
    let config = Config::default();
    toml::to_string_pretty(&config).unwrap_or_else(|_| "# Default configuration\n".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.completion.model, "gpt-4.1-mini");
        assert_eq!(config.completion.max_tokens, 300);
        assert_eq!(config.completion.temperature, 0.0);
        assert_eq!(config.server.port, 8080);
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[completion]\nmodel = \"gpt-4.1\"\n").unwrap();
        assert_eq!(config.completion.model, "gpt-4.1");
        assert_eq!(config.completion.base_url, "https://api.openai.com/v1");
        assert_eq!(config.proxy.url, "http://127.0.0.1:8080/api/core-objective");
    }

    #[test]
    fn test_default_toml_round_trips() {
        let toml_str = default_config_toml();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.completion.timeout_secs, 60);
    }

    #[test]
    fn test_explicit_journal_path() {
        let mut config = Config::default();
        config.storage.journal_path = Some(PathBuf::from("/tmp/j.db"));
        assert_eq!(config.journal_path().unwrap(), PathBuf::from("/tmp/j.db"));
    }
}
