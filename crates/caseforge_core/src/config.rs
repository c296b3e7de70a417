use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

/// Environment variables consulted by [`CaseforgeConfig::apply_env_overrides`].
pub const ENV_LOG_LEVEL: &str = "CASEFORGE_LOG_LEVEL";
pub const ENV_JIRA_BASE_URL: &str = "JIRA_BASE_URL";
pub const ENV_JIRA_EMAIL: &str = "JIRA_EMAIL";
pub const ENV_JIRA_API_TOKEN: &str = "JIRA_API_TOKEN";

// ---------------------------------------------------------------------------
// CaseforgeConfig
// ---------------------------------------------------------------------------

/// Application configuration stored at `~/.caseforge/config.json`.
///
/// The Jira API token is **never** written to the JSON file; it only comes
/// from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseforgeConfig {
    pub log_level: String,

    // Jira
    pub jira_base_url: Option<String>,
    pub jira_email: Option<String>,
    #[serde(skip)]
    pub jira_api_token: Option<String>,
    pub jira_max_results: u32,
    /// Custom fields probed, in order, for acceptance criteria.
    pub acceptance_criteria_fields: Vec<String>,
}

impl Default for CaseforgeConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            jira_base_url: None,
            jira_email: None,
            jira_api_token: None,
            jira_max_results: 100,
            acceptance_criteria_fields: vec![
                "customfield_10016".into(),
                "customfield_10085".into(),
                "customfield_10000".into(),
            ],
        }
    }
}

impl CaseforgeConfig {
    /// Returns the base config directory: `~/.caseforge/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".caseforge"))
    }

    /// Returns the config file path: `~/.caseforge/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.caseforge/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Loads config from disk, or creates the default file if missing, then
    /// applies environment overrides.
    pub fn load() -> Result<Self> {
        let base = Self::base_dir()?;
        std::fs::create_dir_all(&base)
            .with_context(|| format!("Failed to create directory: {}", base.display()))?;
        let mut config = Self::load_from_path(&Self::config_path()?)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load config from a specific file path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self = serde_json::from_str(&content)
                .with_context(|| "Failed to parse config.json")?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Save config to a specific file path (the API token is excluded).
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Overlay values from the environment. `lookup` is usually
    /// `|k| std::env::var(k).ok()`; empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(base_url) = get(ENV_JIRA_BASE_URL) {
            self.jira_base_url = Some(base_url);
        }
        if let Some(email) = get(ENV_JIRA_EMAIL) {
            self.jira_email = Some(email);
        }
        if let Some(token) = get(ENV_JIRA_API_TOKEN) {
            self.jira_api_token = Some(token);
        }
    }

    /// Jira credentials, if all three parts are configured.
    pub fn jira_credentials(&self) -> Option<JiraCredentials> {
        Some(JiraCredentials {
            base_url: self.jira_base_url.clone()?,
            email: self.jira_email.clone()?,
            api_token: self.jira_api_token.clone()?,
        })
    }
}

// ---------------------------------------------------------------------------
// JiraCredentials
// ---------------------------------------------------------------------------

/// Connection details for a Jira Cloud instance.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraCredentials {
    pub base_url: String,
    pub email: String,
    #[serde(rename = "apiKey")]
    pub api_token: String,
}

impl std::fmt::Debug for JiraCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraCredentials")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &format_args!("<{} chars>", self.api_token.len()))
            .finish()
    }
}

impl JiraCredentials {
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            bail!("Invalid base URL: {}", self.base_url);
        }
        if !self.email.contains('@') {
            bail!("Invalid email");
        }
        if self.api_token.trim().is_empty() {
            bail!("API key is required");
        }
        Ok(())
    }
}
