use crate::core::ConfigProvider;
use crate::domain::scoring::ScoringWeights;
use crate::utils::error::{PortalError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

const MAX_WEIGHT: u32 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub store: StoreConfig,
    pub scoring: ScoringWeights,
    pub explain: ExplainConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "esg-portal.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    /// Literal key; usually `"${OPENAI_API_KEY}"` so it is substituted at load time.
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset.
    pub api_key_env: Option<String>,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.2,
            timeout_seconds: 30,
            api_key: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
        }
    }
}

impl ExplainConfig {
    /// The effective key. Unsubstituted `${VAR}` placeholders count as missing.
    pub fn api_key(&self) -> Option<String> {
        let usable = |k: &str| !k.trim().is_empty() && !k.starts_with("${");
        self.api_key
            .clone()
            .filter(|k| usable(k))
            .or_else(|| {
                self.api_key_env
                    .as_deref()
                    .and_then(|var| std::env::var(var).ok())
                    .filter(|k| usable(k))
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: bool,
}

impl PortalConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PortalError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Falls back to defaults when `path` does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                "Config file {} not found, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PortalError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PortalError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("store.path", &self.store.path)?;
        validate_url("explain.endpoint", &self.explain.endpoint)?;
        validate_non_empty_string("explain.model", &self.explain.model)?;
        validate_range("explain.temperature", self.explain.temperature, 0.0, 2.0)?;
        validate_range("explain.timeout_seconds", self.explain.timeout_seconds, 1, 600)?;
        validate_range("scoring.max_score", self.scoring.max_score, 1, MAX_WEIGHT)?;
        for (field, weight) in self.scoring.named_weights() {
            validate_range(&format!("scoring.{}", field), weight, 0, MAX_WEIGHT)?;
        }

        if let Some(level) = &self.logging.level {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level.to_lowercase().as_str()) {
                return Err(PortalError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for PortalConfig {
    fn store_path(&self) -> &str {
        &self.store.path
    }

    fn scoring_weights(&self) -> ScoringWeights {
        self.scoring
    }
}

impl Validate for PortalConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
