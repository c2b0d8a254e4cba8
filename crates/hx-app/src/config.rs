//! Report configuration file and environment overrides.

use std::collections::BTreeMap;
use std::path::Path;

use hx_core::Unit;
use hx_pipeline::{AliasRule, AssemblyOptions, DEFAULT_TOP_N, Normalizer};
use hx_report::LlmConfig;
use hx_report::charts::DEFAULT_HISTOGRAM_BINS;
use hx_report::llm::{
    DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, DEFAULT_LLM_TEMPERATURE, DEFAULT_LLM_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

pub const ENV_LLM_API_KEY: &str = "HX_LLM_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_LLM_MODEL: &str = "HX_LLM_MODEL";
pub const ENV_LLM_BASE_URL: &str = "HX_LLM_BASE_URL";
pub const ENV_LLM_TIMEOUT_MS: &str = "HX_LLM_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_n: usize,
    pub histogram_bins: usize,
    /// Added on top of the built-in alias table.
    pub aliases: Vec<AliasRule>,
    /// Canonical name -> unit, consulted before the name rule.
    pub unit_overrides: BTreeMap<String, Unit>,
    pub llm: LlmSettings,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            aliases: Vec::new(),
            unit_overrides: BTreeMap::new(),
            llm: LlmSettings::default(),
        }
    }
}

/// Narrative client settings. The API key never lives in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub model: String,
    pub base_url: String,
    pub timeout_ms: u64,
    pub temperature: f64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_LLM_MODEL.to_string(),
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            timeout_ms: DEFAULT_LLM_TIMEOUT_MS,
            temperature: DEFAULT_LLM_TEMPERATURE,
        }
    }
}

impl ReportConfig {
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))
    }

    pub fn normalizer(&self) -> Normalizer {
        self.unit_overrides.iter().fold(
            Normalizer::builtin().with_aliases(self.aliases.iter().cloned()),
            |n, (name, unit)| n.with_unit_override(name.clone(), *unit),
        )
    }

    pub fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions { top_n: self.top_n }
    }

    /// Narrative client configuration from the process environment.
    pub fn llm_config(&self) -> AppResult<Option<LlmConfig>> {
        self.llm_config_with(|key| std::env::var(key).ok())
    }

    /// `None` when no API key is available.
    pub fn llm_config_with<F>(&self, getter: F) -> AppResult<Option<LlmConfig>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| getter(key).filter(|v| !v.trim().is_empty());

        let model = non_empty(ENV_LLM_MODEL).unwrap_or_else(|| self.llm.model.clone());
        let base_url = non_empty(ENV_LLM_BASE_URL).unwrap_or_else(|| self.llm.base_url.clone());
        let timeout_ms = match non_empty(ENV_LLM_TIMEOUT_MS) {
            Some(value) => value.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("{ENV_LLM_TIMEOUT_MS} must be an integer, got {value:?}"))
            })?,
            None => self.llm.timeout_ms,
        };
        if timeout_ms == 0 {
            return Err(AppError::Config("LLM timeout must be positive".to_string()));
        }

        let Some(api_key) = non_empty(ENV_LLM_API_KEY).or_else(|| non_empty(ENV_OPENAI_API_KEY))
        else {
            debug!("no LLM API key in environment");
            return Ok(None);
        };

        Ok(Some(LlmConfig {
            model,
            base_url,
            api_key,
            timeout_ms,
            temperature: self.llm.temperature,
        }))
    }
}

/// Load the config file, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> AppResult<ReportConfig> {
    let Some(path) = path else {
        return Ok(ReportConfig::default());
    };
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    ReportConfig::from_yaml_str(&content)
}
