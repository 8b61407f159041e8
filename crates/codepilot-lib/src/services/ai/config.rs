// AI Provider Configuration
//
// Environment-based settings for the completion provider. Callers load
// `.env` (dotenvy) before the first read.

use super::{AIError, AIResult};
use crate::models::ai::ModelInfo;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Sampling temperature used for every action; not user-configurable
pub const TEMPERATURE: f32 = 0.2;

/// Models offered to clients
const SELECTABLE_MODELS: &[(&str, &str)] = &[
    ("mixtral-8x7b-32768", "Mixtral 8x7B"),
    ("llama-3.1-8b-instant", "LLaMA 3.1 8B (fast)"),
];

/// Completion provider settings
#[derive(Debug, Clone, PartialEq)]
pub struct AIConfig {
    /// Provider credential; `None` when unset or blank
    pub api_key: Option<String>,
    /// OpenAI-compatible API base URL
    pub base_url: String,
    /// Model used when the caller does not pick one
    pub default_model: String,
    /// Maximum output tokens per completion
    pub max_tokens: u32,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl AIConfig {
    /// Read settings from the process environment
    pub fn from_env() -> AIResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> AIResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let max_tokens = match non_blank("GROQ_MAX_TOKENS") {
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                AIError::InvalidConfig(format!("GROQ_MAX_TOKENS must be a positive integer, got '{}'", raw))
            })?,
            None => DEFAULT_MAX_TOKENS,
        };
        if max_tokens == 0 {
            return Err(AIError::InvalidConfig(
                "GROQ_MAX_TOKENS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_key: non_blank("GROQ_API_KEY"),
            base_url: non_blank("GROQ_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            default_model: non_blank("GROQ_DEFAULT_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Models clients may choose from, with the configured default marked
    pub fn selectable_models(&self) -> Vec<ModelInfo> {
        let mut models: Vec<ModelInfo> = SELECTABLE_MODELS
            .iter()
            .map(|&(id, label)| ModelInfo {
                id: id.to_string(),
                label: label.to_string(),
                is_default: id == self.default_model,
            })
            .collect();

        if !models.iter().any(|m| m.is_default) {
            models.push(ModelInfo {
                id: self.default_model.clone(),
                label: self.default_model.clone(),
                is_default: true,
            });
        }
        models
    }
}
