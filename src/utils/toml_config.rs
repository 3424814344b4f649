//! TOML-based configuration for the Ocean assistant
//!
//! Every section is optional and defaulted, so an empty file (or no file at
//! all) yields a working mock-mode configuration. Secrets are never written in
//! the file: providers reference the *name* of an environment variable.
//!
//! ```toml
//! [assistant]
//! persona = "Ocean Bank"
//! fallback_intent = "general_inquiry"
//!
//! [llm]
//! mock_delay_ms = 50
//!
//! [llm.provider]
//! type = "gemini"
//! api_key_env = "GEMINI_API_KEY"
//! model = "gemini-1.5-flash"
//!
//! [rag]
//! collection = "banking_docs"
//! top_k = 3
//!
//! [[intents]]
//! id = "general_inquiry"
//! keywords = ["help"]
//! instructions = "You are a helpful banking assistant."
//! ```

use crate::intents::{IntentDefinition, IntentTable, DEFAULT_FALLBACK_INTENT};
use crate::llm::client::Provider;
use crate::types::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure loaded from ocean.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OceanConfig {
    #[serde(default)]
    pub assistant: AssistantConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub rag: RagConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Intents in priority order. Empty means the built-in banking table.
    #[serde(default)]
    pub intents: Vec<IntentDefinition>,
}

// ============= Assistant Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Bank name the assistant speaks for.
    #[serde(default = "default_persona")]
    pub persona: String,

    #[serde(default = "default_fallback_intent")]
    pub fallback_intent: String,
}

fn default_persona() -> String {
    "Ocean Bank".to_string()
}

fn default_fallback_intent() -> String {
    DEFAULT_FALLBACK_INTENT.to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            persona: default_persona(),
            fallback_intent: default_fallback_intent(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Pause between words when streaming the mock greeting.
    #[serde(default = "default_mock_delay_ms")]
    pub mock_delay_ms: u64,
}

fn default_mock_delay_ms() -> u64 {
    50
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            mock_delay_ms: default_mock_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        /// Environment variable containing the API key
        #[serde(default = "default_gemini_key_env")]
        api_key_env: String,
        #[serde(default = "default_gemini_base")]
        api_base: String,
        #[serde(default = "default_gemini_model")]
        model: String,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        model: String,
    },
}

fn default_gemini_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_gemini_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Gemini {
            api_key_env: default_gemini_key_env(),
            api_base: default_gemini_base(),
            model: default_gemini_model(),
        }
    }
}

impl ProviderConfig {
    /// Resolve this configuration into a live provider.
    ///
    /// Returns `None` when the provider needs a credential that is not set
    /// (or set to an empty string). That is mock mode, not an error.
    pub fn resolve(&self) -> Option<Provider> {
        match self {
            ProviderConfig::Gemini {
                api_key_env,
                api_base,
                model,
            } => {
                let api_key = std::env::var(api_key_env).ok()?;
                if api_key.trim().is_empty() {
                    return None;
                }
                Some(Provider::Gemini {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.clone(),
                })
            }
            #[cfg(feature = "ollama")]
            ProviderConfig::Ollama { base_url, model } => Some(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
            }),
            #[cfg(not(feature = "ollama"))]
            ProviderConfig::Ollama { .. } => {
                tracing::warn!("Ollama provider configured but the `ollama` feature is disabled");
                None
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::Gemini { .. } => "gemini",
            ProviderConfig::Ollama { .. } => "ollama",
        }
    }
}

// ============= RAG Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Sentence-embedding model shared by ingestion and query.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Number of documents retrieved per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_embedding_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_collection() -> String {
    "banking_docs".to_string()
}

fn default_top_k() -> usize {
    3
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embedding_model: default_embedding_model(),
            collection: default_collection(),
            top_k: default_top_k(),
        }
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl std::str::FromStr for OceanConfig {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: OceanConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

impl OceanConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        content.parse()
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rag.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "rag.top_k must be at least 1".to_string(),
            ));
        }

        if self.rag.collection.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "rag.collection must not be empty".to_string(),
            ));
        }

        if let ProviderConfig::Ollama { model, .. } = &self.llm.provider {
            if model.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "llm.provider.model must not be empty".to_string(),
                ));
            }
        }

        // Surfaces duplicate ids, blank keywords and a missing fallback.
        self.intent_table()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(())
    }

    /// Build the intent table, falling back to the built-in banking intents.
    pub fn intent_table(&self) -> crate::types::Result<IntentTable> {
        if self.intents.is_empty() {
            if self.assistant.fallback_intent != DEFAULT_FALLBACK_INTENT {
                return IntentTable::new(
                    IntentTable::banking().iter().cloned().collect(),
                    &self.assistant.fallback_intent,
                );
            }
            return Ok(IntentTable::banking());
        }

        IntentTable::new(self.intents.clone(), &self.assistant.fallback_intent)
    }

    pub fn mock_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.llm.mock_delay_ms)
    }
}
