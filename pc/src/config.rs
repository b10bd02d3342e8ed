//! precode configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main precode configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation service configuration
    pub generation: GenerationConfig,

    /// Session persistence configuration
    pub storage: StorageConfig,

    /// Wizard behavior knobs
    pub wizard: WizardConfig,

    /// Diagram rendering configuration
    pub render: RenderConfig,

    /// Log level from config file (CLI flag takes priority)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks the required secrets so a missing key fails at startup rather
    /// than at first use. The generation API key is always required; the
    /// storage credentials are required whenever a remote store is configured.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.generation.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "Generation API key not found. Set the {} environment variable.",
                self.generation.api_key_env
            ));
        }

        if self.storage.remote_url.is_some() && std::env::var(&self.storage.credentials_env).is_err() {
            return Err(eyre::eyre!(
                "Storage credentials not found. Set the {} environment variable or clear storage.remote-url.",
                self.storage.credentials_env
            ));
        }

        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .precode.yml
        let local_config = PathBuf::from(".precode.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/precode/precode.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("precode").join("precode.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log-level from the config chain, for early logging setup
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Provider name (currently only "gemini" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl GenerationConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).map_err(|_| {
            eyre::eyre!(
                "Generation API key not found. Set the {} environment variable.",
                self.api_key_env
            )
        })
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            max_tokens: 8192,
            timeout_ms: 120_000,
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the local session store
    #[serde(rename = "store-dir")]
    pub store_dir: String,

    /// Remote blob store base URL; None disables the remote leg
    ///
    /// Setting this makes the credentials variable a required secret: startup
    /// validation checks it alongside the generation API key. Left unset,
    /// only the generation key is checked and sessions persist locally.
    #[serde(rename = "remote-url")]
    pub remote_url: Option<String>,

    /// Bucket name within the remote store
    pub bucket: String,

    /// Environment variable containing the remote store credentials
    ///
    /// Only read (and only required) when `remote-url` is set.
    #[serde(rename = "credentials-env")]
    pub credentials_env: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/precode/sessions on Linux)
        let store_dir = dirs::data_local_dir()
            .map(|d| d.join("precode").join("sessions"))
            .unwrap_or_else(|| PathBuf::from(".sessionstore"))
            .to_string_lossy()
            .into_owned();

        Self {
            store_dir,
            remote_url: None,
            bucket: "precode".to_string(),
            credentials_env: "PRECODE_STORAGE_KEY".to_string(),
        }
    }
}

/// Wizard behavior knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Delay before a suggested step transition is surfaced as a banner
    #[serde(rename = "suggestion-delay-ms")]
    pub suggestion_delay_ms: u64,

    /// Match [SUGGEST_STEP:...] tags case-insensitively
    ///
    /// Iterations of the product disagreed on this; it is a knob, not fixed
    /// behavior.
    #[serde(rename = "case-insensitive-suggestions")]
    pub case_insensitive_suggestions: bool,

    /// Maximum transcript turns sent as context per generation call
    #[serde(rename = "max-context-turns")]
    pub max_context_turns: usize,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            suggestion_delay_ms: 1500,
            case_insensitive_suggestions: true,
            max_context_turns: 50,
        }
    }
}

/// Diagram rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Mermaid CLI binary name
    #[serde(rename = "mmdc-bin")]
    pub mmdc_bin: String,

    /// Mermaid theme passed to the renderer
    pub theme: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mmdc_bin: "mmdc".to_string(),
            theme: "default".to_string(),
        }
    }
}
