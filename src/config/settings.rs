//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::action::{Language, Wallet};

// ---------------------------------------------------------------------------
// LlmProvider
// ---------------------------------------------------------------------------

/// Selects which backend interprets utterances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LlmProvider {
    /// Ollama running locally — no authentication required.
    Ollama,
    /// Any OpenAI-compatible REST API (OpenAI, Groq, Together.ai, LM Studio …).
    OpenAiCompatible,
    /// Model disabled — every utterance goes through the local engine.
    Disabled,
}

impl Default for LlmProvider {
    fn default() -> Self {
        Self::OpenAiCompatible
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the remote interpretation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Whether the remote path is tried at all.
    pub enabled: bool,
    /// Which backend to use.
    pub provider: LlmProvider,
    /// Base URL of the API endpoint.
    ///
    /// - Ollama default: `http://localhost:11434`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    /// Key pool, tried round-robin. Empty for local providers.
    pub api_keys: Vec<String>,
    /// Model identifier sent to the API (e.g. `"gpt-4o-mini"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0). Lower = more deterministic.
    pub temperature: f32,
    /// Maximum seconds to wait for one key's response.
    pub timeout_secs: u64,
    /// Upper bound on the reply length.
    pub max_tokens: u32,
}

impl LlmConfig {
    /// `true` when the remote path should be attempted.
    pub fn is_active(&self) -> bool {
        self.enabled && self.provider != LlmProvider::Disabled
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: LlmProvider::default(),
            base_url: "https://api.openai.com".into(),
            api_keys: Vec::new(),
            model: "gpt-4o-mini".into(),
            temperature: 0.2,
            timeout_secs: 15,
            max_tokens: 512,
        }
    }
}

// ---------------------------------------------------------------------------
// InterpreterConfig
// ---------------------------------------------------------------------------

/// Names the user goes by on transfer slips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub first_name: String,
    pub full_name: String,
    pub email: String,
}

/// Defaults applied when the caller's context does not say otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Language of messages and fallback labels.
    pub language: Language,
    /// Wallet used when an utterance names none.
    pub default_wallet: Wallet,
    /// Used for OCR sender/receiver disambiguation.
    pub profile: UserProfile,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            language: Language::Th,
            default_wallet: Wallet::Bank,
            profile: UserProfile::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// OcrConfig
// ---------------------------------------------------------------------------

/// Ordering among keyword candidates of the same priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The candidate closest to the top of the slip wins.
    #[default]
    EarliestPosition,
    /// The largest candidate wins.
    LargestAmount,
}

/// Slip/receipt amount-extraction tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub tie_break: TieBreak,
    /// Characters scanned after a keyword for its amount.
    pub window_chars: usize,
    /// Candidates at or above this value are discarded.
    pub max_amount: f64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::default(),
            window_chars: 80,
            max_amount: 1_000_000.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Everything read from `settings.toml`. Missing sections take their
/// defaults, so a file holding only `[llm] api_keys = [...]` is valid.
///
/// ```rust,no_run
/// use voice_ledger::config::AppConfig;
///
/// let mut config = AppConfig::load()?;
/// config.llm.api_keys.push("sk-...".into());
/// config.save()?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote model settings.
    pub llm: LlmConfig,
    /// Language, default wallet and user profile.
    pub interpreter: InterpreterConfig,
    /// Slip amount extraction.
    pub ocr: OcrConfig,
}

impl AppConfig {
    /// [`load_from`](Self::load_from) the platform settings file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Read `path`; a file that does not exist yet yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("config: {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// [`save_to`](Self::save_to) the platform settings file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Write as pretty TOML, creating the parent directory first.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("config: saved {}", path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_survive_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        AppConfig::default().save_to(&path).unwrap();
        let loaded = AppConfig::load_from(&path).unwrap();

        assert_eq!(loaded.llm.model, "gpt-4o-mini");
        assert_eq!(loaded.llm.max_tokens, 512);
        assert_eq!(loaded.interpreter.default_wallet, Wallet::Bank);
        assert_eq!(loaded.ocr.tie_break, TieBreak::EarliestPosition);
    }

    #[test]
    fn absent_file_means_defaults() {
        let dir = tempdir().unwrap();
        let cfg = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.interpreter.language, Language::Th);
        assert_eq!(cfg.ocr.window_chars, 80);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[llm\nmodel = ").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("parsing"));
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert!(cfg.llm.enabled);
        assert_eq!(cfg.llm.provider, LlmProvider::OpenAiCompatible);
        assert!(cfg.llm.api_keys.is_empty());
        assert_eq!(cfg.interpreter.language, Language::Th);
        assert_eq!(cfg.interpreter.default_wallet, Wallet::Bank);
        assert_eq!(cfg.ocr.tie_break, TieBreak::EarliestPosition);
        assert_eq!(cfg.ocr.window_chars, 80);
        assert_eq!(cfg.ocr.max_amount, 1_000_000.0);
    }

    #[test]
    fn user_settings_are_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut cfg = AppConfig::default();
        cfg.llm.provider = LlmProvider::Ollama;
        cfg.llm.base_url = "http://localhost:11434".into();
        cfg.llm.api_keys = vec!["sk-one".into(), "sk-two".into()];
        cfg.llm.timeout_secs = 45;
        cfg.interpreter.language = Language::En;
        cfg.interpreter.default_wallet = Wallet::Cash;
        cfg.interpreter.profile.first_name = "Somchai".into();
        cfg.ocr.tie_break = TieBreak::LargestAmount;

        cfg.save_to(&path).unwrap();
        let loaded = AppConfig::load_from(&path).unwrap();

        assert_eq!(loaded.llm.provider, LlmProvider::Ollama);
        assert_eq!(loaded.llm.base_url, "http://localhost:11434");
        assert_eq!(loaded.llm.api_keys, vec!["sk-one".to_string(), "sk-two".to_string()]);
        assert_eq!(loaded.llm.timeout_secs, 45);
        assert_eq!(loaded.interpreter.language, Language::En);
        assert_eq!(loaded.interpreter.default_wallet, Wallet::Cash);
        assert_eq!(loaded.interpreter.profile.first_name, "Somchai");
        assert_eq!(loaded.ocr.tie_break, TieBreak::LargestAmount);
    }

    /// Sections missing from a hand-written file fall back to defaults.
    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[interpreter]\nlanguage = \"en\"\n").unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.interpreter.language, Language::En);
        assert_eq!(cfg.interpreter.default_wallet, Wallet::Bank);
        assert_eq!(cfg.ocr.window_chars, 80);
        assert!(cfg.llm.enabled);
    }
}
