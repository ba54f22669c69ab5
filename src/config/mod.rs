//! Configuration module for the ledger interpreter.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the model
//! backend, the interpreter defaults and the OCR extractor, `AppPaths` for
//! the platform config directory, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, InterpreterConfig, LlmConfig, LlmProvider, OcrConfig, TieBreak, UserProfile,
};
