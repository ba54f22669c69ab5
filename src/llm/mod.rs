//! Remote interpretation through a language model.
//!
//! This module provides:
//! * [`ActionOracle`] — async trait implemented by every remote backend.
//! * [`ApiOracle`] — OpenAI-compatible REST backend with key rotation.
//! * [`KeyPool`] / [`RotationRecord`] — round-robin key pool with a
//!   persisted active index.
//! * [`PromptBuilder`] — the instruction contract sent to the model.
//! * [`render_context`] — the caller's snapshot as prompt text.
//! * [`parse_action_response`] — fence stripping and reply repair.
//! * [`LlmError`] — error variants for the remote path.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voice_ledger::config::{AppConfig, AppPaths};
//! use voice_ledger::llm::{ActionOracle, ApiOracle, KeyPool};
//! use voice_ledger::pipeline::InterpretContext;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let pool = Arc::new(KeyPool::load(
//!         config.llm.api_keys.clone(),
//!         AppPaths::new().rotation_file,
//!     ));
//!     let oracle = ApiOracle::from_config(&config.llm, pool);
//!
//!     let ctx = InterpretContext::from_config(&config.interpreter);
//!     match oracle.interpret("กาแฟ 50 บาท", &ctx).await {
//!         Ok(action) => println!("{}", action.kind.name()),
//!         Err(e) => eprintln!("remote path failed: {e}"),
//!     }
//! }
//! ```

pub mod context;
pub mod oracle;
pub mod parsing;
pub mod prompt;
pub mod rotation;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use context::render_context;
pub use oracle::{ActionOracle, ApiOracle, LlmError};
pub use parsing::{extract_json_object, parse_action_response, strip_code_fence};
pub use prompt::{is_allowed_icon, PromptBuilder, ICON_ALLOW_LIST};
pub use rotation::{KeyPool, RotationRecord};
