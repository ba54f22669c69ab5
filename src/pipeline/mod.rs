//! Interpretation pipeline.
//!
//! * [`InterpretContext`] — the caller's read-only snapshot.
//! * [`LocalEngine`] — offline keyword rules.
//! * [`ActionResolver`] — remote-first orchestration with local fallback,
//!   OCR handling and the final validation guards.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_ledger::config::{AppConfig, AppPaths};
//! use voice_ledger::pipeline::{ActionResolver, InterpretContext};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let resolver = ActionResolver::from_config(&config, &AppPaths::new(), false);
//!     let ctx = InterpretContext::from_config(&config.interpreter);
//!
//!     let action = resolver.resolve("กาแฟ 50 บาท", &ctx).await;
//!     println!("{}", serde_json::to_string_pretty(&action).unwrap());
//! }
//! ```

pub mod context;
pub mod local;
pub mod resolver;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use context::{Balances, Channel, InterpretContext, OpenDebt, RecentTransaction, UpcomingReminder};
pub use local::LocalEngine;
pub use resolver::ActionResolver;
