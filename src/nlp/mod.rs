//! Text-level building blocks of the interpreter: Thai/English numeral
//! parsing, category scoring, command-vs-question detection and the
//! keyword heuristics the local engine uses.

pub mod category;
pub mod heuristics;
pub mod intent;
pub mod lexicon;
pub mod numbers;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use category::{Category, CategoryClassifier};
pub use heuristics::{clean_description, detect_tx_type, detect_wallet};
pub use intent::{classify as classify_intent, Intent};
pub use numbers::{parse_amount, strip_amounts};
