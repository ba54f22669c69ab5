//! Voice Ledger: turns Thai/English finance commands (voice transcripts,
//! typed text, slip OCR) into structured ledger actions.
//!
//! * [`action`] — the output contract, account healing and guards.
//! * [`nlp`] — amount parsing, categories, intent and keyword heuristics.
//! * [`ocr`] — slip total extraction and payer/payee direction.
//! * [`llm`] — remote interpretation with key rotation.
//! * [`pipeline`] — context, local rules and the resolver.
//! * [`config`] — TOML settings and platform paths.

pub mod action;
pub mod config;
pub mod llm;
pub mod nlp;
pub mod ocr;
pub mod pipeline;
