//! Slip and receipt text handling: amount extraction and payer/payee
//! disambiguation. The OCR engine itself lives outside this crate; these
//! functions only see the text it produced.

pub mod amount;
pub mod direction;

pub use amount::{AmountExtractor, AmountSource, OcrAmount};
pub use direction::infer_direction;
