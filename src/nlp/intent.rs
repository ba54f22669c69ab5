//! Command vs. question detection.
//!
//! The remote model is not trusted to notice that "can I afford shoes for
//! 500?" is a question rather than a purchase; [`classify`] is the local
//! check applied after every interpretation.

use crate::nlp::lexicon::matches_keyword;

/// What the user is doing with the utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Recording or changing something.
    Command,
    /// Asking for advice, a calculation, or a plan.
    Question,
}

/// Thai question particles and advice words.
pub static THAI_QUESTION_MARKERS: &[&str] = &[
    "ไหม", "มั้ย", "หรือเปล่า", "รึเปล่า", "ได้ไหม", "เท่าไหร่", "เท่าไร", "ยังไง",
    "อย่างไร", "อะไร", "ทำไม", "ควร", "แนะนำ", "ช่วย", "วางแผน", "?",
];

/// English question words, matched on word boundaries.
pub static ENGLISH_QUESTION_MARKERS: &[&str] = &[
    "how", "what", "why", "should", "can i", "could i", "recommend", "advice", "plan", "help",
];

/// Classify `text` as a command or a question.
///
/// Any marker from either table makes the text a question; "ไหม" only
/// counts when it is not part of "ไหม้" (burn) or "ผ้าไหม" (silk).
pub fn classify(text: &str) -> Intent {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return Intent::Command;
    }

    let hit = THAI_QUESTION_MARKERS
        .iter()
        .chain(ENGLISH_QUESTION_MARKERS)
        .find(|marker| matches_keyword(&text, marker));

    match hit {
        Some(marker) => {
            log::debug!("intent: question (marker '{marker}')");
            Intent::Question
        }
        None => Intent::Command,
    }
}
