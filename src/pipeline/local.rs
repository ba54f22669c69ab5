//! Local Command Engine: the offline rendition of the model's job.
//!
//! Runs entirely on keyword tables and the number parser. Used when no
//! model is configured, when the remote path fails, and for inconclusive
//! OCR answers.

use crate::action::{
    find_mentioned_account, messages, Action, ActionKind, BudgetPeriod, Debt, Language,
    Transaction, Wallet, UNKNOWN_PERSON,
};
use crate::nlp::intent::{self, Intent};
use crate::nlp::lexicon::matches_keyword;
use crate::nlp::numbers::{parse_amount, strip_amounts};
use crate::nlp::{clean_description, detect_tx_type, detect_wallet, Category, CategoryClassifier};

use super::context::InterpretContext;

// ---------------------------------------------------------------------------
// Keyword tables
// ---------------------------------------------------------------------------

static DEBT_VIEW_MARKERS: &[&str] = &[
    "ดูหนี้", "รายการหนี้", "หนี้ทั้งหมด", "หนี้สิน", "ใครติดเงิน", "show debts", "my debts",
    "debt list", "who owes",
];

static SUMMARY_MARKERS: &[&str] = &[
    "สรุป", "ดูยอด", "รายงาน", "ภาพรวม", "summary", "report", "overview", "show balance",
];

static LEND_MARKERS: &[&str] = &["ให้ยืม", "lend", "lent", "loaned"];

static BORROW_MARKERS: &[&str] = &["ยืม", "borrow", "borrowed"];

static BUDGET_MARKERS: &[&str] = &["ตั้งงบ", "งบ", "budget"];

/// Leading words dropped before the counterparty name.
static PERSON_PREFIXES: &[&str] = &["เงิน", "จาก", "ให้", "กับ", "from", "to", "money", "the"];

static PERSON_FILLERS: &[&str] = &["บาท", "baht", "thb", "ครับ", "ค่ะ", "คะ", "นะ", "หน่อย", "เงินสด", "cash"];

// ---------------------------------------------------------------------------
// LocalEngine
// ---------------------------------------------------------------------------

/// Deterministic, network-free interpreter.
///
/// # Example
/// ```rust
/// use voice_ledger::action::{ActionKind, TxType, Wallet};
/// use voice_ledger::pipeline::{InterpretContext, LocalEngine};
///
/// let engine = LocalEngine::new();
/// let action = engine.interpret("coffee 50 baht", &InterpretContext::default(), None);
/// match action.kind {
///     ActionKind::AddTransaction(tx) => {
///         assert_eq!(tx.amount, 50.0);
///         assert_eq!(tx.tx_type, TxType::Expense);
///         assert_eq!(tx.wallet, Wallet::Bank);
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[derive(Debug, Default)]
pub struct LocalEngine {
    classifier: CategoryClassifier,
}

impl LocalEngine {
    pub fn new() -> Self {
        Self {
            classifier: CategoryClassifier::new(),
        }
    }

    /// Interpret `utterance` without a model.
    ///
    /// `ocr_amount` is the total already extracted from a slip; when given
    /// it replaces the amount parsed from the utterance.
    pub fn interpret(
        &self,
        utterance: &str,
        ctx: &InterpretContext,
        ocr_amount: Option<f64>,
    ) -> Action {
        let lang = ctx.language;
        let lowered = utterance.trim().to_lowercase();

        if !ctx.is_ocr() {
            if let Some(action) = self.view_request(&lowered, lang) {
                return action;
            }
            if intent::classify(&lowered) == Intent::Question {
                return Action::planning(
                    messages::offline_planning(lang),
                    thought(lang, "question"),
                );
            }
            if let Some(action) = self.debt_command(&lowered, ctx) {
                return action;
            }
            if let Some(action) = self.budget_command(&lowered, lang) {
                return action;
            }
        }

        let amount = ocr_amount
            .filter(|a| a.is_finite() && *a > 0.0)
            .unwrap_or_else(|| parse_amount(utterance));
        if !(amount.is_finite() && amount > 0.0) {
            return Action::unknown(messages::retry_amount(lang), thought(lang, "no amount"));
        }

        self.transaction(utterance, ctx, amount)
    }

    // -----------------------------------------------------------------------
    // Rules
    // -----------------------------------------------------------------------

    /// SHOW_DEBTS / SHOW_SUMMARY, only when no amount is spoken.
    fn view_request(&self, text: &str, lang: Language) -> Option<Action> {
        if parse_amount(text) > 0.0 {
            return None;
        }
        if any_marker(text, DEBT_VIEW_MARKERS) {
            return Some(Action::new(
                ActionKind::ShowDebts,
                messages::show_debts(lang),
                thought(lang, "SHOW_DEBTS"),
            ));
        }
        if any_marker(text, SUMMARY_MARKERS) {
            return Some(Action::new(
                ActionKind::ShowSummary,
                messages::show_summary(lang),
                thought(lang, "SHOW_SUMMARY"),
            ));
        }
        None
    }

    fn debt_command(&self, text: &str, ctx: &InterpretContext) -> Option<Action> {
        let lend = is_lend(text);
        if !lend && !any_marker(text, BORROW_MARKERS) {
            return None;
        }

        let lang = ctx.language;
        let amount = parse_amount(text);
        if amount <= 0.0 {
            return Some(Action::unknown(messages::retry_amount(lang), thought(lang, "debt without amount")));
        }

        let person = extract_person(text, lend);
        let message = messages::debt_recorded(lang, lend, &person, amount);
        let debt = Debt {
            amount,
            person,
            wallet: detect_wallet(text, ctx.default_wallet),
            note: None,
        };
        let (kind, name) = if lend {
            (ActionKind::Lend(debt), "LEND")
        } else {
            (ActionKind::Borrow(debt), "BORROW")
        };
        Some(Action::new(kind, message, thought(lang, name)))
    }

    fn budget_command(&self, text: &str, lang: Language) -> Option<Action> {
        if !any_marker(text, BUDGET_MARKERS) {
            return None;
        }
        let amount = parse_amount(text);
        if amount <= 0.0 {
            return Some(Action::unknown(messages::retry_amount(lang), thought(lang, "budget without amount")));
        }
        let period = BudgetPeriod::from_hint(text).unwrap_or_default();
        Some(Action::new(
            ActionKind::SetBudget { amount, period },
            messages::budget_set(lang, period == BudgetPeriod::Monthly, amount),
            thought(lang, "SET_BUDGET"),
        ))
    }

    fn transaction(&self, utterance: &str, ctx: &InterpretContext, amount: f64) -> Action {
        let lang = ctx.language;

        // A bare slip has no caption; classify and route on the slip text.
        let signal = match ctx.ocr_text.as_deref() {
            Some(ocr) if ctx.is_ocr() && utterance.trim().is_empty() => ocr,
            _ => utterance,
        };

        let category = self.classifier.classify(signal);
        let tx_type = detect_tx_type(signal, category == Category::Income);
        let wallet = detect_wallet(signal, ctx.default_wallet);
        let bank_account_id = match wallet {
            Wallet::Bank => find_mentioned_account(signal, &ctx.accounts).map(|a| a.id.clone()),
            Wallet::Cash => None,
        };
        let description = if utterance.trim().is_empty() {
            messages::generic_description(lang, tx_type).to_string()
        } else {
            clean_description(utterance, lang, tx_type)
        };

        log::debug!(
            "local: {:?} {amount} category={category:?} wallet={wallet:?}",
            tx_type
        );

        let message = messages::recorded(lang, tx_type, amount, &description);
        Action::new(
            ActionKind::AddTransaction(Transaction {
                amount,
                tx_type,
                category: category.label(lang).to_string(),
                description,
                wallet,
                bank_account_id,
                icon: Some(category.icon().to_string()),
            }),
            message,
            thought(lang, &format!("ADD_TRANSACTION {category:?}")),
        )
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn any_marker(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| matches_keyword(text, m))
}

fn thought(lang: Language, detail: &str) -> String {
    match lang {
        Language::Th => format!("ประมวลผลแบบออฟไลน์: {detail}"),
        Language::En => format!("offline rules: {detail}"),
    }
}

/// "ให้ยืม", "ให้ต้นยืม", "lend", "lent".
fn is_lend(text: &str) -> bool {
    if any_marker(text, LEND_MARKERS) {
        return true;
    }
    match (text.find("ให้"), text.find("ยืม")) {
        (Some(give), Some(borrow)) => give < borrow,
        _ => false,
    }
}

/// Best-effort counterparty of a debt utterance.
///
/// Thai: the word between "ให้" and "ยืม" ("ให้ต้นยืม"), otherwise the
/// word after "ยืม". English: the word after "from"/"to", otherwise after
/// the verb.
fn extract_person(text: &str, lend: bool) -> String {
    let candidate = thai_person(text, lend)
        .or_else(|| after_word(text, "from"))
        .or_else(|| after_word(text, "to"))
        .or_else(|| {
            ["borrowed", "borrow", "lent", "lend", "loaned"]
                .iter()
                .find_map(|verb| after_word(text, verb))
        });
    candidate.unwrap_or_else(|| UNKNOWN_PERSON.to_string())
}

fn thai_person(text: &str, lend: bool) -> Option<String> {
    let borrow_at = text.find("ยืม")?;
    if lend {
        if let Some(give_at) = text[..borrow_at].rfind("ให้") {
            let between = &text[give_at + "ให้".len()..borrow_at];
            if let Some(name) = first_name_token(between) {
                return Some(name);
            }
        }
    }
    first_name_token(&text[borrow_at + "ยืม".len()..])
}

fn after_word(text: &str, word: &str) -> Option<String> {
    let mut tokens = text.split_whitespace();
    tokens.position(|t| t == word)?;
    first_name_token(&tokens.collect::<Vec<_>>().join(" "))
}

/// First token left after removing amounts, particles and connectives.
fn first_name_token(fragment: &str) -> Option<String> {
    let mut s = strip_amounts(fragment);
    for filler in PERSON_FILLERS {
        s = s.replace(filler, " ");
    }

    let mut rest = s.trim();
    loop {
        let before = rest;
        for prefix in PERSON_PREFIXES {
            if let Some(stripped) = rest.strip_prefix(prefix) {
                let ascii = prefix.is_ascii();
                // ASCII prefixes only on a token boundary ("tom" keeps its "to").
                if !ascii || stripped.is_empty() || stripped.starts_with(char::is_whitespace) {
                    rest = stripped.trim_start();
                }
            }
        }
        if rest == before {
            break;
        }
    }

    rest.split_whitespace()
        .next()
        .filter(|t| t.chars().any(char::is_alphabetic))
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
