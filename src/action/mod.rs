//! The interpreter's output contract.
//!
//! Every utterance, typed command or scanned slip ends up as exactly one
//! [`Action`]: a `kind`-tagged payload plus a user-facing `message` and an
//! internal `thought`, both in the user's language.
//!
//! The JSON shape produced by `serde` is the same shape the language model
//! is asked to emit, so [`Action`] doubles as the wire format between the
//! interpreter and its caller:
//!
//! ```json
//! {
//!   "kind": "ADD_TRANSACTION",
//!   "amount": 50.0,
//!   "type": "expense",
//!   "category": "อาหาร",
//!   "description": "กาแฟ",
//!   "wallet": "cash",
//!   "message": "บันทึกรายจ่าย 50 บาทแล้ว",
//!   "thought": "coffee purchase, cash"
//! }
//! ```

pub mod account;
pub mod guard;
pub mod messages;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use account::{
    find_mentioned_account, heal_accounts, looks_like_generated_id, resolve_account, BankAccount,
};
pub use guard::{apply_question_override, guard_amount, is_valid_amount};

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Language of the user; every message and fallback label follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Th,
    En,
}

impl Language {
    /// ISO-639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Th => "th",
            Language::En => "en",
        }
    }
}

// ---------------------------------------------------------------------------
// Wallet / TxType / BudgetPeriod
// ---------------------------------------------------------------------------

/// The two money containers a transaction can affect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wallet {
    Cash,
    #[default]
    Bank,
}

impl Wallet {
    /// Normalize a free-form wallet spelling.
    ///
    /// Returns `None` when `hint` names neither wallet; callers pick their
    /// own default so a wallet is never left ambiguous.
    pub fn from_hint(hint: &str) -> Option<Self> {
        let h = hint.trim().to_lowercase();
        if h.is_empty() {
            return None;
        }
        match h.as_str() {
            "cash" | "เงินสด" | "สด" | "wallet" | "กระเป๋าเงิน" => Some(Wallet::Cash),
            "bank" | "ธนาคาร" | "card" | "บัตร" | "transfer" | "โอน" | "account" | "บัญชี" => {
                Some(Wallet::Bank)
            }
            _ if h.contains("cash") || h.contains("เงินสด") => Some(Wallet::Cash),
            _ if h.contains("bank") || h.contains("ธนาคาร") || h.contains("บัญชี") => {
                Some(Wallet::Bank)
            }
            _ => None,
        }
    }
}

/// Direction of an ADD_TRANSACTION.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Income,
    #[default]
    Expense,
}

impl TxType {
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim().to_lowercase().as_str() {
            "income" | "รายรับ" | "รายได้" | "in" => Some(TxType::Income),
            "expense" | "รายจ่าย" | "out" | "spend" => Some(TxType::Expense),
            _ => None,
        }
    }
}

/// Budget period for SET_BUDGET.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    #[default]
    Daily,
    Monthly,
}

impl BudgetPeriod {
    pub fn from_hint(hint: &str) -> Option<Self> {
        let h = hint.trim().to_lowercase();
        if h.contains("month") || h.contains("เดือน") {
            Some(BudgetPeriod::Monthly)
        } else if h.contains("day") || h.contains("daily") || h.contains("วัน") {
            Some(BudgetPeriod::Daily)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// ADD_TRANSACTION payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub amount: f64,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub category: String,
    pub description: String,
    pub wallet: Wallet,
    #[serde(rename = "bankAccountId", default, skip_serializing_if = "Option::is_none")]
    pub bank_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// TRANSFER payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub amount: f64,
    pub from_wallet: Wallet,
    pub to_wallet: Wallet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_bank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_bank: Option<String>,
    #[serde(rename = "fromBankAccountId", default, skip_serializing_if = "Option::is_none")]
    pub from_bank_account_id: Option<String>,
    #[serde(rename = "toBankAccountId", default, skip_serializing_if = "Option::is_none")]
    pub to_bank_account_id: Option<String>,
}

/// Counterparty of a debt nobody was named for.
pub const UNKNOWN_PERSON: &str = "Unknown";

/// BORROW / LEND payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub amount: f64,
    /// Counterparty. Never empty; `"Unknown"` when nobody was named.
    pub person: String,
    pub wallet: Wallet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Debt {
    /// Bracketed tag at the start of the note, e.g. `Shopee` for
    /// `"[Shopee] installment 3/10"`.
    pub fn tag(&self) -> Option<&str> {
        let note = self.note.as_deref()?.trim_start();
        let rest = note.strip_prefix('[')?;
        let end = rest.find(']')?;
        let tag = rest[..end].trim();
        (!tag.is_empty()).then_some(tag)
    }
}

/// REMIND payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub wallet: Wallet,
}

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// The `kind`-discriminated body of an [`Action`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    AddTransaction(Transaction),
    Transfer(Transfer),
    SetBudget {
        amount: f64,
        period: BudgetPeriod,
    },
    SetBalance {
        wallet: Wallet,
        amount: f64,
        #[serde(rename = "bankAccountId", default, skip_serializing_if = "Option::is_none")]
        bank_account_id: Option<String>,
    },
    Borrow(Debt),
    Lend(Debt),
    ShowSummary,
    ShowDebts,
    Remind(Reminder),
    Planning,
    Unknown,
}

impl ActionKind {
    /// Wire name of the variant (`"ADD_TRANSACTION"`, …).
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::AddTransaction(_) => "ADD_TRANSACTION",
            ActionKind::Transfer(_) => "TRANSFER",
            ActionKind::SetBudget { .. } => "SET_BUDGET",
            ActionKind::SetBalance { .. } => "SET_BALANCE",
            ActionKind::Borrow(_) => "BORROW",
            ActionKind::Lend(_) => "LEND",
            ActionKind::ShowSummary => "SHOW_SUMMARY",
            ActionKind::ShowDebts => "SHOW_DEBTS",
            ActionKind::Remind(_) => "REMIND",
            ActionKind::Planning => "PLANNING",
            ActionKind::Unknown => "UNKNOWN",
        }
    }

    /// Amount of a money-moving variant; `None` for everything else.
    pub fn money_amount(&self) -> Option<f64> {
        match self {
            ActionKind::AddTransaction(t) => Some(t.amount),
            ActionKind::Transfer(t) => Some(t.amount),
            ActionKind::SetBudget { amount, .. } => Some(*amount),
            ActionKind::SetBalance { amount, .. } => Some(*amount),
            ActionKind::Borrow(d) | ActionKind::Lend(d) => Some(d.amount),
            _ => None,
        }
    }

    /// Views that never mutate state.
    pub fn is_read_only(&self) -> bool {
        matches!(self, ActionKind::ShowSummary | ActionKind::ShowDebts)
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One structured financial intent, immutable once emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(flatten)]
    pub kind: ActionKind,
    /// User-facing confirmation.
    #[serde(default)]
    pub message: String,
    /// Internal rationale, not shown to the user.
    #[serde(default)]
    pub thought: String,
}

impl Action {
    pub fn new(kind: ActionKind, message: impl Into<String>, thought: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            thought: thought.into(),
        }
    }

    /// An UNKNOWN action carrying `message`.
    pub fn unknown(message: impl Into<String>, thought: impl Into<String>) -> Self {
        Self::new(ActionKind::Unknown, message, thought)
    }

    /// A PLANNING action carrying advisory `message`.
    pub fn planning(message: impl Into<String>, thought: impl Into<String>) -> Self {
        Self::new(ActionKind::Planning, message, thought)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
