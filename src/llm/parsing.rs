//! Turning the model's reply into an [`Action`].
//!
//! Models wrap JSON in code fences, add a sentence before it, spell enum
//! values loosely and write amounts as strings. The reply is parsed into a
//! permissive [`RawAction`] first and then normalized field by field; only
//! a reply with no JSON object or an unrecognizable `kind` is an error.

use chrono::{Days, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

use crate::action::{
    messages, Action, ActionKind, BankAccount, BudgetPeriod, Debt, Reminder, Transaction,
    Transfer, TxType, Wallet, UNKNOWN_PERSON,
};
use crate::llm::oracle::LlmError;
use crate::llm::prompt::is_allowed_icon;
use crate::nlp::parse_amount;
use crate::pipeline::InterpretContext;

// ---------------------------------------------------------------------------
// Raw shape
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAction {
    #[serde(alias = "action", alias = "intent")]
    kind: Option<String>,
    amount: Option<Value>,
    #[serde(rename = "type")]
    tx_type: Option<String>,
    category: Option<String>,
    description: Option<String>,
    wallet: Option<String>,
    #[serde(rename = "bankAccountId", alias = "bank_account_id")]
    bank_account_id: Option<String>,
    #[serde(alias = "bank_name")]
    bank: Option<String>,
    icon: Option<String>,
    from_wallet: Option<String>,
    to_wallet: Option<String>,
    from_bank: Option<String>,
    to_bank: Option<String>,
    #[serde(rename = "fromBankAccountId", alias = "from_bank_account_id")]
    from_bank_account_id: Option<String>,
    #[serde(rename = "toBankAccountId", alias = "to_bank_account_id")]
    to_bank_account_id: Option<String>,
    period: Option<String>,
    person: Option<String>,
    note: Option<String>,
    date: Option<String>,
    message: Option<String>,
    thought: Option<String>,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Parse and repair one model reply.
///
/// Bank references are carried as-is (a known id, otherwise the bank name
/// or a placeholder) for the account-healing step that follows.
pub fn parse_action_response(raw: &str, ctx: &InterpretContext) -> Result<Action, LlmError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| LlmError::Parse("no JSON object in reply".into()))?;
    let parsed: RawAction =
        serde_json::from_str(json).map_err(|e| LlmError::Parse(e.to_string()))?;

    let kind_name = parsed
        .kind
        .as_deref()
        .map(normalize_kind)
        .ok_or_else(|| LlmError::Parse("reply has no kind".into()))?;

    let kind = build_kind(&kind_name, &parsed, ctx)?;
    Ok(Action::new(
        kind,
        parsed.message.unwrap_or_default(),
        parsed.thought.unwrap_or_default(),
    ))
}

/// Remove a surrounding Markdown code fence (```` ```json ... ``` ````).
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let body = rest.find('\n').map_or("", |i| &rest[i + 1..]);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// The outermost `{ ... }` of the fence-stripped reply.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let body = strip_code_fence(raw);
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (end > start).then(|| &body[start..=end])
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn normalize_kind(kind: &str) -> String {
    let upper = kind.trim().to_uppercase().replace([' ', '-'], "_");
    match upper.as_str() {
        "ADD" | "TRANSACTION" | "ADD_TX" | "EXPENSE" | "INCOME" => "ADD_TRANSACTION".into(),
        "BUDGET" => "SET_BUDGET".into(),
        "BALANCE" => "SET_BALANCE".into(),
        "SUMMARY" => "SHOW_SUMMARY".into(),
        "DEBTS" | "SHOW_DEBT" => "SHOW_DEBTS".into(),
        "REMINDER" | "SET_REMINDER" => "REMIND".into(),
        "QUESTION" | "ADVICE" | "PLAN" => "PLANNING".into(),
        _ => upper,
    }
}

fn build_kind(kind: &str, raw: &RawAction, ctx: &InterpretContext) -> Result<ActionKind, LlmError> {
    let lang = ctx.language;
    let reference = |id: &Option<String>, bank: &Option<String>| {
        account_reference(id, bank, &ctx.accounts)
    };
    let wallet = |hint: &Option<String>| {
        hint.as_deref()
            .and_then(Wallet::from_hint)
            .unwrap_or(ctx.default_wallet)
    };

    let kind = match kind {
        "ADD_TRANSACTION" => {
            let tx_type = raw
                .tx_type
                .as_deref()
                .and_then(TxType::from_hint)
                .or_else(|| raw.kind.as_deref().and_then(TxType::from_hint))
                .unwrap_or(TxType::Expense);
            ActionKind::AddTransaction(Transaction {
                amount: amount(&raw.amount),
                tx_type,
                category: non_empty(&raw.category)
                    .unwrap_or_else(|| messages::other_category(lang).to_string()),
                description: non_empty(&raw.description)
                    .unwrap_or_else(|| messages::generic_description(lang, tx_type).to_string()),
                wallet: wallet(&raw.wallet),
                bank_account_id: reference(&raw.bank_account_id, &raw.bank),
                icon: non_empty(&raw.icon).filter(|icon| is_allowed_icon(icon)),
            })
        }
        "TRANSFER" => ActionKind::Transfer(Transfer {
            amount: amount(&raw.amount),
            from_wallet: wallet(&raw.from_wallet),
            to_wallet: wallet(&raw.to_wallet),
            from_bank: non_empty(&raw.from_bank),
            to_bank: non_empty(&raw.to_bank),
            from_bank_account_id: reference(&raw.from_bank_account_id, &raw.from_bank),
            to_bank_account_id: reference(&raw.to_bank_account_id, &raw.to_bank),
        }),
        "SET_BUDGET" => ActionKind::SetBudget {
            amount: amount(&raw.amount),
            period: raw
                .period
                .as_deref()
                .and_then(BudgetPeriod::from_hint)
                .unwrap_or_default(),
        },
        "SET_BALANCE" => ActionKind::SetBalance {
            wallet: wallet(&raw.wallet),
            amount: amount(&raw.amount),
            bank_account_id: reference(&raw.bank_account_id, &raw.bank),
        },
        "BORROW" | "LEND" => {
            let debt = Debt {
                amount: amount(&raw.amount),
                person: non_empty(&raw.person).unwrap_or_else(|| UNKNOWN_PERSON.to_string()),
                wallet: wallet(&raw.wallet),
                note: non_empty(&raw.note),
            };
            if kind == "BORROW" {
                ActionKind::Borrow(debt)
            } else {
                ActionKind::Lend(debt)
            }
        }
        "SHOW_SUMMARY" => ActionKind::ShowSummary,
        "SHOW_DEBTS" => ActionKind::ShowDebts,
        "REMIND" => ActionKind::Remind(Reminder {
            description: non_empty(&raw.description)
                .or_else(|| non_empty(&raw.note))
                .unwrap_or_default(),
            amount: amount(&raw.amount),
            date: resolve_date(raw.date.as_deref(), ctx.today()),
            wallet: wallet(&raw.wallet),
        }),
        "PLANNING" => ActionKind::Planning,
        "UNKNOWN" => ActionKind::Unknown,
        other => return Err(LlmError::Parse(format!("unrecognized kind '{other}'"))),
    };
    Ok(kind)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Missing amounts become `0.0`, which the amount guard rejects.
fn amount(value: &Option<Value>) -> f64 {
    value.as_ref().map_or(0.0, amount_value)
}

fn amount_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let cleaned = s.replace([',', '฿'], "");
            cleaned
                .trim()
                .parse::<f64>()
                .unwrap_or_else(|_| parse_amount(s))
        }
        _ => 0.0,
    }
}

/// An id of a known account wins. Otherwise the bank name is a better hint
/// than an id the model made up, however real it looks.
fn account_reference(
    id: &Option<String>,
    bank: &Option<String>,
    accounts: &[BankAccount],
) -> Option<String> {
    let id = non_empty(id);
    match id {
        Some(id) if accounts.iter().any(|a| a.id == id) => Some(id),
        id => non_empty(bank).or(id),
    }
}

/// ISO date, or a relative word resolved against `today`.
fn resolve_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return today;
    };
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date;
    }

    let lower = raw.to_lowercase();
    let offset = if lower.contains("day after tomorrow") || lower.contains("มะรืน") {
        2
    } else if lower.contains("tomorrow") || lower.contains("พรุ่งนี้") {
        1
    } else {
        if !(lower.contains("today") || lower.contains("วันนี้")) {
            log::warn!("parse: unreadable reminder date '{raw}', using today");
        }
        0
    };
    today.checked_add_days(Days::new(offset)).unwrap_or(today)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
