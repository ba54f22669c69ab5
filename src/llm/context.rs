//! Renders an [`InterpretContext`] into the compact text block the prompt
//! embeds before the utterance.
//!
//! Lists are capped so a long history cannot crowd out the instructions.

use std::fmt::Write as _;

use crate::action::messages::format_amount;
use crate::pipeline::InterpretContext;

/// Most recent transactions shown to the model.
const MAX_RECENT: usize = 5;
/// Open debts shown to the model.
const MAX_DEBTS: usize = 5;
/// Upcoming reminders shown to the model.
const MAX_REMINDERS: usize = 5;
/// OCR text is cut to this many characters.
const MAX_OCR_CHARS: usize = 1500;

/// Build the context block for one call.
///
/// # Example
/// ```rust
/// use voice_ledger::llm::render_context;
/// use voice_ledger::pipeline::InterpretContext;
///
/// let ctx = InterpretContext::default();
/// let text = render_context(&ctx);
/// assert!(text.contains("TODAY:"));
/// assert!(text.contains("LANGUAGE: th"));
/// ```
pub fn render_context(ctx: &InterpretContext) -> String {
    let mut out = String::with_capacity(512);

    // `write!` into a String cannot fail.
    let _ = writeln!(out, "TODAY: {}", ctx.today());
    let _ = writeln!(out, "LANGUAGE: {}", ctx.language.code());
    let _ = writeln!(
        out,
        "BALANCES: cash {} / bank {}",
        format_amount(ctx.balances.cash),
        format_amount(ctx.balances.bank)
    );
    if let Some(budget) = ctx.daily_budget {
        let _ = writeln!(out, "DAILY BUDGET LEFT: {}", format_amount(budget));
    }

    if !ctx.accounts.is_empty() {
        out.push_str("ACCOUNTS:\n");
        for account in &ctx.accounts {
            let _ = writeln!(
                out,
                "- id={} name={} bank={} balance={}",
                account.id,
                account.name,
                account.bank.as_deref().unwrap_or("-"),
                format_amount(account.balance)
            );
        }
    }

    if !ctx.recent_transactions.is_empty() {
        out.push_str("RECENT:\n");
        for tx in ctx.recent_transactions.iter().rev().take(MAX_RECENT) {
            let date = tx.date.map(|d| d.to_string()).unwrap_or_default();
            let _ = writeln!(
                out,
                "- {date} {:?} {} {} ({})",
                tx.tx_type,
                tx.description,
                format_amount(tx.amount),
                tx.category
            );
        }
    }

    if !ctx.debts.is_empty() {
        out.push_str("DEBTS:\n");
        for debt in ctx.debts.iter().take(MAX_DEBTS) {
            let direction = if debt.lent { "owes you" } else { "you owe" };
            let _ = writeln!(out, "- {} {direction} {}", debt.person, format_amount(debt.amount));
        }
    }

    if !ctx.reminders.is_empty() {
        out.push_str("REMINDERS:\n");
        for reminder in ctx.reminders.iter().take(MAX_REMINDERS) {
            let _ = writeln!(
                out,
                "- {} {} {}",
                reminder.date,
                reminder.description,
                format_amount(reminder.amount)
            );
        }
    }

    if let Some(ocr) = ctx.ocr_text.as_deref().filter(|t| !t.trim().is_empty()) {
        let clipped: String = ocr.chars().take(MAX_OCR_CHARS).collect();
        out.push_str("SLIP TEXT (OCR, a receipt is never a question):\n");
        out.push_str(&clipped);
        out.push('\n');
    }

    out.trim_end().to_string()
}
