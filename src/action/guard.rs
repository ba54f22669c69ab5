//! Validation checkpoints every action passes before it leaves the
//! interpreter.
//!
//! Both guards are idempotent: running them on their own output returns
//! the same action.

use crate::nlp::intent::{self, Intent};
use crate::pipeline::Channel;

use super::{messages, Action, ActionKind, Language};

/// `true` for a finite, strictly positive amount.
pub fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

/// Replace a money-moving action with an invalid amount by an UNKNOWN
/// "please try again" action in the user's language.
///
/// REMIND is not money-moving; its amount only has to be finite and
/// non-negative, and is clamped to `0` otherwise.
pub fn guard_amount(action: Action, lang: Language) -> Action {
    if let Some(amount) = action.kind.money_amount() {
        if !is_valid_amount(amount) {
            log::warn!(
                "guard: rejecting {} with invalid amount {amount}",
                action.kind.name()
            );
            return Action::unknown(
                messages::retry_amount(lang),
                format!("rejected {}: amount {amount}", action.kind.name()),
            );
        }
        return action;
    }

    match action.kind {
        ActionKind::Remind(mut reminder) if !(reminder.amount.is_finite() && reminder.amount >= 0.0) => {
            reminder.amount = 0.0;
            Action { kind: ActionKind::Remind(reminder), ..action }
        }
        _ => action,
    }
}

/// Force an action to PLANNING when `utterance` reads like a question.
///
/// Skipped for read-only views, for actions that already are PLANNING, and
/// for the OCR channel (receipts are never questions).
pub fn apply_question_override(
    action: Action,
    utterance: &str,
    channel: Channel,
    lang: Language,
) -> Action {
    if channel == Channel::Ocr
        || action.kind.is_read_only()
        || matches!(action.kind, ActionKind::Planning)
    {
        return action;
    }

    if intent::classify(utterance) != Intent::Question {
        return action;
    }

    log::debug!(
        "guard: question markers found, overriding {} with PLANNING",
        action.kind.name()
    );
    let thought = if action.thought.is_empty() {
        format!("overrode {} (question detected)", action.kind.name())
    } else {
        format!("{} | overrode {} (question detected)", action.thought, action.kind.name())
    };
    Action::planning(messages::question_detected(lang), thought)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Reminder, Transaction, TxType, Wallet};
    use chrono::NaiveDate;

    fn add(amount: f64) -> Action {
        Action::new(
            ActionKind::AddTransaction(Transaction {
                amount,
                tx_type: TxType::Expense,
                category: "อาหาร".into(),
                description: "กาแฟ".into(),
                wallet: Wallet::Cash,
                bank_account_id: None,
                icon: None,
            }),
            "recorded",
            "",
        )
    }

    #[test]
    fn valid_amount_passes_untouched() {
        let action = add(50.0);
        assert_eq!(guard_amount(action.clone(), Language::Th), action);
    }

    #[test]
    fn zero_nan_and_negative_amounts_are_rejected() {
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let out = guard_amount(add(bad), Language::En);
            assert_eq!(out.kind, ActionKind::Unknown, "amount {bad}");
            assert_eq!(out.message, messages::retry_amount(Language::En));
        }
    }

    #[test]
    fn amount_guard_is_idempotent() {
        let once = guard_amount(add(0.0), Language::Th);
        let twice = guard_amount(once.clone(), Language::Th);
        assert_eq!(once, twice);
    }

    #[test]
    fn reminder_amount_is_clamped_not_rejected() {
        let action = Action::new(
            ActionKind::Remind(Reminder {
                description: "ค่าเช่า".into(),
                amount: f64::NAN,
                date: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
                wallet: Wallet::Bank,
            }),
            "",
            "",
        );
        match guard_amount(action, Language::Th).kind {
            ActionKind::Remind(r) => assert_eq!(r.amount, 0.0),
            other => panic!("expected REMIND, got {other:?}"),
        }
    }

    #[test]
    fn question_particle_forces_planning() {
        let out = apply_question_override(add(500.0), "ซื้อรองเท้า 500 ได้ไหม", Channel::Voice, Language::Th);
        assert_eq!(out.kind, ActionKind::Planning);
    }

    #[test]
    fn question_override_is_idempotent() {
        let text = "ซื้อรองเท้า 500 ได้ไหม";
        let once = apply_question_override(add(500.0), text, Channel::Text, Language::Th);
        let twice = apply_question_override(once.clone(), text, Channel::Text, Language::Th);
        assert_eq!(once, twice);
    }

    #[test]
    fn ocr_channel_is_never_overridden() {
        let out = apply_question_override(add(500.0), "ยอดเงิน?", Channel::Ocr, Language::Th);
        assert!(matches!(out.kind, ActionKind::AddTransaction(_)));
    }

    #[test]
    fn read_only_views_are_never_overridden() {
        let view = Action::new(ActionKind::ShowSummary, "summary", "");
        let out = apply_question_override(view.clone(), "สรุปเดือนนี้ใช้ไปเท่าไหร่", Channel::Voice, Language::Th);
        assert_eq!(out, view);
    }

    #[test]
    fn commands_pass_through() {
        let action = add(50.0);
        let out = apply_question_override(action.clone(), "กาแฟ 50 บาท", Channel::Voice, Language::Th);
        assert_eq!(out, action);
    }
}
