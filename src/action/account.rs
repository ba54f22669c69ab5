//! Account healing.
//!
//! The model frequently returns a bank name ("kbank", "กสิกร") or a
//! placeholder id (`"<KBANK_ID>"`, `"acc_1"`) instead of the real account
//! id. [`resolve_account`] maps those hints back onto the caller's list of
//! known accounts, or gives up with `None`.

use serde::{Deserialize, Serialize};

use super::{Action, ActionKind};

/// One of the user's bank accounts, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: String,
    /// Display name chosen by the user ("Kasikorn savings").
    pub name: String,
    /// Bank code / short name ("kbank", "scb").
    #[serde(default, alias = "bankCode")]
    pub bank: Option<String>,
    #[serde(default)]
    pub balance: f64,
}

/// Minimum length of a generated identifier (ObjectId-style ids are 24).
const MIN_GENERATED_ID_LEN: usize = 11;

/// `true` when `id` looks like a real generated identifier rather than a
/// placeholder the model made up.
pub fn looks_like_generated_id(id: &str) -> bool {
    let id = id.trim();
    id.chars().count() >= MIN_GENERATED_ID_LEN && !id.contains('<') && !id.contains('>')
}

/// Resolve a bank-account reference against `accounts`.
///
/// 1. A `provided_id` that belongs to a known account is trusted as-is.
///    A generated-looking id that is not in the list is a hallucination
///    and is not passed through.
/// 2. Otherwise `bank_hint` is lowercased and matched against every
///    account's display name and bank code by containment in either
///    direction; the first match wins.
///
/// Returns `None` when nothing matches. Callers fall back to the wallet's
/// aggregate balance in that case.
pub fn resolve_account(
    bank_hint: Option<&str>,
    provided_id: Option<&str>,
    accounts: &[BankAccount],
) -> Option<String> {
    if let Some(id) = provided_id.map(str::trim).filter(|id| !id.is_empty()) {
        if accounts.iter().any(|a| a.id == id) {
            return Some(id.to_string());
        }
        if looks_like_generated_id(id) {
            log::debug!("account: generated-looking id not in account list, trying name match");
        }
    }

    let hint = bank_hint.map(|h| h.trim().to_lowercase()).filter(|h| !h.is_empty())?;

    let found = accounts.iter().find(|account| {
        let name = account.name.trim().to_lowercase();
        let code = account
            .bank
            .as_deref()
            .map(|b| b.trim().to_lowercase())
            .unwrap_or_default();
        matches_bidirectional(&hint, &name) || matches_bidirectional(&hint, &code)
    });

    match found {
        Some(account) => Some(account.id.clone()),
        None => {
            log::warn!("account: could not resolve bank hint '{hint}'");
            None
        }
    }
}

/// Find the first known account whose name or bank code occurs in `text`.
///
/// Used by the local engine, which has no explicit hint to work with.
pub fn find_mentioned_account<'a>(text: &str, accounts: &'a [BankAccount]) -> Option<&'a BankAccount> {
    let text = text.to_lowercase();
    accounts.iter().find(|account| {
        let name = account.name.trim().to_lowercase();
        let code = account.bank.as_deref().unwrap_or("").trim().to_lowercase();
        (!name.is_empty() && text.contains(&name)) || (!code.is_empty() && text.contains(&code))
    })
}

/// Heal every bank-account reference carried by `action`.
///
/// References are whatever the model supplied (a real id, a placeholder or
/// a bank name). Unresolvable references become `None`.
pub fn heal_accounts(action: Action, accounts: &[BankAccount]) -> Action {
    let heal = |reference: Option<String>, bank: Option<&str>| -> Option<String> {
        let reference = reference?;
        resolve_account(bank.or(Some(reference.as_str())), Some(reference.as_str()), accounts)
    };

    let kind = match action.kind {
        ActionKind::AddTransaction(mut tx) => {
            tx.bank_account_id = heal(tx.bank_account_id.take(), None);
            ActionKind::AddTransaction(tx)
        }
        ActionKind::SetBalance {
            wallet,
            amount,
            bank_account_id,
        } => ActionKind::SetBalance {
            wallet,
            amount,
            bank_account_id: heal(bank_account_id, None),
        },
        ActionKind::Transfer(mut transfer) => {
            transfer.from_bank_account_id =
                heal(transfer.from_bank_account_id.take(), transfer.from_bank.as_deref());
            transfer.to_bank_account_id =
                heal(transfer.to_bank_account_id.take(), transfer.to_bank.as_deref());
            ActionKind::Transfer(transfer)
        }
        other => other,
    };
    Action { kind, ..action }
}

fn matches_bidirectional(hint: &str, candidate: &str) -> bool {
    // An empty candidate is contained in everything.
    !candidate.is_empty() && (hint.contains(candidate) || candidate.contains(hint))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> Vec<BankAccount> {
        vec![
            BankAccount {
                id: "65f0c1a2b3c4d5e6f7a8b9c0".into(),
                name: "Kasikorn Savings".into(),
                bank: Some("kbank".into()),
                balance: 12_000.0,
            },
            BankAccount {
                id: "65f0c1a2b3c4d5e6f7a8b9c1".into(),
                name: "ไทยพาณิชย์".into(),
                bank: Some("scb".into()),
                balance: 3_000.0,
            },
            BankAccount {
                id: "65f0c1a2b3c4d5e6f7a8b9c2".into(),
                name: "".into(),
                bank: None,
                balance: 0.0,
            },
        ]
    }

    #[test]
    fn genuine_id_in_list_is_trusted() {
        let id = resolve_account(Some("whatever"), Some("65f0c1a2b3c4d5e6f7a8b9c1"), &accounts());
        assert_eq!(id.as_deref(), Some("65f0c1a2b3c4d5e6f7a8b9c1"));
    }

    #[test]
    fn placeholder_id_is_healed_by_bank_name() {
        let id = resolve_account(Some("KBank"), Some("<KBANK_ACCOUNT_ID>"), &accounts());
        assert_eq!(id.as_deref(), Some("65f0c1a2b3c4d5e6f7a8b9c0"));
    }

    #[test]
    fn unknown_short_id_is_dropped() {
        let id = resolve_account(None, Some("acc_1"), &accounts());
        assert_eq!(id, None);
    }

    #[test]
    fn hallucinated_long_id_is_not_passed_through() {
        let id = resolve_account(None, Some("aaaaaaaaaaaaaaaaaaaaaaaa"), &accounts());
        assert_eq!(id, None);
    }

    #[test]
    fn hint_contained_in_name_matches() {
        let id = resolve_account(Some("kasikorn"), None, &accounts());
        assert_eq!(id.as_deref(), Some("65f0c1a2b3c4d5e6f7a8b9c0"));
    }

    #[test]
    fn name_contained_in_hint_matches() {
        let id = resolve_account(Some("โอนเข้าไทยพาณิชย์"), None, &accounts());
        assert_eq!(id.as_deref(), Some("65f0c1a2b3c4d5e6f7a8b9c1"));
    }

    #[test]
    fn empty_names_never_match_everything() {
        let id = resolve_account(Some("krungsri"), None, &accounts());
        assert_eq!(id, None);
    }

    #[test]
    fn blank_hint_returns_none() {
        assert_eq!(resolve_account(Some("   "), None, &accounts()), None);
        assert_eq!(resolve_account(None, None, &accounts()), None);
    }

    #[test]
    fn generated_id_heuristic() {
        assert!(looks_like_generated_id("65f0c1a2b3c4d5e6f7a8b9c0"));
        assert!(!looks_like_generated_id("<ID>"));
        assert!(!looks_like_generated_id("<account-id-goes-here>"));
        assert!(!looks_like_generated_id("1234567890"));
    }

    #[test]
    fn short_known_id_is_trusted() {
        let accts = vec![BankAccount {
            id: "acc1".into(),
            name: "Wallet app".into(),
            bank: None,
            balance: 0.0,
        }];
        assert_eq!(resolve_account(None, Some("acc1"), &accts).as_deref(), Some("acc1"));
    }

    #[test]
    fn transfer_references_are_healed() {
        use crate::action::{Transfer, Wallet};

        let action = Action::new(
            ActionKind::Transfer(Transfer {
                amount: 2000.0,
                from_wallet: Wallet::Bank,
                to_wallet: Wallet::Bank,
                from_bank: Some("kbank".into()),
                to_bank: Some("ttb".into()),
                from_bank_account_id: Some("<FROM_ID>".into()),
                to_bank_account_id: Some("ttb".into()),
            }),
            "",
            "",
        );
        match heal_accounts(action, &accounts()).kind {
            ActionKind::Transfer(t) => {
                assert_eq!(t.from_bank_account_id.as_deref(), Some("65f0c1a2b3c4d5e6f7a8b9c0"));
                assert_eq!(t.to_bank_account_id, None);
                assert_eq!(t.to_bank.as_deref(), Some("ttb"));
            }
            other => panic!("expected TRANSFER, got {other:?}"),
        }
    }

    #[test]
    fn bank_name_reference_becomes_real_id() {
        let action = Action::new(
            ActionKind::SetBalance {
                wallet: crate::action::Wallet::Bank,
                amount: 900.0,
                bank_account_id: Some("scb".into()),
            },
            "",
            "",
        );
        match heal_accounts(action, &accounts()).kind {
            ActionKind::SetBalance { bank_account_id, .. } => {
                assert_eq!(bank_account_id.as_deref(), Some("65f0c1a2b3c4d5e6f7a8b9c1"));
            }
            other => panic!("expected SET_BALANCE, got {other:?}"),
        }
    }

    #[test]
    fn mentioned_account_found_by_code() {
        let accts = accounts();
        let found = find_mentioned_account("โอน 500 ผ่าน SCB", &accts);
        assert_eq!(found.map(|a| a.id.as_str()), Some("65f0c1a2b3c4d5e6f7a8b9c1"));
        assert!(find_mentioned_account("กาแฟ 50", &accts).is_none());
    }
}
