//! Payer / payee disambiguation on transfer slips.
//!
//! A slip shows both parties. When one of them is the user, the keyword
//! closest to the user's name tells which side they are on.

use crate::action::TxType;
use crate::config::UserProfile;

/// Words that introduce the paying party.
static SENDER_KEYWORDS: &[&str] = &["จาก", "ผู้โอน", "from", "sender", "payer"];

/// Words that introduce the receiving party.
static RECEIVER_KEYWORDS: &[&str] = &[
    "ไปยัง", "ถึง", "ผู้รับ", "เข้าบัญชี", "to", "receiver", "recipient", "payee",
];

/// Honorifics that precede every name on a slip.
static TITLES: &[&str] = &["นาย", "นาง", "นางสาว", "น.ส.", "mr", "mrs", "ms", "miss"];

/// Characters inspected on each side of an alias.
const PROXIMITY_CHARS: usize = 30;

/// Aliases no longer than this are too noisy to match.
const MIN_ALIAS_CHARS: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Sender,
    Receiver,
}

/// Infer the transaction direction from where the user's name sits on the
/// slip.
///
/// Alias preceded by a sender keyword, or followed by a receiver keyword:
/// the user paid (`Expense`). Alias preceded by a receiver keyword: the user
/// was paid (`Income`). `None` when no alias is found or no keyword is near.
pub fn infer_direction(ocr_text: &str, profile: &UserProfile) -> Option<TxType> {
    let text = ocr_text.to_lowercase();
    for alias in aliases(profile) {
        for (at, _) in text.match_indices(alias.as_str()) {
            let end = at + alias.len();
            let before = &text[back(&text, at, PROXIMITY_CHARS)..at];
            let after = &text[end..forward(&text, end, PROXIMITY_CHARS)];

            let verdict = match nearest_before(before) {
                Some(Side::Sender) => Some(TxType::Expense),
                Some(Side::Receiver) => Some(TxType::Income),
                None if nearest_after(after) == Some(Side::Receiver) => Some(TxType::Expense),
                None => None,
            };
            if let Some(tx_type) = verdict {
                log::debug!("ocr: user alias found on slip, direction {tx_type:?}");
                return Some(tx_type);
            }
        }
    }
    None
}

/// Lowercased name tokens of the user, longer than two characters and not
/// an honorific.
fn aliases(profile: &UserProfile) -> Vec<String> {
    let email_local = profile.email.split('@').next().unwrap_or("");
    let mut out: Vec<String> = Vec::new();
    let tokens = profile
        .first_name
        .split_whitespace()
        .chain(profile.full_name.split_whitespace())
        .chain(email_local.split(['.', '_', '-', '+']));
    for token in tokens {
        let token = token.trim().to_lowercase();
        if token.chars().count() >= MIN_ALIAS_CHARS
            && !TITLES.contains(&token.as_str())
            && !out.contains(&token)
        {
            out.push(token);
        }
    }
    out
}

/// Side of the keyword that ends closest to the end of `window`.
fn nearest_before(window: &str) -> Option<Side> {
    keyword_hits(window)
        .max_by_key(|(pos, len, _)| pos + len)
        .map(|(_, _, side)| side)
}

/// Side of the keyword that starts closest to the start of `window`.
fn nearest_after(window: &str) -> Option<Side> {
    keyword_hits(window)
        .min_by_key(|(pos, _, _)| *pos)
        .map(|(_, _, side)| side)
}

fn keyword_hits(window: &str) -> impl Iterator<Item = (usize, usize, Side)> + '_ {
    SENDER_KEYWORDS
        .iter()
        .map(|kw| (*kw, Side::Sender))
        .chain(RECEIVER_KEYWORDS.iter().map(|kw| (*kw, Side::Receiver)))
        .flat_map(move |(kw, side)| {
            window
                .match_indices(kw)
                .filter(move |(pos, _)| !kw.is_ascii() || on_word_boundary(window, *pos, kw.len()))
                .map(move |(pos, _)| (pos, kw.len(), side))
        })
}

fn on_word_boundary(text: &str, at: usize, len: usize) -> bool {
    let before = text[..at].chars().next_back().map_or(true, |c| !c.is_alphanumeric());
    let after = text[at + len..].chars().next().map_or(true, |c| !c.is_alphanumeric());
    before && after
}

fn back(text: &str, from: usize, chars: usize) -> usize {
    text[..from]
        .char_indices()
        .rev()
        .nth(chars.saturating_sub(1))
        .map_or(0, |(i, _)| i)
}

fn forward(text: &str, from: usize, chars: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(chars)
        .map_or(text.len(), |(i, _)| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            first_name: "สมชาย".into(),
            full_name: "นาย สมชาย ใจดี".into(),
            email: "somchai.j@example.com".into(),
        }
    }

    #[test]
    fn user_as_sender_is_expense() {
        let slip = "โอนเงินสำเร็จ\nจาก\nนาย สมชาย ใจดี\nxxx-x-x1234-x\nไปยัง\nนางสาว มาลี สุขใจ\n500.00";
        assert_eq!(infer_direction(slip, &profile()), Some(TxType::Expense));
    }

    #[test]
    fn user_as_receiver_is_income() {
        let slip = "โอนเงินสำเร็จ\nจาก\nนางสาว มาลี สุขใจ\nxxx-x-x9876-x\nไปยัง\nนาย สมชาย ใจดี\n500.00";
        assert_eq!(infer_direction(slip, &profile()), Some(TxType::Income));
    }

    #[test]
    fn english_slip_uses_email_alias() {
        let slip = "Transfer successful\nFrom: SOMCHAI J\nTo: Malee S\nAmount 250.00";
        assert_eq!(infer_direction(slip, &profile()), Some(TxType::Expense));
    }

    #[test]
    fn alias_followed_by_receiver_keyword_is_expense() {
        let slip = "somchai -> to merchant 7-eleven";
        assert_eq!(infer_direction(slip, &profile()), Some(TxType::Expense));
    }

    #[test]
    fn no_alias_means_no_verdict() {
        let slip = "จาก มาลี ไปยัง ร้านกาแฟ 80.00";
        assert_eq!(infer_direction(slip, &profile()), None);
    }

    #[test]
    fn short_aliases_are_ignored() {
        let p = UserProfile {
            first_name: "จอ".into(),
            full_name: String::new(),
            email: "jo@example.com".into(),
        };
        assert!(aliases(&p).iter().all(|a| a.chars().count() > 2));
        assert!(!aliases(&p).contains(&"jo".to_string()));
    }

    #[test]
    fn honorifics_are_not_aliases() {
        let found = aliases(&profile());
        assert_eq!(found, vec!["สมชาย".to_string(), "ใจดี".to_string(), "somchai".to_string()]);
    }
}
