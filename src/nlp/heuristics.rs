//! Keyword heuristics of the local engine: wallet, income/expense direction
//! and description cleanup.

use crate::action::{messages, Language, TxType, Wallet};
use crate::nlp::lexicon::matches_keyword;
use crate::nlp::numbers::strip_amounts;

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

static CASH_MARKERS: &[&str] = &["เงินสด", "จ่ายสด", "cash", "แบงก์", "เหรียญ", "ทอนเงิน"];

static BANK_MARKERS: &[&str] = &[
    "โอน", "บัตร", "สแกน", "พร้อมเพย์", "แอป", "ธนาคาร", "บัญชี", "transfer", "card",
    "bank", "promptpay", "qr", "debit", "credit",
];

/// Pick the wallet named by `text`, or `default` when no marker is present.
///
/// Cash markers are checked first: "จ่ายสดผ่านแอป" is still cash.
pub fn detect_wallet(text: &str, default: Wallet) -> Wallet {
    let text = text.to_lowercase();
    if CASH_MARKERS.iter().any(|kw| matches_keyword(&text, kw)) {
        Wallet::Cash
    } else if BANK_MARKERS.iter().any(|kw| matches_keyword(&text, kw)) {
        Wallet::Bank
    } else {
        default
    }
}

// ---------------------------------------------------------------------------
// Income / expense
// ---------------------------------------------------------------------------

static INCOME_MARKERS: &[&str] = &[
    "ได้รับ", "ได้เงิน", "รับเงิน", "รับ", "ได้ค่า", "ค่าจ้าง", "ค่าคอม", "ค่าตอบแทน",
    "เงินเข้า", "เงินเดือน", "รายได้", "โบนัส", "ขายได้", "received", "earned", "got paid", "salary", "income", "bonus", "refund",
];

static EXPENSE_MARKERS: &[&str] = &[
    "จ่าย", "ซื้อ", "เสีย", "ค่า", "เติม", "ใช้ไป", "paid", "pay", "bought", "buy",
    "spent", "spend",
];

/// Income only when income markers outnumber expense markers; expense
/// otherwise. `income_category` counts as one extra income marker.
pub fn detect_tx_type(text: &str, income_category: bool) -> TxType {
    let text = text.to_lowercase();
    let count = |markers: &[&str]| markers.iter().filter(|kw| matches_keyword(&text, kw)).count();

    let income = count(INCOME_MARKERS) + usize::from(income_category);
    let expense = count(EXPENSE_MARKERS);
    if income > expense {
        TxType::Income
    } else {
        TxType::Expense
    }
}

// ---------------------------------------------------------------------------
// Description
// ---------------------------------------------------------------------------

static FILLER_WORDS: &[&str] = &[
    "บาท", "baht", "thb", "฿", "ครับ", "ค่ะ", "คะ", "จ้า", "หน่อย", "ด้วย", "นะ",
    "เงินสด", "cash",
];

/// Shortest description kept as-is, in characters.
const MIN_DESCRIPTION_CHARS: usize = 2;

/// Remove amounts, currency words and polite particles from `text`.
///
/// Falls back to the generic "Income"/"Expense" label when fewer than two
/// characters survive.
pub fn clean_description(text: &str, lang: Language, tx_type: TxType) -> String {
    let mut out = strip_amounts(text);
    for filler in FILLER_WORDS {
        if filler.is_ascii() {
            out = remove_ascii_word(&out, filler);
        } else {
            out = out.replace(filler, " ");
        }
    }
    let out = out.split_whitespace().collect::<Vec<_>>().join(" ");

    if out.chars().count() < MIN_DESCRIPTION_CHARS {
        messages::generic_description(lang, tx_type).to_string()
    } else {
        out
    }
}

fn remove_ascii_word(text: &str, word: &str) -> String {
    text.split_whitespace()
        .filter(|token| !token.eq_ignore_ascii_case(word))
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_markers() {
        assert_eq!(detect_wallet("กาแฟ 50 เงินสด", Wallet::Bank), Wallet::Cash);
        assert_eq!(detect_wallet("โอนค่าเช่า 5000", Wallet::Cash), Wallet::Bank);
        assert_eq!(detect_wallet("paid by card", Wallet::Cash), Wallet::Bank);
    }

    #[test]
    fn wallet_defaults_when_no_marker() {
        assert_eq!(detect_wallet("coffee 50 baht", Wallet::Cash), Wallet::Cash);
        assert_eq!(detect_wallet("coffee 50 baht", Wallet::Bank), Wallet::Bank);
    }

    #[test]
    fn direction_defaults_to_expense() {
        assert_eq!(detect_tx_type("coffee 50 baht", false), TxType::Expense);
        assert_eq!(detect_tx_type("ซื้อข้าว 60", false), TxType::Expense);
    }

    #[test]
    fn income_markers_win_when_more_numerous() {
        assert_eq!(detect_tx_type("ได้รับเงินเดือน 30000", false), TxType::Income);
        assert_eq!(detect_tx_type("received 500 from mom", false), TxType::Income);
        assert_eq!(detect_tx_type("ขายของ 300", true), TxType::Income);
    }

    #[test]
    fn wages_and_commission_are_income() {
        assert_eq!(detect_tx_type("ได้ค่าจ้าง 5000", true), TxType::Income);
        assert_eq!(detect_tx_type("รับค่าจ้าง 800", true), TxType::Income);
        assert_eq!(detect_tx_type("ได้ค่าคอม 2000", false), TxType::Income);
    }

    #[test]
    fn polite_particle_is_not_received() {
        assert_eq!(detect_tx_type("ค่าไฟ 800 ครับ", false), TxType::Expense);
        assert_eq!(detect_tx_type("ซื้อของสำหรับงาน 300", false), TxType::Expense);
    }

    #[test]
    fn description_strips_amount_and_filler() {
        assert_eq!(clean_description("coffee 50 baht", Language::En, TxType::Expense), "coffee");
        assert_eq!(clean_description("ข้าวมันไก่ 45 บาทครับ", Language::Th, TxType::Expense), "ข้าวมันไก่");
    }

    #[test]
    fn short_description_gets_generic_label() {
        assert_eq!(clean_description("50 บาท", Language::Th, TxType::Expense), "รายจ่าย");
        assert_eq!(clean_description("500", Language::En, TxType::Income), "Income");
    }
}
