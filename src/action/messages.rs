//! Localized user-facing strings emitted by the interpreter itself (the
//! model writes its own messages; these cover local and guard paths).

use super::{Language, TxType};

pub fn retry_amount(lang: Language) -> &'static str {
    match lang {
        Language::Th => "ไม่พบจำนวนเงินที่ชัดเจน ลองพูดหรือพิมพ์ใหม่อีกครั้งนะ",
        Language::En => "I couldn't find a clear amount. Please try again.",
    }
}

pub fn scan_no_total(lang: Language) -> &'static str {
    match lang {
        Language::Th => "สแกนสำเร็จ แต่ไม่พบยอดเงินที่ชัดเจน ลองถ่ายใหม่อีกครั้งนะ",
        Language::En => "Scan succeeded but no clear total was found. Please retry.",
    }
}

pub fn question_detected(lang: Language) -> &'static str {
    match lang {
        Language::Th => "ดูเหมือนเป็นคำถามนะ ยังไม่ได้บันทึกรายการใดๆ ลองดูคำแนะนำด้านล่าง",
        Language::En => "That sounds like a question, so nothing was recorded. Here is some advice.",
    }
}

pub fn offline_planning(lang: Language) -> &'static str {
    match lang {
        Language::Th => "ตอนนี้ผู้ช่วยวางแผนออฟไลน์อยู่ ลองถามใหม่อีกครั้งเมื่อเชื่อมต่อได้",
        Language::En => "The planning assistant is offline right now. Please ask again later.",
    }
}

pub fn other_category(lang: Language) -> &'static str {
    match lang {
        Language::Th => "อื่นๆ",
        Language::En => "Other",
    }
}

pub fn generic_description(lang: Language, tx_type: TxType) -> &'static str {
    match (lang, tx_type) {
        (Language::Th, TxType::Income) => "รายรับ",
        (Language::Th, TxType::Expense) => "รายจ่าย",
        (Language::En, TxType::Income) => "Income",
        (Language::En, TxType::Expense) => "Expense",
    }
}

pub fn recorded(lang: Language, tx_type: TxType, amount: f64, description: &str) -> String {
    let amount = format_amount(amount);
    match (lang, tx_type) {
        (Language::Th, TxType::Income) => format!("บันทึกรายรับ {description} {amount} บาทแล้ว"),
        (Language::Th, TxType::Expense) => format!("บันทึกรายจ่าย {description} {amount} บาทแล้ว"),
        (Language::En, TxType::Income) => format!("Recorded income: {description} {amount} THB"),
        (Language::En, TxType::Expense) => format!("Recorded expense: {description} {amount} THB"),
    }
}

pub fn debt_recorded(lang: Language, lend: bool, person: &str, amount: f64) -> String {
    let amount = format_amount(amount);
    match (lang, lend) {
        (Language::Th, false) => format!("บันทึกการยืมเงินจาก {person} {amount} บาทแล้ว"),
        (Language::Th, true) => format!("บันทึกการให้ {person} ยืม {amount} บาทแล้ว"),
        (Language::En, false) => format!("Recorded borrowing {amount} THB from {person}"),
        (Language::En, true) => format!("Recorded lending {amount} THB to {person}"),
    }
}

pub fn budget_set(lang: Language, monthly: bool, amount: f64) -> String {
    let amount = format_amount(amount);
    match (lang, monthly) {
        (Language::Th, false) => format!("ตั้งงบรายวัน {amount} บาทแล้ว"),
        (Language::Th, true) => format!("ตั้งงบรายเดือน {amount} บาทแล้ว"),
        (Language::En, false) => format!("Daily budget set to {amount} THB"),
        (Language::En, true) => format!("Monthly budget set to {amount} THB"),
    }
}

pub fn show_summary(lang: Language) -> &'static str {
    match lang {
        Language::Th => "นี่คือสรุปรายรับรายจ่ายของคุณ",
        Language::En => "Here is your summary.",
    }
}

pub fn show_debts(lang: Language) -> &'static str {
    match lang {
        Language::Th => "นี่คือรายการหนี้สินของคุณ",
        Language::En => "Here are your debts.",
    }
}

/// `1250` → `"1,250"`, `12.5` → `"12.50"`.
pub fn format_amount(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let whole = cents / 100;
    let frac = (cents % 100).abs();

    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if cents < 0 {
        grouped.insert(0, '-');
    }
    if frac == 0 {
        grouped
    } else {
        format!("{grouped}.{frac:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_amount_groups_thousands() {
        assert_eq!(format_amount(1250.0), "1,250");
        assert_eq!(format_amount(500000.0), "500,000");
        assert_eq!(format_amount(12.5), "12.50");
        assert_eq!(format_amount(999.0), "999");
    }

    #[test]
    fn format_amount_keeps_sign_of_small_negatives() {
        assert_eq!(format_amount(-0.5), "-0.50");
        assert_eq!(format_amount(-1250.0), "-1,250");
        assert_eq!(format_amount(-0.001), "0");
    }

    #[test]
    fn recorded_message_follows_language() {
        assert!(recorded(Language::Th, TxType::Expense, 50.0, "กาแฟ").contains("รายจ่าย"));
        assert!(recorded(Language::En, TxType::Income, 50.0, "salary").starts_with("Recorded income"));
    }
}
