//! Instruction contract sent to the model.
//!
//! [`PromptBuilder::build_chat`] returns a `(system_msg, user_msg)` pair for
//! an OpenAI-compatible `/v1/chat/completions` endpoint:
//!
//! * the system message lists every action kind with one example each, the
//!   output rules, the question markers, the wallet cues and the icon
//!   allow-list;
//! * the user message carries the rendered context and the utterance.
//!
//! The language only changes the framing sentence and the language the
//! model is told to answer in; the contract itself is shared.

use crate::action::Language;
use crate::nlp::intent::{ENGLISH_QUESTION_MARKERS, THAI_QUESTION_MARKERS};

// ---------------------------------------------------------------------------
// Icon allow-list
// ---------------------------------------------------------------------------

/// Symbolic icon names the model may use; anything else is dropped.
pub static ICON_ALLOW_LIST: &[&str] = &[
    "utensils", "coffee", "car", "bus", "fuel", "receipt", "zap", "wifi", "phone",
    "home", "heart-pulse", "pill", "graduation-cap", "book", "film", "gamepad",
    "music", "plane", "shopping-bag", "shirt", "gift", "banknote", "briefcase",
    "piggy-bank", "credit-card", "circle",
];

/// `true` when `icon` is on [`ICON_ALLOW_LIST`].
pub fn is_allowed_icon(icon: &str) -> bool {
    ICON_ALLOW_LIST.contains(&icon)
}

// ---------------------------------------------------------------------------
// Framing
// ---------------------------------------------------------------------------

const ROLE_TH: &str = "\
คุณคือผู้ช่วยบันทึกรายรับรายจ่ายส่วนตัว แปลงคำพูดหรือข้อความของผู้ใช้ให้เป็นคำสั่ง JSON หนึ่งรายการ
ตอบ message และ thought เป็นภาษาไทยเสมอ";

const ROLE_EN: &str = "\
You are a personal finance assistant. Convert the user's utterance into exactly one JSON action.
Always write message and thought in English.";

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

const ACTIONS: &str = r#"
ACTIONS (field "kind" is required):
- ADD_TRANSACTION: amount, type ("income"|"expense"), category, description, wallet ("cash"|"bank"), bankAccountId (optional), icon (optional)
- TRANSFER: amount, from_wallet, to_wallet, from_bank, to_bank, fromBankAccountId (optional), toBankAccountId (optional)
- SET_BUDGET: amount, period ("daily"|"monthly")
- SET_BALANCE: wallet, amount, bankAccountId (optional)
- BORROW / LEND: amount, person, wallet, note (optional, may start with a [Tag])
- SHOW_SUMMARY / SHOW_DEBTS: no extra fields
- REMIND: description, amount, date (YYYY-MM-DD), wallet
- PLANNING: advice in message only
- UNKNOWN: message only

EXAMPLES:
"ข้าวมันไก่ 45 บาท" -> {"kind":"ADD_TRANSACTION","amount":45,"type":"expense","category":"อาหาร","description":"ข้าวมันไก่","wallet":"bank","icon":"utensils","message":"บันทึกรายจ่าย ข้าวมันไก่ 45 บาทแล้ว","thought":"food purchase, no wallet cue"}
"โอนจากกสิกรไปไทยพาณิชย์ 2000" -> {"kind":"TRANSFER","amount":2000,"from_wallet":"bank","to_wallet":"bank","from_bank":"kbank","to_bank":"scb","message":"โอน 2,000 บาทแล้ว","thought":"bank to bank"}
"ตั้งงบวันละ 300" -> {"kind":"SET_BUDGET","amount":300,"period":"daily","message":"ตั้งงบรายวัน 300 บาทแล้ว","thought":"daily budget"}
"เงินสดเหลือ 1500" -> {"kind":"SET_BALANCE","wallet":"cash","amount":1500,"message":"ปรับยอดเงินสดเป็น 1,500 บาทแล้ว","thought":"balance correction"}
"ยืมเงินแม่ 500" -> {"kind":"BORROW","amount":500,"person":"แม่","wallet":"cash","message":"บันทึกการยืมเงินจาก แม่ 500 บาทแล้ว","thought":"borrowed from mother"}
"ให้ต้นยืม 200" -> {"kind":"LEND","amount":200,"person":"ต้น","wallet":"cash","message":"บันทึกการให้ ต้น ยืม 200 บาทแล้ว","thought":"lent to friend"}
"สรุปเดือนนี้" -> {"kind":"SHOW_SUMMARY","message":"นี่คือสรุปรายรับรายจ่ายของคุณ","thought":"summary view"}
"ดูหนี้" -> {"kind":"SHOW_DEBTS","message":"นี่คือรายการหนี้สินของคุณ","thought":"debt view"}
"เตือนจ่ายค่าเน็ตพรุ่งนี้ 599" -> {"kind":"REMIND","description":"ค่าเน็ต","amount":599,"date":"<TOMORROW>","wallet":"bank","message":"ตั้งเตือนแล้ว","thought":"relative date resolved from today"}
"ซื้อรองเท้า 3000 ได้ไหม" -> {"kind":"PLANNING","message":"<advice based on balances and budget>","thought":"question, not a purchase"}
"อืม" -> {"kind":"UNKNOWN","message":"ไม่แน่ใจว่าต้องการทำอะไร ลองพูดใหม่อีกครั้งนะ","thought":"no intent"}
"#;

const RULES: &str = "
RULES:
1. Reply with exactly one raw JSON object. No prose. A ```json code fence is allowed.
2. Every reply has \"thought\" (internal, not shown) and \"message\" (shown to the user).
3. Amounts are plain positive numbers. Never invent an amount; use UNKNOWN when none is given.
4. Resolve relative dates (today, tomorrow) from the current date in CONTEXT.
5. Only use a bankAccountId listed in CONTEXT; otherwise give the bank name.";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds the instruction contract and the per-call user message.
///
/// # Example
/// ```rust
/// use voice_ledger::action::Language;
/// use voice_ledger::llm::PromptBuilder;
///
/// let builder = PromptBuilder::new(Language::Th);
/// let (system, user) = builder.build_chat("กาแฟ 50", "BALANCES: cash 100");
/// assert!(system.contains("ADD_TRANSACTION"));
/// assert!(user.contains("กาแฟ 50"));
/// ```
pub struct PromptBuilder {
    language: Language,
}

impl PromptBuilder {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Build a **(system_msg, user_msg)** pair.
    ///
    /// * `system_msg` — role, action list, examples and rules.
    /// * `user_msg` — the rendered context followed by the utterance.
    pub fn build_chat(&self, utterance: &str, context: &str) -> (String, String) {
        let mut system = String::with_capacity(4096);
        system.push_str(self.role());
        system.push('\n');
        system.push_str(ACTIONS);
        system.push_str(RULES);
        system.push_str(&question_rule());
        system.push_str(&wallet_rule());
        system.push_str(&icon_rule());

        let mut user = String::with_capacity(context.len() + utterance.len() + 64);
        if !context.is_empty() {
            user.push_str("CONTEXT:\n");
            user.push_str(context);
            user.push_str("\n\n");
        }
        user.push_str("UTTERANCE:\n");
        user.push_str(utterance);

        (system, user)
    }

    fn role(&self) -> &'static str {
        match self.language {
            Language::Th => ROLE_TH,
            Language::En => ROLE_EN,
        }
    }
}

fn question_rule() -> String {
    let markers: Vec<String> = THAI_QUESTION_MARKERS
        .iter()
        .chain(ENGLISH_QUESTION_MARKERS)
        .map(|m| format!("\"{m}\""))
        .collect();
    format!(
        "\n6. COMMAND vs QUESTION: if the utterance contains any of {} it is a QUESTION. \
         Answer questions with PLANNING and never record a transaction for them.",
        markers.join(", ")
    )
}

fn wallet_rule() -> String {
    "\n7. WALLET: \"เงินสด\", \"จ่ายสด\", \"cash\" mean \"cash\". \"โอน\", \"บัตร\", \"สแกน\", \
     \"พร้อมเพย์\", \"transfer\", \"card\", \"bank\" mean \"bank\". With no cue use \"bank\"."
        .to_string()
}

fn icon_rule() -> String {
    format!(
        "\n8. ICON: pick the icon matching the description from: {}.",
        ICON_ALLOW_LIST.join(", ")
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
