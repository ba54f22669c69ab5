//! The caller's snapshot handed to the interpreter on every call.
//!
//! The interpreter never mutates it and keeps nothing from it between
//! calls. Deserializable from JSON so the CLI can read it from a file.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::action::{BankAccount, Language, TxType, Wallet};
use crate::config::{InterpreterConfig, UserProfile};

/// Where the utterance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Speech-to-text transcript.
    #[default]
    Voice,
    /// Typed by the user.
    Text,
    /// Text extracted from a photographed slip or receipt.
    Ocr,
}

/// Aggregate balance of each wallet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Balances {
    pub cash: f64,
    pub bank: f64,
}

/// A recently recorded transaction, for the model's reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTransaction {
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type", default)]
    pub tx_type: TxType,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// An open debt, for the model's reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenDebt {
    pub person: String,
    pub amount: f64,
    /// `true` when the user lent the money.
    #[serde(default)]
    pub lent: bool,
    #[serde(default)]
    pub note: Option<String>,
}

/// An upcoming reminder, for the model's reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingReminder {
    pub description: String,
    #[serde(default)]
    pub amount: f64,
    pub date: NaiveDate,
}

/// Everything the interpreter may consult for one call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpretContext {
    pub language: Language,
    pub channel: Channel,
    pub balances: Balances,
    /// Remaining spendable budget for today, when one is set.
    pub daily_budget: Option<f64>,
    pub accounts: Vec<BankAccount>,
    pub recent_transactions: Vec<RecentTransaction>,
    pub debts: Vec<OpenDebt>,
    pub reminders: Vec<UpcomingReminder>,
    /// Raw OCR text, on the OCR channel only.
    pub ocr_text: Option<String>,
    /// Reference date for relative dates; the local date when absent.
    pub today: Option<NaiveDate>,
    pub default_wallet: Wallet,
    pub profile: UserProfile,
}

impl InterpretContext {
    /// Empty context carrying the configured language, wallet and profile.
    pub fn from_config(config: &InterpreterConfig) -> Self {
        Self {
            language: config.language,
            default_wallet: config.default_wallet,
            profile: config.profile.clone(),
            ..Self::default()
        }
    }

    /// Fill language, wallet and profile from `config` where the caller
    /// left them unset in a JSON file.
    pub fn with_defaults_from(mut self, config: &InterpreterConfig, raw: &serde_json::Value) -> Self {
        if raw.get("language").is_none() {
            self.language = config.language;
        }
        if raw.get("default_wallet").is_none() {
            self.default_wallet = config.default_wallet;
        }
        if raw.get("profile").is_none() {
            self.profile = config.profile.clone();
        }
        self
    }

    /// Switch to the OCR channel with `text` as the slip content.
    pub fn with_ocr_text(mut self, text: impl Into<String>) -> Self {
        self.channel = Channel::Ocr;
        self.ocr_text = Some(text.into());
        self
    }

    /// Reference date for "today" / "tomorrow".
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn is_ocr(&self) -> bool {
        self.channel == Channel::Ocr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_json() {
        let json = r#"{
            "language": "en",
            "channel": "text",
            "balances": { "cash": 1200.5 },
            "accounts": [ { "id": "65f0c1a2b3c4d5e6f7a8b9c0", "name": "KBank", "bankCode": "kbank" } ],
            "today": "2026-10-16"
        }"#;
        let ctx: InterpretContext = serde_json::from_str(json).expect("parse");
        assert_eq!(ctx.language, Language::En);
        assert_eq!(ctx.channel, Channel::Text);
        assert_eq!(ctx.balances.cash, 1200.5);
        assert_eq!(ctx.balances.bank, 0.0);
        assert_eq!(ctx.accounts[0].bank.as_deref(), Some("kbank"));
        assert_eq!(ctx.default_wallet, Wallet::Bank);
        assert_eq!(ctx.today(), NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
    }

    #[test]
    fn config_defaults_fill_missing_fields_only() {
        let config = InterpreterConfig {
            language: Language::En,
            default_wallet: Wallet::Cash,
            profile: UserProfile {
                first_name: "Malee".into(),
                ..UserProfile::default()
            },
        };
        let raw: serde_json::Value = serde_json::json!({ "language": "th" });
        let ctx: InterpretContext = serde_json::from_value(raw.clone()).expect("parse");
        let ctx = ctx.with_defaults_from(&config, &raw);

        assert_eq!(ctx.language, Language::Th);
        assert_eq!(ctx.default_wallet, Wallet::Cash);
        assert_eq!(ctx.profile.first_name, "Malee");
    }

    #[test]
    fn ocr_text_switches_channel() {
        let ctx = InterpretContext::default().with_ocr_text("โอนเงินสำเร็จ");
        assert!(ctx.is_ocr());
        assert_eq!(ctx.ocr_text.as_deref(), Some("โอนเงินสำเร็จ"));
    }
}
