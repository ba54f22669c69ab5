//! `ActionResolver` — the orchestrator.
//!
//! ```text
//! utterance + InterpretContext
//!        │
//!        ├─ [OCR] AmountExtractor::extract ── not found ──► UNKNOWN (rescan)
//!        │
//!        ├─ ActionOracle::interpret (remote) ── Err ──┐
//!        │      └─ [OCR] direction + amount fill-in   │
//!        │                                            ▼
//!        │                                   LocalEngine::interpret
//!        ▼
//! finalize: question override → account healing → amount guard
//! ```

use std::sync::Arc;

use crate::action::{
    apply_question_override, guard_amount, heal_accounts, is_valid_amount, messages, Action,
    ActionKind,
};
use crate::config::{AppConfig, AppPaths};
use crate::llm::{ActionOracle, ApiOracle, KeyPool};
use crate::ocr::{infer_direction, AmountExtractor};

use super::context::InterpretContext;
use super::local::LocalEngine;

// ---------------------------------------------------------------------------
// ActionResolver
// ---------------------------------------------------------------------------

/// Turns one utterance into exactly one validated [`Action`].
///
/// Never fails: every remote failure degrades to the local engine, and a
/// missing amount becomes an UNKNOWN retry action.
pub struct ActionResolver {
    oracle: Option<Arc<dyn ActionOracle>>,
    local: LocalEngine,
    extractor: AmountExtractor,
}

impl ActionResolver {
    /// A resolver with an optional remote oracle.
    pub fn new(oracle: Option<Arc<dyn ActionOracle>>, extractor: AmountExtractor) -> Self {
        Self {
            oracle,
            local: LocalEngine::new(),
            extractor,
        }
    }

    /// Build from application config.
    ///
    /// The remote oracle is wired only when the LLM section is active and
    /// `offline` is false.
    pub fn from_config(config: &AppConfig, paths: &AppPaths, offline: bool) -> Self {
        let extractor = AmountExtractor::new(&config.ocr);
        if offline || !config.llm.is_active() {
            log::info!("resolver: remote interpretation disabled, using local rules");
            return Self::new(None, extractor);
        }

        let pool = Arc::new(KeyPool::load(
            config.llm.api_keys.clone(),
            paths.rotation_file.clone(),
        ));
        log::info!(
            "resolver: remote interpretation via {} ({} key(s))",
            config.llm.model,
            pool.len()
        );
        let oracle: Arc<dyn ActionOracle> = Arc::new(ApiOracle::from_config(&config.llm, pool));
        Self::new(Some(oracle), extractor)
    }

    /// Attach (or replace) the remote oracle.
    pub fn with_oracle(mut self, oracle: Arc<dyn ActionOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Resolve `utterance` through the remote path when available, falling
    /// back to the local engine.
    pub async fn resolve(&self, utterance: &str, ctx: &InterpretContext) -> Action {
        let ocr_amount = match self.scan(utterance, ctx) {
            Ok(amount) => amount,
            Err(action) => return self.finalize(action, utterance, ctx),
        };

        let remote = match &self.oracle {
            Some(oracle) => match oracle.interpret(utterance, ctx).await {
                Ok(action) => self.adjust_remote(action, ctx, ocr_amount),
                Err(e) => {
                    log::warn!("resolver: remote path failed, using local rules: {e}");
                    None
                }
            },
            None => None,
        };

        let action = remote.unwrap_or_else(|| self.local.interpret(utterance, ctx, ocr_amount));
        self.finalize(action, utterance, ctx)
    }

    /// Resolve with the local engine only.
    pub fn resolve_offline(&self, utterance: &str, ctx: &InterpretContext) -> Action {
        let action = match self.scan(utterance, ctx) {
            Ok(ocr_amount) => self.local.interpret(utterance, ctx, ocr_amount),
            Err(action) => action,
        };
        self.finalize(action, utterance, ctx)
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    /// On the OCR channel, extract the slip total. `Err` carries the rescan
    /// action when no total was found.
    fn scan(&self, utterance: &str, ctx: &InterpretContext) -> Result<Option<f64>, Action> {
        if !ctx.is_ocr() {
            return Ok(None);
        }

        let text = ctx.ocr_text.as_deref().unwrap_or(utterance);
        let result = self.extractor.extract(text);
        if !result.found {
            log::info!("resolver: no total found on slip");
            return Err(Action::unknown(
                messages::scan_no_total(ctx.language),
                format!("ocr: no amount ({:?})", result.source),
            ));
        }
        log::debug!("resolver: slip total {} via {:?}", result.amount, result.source);
        Ok(Some(result.amount))
    }

    /// OCR post-processing of a model answer. `None` sends the utterance to
    /// the local engine.
    fn adjust_remote(
        &self,
        action: Action,
        ctx: &InterpretContext,
        ocr_amount: Option<f64>,
    ) -> Option<Action> {
        let Some(extracted) = ocr_amount else {
            return Some(action);
        };

        match action.kind {
            ActionKind::Unknown => {
                log::info!("resolver: inconclusive model answer for slip, using local rules");
                None
            }
            ActionKind::AddTransaction(mut tx) => {
                if !is_valid_amount(tx.amount) {
                    log::debug!("resolver: filling slip amount {extracted}");
                    tx.amount = extracted;
                }
                let slip = ctx.ocr_text.as_deref().unwrap_or_default();
                if let Some(direction) = infer_direction(slip, &ctx.profile) {
                    if direction != tx.tx_type {
                        log::info!("resolver: slip layout overrides type to {direction:?}");
                    }
                    tx.tx_type = direction;
                }
                Some(Action {
                    kind: ActionKind::AddTransaction(tx),
                    ..action
                })
            }
            _ => Some(action),
        }
    }

    fn finalize(&self, action: Action, utterance: &str, ctx: &InterpretContext) -> Action {
        let action = apply_question_override(action, utterance, ctx.channel, ctx.language);
        let action = heal_accounts(action, &ctx.accounts);
        let action = guard_amount(action, ctx.language);
        log::info!("resolver: {} via {:?}", action.kind.name(), ctx.channel);
        action
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::action::{BankAccount, Language, Transaction, TxType, Wallet};
    use crate::config::{OcrConfig, UserProfile};
    use crate::llm::{parse_action_response, LlmError};
    use crate::pipeline::Channel;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Always answers with a fixed action.
    struct AlwaysOk(Action);

    #[async_trait]
    impl ActionOracle for AlwaysOk {
        async fn interpret(&self, _u: &str, _ctx: &InterpretContext) -> Result<Action, LlmError> {
            Ok(self.0.clone())
        }
    }

    /// Parses a fixed raw model reply, as the API oracle does.
    struct RepliesWith(&'static str);

    #[async_trait]
    impl ActionOracle for RepliesWith {
        async fn interpret(&self, _u: &str, ctx: &InterpretContext) -> Result<Action, LlmError> {
            parse_action_response(self.0, ctx)
        }
    }

    /// Always returns the given error.
    struct AlwaysFails(LlmErrorKind);

    enum LlmErrorKind {
        Timeout,
        Parse,
        Exhausted,
    }

    #[async_trait]
    impl ActionOracle for AlwaysFails {
        async fn interpret(&self, _u: &str, _ctx: &InterpretContext) -> Result<Action, LlmError> {
            let err = match self.0 {
                LlmErrorKind::Timeout => LlmError::Timeout,
                LlmErrorKind::Parse => LlmError::Parse("bad json".into()),
                LlmErrorKind::Exhausted => LlmError::Exhausted {
                    attempts: 2,
                    last: Box::new(LlmError::Status {
                        code: 429,
                        body: "quota".into(),
                    }),
                },
            };
            Err(err)
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn extractor() -> AmountExtractor {
        AmountExtractor::new(&OcrConfig::default()).with_reference_year(2026)
    }

    fn resolver(oracle: impl ActionOracle + 'static) -> ActionResolver {
        ActionResolver::new(None, extractor()).with_oracle(Arc::new(oracle))
    }

    fn expense(amount: f64) -> Action {
        Action::new(
            ActionKind::AddTransaction(Transaction {
                amount,
                tx_type: TxType::Expense,
                category: "อาหาร".into(),
                description: "รองเท้า".into(),
                wallet: Wallet::Bank,
                bank_account_id: None,
                icon: None,
            }),
            "บันทึกแล้ว",
            "purchase",
        )
    }

    fn transaction(action: Action) -> Transaction {
        match action.kind {
            ActionKind::AddTransaction(tx) => tx,
            other => panic!("expected ADD_TRANSACTION, got {other:?}"),
        }
    }

    fn slip_ctx(text: &str) -> InterpretContext {
        InterpretContext {
            profile: UserProfile {
                first_name: "Somchai".into(),
                full_name: "Somchai Jaidee".into(),
                email: "somchai.j@example.com".into(),
            },
            ..InterpretContext::default()
        }
        .with_ocr_text(text)
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn remote_answer_passes_through() {
        let action = resolver(AlwaysOk(expense(3000.0)))
            .resolve("รองเท้า 3000", &InterpretContext::default())
            .await;
        assert_eq!(transaction(action).amount, 3000.0);
    }

    #[tokio::test]
    async fn question_overrides_remote_transaction() {
        let action = resolver(AlwaysOk(expense(3000.0)))
            .resolve("ซื้อรองเท้า 3000 ได้ไหม", &InterpretContext::default())
            .await;
        assert!(matches!(action.kind, ActionKind::Planning));
        assert_eq!(action.message, messages::question_detected(Language::Th));
    }

    #[tokio::test]
    async fn remote_failures_fall_back_to_local() {
        for kind in [LlmErrorKind::Timeout, LlmErrorKind::Parse, LlmErrorKind::Exhausted] {
            let action = resolver(AlwaysFails(kind))
                .resolve("กาแฟ 50 บาท", &InterpretContext::default())
                .await;
            let tx = transaction(action);
            assert_eq!(tx.amount, 50.0);
            assert_eq!(tx.category, "อาหาร");
        }
    }

    #[tokio::test]
    async fn invalid_remote_amount_becomes_retry() {
        let action = resolver(AlwaysOk(expense(0.0)))
            .resolve("รองเท้า", &InterpretContext::default())
            .await;
        assert!(matches!(action.kind, ActionKind::Unknown));
        assert_eq!(action.message, messages::retry_amount(Language::Th));
    }

    #[tokio::test]
    async fn placeholder_account_ids_are_healed_or_dropped() {
        let ctx = InterpretContext {
            accounts: vec![BankAccount {
                id: "65f0c1a2b3c4d5e6f7a8b9c1".into(),
                name: "SCB savings".into(),
                bank: Some("scb".into()),
                balance: 0.0,
            }],
            ..InterpretContext::default()
        };
        let with_reference = |reference: &str| {
            let mut answer = expense(120.0);
            if let ActionKind::AddTransaction(tx) = &mut answer.kind {
                tx.bank_account_id = Some(reference.into());
            }
            answer
        };

        let tx = transaction(resolver(AlwaysOk(with_reference("<SCB_ID>"))).resolve("ข้าว 120", &ctx).await);
        assert_eq!(tx.bank_account_id.as_deref(), Some("65f0c1a2b3c4d5e6f7a8b9c1"));

        let tx = transaction(resolver(AlwaysOk(with_reference("<KTB_ID>"))).resolve("ข้าว 120", &ctx).await);
        assert_eq!(tx.bank_account_id, None);

        let tx = transaction(
            resolver(AlwaysOk(with_reference("0123456789abcdef01234567")))
                .resolve("ข้าว 120", &ctx)
                .await,
        );
        assert_eq!(tx.bank_account_id, None);
    }

    #[tokio::test]
    async fn made_up_id_with_bank_name_heals_to_real_account() {
        let ctx = InterpretContext {
            accounts: vec![BankAccount {
                id: "65f0c1a2b3c4d5e6f7a8b9c1".into(),
                name: "SCB savings".into(),
                bank: Some("scb".into()),
                balance: 0.0,
            }],
            ..InterpretContext::default()
        };

        let reply = r#"{"kind":"ADD_TRANSACTION","amount":120,"type":"expense","wallet":"bank","bankAccountId":"0123456789abcdef01234567","bank":"scb"}"#;
        let tx = transaction(resolver(RepliesWith(reply)).resolve("ข้าว 120 scb", &ctx).await);
        assert_eq!(tx.bank_account_id.as_deref(), Some("65f0c1a2b3c4d5e6f7a8b9c1"));

        let reply = r#"{"kind":"SET_BALANCE","amount":900,"wallet":"bank","bankAccountId":"0123456789abcdef01234567","bank":"scb"}"#;
        let action = resolver(RepliesWith(reply)).resolve("scb เหลือ 900", &ctx).await;
        match action.kind {
            ActionKind::SetBalance { bank_account_id, .. } => {
                assert_eq!(bank_account_id.as_deref(), Some("65f0c1a2b3c4d5e6f7a8b9c1"));
            }
            other => panic!("expected SET_BALANCE, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slip_without_total_asks_to_rescan() {
        let ctx = slip_ctx("ธนาคารกสิกรไทย\nโอนเงินสำเร็จ\n16 ต.ค. 69 10:42");
        let action = resolver(AlwaysOk(expense(99.0))).resolve("", &ctx).await;
        assert!(matches!(action.kind, ActionKind::Unknown));
        assert_eq!(action.message, messages::scan_no_total(Language::Th));
    }

    #[tokio::test]
    async fn slip_fills_missing_model_amount() {
        let ctx = slip_ctx("โอนเงินสำเร็จ\nจำนวนเงิน 1,250.00 บาท\nค่าธรรมเนียม 0.00 บาท");
        let tx = transaction(resolver(AlwaysOk(expense(f64::NAN))).resolve("", &ctx).await);
        assert_eq!(tx.amount, 1250.0);
    }

    #[tokio::test]
    async fn slip_layout_overrides_model_direction() {
        let ctx = slip_ctx("โอนเงินสำเร็จ\nจาก นาย สมชาย\nไปยัง Somchai Jaidee\nจำนวนเงิน 500.00 บาท");
        let tx = transaction(resolver(AlwaysOk(expense(500.0))).resolve("", &ctx).await);
        assert_eq!(tx.tx_type, TxType::Income);
    }

    #[tokio::test]
    async fn inconclusive_slip_answer_uses_local_engine() {
        let ctx = slip_ctx("โอนเงินสำเร็จ\nจำนวนเงิน 1,250.00 บาท");
        let unknown = Action::unknown("?", "");
        let tx = transaction(resolver(AlwaysOk(unknown)).resolve("", &ctx).await);
        assert_eq!(tx.amount, 1250.0);
    }

    #[tokio::test]
    async fn slip_caption_question_is_not_overridden() {
        let ctx = slip_ctx("จำนวนเงิน 300.00 บาท");
        assert_eq!(ctx.channel, Channel::Ocr);
        let action = resolver(AlwaysOk(expense(300.0))).resolve("ค่าอะไรนะ?", &ctx).await;
        assert!(matches!(action.kind, ActionKind::AddTransaction(_)));
    }

    #[test]
    fn offline_resolution_uses_local_rules() {
        let resolver = ActionResolver::new(None, extractor());
        let ctx = InterpretContext {
            language: Language::En,
            ..InterpretContext::default()
        };
        let tx = transaction(resolver.resolve_offline("coffee 50 baht", &ctx));
        assert_eq!(tx.amount, 50.0);
        assert_eq!(tx.tx_type, TxType::Expense);
        assert_eq!(tx.wallet, Wallet::Bank);
    }

    #[test]
    fn offline_config_wires_no_oracle() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::for_settings_file(&dir.path().join("settings.toml"));
        let resolver = ActionResolver::from_config(&AppConfig::default(), &paths, true);
        assert!(resolver.oracle.is_none());
    }
}
