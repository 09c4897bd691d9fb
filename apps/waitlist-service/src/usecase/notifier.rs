//! # 登録通知ユースケース
//!
//! 新規登録時に社内通知メールと登録者への確認メールを送る。
//!
//! 通知は best-effort。送信に失敗しても呼び出し元へはエラーを返さず、
//! 結果を [`NotifierOutcome`] として報告する。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use evalin_domain::{
    clock::Clock,
    notification::{EmailMessage, NotifierOutcome, NotifyReason},
    waitlist::WaitlistEmail,
};
use evalin_infra::notification::NotificationSender;
use evalin_shared::{
    event_log::{
        error::{category as error_category, kind as error_kind},
        event,
    },
    log_business_event,
};

use crate::config::SmtpConfig;

const INTERNAL_ALERT_SUBJECT: &str = "New Evalin Waitlist Signup";
const CONFIRMATION_SUBJECT: &str = "Thanks for Joining Evalin";

const CONFIRMATION_BODY: &str = "\
Hi there,

Thanks for signing up to Evalin's waitlist. We're building a score that helps e-commerce brands decide whether a product is worth launching before investing in inventory, marketing, or production.

As an early subscriber, you'll be first to access tools that help you:

- Predict product demand and competitiveness
- Identify red flags before committing capital
- Reduce risk across new product launches
- Validate ideas with real market intelligence

We'll keep you updated as we approach launch and will reach out soon with early access opportunities.

Thanks again for your interest,
The Evalin Team";

/// 登録通知
pub struct WaitlistNotifier {
    config: SmtpConfig,
    sender: Arc<dyn NotificationSender>,
    clock:  Arc<dyn Clock>,
}

impl WaitlistNotifier {
    pub fn new(config: SmtpConfig, sender: Arc<dyn NotificationSender>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            sender,
            clock,
        }
    }

    /// 登録者のメールアドレスについて通知を送る
    ///
    /// 1 回の呼び出しで最大 2 通（社内通知・確認メール）を 1 セッションで送る。
    /// リトライはしない。
    #[tracing::instrument(skip_all, fields(%email))]
    pub async fn notify(&self, email: &WaitlistEmail) -> NotifierOutcome {
        let (Some(relay), Some(from)) = (self.config.relay(), self.config.sender_address()) else {
            tracing::warn!("SMTP_USER / SMTP_PASSWORD が未設定のためメール送信をスキップします");
            return skipped(email, NotifyReason::MissingSmtpCredentials);
        };

        tracing::debug!(
            host = %relay.host,
            port = relay.port,
            security = ?relay.security,
            notify_recipients = self.config.notify_to.len(),
            send_confirmation = self.config.send_confirmation,
            "SMTP 設定"
        );

        let messages = self.compose(from, email);
        if messages.is_empty() {
            return skipped(email, NotifyReason::NoRecipientsOrConfirmationDisabled);
        }

        match self.sender.send_batch(&relay, &messages).await {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.entity_type = event::entity_type::WAITLIST_ENTRY,
                    event.entity_id = %email,
                    event.result = event::result::SUCCESS,
                    message_count = messages.len(),
                    "通知メール送信完了"
                );
                NotifierOutcome::sent(self.config.notify_to.len(), self.config.send_confirmation)
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.entity_type = event::entity_type::WAITLIST_ENTRY,
                    event.entity_id = %email,
                    event.result = event::result::FAILURE,
                    error.category = error_category::EXTERNAL_SERVICE,
                    error.kind = error_kind::SMTP,
                    error.message = %e,
                    "通知メール送信失敗"
                );
                NotifierOutcome::failed(e.detail())
            }
        }
    }

    fn compose(&self, from: &str, email: &WaitlistEmail) -> Vec<EmailMessage> {
        let mut messages = Vec::with_capacity(2);

        if !self.config.notify_to.is_empty() {
            messages.push(EmailMessage {
                from:      from.to_string(),
                to:        self.config.notify_to.clone(),
                subject:   INTERNAL_ALERT_SUBJECT.to_string(),
                text_body: internal_alert_body(email, self.clock.now()),
            });
        }

        if self.config.send_confirmation {
            messages.push(EmailMessage {
                from:      from.to_string(),
                to:        vec![email.as_str().to_string()],
                subject:   CONFIRMATION_SUBJECT.to_string(),
                text_body: CONFIRMATION_BODY.to_string(),
            });
        }

        messages
    }
}

fn internal_alert_body(email: &WaitlistEmail, now: DateTime<Utc>) -> String {
    format!(
        "New waitlist signup!\n\nEmail: {email}\nTimestamp: {} UTC",
        now.format("%Y-%m-%dT%H:%M:%S%.6f")
    )
}

fn skipped(email: &WaitlistEmail, reason: NotifyReason) -> NotifierOutcome {
    log_business_event!(
        event.category = event::category::NOTIFICATION,
        event.action = event::action::NOTIFICATION_SKIPPED,
        event.entity_type = event::entity_type::WAITLIST_ENTRY,
        event.entity_id = %email,
        event.result = event::result::SKIPPED,
        reason = <&'static str>::from(reason),
        "通知メール送信をスキップ"
    );
    NotifierOutcome::skipped(reason)
}
