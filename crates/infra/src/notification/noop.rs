//! ログ出力のみの通知送信
//!
//! `NOTIFICATION_BACKEND=noop` で選択する。SMTP リレーなしで
//! 登録フロー全体を動かすローカル開発用。

use async_trait::async_trait;
use evalin_domain::notification::{EmailMessage, NotificationError};

use super::{NotificationSender, SmtpRelay};

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_batch(
        &self,
        relay: &SmtpRelay,
        messages: &[EmailMessage],
    ) -> Result<(), NotificationError> {
        tracing::info!(
            relay = %format_args!("{}:{}", relay.host, relay.port),
            message_count = messages.len(),
            "noop: SMTP セッションを開かずに送信済みとして扱います"
        );
        for message in messages {
            tracing::debug!(
                from = %message.from,
                to = ?message.to,
                subject = %message.subject,
                body_len = message.text_body.len(),
                "noop: メール"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{SmtpCredentials, SmtpSecurity};

    #[tokio::test]
    async fn test_不正なアドレスを含んでいても成功を返す() {
        let relay = SmtpRelay {
            host:        "smtp.gmail.com".to_string(),
            port:        587,
            security:    SmtpSecurity::StartTls,
            credentials: SmtpCredentials {
                username: "mailer".to_string(),
                password: "s3cret".to_string(),
            },
        };
        let message = EmailMessage {
            from:      "not-an-address".to_string(),
            to:        vec!["new@example.com".to_string()],
            subject:   "Thanks for Joining Evalin".to_string(),
            text_body: "Hi there,".to_string(),
        };

        let result = NoopNotificationSender.send_batch(&relay, &[message]).await;

        assert!(result.is_ok());
    }
}
