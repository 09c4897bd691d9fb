//! # 通知送信
//!
//! メール送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（lettre）、Noop（ローカル開発用）
//! - **1 回の呼び出し = 1 セッション**: `send_batch` は渡されたメッセージを
//!   同一の SMTP セッションで送信し、呼び出しをまたいで接続を保持しない
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択

mod noop;
mod smtp;

use async_trait::async_trait;
use evalin_domain::notification::{EmailMessage, NotificationError};
pub use noop::NoopNotificationSender;
pub use smtp::SmtpNotificationSender;

/// SMTP 接続のセキュリティモード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// 接続直後から TLS（SMTPS、通常ポート 465）
    ImplicitTls,
    /// 平文で接続後に STARTTLS でアップグレード（通常ポート 587）
    StartTls,
}

/// SMTP 認証情報
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// SMTP リレーへの接続情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpRelay {
    pub host:        String,
    pub port:        u16,
    pub security:    SmtpSecurity,
    pub credentials: SmtpCredentials,
}

/// メール送信トレイト
///
/// 通知ユースケースの中核。メール送信の具体的な方法を抽象化する。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// リレーに接続・認証し、全メッセージを 1 セッションで送信する
    ///
    /// 1 通でも失敗した時点でエラーを返す（それまでに送信済みのメッセージは取り消せない）。
    async fn send_batch(
        &self,
        relay: &SmtpRelay,
        messages: &[EmailMessage],
    ) -> Result<(), NotificationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_認証情報のdebug出力はパスワードを伏せる() {
        let credentials = SmtpCredentials {
            username: "mailer".to_string(),
            password: "s3cret".to_string(),
        };

        let debug = format!("{credentials:?}");

        assert!(debug.contains("mailer"));
        assert!(!debug.contains("s3cret"));
    }
}
