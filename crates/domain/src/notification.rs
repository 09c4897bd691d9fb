//! # 通知
//!
//! ウェイトリスト登録に伴うメール通知の入出力を定義する。
//!
//! ## 設計方針
//!
//! - **best-effort**: 通知の失敗は登録処理に影響しない。結果は
//!   [`NotifierOutcome`] としてレスポンスに埋め込まれる
//! - **プレーンテキストのみ**: HTML 本文は持たない
//!
//! ## 状態遷移（1 回の通知につき）
//!
//! ```text
//! idle → configured ─┬─→ skipped
//!                    └─→ composing → sending ─┬─→ sent
//!                                             └─→ failed
//! ```
//!
//! 終端状態（skipped / sent / failed）はそれぞれ [`NotifierOutcome::skipped`]、
//! [`NotifierOutcome::sent`]、[`NotifierOutcome::failed`] に対応する。リトライはしない。

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

/// 通知送信エラー
///
/// 送信実装（SMTP 等）が返すエラー。通知ユースケースの境界で
/// [`NotifierOutcome::failed`] に変換され、それより外には伝播しない。
#[derive(Debug, Error)]
pub enum NotificationError {
    /// アドレスのパースに失敗
    #[error("メールアドレスが不正: {0}")]
    InvalidAddress(String),

    /// メッセージの構築に失敗
    #[error("メッセージ構築に失敗: {0}")]
    BuildFailed(String),

    /// 接続・認証・送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),
}

impl NotificationError {
    /// 送信実装が返した元のメッセージ（分類の接頭辞を含まない）
    pub fn detail(&self) -> &str {
        match self {
            Self::InvalidAddress(detail) | Self::BuildFailed(detail) | Self::SendFailed(detail) => {
                detail
            }
        }
    }
}

/// メールメッセージ
///
/// 送信実装に渡されるプレーンテキストのメール。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// 送信元メールアドレス
    pub from:      String,
    /// 送信先メールアドレス（1 件以上）
    pub to:        Vec<String>,
    /// 件名
    pub subject:   String,
    /// プレーンテキスト本文
    pub text_body: String,
}

/// 通知を送らなかった / 送れなかった理由
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotifyReason {
    /// SMTP ユーザー名またはパスワードが未設定
    MissingSmtpCredentials,
    /// 社内通知先が空で、確認メールも無効
    NoRecipientsOrConfirmationDisabled,
    /// 接続・認証・送信のいずれかで失敗
    SmtpError,
}

/// 通知結果
///
/// `created` レスポンスの `smtp` フィールドとしてそのままシリアライズされる。
/// 値のないフィールドは JSON から省略する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierOutcome {
    /// 送信を試みたか
    pub attempted:           bool,
    /// 送信に成功したか
    pub sent:                bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason:              Option<NotifyReason>,
    /// 社内通知の宛先数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_recipients: Option<usize>,
    /// 登録者への確認メールを送ったか
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_sent:   Option<bool>,
    /// 失敗時のエラーメッセージ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error:               Option<String>,
}

impl NotifierOutcome {
    /// 送信を試みなかった（skipped）
    pub fn skipped(reason: NotifyReason) -> Self {
        Self {
            attempted:           false,
            sent:                false,
            reason:              Some(reason),
            internal_recipients: None,
            confirmation_sent:   None,
            error:               None,
        }
    }

    /// 全メッセージの送信に成功した（sent）
    pub fn sent(internal_recipients: usize, confirmation_sent: bool) -> Self {
        Self {
            attempted:           true,
            sent:                true,
            reason:              None,
            internal_recipients: Some(internal_recipients),
            confirmation_sent:   Some(confirmation_sent),
            error:               None,
        }
    }

    /// 送信を試みたが失敗した（failed）
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            attempted:           true,
            sent:                false,
            reason:              Some(NotifyReason::SmtpError),
            internal_recipients: None,
            confirmation_sent:   None,
            error:               Some(error.into()),
        }
    }
}
