//! # ウェイトリスト登録ユースケース
//!
//! メールアドレスを正規化し、未登録であれば保存して通知を送る。
//!
//! 重複判定は正規化済みメールアドレスをキーとした条件付き作成で行い、
//! 事前の読み取りはしない。同じアドレスの並行リクエストでも作成は 1 件のみ。

use std::sync::Arc;

use axum::http::StatusCode;
use evalin_domain::{
    clock::Clock,
    notification::NotifierOutcome,
    waitlist::{WaitlistEmail, WaitlistEntry},
};
use evalin_infra::repository::{CreateOutcome, WaitlistRepository};
use evalin_shared::{error_response, event_log::event, log_business_event};

use super::notifier::WaitlistNotifier;
use crate::error::WaitlistError;

pub const SIGNUP_CREATED: &str = "Successfully added to waitlist";
pub const SIGNUP_DUPLICATE: &str = "Email already on waitlist";

/// 登録処理の結果
///
/// 不正入力・重複はエラーではなく想定内の結果として扱う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupResult {
    /// メールアドレスが不正（保存していない）
    Invalid,
    /// 既に登録済み（何も変更していない）
    Duplicate { email: WaitlistEmail },
    /// 新規登録した
    Created {
        email: WaitlistEmail,
        smtp:  NotifierOutcome,
    },
}

impl SignupResult {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Invalid => StatusCode::BAD_REQUEST,
            Self::Duplicate { .. } | Self::Created { .. } => StatusCode::OK,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Invalid => error_response::INVALID_EMAIL,
            Self::Duplicate { .. } => SIGNUP_DUPLICATE,
            Self::Created { .. } => SIGNUP_CREATED,
        }
    }

    /// 正規化済みメールアドレス（不正入力の場合は `None`）
    pub fn email(&self) -> Option<&WaitlistEmail> {
        match self {
            Self::Invalid => None,
            Self::Duplicate { email } | Self::Created { email, .. } => Some(email),
        }
    }
}

/// 登録ユースケースの実装
pub struct SignupUseCaseImpl {
    repository: Arc<dyn WaitlistRepository>,
    notifier:   WaitlistNotifier,
    clock:      Arc<dyn Clock>,
}

impl SignupUseCaseImpl {
    pub fn new(
        repository: Arc<dyn WaitlistRepository>,
        notifier: WaitlistNotifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            notifier,
            clock,
        }
    }

    /// 登録を処理する
    ///
    /// ストレージの失敗（重複以外）のみエラーとして返す。
    /// 通知の失敗は結果の `smtp` に記録され、登録結果には影響しない。
    pub async fn process_signup(&self, raw_email: &str) -> Result<SignupResult, WaitlistError> {
        let Ok(email) = WaitlistEmail::parse(raw_email) else {
            return Ok(SignupResult::Invalid);
        };

        let entry = WaitlistEntry::new_pending(email.clone(), self.clock.now());

        match self.repository.create_if_absent(&entry).await? {
            CreateOutcome::AlreadyExists => {
                log_business_event!(
                    event.category = event::category::WAITLIST,
                    event.action = event::action::SIGNUP_DUPLICATE,
                    event.entity_type = event::entity_type::WAITLIST_ENTRY,
                    event.entity_id = %email,
                    event.result = event::result::SUCCESS,
                    "登録済みのメールアドレス"
                );
                Ok(SignupResult::Duplicate { email })
            }
            CreateOutcome::Created => {
                log_business_event!(
                    event.category = event::category::WAITLIST,
                    event.action = event::action::SIGNUP_CREATED,
                    event.entity_type = event::entity_type::WAITLIST_ENTRY,
                    event.entity_id = %email,
                    event.result = event::result::SUCCESS,
                    "ウェイトリストに登録"
                );
                let smtp = self.notifier.notify(&email).await;
                Ok(SignupResult::Created { email, smtp })
            }
        }
    }
}
