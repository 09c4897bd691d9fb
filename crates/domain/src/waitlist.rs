//! # ウェイトリスト
//!
//! ウェイトリスト登録のドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`WaitlistEmail`] | 正規化済みメールアドレス | 前後空白除去 + 小文字化。永続化キーとして使用 |
//! | [`WaitlistEntry`] | ウェイトリストエントリ | 登録 1 件。作成後は更新・削除しない |
//! | [`EntryStatus`] | エントリ状態 | 現状 `pending` のみ |
//!
//! ## 設計方針
//!
//! - **正規化はここだけ**: 重複判定はキーの完全一致で行うため、
//!   正規化ロジックを 1 箇所に閉じ込める
//! - **構文チェックのみ**: `@` を含むかどうかだけを見る。RFC 準拠の検証は行わない

use chrono::{DateTime, Utc};

use crate::DomainError;

/// 正規化済みメールアドレス（値オブジェクト）
///
/// 生成時に前後の空白を除去して小文字化する。
/// 正規化後に空、または `@` を含まない場合は生成できない。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WaitlistEmail(String);

impl WaitlistEmail {
    /// 入力文字列を正規化してメールアドレスを作成する
    ///
    /// # エラー
    ///
    /// 正規化後に空文字列、または `@` を含まない場合は `DomainError::Validation` を返す。
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();

        if normalized.is_empty() || !normalized.contains('@') {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for WaitlistEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// エントリ状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EntryStatus {
    /// 登録受付済み（招待前）
    Pending,
}

/// ウェイトリストエントリ
///
/// 初回登録時に一度だけ作成される。TTL なし。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitlistEntry {
    email:      WaitlistEmail,
    created_at: DateTime<Utc>,
    status:     EntryStatus,
}

impl WaitlistEntry {
    /// 新規登録エントリを作成する（状態は `pending`）
    pub fn new_pending(email: WaitlistEmail, now: DateTime<Utc>) -> Self {
        Self {
            email,
            created_at: now,
            status: EntryStatus::Pending,
        }
    }

    /// 永続化済みの値から復元する
    pub fn from_db(email: WaitlistEmail, created_at: DateTime<Utc>, status: EntryStatus) -> Self {
        Self {
            email,
            created_at,
            status,
        }
    }

    pub fn email(&self) -> &WaitlistEmail {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }
}
