//! # ドメインエラー
//!
//! 値オブジェクトの生成失敗を表す。HTTP 層では 400 として扱うが、
//! ウェイトリスト登録では [`WaitlistEmail`](crate::waitlist::WaitlistEmail) の
//! パース失敗を `invalid` 結果に変換するため、エラーとしては伝播しない。

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// 入力値が値オブジェクトの制約を満たさない
    #[error("入力値が不正です: {0}")]
    Validation(String),
}
