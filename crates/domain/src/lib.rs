//! # Evalin ドメイン層
//!
//! ウェイトリスト登録のドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **インフラ非依存**: DynamoDB や SMTP の型はこのクレートに持ち込まない
//! - **値オブジェクト**: 正規化済みメールアドレスは [`waitlist::WaitlistEmail`] でのみ表現する
//! - **通知結果はデータ**: メール送信の成否は [`notification::NotifierOutcome`] として返し、
//!   エラーとして伝播させない
//!
//! ## モジュール構成
//!
//! - [`clock`] - 時刻プロバイダ
//! - [`error`] - ドメイン層エラー定義
//! - [`notification`] - メール通知の入出力
//! - [`waitlist`] - ウェイトリストエントリ

pub mod clock;
pub mod error;
pub mod notification;
pub mod waitlist;

pub use error::DomainError;
