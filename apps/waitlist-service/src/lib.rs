//! # Evalin Waitlist Service
//!
//! ウェイトリスト登録を受け付ける HTTP サービス。
//!
//! ## 処理の流れ
//!
//! ```text
//! POST / → handler → SignupUseCase ─┬─→ WaitlistRepository（DynamoDB 条件付き作成）
//!                                   └─→ WaitlistNotifier → NotificationSender（SMTP）
//! ```
//!
//! ## モジュール構成
//!
//! - [`app_builder`] - State とルーターの組み立て
//! - [`config`] - 環境変数からの設定読み込み
//! - [`error`] - エラー定義と HTTP レスポンス変換
//! - [`handler`] - HTTP ハンドラ
//! - [`middleware`] - CORS とプリフライト応答
//! - [`usecase`] - 登録処理と通知

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod usecase;
