//! # Evalin インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! このクレートはウェイトリストの永続化とメール送信の具体的な実装を提供する。
//! 外部システムの詳細（DynamoDB の条件付き書き込み、SMTP のセッション管理）を
//! カプセル化し、ユースケース層からはトレイト越しにのみ利用させる。
//!
//! ## 依存関係
//!
//! ```text
//! waitlist-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`dynamodb`] - DynamoDB 接続管理とテーブル作成
//! - [`error`] - インフラ層エラー定義
//! - [`notification`] - メール送信（SMTP / Noop）
//! - [`repository`] - リポジトリ実装
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use evalin_infra::{dynamodb, repository::DynamoDbWaitlistRepository};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = dynamodb::create_client(Some("http://localhost:18000")).await;
//!     dynamodb::ensure_waitlist_table(&client, "waitlist").await?;
//!     let repository = DynamoDbWaitlistRepository::new(client, "waitlist".to_string());
//!     Ok(())
//! }
//! ```

pub mod dynamodb;
pub mod error;
pub mod notification;
pub mod repository;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{InfraError, InfraErrorKind};
