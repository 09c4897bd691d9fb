//! # リポジトリ実装
//!
//! ウェイトリストエントリの永続化を担当する。
//!
//! - [`WaitlistRepository`]: リポジトリトレイト（ユースケース層はこれにのみ依存する）
//! - [`DynamoDbWaitlistRepository`]: DynamoDB による実装

pub mod waitlist_repository;

pub use waitlist_repository::{CreateOutcome, DynamoDbWaitlistRepository, WaitlistRepository};
