//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//! ハンドラは薄く保ち、登録処理はユースケース層に委譲する。

pub mod health;
pub mod waitlist;

pub use health::health_check;
pub use waitlist::{WaitlistState, add_to_waitlist, method_not_allowed, not_found};
