//! # ユースケース層
//!
//! - [`signup`] - ウェイトリスト登録（重複判定・保存・通知）
//! - [`notifier`] - 登録通知メールの組み立てと送信

pub mod notifier;
pub mod signup;

pub use notifier::WaitlistNotifier;
pub use signup::{SignupResult, SignupUseCaseImpl};
