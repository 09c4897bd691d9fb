//! # 構造化イベントログ
//!
//! ウェイトリスト登録と通知の結果を、後から `jq` で集計できる形で出力する。
//!
//! ```bash
//! # 通知失敗だけを抜き出す
//! jq 'select(.["event.action"] == "notification.failed")'
//! ```
//!
//! フィールド名はドット区切り（`event.action`、`error.kind`）。JSON 出力では
//! そのままフラットなキーになる。値には下の定数を使い、表記揺れを防ぐ。

/// `event.kind = "business_event"` を付けて INFO で出力する
///
/// `event.category`、`event.action`、`event.result` を必ず指定する。
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const WAITLIST: &str = "waitlist";
        pub const NOTIFICATION: &str = "notification";
    }

    /// イベントアクション
    pub mod action {
        // ウェイトリスト
        pub const SIGNUP_CREATED: &str = "waitlist.signup_created";
        pub const SIGNUP_DUPLICATE: &str = "waitlist.signup_duplicate";

        // 通知
        pub const NOTIFICATION_SENT: &str = "notification.sent";
        pub const NOTIFICATION_FAILED: &str = "notification.failed";
        pub const NOTIFICATION_SKIPPED: &str = "notification.skipped";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const WAITLIST_ENTRY: &str = "waitlist_entry";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
        pub const SKIPPED: &str = "skipped";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// インフラストラクチャ（DynamoDB）
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// 外部サービス呼び出し（SMTP リレー）
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }

    /// エラー種別
    pub mod kind {
        pub const DATABASE: &str = "database";
        pub const SMTP: &str = "smtp";
        pub const INTERNAL: &str = "internal";
    }
}
