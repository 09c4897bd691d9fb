//! # エラーレスポンス
//!
//! ウェイトリスト API が返すエラーボディを提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換はサービス側の責務（shared に axum 依存を入れない）
//! - フロントエンドが参照する文言は定数で固定し、ハンドラ間の表記揺れを防ぐ
//!
//! ## レスポンス形式
//!
//! ```json
//! { "error": "Method not allowed" }
//! ```

use serde::{Deserialize, Serialize};

/// メールアドレスが構文チェックを通らなかったときの文言
pub const INVALID_EMAIL: &str = "Valid email address is required";

/// JSON ボディに `email` が無いときの文言
pub const MISSING_EMAIL: &str = "Missing 'email' in JSON body";

/// POST 以外のメソッドに対する文言
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

/// 未定義のパスに対する文言
pub const NOT_FOUND: &str = "Not found";

/// ボディが上限サイズを超えたときの文言
pub const PAYLOAD_TOO_LARGE: &str = "Request body too large";

/// 内部エラーの文言（詳細はクライアントに返さない）
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// エラーレスポンス
///
/// ステータスコードごとに `error` フィールドだけを持つ固定形状のボディ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    /// 任意のメッセージでエラーレスポンスを作成する
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// 400: メールアドレスの形式不正
    pub fn invalid_email() -> Self {
        Self::new(INVALID_EMAIL)
    }

    /// 400: `email` フィールド欠落
    pub fn missing_email() -> Self {
        Self::new(MISSING_EMAIL)
    }

    /// 405 Method Not Allowed
    pub fn method_not_allowed() -> Self {
        Self::new(METHOD_NOT_ALLOWED)
    }

    /// 404 Not Found
    pub fn not_found() -> Self {
        Self::new(NOT_FOUND)
    }

    /// 413 Payload Too Large
    pub fn payload_too_large() -> Self {
        Self::new(PAYLOAD_TOO_LARGE)
    }

    /// 500 Internal Server Error
    ///
    /// 文言は固定値（内部情報を漏らさないため）。
    pub fn internal_error() -> Self {
        Self::new(INTERNAL_SERVER_ERROR)
    }
}
