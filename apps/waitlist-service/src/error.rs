//! # Waitlist Service エラー定義
//!
//! HTTP 境界で扱うエラーと、レスポンスへの変換を定義する。
//!
//! 不正なメールアドレスや重複登録は想定内の結果であり、ここではなく
//! [`SignupResult`](crate::usecase::SignupResult) で表現する。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use evalin_infra::InfraError;
use evalin_shared::{
    ErrorResponse,
    event_log::error::{category, kind},
};
use thiserror::Error;

/// Waitlist Service で発生するエラー
#[derive(Debug, Error)]
pub enum WaitlistError {
    /// リクエストボディに文字列の `email` がない
    #[error("リクエストボディに email がありません")]
    MissingEmail,

    /// POST / OPTIONS 以外のメソッド
    #[error("許可されていないメソッドです")]
    MethodNotAllowed,

    /// 未定義のパス
    #[error("パスが見つかりません")]
    NotFound,

    /// ボディがサイズ上限を超えた
    #[error("リクエストボディが大きすぎます")]
    PayloadTooLarge,

    /// ストレージエラー（重複以外）
    #[error("ストレージエラー: {0}")]
    Storage(#[from] InfraError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl IntoResponse for WaitlistError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            WaitlistError::MissingEmail => (StatusCode::BAD_REQUEST, ErrorResponse::missing_email()),
            WaitlistError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorResponse::method_not_allowed(),
            ),
            WaitlistError::NotFound => (StatusCode::NOT_FOUND, ErrorResponse::not_found()),
            WaitlistError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse::payload_too_large(),
            ),
            WaitlistError::Storage(e) => {
                tracing::error!(
                    error.category = category::INFRASTRUCTURE,
                    error.kind = kind::DATABASE,
                    span_trace = %e.span_trace(),
                    "ストレージエラー: {}",
                    e
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error(),
                )
            }
            WaitlistError::Internal(msg) => {
                tracing::error!(
                    error.category = category::INFRASTRUCTURE,
                    error.kind = kind::INTERNAL,
                    "内部エラー: {}",
                    msg
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error(),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
