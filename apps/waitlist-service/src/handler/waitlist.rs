//! # ウェイトリスト登録ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /` - ウェイトリスト登録（`{"email": "..."}`）
//! - `OPTIONS /` - CORS プリフライト（CORS レイヤーが応答）
//! - その他のメソッド - 405
//!
//! ## レスポンス
//!
//! | 結果 | ステータス | ボディ |
//! |------|-----------|--------|
//! | 新規登録 | 200 | `{"message", "email", "smtp"}` |
//! | 登録済み | 200 | `{"message", "duplicate": true}` |
//! | 不正なメールアドレス | 400 | `{"error"}` |
//! | `email` なし | 400 | `{"error"}` |
//! | ボディが上限超過 | 413 | `{"error"}` |

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use evalin_domain::notification::NotifierOutcome;
use evalin_shared::ErrorResponse;
use serde::Serialize;

use crate::{
    error::WaitlistError,
    usecase::{SignupResult, SignupUseCaseImpl},
};

/// ウェイトリスト API の共有状態
pub struct WaitlistState {
    pub usecase: SignupUseCaseImpl,
}

/// 登録成功時のレスポンス
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SignupResponse {
    Created {
        message: String,
        email:   String,
        smtp:    NotifierOutcome,
    },
    Duplicate {
        message:   String,
        duplicate: bool,
    },
}

/// POST /
///
/// ボディは JSON オブジェクトとして解釈し、文字列の `email` を取り出す。
/// JSON でない・オブジェクトでない・`email` が文字列でない場合は 400。
/// ボディの読み出しに失敗した場合も axum の既定応答ではなく JSON で返す。
#[tracing::instrument(skip_all)]
pub async fn add_to_waitlist(
    State(state): State<Arc<WaitlistState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, WaitlistError> {
    let body = body.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => WaitlistError::PayloadTooLarge,
        _ => WaitlistError::MissingEmail,
    })?;
    let raw_email = extract_email(&body).ok_or(WaitlistError::MissingEmail)?;

    let result = state.usecase.process_signup(&raw_email).await?;

    Ok(signup_response(result))
}

/// POST / OPTIONS 以外のメソッド
pub async fn method_not_allowed() -> WaitlistError {
    WaitlistError::MethodNotAllowed
}

/// 未定義のパス
pub async fn not_found() -> WaitlistError {
    WaitlistError::NotFound
}

fn extract_email(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("email")?.as_str().map(str::to_string)
}

fn signup_response(result: SignupResult) -> Response {
    let status = result.status_code();
    let message = result.message().to_string();

    match result {
        SignupResult::Invalid => (status, Json(ErrorResponse::invalid_email())).into_response(),
        SignupResult::Duplicate { .. } => (
            status,
            Json(SignupResponse::Duplicate {
                message,
                duplicate: true,
            }),
        )
            .into_response(),
        SignupResult::Created { email, smtp } => (
            status,
            Json(SignupResponse::Created {
                message,
                email: email.into_string(),
                smtp,
            }),
        )
            .into_response(),
    }
}
