//! # プリフライト応答ミドルウェア
//!
//! CORS レイヤーは OPTIONS リクエストに 200 で応答するため、
//! ボディなしの `204 No Content` に置き換える。
//! CORS レイヤーより外側に配置すること。

use axum::{
    body::Body,
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};

/// OPTIONS への成功応答を空の 204 にする
pub async fn no_content_preflight(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS;
    let response = next.run(request).await;

    if !is_preflight || !response.status().is_success() {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.status = StatusCode::NO_CONTENT;
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::empty())
}
