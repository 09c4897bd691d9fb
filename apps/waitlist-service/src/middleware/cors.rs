//! # CORS
//!
//! 許可リストに一致するオリジンからの POST とプリフライトを許可する。

use axum::http::{HeaderValue, Method, header, request::Parts};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::OriginAllowList;

/// 許可リストから CORS レイヤーを組み立てる
pub fn cors_layer(origins: OriginAllowList) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|origin| origins.allows(origin))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
