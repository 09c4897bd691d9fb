//! # Waitlist Service アプリケーション構築
//!
//! 依存（リポジトリ・通知送信）を受け取り、State とルーターを組み立てる。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::{any::Any, sync::Arc};

use axum::{
    Router,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use evalin_domain::clock::{Clock, SystemClock};
use evalin_infra::{notification::NotificationSender, repository::WaitlistRepository};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{
    config::WaitlistConfig,
    error::WaitlistError,
    handler::{WaitlistState, add_to_waitlist, health_check, method_not_allowed, not_found},
    middleware::{cors_layer, no_content_preflight},
    usecase::{SignupUseCaseImpl, WaitlistNotifier},
};

/// ルーターを構築する
pub fn build_app(
    config: &WaitlistConfig,
    repository: Arc<dyn WaitlistRepository>,
    sender: Arc<dyn NotificationSender>,
) -> Router {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let notifier = WaitlistNotifier::new(config.smtp.clone(), sender, clock.clone());
    let usecase = SignupUseCaseImpl::new(repository, notifier, clock);
    let waitlist_state = Arc::new(WaitlistState { usecase });

    let routes = Router::new()
        .route("/health", get(health_check))
        .route("/", post(add_to_waitlist).fallback(method_not_allowed))
        .fallback(not_found)
        .with_state(waitlist_state);

    with_layers(routes, config)
}

/// 共通レイヤーを被せる
///
/// 外側から順に TraceLayer → 204 変換 → CORS → パニック捕捉。
/// パニック由来の 500 にも CORS ヘッダーが付く。
fn with_layers(routes: Router, config: &WaitlistConfig) -> Router {
    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(config.cors_allowed_origins.clone()))
        .layer(from_fn(no_content_preflight))
        .layer(TraceLayer::new_for_http())
}

/// パニックを汎用の 500 に変換する
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("不明なパニック");

    WaitlistError::Internal(format!("ハンドラがパニックしました: {detail}")).into_response()
}
