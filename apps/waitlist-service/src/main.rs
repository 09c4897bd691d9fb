//! # Waitlist Service サーバー
//!
//! ウェイトリスト登録 API のエントリーポイント。
//!
//! ## 起動手順
//!
//! 1. `.env` 読み込みとトレーシング初期化
//! 2. 環境変数から [`WaitlistConfig`] を構築
//! 3. DynamoDB クライアント作成とテーブルの存在保証
//! 4. `NOTIFICATION_BACKEND` に応じた通知送信の選択
//! 5. ルーター構築とサーバー起動
//!
//! ## 環境変数
//!
//! | 変数名 | 既定値 |
//! |--------|--------|
//! | `HOST` / `PORT` | `0.0.0.0` / `8080` |
//! | `DYNAMODB_ENDPOINT` | `http://localhost:18000`（空で AWS デフォルト） |
//! | `WAITLIST_TABLE` | `waitlist` |
//! | `CORS_ALLOWED_ORIGINS` | ローカル開発ポートと Firebase Hosting |
//! | `NOTIFICATION_BACKEND` | `smtp` |
//! | `SMTP_*` | [`SmtpConfig`](evalin_waitlist_service::config::SmtpConfig) を参照 |

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use evalin_infra::{
    dynamodb,
    notification::{NoopNotificationSender, NotificationSender, SmtpNotificationSender},
    repository::{DynamoDbWaitlistRepository, WaitlistRepository},
};
use evalin_shared::observability::TracingConfig;
use evalin_waitlist_service::{
    app_builder::build_app,
    config::{NotificationBackend, WaitlistConfig},
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("waitlist-service");
    evalin_shared::observability::init_tracing(tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "waitlist-service").entered();

    let config = WaitlistConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Waitlist Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let client = dynamodb::create_client(config.dynamodb_endpoint.as_deref()).await;
    dynamodb::ensure_waitlist_table(&client, &config.waitlist_table)
        .await
        .context("ウェイトリストテーブルの準備に失敗しました")?;
    tracing::info!(table = %config.waitlist_table, "DynamoDB に接続しました");

    let repository: Arc<dyn WaitlistRepository> = Arc::new(DynamoDbWaitlistRepository::new(
        client,
        config.waitlist_table.clone(),
    ));

    let sender: Arc<dyn NotificationSender> = match config.notification_backend {
        NotificationBackend::Smtp => Arc::new(SmtpNotificationSender::new()),
        NotificationBackend::Noop => Arc::new(NoopNotificationSender),
    };
    tracing::info!(backend = ?config.notification_backend, "通知送信バックエンドを選択しました");

    let app = build_app(&config, repository, sender);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Waitlist Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
