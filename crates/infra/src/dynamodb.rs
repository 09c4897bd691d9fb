//! # DynamoDB 接続管理
//!
//! ウェイトリストの永続化先である DynamoDB への接続管理を行う。
//!
//! ## 設計方針
//!
//! - **ローカル開発**: DynamoDB Local を使用（`-sharedDb -inMemory`）
//! - **テーブル自動作成**: アプリケーション起動時にテーブルが存在しなければ作成（冪等）
//! - **クライアントはエントリーポイントが所有**: `main` で 1 度だけ生成し、
//!   リポジトリに注入する（グローバルな遅延初期化はしない）
//!
//! ## テーブルスキーマ
//!
//! | 属性 | 型 | 役割 |
//! |------|----|------|
//! | `email` | S | パーティションキー（正規化済みメールアドレス） |
//! | `created_at` | S | RFC 3339 タイムスタンプ |
//! | `status` | S | `pending` |
//!
//! TTL は設定しない（エントリは削除しない）。

use aws_sdk_dynamodb::{
    Client,
    types::{AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType},
};

use crate::InfraError;

/// パーティションキーの属性名
pub const WAITLIST_PARTITION_KEY: &str = "email";

/// DynamoDB Local 用のリージョン（Local はリージョンを検証しない）
const LOCAL_REGION: &str = "ap-northeast-1";

/// DynamoDB クライアントを作成する
///
/// `endpoint` を渡すと DynamoDB Local 向けにダミーの認証情報で接続する。
/// `None` なら SDK 既定の解決（環境変数・プロファイル・IAM ロール）に任せる。
pub async fn create_client(endpoint: Option<&str>) -> Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

    if let Some(endpoint) = endpoint {
        tracing::debug!(endpoint, "DynamoDB Local に接続します");
        loader = loader
            .endpoint_url(endpoint)
            .region(aws_config::Region::new(LOCAL_REGION))
            .credentials_provider(aws_sdk_dynamodb::config::Credentials::new(
                "local", "local", None, None, "evalin-local",
            ));
    }

    Client::new(&loader.load().await)
}

/// ウェイトリストテーブルを用意する
///
/// 既に存在する場合、または並行起動した別プロセスが作成中の場合は何もしない。
pub async fn ensure_waitlist_table(client: &Client, table_name: &str) -> Result<(), InfraError> {
    let described = client.describe_table().table_name(table_name).send().await;
    match described {
        Ok(_) => return Ok(()),
        Err(err)
            if err
                .as_service_error()
                .is_some_and(|e| e.is_resource_not_found_exception()) => {}
        Err(err) => {
            return Err(InfraError::dynamo_db(format!(
                "テーブル '{table_name}' の確認に失敗: {err}"
            )));
        }
    }

    let key = KeySchemaElement::builder()
        .attribute_name(WAITLIST_PARTITION_KEY)
        .key_type(KeyType::Hash)
        .build()
        .map_err(|e| InfraError::unexpected(format!("KeySchema 構築エラー: {e}")))?;
    let attribute = AttributeDefinition::builder()
        .attribute_name(WAITLIST_PARTITION_KEY)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .map_err(|e| InfraError::unexpected(format!("AttributeDefinition 構築エラー: {e}")))?;

    let created = client
        .create_table()
        .table_name(table_name)
        .key_schema(key)
        .attribute_definitions(attribute)
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;

    match created {
        Ok(_) => {
            tracing::info!(table = table_name, "ウェイトリストテーブルを作成しました");
            Ok(())
        }
        Err(err)
            if err
                .as_service_error()
                .is_some_and(|e| e.is_resource_in_use_exception()) =>
        {
            tracing::debug!(table = table_name, "テーブルは別プロセスが作成済み");
            Ok(())
        }
        Err(err) => Err(InfraError::dynamo_db(format!(
            "テーブル '{table_name}' の作成に失敗: {err}"
        ))),
    }
}
