//! # WaitlistRepository
//!
//! ウェイトリストエントリの永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **キー = 正規化済みメールアドレス**: 重複判定をセカンダリクエリではなく
//!   パーティションキーの一意性で行う
//! - **条件付き書き込み**: `PutItem` に `attribute_not_exists` 条件を付け、
//!   存在確認と挿入を 1 回のアトミックな操作で行う。同一メールアドレスの
//!   並行リクエストでも作成されるのは 1 件のみ
//! - **重複はエラーではない**: 条件不成立は [`CreateOutcome::AlreadyExists`] で返し、
//!   それ以外の失敗だけを [`InfraError`] とする

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, types::AttributeValue};
use chrono::{DateTime, Utc};
use evalin_domain::waitlist::{EntryStatus, WaitlistEmail, WaitlistEntry};

use crate::{InfraError, dynamodb::WAITLIST_PARTITION_KEY};

/// 作成（create-if-absent）の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// 新規に作成した
    Created,
    /// 同じキーのエントリが既に存在した（何も書き込んでいない）
    AlreadyExists,
}

/// ウェイトリストリポジトリトレイト
#[async_trait]
pub trait WaitlistRepository: Send + Sync {
    /// エントリが存在しなければ作成する
    ///
    /// キーが既に存在する場合は既存エントリを変更せず
    /// [`CreateOutcome::AlreadyExists`] を返す。
    async fn create_if_absent(&self, entry: &WaitlistEntry) -> Result<CreateOutcome, InfraError>;

    /// メールアドレスでエントリを取得する
    async fn find_by_email(
        &self,
        email: &WaitlistEmail,
    ) -> Result<Option<WaitlistEntry>, InfraError>;
}

/// DynamoDB 実装の WaitlistRepository
pub struct DynamoDbWaitlistRepository {
    client:     Client,
    table_name: String,
}

impl DynamoDbWaitlistRepository {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl WaitlistRepository for DynamoDbWaitlistRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(email = %entry.email()))]
    async fn create_if_absent(&self, entry: &WaitlistEntry) -> Result<CreateOutcome, InfraError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item(
                WAITLIST_PARTITION_KEY,
                AttributeValue::S(entry.email().as_str().to_string()),
            )
            .item(
                "created_at",
                AttributeValue::S(entry.created_at().to_rfc3339()),
            )
            .item("status", AttributeValue::S(entry.status().to_string()))
            // 式中の属性名は予約語との衝突を避けるためプレースホルダで参照する
            .condition_expression("attribute_not_exists(#pk)")
            .expression_attribute_names("#pk", WAITLIST_PARTITION_KEY)
            .send()
            .await;

        match result {
            Ok(_) => Ok(CreateOutcome::Created),
            Err(err) => {
                let already_exists = err
                    .as_service_error()
                    .map(|e| e.is_conditional_check_failed_exception())
                    .unwrap_or(false);
                if already_exists {
                    Ok(CreateOutcome::AlreadyExists)
                } else {
                    Err(InfraError::dynamo_db(format!(
                        "ウェイトリストエントリの作成に失敗: {err}"
                    )))
                }
            }
        }
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%email))]
    async fn find_by_email(
        &self,
        email: &WaitlistEmail,
    ) -> Result<Option<WaitlistEntry>, InfraError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(
                WAITLIST_PARTITION_KEY,
                AttributeValue::S(email.as_str().to_string()),
            )
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| InfraError::dynamo_db(format!("ウェイトリストエントリの取得に失敗: {e}")))?;

        output.item().map(entry_from_item).transpose()
    }
}

/// DynamoDB アイテムからエントリを復元する
fn entry_from_item(item: &HashMap<String, AttributeValue>) -> Result<WaitlistEntry, InfraError> {
    let email = string_attr(item, WAITLIST_PARTITION_KEY)?;
    let created_at = string_attr(item, "created_at")?;
    let status = string_attr(item, "status")?;

    let email = WaitlistEmail::parse(email)
        .map_err(|e| InfraError::invalid_data(format!("email が不正: {e}")))?;
    let created_at = DateTime::parse_from_rfc3339(created_at)
        .map_err(|e| InfraError::invalid_data(format!("created_at が不正: {e}")))?
        .with_timezone(&Utc);
    let status: EntryStatus = status
        .parse()
        .map_err(|e| InfraError::invalid_data(format!("status が不正: {e}")))?;

    Ok(WaitlistEntry::from_db(email, created_at, status))
}

fn string_attr<'a>(
    item: &'a HashMap<String, AttributeValue>,
    name: &str,
) -> Result<&'a str, InfraError> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(String::as_str)
        .ok_or_else(|| InfraError::invalid_data(format!("属性 '{name}' がありません")))
}
