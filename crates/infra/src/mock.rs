//! # テスト用モック
//!
//! ユースケース・ハンドラテストで使用するインメモリ実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! evalin-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use evalin_domain::{
    notification::{EmailMessage, NotificationError},
    waitlist::{WaitlistEmail, WaitlistEntry},
};

use crate::{
    error::InfraError,
    notification::{NotificationSender, SmtpRelay},
    repository::{CreateOutcome, WaitlistRepository},
};

// ===== InMemoryWaitlistRepository =====

/// インメモリのウェイトリストリポジトリ
///
/// `create_if_absent` はロック内で存在確認と挿入を行うため、
/// 並行呼び出しでも同じキーで作成されるのは 1 件のみ。
#[derive(Clone, Default)]
pub struct InMemoryWaitlistRepository {
    entries: Arc<Mutex<HashMap<String, WaitlistEntry>>>,
    failure: Option<String>,
}

impl InMemoryWaitlistRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// すべての操作が DynamoDB エラーを返すリポジトリ
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            entries: Arc::default(),
            failure: Some(message.into()),
        }
    }

    /// 保存済みエントリのスナップショット
    pub fn entries(&self) -> Vec<WaitlistEntry> {
        self.entries.lock().unwrap().values().cloned().collect()
    }

    fn check_failure(&self) -> Result<(), InfraError> {
        match &self.failure {
            Some(message) => Err(InfraError::dynamo_db(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WaitlistRepository for InMemoryWaitlistRepository {
    async fn create_if_absent(&self, entry: &WaitlistEntry) -> Result<CreateOutcome, InfraError> {
        self.check_failure()?;

        let mut entries = self.entries.lock().unwrap();
        let key = entry.email().as_str().to_string();
        if entries.contains_key(&key) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        entries.insert(key, entry.clone());
        Ok(CreateOutcome::Created)
    }

    async fn find_by_email(
        &self,
        email: &WaitlistEmail,
    ) -> Result<Option<WaitlistEntry>, InfraError> {
        self.check_failure()?;

        Ok(self.entries.lock().unwrap().get(email.as_str()).cloned())
    }
}

// ===== MockNotificationSender =====

/// 送信内容を記録するモック送信
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    batches: Arc<Mutex<Vec<(SmtpRelay, Vec<EmailMessage>)>>>,
    failure: Option<String>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 常に送信失敗を返すモック
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            batches: Arc::default(),
            failure: Some(message.into()),
        }
    }

    /// `send_batch` に渡されたリレーとメッセージ（呼び出し順）
    pub fn batches(&self) -> Vec<(SmtpRelay, Vec<EmailMessage>)> {
        self.batches.lock().unwrap().clone()
    }

    /// 送信されたメッセージを平坦化したもの
    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.batches()
            .into_iter()
            .flat_map(|(_, messages)| messages)
            .collect()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_batch(
        &self,
        relay: &SmtpRelay,
        messages: &[EmailMessage],
    ) -> Result<(), NotificationError> {
        self.batches
            .lock()
            .unwrap()
            .push((relay.clone(), messages.to_vec()));

        match &self.failure {
            Some(message) => Err(NotificationError::SendFailed(message.clone())),
            None => Ok(()),
        }
    }
}
