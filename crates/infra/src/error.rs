//! # インフラ層エラー
//!
//! DynamoDB 呼び出しと永続化データの読み出しで発生する失敗を表す。
//!
//! キー重複はここに含めない。ウェイトリストでは重複は正常系であり、
//! [`CreateOutcome::AlreadyExists`](crate::repository::CreateOutcome) として返す。
//!
//! [`InfraError`] は種別と生成時点の [`SpanTrace`] の組。HTTP 境界で 500 に
//! 変換するときに、どのリクエスト処理中に失敗したかをログへ残せる。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層エラー
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
///
/// AWS SDK のエラーはオペレーションごとに型が異なるため、
/// メッセージ文字列に落としてから保持する。
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    #[error("DynamoDB エラー: {0}")]
    DynamoDb(String),

    /// 保存済みアイテムの属性欠落・形式不正
    #[error("データ形式が不正です: {0}")]
    InvalidData(String),

    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl From<InfraErrorKind> for InfraError {
    fn from(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }
}

impl InfraError {
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    pub fn dynamo_db(msg: impl Into<String>) -> Self {
        InfraErrorKind::DynamoDb(msg.into()).into()
    }

    pub fn invalid_data(msg: impl Into<String>) -> Self {
        InfraErrorKind::InvalidData(msg.into()).into()
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        InfraErrorKind::Unexpected(msg.into()).into()
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SpanTrace の Debug は冗長なので Display で出す
        write!(f, "InfraError({:?}) at\n{}", self.kind, self.span_trace)
    }
}

impl std::error::Error for InfraError {}
