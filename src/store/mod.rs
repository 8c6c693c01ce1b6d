//! [`SignupRecorder`](crate::recorder::SignupRecorder) 可以写入的存储后端。
//!
//! 各后端把自身的错误转换成 [`BackendError`] 后交给 [`classify`],
//! 只有它知道哪个错误码表示"邮箱已注册"。

mod postgres;
mod supabase;

use async_trait::async_trait;

use crate::domain::{NewSignup, SignupEmail};

pub use postgres::PostgresStore;
pub use supabase::SupabaseClient;

/// Postgres 的 `unique_violation`, PostgREST 原样透传
pub const UNIQUE_VIOLATION: &str = "23505";

#[async_trait]
pub trait SignupStore: Send + Sync {
    async fn insert(&self, signup: &NewSignup) -> Result<(), StoreError>;

    async fn exists(&self, email: &SignupEmail) -> Result<bool, StoreError>;
}

/// 后端返回的错误内容
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    pub code: Option<String>,
    pub message: String,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl BackendError {
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            hint: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("该邮箱已经注册")]
    AlreadyExists,
    #[error("存储后端拒绝了请求: {0}")]
    Backend(#[source] BackendError),
    #[error("无法访问存储后端: {0}")]
    Unexpected(String),
}

pub(crate) fn classify(error: BackendError) -> StoreError {
    if error.code.as_deref() == Some(UNIQUE_VIOLATION) {
        StoreError::AlreadyExists
    } else {
        StoreError::Backend(error)
    }
}
