use std::sync::Arc;

use crate::{
    domain::{NewSignup, SignupEmail},
    store::{BackendError, SignupStore, StoreError},
};

#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("未配置注册存储后端")]
    NotConfigured,
    #[error("注册存储后端拒绝了请求: {0}")]
    Backend(#[source] BackendError),
    #[error("记录注册邮箱时发生意外错误: {0}")]
    Unexpected(String),
}

impl From<StoreError> for SignupError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Backend(error) => SignupError::Backend(error),
            StoreError::Unexpected(message) => SignupError::Unexpected(message),
            e @ StoreError::AlreadyExists => SignupError::Unexpected(e.to_string()),
        }
    }
}

/// 记录注册邮箱的结果
#[derive(Debug)]
pub enum SignupOutcome {
    /// 首次注册
    New,
    /// 邮箱已存在
    Existing,
    Failed(SignupError),
}

impl SignupOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, SignupOutcome::Failed(_))
    }

    pub fn is_new(&self) -> bool {
        matches!(self, SignupOutcome::New)
    }

    pub fn error(&self) -> Option<&SignupError> {
        match self {
            SignupOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// 保存校验过的邮箱并区分结果。
///
/// 缺少后端凭据时不持有存储, 所有调用直接返回 [`SignupError::NotConfigured`], 不发起网络请求。
#[derive(Clone)]
pub struct SignupRecorder {
    store: Option<Arc<dyn SignupStore>>,
}

impl SignupRecorder {
    pub fn new(store: Option<Arc<dyn SignupStore>>) -> Self {
        Self { store }
    }

    pub fn unconfigured() -> Self {
        Self { store: None }
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    #[tracing::instrument(name = "记录注册邮箱", skip(self, email), fields(signup_email = %email))]
    pub async fn record(&self, email: &SignupEmail) -> SignupOutcome {
        let Some(store) = &self.store else {
            tracing::warn!("未配置注册存储后端, 邮箱没有保存");
            return SignupOutcome::Failed(SignupError::NotConfigured);
        };

        match store.insert(&NewSignup::now(email.clone())).await {
            Ok(()) => SignupOutcome::New,
            Err(StoreError::AlreadyExists) => {
                tracing::info!("邮箱已经注册过");
                SignupOutcome::Existing
            }
            Err(e) => {
                tracing::error!("保存注册邮箱失败: {:?}", e);
                SignupOutcome::Failed(e.into())
            }
        }
    }

    #[tracing::instrument(name = "查询邮箱是否已注册", skip(self, email), fields(signup_email = %email))]
    pub async fn is_signed_up(&self, email: &SignupEmail) -> Result<bool, SignupError> {
        let Some(store) = &self.store else {
            return Err(SignupError::NotConfigured);
        };

        store.exists(email).await.map_err(|e| {
            tracing::error!("查询注册状态失败: {:?}", e);
            e.into()
        })
    }
}
