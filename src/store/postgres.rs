use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, SqlErr,
};
use uuid::Uuid;

use crate::{
    domain::{NewSignup, SignupEmail},
    entities::email_signups,
    store::{BackendError, SignupStore, StoreError, UNIQUE_VIOLATION, classify},
};

/// 直接写入 Postgres, 表结构来自 `migration` crate 的 `email_signups`
pub struct PostgresStore {
    db: DatabaseConnection,
}

impl PostgresStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SignupStore for PostgresStore {
    #[tracing::instrument(
        name = "向 Postgres 写入注册邮箱",
        skip(self, signup),
        fields(signup_email = %signup.email)
    )]
    async fn insert(&self, signup: &NewSignup) -> Result<(), StoreError> {
        let row = email_signups::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(signup.email.as_ref().to_string()),
            created_at: Set(signup.created_at),
        };

        email_signups::Entity::insert(row)
            .exec_without_returning(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    #[tracing::instrument(
        name = "在 Postgres 中查询注册邮箱",
        skip(self, email),
        fields(signup_email = %email)
    )]
    async fn exists(&self, email: &SignupEmail) -> Result<bool, StoreError> {
        let found = email_signups::Entity::find()
            .filter(email_signups::Column::Email.eq(email.as_ref()))
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(found.is_some())
    }
}

fn store_error(e: DbErr) -> StoreError {
    log_unless_duplicate(classify_db_error(e))
}

fn classify_db_error(e: DbErr) -> StoreError {
    match e {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => StoreError::Unexpected(e.to_string()),
        e => {
            let code = match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Some(UNIQUE_VIOLATION.to_string()),
                _ => None,
            };
            classify(BackendError::new(code, e.to_string()))
        }
    }
}

// 重复注册是正常结果, 不记 ERROR
fn log_unless_duplicate(error: StoreError) -> StoreError {
    if !matches!(error, StoreError::AlreadyExists) {
        tracing::error!("执行查询失败: {:?}", error);
    }
    error
}
