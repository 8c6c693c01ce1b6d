use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, header::ACCEPT};
use secrecy::{ExposeSecret, SecretBox};

use crate::{
    domain::{NewSignup, SignupEmail},
    store::{BackendError, SignupStore, StoreError, classify},
};

/// 单对象查询没有匹配行时 PostgREST 返回的错误码
const NO_ROWS: &str = "PGRST116";

/// 访问 Supabase 注册表 PostgREST 接口的客户端
pub struct SupabaseClient {
    http_client: Client,
    base_url: String,
    anon_key: SecretBox<String>,
    table: String,
}

#[derive(serde::Serialize)]
struct SignupRow<'a> {
    email: &'a str,
    created_at: DateTime<Utc>,
}

impl SupabaseClient {
    pub fn new(
        base_url: String,
        anon_key: SecretBox<String>,
        table: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            table,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(self.anon_key.expose_secret())
    }
}

#[async_trait]
impl SignupStore for SupabaseClient {
    #[tracing::instrument(
        name = "通过 Supabase 写入注册邮箱",
        skip(self, signup),
        fields(signup_email = %signup.email)
    )]
    async fn insert(&self, signup: &NewSignup) -> Result<(), StoreError> {
        let rows = [SignupRow {
            email: signup.email.as_ref(),
            created_at: signup.created_at,
        }];

        let response = self
            .authorized(self.http_client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await
            .map_err(|e| StoreError::Unexpected(e.to_string()))?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(classify(backend_error(response).await))
    }

    #[tracing::instrument(
        name = "通过 Supabase 查询注册邮箱",
        skip(self, email),
        fields(signup_email = %email)
    )]
    async fn exists(&self, email: &SignupEmail) -> Result<bool, StoreError> {
        let filter = format!("eq.{}", email.as_ref());
        let response = self
            .authorized(self.http_client.get(self.table_url()))
            .query(&[("select", "email"), ("email", filter.as_str())])
            .header(ACCEPT, "application/vnd.pgrst.object+json")
            .send()
            .await
            .map_err(|e| StoreError::Unexpected(e.to_string()))?;

        if response.status().is_success() {
            return Ok(true);
        }

        let error = backend_error(response).await;
        if error.code.as_deref() == Some(NO_ROWS) {
            Ok(false)
        } else {
            Err(classify(error))
        }
    }
}

/// 解析 PostgREST 的错误响应体，解析失败时使用 HTTP 状态
async fn backend_error(response: Response) -> BackendError {
    let status = response.status();
    match response.json::<BackendError>().await {
        Ok(error) => error,
        Err(e) => {
            tracing::warn!("无法解析 Supabase 的错误响应: {:?}", e);
            BackendError::new(None, status.to_string())
        }
    }
}
