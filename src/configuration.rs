use std::{path::PathBuf, time::Duration};

use secrecy::{ExposeSecret, SecretBox};

use crate::store::SupabaseClient;

const PLACEHOLDER_SUPABASE_URL: &str = "https://your-project.supabase.co";
const PLACEHOLDER_ANON_KEY: &str = "your-anon-key-here";
const ASSETS_ROUTE: &str = "/assets/";

#[derive(serde::Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub signup_backend: SignupBackend,
    pub supabase: SupabaseSettings,
    pub database: DatabaseSettings,
    pub download: DownloadSettings,
}

#[derive(serde::Deserialize)]
pub struct ApplicationSettings {
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SignupBackend {
    Supabase,
    Postgres,
}

#[derive(serde::Deserialize)]
pub struct SupabaseSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<SecretBox<String>>,
    pub table: String,
    pub timeout_milliseconds: u64,
}

#[derive(serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: SecretBox<String>,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    #[serde(default)]
    pub require_ssl: bool,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DownloadSettings {
    /// 挂载在 `/assets` 下的静态目录
    pub assets_directory: PathBuf,
    pub file_name: String,
    /// 安装包无法直接下发时的重定向地址
    #[serde(default)]
    pub fallback_url: Option<String>,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("当前目录获取失败: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base")))
        .add_source(config::File::from(
            configuration_directory.join(environment.as_str()),
        ))
        // 例如 `APP_APPLICATION__PORT=5001` 会覆盖 `Settings.application.port`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("supabase.url", std::env::var("SUPABASE_URL").ok())?
        .set_override_option("supabase.anon_key", std::env::var("SUPABASE_ANON_KEY").ok())?
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[derive(Debug, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "{}不是一个合法的环境变量, 使用`local` 或 `production`",
                other
            )),
        }
    }
}

impl SupabaseSettings {
    /// URL 和 key 都存在、非空，且不是安装文档里的占位值
    pub fn is_configured(&self) -> bool {
        let url_ok = self
            .url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty() && url != PLACEHOLDER_SUPABASE_URL);
        let key_ok = self.anon_key.as_ref().is_some_and(|key| {
            let key = key.expose_secret();
            !key.trim().is_empty() && key != PLACEHOLDER_ANON_KEY
        });
        url_ok && key_ok
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }

    /// 未配置时返回 `None`
    pub fn client(&self) -> Result<Option<SupabaseClient>, reqwest::Error> {
        if !self.is_configured() {
            return Ok(None);
        }
        let (Some(url), Some(anon_key)) = (&self.url, &self.anon_key) else {
            return Ok(None);
        };
        let anon_key = SecretBox::init_with(|| anon_key.expose_secret().clone());
        SupabaseClient::new(url.clone(), anon_key, self.table.clone(), self.timeout()).map(Some)
    }
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> SecretBox<String> {
        SecretBox::init_with(|| {
            format!(
                "postgres://{}:{}@{}:{}/{}{}",
                self.username,
                self.password.expose_secret(),
                self.host,
                self.port,
                self.database_name,
                self.ssl_mode()
            )
        })
    }

    fn ssl_mode(&self) -> &'static str {
        if self.require_ssl {
            "?sslmode=require"
        } else {
            "?sslmode=prefer"
        }
    }
}

impl DownloadSettings {
    pub fn asset_path(&self) -> PathBuf {
        self.assets_directory.join(&self.file_name)
    }

    /// 备用地址只在安装包缺失时使用，指回 `/assets` 只会得到 404
    pub fn check_fallback(&self) -> Result<(), String> {
        match &self.fallback_url {
            Some(url) if url.starts_with(ASSETS_ROUTE) => Err(format!(
                "download.fallback_url ({}) 指向安装包所在的 assets 目录, 请使用发布页或 CDN 地址",
                url
            )),
            _ => Ok(()),
        }
    }
}
