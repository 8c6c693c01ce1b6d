use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DbErr};
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    configuration::{DownloadSettings, Settings, SignupBackend},
    recorder::SignupRecorder,
    routes::{download, health_check, landing, signup, signup_status},
    store::{PostgresStore, SignupStore},
};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("配置加载失败: {0}")]
    Configuration(#[from] config::ConfigError),
    #[error("Supabase 客户端创建失败: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("注册数据库准备失败: {0}")]
    Database(#[from] DbErr),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub struct AppState {
    pub recorder: SignupRecorder,
    pub download: DownloadSettings,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, StartupError> {
        configuration
            .download
            .check_fallback()
            .map_err(config::ConfigError::Message)?;

        let recorder = build_recorder(&configuration).await?;
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address).await?;
        let port = listener.local_addr()?.port();
        let state = AppState {
            recorder,
            download: configuration.download,
        };

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        run(self.listener, self.state).await
    }
}

pub async fn build_recorder(configuration: &Settings) -> Result<SignupRecorder, StartupError> {
    let store: Option<Arc<dyn SignupStore>> = match configuration.signup_backend {
        SignupBackend::Supabase => match configuration.supabase.client()? {
            Some(client) => Some(Arc::new(client)),
            None => {
                tracing::warn!(
                    "未配置 Supabase 凭据, 注册邮箱不会被保存. \
                     请设置 SUPABASE_URL 和 SUPABASE_ANON_KEY"
                );
                None
            }
        },
        SignupBackend::Postgres => {
            let connection_string = configuration.database.connection_string();
            let db = Database::connect(connection_string.expose_secret().as_str()).await?;
            Migrator::up(&db, None).await?;
            Some(Arc::new(PostgresStore::new(db)))
        }
    };

    let recorder = SignupRecorder::new(store);
    tracing::info!(
        backend = ?configuration.signup_backend,
        configured = recorder.is_configured(),
        "注册记录器已就绪"
    );
    Ok(recorder)
}

pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.download.assets_directory);

    Router::new()
        .route("/", get(landing))
        .route("/health_check", get(health_check))
        .route("/signups", post(signup))
        .route("/signups/status", get(signup_status))
        .route("/download", get(download))
        .nest_service("/assets", assets)
        .with_state(Arc::new(state))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}
