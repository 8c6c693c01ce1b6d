use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header::CONTENT_DISPOSITION},
    response::{IntoResponse, Redirect, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::startup::AppState;

/// 以附件形式下发桌面安装包。
///
/// 本地文件不可读时重定向到配置的备用地址，没有备用地址则返回 404。
#[tracing::instrument(name = "下发安装包", skip(state, request))]
pub async fn download(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let settings = &state.download;
    let asset_path = settings.asset_path();

    if let Err(e) = tokio::fs::metadata(&asset_path).await {
        return match &settings.fallback_url {
            Some(fallback_url) => {
                tracing::warn!(
                    "安装包不可读 {}: {:?}, 重定向到 {}",
                    asset_path.display(),
                    e,
                    fallback_url
                );
                Redirect::temporary(fallback_url).into_response()
            }
            None => {
                tracing::error!("安装包不可读 {}: {:?}, 且未配置备用地址", asset_path.display(), e);
                StatusCode::NOT_FOUND.into_response()
            }
        };
    }

    let mut response = match ServeFile::new(&asset_path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    let disposition = format!("attachment; filename=\"{}\"", settings.file_name);
    match HeaderValue::from_str(&disposition) {
        Ok(value) => {
            response.headers_mut().insert(CONTENT_DISPOSITION, value);
        }
        Err(e) => tracing::warn!("安装包文件名不是合法的响应头: {:?}", e),
    }
    tracing::info!("开始下载 {}", asset_path.display());

    response.into_response()
}
