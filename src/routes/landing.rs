use askama::Template;
use axum::{
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    response::{Html, IntoResponse, Response},
};

use crate::domain::DeviceKind;

#[derive(Template)]
#[template(path = "landing.html")]
pub struct LandingTemplate {
    pub button_label: &'static str,
    pub mobile: bool,
}

impl LandingTemplate {
    /// 移动端只能留邮箱等待通知，桌面端直接下载
    pub fn for_device(device: DeviceKind) -> Self {
        let button_label = match device {
            DeviceKind::Mobile => "Notify Me",
            DeviceKind::Desktop => "Download",
        };
        Self {
            button_label,
            mobile: device.is_mobile(),
        }
    }
}

#[tracing::instrument(name = "渲染落地页", skip(headers))]
pub async fn landing(headers: HeaderMap) -> Response {
    let device = DeviceKind::from_user_agent(
        headers.get(USER_AGENT).and_then(|value| value.to_str().ok()),
    );
    match LandingTemplate::for_device(device).render() {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            tracing::error!("落地页渲染失败: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
