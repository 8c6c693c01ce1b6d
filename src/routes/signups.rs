use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    domain::{DeviceKind, SignupEmail},
    recorder::{SignupError, SignupOutcome},
    startup::AppState,
};

const INVALID_EMAIL: &str = "Please enter a valid email address";
const SOMETHING_WENT_WRONG: &str = "Something went wrong. Please try again.";
const DOWNLOAD_URL: &str = "/download";

#[derive(serde::Deserialize)]
pub struct FormData {
    email: String,
}

#[derive(serde::Deserialize)]
pub struct StatusParameters {
    email: String,
}

#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SignupStatus {
    New,
    Existing,
}

#[derive(serde::Serialize)]
pub struct SignupResponse {
    status: SignupStatus,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_url: Option<&'static str>,
}

#[derive(serde::Serialize)]
struct MessageBody {
    message: &'static str,
}

#[derive(serde::Serialize)]
struct StatusBody {
    signed_up: bool,
}

#[tracing::instrument(
    name = "添加新的注册邮箱",
    skip(state, headers, form),
    fields(
        request_id = %Uuid::new_v4(),
        signup_email = %form.email,
    )
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Form<FormData>,
) -> Response {
    let email = match SignupEmail::parse(form.0.email) {
        Ok(email) => email,
        Err(e) => {
            tracing::info!("邮箱格式不合法: {}", e);
            return error_response(StatusCode::BAD_REQUEST, INVALID_EMAIL);
        }
    };
    let device = DeviceKind::from_user_agent(
        headers.get(USER_AGENT).and_then(|value| value.to_str().ok()),
    );

    let status = match state.recorder.record(&email).await {
        SignupOutcome::New => SignupStatus::New,
        SignupOutcome::Existing => SignupStatus::Existing,
        SignupOutcome::Failed(e) => return failure_response(&e),
    };

    Json(signup_response(status, device)).into_response()
}

#[tracing::instrument(
    name = "查询注册状态",
    skip(state, params),
    fields(signup_email = %params.email)
)]
pub async fn signup_status(
    State(state): State<Arc<AppState>>,
    params: Query<StatusParameters>,
) -> Response {
    let Ok(email) = SignupEmail::parse(params.0.email) else {
        return error_response(StatusCode::BAD_REQUEST, INVALID_EMAIL);
    };

    match state.recorder.is_signed_up(&email).await {
        Ok(signed_up) => Json(StatusBody { signed_up }).into_response(),
        Err(e) => failure_response(&e),
    }
}

/// 每种结果对应的提示文案，桌面端额外附带安装包地址
pub fn signup_response(status: SignupStatus, device: DeviceKind) -> SignupResponse {
    let message = match (device, status) {
        (DeviceKind::Mobile, SignupStatus::New) => "Thanks! We'll let you know when iOS drops.",
        (DeviceKind::Mobile, SignupStatus::Existing) => {
            "You're already on the list. iOS coming soon!"
        }
        (DeviceKind::Desktop, SignupStatus::New) => "Email saved! Starting download...",
        (DeviceKind::Desktop, SignupStatus::Existing) => "Welcome back! Starting download...",
    };
    let download_url = (!device.is_mobile()).then_some(DOWNLOAD_URL);

    SignupResponse {
        status,
        message,
        download_url,
    }
}

fn failure_response(error: &SignupError) -> Response {
    let status = match error {
        SignupError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        SignupError::Backend(_) | SignupError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, SOMETHING_WENT_WRONG)
}

fn error_response(status: StatusCode, message: &'static str) -> Response {
    (status, Json(MessageBody { message })).into_response()
}
