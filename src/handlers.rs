use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use log::{error, info};

use crate::birthday::{birthday_template_params, is_within_ist_midnight_window};
use crate::config::{Settings, SettingsSource};
use crate::emailjs::EmailJsClient;
use crate::error::AppError;
use crate::types::{ActionField, ApiResponse, HealthResponse, SendEmailRequest};

pub struct AppState {
    pub emailjs: EmailJsClient,
    pub settings: SettingsSource,
    pub clock: fn() -> DateTime<Utc>,
}

pub async fn send_email(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Result<Response, AppError> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }
    if method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    let credentials = state.settings.load().credentials().map_err(|missing| {
        error!("{}", missing);
        AppError::Configuration("Server configuration error - Missing credentials")
    })?;

    let request: SendEmailRequest = serde_json::from_slice(&body).map_err(|e| {
        error!("Error in email function: {}", e);
        AppError::Internal(format!("Internal server error: {}", e))
    })?;

    let action = match request.action() {
        ActionField::Valid(action) => action,
        ActionField::Missing => {
            return Err(AppError::Validation("Missing required field: action"))
        }
        ActionField::Invalid => return Err(AppError::Validation("Invalid action")),
    };

    let result = state
        .emailjs
        .send_email(&action.template_params(), &credentials)
        .await
        .map_err(|e| {
            error!("Error in email function: {}", e);
            AppError::Internal(format!("Internal server error: {}", e))
        })?;

    if result.status_code != 200 {
        error!("EmailJS error ({}): {}", result.status_code, result.body);
        return Err(AppError::Provider("Failed to send email. Please try again."));
    }

    info!("{:?} accepted by EmailJS", action);
    Ok(Json(ApiResponse::success(action.success_message())).into_response())
}

/// Runs on every scheduler tick but only sends inside the IST midnight
/// window. Several ticks inside the same window each send an email.
pub async fn cron_birthday(
    State(state): State<Arc<AppState>>,
    Extension(settings): Extension<Settings>,
) -> Result<Json<ApiResponse>, AppError> {
    let credentials = settings.credentials().map_err(|missing| {
        error!("{}", missing);
        AppError::Configuration("Missing EmailJS credentials")
    })?;

    let now = (state.clock)();
    if !is_within_ist_midnight_window(now) {
        info!("Birthday cron at {} is outside the IST midnight window", now);
        return Ok(Json(ApiResponse::success(
            "Not within IST midnight window. Skipped.",
        )));
    }

    let result = state
        .emailjs
        .send_email(&birthday_template_params(), &credentials)
        .await
        .map_err(|e| {
            error!("Birthday cron failed: {}", e);
            AppError::Internal("Internal server error".to_string())
        })?;

    if result.status_code != 200 {
        error!("EmailJS error ({}): {}", result.status_code, result.body);
        return Err(AppError::Provider("Failed to send email."));
    }

    info!("Birthday email sent at {}", now);
    Ok(Json(ApiResponse::success("Birthday email sent successfully!")))
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = if state.settings.load().credentials().is_ok() {
        "ok"
    } else {
        "missing_credentials"
    };
    Json(HealthResponse {
        status: status.to_string(),
    })
}
