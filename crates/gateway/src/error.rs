//! # Gateway エラー型
//!
//! 転送パイプラインのエラーをHTTPステータスとJSONボディに対応付ける。
//! 入力不正は400、ダウンロード・アップロードの失敗は500。

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use relay_core::{TransferError, ValidationError};
use relay_types::ErrorResponse;

/// Gatewayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 不正なリクエスト
    #[error("{message}: {detail}")]
    BadRequest { message: String, detail: String },
    /// 転送の失敗（転送元の取得失敗・転送先への書き込み失敗）
    #[error("Media transfer failed: {0}")]
    TransferFailed(String),
    /// 未定義のルート
    #[error("Route not found")]
    NotFound,
}

impl GatewayError {
    fn bad_request(message: &str, detail: impl Into<String>) -> Self {
        GatewayError::BadRequest {
            message: message.to_string(),
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            GatewayError::TransferFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<ValidationError> for GatewayError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::EmptyUrl => Self::bad_request("URL cannot be empty", ""),
            ValidationError::EmptyIdentifier => {
                Self::bad_request("PredictionUUID cannot be empty", "")
            }
            ValidationError::InvalidUrl(detail) => Self::bad_request("Invalid URL format", detail),
            ValidationError::UnsupportedScheme(scheme) => Self::bad_request(
                "Only HTTP and HTTPS protocols are supported",
                format!("Unsupported protocol: {scheme}"),
            ),
            e @ ValidationError::UnsafeSegment { .. } => {
                Self::bad_request("Invalid request parameters", e.to_string())
            }
        }
    }
}

impl From<TransferError> for GatewayError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::Validation(v) => v.into(),
            other => GatewayError::TransferFailed(other.to_string()),
        }
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(e: JsonRejection) -> Self {
        Self::bad_request("Invalid request parameters", e.body_text())
    }
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match &self {
            GatewayError::BadRequest { message, detail } => ErrorResponse::new(message, detail),
            GatewayError::TransferFailed(detail) => {
                ErrorResponse::new("Media transfer failed", detail)
            }
            GatewayError::NotFound => ErrorResponse::new(
                "Route not found",
                "The requested endpoint does not exist",
            ),
        };
        (status, Json(body)).into_response()
    }
}
