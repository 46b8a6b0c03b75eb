//! # サービス情報エンドポイント
//!
//! - `GET /` — エンドポイント一覧
//! - `GET /api/v1/media/health` — 死活監視
//! - ドキュメントは `api_doc` を参照
//! - フォールバック — 404

use axum::Json;
use relay_types::{EndpointMap, HealthResponse, ServiceIndex};

use crate::api_doc::DOCS_PATH;
use crate::error::GatewayError;

/// サービス名（ヘルスチェックで返す）
pub const SERVICE_NAME: &str = "media-transfer";

/// GET /api/v1/media/health — 死活監視。
#[utoipa::path(
    get,
    path = "/api/v1/media/health",
    tag = "service",
    responses(
        (status = 200, description = "稼働中", body = HealthResponse)
    )
)]
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET / — 公開エンドポイントの一覧。
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses(
        (status = 200, description = "エンドポイント一覧", body = ServiceIndex)
    )
)]
pub async fn handle_index() -> Json<ServiceIndex> {
    Json(ServiceIndex {
        service: "File Transfer API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Relays any public file into object storage without size limits".to_string(),
        endpoints: EndpointMap {
            health: "GET /api/v1/media/health".to_string(),
            transfer: "POST /api/v1/media/transfer".to_string(),
            docs: format!("GET {DOCS_PATH}"),
        },
    })
}

/// 未定義ルートのフォールバック。
pub async fn handle_not_found() -> GatewayError {
    GatewayError::NotFound
}
