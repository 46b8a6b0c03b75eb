//! # Media Relay Gateway
//!
//! 公開メディアURLを受け取り、オブジェクトストレージへ転送してパブリックURLを返すHTTPサービス。
//!
//! ## API エンドポイント
//! - `GET /` — エンドポイント一覧
//! - `GET /api/v1/media/health` — 死活監視
//! - `POST /api/v1/media/transfer` — メディア転送
//! - `GET /api/v1/media/openapi.json` — OpenAPIドキュメント
//! - `GET /swagger/index.html` — ドキュメントUI

mod api_doc;
mod config;
mod endpoints;
mod error;
mod logging;

use std::sync::Arc;

use anyhow::Context;
use axum::Json;
use relay_core::{HttpFetcher, MediaTransfer, Publisher};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use crate::api_doc::{ApiDoc, DOCS_PATH, OPENAPI_PATH};
use crate::config::{GatewayConfig, GatewayState};

/// ルーターを構築する。
fn build_router(state: Arc<GatewayState>) -> axum::Router {
    axum::Router::new()
        .route("/", axum::routing::get(endpoints::handle_index))
        .route("/api/v1/media/health", axum::routing::get(endpoints::handle_health))
        .route("/api/v1/media/transfer", axum::routing::post(endpoints::handle_transfer))
        .route(OPENAPI_PATH, axum::routing::get(|| async { Json(ApiDoc::openapi()) }))
        .merge(RapiDoc::new(OPENAPI_PATH).path(DOCS_PATH))
        .fallback(endpoints::handle_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(feature = "vendor-aws")]
fn build_storage(config: &GatewayConfig) -> anyhow::Result<Box<dyn relay_core::ObjectStorage>> {
    use relay_core::storage::s3::{S3ObjectStorage, S3Settings};

    let storage = S3ObjectStorage::from_settings(&S3Settings {
        endpoint: config.storage.endpoint.clone(),
        region: config.storage.region.clone(),
        bucket: config.storage.bucket.clone(),
        access_key: config.storage.access_key_id.clone(),
        secret_key: config.storage.access_key_secret.clone(),
        path_style: config.storage.path_style,
    })
    .context("オブジェクトストレージの初期化に失敗")?;
    Ok(Box::new(storage))
}

#[cfg(not(feature = "vendor-aws"))]
fn build_storage(_config: &GatewayConfig) -> anyhow::Result<Box<dyn relay_core::ObjectStorage>> {
    anyhow::bail!("ストレージ実装が無効です（vendor-aws featureでビルドしてください）")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "シグナルの待機に失敗");
    }
    tracing::info!("シャットダウンします");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env().context("設定の読み込みに失敗")?;
    logging::init(&config.logger)?;

    tracing::info!(
        endpoint = %config.storage.endpoint,
        bucket = %config.storage.bucket,
        "設定を読み込みました"
    );
    if config.media_transfer.retry_count > 0 {
        tracing::warn!(
            retry_count = config.media_transfer.retry_count,
            "TRANSFER_RETRY_COUNTは設定されていますが、リトライは行いません"
        );
    }
    if !config.media_transfer.allowed_domains.is_empty() {
        tracing::warn!(
            allowed_domains = ?config.media_transfer.allowed_domains,
            "TRANSFER_ALLOWED_DOMAINSは設定されていますが、ドメイン制限は行いません"
        );
    }

    let storage = build_storage(&config)?;
    let publisher = Publisher::new(storage, &config.storage.bucket, &config.storage.endpoint);
    let fetcher = HttpFetcher::new(reqwest::Client::new());

    let state = Arc::new(GatewayState {
        transfer: MediaTransfer::new(Box::new(fetcher), publisher),
        download_timeout: config.download_timeout(),
    });

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(
        domain = %config.server.domain,
        "Gatewayを {} で起動します",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("{addr} のバインドに失敗"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
