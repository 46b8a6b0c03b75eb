//! # POST /api/v1/media/transfer
//!
//! 公開URLのメディアをオブジェクトストレージへ転送する。
//!
//! ## 処理フロー
//! 1. JSONボディをバインド（失敗は400）
//! 2. URL・識別子・拡張子を検証（失敗は400、ネットワークアクセス前）
//! 3. 取得 → キー導出 → アップロード（失敗は500）
//! 4. パブリックURLとサイズを返却

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use relay_core::{CancellationToken, TransferRequest};
use relay_types::{ErrorResponse, MediaTransferRequest, MediaTransferResponse};
use tracing::Instrument;

use crate::config::GatewayState;
use crate::error::GatewayError;

/// 成功時の固定メッセージ
pub const SUCCESS_MESSAGE: &str = "Successfully uploaded file to OSS";

/// POST /api/v1/media/transfer — メディア転送。
#[utoipa::path(
    post,
    path = "/api/v1/media/transfer",
    tag = "media",
    request_body = MediaTransferRequest,
    responses(
        (status = 200, description = "転送成功", body = MediaTransferResponse),
        (status = 400, description = "リクエストパラメータが不正", body = ErrorResponse),
        (status = 500, description = "ダウンロードまたはアップロードに失敗", body = ErrorResponse)
    )
)]
pub async fn handle_transfer(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<MediaTransferRequest>, JsonRejection>,
) -> Result<Json<MediaTransferResponse>, GatewayError> {
    let Json(body) = payload.map_err(|e| {
        tracing::warn!(error = %e.body_text(), "リクエストパラメータが不正");
        GatewayError::from(e)
    })?;

    let request = TransferRequest::new(&body.url, &body.ext, &body.prediction_uuid).map_err(|e| {
        tracing::warn!(url = %body.url, error = %e, "リクエストの検証に失敗");
        GatewayError::from(e)
    })?;

    tracing::info!(
        url = %request.source_url(),
        ext = %request.extension_hint(),
        prediction_uuid = %request.identifier(),
        "メディア転送リクエストを受け付け"
    );

    // ハンドラのfutureがdropされた場合（クライアント切断）もトークンをキャンセルする
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();
    if let Some(deadline) = state.download_timeout {
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(deadline) => token.cancel(),
                _ = token.cancelled() => {}
            }
        });
    }

    let span = tracing::info_span!(
        "transfer",
        request_id = %uuid::Uuid::new_v4(),
        prediction_uuid = %request.identifier()
    );
    let result = state
        .transfer
        .transfer(&request, &cancel)
        .instrument(span)
        .await
        .map_err(|e| {
            tracing::error!(
                url = %request.source_url(),
                prediction_uuid = %request.identifier(),
                phase = %e.phase(),
                error = %e,
                "メディア転送に失敗"
            );
            GatewayError::from(e)
        })?;

    tracing::info!(
        url = %request.source_url(),
        prediction_uuid = %request.identifier(),
        oss_url = %result.public_url,
        file_size = result.file_size(),
        content_type = %result.content_type,
        "メディア転送に成功"
    );

    let file_size = result.file_size();
    Ok(Json(MediaTransferResponse {
        success: true,
        message: SUCCESS_MESSAGE.to_string(),
        oss_url: result.public_url,
        original_url: request.source_url().to_string(),
        file_size,
        content_type: result.content_type,
    }))
}
