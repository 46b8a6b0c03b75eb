//! # 転送処理
//!
//! ## 処理フロー
//! 1. 転送元からストリームを取得（Fetcher）
//! 2. 保存キーを導出
//! 3. ストリームをそのままオブジェクトストレージに流し込む（Publisher）
//! 4. 転送結果を組み立てる
//!
//! 取得と書き込みは1本のストリーミングパイプラインで、ボディ全体をメモリに載せない。
//! 各フェーズはキャンセルトークンと競合させ、キャンセル時はストリームを解放して中断する。

use tokio_util::sync::CancellationToken;

use crate::error::{DownloadError, Phase, TransferError};
use crate::fetcher::{track_read_errors, MediaSource};
use crate::publisher::Publisher;
use crate::request::{TransferRequest, TransferResult};

/// 取得からアップロードまでを束ねる転送サービス。
///
/// リクエスト間で共有する可変状態は持たない。
pub struct MediaTransfer {
    source: Box<dyn MediaSource>,
    publisher: Publisher,
}

impl MediaTransfer {
    pub fn new(source: Box<dyn MediaSource>, publisher: Publisher) -> Self {
        Self { source, publisher }
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// 1件の転送を実行する。
    pub async fn transfer(
        &self,
        request: &TransferRequest,
        cancel: &CancellationToken,
    ) -> Result<TransferResult, TransferError> {
        let url = request.source_url();

        let resource = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(TransferError::Cancelled { phase: Phase::Download });
            }
            result = self.source.download(url) => result.map_err(|source| {
                tracing::error!(url = %url, error = %source, "ファイルのダウンロードに失敗");
                TransferError::Download {
                    url: url.to_string(),
                    source,
                }
            })?,
        };

        let key = self.publisher.derive_key(
            url,
            &resource.content_type,
            request.extension_hint(),
            request.identifier(),
        );
        tracing::debug!(
            object_key = %key,
            content_type = %resource.content_type,
            declared_size = ?resource.declared_size,
            "ダウンロード開始、アップロードへストリーミング"
        );

        let content_type = resource.content_type;
        let declared_size = resource.declared_size;
        let (body, read_failure) = track_read_errors(resource.body);

        // bodyはuploadにムーブされ、完了・失敗・キャンセル(future drop)のいずれでも解放される
        let published = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(TransferError::Cancelled { phase: Phase::Upload });
            }
            result = self.publisher.upload(body, &key, &content_type) => {
                result.map_err(|source| {
                    // 転送元の読み取り失敗はダウンロード側のエラーとして扱う
                    if let Some(reason) = read_failure.get() {
                        tracing::error!(url = %url, error = %reason, "ファイルのダウンロードに失敗");
                        return TransferError::Download {
                            url: url.to_string(),
                            source: DownloadError::Body(reason.to_string()),
                        };
                    }
                    tracing::error!(object_key = %key, error = %source, "OSSへのアップロードに失敗");
                    TransferError::Upload {
                        key: key.to_string(),
                        source,
                    }
                })?
            }
        };

        tracing::info!(
            oss_url = %published.public_url,
            bytes = published.bytes_written,
            "OSSへのアップロード成功"
        );

        Ok(TransferResult {
            public_url: published.public_url,
            byte_size: declared_size,
            bytes_transferred: published.bytes_written,
            content_type,
        })
    }
}
