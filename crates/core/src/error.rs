//! # 転送パイプラインのエラー型
//!
//! フェーズ（検証 / ダウンロード / アップロード）ごとにエラー型を分け、
//! `TransferError` でどのフェーズが失敗したかを保持する。
//! HTTPステータスへの変換は呼び出し側（gateway）の責務。

use std::fmt;

/// 転送処理のフェーズ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 入力検証
    Validation,
    /// 転送元からの取得
    Download,
    /// オブジェクトストレージへの書き込み
    Upload,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Validation => "validation",
            Phase::Download => "download",
            Phase::Upload => "upload",
        };
        f.write_str(s)
    }
}

/// 入力検証エラー。常に呼び出し側の誤りで、リトライしない。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("URL cannot be empty")]
    EmptyUrl,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Unsupported protocol: {0}")]
    UnsupportedScheme(String),
    #[error("PredictionUUID cannot be empty")]
    EmptyIdentifier,
    /// 保存キーの一部として危険なセグメント
    #[error("unsafe {field}: {reason}")]
    UnsafeSegment {
        field: &'static str,
        reason: String,
    },
}

/// 転送元からの取得エラー。
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("failed to download file: {0}")]
    Request(String),
    /// 200以外のステータス（206等の成功系も含む）
    #[error("download failed with status: {0}")]
    Status(u16),
    /// ストリーミング中のボディ読み取り失敗（接続断など）
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// オブジェクトストレージへの書き込みエラー。
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// バックエンドとの通信・ストリーム読み取りの失敗
    #[error("failed to upload file: {0}")]
    Backend(String),
    /// バックエンドが書き込みを拒否（認証失敗、バケット不在等）
    #[error("storage rejected the write with status: {0}")]
    Rejected(u16),
}

/// 転送全体のエラー。失敗したフェーズと原因、診断用コンテキストを持つ。
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("download failed ({url}): {source}")]
    Download {
        url: String,
        #[source]
        source: DownloadError,
    },
    #[error("upload to OSS failed ({key}): {source}")]
    Upload {
        key: String,
        #[source]
        source: StorageError,
    },
    /// 呼び出し側のキャンセル（切断・期限切れ）
    #[error("transfer cancelled during {phase}")]
    Cancelled { phase: Phase },
}

impl TransferError {
    /// 失敗したフェーズ。
    pub fn phase(&self) -> Phase {
        match self {
            TransferError::Validation(_) => Phase::Validation,
            TransferError::Download { .. } => Phase::Download,
            TransferError::Upload { .. } => Phase::Upload,
            TransferError::Cancelled { phase } => *phase,
        }
    }
}
