//! # Media Relay 共有型定義
//!
//! HTTP境界でやり取りされるリクエスト・レスポンスのJSON構造を提供する。
//! フィールド名はすべてsnake_caseで、既存クライアントとの互換性のため変更しないこと。

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// 転送 API
// ---------------------------------------------------------------------------

/// POST /api/v1/media/transfer のリクエストボディ。
///
/// 3フィールドとも必須。`ext` は空文字列を許容するが、フィールド自体の省略は
/// バインド失敗として扱われる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MediaTransferRequest {
    /// 転送元メディアのURL（http / https のみ）
    #[schema(example = "https://cdn.example.com/renders/photo.jpg")]
    pub url: String,
    /// 保存時に付与する拡張子（"png" / ".png" どちらも可、空なら推測）
    pub ext: String,
    /// 保存パスのスコープに使う不透明な識別子
    #[schema(example = "0b6f5c1e-9a7d-4c1e-8a3b-6d2f1e0c9b7a")]
    pub prediction_uuid: String,
}

/// POST /api/v1/media/transfer の成功レスポンス。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MediaTransferResponse {
    /// 常に true
    pub success: bool,
    /// 固定メッセージ
    pub message: String,
    /// 転送後のパブリックURL
    pub oss_url: String,
    /// リクエストされたURL（前後の空白除去後）
    pub original_url: String,
    /// 転送元が宣言したサイズ（バイト）。不明な場合は -1
    pub file_size: i64,
    /// 保存時のContent-Type
    pub content_type: String,
}

/// 失敗時の共通レスポンス。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// 常に false
    pub success: bool,
    /// 人間向けの要約
    pub message: String,
    /// 原因の詳細（無い場合は空文字列）
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: error.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// サービス情報
// ---------------------------------------------------------------------------

/// GET /api/v1/media/health のレスポンス。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// GET / のレスポンス。公開エンドポイントの一覧。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ServiceIndex {
    pub service: String,
    pub version: String,
    pub description: String,
    pub endpoints: EndpointMap,
}

/// ServiceIndexに載せるエンドポイント表記（"METHOD /path"）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EndpointMap {
    pub health: String,
    pub transfer: String,
    pub docs: String,
}
