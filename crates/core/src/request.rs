//! # 転送リクエストと転送結果

use crate::error::ValidationError;
use crate::key::last_path_segment;
use crate::sanitize::check_segment;

/// 検証済みの転送リクエスト。構築後は不変。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    source_url: String,
    extension_hint: String,
    identifier: String,
}

impl TransferRequest {
    /// 入力を検証して転送リクエストを構築する。
    ///
    /// URLは前後の空白を除去してから、絶対URLかつスキームが http / https であることを確認する。
    /// 識別子・拡張子ヒント・URL末尾セグメントは保存キーの一部として安全か検査する。
    pub fn new(
        source_url: &str,
        extension_hint: &str,
        identifier: &str,
    ) -> Result<Self, ValidationError> {
        let source_url = source_url.trim();
        if source_url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        if identifier.is_empty() {
            return Err(ValidationError::EmptyIdentifier);
        }

        let parsed =
            url::Url::parse(source_url).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ValidationError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        check_segment("identifier", identifier, false)?;
        check_segment("ext", extension_hint, false)?;
        check_segment("filename", &last_path_segment(source_url), false)?;

        Ok(Self {
            source_url: source_url.to_string(),
            extension_hint: extension_hint.to_string(),
            identifier: identifier.to_string(),
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn extension_hint(&self) -> &str {
        &self.extension_hint
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// 転送結果。呼び出し側に返すのみで永続化しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResult {
    /// 転送後のパブリックURL
    pub public_url: String,
    /// 転送元が宣言したサイズ。宣言が無ければ `None`
    pub byte_size: Option<u64>,
    /// ストレージが受け取ったバイト数
    pub bytes_transferred: u64,
    /// 保存時のContent-Type
    pub content_type: String,
}

impl TransferResult {
    /// 宣言サイズをレスポンス用の符号付き値に変換する（不明は -1）。
    pub fn file_size(&self) -> i64 {
        self.byte_size
            .and_then(|n| i64::try_from(n).ok())
            .unwrap_or(-1)
    }
}
