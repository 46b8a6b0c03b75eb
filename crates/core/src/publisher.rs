//! # 転送先への公開
//!
//! 保存キーを導出し、取得したストリームをpublic-readでオブジェクトストレージに書き込む。
//! パブリックURLは `https://{bucket}.{endpoint}/{key}` で決定的に組み立て、読み戻しはしない。

use crate::error::StorageError;
use crate::fetcher::ByteStream;
use crate::key::{self, StorageKey};
use crate::storage::{ObjectStorage, PutOptions};

/// アップロード時刻を記録するメタデータ名
pub const UPLOAD_TIME_META: &str = "upload-time";

/// 書き込み完了したオブジェクト。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedObject {
    pub public_url: String,
    pub bytes_written: u64,
}

/// オブジェクトストレージへの公開処理。
pub struct Publisher {
    storage: Box<dyn ObjectStorage>,
    bucket: String,
    /// スキームを除いたエンドポイントのホスト部
    endpoint_host: String,
}

impl Publisher {
    pub fn new(storage: Box<dyn ObjectStorage>, bucket: &str, endpoint: &str) -> Self {
        let endpoint_host = endpoint
            .split_once("://")
            .map_or(endpoint, |(_, host)| host)
            .trim_end_matches('/')
            .to_string();
        Self {
            storage,
            bucket: bucket.to_string(),
            endpoint_host,
        }
    }

    /// 保存キーを導出する。純粋で失敗しない。
    pub fn derive_key(
        &self,
        source_url: &str,
        content_type: &str,
        extension_hint: &str,
        identifier: &str,
    ) -> StorageKey {
        key::derive_key(source_url, content_type, extension_hint, identifier)
    }

    /// キーに対応するパブリックURL。
    pub fn public_url(&self, key: &StorageKey) -> String {
        format!("https://{}.{}/{}", self.bucket, self.endpoint_host, key)
    }

    /// ストリームを `key` に書き込み、パブリックURLを返す。
    ///
    /// `body` はここで消費され、成功・失敗どちらでも関数を抜ける時点で解放される。
    pub async fn upload(
        &self,
        mut body: ByteStream,
        key: &StorageKey,
        content_type: &str,
    ) -> Result<PublishedObject, StorageError> {
        let options = PutOptions {
            content_type: content_type.to_string(),
            public_read: true,
            metadata: vec![(
                UPLOAD_TIME_META.to_string(),
                chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            )],
        };

        let outcome = self.storage.put_stream(key, &mut body, &options).await?;

        Ok(PublishedObject {
            public_url: self.public_url(key),
            bytes_written: outcome.bytes_written,
        })
    }
}
