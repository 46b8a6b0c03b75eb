//! # S3互換オブジェクトストレージ実装
//!
//! Aliyun OSS, AWS S3, MinIO 等のS3互換APIにストリーミングで書き込む。
//! 大きなボディはrust-s3がマルチパートアップロードに切り替える。

use super::{ObjectStorage, PutOptions, PutOutcome};
use crate::error::StorageError;
use crate::fetcher::ByteStream;
use crate::key::StorageKey;

/// S3互換ストレージの接続設定。
#[derive(Debug, Clone)]
pub struct S3Settings {
    /// エンドポイント（スキーム無しならhttpsを補う）
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// パス形式（`{endpoint}/{bucket}`）でアクセスするか
    pub path_style: bool,
}

/// S3互換ストレージによるObjectStorage実装。
pub struct S3ObjectStorage {
    bucket: s3::Bucket,
}

impl S3ObjectStorage {
    pub fn new(bucket: s3::Bucket) -> Self {
        Self { bucket }
    }

    /// 接続設定からバケットを初期化する。
    pub fn from_settings(settings: &S3Settings) -> anyhow::Result<Self> {
        let endpoint = if settings.endpoint.contains("://") {
            settings.endpoint.clone()
        } else {
            format!("https://{}", settings.endpoint)
        };
        let region = s3::Region::Custom {
            region: settings.region.clone(),
            endpoint,
        };

        let credentials = s3::creds::Credentials::new(
            Some(&settings.access_key),
            Some(&settings.secret_key),
            None,
            None,
            None,
        )?;

        let mut bucket = s3::Bucket::new(&settings.bucket, region, credentials)?;
        if settings.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self::new(*bucket))
    }
}

#[async_trait::async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn put_stream(
        &self,
        key: &StorageKey,
        body: &mut ByteStream,
        options: &PutOptions,
    ) -> Result<PutOutcome, StorageError> {
        // 追加ヘッダーはバケット単位なので、リクエストごとに複製して付与する
        let mut bucket = self.bucket.clone();
        if options.public_read {
            bucket.add_header("x-amz-acl", "public-read");
        }
        for (name, value) in &options.metadata {
            bucket.add_header(&format!("x-amz-meta-{name}"), value);
        }

        let response = bucket
            .put_object_stream_with_content_type(body, key.as_str(), &options.content_type)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Rejected(status));
        }

        Ok(PutOutcome {
            bytes_written: response.uploaded_bytes() as u64,
        })
    }
}
