//! # オブジェクトストレージ
//!
//! 転送先ストレージの抽象インターフェース。
//! S3互換ストレージ実装は `s3` サブモジュールを参照。

#[cfg(feature = "vendor-aws")]
pub mod s3;

#[cfg(feature = "vendor-aws")]
pub use s3::S3ObjectStorage;

use crate::error::StorageError;
use crate::fetcher::ByteStream;
use crate::key::StorageKey;

/// 書き込むオブジェクトの属性。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    /// 保存時のContent-Type
    pub content_type: String,
    /// 誰でも読めるACLで書き込むか
    pub public_read: bool,
    /// ユーザーメタデータ（`x-amz-meta-{name}` として送る）
    pub metadata: Vec<(String, String)>,
}

/// 書き込み結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutOutcome {
    /// バックエンドが受け取ったバイト数
    pub bytes_written: u64,
}

/// オブジェクトストレージの抽象インターフェース。
///
/// S3互換ストレージ（Aliyun OSS, AWS S3, MinIO, Cloudflare R2等）や
/// テスト用のモックを実装として選択できる。
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// ストリームを読み切りながら `key` に書き込む。
    ///
    /// ストリームの所有権は呼び出し側に残り、解放も呼び出し側が行う。
    async fn put_stream(
        &self,
        key: &StorageKey,
        body: &mut ByteStream,
        options: &PutOptions,
    ) -> Result<PutOutcome, StorageError>;
}
