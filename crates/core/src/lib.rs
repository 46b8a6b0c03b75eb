//! # Media Relay Core
//!
//! 公開メディアURLを取得し、オブジェクトストレージへ決定的なキーで再公開する転送パイプライン。
//!
//! ## 構成
//! - `fetcher`: URLの取得とストリームの公開
//! - `key`: 保存キーの導出（純粋関数）
//! - `publisher`: public-readでの書き込みとパブリックURLの組み立て
//! - `storage`: オブジェクトストレージの抽象とS3互換実装
//! - `transfer`: 上記を順に束ねる転送サービス
//!
//! 1リクエスト = 1ダウンロード + 1アップロード。永続化・キュー・リトライは持たない。

pub mod error;
pub mod fetcher;
pub mod key;
pub mod publisher;
pub mod request;
pub mod sanitize;
pub mod storage;
pub mod transfer;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::{DownloadError, Phase, StorageError, TransferError, ValidationError};
pub use fetcher::{ByteStream, FetchedResource, HttpFetcher, MediaSource, DEFAULT_CONTENT_TYPE};
pub use key::{derive_key, StorageKey};
pub use publisher::{PublishedObject, Publisher};
pub use request::{TransferRequest, TransferResult};
pub use storage::{ObjectStorage, PutOptions, PutOutcome};
pub use transfer::MediaTransfer;

pub use tokio_util::sync::CancellationToken;
