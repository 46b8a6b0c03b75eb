//! # テスト用共通ヘルパー
//!
//! モック転送元サーバー、モックストレージ、解放回数を数えるストリーム。

use std::io::Cursor;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

use crate::error::{DownloadError, StorageError};
use crate::fetcher::{ByteStream, FetchedResource, MediaSource, DEFAULT_CONTENT_TYPE};
use crate::key::StorageKey;
use crate::storage::{ObjectStorage, PutOptions, PutOutcome};

/// テスト用モック転送元HTTPサーバーを起動する。
///
/// - `/media/photo.jpg`: 200, image/jpeg, Content-Length付き
/// - `/partial`: 206
/// - `/chunked`: 200, Content-Type・Content-Length無し
/// - それ以外: 404
pub async fn start_mock_source() -> u16 {
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use axum::routing::get;

    let app = axum::Router::new()
        .route(
            "/media/photo.jpg",
            get(|| async { ([(header::CONTENT_TYPE, "image/jpeg")], "jpeg-bytes!") }),
        )
        .route(
            "/partial",
            get(|| async { (StatusCode::PARTIAL_CONTENT, "part") }),
        )
        .route(
            "/chunked",
            get(|| async {
                let chunks = futures::stream::iter(vec![
                    Ok::<_, std::io::Error>("part-1"),
                    Ok("part-2"),
                ]);
                Body::from_stream(chunks)
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}

/// drop回数を数えるストリーム。
pub struct CountingReader {
    inner: Cursor<Vec<u8>>,
    drops: Arc<AtomicUsize>,
}

impl AsyncRead for CountingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl Drop for CountingReader {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// CountingReaderを返すモック転送元。
pub struct FakeSource {
    body: Vec<u8>,
    content_type: Option<&'static str>,
    drops: Arc<AtomicUsize>,
    downloads: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn new(body: Vec<u8>, content_type: Option<&'static str>) -> Self {
        Self {
            body,
            content_type,
            drops: Arc::new(AtomicUsize::new(0)),
            downloads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn drops(&self) -> Arc<AtomicUsize> {
        self.drops.clone()
    }

    pub fn downloads(&self) -> Arc<AtomicUsize> {
        self.downloads.clone()
    }
}

#[async_trait::async_trait]
impl MediaSource for FakeSource {
    async fn download(&self, _url: &str) -> Result<FetchedResource, DownloadError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(FetchedResource {
            body: Box::new(CountingReader {
                inner: Cursor::new(self.body.clone()),
                drops: self.drops.clone(),
            }),
            content_type: self.content_type.unwrap_or(DEFAULT_CONTENT_TYPE).to_string(),
            declared_size: Some(self.body.len() as u64),
        })
    }
}

/// `prefix` を返した後に接続断（ConnectionReset）で失敗するストリーム。
pub fn broken_stream(prefix: &'static [u8]) -> ByteStream {
    let chunks = futures::stream::iter(vec![
        Ok(prefix),
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "origin reset",
        )),
    ]);
    Box::new(tokio_util::io::StreamReader::new(chunks))
}

/// ボディの途中で接続が切れる転送元。
pub struct BrokenSource;

#[async_trait::async_trait]
impl MediaSource for BrokenSource {
    async fn download(&self, _url: &str) -> Result<FetchedResource, DownloadError> {
        Ok(FetchedResource {
            body: broken_stream(b"abc"),
            content_type: "video/mp4".to_string(),
            declared_size: Some(1024),
        })
    }
}

/// MockStorageが記録する書き込み呼び出し。
#[derive(Debug, Clone)]
pub struct PutCall {
    pub key: String,
    pub body: Vec<u8>,
    pub options: PutOptions,
}

/// 書き込みを記録するモックストレージ。`failing()` は常に403で拒否する。
#[derive(Default)]
pub struct MockStorage {
    calls: Arc<Mutex<Vec<PutCall>>>,
    fail: bool,
}

impl MockStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<PutCall>>> {
        self.calls.clone()
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MockStorage {
    async fn put_stream(
        &self,
        key: &StorageKey,
        body: &mut ByteStream,
        options: &PutOptions,
    ) -> Result<PutOutcome, StorageError> {
        if self.fail {
            return Err(StorageError::Rejected(403));
        }
        let mut data = Vec::new();
        body.read_to_end(&mut data)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let bytes_written = data.len() as u64;
        self.calls.lock().unwrap().push(PutCall {
            key: key.to_string(),
            body: data,
            options: options.clone(),
        });
        Ok(PutOutcome { bytes_written })
    }
}

/// 書き込みが完了しないストレージ（キャンセルの検証用）。
pub struct PendingStorage;

#[async_trait::async_trait]
impl ObjectStorage for PendingStorage {
    async fn put_stream(
        &self,
        _key: &StorageKey,
        _body: &mut ByteStream,
        _options: &PutOptions,
    ) -> Result<PutOutcome, StorageError> {
        std::future::pending().await
    }
}
