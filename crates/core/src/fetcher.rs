//! # 転送元メディアの取得
//!
//! URLを検証してGETし、レスポンスボディをバッファせずにストリームとして公開する。
//! 取得結果の `FetchedResource` はストリームを所有し、Publisherへムーブされる。

use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};

use futures::TryStreamExt;
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::io::StreamReader;

use crate::error::DownloadError;

/// Content-Typeが宣言されていない場合の既定値
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// 一度だけ読めるバイトストリーム。drop時に下層の接続が解放される。
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// 取得済みリソース。
pub struct FetchedResource {
    /// レスポンスボディ
    pub body: ByteStream,
    /// 宣言されたContent-Type（未宣言なら `DEFAULT_CONTENT_TYPE`）
    pub content_type: String,
    /// 宣言されたサイズ（Content-Lengthが無ければ `None`）
    pub declared_size: Option<u64>,
}

impl std::fmt::Debug for FetchedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedResource")
            .field("content_type", &self.content_type)
            .field("declared_size", &self.declared_size)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// 読み取りエラーの記録
// ---------------------------------------------------------------------------

/// ボディ読み取りで最初に起きたエラー。
///
/// ストレージ側のエラーに包まれた後でも、原因が転送元か書き込み先かを判別するのに使う。
#[derive(Debug, Clone, Default)]
pub struct ReadFailure(Arc<OnceLock<String>>);

impl ReadFailure {
    pub fn get(&self) -> Option<&str> {
        self.0.get().map(String::as_str)
    }
}

/// 読み取りエラーを `ReadFailure` に記録しつつ、そのまま上位へ返すストリーム。
struct TrackedBody {
    inner: ByteStream,
    failure: ReadFailure,
}

impl AsyncRead for TrackedBody {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let Poll::Ready(Err(e)) = &poll {
            let _ = this.failure.0.set(e.to_string());
        }
        poll
    }
}

/// ストリームを包み、読み取りエラーを観測できるようにする。
pub fn track_read_errors(body: ByteStream) -> (ByteStream, ReadFailure) {
    let failure = ReadFailure::default();
    let tracked = TrackedBody {
        inner: body,
        failure: failure.clone(),
    };
    (Box::new(tracked), failure)
}

/// 転送元の抽象インターフェース。
///
/// 本番ではHTTPで取得し、テストではメモリ上のストリームに差し替える。
#[async_trait::async_trait]
pub trait MediaSource: Send + Sync {
    /// URLのリソースを取得する。
    async fn download(&self, url: &str) -> Result<FetchedResource, DownloadError>;
}

/// HTTP(S)で取得する転送元。
///
/// タイムアウトは設定しない。全体の期限は呼び出し側がキャンセルで与える。
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl MediaSource for HttpFetcher {
    async fn download(&self, url: &str) -> Result<FetchedResource, DownloadError> {
        let url = url.trim();
        let parsed = reqwest::Url::parse(url).map_err(|e| DownloadError::InvalidUrl(e.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| DownloadError::Request(e.to_string()))?;

        // 200以外はボディを読まずにdropし、接続を解放してから返す
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            drop(response);
            return Err(DownloadError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let declared_size = response.content_length();

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let body: ByteStream = Box::new(StreamReader::new(Box::pin(stream)));

        Ok(FetchedResource {
            body,
            content_type,
            declared_size,
        })
    }
}
