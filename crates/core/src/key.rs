//! # 保存キーの導出
//!
//! 転送元URL・宣言Content-Type・拡張子ヒント・識別子から
//! `outputs/{identifier}/{filename}` 形式のキーを導出する。
//! 純粋かつ全域で、どの入力に対しても何らかのキーを返す。

use std::fmt;

use percent_encoding::percent_decode_str;

/// キーのプレフィックス
pub const KEY_PREFIX: &str = "outputs";

/// ファイル名を取り出せなかった場合のベース名
pub const DEFAULT_BASE_NAME: &str = "file";

/// Content-Type（部分一致）→ 拡張子の固定テーブル。
const CONTENT_TYPE_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
    ("image/webp", ".webp"),
    ("video/mp4", ".mp4"),
    ("video/avi", ".avi"),
    ("video/mov", ".mov"),
    ("audio/mp3", ".mp3"),
    ("audio/wav", ".wav"),
    ("audio/aac", ".aac"),
];

/// オブジェクトストレージ上のキー。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 末尾のファイル名部分。
    pub fn filename(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 保存キーを導出する。
///
/// 拡張子の優先順位:
/// 1. `extension_hint` が空でなければ、既存の拡張子を置き換える
/// 2. ベース名に `.` が含まれていればそのまま使う
/// 3. `content_type` から推測する（該当なしなら拡張子なし）
pub fn derive_key(
    source_url: &str,
    content_type: &str,
    extension_hint: &str,
    identifier: &str,
) -> StorageKey {
    let mut filename = last_path_segment(source_url);
    if filename.is_empty() {
        filename = DEFAULT_BASE_NAME.to_string();
    }

    if !extension_hint.is_empty() {
        if let Some(dot) = filename.rfind('.') {
            filename.truncate(dot);
        }
        if !extension_hint.starts_with('.') {
            filename.push('.');
        }
        filename.push_str(extension_hint);
    } else if !filename.contains('.') {
        if let Some(ext) = extension_for_content_type(content_type) {
            filename.push_str(ext);
        }
    }

    StorageKey(format!("{KEY_PREFIX}/{identifier}/{filename}"))
}

/// URLのパス末尾セグメントを取り出す。クエリ文字列は無視する。
///
/// ストレージ側で再エンコードされるため、パーセントエンコードは復号した値を返す。
/// URLとしてパースできない場合は生文字列を `/` で分割し、`?` 以降を取り除く。
pub fn last_path_segment(source_url: &str) -> String {
    let raw = match url::Url::parse(source_url) {
        Ok(parsed) => parsed
            .path()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string(),
        Err(_) => {
            let last = source_url.rsplit('/').next().unwrap_or_default();
            match last.find('?') {
                Some(idx) => last[..idx].to_string(),
                None => last.to_string(),
            }
        }
    };
    percent_decode_str(&raw).decode_utf8_lossy().into_owned()
}

/// Content-Typeから拡張子を推測する。該当なしは `None`。
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    CONTENT_TYPE_EXTENSIONS
        .iter()
        .find(|(mime, _)| content_type.contains(mime))
        .map(|(_, ext)| *ext)
}
