//! # 保存キー用セグメントの検査
//!
//! 識別子・拡張子ヒント・URL末尾セグメントは保存キーにそのまま埋め込まれるため、
//! ネットワークアクセスの前にここで検査する。キー導出自体は全域関数のまま保つ。

use crate::error::ValidationError;

/// 1セグメントの最大長（バイト）
pub const MAX_SEGMENT_LEN: usize = 255;

/// キーの1セグメントとして安全か検査する。
///
/// `allow_separators` が false の場合、`/` と `\` も拒否する。
pub fn check_segment(
    field: &'static str,
    value: &str,
    allow_separators: bool,
) -> Result<(), ValidationError> {
    let unsafe_segment = |reason: String| ValidationError::UnsafeSegment { field, reason };

    if value.len() > MAX_SEGMENT_LEN {
        return Err(unsafe_segment(format!(
            "{} bytes (max {MAX_SEGMENT_LEN})",
            value.len()
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(unsafe_segment("contains control characters".to_string()));
    }
    if !allow_separators && value.contains(['/', '\\']) {
        return Err(unsafe_segment("contains a path separator".to_string()));
    }
    if value.split(['/', '\\']).any(|s| s == "." || s == "..") {
        return Err(unsafe_segment("contains a relative path segment".to_string()));
    }
    Ok(())
}
