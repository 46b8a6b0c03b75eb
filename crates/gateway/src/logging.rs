//! # ログ初期化
//!
//! 設定に従ってstdout・ファイル・その両方へ出力する。
//! ファイル出力は周期ローテーションし、古い世代は `max_files` を超えた分から削除される。
//! `RUST_LOG` が設定されていればそちらを優先する。

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing_appender::rolling::{Builder, RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, LogOutput, LogRotation};

/// ファイル名が取れない場合のプレフィックス
const DEFAULT_FILE_PREFIX: &str = "media-relay";

/// 設定値のログレベルを正規化する。未知の値はinfo。
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    }
}

/// グローバルsubscriberを初期化する。起動時に一度だけ呼ぶ。
pub fn init(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(&config.level)));

    let console = matches!(config.output, LogOutput::Console | LogOutput::Both)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stdout));

    let file = if matches!(config.output, LogOutput::File | LogOutput::Both) {
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(rolling_appender(config)?),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .context("ログの初期化に失敗")?;

    Ok(())
}

/// ローテーション付きのファイル出力を作る。
///
/// `logs/media-relay.log` なら `logs/` に `media-relay.<日時>.log` として書き出す
/// （`LogRotation::Never` では `media-relay.log` のまま）。
pub fn rolling_appender(config: &LogConfig) -> anyhow::Result<RollingFileAppender> {
    let path = config.file_path.as_path();
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(dir)
        .with_context(|| format!("ログディレクトリの作成に失敗: {}", dir.display()))?;

    let prefix = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_FILE_PREFIX.to_string());
    let rotation = match config.rotation {
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    };

    let mut builder = Builder::new().rotation(rotation).filename_prefix(prefix);
    if let Some(ext) = path.extension() {
        builder = builder.filename_suffix(ext.to_string_lossy().into_owned());
    }
    if config.max_files > 0 {
        builder = builder.max_log_files(config.max_files);
    }
    builder
        .build(dir)
        .with_context(|| format!("ログファイルを開けません: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("warn"), "warn");
        assert_eq!(level_directive(" error "), "error");
        assert_eq!(level_directive("verbose"), "info");
        assert_eq!(level_directive(""), "info");
    }

    #[test]
    fn test_rolling_appender_writes_under_log_dir() {
        use std::io::Write;

        let dir = std::env::temp_dir().join(format!("relay-log-{}", uuid::Uuid::new_v4()));
        let config = LogConfig {
            level: "info".to_string(),
            output: LogOutput::File,
            file_path: dir.join("nested").join("gateway.log"),
            rotation: LogRotation::Never,
            max_files: 3,
        };

        let mut appender = rolling_appender(&config).unwrap();
        appender.write_all(b"hello\n").unwrap();
        appender.flush().unwrap();

        let written = fs::read_to_string(dir.join("nested").join("gateway.log")).unwrap();
        assert_eq!(written, "hello\n");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_daily_files_keep_prefix_and_suffix() {
        use std::io::Write;

        let dir = std::env::temp_dir().join(format!("relay-log-{}", uuid::Uuid::new_v4()));
        let config = LogConfig {
            level: "info".to_string(),
            output: LogOutput::Both,
            file_path: dir.join("relay.log"),
            rotation: LogRotation::Daily,
            max_files: 0,
        };

        let mut appender = rolling_appender(&config).unwrap();
        appender.write_all(b"line\n").unwrap();
        appender.flush().unwrap();

        let names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1, "{names:?}");
        assert!(names[0].starts_with("relay.") && names[0].ends_with(".log"), "{names:?}");

        fs::remove_dir_all(&dir).unwrap();
    }
}
