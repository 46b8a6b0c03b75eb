//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。
//! 設定は起動時に一度だけ読み込み、値として各コンポーネントに渡す。

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use relay_core::MediaTransfer;

/// HTTPサーバー設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 起動ログに表示する公開ドメイン
    pub domain: String,
}

/// ログ出力先。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
}

/// ログファイルのローテーション周期。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

/// ログ設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// debug / info / warn / error
    pub level: String,
    pub output: LogOutput,
    /// `output` が file / both のときの出力先
    pub file_path: PathBuf,
    pub rotation: LogRotation,
    /// 残す世代数。0は無制限
    pub max_files: usize,
}

/// 転送先オブジェクトストレージ設定。
#[derive(Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub access_key_id: String,
    pub access_key_secret: String,
    /// スキーム無しのホスト（例: oss-cn-hangzhou.aliyuncs.com）
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub path_style: bool,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("path_style", &self.path_style)
            .finish_non_exhaustive()
    }
}

/// 転送処理の設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTransferConfig {
    /// リクエスト全体の期限（秒）。0は無制限
    pub download_timeout_secs: u64,
    /// 読み込むが転送処理では参照しない
    pub retry_count: u32,
    /// 読み込むが転送処理では参照しない
    pub allowed_domains: Vec<String>,
}

/// Gateway全体の設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub logger: LogConfig,
    pub storage: StorageConfig,
    pub media_transfer: MediaTransferConfig,
}

impl GatewayConfig {
    /// 環境変数から構築する。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意のキー参照関数から構築する。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{name}が未設定です"))
        };

        let server = ServerConfig {
            host: get("SERVER_HOST", "0.0.0.0"),
            port: get("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORTはポート番号である必要があります")?,
            domain: get("SERVER_DOMAIN", "localhost"),
        };

        let output = match get("LOG_OUTPUT", "console").to_ascii_lowercase().as_str() {
            "console" => LogOutput::Console,
            "file" => LogOutput::File,
            "both" => LogOutput::Both,
            other => anyhow::bail!("LOG_OUTPUTが不正です: {other}（console / file / both）"),
        };
        let rotation = match get("LOG_ROTATION", "daily").to_ascii_lowercase().as_str() {
            "hourly" => LogRotation::Hourly,
            "daily" => LogRotation::Daily,
            "never" => LogRotation::Never,
            other => anyhow::bail!("LOG_ROTATIONが不正です: {other}（hourly / daily / never）"),
        };
        let logger = LogConfig {
            level: get("LOG_LEVEL", "info"),
            output,
            file_path: PathBuf::from(get("LOG_FILE", "logs/media-relay.log")),
            rotation,
            max_files: get("LOG_MAX_FILES", "7")
                .parse()
                .context("LOG_MAX_FILESは0以上の整数である必要があります")?,
        };

        let storage = StorageConfig {
            access_key_id: required("OSS_ACCESS_KEY_ID")?,
            access_key_secret: required("OSS_ACCESS_KEY_SECRET")?,
            endpoint: required("OSS_ENDPOINT")?,
            bucket: required("OSS_BUCKET")?,
            region: get("OSS_REGION", "us-east-1"),
            path_style: parse_bool(&get("OSS_PATH_STYLE", "false"))
                .context("OSS_PATH_STYLEはtrue / falseである必要があります")?,
        };

        let media_transfer = MediaTransferConfig {
            download_timeout_secs: get("TRANSFER_DOWNLOAD_TIMEOUT_SECS", "0")
                .parse()
                .context("TRANSFER_DOWNLOAD_TIMEOUT_SECSは0以上の整数である必要があります")?,
            retry_count: get("TRANSFER_RETRY_COUNT", "0")
                .parse()
                .context("TRANSFER_RETRY_COUNTは0以上の整数である必要があります")?,
            allowed_domains: get("TRANSFER_ALLOWED_DOMAINS", "")
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect(),
        };

        Ok(Self {
            server,
            logger,
            storage,
            media_transfer,
        })
    }

    /// リクエスト全体の期限。0なら `None`。
    pub fn download_timeout(&self) -> Option<Duration> {
        match self.media_transfer.download_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => anyhow::bail!("真偽値ではありません: {other}"),
    }
}

/// Gatewayの共有状態。
pub struct GatewayState {
    /// 転送サービス
    pub transfer: MediaTransfer,
    /// リクエスト全体の期限（Noneは無制限）
    pub download_timeout: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const STORAGE: &[(&str, &str)] = &[
        ("OSS_ACCESS_KEY_ID", "test-key-id"),
        ("OSS_ACCESS_KEY_SECRET", "test-secret-value"),
        ("OSS_ENDPOINT", "oss-cn-hangzhou.aliyuncs.com"),
        ("OSS_BUCKET", "media"),
    ];

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::from_lookup(lookup_from(STORAGE)).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logger.level, "info");
        assert_eq!(config.logger.output, LogOutput::Console);
        assert_eq!(config.logger.rotation, LogRotation::Daily);
        assert_eq!(config.logger.max_files, 7);
        assert_eq!(config.storage.region, "us-east-1");
        assert!(!config.storage.path_style);
        assert_eq!(config.media_transfer.retry_count, 0);
        assert!(config.media_transfer.allowed_domains.is_empty());
        assert_eq!(config.download_timeout(), None);
    }

    #[test]
    fn test_overrides() {
        let mut pairs = STORAGE.to_vec();
        pairs.extend([
            ("SERVER_PORT", "9090"),
            ("LOG_OUTPUT", "both"),
            ("LOG_LEVEL", "debug"),
            ("LOG_ROTATION", "Hourly"),
            ("LOG_MAX_FILES", "0"),
            ("OSS_PATH_STYLE", "true"),
            ("TRANSFER_DOWNLOAD_TIMEOUT_SECS", "30"),
            ("TRANSFER_RETRY_COUNT", "3"),
            ("TRANSFER_ALLOWED_DOMAINS", "a.example.com, b.example.com,,"),
        ]);
        let config = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.logger.output, LogOutput::Both);
        assert_eq!(config.logger.rotation, LogRotation::Hourly);
        assert_eq!(config.logger.max_files, 0);
        assert!(config.storage.path_style);
        assert_eq!(config.download_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.media_transfer.retry_count, 3);
        assert_eq!(
            config.media_transfer.allowed_domains,
            vec!["a.example.com", "b.example.com"]
        );
    }

    #[test]
    fn test_missing_storage_and_bad_values() {
        assert!(GatewayConfig::from_lookup(lookup_from(&[])).is_err());

        let mut pairs = STORAGE.to_vec();
        pairs.push(("SERVER_PORT", "http"));
        assert!(GatewayConfig::from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = STORAGE.to_vec();
        pairs.push(("LOG_OUTPUT", "syslog"));
        assert!(GatewayConfig::from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = STORAGE.to_vec();
        pairs.push(("LOG_ROTATION", "weekly"));
        assert!(GatewayConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_debug_hides_credentials() {
        let config = GatewayConfig::from_lookup(lookup_from(STORAGE)).unwrap();
        let printed = format!("{:?}", config.storage);
        assert!(!printed.contains("test-secret-value"));
        assert!(!printed.contains("test-key-id"));
        assert!(printed.contains("media"));
    }
}
