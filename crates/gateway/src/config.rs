//! # Gateway設定・共有状態
//!
//! JSON設定ファイルの読み込みとGatewayの共有状態の定義。

use std::path::Path;

use serde::Deserialize;
use tracing::level_filters::LevelFilter;

use crate::error::ConfigError;
use crate::storage::StorageManager;

/// 使用するストレージバックエンド
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// S3互換ストレージ
    #[default]
    S3,
    /// インメモリ（ローカル開発用）
    Memory,
}

/// Gateway設定（JSON）。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// バケット名（必須）
    #[serde(default)]
    pub bucket: String,
    /// バケット内のキープレフィックス
    #[serde(default, rename = "bucketprefix")]
    pub bucket_prefix: String,
    /// ログレベル（error / warn / info / debug / trace）
    #[serde(default = "default_log_level", rename = "loglevel")]
    pub log_level: String,
    /// 待ち受けアドレス
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default)]
    pub backend: BackendKind,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_listen() -> String {
    "0.0.0.0:8000".to_string()
}

impl Config {
    /// JSONファイルから設定を読み込む。bucketが空の場合は失敗する。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&bytes, &path.display().to_string())
    }

    /// JSONバイト列から設定を構築する。`origin` はエラーメッセージ用。
    pub fn from_json(bytes: &[u8], origin: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_json::from_slice(bytes)?;
        if config.bucket.is_empty() {
            return Err(ConfigError::MissingBucket(origin.to_string()));
        }
        if config.log_level.is_empty() {
            config.log_level = default_log_level();
        }
        Ok(config)
    }

    /// ログレベル文字列をフィルタに変換する。未知の値はinfo。
    pub fn level_filter(&self) -> LevelFilter {
        match self.log_level.to_ascii_lowercase().as_str() {
            "error" => LevelFilter::ERROR,
            "warn" => LevelFilter::WARN,
            "debug" => LevelFilter::DEBUG,
            "trace" => LevelFilter::TRACE,
            _ => LevelFilter::INFO,
        }
    }
}

/// Gatewayの共有状態。起動時に一度だけ構築され、以後は不変。
pub struct GatewayState {
    /// ワークスペースストレージ（トレイトで抽象化）
    pub manager: Box<dyn StorageManager>,
}

impl GatewayState {
    pub fn new(manager: impl StorageManager + 'static) -> Self {
        Self {
            manager: Box::new(manager),
        }
    }
}
