//! # S3互換 バックエンド実装
//!
//! AWS S3, MinIO, Cloudflare R2 等のS3互換APIを使用する
//! オブジェクトストレージ実装。

use chrono::{DateTime, Utc};

use super::{BackendObject, ListPage, ObjectBackend, LIST_MAX_KEYS};
use crate::error::StorageError;

/// S3互換ストレージによるバックエンド実装。
pub struct S3Backend {
    bucket: s3::Bucket,
}

impl S3Backend {
    /// S3互換バケットから構築する。
    pub fn new(bucket: s3::Bucket) -> Self {
        Self { bucket }
    }

    /// バケット名と環境変数から構築する。
    ///
    /// - `S3_ENDPOINT`: S3互換エンドポイント（指定時はパススタイル）
    /// - `S3_REGION` / `AWS_REGION`: リージョン（デフォルト us-east-1）
    /// - `S3_ACCESS_KEY` / `S3_SECRET_KEY`: 未設定時はAWS標準の認証情報チェーン
    pub fn from_env(bucket_name: &str) -> anyhow::Result<Self> {
        let region_name = std::env::var("S3_REGION")
            .or_else(|_| std::env::var("AWS_REGION"))
            .unwrap_or_else(|_| "us-east-1".to_string());

        let region = match std::env::var("S3_ENDPOINT") {
            Ok(endpoint) => {
                tracing::info!(s3_endpoint = %endpoint, "S3互換エンドポイントを設定");
                s3::Region::Custom {
                    region: region_name,
                    endpoint,
                }
            }
            Err(_) => region_name.parse::<s3::Region>()?,
        };
        let path_style = matches!(region, s3::Region::Custom { .. });

        let access_key = std::env::var("S3_ACCESS_KEY").ok();
        let secret_key = std::env::var("S3_SECRET_KEY").ok();
        let credentials = s3::creds::Credentials::new(
            access_key.as_deref(),
            secret_key.as_deref(),
            None,
            None,
            None,
        )?;

        let mut bucket = s3::Bucket::new(bucket_name, region, credentials)?;
        if path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self::new(*bucket))
    }
}

fn backend_error(context: &str, e: impl std::fmt::Display) -> StorageError {
    StorageError::Backend(format!("{context}: {e}"))
}

#[async_trait::async_trait]
impl ObjectBackend for S3Backend {
    async fn list_page(&self, prefix: &str, delimiter: &str) -> Result<ListPage, StorageError> {
        let (result, status) = self
            .bucket
            .list_page(
                prefix.to_string(),
                Some(delimiter.to_string()),
                None,
                None,
                Some(LIST_MAX_KEYS),
            )
            .await
            .map_err(|e| backend_error("オブジェクト一覧の取得に失敗", e))?;
        if !(200..300).contains(&status) {
            return Err(backend_error("オブジェクト一覧の取得に失敗", format!("HTTP {status}")));
        }

        let objects = result
            .contents
            .into_iter()
            .map(|item| {
                let last_modified = DateTime::parse_from_rfc3339(&item.last_modified)
                    .map_err(|e| backend_error("LastModifiedのパースに失敗", e))?
                    .with_timezone(&Utc);
                Ok(BackendObject {
                    key: item.key,
                    size: item.size,
                    last_modified,
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;
        let common_prefixes = result
            .common_prefixes
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.prefix)
            .collect();

        Ok(ListPage {
            objects,
            common_prefixes,
        })
    }

    async fn presign_put(&self, key: &str, expiry_secs: u32) -> Result<String, StorageError> {
        self.bucket
            .presign_put(key, expiry_secs, None, None)
            .await
            .map_err(|e| backend_error("署名付きアップロードURL生成失敗", e))
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, StorageError> {
        self.bucket
            .presign_get(key, expiry_secs, None)
            .await
            .map_err(|e| backend_error("署名付きダウンロードURL生成失敗", e))
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| backend_error("オブジェクト削除に失敗", e))?;
        // S3は存在しないキーの削除にも204を返す。互換実装の404も成功扱い。
        let status = response.status_code();
        if (200..300).contains(&status) || status == 404 {
            Ok(())
        } else {
            Err(backend_error("オブジェクト削除に失敗", format!("HTTP {status}")))
        }
    }
}
