//! # ワークスペースストレージ
//!
//! 呼び出し元ごとのワークスペースに閉じたストレージ操作の抽象インターフェースと、
//! 任意のオブジェクトストレージバックエンド上の実装。
//! S3互換ストレージ実装は `s3` サブモジュール、インメモリ実装は `memory` を参照。

pub mod memory;
#[cfg(feature = "vendor-aws")]
pub mod s3;

pub use memory::MemoryBackend;
#[cfg(feature = "vendor-aws")]
pub use s3::S3Backend;

use chrono::{DateTime, Utc};
use ws_storage_types::{ListResult, ObjectInfo, SELF_WORKSPACE};

use crate::error::StorageError;
use crate::path::{make_storage_key, StorageKey};
use crate::request::Identity;

/// 署名付きURLの有効期限（秒）
pub const PRESIGN_EXPIRY_SECS: u32 = 60 * 60;

/// 1回のリストで返すキーの上限（バックエンド1ページ分）
pub const LIST_MAX_KEYS: usize = 1000;

/// リストの区切り文字
pub const LIST_DELIMITER: &str = "/";

/// ワークスペースストレージの抽象インターフェース。
///
/// 全操作は `workspace` が `@user` であることを再検証し、
/// パス検証に失敗した場合はバックエンドを呼び出さずに失敗する。
#[async_trait::async_trait]
pub trait StorageManager: Send + Sync {
    /// ワークスペース内の `prefix` 直下のオブジェクトと共通プレフィックスを列挙する。
    /// ページングは未実装のため `page` は空でなければならない。
    async fn list(
        &self,
        identity: &Identity,
        workspace: &str,
        prefix: &str,
        page: &str,
    ) -> Result<ListResult, StorageError>;

    /// 署名付きアップロードURL（PUT）を生成する。
    async fn upload_url(
        &self,
        identity: &Identity,
        workspace: &str,
        key: &str,
    ) -> Result<String, StorageError>;

    /// 署名付きダウンロードURL（GET）を生成する。
    /// 部分取得はURLに対するRangeヘッダで行う。
    async fn download_url(
        &self,
        identity: &Identity,
        workspace: &str,
        key: &str,
    ) -> Result<String, StorageError>;

    /// オブジェクトを削除する。存在しないキーの削除はエラーにならない。
    async fn delete_object(
        &self,
        identity: &Identity,
        workspace: &str,
        key: &str,
    ) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// バックエンド
// ---------------------------------------------------------------------------

/// バックエンドのリスト結果の1エントリ（フルキー）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendObject {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// バックエンドのリスト結果1ページ分。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub objects: Vec<BackendObject>,
    pub common_prefixes: Vec<String>,
}

/// オブジェクトストレージバックエンドの抽象インターフェース。
///
/// 検証済みのフルキーのみを受け取る。タイムアウトやリトライは実装側の責務。
#[async_trait::async_trait]
pub trait ObjectBackend: Send + Sync {
    /// `prefix` 配下を `delimiter` 区切りで1ページ分（最大 `LIST_MAX_KEYS` 件）列挙する。
    async fn list_page(&self, prefix: &str, delimiter: &str) -> Result<ListPage, StorageError>;

    async fn presign_put(&self, key: &str, expiry_secs: u32) -> Result<String, StorageError>;

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, StorageError>;

    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// ワークスペースマネージャ
// ---------------------------------------------------------------------------

/// 任意の `ObjectBackend` 上で `StorageManager` を実装する。
pub struct WorkspaceManager<B> {
    bucket_prefix: String,
    backend: B,
}

impl<B: ObjectBackend> WorkspaceManager<B> {
    pub fn new(bucket_prefix: impl Into<String>, backend: B) -> Self {
        Self {
            bucket_prefix: bucket_prefix.into(),
            backend,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn object_key(
        &self,
        identity: &Identity,
        workspace: &str,
        key: &str,
    ) -> Result<StorageKey, StorageError> {
        check_workspace(workspace)?;
        make_storage_key(&self.bucket_prefix, identity.as_str(), key)
    }
}

fn check_workspace(workspace: &str) -> Result<(), StorageError> {
    if workspace != SELF_WORKSPACE {
        return Err(StorageError::InvalidWorkspace(workspace.to_string()));
    }
    Ok(())
}

#[async_trait::async_trait]
impl<B: ObjectBackend> StorageManager for WorkspaceManager<B> {
    async fn list(
        &self,
        identity: &Identity,
        workspace: &str,
        prefix: &str,
        page: &str,
    ) -> Result<ListResult, StorageError> {
        check_workspace(workspace)?;
        if !page.is_empty() {
            return Err(StorageError::NotImplemented(
                "ページングは未実装です".to_string(),
            ));
        }
        let query = make_storage_key(&self.bucket_prefix, identity.as_str(), prefix)?;
        let root = make_storage_key(&self.bucket_prefix, identity.as_str(), "")?;

        let listing = self
            .backend
            .list_page(query.as_str(), LIST_DELIMITER)
            .await?;

        tracing::debug!(
            func = "list",
            workspace = %identity,
            prefix = %prefix,
            objects = listing.objects.len(),
            prefixes = listing.common_prefixes.len()
        );

        let objects = listing
            .objects
            .iter()
            .map(|item| ObjectInfo {
                workspace: identity.to_string(),
                workspace_key: root.relative(&item.key).to_string(),
                size_bytes: item.size,
                last_modified: item.last_modified,
            })
            .collect();
        let prefixes = listing
            .common_prefixes
            .iter()
            .map(|p| root.relative(p).to_string())
            .collect();

        Ok(ListResult {
            workspace: identity.to_string(),
            prefix: prefix.to_string(),
            objects,
            prefixes,
        })
    }

    async fn upload_url(
        &self,
        identity: &Identity,
        workspace: &str,
        key: &str,
    ) -> Result<String, StorageError> {
        let object_key = self.object_key(identity, workspace, key)?;
        let url = self
            .backend
            .presign_put(object_key.as_str(), PRESIGN_EXPIRY_SECS)
            .await?;
        tracing::info!(func = "upload_url", workspace = %identity, key = %key);
        Ok(url)
    }

    async fn download_url(
        &self,
        identity: &Identity,
        workspace: &str,
        key: &str,
    ) -> Result<String, StorageError> {
        let object_key = self.object_key(identity, workspace, key)?;
        let url = self
            .backend
            .presign_get(object_key.as_str(), PRESIGN_EXPIRY_SECS)
            .await?;
        tracing::info!(func = "download_url", workspace = %identity, key = %key);
        Ok(url)
    }

    async fn delete_object(
        &self,
        identity: &Identity,
        workspace: &str,
        key: &str,
    ) -> Result<(), StorageError> {
        let object_key = self.object_key(identity, workspace, key)?;
        self.backend.delete_object(object_key.as_str()).await?;
        tracing::info!(func = "delete_object", workspace = %identity, key = %key);
        Ok(())
    }
}
