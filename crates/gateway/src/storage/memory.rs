//! # インメモリ バックエンド
//!
//! ローカル開発とテスト用のオブジェクトストレージ実装。
//! 署名付きURLは `memory://` スキームのダミーで、実際のPUTは
//! `put_object` で代替する。

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{BackendObject, ListPage, ObjectBackend, LIST_MAX_KEYS};
use crate::error::StorageError;

#[derive(Debug, Clone)]
struct StoredObject {
    size: u64,
    last_modified: DateTime<Utc>,
}

/// インメモリのオブジェクトストレージ。クローンは同じ内容を共有する。
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    bucket: String,
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
}

impl MemoryBackend {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// 署名付きURLへのPUTを模してオブジェクトを書き込む。既存キーは上書き。
    pub async fn put_object(&self, key: &str, size: u64) {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                size,
                last_modified: Utc::now(),
            },
        );
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    fn presign(&self, method: &str, key: &str, expiry_secs: u32) -> String {
        format!(
            "memory://{}/{}?X-Amz-Expires={}&method={}",
            self.bucket, key, expiry_secs, method
        )
    }
}

#[async_trait::async_trait]
impl ObjectBackend for MemoryBackend {
    async fn list_page(&self, prefix: &str, delimiter: &str) -> Result<ListPage, StorageError> {
        let objects = self.objects.read().await;
        let mut page = ListPage::default();
        let mut returned = 0;

        for (key, stored) in objects.range(prefix.to_string()..) {
            let Some(rest) = key.strip_prefix(prefix) else {
                break;
            };
            if returned >= LIST_MAX_KEYS {
                break;
            }
            match rest.find(delimiter).filter(|_| !delimiter.is_empty()) {
                Some(idx) => {
                    let common = format!("{prefix}{}", &rest[..idx + delimiter.len()]);
                    if page.common_prefixes.last() != Some(&common) {
                        page.common_prefixes.push(common);
                        returned += 1;
                    }
                }
                None => {
                    page.objects.push(BackendObject {
                        key: key.clone(),
                        size: stored.size,
                        last_modified: stored.last_modified,
                    });
                    returned += 1;
                }
            }
        }
        Ok(page)
    }

    async fn presign_put(&self, key: &str, expiry_secs: u32) -> Result<String, StorageError> {
        Ok(self.presign("PUT", key, expiry_secs))
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, StorageError> {
        Ok(self.presign("GET", key, expiry_secs))
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.objects.write().await.remove(key);
        Ok(())
    }
}
