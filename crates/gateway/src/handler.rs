//! # API操作の実行
//!
//! 解析済みの `Operation` を `StorageManager` の対応する操作に振り分け、
//! 結果をレスポンスエンベロープに変換する。自身はI/Oを行わない。

use ws_storage_types::{ApiData, ApiResult, Verb};

use crate::error::StorageError;
use crate::request::Operation;
use crate::storage::StorageManager;

/// 操作を実行してエンベロープを返す。
///
/// エラーは `Result` 欄に `"error - <message>"` として描画され、`Data` は空になる。
pub async fn handle_operation(op: &Operation, mgr: &dyn StorageManager) -> ApiResult {
    match dispatch(op, mgr).await {
        Ok(data) => ApiResult::ok(op.verb, data),
        Err(e) => {
            tracing::warn!(method = %op.verb, workspace = %op.identity, key = %op.key, error = %e, "API操作に失敗");
            ApiResult::error(op.verb, e)
        }
    }
}

async fn dispatch(
    op: &Operation,
    mgr: &dyn StorageManager,
) -> Result<Option<ApiData>, StorageError> {
    let cx = &op.identity;
    let data = match op.verb {
        Verb::List => Some(ApiData::List(
            mgr.list(cx, &op.workspace, &op.key, "").await?,
        )),
        Verb::Upload => Some(ApiData::Url(
            mgr.upload_url(cx, &op.workspace, &op.key).await?,
        )),
        Verb::Download => Some(ApiData::Url(
            mgr.download_url(cx, &op.workspace, &op.key).await?,
        )),
        Verb::Delete => {
            mgr.delete_object(cx, &op.workspace, &op.key).await?;
            None
        }
    };
    Ok(data)
}
