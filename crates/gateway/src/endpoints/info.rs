//! # GET /ws-storage/info
//!
//! 公開エンドポイント一覧。

use axum::Json;
use ws_storage_types::MOUNT_PREFIX;

/// GET /ws-storage/info — 静的なエンドポイント一覧を返却する。
pub async fn handle_info() -> Json<serde_json::Value> {
    let endpoints: Vec<String> = [
        "list/$workspace/$key",
        "download/$workspace/$key",
        "upload/$workspace/$key",
        "healthy",
        "info",
    ]
    .iter()
    .map(|path| format!("/{MOUNT_PREFIX}/{path}"))
    .collect();
    Json(serde_json::json!({ "endpoints": endpoints }))
}
