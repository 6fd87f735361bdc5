//! # GET /ws-storage/healthy
//!
//! 死活監視用の固定レスポンス。

use axum::Json;

pub async fn handle_healthy() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}
