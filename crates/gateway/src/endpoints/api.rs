//! # ANY /ws-storage/$verb/$workspace/$key
//!
//! ワークスペースストレージAPI。
//! 形状の不正（パス、ユーザーヘッダ）はHTTP 400、
//! ストレージ操作の失敗はHTTP 200 + エンベロープの `Result` で返す。

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use ws_storage_types::MOUNT_PREFIX;

use crate::config::GatewayState;
use crate::error::RequestError;
use crate::handler::handle_operation;
use crate::request::Operation;

/// 上流の認証プロキシが設定するユーザーIDヘッダ
pub const REMOTE_USER_HEADER: &str = "remote_user";

/// ANY /ws-storage/{*rest} — ワークスペースストレージ操作。
///
/// `/ws-storage/` 直下（残りが空）やUTF-8として復号できないパスも
/// `MalformedPath` として固定ボディの400で返す。
pub async fn handle_api(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    rest: Result<Path<String>, PathRejection>,
) -> Response {
    let start = Instant::now();
    let remote_user = headers
        .get(REMOTE_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let parsed = rest
        .map_err(|e| RequestError::MalformedPath(format!("{}: {e}", uri.path())))
        .and_then(|Path(rest)| {
            Operation::parse(&format!("/{MOUNT_PREFIX}/{rest}"), &method, remote_user)
        });
    let op = match parsed {
        Ok(op) => op,
        Err(e) => {
            tracing::info!(
                request = %uri,
                statuscode = 400,
                durationms = start.elapsed().as_millis() as u64,
                error = %e
            );
            return e.into_response();
        }
    };

    let result = handle_operation(&op, &*state.manager).await;

    let body = match serde_json::to_vec(&result) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(
                request = %uri,
                statuscode = 500,
                durationms = start.elapsed().as_millis() as u64,
                "レスポンスのシリアライズに失敗: {e}"
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, "error marshaling result").into_response();
        }
    };

    tracing::info!(
        request = %uri,
        statuscode = 200,
        durationms = start.elapsed().as_millis() as u64
    );
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}
