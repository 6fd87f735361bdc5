//! # HTTPルーター
//!
//! エンドポイントとGatewayの共有状態を束ねたaxumルーターを構築する。

use std::sync::Arc;

use axum::routing::any;
use axum::Router;

use crate::config::GatewayState;
use crate::endpoints::{handle_api, handle_healthy, handle_info};

/// ルーターを構築する。`state` は以後変更されない。
///
/// healthy / info はメソッドを問わず応答する。
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/ws-storage/healthy", any(handle_healthy))
        .route("/ws-storage/info", any(handle_info))
        .route("/ws-storage/", any(handle_api))
        .route("/ws-storage/{*rest}", any(handle_api))
        .with_state(Arc::new(state))
}
