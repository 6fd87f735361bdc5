//! # ws-storage Gateway
//!
//! 共有オブジェクトストレージバケット上で、呼び出し元ごとの
//! ワークスペースに閉じた list / upload / download / delete を提供する。
//!
//! ## 処理の流れ
//! リクエスト → `request`（解析・形状検証） → `handler`（動詞で振り分け）
//! → `storage`（キー構築・バックエンド呼び出し） → エンベロープ
//!
//! ## API エンドポイント
//! - `GET /ws-storage/list/@user[/<prefix>]` — 一覧（DELETEメソッドで削除）
//! - `GET /ws-storage/upload/@user/<key>` — 署名付きアップロードURL
//! - `GET /ws-storage/download/@user/<key>` — 署名付きダウンロードURL
//! - `GET /ws-storage/healthy` — 死活監視
//! - `GET /ws-storage/info` — エンドポイント一覧

pub mod app;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod handler;
pub mod path;
pub mod request;
pub mod storage;
