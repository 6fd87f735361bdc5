//! # ws-storage 共有型定義
//!
//! Gatewayのレスポンスエンベロープとリスト結果をRust構造体として提供する。
//!
//! ## エンコーディング規則
//! - フィールド名: PascalCase（`Version`, `Method`, `Result`, `Data` 等）
//! - 時刻: RFC 3339（UTC）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// プロトコル定数
// ---------------------------------------------------------------------------

/// レスポンスエンベロープのAPIバージョン
pub const API_VERSION: u32 = 1;

/// 呼び出し元自身のワークスペースを表すセレクタ
pub const SELF_WORKSPACE: &str = "@user";

/// APIのマウントプレフィックス（`/ws-storage/...`）
pub const MOUNT_PREFIX: &str = "ws-storage";

/// エンベロープの成功時 `Result` 値
pub const RESULT_OK: &str = "ok";

// ---------------------------------------------------------------------------
// 操作種別
// ---------------------------------------------------------------------------

/// APIの操作種別。
///
/// パス上に現れるのは `list` / `upload` / `download` のみ。
/// `Delete` は `list` パスへのDELETEメソッドから導出される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    List,
    Upload,
    Download,
    Delete,
}

impl Verb {
    /// ワイヤ上の動詞文字列
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::List => "list",
            Verb::Upload => "upload",
            Verb::Download => "download",
            Verb::Delete => "delete",
        }
    }

    /// パスセグメントから動詞を解決する。`delete` はパスからは受け付けない。
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "list" => Some(Verb::List),
            "upload" => Some(Verb::Upload),
            "download" => Some(Verb::Download),
            _ => None,
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// リスト結果
// ---------------------------------------------------------------------------

/// リスト結果の1オブジェクト。
///
/// `workspace_key` はユーザーごとのプレフィックスを除去した
/// ワークスペース相対のキー。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectInfo {
    /// ワークスペース（呼び出し元のID）
    pub workspace: String,
    /// ワークスペース相対のキー
    pub workspace_key: String,
    /// オブジェクトサイズ（バイト）
    pub size_bytes: u64,
    /// 最終更新日時
    pub last_modified: DateTime<Utc>,
}

/// List操作の結果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListResult {
    /// ワークスペース（呼び出し元のID）
    pub workspace: String,
    /// 問い合わせたプレフィックス
    pub prefix: String,
    /// オブジェクト一覧（バックエンドの返却順）
    pub objects: Vec<ObjectInfo>,
    /// ワークスペース相対の共通プレフィックス一覧
    pub prefixes: Vec<String>,
}

// ---------------------------------------------------------------------------
// レスポンスエンベロープ
// ---------------------------------------------------------------------------

/// 動詞ごとのペイロード。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiData {
    /// list の結果
    List(ListResult),
    /// upload / download の署名付きURL
    Url(String),
}

/// APIレスポンスエンベロープ。
///
/// `result` は `"ok"` または `"error - <message>"`。
/// トランスポートのステータスコードとは独立したアプリケーションレベルの成否を表す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiResult {
    /// APIバージョン（常に1）
    pub version: u32,
    /// 実行した動詞
    pub method: Verb,
    /// "ok" または "error - <message>"
    pub result: String,
    /// 動詞ごとのペイロード。エラー時およびdelete時はnull
    pub data: Option<ApiData>,
}

impl ApiResult {
    /// 成功エンベロープを構築する。
    pub fn ok(method: Verb, data: Option<ApiData>) -> Self {
        Self {
            version: API_VERSION,
            method,
            result: RESULT_OK.to_string(),
            data,
        }
    }

    /// エラーエンベロープを構築する。`data` は常に空。
    pub fn error(method: Verb, message: impl std::fmt::Display) -> Self {
        Self {
            version: API_VERSION,
            method,
            result: format!("error - {message}"),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result == RESULT_OK
    }
}
