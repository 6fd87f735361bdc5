//! # Gateway エラー型
//!
//! - `StorageError`: ストレージ操作の失敗。エンベロープの `Result` に描画される。
//! - `RequestError`: リクエスト形状の不正。Operation構築前にHTTP 400で返却される。
//! - `ConfigError`: 設定ファイル読み込みの失敗。起動時のみ発生し、致命的。

use std::path::PathBuf;

use axum::http::{header, StatusCode};

/// 400応答の固定ボディ
pub const INVALID_INPUT_BODY: &str = "{ \"Result\": \"invalid input\" }";

/// ストレージ操作のエラー型。
///
/// いずれもリクエスト単位で完結し、呼び出し元が入力を修正して再試行できる。
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// ユーザーIDが空、または `/` を含む
    #[error("不正なユーザーID: {0:?}")]
    InvalidIdentity(String),
    /// パスに `//`、`.`/`..` セグメント、または禁止文字が含まれる
    #[error("不正なパス - // または .. または /./ または禁止文字: {0:?}")]
    InvalidPath(String),
    /// `@user` 以外のワークスペース
    #[error("不正なワークスペース - 現在は個人ワークスペースのみサポート: {0:?}")]
    InvalidWorkspace(String),
    /// 未実装の機能（ページング）
    #[error("未実装: {0}")]
    NotImplemented(String),
    /// バックエンドのI/O失敗（メッセージはそのまま透過）
    #[error("{0}")]
    Backend(String),
}

/// リクエスト形状のエラー型。
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// 認証済みユーザーヘッダが空
    #[error("リモートユーザーが指定されていません")]
    MissingIdentity,
    /// 動詞とワークスペースをパスから決定できない
    #[error("入力パスから動詞とワークスペースを決定できません: {0:?}")]
    MalformedPath(String),
    /// list / upload / download 以外の動詞
    #[error("不正なリクエスト動詞: {0:?}")]
    InvalidVerb(String),
    /// `@user` 以外のワークスペース
    #[error("現在は @user ワークスペースのみサポート: {0:?}")]
    UnsupportedWorkspace(String),
}

impl axum::response::IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "application/json")],
            INVALID_INPUT_BODY,
        )
            .into_response()
    }
}

/// 設定読み込みのエラー型。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 設定ファイルの読み込みに失敗
    #[error("設定ファイルの読み込みに失敗: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// JSONのパースに失敗
    #[error("設定ファイルのパースに失敗: {0}")]
    Parse(#[from] serde_json::Error),
    /// bucketが未設定
    #[error("設定ファイルにbucketがありません: {0}")]
    MissingBucket(String),
}
