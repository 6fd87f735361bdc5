//! # APIリクエストの解析
//!
//! パス（`/ws-storage/$verb/$workspace/$key`）、HTTPメソッド、
//! 上流の認証プロキシが設定したユーザーヘッダから型付きの `Operation` を構築する。

use axum::http::Method;
use ws_storage_types::{Verb, SELF_WORKSPACE};

use crate::error::RequestError;

/// 認証済みの呼び出し元ID。空でないことが保証される。
///
/// 認証そのものは上流の責務で、ここでは空値のみを拒否する。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn new(user: impl Into<String>) -> Result<Self, RequestError> {
        let user = user.into();
        if user.is_empty() {
            return Err(RequestError::MissingIdentity);
        }
        Ok(Self(user))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 解析済みのAPI操作。リクエストごとに構築され、1回だけ消費される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub verb: Verb,
    /// ワークスペースセレクタ（現在は常に `@user`）
    pub workspace: String,
    /// ワークスペース相対のキーまたはプレフィックス。空も可
    pub key: String,
    pub identity: Identity,
}

impl Operation {
    /// パス、メソッド、ユーザーヘッダから操作を解析する。
    ///
    /// パス先頭の `/` とマウントプレフィックス（最初のセグメント）を読み捨て、
    /// 残りを `verb`, `workspace`, `key...` として解釈する。
    /// `list` パスへのDELETEは `delete` として扱う。
    pub fn parse(path: &str, method: &Method, remote_user: &str) -> Result<Self, RequestError> {
        let path_tokens = path.strip_prefix('/').unwrap_or(path);
        let mut tokens = path_tokens.split('/').skip(1);

        let identity = Identity::new(remote_user)?;

        let (Some(verb), Some(workspace)) = (tokens.next(), tokens.next()) else {
            return Err(RequestError::MalformedPath(path.to_string()));
        };
        let key = tokens.collect::<Vec<_>>().join("/");

        let verb = match Verb::from_path_segment(verb) {
            Some(Verb::List) if *method == Method::DELETE => Verb::Delete,
            Some(verb) => verb,
            None => return Err(RequestError::InvalidVerb(verb.to_string())),
        };
        if workspace != SELF_WORKSPACE {
            return Err(RequestError::UnsupportedWorkspace(workspace.to_string()));
        }

        Ok(Self {
            verb,
            workspace: workspace.to_string(),
            key,
            identity,
        })
    }
}
