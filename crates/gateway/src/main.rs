//! # ws-storage
//!
//! Gatewayのエントリポイント。
//!
//! ## 起動シーケンス
//! 1. `--config` で指定されたJSON設定を読み込む（bucket未設定は致命的エラー）
//! 2. ログレベルに従ってtracingを初期化
//! 3. ストレージバックエンドを構築し、ルーターに注入
//! 4. `listen` アドレスで待ち受け開始

use anyhow::Context;
use clap::Parser;

use ws_storage_gateway::app::build_router;
use ws_storage_gateway::config::{BackendKind, Config, GatewayState};
use ws_storage_gateway::storage::{MemoryBackend, WorkspaceManager};

/// 呼び出し元ごとのワークスペースに閉じたオブジェクトストレージGateway
#[derive(Debug, Parser)]
#[command(name = "ws-storage", version)]
struct Args {
    /// JSON設定ファイルのパス
    #[arg(long)]
    config: std::path::PathBuf,
}

fn build_state(config: &Config) -> anyhow::Result<GatewayState> {
    let state = match config.backend {
        BackendKind::Memory => {
            tracing::warn!("インメモリバックエンドで起動します（開発環境用）");
            GatewayState::new(WorkspaceManager::new(
                config.bucket_prefix.clone(),
                MemoryBackend::new(config.bucket.clone()),
            ))
        }
        #[cfg(feature = "vendor-aws")]
        BackendKind::S3 => {
            let backend = ws_storage_gateway::storage::S3Backend::from_env(&config.bucket)
                .context("S3バックエンドの初期化に失敗")?;
            GatewayState::new(WorkspaceManager::new(config.bucket_prefix.clone(), backend))
        }
        #[cfg(not(feature = "vendor-aws"))]
        BackendKind::S3 => {
            anyhow::bail!("S3バックエンドは vendor-aws feature 無効のため使用できません")
        }
    };
    Ok(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("設定の読み込みに失敗: {}", args.config.display()))?;

    tracing_subscriber::fmt()
        .with_max_level(config.level_filter())
        .init();

    tracing::info!(
        bucket = %config.bucket,
        bucket_prefix = %config.bucket_prefix,
        backend = ?config.backend,
        "設定を読み込みました"
    );

    let state = build_state(&config)?;
    let app = build_router(state);

    tracing::info!("ws-storageを {} で起動します", config.listen);

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("{} での待ち受けに失敗", config.listen))?;
    axum::serve(listener, app).await?;

    Ok(())
}
