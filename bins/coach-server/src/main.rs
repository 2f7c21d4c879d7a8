mod handlers;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use coach_feedback::FeedbackClient;
use coach_judge::{Judge, JudgeConfig};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Shared application state. The semaphore bounds how many
/// evaluations run at once; the judge itself holds no cross-request
/// state.
pub struct AppState {
    pub judge: Judge,
    pub feedback: FeedbackClient,
    pub eval_limiter: Arc<Semaphore>,
    /// Submissions larger than this are rejected before a workspace
    /// is allocated.
    pub max_source_bytes: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("CodeCoach server booting...");

    let judge_config = JudgeConfig::from_env();
    info!(
        compiler = %judge_config.compiler,
        workspace_root = %judge_config.workspace_root.display(),
        test_timeout_ms = judge_config.test_timeout.as_millis() as u64,
        test_fanout = judge_config.test_fanout,
        "judge configured"
    );

    let feedback = FeedbackClient::from_env();
    if std::env::var("GOOGLE_API_KEY").is_err() {
        warn!("GOOGLE_API_KEY not set; /analyze will answer with a degradation message");
    }

    let max_concurrent = std::env::var("COACH_MAX_CONCURRENT_EVALS")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|&n: &usize| n > 0)
        .unwrap_or(8);

    let state = Arc::new(AppState {
        judge: Judge::new(judge_config),
        feedback,
        eval_limiter: Arc::new(Semaphore::new(max_concurrent)),
        max_source_bytes: 1024 * 1024,
    });

    let app = routes::routes().with_state(state);

    let addr =
        std::env::var("COACH_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %addr, max_concurrent, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to install CTRL+C handler");
        return;
    }
    warn!("received shutdown signal, draining in-flight evaluations...");
}
