//! Application setup and wiring

use std::sync::Arc;

use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::application::ScanPipeline;
use crate::config::Config;
use crate::infrastructure::{GitFetcher, GitleaksExecutor, GitleaksReportParser, WorkspaceManager};
use crate::presentation::controllers::AppState;
use crate::presentation::routes::create_router;

/// Handle returned from create_app for graceful shutdown coordination
pub struct AppHandle {
    pub router: Router,
    pub shutdown_token: CancellationToken,
}

/// Create the application router and return an AppHandle for shutdown coordination
pub async fn create_app(
    config: Config,
) -> Result<AppHandle, Box<dyn std::error::Error + Send + Sync>> {
    let config_arc = Arc::new(config.clone());
    let shutdown_token = CancellationToken::new();

    let workspaces = WorkspaceManager::new(&config.workspace)?;
    tracing::info!(
        parent_dir = %workspaces.parent_dir().display(),
        "Workspace manager initialized"
    );

    let fetcher = Arc::new(GitFetcher::new(&config.git));
    let runner = Arc::new(GitleaksExecutor::new(&config.scanner));
    let parser = Arc::new(GitleaksReportParser::new());

    // Surface a missing scanner binary at startup instead of on the first scan.
    match runner.check_installation().await {
        Ok(version) => tracing::info!(version = %version, "Scanner executable found"),
        Err(e) => {
            tracing::warn!(error = %e, "Scanner executable not available; scans will fail")
        }
    }

    let pipeline = ScanPipeline::new(workspaces, fetcher, runner, parser);

    let state = AppState { pipeline };
    let router = create_router(state, config_arc);

    Ok(AppHandle {
        router,
        shutdown_token,
    })
}
