// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use anyhow::Context;
use secrecy::SecretString;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::command_service::CommandService;
use crate::application::dashboard_registry::DashboardRegistry;
use crate::infrastructure::config::{load_app_config, DEFAULT_CONFIG_PATH};
use crate::infrastructure::grafana_client::GrafanaClient;
use crate::infrastructure::slack_client::SlackClient;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config_path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    tracing::info!(path = %config_path, "loading configuration");
    let config = load_app_config(&config_path).context("failed to load configuration")?;

    let registry = Arc::new(DashboardRegistry::from_dashboards(config.dashboards())?);
    tracing::info!(dashboards = ?registry.names(), "dashboard registry ready");

    // Create adapters (infrastructure layer)
    let p12_password = SecretString::from(std::env::var("CLIENT_AUTH_PASSWORD").unwrap_or_default());
    let render_auth = config.grafana.render_auth(p12_password)?;
    let grafana = Arc::new(
        GrafanaClient::new(config.grafana.endpoint.clone(), render_auth)
            .context("failed to create grafana client")?,
    );
    let slack = Arc::new(SlackClient::new(
        config.slack.api_base.clone(),
        config.slack.token.clone(),
    ));

    // Create services (application layer)
    let command_service = CommandService::new(
        registry.clone(),
        grafana,
        slack,
        config.slack.command.clone(),
    );

    // Create application state
    let state = Arc::new(AppState {
        command_service,
        signing_secret: config.slack.secret.clone(),
    });

    spawn_reload_on_hangup(config_path, registry);

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.slack.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.slack.addr))?;
    tracing::info!(addr = %config.slack.addr, command = %config.slack.command, "listening for slash commands");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Re-read the dashboard list on SIGHUP. A bad file leaves the current registry in place.
#[cfg(unix)]
fn spawn_reload_on_hangup(config_path: String, registry: Arc<DashboardRegistry>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(e) => {
            tracing::warn!("configuration reload disabled: {}", e);
            return;
        }
    };

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            let reloaded = load_app_config(&config_path)
                .and_then(|config| registry.load(config.dashboards()));
            match reloaded {
                Ok(()) => tracing::info!(dashboards = ?registry.names(), "dashboard registry reloaded"),
                Err(e) => tracing::error!("reload failed, keeping previous dashboards: {}", e),
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload_on_hangup(_config_path: String, _registry: Arc<DashboardRegistry>) {}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutting down");
}
