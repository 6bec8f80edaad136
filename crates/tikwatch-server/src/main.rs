mod api;
mod commands;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use crate::scheduler::WatchContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(tikwatch_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(env = %config.env, "configuration loaded");

    let bot_token = config.require_bot_token()?.to_string();

    let profile = Arc::new(tikwatch_profile::ProfileClient::with_base_url(
        &config.api_key,
        config.request_timeout_secs,
        &config.api_base_url,
        &config.user_agent,
    )?);
    let notifier = Arc::new(tikwatch_notify::Notifier::new(
        &bot_token,
        config.request_timeout_secs,
    )?);

    let watch_list = Arc::new(tikwatch_core::load_watch_list(&config.watchlist_path)?.watch);
    tracing::info!(
        watched = watch_list.len(),
        interval_secs = config.watch_interval_secs,
        "watch-list loaded"
    );

    let ctx = Arc::new(WatchContext::new(
        Arc::clone(&config),
        Arc::clone(&profile),
        Arc::clone(&notifier),
        Arc::clone(&watch_list),
    ));
    let _scheduler = scheduler::build_scheduler(ctx).await?;

    let app = build_app(AppState {
        profile,
        notifier,
        webhook_token: Arc::new(bot_token),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "webhook server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
