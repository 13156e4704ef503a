use anyhow::Result;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use snaptaker::config::ConfigManager;
use snaptaker::host::HostRuntime;
use snaptaker::protocol::UnixSocketClient;
use snaptaker::services::{HostNotifier, OperatorService};
use snaptaker::web::{start_web_server, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("snaptaker=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting snaptaker");

    // Load configuration
    let config_manager = ConfigManager::new("config").await?;
    let config = config_manager.get_current_config();
    info!(
        "Configuration loaded: {} worlds, data in {}",
        config.worlds.len(),
        config.data_dir.display()
    );

    let operator = Arc::new(OperatorService::new(config.operator_webhook_url.clone())?);
    if operator.is_enabled() {
        info!(
            "Operator channel enabled with webhook: {}",
            operator.get_webhook_url()
        );

        match operator.test_webhook().await {
            Ok(()) => info!("Operator webhook test successful"),
            Err(e) => {
                error!("Operator webhook test failed: {}", e);
                warn!("Departure notices may not be delivered. Check the webhook URL.");
            }
        }
    } else {
        warn!("No operator_webhook_url configured, operator commands are only logged");
    }

    let notifier = Arc::new(HostNotifier::new(operator));
    let client = Arc::new(UnixSocketClient::new(
        config.socket_path.clone(),
        config.protocol_timeout(),
    ));
    info!(
        "Snapshot daemon at {} ({}s timeout)",
        client.socket_path().display(),
        config.protocol_timeout_seconds
    );

    let (runtime, host) = HostRuntime::new(config.clone(), client, notifier.clone())?;
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let host_task = tokio::spawn(runtime.run(async move {
        let _ = stop_rx.await;
    }));
    info!("Host runtime started");

    let state = AppState::new(config, host, notifier);
    let served = start_web_server(state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown requested");
    })
    .await;

    let _ = stop_tx.send(());
    if let Err(e) = host_task.await {
        error!("Host runtime task failed: {}", e);
    }

    served
}
