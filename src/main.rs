//! imbotd - InviteManager bot daemon.

use imbot::api::ChatApi;
use imbot::config::{self, Config, LogFormat};
use imbot::db::Database;
use imbot::framework::CoreDeps;
use imbot::network::{Console, EVENT_CHANNEL_SIZE, console, run_event_loop};
use imbot::Bot;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)
        .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", config_path, e))?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.logging.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "configuration has {} error(s), see above",
            errors.len()
        ));
    }

    info!(
        bot = %config.bot.name,
        user_id = config.bot.user_id,
        prefix = %config.bot.default_prefix,
        "Starting imbotd"
    );

    // Initialize database
    let db = Database::new(&config.database.path).await?;

    // Metrics
    imbot::metrics::init();
    if config.metrics.port != 0 {
        let port = config.metrics.port;
        tokio::spawn(async move {
            imbot::http::run_http_server(port).await;
        });
    }

    // The console fixture is the only gateway shipped with the daemon.
    let Some(console_config) = config.console.clone() else {
        return Err(anyhow::anyhow!(
            "no [console] section configured; imbotd needs a gateway to read events from"
        ));
    };
    let memory_api = Arc::new(console::fixture_api(&config.bot, &console_config));
    memory_api.set_observer(console::print_outbound);
    let api: Arc<dyn ChatApi> = memory_api.clone();

    let bot = Bot::build(CoreDeps {
        db,
        api,
        config: Arc::new(config),
    })
    .map_err(|e| {
        error!(error = %e, code = e.error_code(), "Failed to assemble bot");
        e
    })?;
    let bot = Arc::new(bot);

    let (events_tx, events_rx) = tokio::sync::mpsc::channel(EVENT_CHANNEL_SIZE);
    let event_loop = tokio::spawn(run_event_loop(Arc::clone(&bot), events_rx));

    tokio::select! {
        _ = Console::new(memory_api, console_config).run(events_tx) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    // Console closed: the event loop finishes the events already in flight.
    if let Err(e) = event_loop.await {
        error!(error = %e, "Event loop task failed");
    }
    info!("imbotd stopped");
    Ok(())
}
