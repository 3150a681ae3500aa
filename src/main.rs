use anyhow::Result;
use colored::Colorize;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pumpwatch::client::BinanceFuturesClient;
use pumpwatch::transport::SlackNotifier;
use pumpwatch::{Config, MonitorBot};

fn init_tracing() -> Result<()> {
    // Create logs directory if it doesn't exist
    std::fs::create_dir_all("logs")?;

    // Create file appender for logs
    let file_appender = tracing_appender::rolling::daily("logs", "pumpwatch.log");
    let (non_blocking_file, _guard) = tracing_appender::non_blocking(file_appender);

    // Create console layer with formatting
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .compact();

    // Create file layer with JSON formatting
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .json()
        .with_current_span(false);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Leak the guard to prevent the file appender from being dropped
    std::mem::forget(_guard);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let config_path =
        std::env::var("PUMPWATCH_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load_from_file(&config_path)?;

    println!("{}", "📡 Pumpwatch - Pump/Dump Monitor".bold());
    println!("{}", "═".repeat(60));
    println!("⏱️  Heartbeat: {}s", config.monitor.heartbeat_secs);
    println!("🕯️  Timeframe: {}", config.monitor.timeframe.as_str());
    println!("🔕 Cooldown: {}s per symbol", config.monitor.send_delay_secs);
    println!("{}", "═".repeat(60));

    let market = BinanceFuturesClient::new(&config.binance.base_url);
    let notifier = SlackNotifier::new(
        &config.slack.channel,
        config.slack.api_token.as_deref(),
    )?;
    let mut bot = MonitorBot::new(config, market, notifier)?;

    tokio::select! {
        result = bot.run() => {
            if let Err(e) = &result {
                error!("Monitor stopped: {e:#}");
            }
            result
        }
        _ = signal::ctrl_c() => {
            info!("🛑 Shutdown signal received");
            Ok(())
        }
    }
}
