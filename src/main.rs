use anyhow::Result;
use axum::{routing::get, Router};
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use translate_relay::bot::Bot;
use translate_relay::config::Config;
use translate_relay::store::Store;
use translate_relay::telegram::Telegram;
use translate_relay::translation::Translator;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translate_relay=info".parse()?),
        )
        .init();

    info!("Starting translation relay");

    // Load configuration from environment
    let config = Config::from_env()?;

    // Pick the store backend
    let store = match &config.database_url {
        Some(url) => {
            info!("Using SQLite store at {}", url);
            Store::sqlite(url).await?
        }
        None => {
            info!("DATABASE_URL not set, using volatile in-memory store");
            Store::memory()
        }
    };

    let telegram = Telegram::new(&config)?;
    let translator = Translator::new(&config)?;

    // Health/status server on a background task
    let started_at = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
    let app = Router::new()
        .route(
            "/",
            get(move || async move { format!("Translation relay running since {}", started_at) }),
        )
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Health server listening on {}", addr);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Health server error: {}", e);
        }
    });

    // Polling requires no webhook to be registered
    telegram.delete_webhook().await?;
    if let Err(e) = telegram.set_my_commands().await {
        warn!("Failed to register bot commands: {}", e);
    }

    let bot = Bot::new(telegram.clone(), translator, store);
    run_polling(telegram, bot).await
}

/// Long-poll for updates until ctrl-c. In-flight updates finish before the
/// loop exits; no new ones are accepted afterwards.
async fn run_polling(telegram: Telegram, bot: Bot) -> Result<()> {
    let mut offset = 0i64;
    info!("Polling for updates");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping");
                return Ok(());
            }
            result = telegram.get_updates(offset) => {
                match result {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            bot.handle_update(update).await;
                        }
                    }
                    Err(e) => {
                        warn!("getUpdates failed: {}", e);
                        tokio::time::sleep(Duration::from_secs(3)).await;
                    }
                }
            }
        }
    }
}
