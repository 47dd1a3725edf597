use std::sync::Arc;

use futures::StreamExt;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rp_helpdesk::bot::HelpdeskBot;
use rp_helpdesk::channels::{Channel, CliChannel, OutgoingResponse};
use rp_helpdesk::config::HelpdeskConfig;
use rp_helpdesk::routes::{HelpdeskRouteState, helpdesk_routes};
use rp_helpdesk::store::{LibSqlStore, StateStore};
use rp_helpdesk::topics::names;

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = HelpdeskConfig::from_env()?;

    // Initialize tracing. Stdout belongs to the REPL, so logs go to stderr.
    let mut _log_guard: Option<tracing_appender::non_blocking::WorkerGuard> = None;
    let file_layer = config.log_dir.as_ref().map(|log_dir| {
        let file_appender = tracing_appender::rolling::daily(log_dir, "rp-helpdesk.log");
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
        _log_guard = Some(guard);
        tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_filter(env_filter())
    });
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter());
    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    eprintln!("🛠  {} v{}", config.name, env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());
    if let Some(port) = config.http_port {
        eprintln!("   HTTP API: http://0.0.0.0:{}/api/conversations", port);
    }
    eprintln!("   Type a message and press Enter. Type cancel to start over, help for the menu.\n");

    // ── State store ──────────────────────────────────────────────────────
    let store: Arc<dyn StateStore> = if config.is_memory_db() {
        Arc::new(LibSqlStore::new_memory().await?)
    } else {
        Arc::new(LibSqlStore::new_local(&config.db_path).await?)
    };

    let bot = Arc::new(HelpdeskBot::with_default_topics(store, config.clone())?);

    // ── HTTP surface ─────────────────────────────────────────────────────
    if let Some(port) = config.http_port {
        let app = helpdesk_routes(HelpdeskRouteState {
            bot: Arc::clone(&bot),
        });
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        tracing::info!(port, "HTTP server started");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("HTTP server stopped: {e}");
            }
        });
    }

    // ── CLI ──────────────────────────────────────────────────────────────
    let cli = CliChannel::new(format!("cli-{}", uuid::Uuid::new_v4()));
    let mut messages = cli.start().await?;

    for activity in bot.begin_dialog(cli.conversation_id(), names::GREETING, None).await? {
        println!("\n{}", rp_helpdesk::channels::cli::render(&activity.into()));
    }
    eprint!("> ");

    while let Some(message) = messages.next().await {
        if message.content.eq_ignore_ascii_case("/quit") {
            break;
        }
        match bot.handle_message(&message.conversation_id, &message.content).await {
            Ok(activities) => {
                for activity in activities {
                    cli.respond(&message, OutgoingResponse::from(activity)).await?;
                }
            }
            Err(e) => {
                tracing::error!(conversation_id = %message.conversation_id, "Turn failed: {e}");
                cli.respond(&message, OutgoingResponse::text(format!("Error: {e}")))
                    .await?;
            }
        }
        eprint!("> ");
    }

    cli.shutdown().await?;
    Ok(())
}
