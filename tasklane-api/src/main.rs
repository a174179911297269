//! # Tasklane API Server
//!
//! Serves the Tasklane REST API: accounts, projects, collaborators, invites
//! and tasks.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/tasklane SECRET_KEY=... cargo run -p tasklane-api
//! ```
//!
//! `DATABASE_URL=memory://` runs against a throwaway in-memory store.

use anyhow::Context;
use std::sync::Arc;
use tasklane_api::{
    app::{build_router, AppState},
    config::{Config, NotifyMode},
};
use tasklane_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    notify::{mail::SmtpMailer, queue::RedisQueue, templates::TemplateRenderer, Notifier},
    store::{memory::MemoryStore, postgres::PgStore, Store},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tasklane_api=debug,tasklane_shared=debug,tower_http=debug".into());

    if config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Tasklane API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let (store, pool): (Arc<dyn Store>, _) = if config.database.is_memory() {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        (Arc::new(MemoryStore::new()), None)
    } else {
        let pool = create_pool(DatabaseConfig {
            url: config.database.url.clone(),
            max_connections: config.database.max_connections,
            ..Default::default()
        })
        .await
        .context("Failed to connect to database")?;

        run_migrations(&pool).await.context("Failed to run migrations")?;

        (Arc::new(PgStore::new(pool.clone())), Some(pool))
    };

    let renderer = TemplateRenderer::new().context("Failed to load email templates")?;
    let notifier = match config.notify.mode {
        NotifyMode::Direct => {
            let mailer = SmtpMailer::new(&config.notify.smtp()).context("Invalid SMTP settings")?;
            Notifier::direct(renderer, Arc::new(mailer))
        }
        NotifyMode::Queue => {
            let url = config
                .notify
                .redis_url
                .as_deref()
                .context("REDIS_URL is required in queue mode")?;
            let queue = RedisQueue::connect(url, config.notify.queue_name.clone())
                .await
                .context("Failed to connect to Redis")?;
            Notifier::queued(renderer, Arc::new(queue))
        }
    };

    let address = config.bind_address();
    let app = build_router(AppState::new(store, config, notifier));

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(pool) = pool {
        close_pool(&pool).await;
    }

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
