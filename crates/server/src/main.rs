use std::sync::Arc;

use anyhow::Context;
use noteforge_server::{
    api,
    auth::{clock::SystemClock, password::Argon2Hasher, tokens::TokenService},
    config::{LogFormat, ServerConfig},
    db::{
        migrations::run_migrations,
        pool::{check_pool_health, create_pg_pool},
    },
    mailer::TracingMailer,
    secrets::OsSecretGenerator,
    service::Services,
    store::Store,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();
    init_tracing(&config);

    if config.is_dev_jwt_secret() {
        warn!("using the development JWT secret; set NOTEFORGE_JWT_SECRET in production");
    }

    let store = open_store(&config).await?;
    let tokens = Arc::new(
        TokenService::new(&config.jwt_secret, Arc::new(SystemClock))
            .context("invalid JWT secret")?
            .with_ttls(config.session_ttl, config.reset_ttl),
    );
    let services = Services::new(
        store,
        tokens,
        Arc::new(Argon2Hasher),
        Arc::new(OsSecretGenerator),
        Arc::new(TracingMailer),
        config.reset_link_base_url.clone(),
    );
    let app = api::build_app(services);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind listener on {}", config.listen_addr))?;

    info!(listen_addr = %config.listen_addr, "starting noteforge server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited unexpectedly")
}

fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn open_store(config: &ServerConfig) -> anyhow::Result<Store> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("NOTEFORGE_DATABASE_URL is not set; using a volatile in-memory store");
        return Ok(Store::memory());
    };

    let pool = create_pg_pool(database_url, config.pool.clone())
        .await
        .context("failed to initialize PostgreSQL pool")?;
    run_migrations(&pool).await.context("failed to run database migrations")?;
    check_pool_health(&pool).await.context("PostgreSQL health check failed")?;

    Ok(Store::Postgres(pool))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(?error, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!(?error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}
