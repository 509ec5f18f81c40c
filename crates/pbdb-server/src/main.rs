mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use pbdb_phantombuster::PhantomBusterClient;
use pbdb_sync::ActivitySource;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(pbdb_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = pbdb_db::PoolConfig::from_app_config(&config);
    let pool = pbdb_db::connect_pool(&config.database_url, pool_config).await?;
    pbdb_db::run_migrations(&pool).await?;

    let source = build_source(&config)?;
    if source.is_none() {
        tracing::warn!("PHANTOMBUSTER_API_KEY is not set; sync endpoints are disabled");
    }

    let state = AppState {
        pool,
        source,
        sync_max_concurrent_containers: config.sync_max_concurrent_containers,
    };

    let _scheduler = scheduler::build_scheduler(state.clone(), config.sync_cron.as_deref()).await?;

    let app = build_app(state);

    tracing::info!(addr = %config.bind_addr, env = %config.env, "pbdb-server listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn build_source(
    config: &pbdb_core::AppConfig,
) -> anyhow::Result<Option<Arc<dyn ActivitySource>>> {
    let upstream = config.upstream();
    let Some(api_key) = upstream.api_key.as_deref() else {
        return Ok(None);
    };
    let client =
        PhantomBusterClient::with_base_url(api_key, upstream.request_timeout_secs, &upstream.base_url)?
            .with_retry(upstream.max_retries, upstream.retry_backoff_base_ms);
    Ok(Some(Arc::new(client)))
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
