use reefwatch::api::router::create_router;
use reefwatch::config::AppConfig;
use reefwatch::ingestion::BlockPipeline;
use reefwatch::services::{BroadcastHub, ChainPoller, LatestBlock};
use reefwatch::{build_gateway, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);
    let metrics_handle = reefwatch::metrics::init_metrics();

    let gateway = build_gateway(&config)?;
    let pipeline = BlockPipeline::new(gateway.clone());
    let hub = BroadcastHub::new();
    let latest = LatestBlock::new();

    // --- Chain poller: tip watcher → enrichment → viewer fan-out ---
    if !config.poller_enabled {
        tracing::info!("Chain poller disabled (POLLER_ENABLED=false)");
    } else if !gateway.is_configured() {
        tracing::warn!("No ledger gateway configured, chain poller will not start");
    } else {
        let poller = ChainPoller::new(
            pipeline.clone(),
            hub.clone(),
            latest.clone(),
            config.poller(),
        );
        tokio::spawn(poller.run());
    }

    let state = AppState {
        config,
        pipeline,
        hub,
        latest,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
