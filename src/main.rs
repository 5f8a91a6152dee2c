use civic_issue_manager::{
    analytics::AnalyticsEngine,
    api::{build_router, AppState},
    classification::ClassificationEngine,
    config::Config,
    processing::{DuplicateDetector, IssueProcessor},
    realtime::EventBroadcaster,
    state::create_store,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first so the log filter default is available
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.observability.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Civic Issue Manager v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = civic_issue_manager::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("Prometheus metrics initialized");
        }
    } else {
        tracing::info!("Prometheus metrics disabled in configuration");
    }

    // Initialize storage backend
    tracing::info!("Storage backend: {:?}", config.state.backend);
    let store = create_store(&config.state)?;
    tracing::info!("Storage backend initialized");

    // Initialize components
    let duplicate_detector = Arc::new(DuplicateDetector::new(
        store.clone(),
        config.processing.deduplication_window_secs as i64,
    ));

    let engine = Arc::new(ClassificationEngine::new(&config.classification));
    tracing::info!(
        predictor = ?config.classification.predictor,
        confidence_threshold = config.classification.confidence_threshold,
        "Classification engine initialized"
    );

    let broadcaster = Arc::new(EventBroadcaster::new(config.realtime.channel_capacity));
    tracing::info!("Event broadcaster initialized");

    let mut processor = IssueProcessor::new(store.clone(), duplicate_detector, engine);
    processor.set_broadcaster(broadcaster.clone());
    let processor = Arc::new(processor);

    let analytics = Arc::new(AnalyticsEngine::new(store));

    // Build HTTP router
    let app_state = AppState::new(processor, analytics, broadcaster);
    let app = build_router(app_state);

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   REST API: http://{}/v1/issues", http_addr);
    tracing::info!("   Event stream: ws://{}/ws", http_addr);

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = server => {
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutting down gracefully...");
    Ok(())
}
