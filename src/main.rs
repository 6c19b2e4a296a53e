use bakery_recommender::api::{create_router, AppState};
use bakery_recommender::infrastructure::{telemetry, AppConfig, OpenMode, ServiceContext};
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init("api=debug,bakery_recommender=debug,tower_http=debug");

    let config = AppConfig::load()?;
    let host = config.config.server.host.clone();
    let port = config.config.server.port;

    let context = ServiceContext::open(config, OpenMode::Serve).await?;
    let app = create_router(AppState::from_context(&context));

    let addr = SocketAddr::new(host.parse()?, port);
    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    context.close();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
