//! Warning service entry point

use anyhow::Result;
use std::net::SocketAddr;
use tracing::info;
use warnsrv::{api, mq, AppState, WarnsrvConfig};

#[tokio::main]
async fn main() -> Result<()> {
    bms_common::logging::init("info").map_err(|e| anyhow::anyhow!("{e}"))?;

    info!("Starting warning service...");

    let config: WarnsrvConfig = bms_common::config::load_config("warnsrv")?;

    let pool = bms_infra::sqlite::connect(&config.database.path).await?;
    bms_infra::sqlite::init_schema(&pool).await?;

    let state = AppState::build(config.clone(), pool);

    if config.mq.enabled {
        mq::start_signal_consumer(
            config.redis.url.clone(),
            config.mq.channel.clone(),
            state.generator.clone(),
        );
    } else {
        info!("MQ disabled, signals will be processed inline at ingestion");
    }

    let app = api::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.service.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Warning service started on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
