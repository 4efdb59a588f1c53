use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use watch_valuer::api::{router, ApiState};
use watch_valuer::artifact::load_context;
use watch_valuer::config::Config;
use watch_valuer::error::Result;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // Artifact bundle load is the only blocking file I/O in the process.
    // Any failure aborts startup — the service never runs degraded.
    let ctx = load_context(&cfg)?;
    info!(
        models = ctx.encoder.known_models().len(),
        watches = ctx.stats.total_watches,
        "Valuation context ready"
    );

    let state = ApiState { ctx: Arc::new(ctx) };
    let app = router(state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
