use abacus::{server, CoordinatorConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = CoordinatorConfig::from_env();
    info!(port = config.port, "starting coordinator");
    server::serve(config).await
}
