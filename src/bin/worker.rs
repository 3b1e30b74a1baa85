use abacus::{Worker, WorkerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = WorkerConfig::from_env();
    info!(
        computing_power = config.computing_power,
        coordinator = %config.coordinator_url,
        "starting worker"
    );
    Worker::new(config).run().await
}
