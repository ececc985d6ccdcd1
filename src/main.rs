use anyhow::Result;
use cv_match::{start_web_server, EnvironmentConfig};
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    Registry::default()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cv_match=info,rocket=warn")),
        )
        .init();

    let config = EnvironmentConfig::load()?;
    config.ensure_directories().await?;

    info!("Starting CV match relay server");
    info!("Evaluation service: {}", config.eval_service_url);

    start_web_server(config).await
}
