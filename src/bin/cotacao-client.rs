use anyhow::Result;
use cotacao::{client::RateFetchClient, config::ClientConfig};
use env_logger::Env;
use log::warn;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = ClientConfig::from_env()?;
    let client = RateFetchClient::new(config);

    if let Err(e) = client.run().await {
        warn!("no quote available: {e}");
    }

    Ok(())
}
