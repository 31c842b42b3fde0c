use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::{Context, Result};
use cotacao::{
    config::Config, http::routes, pipeline::RequestPipeline, quote_client::QuoteClient,
    store::Store,
};
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    Store::initialize(&config.storage)
        .await
        .with_context(|| format!("Can't initialize storage at {}", config.storage.database_url))?;

    let pipeline = web::Data::new(RequestPipeline::new(QuoteClient::new(&config.quote), &config));

    info!(
        "listening on {} pair={} provider={}",
        config.listen_addr, config.quote.pair, config.quote.url
    );
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(routes(pipeline.clone()))
    })
    .bind(&config.listen_addr)
    .with_context(|| format!("Can't bind {}", config.listen_addr))?
    .run()
    .await?;

    Ok(())
}
