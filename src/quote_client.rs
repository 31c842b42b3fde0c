use std::future::Future;

use log::debug;
use reqwest::Client;

use crate::{
    config::QuoteConfig,
    error::PipelineError,
    quote::{ProviderQuote, decode_quote},
};

/// Where the pipeline gets its quotes from.
pub trait RateSource {
    fn fetch_rate(&self) -> impl Future<Output = Result<ProviderQuote, PipelineError>> + Send;
}

/// Single unbounded GET against the quote provider. Cancellation comes from
/// the caller dropping the future; there is no timeout, retry or cache here.
#[derive(Debug, Clone)]
pub struct QuoteClient {
    http: Client,
    url: String,
    pair: String,
}

impl QuoteClient {
    pub fn new(config: &QuoteConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: &QuoteConfig) -> Self {
        Self {
            http,
            url: config.url.clone(),
            pair: config.pair.clone(),
        }
    }
}

impl RateSource for QuoteClient {
    async fn fetch_rate(&self) -> Result<ProviderQuote, PipelineError> {
        let resp = self.http.get(&self.url).send().await?;
        debug!("provider responded status={} url={}", resp.status(), self.url);

        let body = resp.bytes().await?;
        decode_quote(&body, &self.pair)
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, HttpServer, web};

    use super::*;

    fn serve(payload: &'static str) -> String {
        let server = HttpServer::new(move || {
            App::new().route(
                "/json/last/USD-BRL",
                web::get().to(move || async move {
                    HttpResponse::Ok()
                        .content_type("application/json")
                        .body(payload)
                }),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        format!("http://{addr}/json/last/USD-BRL")
    }

    fn client_for(url: String) -> QuoteClient {
        QuoteClient::new(&QuoteConfig {
            url,
            pair: "USD-BRL".to_string(),
        })
    }

    #[actix_web::test]
    async fn fetches_and_decodes_quote() {
        let url = serve(r#"{"USDBRL":{"bid":"5.25","create_date":"2024-01-01 10:00:00"}}"#);

        let quote = client_for(url).fetch_rate().await.unwrap();

        assert_eq!(quote.bid, "5.25");
        assert_eq!(quote.create_date, "2024-01-01 10:00:00");
    }

    #[actix_web::test]
    async fn malformed_payload_is_decode_error() {
        let url = serve(r#"{"USDBRL":{"create_date":"2024-01-01 10:00:00"}}"#);

        let err = client_for(url).fetch_rate().await.unwrap_err();

        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[actix_web::test]
    async fn unreachable_provider_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(format!("http://{addr}/json/last/USD-BRL"))
            .fetch_rate()
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Network(_)));
    }
}
