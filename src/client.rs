use std::{path::Path, time::Duration};

use log::info;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::{config::ClientConfig, exchange_rate::format_bid};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("time limit exceeded after {0:?}")]
    Deadline(Duration),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered {status}: {body:?}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected quote body {0:?}")]
    Parse(String),

    #[error("can't write quote: {0}")]
    Sink(#[from] std::io::Error),
}

/// Calls the quote service once and records the result in a file.
#[derive(Debug, Clone)]
pub struct RateFetchClient {
    http: Client,
    config: ClientConfig,
}

impl RateFetchClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Fetches the quote with the whole exchange, body included, bounded by
    /// the configured deadline.
    pub async fn fetch(&self) -> Result<f64, ClientError> {
        tokio::time::timeout(self.config.deadline, self.request())
            .await
            .map_err(|_| ClientError::Deadline(self.config.deadline))?
    }

    async fn request(&self) -> Result<f64, ClientError> {
        let resp = self.http.get(&self.config.server_url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status != StatusCode::OK {
            return Err(ClientError::Status { status, body });
        }
        parse_body(&body)
    }

    /// Fetches and writes the quote. Nothing is written unless the fetch
    /// succeeded.
    pub async fn run(&self) -> Result<f64, ClientError> {
        let bid = self.fetch().await?;
        write_quote(&self.config.output_path, bid).await?;
        info!("quote written bid={bid} path={}", self.config.output_path);
        Ok(bid)
    }
}

pub fn parse_body(body: &str) -> Result<f64, ClientError> {
    let cleaned = body.replace('\n', "");

    match cleaned.parse::<f64>() {
        Ok(bid) if bid.is_finite() => Ok(bid),
        _ => Err(ClientError::Parse(body.to_string())),
    }
}

pub fn format_line(bid: f64) -> String {
    format!("Dólar: {{{}}}", format_bid(bid))
}

pub async fn write_quote(path: impl AsRef<Path>, bid: f64) -> Result<(), ClientError> {
    tokio::fs::write(path, format_line(bid)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, HttpServer, web};

    use super::*;

    fn serve(status: u16, body: &'static str, delay: Duration) -> String {
        let server = HttpServer::new(move || {
            App::new().route(
                "/cotacao",
                web::get().to(move || async move {
                    tokio::time::sleep(delay).await;
                    HttpResponse::build(actix_web::http::StatusCode::from_u16(status).unwrap())
                        .body(body)
                }),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        format!("http://{addr}/cotacao")
    }

    fn client(server_url: String, output_path: &Path) -> RateFetchClient {
        RateFetchClient::new(ClientConfig {
            server_url,
            deadline: Duration::from_millis(300),
            output_path: output_path.display().to_string(),
        })
    }

    #[test]
    fn response_body_round_trips() {
        let body = format_bid(5.1234);

        assert_eq!(body, "5.123400");
        assert_eq!(parse_body(&body).unwrap(), 5.1234);
        assert_eq!(parse_body("5.123400\n").unwrap(), 5.1234);
    }

    #[test]
    fn error_bodies_are_not_quotes() {
        for body in ["request timeout", "db timeout", "invalid value for bid", ""] {
            assert!(matches!(parse_body(body), Err(ClientError::Parse(_))));
        }
    }

    #[test]
    fn line_uses_fixed_format() {
        assert_eq!(format_line(5.25), "Dólar: {5.250000}");
    }

    #[actix_web::test]
    async fn writes_quote_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("cotacao.txt");
        let url = serve(200, "5.250000", Duration::ZERO);

        let bid = client(url, &output).run().await.unwrap();

        assert_eq!(bid, 5.25);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "Dólar: {5.250000}");
    }

    #[actix_web::test]
    async fn slow_server_hits_deadline_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("cotacao.txt");
        let url = serve(200, "5.250000", Duration::from_secs(2));

        let err = client(url, &output).run().await.unwrap_err();

        assert!(matches!(err, ClientError::Deadline(_)));
        assert!(!output.exists());
    }

    #[actix_web::test]
    async fn server_error_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("cotacao.txt");
        let url = serve(500, "", Duration::ZERO);

        let err = client(url, &output).run().await.unwrap_err();

        assert!(matches!(err, ClientError::Status { .. }));
        assert!(!output.exists());
    }

    #[actix_web::test]
    async fn timeout_message_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("cotacao.txt");
        let url = serve(200, "request timeout", Duration::ZERO);

        let err = client(url, &output).run().await.unwrap_err();

        assert!(matches!(err, ClientError::Parse(_)));
        assert!(!output.exists());
    }
}
