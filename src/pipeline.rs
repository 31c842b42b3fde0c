use futures::TryStreamExt;
use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    config::{Config, StorageConfig},
    error::PipelineError,
    exchange_rate::parse_bid,
    quote_client::RateSource,
    store::Store,
    timeout_guard::{GuardKind, TimeoutGuard},
};

/// One fetch, store and respond sequence per request.
///
/// Stages run strictly in order and every failure ends the request: the
/// request guard admits the fetch, the parsed bid must pass the storage guard
/// before it is appended, and a quote is only returned once its row exists.
pub struct RequestPipeline<S> {
    source: S,
    storage: StorageConfig,
    request_guard: TimeoutGuard,
    storage_guard: TimeoutGuard,
}

impl<S: RateSource> RequestPipeline<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            storage: config.storage.clone(),
            request_guard: TimeoutGuard::new(GuardKind::Request, config.request_budget),
            storage_guard: TimeoutGuard::new(GuardKind::Storage, config.storage_budget),
        }
    }

    pub async fn handle(&self) -> Result<f64, PipelineError> {
        let request_id = Uuid::new_v4();

        let result = self.run(request_id).await;
        match &result {
            Ok(bid) => info!("request_id={request_id} outcome=responded bid={bid}"),
            Err(
                e @ (PipelineError::Network(_)
                | PipelineError::Decode(_)
                | PipelineError::Storage(_)),
            ) => error!("request_id={request_id} outcome=failed stage={} error={e}", e.stage()),
            Err(e) => warn!(
                "request_id={request_id} outcome=rejected stage={} error={e}",
                e.stage()
            ),
        }
        result
    }

    async fn run(&self, request_id: Uuid) -> Result<f64, PipelineError> {
        self.request_guard.run_bounded().await?;

        let quote = self.source.fetch_rate().await?;
        debug!("request_id={request_id} stage=fetched {}", quote.summary());

        let bid = parse_bid(&quote.bid)?;

        self.storage_guard.run_bounded().await?;

        let id = self.persist(request_id, bid, &quote.create_date).await?;
        debug!("request_id={request_id} stage=persisted id={id}");

        Ok(bid)
    }

    async fn persist(
        &self,
        request_id: Uuid,
        bid: f64,
        observed_at: &str,
    ) -> Result<i64, PipelineError> {
        let mut store = Store::open(&self.storage).await?;
        let id = store.append(bid, observed_at).await?;

        // The row is already written; a failed listing only loses the log lines.
        let mut rows = store.list_all();
        loop {
            match rows.try_next().await {
                Ok(Some(row)) => info!(
                    "request_id={request_id} row {} {} {:.4} {}",
                    row.id, row.name, row.bid, row.created_at
                ),
                Ok(None) => break,
                Err(e) => {
                    warn!("request_id={request_id} stage=list_rows error={e}");
                    break;
                }
            }
        }
        drop(rows);

        store.close().await;
        Ok(id)
    }
}
