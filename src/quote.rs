use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::error::PipelineError;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProviderQuote {
    #[serde(rename = "code", default)]
    pub code: Option<String>,
    #[serde(rename = "codein", default)]
    pub code_in: Option<String>,
    #[serde(rename = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "high", default)]
    pub high: Option<String>,
    #[serde(rename = "low", default)]
    pub low: Option<String>,
    #[serde(rename = "varBid", default)]
    pub var_bid: Option<String>,
    #[serde(rename = "pctChange", default)]
    pub pct_change: Option<String>,
    #[serde(rename = "bid")]
    pub bid: String,
    #[serde(rename = "ask", default)]
    pub ask: Option<String>,
    #[serde(rename = "timestamp", default)]
    pub timestamp: Option<String>,
    #[serde(rename = "create_date")]
    pub create_date: String,
}

impl ProviderQuote {
    /// Quote carrying only the two fields the pipeline consumes.
    pub fn new(bid: impl Into<String>, create_date: impl Into<String>) -> Self {
        Self {
            code: None,
            code_in: None,
            name: None,
            high: None,
            low: None,
            var_bid: None,
            pct_change: None,
            bid: bid.into(),
            ask: None,
            timestamp: None,
            create_date: create_date.into(),
        }
    }

    /// Every field of the payload as `key=value` pairs for the fetch log line.
    pub fn summary(&self) -> String {
        let optional = |value: &Option<String>| value.as_deref().unwrap_or("-").to_string();

        format!(
            "pair={}{} name={:?} bid={} ask={} high={} low={} var_bid={} pct_change={} \
             timestamp={} create_date={:?}",
            optional(&self.code),
            optional(&self.code_in),
            optional(&self.name),
            self.bid,
            optional(&self.ask),
            optional(&self.high),
            optional(&self.low),
            optional(&self.var_bid),
            optional(&self.pct_change),
            optional(&self.timestamp),
            self.create_date,
        )
    }
}

/// The provider keys its envelope by the pair without the separator:
/// `USD-BRL` is served under `USDBRL`.
pub fn envelope_key(pair: &str) -> String {
    pair.replace('-', "")
}

pub fn decode_quote(body: &[u8], pair: &str) -> Result<ProviderQuote, PipelineError> {
    let mut envelope: HashMap<String, ProviderQuote> =
        serde_json::from_slice(body).map_err(|e| PipelineError::Decode(e.to_string()))?;
    let key = envelope_key(pair);

    envelope
        .remove(&key)
        .ok_or_else(|| PipelineError::Decode(format!("missing {key} in provider payload")))
}
