use std::{str::FromStr, time::Duration};

use anyhow::{Context, Result};

pub const QUOTE_PATH: &str = "/cotacao";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATABASE_URL: &str = "sqlite://cotacao.db";
const DEFAULT_QUOTE_URL: &str = "https://economia.awesomeapi.com.br/json/last/USD-BRL";
const DEFAULT_PAIR: &str = "USD-BRL";
const DEFAULT_SERVER_URL: &str = "http://localhost:8080/cotacao";
const DEFAULT_OUTPUT_PATH: &str = "cotacao.txt";

/// Deadline of a guard plus the reference duration it races against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardBudget {
    pub deadline: Duration,
    pub reference: Duration,
}

impl GuardBudget {
    pub const fn from_millis(deadline: u64, reference: u64) -> Self {
        Self {
            deadline: Duration::from_millis(deadline),
            reference: Duration::from_millis(reference),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub database_url: String,
    pub pair: String,
    /// Drop and recreate the table at startup instead of creating it if absent.
    pub reset_schema: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteConfig {
    pub url: String,
    pub pair: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listen_addr: String,
    pub quote: QuoteConfig,
    pub storage: StorageConfig,
    pub request_budget: GuardBudget,
    pub storage_budget: GuardBudget,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            quote: QuoteConfig {
                url: DEFAULT_QUOTE_URL.to_string(),
                pair: DEFAULT_PAIR.to_string(),
            },
            storage: StorageConfig {
                database_url: DEFAULT_DATABASE_URL.to_string(),
                pair: DEFAULT_PAIR.to_string(),
                reset_schema: true,
            },
            request_budget: GuardBudget::from_millis(200, 200),
            storage_budget: GuardBudget::from_millis(10, 10),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let pair = lookup("COTACAO_PAIR").unwrap_or(defaults.quote.pair);

        Ok(Self {
            listen_addr: lookup("COTACAO_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            quote: QuoteConfig {
                url: lookup("COTACAO_QUOTE_URL").unwrap_or(defaults.quote.url),
                pair: pair.clone(),
            },
            storage: StorageConfig {
                database_url: lookup("COTACAO_DATABASE_URL")
                    .unwrap_or(defaults.storage.database_url),
                pair,
                reset_schema: parse_or(&lookup, "COTACAO_RESET_SCHEMA", true)?,
            },
            request_budget: GuardBudget {
                deadline: millis_or(
                    &lookup,
                    "COTACAO_REQUEST_DEADLINE_MS",
                    defaults.request_budget.deadline,
                )?,
                reference: millis_or(
                    &lookup,
                    "COTACAO_REQUEST_REFERENCE_MS",
                    defaults.request_budget.reference,
                )?,
            },
            storage_budget: GuardBudget {
                deadline: millis_or(
                    &lookup,
                    "COTACAO_STORAGE_DEADLINE_MS",
                    defaults.storage_budget.deadline,
                )?,
                reference: millis_or(
                    &lookup,
                    "COTACAO_STORAGE_REFERENCE_MS",
                    defaults.storage_budget.reference,
                )?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_url: String,
    /// End-to-end bound on the whole call, body included.
    pub deadline: Duration,
    pub output_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            deadline: Duration::from_millis(300),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            server_url: lookup("COTACAO_SERVER_URL").unwrap_or(defaults.server_url),
            deadline: millis_or(&lookup, "COTACAO_CLIENT_DEADLINE_MS", defaults.deadline)?,
            output_path: lookup("COTACAO_OUTPUT_PATH").unwrap_or(defaults.output_path),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value {raw:?} for {key}")),
        None => Ok(default),
    }
}

fn millis_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Result<Duration> {
    match lookup(key) {
        Some(raw) => {
            let millis: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid value {raw:?} for {key}"))?;
            Ok(Duration::from_millis(millis))
        }
        None => Ok(default),
    }
}
