pub mod client;
pub mod config;
pub mod error;
pub mod exchange_rate;
pub mod http;
pub mod pipeline;
pub mod quote;
pub mod quote_client;
pub mod store;
pub mod timeout_guard;
