use thiserror::Error;

/// Every way a single `/cotacao` request can end early.
///
/// The display text of the timeout and parse variants is written verbatim as
/// the response body, so it must stay stable.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("route not found")]
    RouteNotFound,

    #[error("request timeout")]
    RequestTimeout,

    #[error("db timeout")]
    StorageTimeout,

    #[error("quote provider unreachable: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected quote payload: {0}")]
    Decode(String),

    #[error("invalid value for bid")]
    Parse { value: String },

    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

impl PipelineError {
    /// Short stage label used in log lines.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::RouteNotFound => "route",
            Self::RequestTimeout => "request_guard",
            Self::StorageTimeout => "storage_guard",
            Self::Network(_) | Self::Decode(_) => "fetch",
            Self::Parse { .. } => "parse",
            Self::Storage(_) => "persist",
        }
    }
}
