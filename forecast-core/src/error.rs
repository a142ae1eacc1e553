use thiserror::Error;

/// Failure inside a provider adapter. The `Display` text is shown to users.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to reach {provider} ({endpoint}): {source}")]
    Transport {
        provider: &'static str,
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} {endpoint} request failed with status {status}: {body}")]
    Status {
        provider: &'static str,
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse {provider} {endpoint} response: {source}")]
    Decode {
        provider: &'static str,
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of one search, from query validation through fetching.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Please enter a city name.")]
    EmptyQuery,

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error(transparent)]
    Upstream(#[from] FetchError),
}
