use thiserror::Error;

/// Why a provider could not deliver a METAR line.
///
/// Callers that only care about availability go through
/// [`fetch_report`](crate::provider::fetch_report), which folds every variant into `None`.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Response contained no METAR line for station {station}")]
    Empty { station: String },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Request { source, .. } | FetchError::Body { source, .. } => {
                source.is_timeout()
            }
            _ => false,
        }
    }
}
