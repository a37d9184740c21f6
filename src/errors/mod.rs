use thiserror::Error;

/// Failure to obtain a remote detail resource.
///
/// Transient variants are retried with backoff; every variant ends up
/// deferring the work item to the next run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned server error {status}")]
    Server { url: String, status: u16 },

    #[error("{url} returned client error {status}")]
    Client { url: String, status: u16 },

    #[error("{url} returned malformed JSON: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Timeout { url }
            | FetchError::Connection { url, .. }
            | FetchError::Server { url, .. }
            | FetchError::Client { url, .. }
            | FetchError::Malformed { url, .. } => url,
        }
    }

    /// Whether another attempt could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout { .. } | FetchError::Connection { .. } | FetchError::Server { .. }
        )
    }

    /// Classify a non-success HTTP status
    pub fn from_status(url: &str, status: u16) -> Self {
        if status >= 500 || status == 429 {
            FetchError::Server {
                url: url.to_string(),
                status,
            }
        } else {
            FetchError::Client {
                url: url.to_string(),
                status,
            }
        }
    }
}

/// Add context to file load errors
pub fn load_context(what: &str, path: &std::path::Path) -> String {
    format!("Failed to load {} from {}", what, path.display())
}

/// Add context to file save errors
pub fn save_context(what: &str, path: &std::path::Path) -> String {
    format!("Failed to save {} to {}", what, path.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(FetchError::from_status("u", 503).is_transient());
        assert!(FetchError::from_status("u", 429).is_transient());
        assert!(!FetchError::from_status("u", 404).is_transient());
        assert!(!FetchError::from_status("u", 410).is_transient());
    }

    #[test]
    fn test_malformed_is_permanent() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let error = FetchError::Malformed {
            url: "https://api.chess.com/pub/match/1".to_string(),
            source,
        };

        assert!(!error.is_transient());
        assert_eq!(error.url(), "https://api.chess.com/pub/match/1");
    }

    #[test]
    fn test_timeout_is_transient() {
        let error = FetchError::Timeout {
            url: "u".to_string(),
        };
        assert!(error.is_transient());
        assert_eq!(error.to_string(), "request to u timed out");
    }
}
