//! Error type for index fetches

/// Error from one fetch attempt against the index service.
///
/// Transport errors and bad statuses both trigger another attempt, so this
/// carries context for status messages rather than a retry discriminator.
#[derive(Debug)]
pub enum FetchError {
    /// HTTP-level failure with the status code when one was received
    Http {
        status: Option<u16>,
        message: String,
    },
    /// I/O failure outside the HTTP exchange
    Io(std::io::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Build from a reqwest error, keeping the status when present.
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
