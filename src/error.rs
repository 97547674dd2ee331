use chrono::NaiveDate;
use thiserror::Error;

/// Failure to turn the configured private key into a signing key.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("private key has no PEM BEGIN/END markers")]
    MissingPemMarkers,
    #[error("failed to parse RSA private key: {0}")]
    MalformedKey(String),
}

/// Failures talking to the exchange. Never fatal to a preview request.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("HTTP {status}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode exchange response: {0}")]
    Decode(String),
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
}

impl ExchangeError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ExchangeError::Status { status: 429, .. })
    }
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("No picks found for {date}. Run predictions first.")]
    NoPicks { date: NaiveDate },
    #[error("failed to load picks: {0}")]
    PickStore(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("invalid date: {0}")]
    BadDate(String),
    #[error(transparent)]
    Preview(#[from] PreviewError),
    #[error("tier verification failed: {0}")]
    TierVerifier(#[source] anyhow::Error),
}
