use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChunkerError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Chunking service unavailable{}: {reason}", status_suffix(.status))]
    ServiceUnavailable { status: Option<u16>, reason: String },

    #[error("Error from the chunking service: {status} {body}")]
    RemoteRequest { status: u16, body: String },

    #[error("Error parsing the response: {0}")]
    ResponseParse(#[source] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ChunkerError>;

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}
