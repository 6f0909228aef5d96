mod config;
mod error;
mod types;


pub use config::{API_KEY_ENV, ChunkerConfig, ClientSettings, Language, resolve_api_key};
pub use error::{ChunkerError, Result};
pub use types::{ChunkInput, ChunkOutput, ChunkRequest, CodeChunk};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::{debug, info, warn};

/// API version segment of the chunking endpoint.
pub const API_VERSION: &str = "v1";

/// Blocking client for the remote code chunking endpoint.
///
/// A value of this type only exists once the configuration resolved and the
/// service answered the liveness probe. Each call to [`CodeChunker::chunk`]
/// is a single independent POST; a failed call leaves the client usable.
#[derive(Debug, Clone)]
pub struct CodeChunker {
    http: Client,
    auth: HeaderValue,
    settings: ClientSettings,
}

impl CodeChunker {
    /// Resolve `config` against the environment, probe the service and
    /// return a ready client.
    pub fn connect(config: ChunkerConfig) -> Result<Self> {
        Self::connect_with_settings(config.resolve()?)
    }

    pub fn connect_with_settings(settings: ClientSettings) -> Result<Self> {
        let http = build_http_client(&settings)?;
        let auth = bearer_header(&settings.api_key)?;
        let client = Self {
            http,
            auth,
            settings,
        };
        client.probe()?;
        Ok(client)
    }

    /// Chunk one text or a batch of texts.
    ///
    /// The output has the same shape as `input`: a flat list for a single
    /// text, one list per text (in input order) for a batch.
    pub fn chunk(&self, input: impl Into<ChunkInput>) -> Result<ChunkOutput> {
        let input = input.into();
        let body = self.send(&input)?;
        let output = ChunkOutput::parse(&input, &body).map_err(parse_error)?;

        debug!(chunks = output.chunk_count(), "chunk response parsed");
        Ok(output)
    }

    /// Chunk a single text.
    pub fn chunk_text(&self, text: &str) -> Result<Vec<CodeChunk>> {
        let body = self.send(&ChunkInput::from(text))?;
        types::parse_single(&body).map_err(parse_error)
    }

    /// Chunk several texts in one request.
    pub fn chunk_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<CodeChunk>>> {
        let input = ChunkInput::Batch(texts.iter().map(|t| t.as_ref().to_string()).collect());
        let body = self.send(&input)?;
        types::parse_batch(&body, texts.len()).map_err(parse_error)
    }

    /// The client as a plain function, equivalent to [`CodeChunker::chunk`].
    pub fn as_fn(&self) -> impl Fn(ChunkInput) -> Result<ChunkOutput> + '_ {
        move |input| self.chunk(input)
    }

    /// POST `input` and return the body of a 200 response.
    fn send(&self, input: &ChunkInput) -> Result<String> {
        let request = ChunkRequest::new(input, &self.settings);

        debug!(
            chunk_size = self.settings.chunk_size,
            language = %self.settings.language,
            batch_len = match input {
                ChunkInput::Single(_) => 1,
                ChunkInput::Batch(texts) => texts.len(),
            },
            "sending chunk request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header(AUTHORIZATION, self.auth.clone())
            .json(&request)
            .send()?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = status.as_u16(), "chunk request rejected");
            return Err(ChunkerError::RemoteRequest {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text()?)
    }

    fn endpoint(&self) -> String {
        format!("{}/{}/chunk/code", self.settings.base_url, API_VERSION)
    }

    /// Check that the service root answers 200.
    fn probe(&self) -> Result<()> {
        let url = format!("{}/", self.settings.base_url);
        debug!(%url, "probing chunking service");

        let response = self.http.get(&url).send().map_err(|e| {
            warn!(error = %e, "chunking service unreachable");
            ChunkerError::ServiceUnavailable {
                status: None,
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "chunking service is down");
            return Err(ChunkerError::ServiceUnavailable {
                status: Some(status.as_u16()),
                reason: "the service is down right now, try again in a short while".to_string(),
            });
        }

        info!(base_url = %self.settings.base_url, "connected to chunking service");
        Ok(())
    }
}

fn parse_error(e: serde_json::Error) -> ChunkerError {
    warn!(error = %e, "malformed chunk response");
    ChunkerError::ResponseParse(e)
}

fn bearer_header(api_key: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {api_key}"))
        .map_err(|_| ChunkerError::Configuration("API key is not a valid header value".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Idle connections are not pooled, so nothing outlives a call.
fn build_http_client(settings: &ClientSettings) -> Result<Client> {
    let mut builder = Client::builder().pool_max_idle_per_host(0);
    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| ChunkerError::Configuration(format!("Failed to build HTTP client: {e}")))
}
