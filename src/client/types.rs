// the service contract
use std::ops::Range;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use super::config::{ClientSettings, Language};

/// Text submitted for chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChunkInput {
    Single(String),
    Batch(Vec<String>),
}

impl From<&str> for ChunkInput {
    fn from(text: &str) -> Self {
        ChunkInput::Single(text.to_string())
    }
}

impl From<String> for ChunkInput {
    fn from(text: String) -> Self {
        ChunkInput::Single(text)
    }
}

impl From<Vec<String>> for ChunkInput {
    fn from(texts: Vec<String>) -> Self {
        ChunkInput::Batch(texts)
    }
}

impl From<Vec<&str>> for ChunkInput {
    fn from(texts: Vec<&str>) -> Self {
        ChunkInput::Batch(texts.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ChunkInput {
    fn from(texts: &[&str]) -> Self {
        ChunkInput::Batch(texts.iter().map(|t| t.to_string()).collect())
    }
}

/// Body of `POST /v1/chunk/code`.
#[derive(Debug, Serialize)]
pub struct ChunkRequest<'a> {
    pub text: &'a ChunkInput,
    pub tokenizer_or_token_counter: &'a str,
    pub chunk_size: usize,
    pub language: &'a Language,
    /// Older service versions read `lang` instead of `language`.
    pub lang: &'a Language,
    pub include_nodes: bool,
}

impl<'a> ChunkRequest<'a> {
    pub fn new(text: &'a ChunkInput, settings: &'a ClientSettings) -> Self {
        Self {
            text,
            tokenizer_or_token_counter: &settings.tokenizer_or_token_counter,
            chunk_size: settings.chunk_size,
            language: &settings.language,
            lang: &settings.language,
            // The wire contract carries no tree-sitter nodes.
            include_nodes: false,
        }
    }
}

/// A chunk of source code produced by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeChunk {
    /// The chunk text
    pub text: String,
    /// Offset of the first character in the submitted text
    pub start_index: usize,
    /// Offset one past the last character
    pub end_index: usize,
    /// Tokens in `text` as counted by the service's tokenizer
    pub token_count: usize,
    /// Language the service parsed the chunk as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Syntax nodes, when the service includes them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<serde_json::Value>>,
}

impl CodeChunk {
    pub fn span(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Chunks returned for a [`ChunkInput`], in the same shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChunkOutput {
    Single(Vec<CodeChunk>),
    Batch(Vec<Vec<CodeChunk>>),
}

impl ChunkOutput {
    pub fn into_single(self) -> Option<Vec<CodeChunk>> {
        match self {
            ChunkOutput::Single(chunks) => Some(chunks),
            ChunkOutput::Batch(_) => None,
        }
    }

    pub fn into_batch(self) -> Option<Vec<Vec<CodeChunk>>> {
        match self {
            ChunkOutput::Batch(batches) => Some(batches),
            ChunkOutput::Single(_) => None,
        }
    }

    /// Total number of chunks across every input text.
    pub fn chunk_count(&self) -> usize {
        match self {
            ChunkOutput::Single(chunks) => chunks.len(),
            ChunkOutput::Batch(batches) => batches.iter().map(Vec::len).sum(),
        }
    }

    /// Decode a response body according to the shape of `input`.
    pub fn parse(input: &ChunkInput, body: &str) -> serde_json::Result<Self> {
        match input {
            ChunkInput::Single(_) => parse_single(body).map(ChunkOutput::Single),
            ChunkInput::Batch(texts) => parse_batch(body, texts.len()).map(ChunkOutput::Batch),
        }
    }
}

/// Decode the flat chunk list answered for a single text.
pub(crate) fn parse_single(body: &str) -> serde_json::Result<Vec<CodeChunk>> {
    serde_json::from_str(body)
}

/// Decode a batch answer, which must hold one list per submitted text.
pub(crate) fn parse_batch(body: &str, expected: usize) -> serde_json::Result<Vec<Vec<CodeChunk>>> {
    let batches: Vec<Vec<CodeChunk>> = serde_json::from_str(body)?;
    if batches.len() != expected {
        let what = format!("{expected} chunk lists, one per input text");
        return Err(serde_json::Error::invalid_length(batches.len(), &what.as_str()));
    }
    Ok(batches)
}
