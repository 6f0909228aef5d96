// Public API exports
pub mod client;
pub mod source;

// Re-export main types for convenience
pub use client::{
    API_KEY_ENV, ChunkInput, ChunkOutput, ChunkRequest, ChunkerConfig, ChunkerError,
    ClientSettings, CodeChunk, CodeChunker, Language, Result, resolve_api_key,
};

pub use source::{SourceFile, collect_sources, detect_language, should_ignore};
