//! Splitting long content into model-sized chunks

pub mod chunker;
pub mod models;

pub use chunker::{Chunker, DEFAULT_CHUNK_SIZE, LINE_SAFETY_MARGIN};
pub use models::{Chunk, ChunkPlan, LineRecord, PLACEHOLDER_CONTENT, PLACEHOLDER_TOKENS};
