/// Pixels drawn per projection call.
pub const DEFAULT_SAMPLE_COUNT: usize = 16;

/// Embedding vector length: padded base elements plus the concept weight.
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 8;

/// Smallest embedding dimension that still carries one base element.
pub const MIN_EMBEDDING_DIMENSION: usize = 2;

/// Concepts retained after ranking.
pub const DEFAULT_CONCEPT_SAMPLE_SIZE: usize = 4;

/// Keywords kept from a prompt after filtering.
pub const KEYWORD_LIMIT: usize = 6;

/// Tokens shorter than this are dropped during keyword extraction.
pub const MIN_KEYWORD_LEN: usize = 3;
