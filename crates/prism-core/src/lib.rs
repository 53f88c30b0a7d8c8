//! Latent projection engine over a concept-tagged pixel atlas.
//!
//! A seeded deterministic sampler ranks symbolic concepts against a prompt,
//! draws a weighted-random subset of tagged pixels, and derives embedding
//! vectors and planar coordinates from each. Every projection call is folded
//! into an append-only hypergraph memory: points, hyper-edges, per-concept
//! accumulator nodes, and an ever-growing trace log.
//!
//! Zero I/O — pure math engine with no opinions about transport or
//! persistence.

pub mod atlas;
pub mod catalog;
pub mod concept;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod latent;
pub mod memory;
pub mod projection;
pub mod rng;
pub mod serde_compat;
pub mod time;
pub mod tokenizer;

pub use atlas::{latents_from_rgba, render_field, synthesize_latents};
pub use catalog::{assign_concept, knowledge_concepts};
pub use concept::{AffinityRegion, Concept, ConceptSummary};
pub use constants::{
    DEFAULT_CONCEPT_SAMPLE_SIZE, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_SAMPLE_COUNT, KEYWORD_LIMIT,
    MIN_KEYWORD_LEN,
};
pub use dataset::{SeedInterface, SeedLatents, SeedPixel, energy};
pub use error::{EngineError, Result};
pub use latent::{
    LatentPoint, PixelCoord, PlanarCoordinate, ProjectionOutcome, ProjectionSample,
    ValueProjection, round3,
};
pub use memory::{ConceptNode, HyperEdge, MemoryHypergraph, MemoryTrace, NodeType};
pub use projection::{ProjectionConfig, ProjectionEngine};
pub use rng::Mulberry32;
pub use serde_compat::{CURRENT_VERSION, export_json, import_json};
pub use time::{now_unix_millis, now_unix_secs};
pub use tokenizer::extract_keywords;
