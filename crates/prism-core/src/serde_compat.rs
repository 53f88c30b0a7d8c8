//! Versioned JSON wire format for memory snapshots.
//!
//! Collections are emitted in deterministic order (points and nodes by id,
//! edges in creation order, traces in ingestion order) so exports of the
//! same state are byte-identical.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::latent::LatentPoint;
use crate::memory::{ConceptNode, HyperEdge, MemoryHypergraph, MemoryTrace};

/// Wire format version; bump on breaking shape changes.
pub const CURRENT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct WireMemory {
    version: u32,
    session: Uuid,
    latent_points: Vec<LatentPoint>,
    hyper_edges: Vec<HyperEdge>,
    concept_nodes: Vec<ConceptNode>,
    traces: Vec<MemoryTrace>,
}

/// Serialize a memory snapshot to pretty JSON.
pub fn export_json(graph: &MemoryHypergraph) -> Result<String> {
    let wire = WireMemory {
        version: CURRENT_VERSION,
        session: graph.session,
        latent_points: graph.latent_points(),
        hyper_edges: graph.hyper_edges(),
        concept_nodes: graph.concept_nodes(),
        traces: graph.traces().to_vec(),
    };
    serde_json::to_string_pretty(&wire)
        .map_err(|e| EngineError::DatasetUnavailable(format!("serialize memory: {e}")))
}

/// Rebuild a memory hypergraph from exported JSON. Rejects snapshots from a
/// newer wire version.
pub fn import_json(json: &str) -> Result<MemoryHypergraph> {
    let wire: WireMemory = serde_json::from_str(json)
        .map_err(|e| EngineError::DatasetUnavailable(format!("parse memory: {e}")))?;
    if wire.version > CURRENT_VERSION {
        return Err(EngineError::DatasetUnavailable(format!(
            "unsupported memory version {} (max {CURRENT_VERSION})",
            wire.version
        )));
    }
    Ok(MemoryHypergraph::restore(
        wire.session,
        wire.latent_points,
        wire.hyper_edges,
        wire.concept_nodes,
        wire.traces,
    ))
}
