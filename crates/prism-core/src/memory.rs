//! Append-only hypergraph memory.
//!
//! Each projection call is ingested as one hyper-edge grouping the call's
//! latent points, plus per-concept accumulator nodes and an ever-growing
//! trace log. Committed entries are never mutated in place except for
//! concept-node upserts; a single writer must serialize `ingest`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::latent::{LatentPoint, PlanarCoordinate, ProjectionOutcome, ValueProjection};
use crate::time::now_unix_millis;

/// Node classification in the memory graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Concept,
}

/// Groups all latent points produced by one projection call.
/// Immutable once recorded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HyperEdge {
    pub id: String,
    /// Point ids of the call's samples, in sample order.
    pub member_point_ids: Vec<String>,
    pub description: String,
    /// Sum of the call's projected values.
    pub weight: f64,
}

/// Per-concept accumulator. Upserted on every ingestion that touches the
/// concept; never deleted. The anchor set only grows.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConceptNode {
    pub id: String,
    pub node_type: NodeType,
    pub label: String,
    pub description: String,
    /// Most recent embedding vector.
    pub vector: Vec<f64>,
    /// Order-preserving union of every tag ever seen.
    pub anchors: Vec<String>,
    pub last_projection: Option<PlanarCoordinate>,
}

/// Append-only record of one ingested latent point.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemoryTrace {
    pub id: String,
    pub concept_id: String,
    pub prompt: String,
    pub response_summary: String,
    pub projection: ValueProjection,
    /// Unix milliseconds at ingestion time.
    pub created_at: u64,
}

/// The cumulative memory state for one session.
#[derive(Debug)]
pub struct MemoryHypergraph {
    pub session: Uuid,
    latent_points: HashMap<String, LatentPoint>,
    hyper_edges: HashMap<String, HyperEdge>,
    edge_order: Vec<String>,
    concept_index: HashMap<String, Vec<String>>,
    concept_nodes: HashMap<String, ConceptNode>,
    traces: Vec<MemoryTrace>,
}

impl Default for MemoryHypergraph {
    fn default() -> Self {
        Self::new()
    }
}

fn concept_id_from_point(point_id: &str) -> String {
    format!("concept-{point_id}")
}

fn unique_merge(existing: &mut Vec<String>, incoming: &[String]) {
    for item in incoming {
        if !existing.iter().any(|e| e == item) {
            existing.push(item.clone());
        }
    }
}

/// Default response summary: the call's distinct tags, leading four.
fn summarize_outcome(outcome: &ProjectionOutcome) -> String {
    let mut tags: Vec<String> = Vec::new();
    for sample in &outcome.samples {
        unique_merge(&mut tags, &sample.point.tags);
    }
    tags.truncate(4);
    let excerpt = if tags.is_empty() {
        "latent concepts".to_string()
    } else {
        tags.join(", ")
    };
    format!(
        "Projected {} concepts around {excerpt}",
        outcome.samples.len()
    )
}

impl MemoryHypergraph {
    pub fn new() -> Self {
        Self {
            session: Uuid::new_v4(),
            latent_points: HashMap::new(),
            hyper_edges: HashMap::new(),
            edge_order: Vec::new(),
            concept_index: HashMap::new(),
            concept_nodes: HashMap::new(),
            traces: Vec::new(),
        }
    }

    /// Rebuild a hypergraph from previously exported state. Edge order
    /// follows the given edge sequence; the concept index is derived from
    /// node ids.
    pub fn restore(
        session: Uuid,
        points: Vec<LatentPoint>,
        edges: Vec<HyperEdge>,
        nodes: Vec<ConceptNode>,
        traces: Vec<MemoryTrace>,
    ) -> Self {
        let latent_points: HashMap<String, LatentPoint> =
            points.into_iter().map(|p| (p.id.clone(), p)).collect();

        let mut concept_index: HashMap<String, Vec<String>> = HashMap::new();
        for node in &nodes {
            let point_id = node.id.strip_prefix("concept-").unwrap_or(&node.id);
            if latent_points.contains_key(point_id) {
                concept_index.insert(node.id.clone(), vec![point_id.to_string()]);
            }
        }

        let edge_order: Vec<String> = edges.iter().map(|e| e.id.clone()).collect();

        Self {
            session,
            latent_points,
            hyper_edges: edges.into_iter().map(|e| (e.id.clone(), e)).collect(),
            edge_order,
            concept_index,
            concept_nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
            traces,
        }
    }

    /// Fold one projection outcome into memory. Records a hyper-edge over
    /// the call's points, upserts concept nodes, and appends one trace per
    /// sample. Returns the traces created by this call, in sample order.
    pub fn ingest(
        &mut self,
        prompt: &str,
        outcome: &ProjectionOutcome,
        response_summary: Option<&str>,
    ) -> Vec<MemoryTrace> {
        let timestamp = now_unix_millis();
        let edge_id = format!("edge-{timestamp}-{}", self.hyper_edges.len());
        let member_point_ids: Vec<String> = outcome
            .samples
            .iter()
            .map(|sample| sample.point.id.clone())
            .collect();
        let weight: f64 = outcome.value_field.iter().map(|v| v.value).sum();

        self.hyper_edges.insert(
            edge_id.clone(),
            HyperEdge {
                id: edge_id.clone(),
                member_point_ids,
                description: format!("prompt:{prompt}"),
                weight,
            },
        );
        self.edge_order.push(edge_id);

        let summary = response_summary
            .map(str::to_string)
            .unwrap_or_else(|| summarize_outcome(outcome));

        let mut created = Vec::new();
        for sample in &outcome.samples {
            self.latent_points
                .insert(sample.point.id.clone(), sample.point.clone());

            // Contract: every sample has a value projection. Tolerate a
            // missing one by skipping the sample rather than crashing.
            let Some(value) = outcome
                .value_field
                .iter()
                .find(|v| v.point_id == sample.point.id)
            else {
                continue;
            };

            let node = self.upsert_concept(&sample.point, value);
            let trace = MemoryTrace {
                id: format!("trace-{timestamp}-{}", node.id),
                concept_id: node.id,
                prompt: prompt.to_string(),
                response_summary: summary.clone(),
                projection: value.clone(),
                created_at: timestamp,
            };
            self.traces.push(trace.clone());
            created.push(trace);
        }

        created
    }

    fn upsert_concept(&mut self, point: &LatentPoint, value: &ValueProjection) -> ConceptNode {
        let concept_id = concept_id_from_point(&point.id);
        let node = self
            .concept_nodes
            .entry(concept_id.clone())
            .or_insert_with(|| ConceptNode {
                id: concept_id.clone(),
                node_type: NodeType::Concept,
                label: point
                    .tags
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "concept".to_string()),
                description: format!("Concept synthesized from {}", point.id),
                vector: point.vector.clone(),
                anchors: Vec::new(),
                last_projection: None,
            });

        node.vector = point.vector.clone();
        unique_merge(&mut node.anchors, &point.tags);
        node.last_projection = Some(value.coordinate);
        let snapshot = node.clone();

        let index = self.concept_index.entry(concept_id).or_default();
        if !index.iter().any(|id| id == &point.id) {
            index.push(point.id.clone());
        }

        snapshot
    }

    // --- Read-only snapshots ---

    pub fn latent_point(&self, id: &str) -> Option<LatentPoint> {
        self.latent_points.get(id).cloned()
    }

    /// All latent points, sorted by id for deterministic output.
    pub fn latent_points(&self) -> Vec<LatentPoint> {
        let mut points: Vec<LatentPoint> = self.latent_points.values().cloned().collect();
        points.sort_by(|a, b| a.id.cmp(&b.id));
        points
    }

    pub fn hyper_edge(&self, id: &str) -> Option<HyperEdge> {
        self.hyper_edges.get(id).cloned()
    }

    /// Hyper-edges in creation order.
    pub fn hyper_edges(&self) -> Vec<HyperEdge> {
        self.edge_order
            .iter()
            .filter_map(|id| self.hyper_edges.get(id).cloned())
            .collect()
    }

    pub fn concept_node(&self, id: &str) -> Option<ConceptNode> {
        self.concept_nodes.get(id).cloned()
    }

    /// Concept nodes sorted by id for deterministic output.
    pub fn concept_nodes(&self) -> Vec<ConceptNode> {
        let mut nodes: Vec<ConceptNode> = self.concept_nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    /// Point ids recorded under a concept node.
    pub fn points_for_concept(&self, concept_id: &str) -> Vec<String> {
        self.concept_index
            .get(concept_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Full trace history, in ingestion order.
    pub fn traces(&self) -> &[MemoryTrace] {
        &self.traces
    }

    pub fn point_count(&self) -> usize {
        self.latent_points.len()
    }

    pub fn edge_count(&self) -> usize {
        self.hyper_edges.len()
    }

    pub fn trace_count(&self) -> usize {
        self.traces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latent::{LatentPoint, PixelCoord, ProjectionSample};
    use crate::concept::{AffinityRegion, Concept};

    fn concept() -> Concept {
        Concept {
            id: "math".to_string(),
            label: "Mathematics".to_string(),
            description: String::new(),
            keywords: vec!["math".to_string(), "add".to_string()],
            color: [0, 0, 0],
            region: AffinityRegion::full(),
            loop_phase: 0.0,
            weight: 1.0,
        }
    }

    fn sample(point_id: &str, tags: &[&str], value: f64) -> (ProjectionSample, ValueProjection) {
        let coordinate = PlanarCoordinate {
            x: 0.1,
            y: -0.2,
            confidence: 0.8,
        };
        let sample = ProjectionSample {
            point: LatentPoint {
                id: point_id.to_string(),
                vector: vec![0.5, 1.0],
                pixel: Some(PixelCoord { x: 1, y: 2 }),
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
            projection: coordinate,
            concept: concept(),
            layer_id: None,
        };
        let projection = ValueProjection {
            point_id: point_id.to_string(),
            coordinate,
            value,
        };
        (sample, projection)
    }

    fn outcome(specs: &[(&str, &[&str], f64)]) -> ProjectionOutcome {
        let mut samples = Vec::new();
        let mut value_field = Vec::new();
        for (id, tags, value) in specs {
            let (s, v) = sample(id, tags, *value);
            samples.push(s);
            value_field.push(v);
        }
        ProjectionOutcome {
            samples,
            value_field,
        }
    }

    #[test]
    fn test_hyper_edge_membership_order() {
        let mut graph = MemoryHypergraph::new();
        let outcome = outcome(&[
            ("math-0-1", &["Mathematics", "math"], 0.5),
            ("math-1-2", &["Mathematics", "add"], 0.25),
        ]);
        graph.ingest("add numbers", &outcome, None);

        let edges = graph.hyper_edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].member_point_ids, vec!["math-0-1", "math-1-2"]);
        assert!((edges[0].weight - 0.75).abs() < 1e-10);
        assert!(edges[0].description.contains("add numbers"));
    }

    #[test]
    fn test_traces_in_sample_order() {
        let mut graph = MemoryHypergraph::new();
        let outcome = outcome(&[
            ("math-0-1", &["Mathematics"], 0.5),
            ("math-1-2", &["Mathematics"], 0.2),
            ("math-2-3", &["Mathematics"], 0.1),
        ]);
        let traces = graph.ingest("prompt", &outcome, None);
        assert_eq!(traces.len(), 3);
        assert_eq!(traces[0].concept_id, "concept-math-0-1");
        assert_eq!(traces[2].concept_id, "concept-math-2-3");
        assert_eq!(graph.traces().len(), 3);
        assert_eq!(graph.traces()[1].concept_id, traces[1].concept_id);
    }

    #[test]
    fn test_anchor_union_monotonic() {
        let mut graph = MemoryHypergraph::new();
        graph.ingest(
            "first",
            &outcome(&[("math-0-1", &["Mathematics", "math", "add"], 0.5)]),
            None,
        );
        let before = graph.concept_node("concept-math-0-1").unwrap().anchors;

        // re-ingest the same point with fewer tags: the union must not shrink
        graph.ingest("second", &outcome(&[("math-0-1", &["Mathematics"], 0.4)]), None);
        let after = graph.concept_node("concept-math-0-1").unwrap().anchors;
        assert!(after.len() >= before.len());
        for anchor in &before {
            assert!(after.contains(anchor), "anchor lost: {anchor}");
        }

        // and new tags extend it
        graph.ingest(
            "third",
            &outcome(&[("math-0-1", &["Mathematics", "proof"], 0.4)]),
            None,
        );
        let merged = graph.concept_node("concept-math-0-1").unwrap().anchors;
        assert!(merged.contains(&"proof".to_string()));
        assert!(merged.len() > before.len() - 1);
    }

    #[test]
    fn test_point_reingest_idempotent() {
        let mut graph = MemoryHypergraph::new();
        graph.ingest("a", &outcome(&[("math-0-1", &["x"], 0.5)]), None);
        graph.ingest("b", &outcome(&[("math-0-1", &["y"], 0.5)]), None);
        assert_eq!(graph.point_count(), 1);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.points_for_concept("concept-math-0-1"), vec!["math-0-1"]);
    }

    #[test]
    fn test_missing_value_projection_skipped() {
        let mut graph = MemoryHypergraph::new();
        let mut out = outcome(&[
            ("math-0-1", &["Mathematics"], 0.5),
            ("math-1-2", &["Mathematics"], 0.2),
        ]);
        out.value_field.remove(1);

        let traces = graph.ingest("prompt", &out, None);
        assert_eq!(traces.len(), 1, "sample without value is skipped");
        // the point itself is still stored
        assert_eq!(graph.point_count(), 2);
        // the edge still lists both members
        assert_eq!(graph.hyper_edges()[0].member_point_ids.len(), 2);
    }

    #[test]
    fn test_default_summary() {
        let out = outcome(&[
            ("p1", &["Alpha", "one", "two"], 0.1),
            ("p2", &["Beta", "three"], 0.1),
        ]);
        let summary = summarize_outcome(&out);
        assert_eq!(summary, "Projected 2 concepts around Alpha, one, two, Beta");

        let empty = summarize_outcome(&ProjectionOutcome::default());
        assert_eq!(empty, "Projected 0 concepts around latent concepts");
    }

    #[test]
    fn test_explicit_summary_used() {
        let mut graph = MemoryHypergraph::new();
        let traces = graph.ingest(
            "prompt",
            &outcome(&[("p1", &["Alpha"], 0.1)]),
            Some("custom summary"),
        );
        assert_eq!(traces[0].response_summary, "custom summary");
    }

    #[test]
    fn test_node_vector_and_projection_follow_latest() {
        let mut graph = MemoryHypergraph::new();
        graph.ingest("a", &outcome(&[("p1", &["Alpha"], 0.5)]), None);

        let mut second = outcome(&[("p1", &["Alpha"], 0.9)]);
        second.samples[0].point.vector = vec![9.0, 9.0];
        second.value_field[0].coordinate.x = 0.7;
        graph.ingest("b", &second, None);

        let node = graph.concept_node("concept-p1").unwrap();
        assert_eq!(node.vector, vec![9.0, 9.0]);
        assert!((node.last_projection.unwrap().x - 0.7).abs() < 1e-10);
    }

    #[test]
    fn test_restore_roundtrip() {
        let mut graph = MemoryHypergraph::new();
        graph.ingest("a", &outcome(&[("p1", &["Alpha"], 0.5)]), None);
        graph.ingest("b", &outcome(&[("p2", &["Beta"], 0.2)]), None);

        let restored = MemoryHypergraph::restore(
            graph.session,
            graph.latent_points(),
            graph.hyper_edges(),
            graph.concept_nodes(),
            graph.traces().to_vec(),
        );
        assert_eq!(restored.session, graph.session);
        assert_eq!(restored.point_count(), 2);
        assert_eq!(restored.edge_count(), 2);
        assert_eq!(restored.trace_count(), 2);
        assert_eq!(restored.points_for_concept("concept-p1"), vec!["p1"]);
        // creation order preserved
        let ids: Vec<String> = restored.hyper_edges().iter().map(|e| e.id.clone()).collect();
        let original: Vec<String> = graph.hyper_edges().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, original);
    }
}
