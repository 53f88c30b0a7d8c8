use std::path::Path;

use rusqlite::{Connection, params};
use uuid::Uuid;

use prism_core::{
    ConceptNode, HyperEdge, LatentPoint, MemoryHypergraph, MemoryTrace, NodeType, PixelCoord,
    PlanarCoordinate, ValueProjection,
};

use crate::error::{Result, StoreError};
use crate::schema;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM metadata WHERE key = ?1")?;
        let result = stmt.query_row([key], |row| row.get(0)).ok();
        Ok(result)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // --- Save ---

    /// Replace the stored snapshot with the given graph's full state.
    pub fn save_graph(&self, graph: &MemoryHypergraph) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute_batch(
            "DELETE FROM traces; DELETE FROM concept_nodes;
             DELETE FROM edge_members; DELETE FROM hyper_edges;
             DELETE FROM latent_points;",
        )?;

        tx.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('session', ?1)",
            [graph.session.to_string()],
        )?;

        for point in graph.latent_points() {
            tx.execute(
                "INSERT INTO latent_points (id, vector, pixel_x, pixel_y, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    point.id,
                    serde_json::to_string(&point.vector)?,
                    point.pixel.map(|p| p.x),
                    point.pixel.map(|p| p.y),
                    serde_json::to_string(&point.tags)?,
                ],
            )?;
        }

        for edge in graph.hyper_edges() {
            tx.execute(
                "INSERT INTO hyper_edges (id, description, weight) VALUES (?1, ?2, ?3)",
                params![edge.id, edge.description, edge.weight],
            )?;
            for (position, point_id) in edge.member_point_ids.iter().enumerate() {
                tx.execute(
                    "INSERT INTO edge_members (edge_id, point_id, position) VALUES (?1, ?2, ?3)",
                    params![edge.id, point_id, position as i64],
                )?;
            }
        }

        for node in graph.concept_nodes() {
            tx.execute(
                "INSERT INTO concept_nodes
                 (id, node_type, label, description, vector, anchors, proj_x, proj_y, proj_confidence)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    node.id,
                    "concept",
                    node.label,
                    node.description,
                    serde_json::to_string(&node.vector)?,
                    serde_json::to_string(&node.anchors)?,
                    node.last_projection.map(|p| p.x),
                    node.last_projection.map(|p| p.y),
                    node.last_projection.map(|p| p.confidence),
                ],
            )?;
        }

        for trace in graph.traces() {
            tx.execute(
                "INSERT INTO traces
                 (id, concept_id, prompt, response_summary, point_id,
                  coord_x, coord_y, coord_confidence, value, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    trace.id,
                    trace.concept_id,
                    trace.prompt,
                    trace.response_summary,
                    trace.projection.point_id,
                    trace.projection.coordinate.x,
                    trace.projection.coordinate.y,
                    trace.projection.coordinate.confidence,
                    trace.projection.value,
                    trace.created_at as i64,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    // --- Load ---

    /// Rebuild the stored graph. An empty database yields a fresh session.
    pub fn load_graph(&self) -> Result<MemoryHypergraph> {
        let session = match self.get_metadata("session")? {
            Some(raw) => parse_uuid(&raw)?,
            None => return Ok(MemoryHypergraph::new()),
        };

        let points = self.load_points()?;
        let edges = self.load_edges()?;
        let nodes = self.load_nodes()?;
        let traces = self.load_traces()?;

        Ok(MemoryHypergraph::restore(
            session, points, edges, nodes, traces,
        ))
    }

    fn load_points(&self) -> Result<Vec<LatentPoint>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, vector, pixel_x, pixel_y, tags FROM latent_points ORDER BY id",
        )?;

        let rows: Vec<(String, String, Option<u32>, Option<u32>, String)> = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            })?
            .collect::<std::result::Result<_, _>>()?;

        rows.into_iter()
            .map(|(id, vector, pixel_x, pixel_y, tags)| {
                Ok(LatentPoint {
                    id,
                    vector: serde_json::from_str(&vector)?,
                    pixel: match (pixel_x, pixel_y) {
                        (Some(x), Some(y)) => Some(PixelCoord { x, y }),
                        _ => None,
                    },
                    tags: serde_json::from_str(&tags)?,
                })
            })
            .collect()
    }

    fn load_edges(&self) -> Result<Vec<HyperEdge>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, description, weight FROM hyper_edges ORDER BY rowid")?;
        let heads: Vec<(String, String, f64)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<std::result::Result<_, _>>()?;

        let mut member_stmt = self.conn.prepare(
            "SELECT point_id FROM edge_members WHERE edge_id = ?1 ORDER BY position",
        )?;

        let mut edges = Vec::with_capacity(heads.len());
        for (id, description, weight) in heads {
            let member_point_ids: Vec<String> = member_stmt
                .query_map([&id], |row| row.get(0))?
                .collect::<std::result::Result<_, _>>()?;
            edges.push(HyperEdge {
                id,
                member_point_ids,
                description,
                weight,
            });
        }

        Ok(edges)
    }

    fn load_nodes(&self) -> Result<Vec<ConceptNode>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, label, description, vector, anchors, proj_x, proj_y, proj_confidence
             FROM concept_nodes ORDER BY id",
        )?;

        type NodeRow = (
            String,
            String,
            String,
            String,
            String,
            Option<f64>,
            Option<f64>,
            Option<f64>,
        );
        let rows: Vec<NodeRow> = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ))
            })?
            .collect::<std::result::Result<_, _>>()?;

        rows.into_iter()
            .map(|(id, label, description, vector, anchors, x, y, confidence)| {
                let last_projection = match (x, y, confidence) {
                    (Some(x), Some(y), Some(confidence)) => {
                        Some(PlanarCoordinate { x, y, confidence })
                    }
                    _ => None,
                };
                Ok(ConceptNode {
                    id,
                    node_type: NodeType::Concept,
                    label,
                    description,
                    vector: serde_json::from_str(&vector)?,
                    anchors: serde_json::from_str(&anchors)?,
                    last_projection,
                })
            })
            .collect()
    }

    fn load_traces(&self) -> Result<Vec<MemoryTrace>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, concept_id, prompt, response_summary, point_id,
                    coord_x, coord_y, coord_confidence, value, created_at
             FROM traces ORDER BY rowid",
        )?;

        let traces = stmt
            .query_map([], |row| {
                Ok(MemoryTrace {
                    id: row.get(0)?,
                    concept_id: row.get(1)?,
                    prompt: row.get(2)?,
                    response_summary: row.get(3)?,
                    projection: ValueProjection {
                        point_id: row.get(4)?,
                        coordinate: PlanarCoordinate {
                            x: row.get(5)?,
                            y: row.get(6)?,
                            confidence: row.get(7)?,
                        },
                        value: row.get(8)?,
                    },
                    created_at: row.get::<_, i64>(9)? as u64,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;

        Ok(traces)
    }
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| StoreError::InvalidData(format!("invalid UUID '{s}': {e}")))
}
