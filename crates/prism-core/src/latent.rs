use serde::{Deserialize, Serialize};

use crate::concept::Concept;

/// Source-raster coordinate of a sampled pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}

/// One sampled, vectorized unit of projection output. Created once per
/// sampled pixel per call and never mutated afterwards; ownership passes to
/// the memory hypergraph on ingestion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LatentPoint {
    /// Unique within a process lifetime: concept id + ordinal + stream suffix.
    pub id: String,
    pub vector: Vec<f64>,
    /// Originating pixel, rounded to the source raster grid.
    pub pixel: Option<PixelCoord>,
    /// Concept label followed by its keywords.
    pub tags: Vec<String>,
}

/// A 2D point in projection space with a confidence scalar in [0, 1].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PlanarCoordinate {
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
}

/// Scalar value derived for one latent point, paired with its coordinate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValueProjection {
    pub point_id: String,
    pub coordinate: PlanarCoordinate,
    /// Rounded to 3 decimal places.
    pub value: f64,
}

/// One sample: the latent point, its planar projection, and the owning
/// concept.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectionSample {
    pub point: LatentPoint,
    pub projection: PlanarCoordinate,
    pub concept: Concept,
    pub layer_id: Option<String>,
}

/// Ordered samples and their index-aligned value field for one call.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProjectionOutcome {
    pub samples: Vec<ProjectionSample>,
    pub value_field: Vec<ValueProjection>,
}

/// Round half away from zero to 3 decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
