use serde::{Deserialize, Serialize};

/// Rectangular affinity region in normalized [0,1]² image space.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AffinityRegion {
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
}

impl AffinityRegion {
    pub fn new(x_range: [f64; 2], y_range: [f64; 2]) -> Self {
        Self { x_range, y_range }
    }

    /// The whole image plane.
    pub fn full() -> Self {
        Self::new([0.0, 1.0], [0.0, 1.0])
    }

    /// Inclusive containment on both axes.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_range[0] && x <= self.x_range[1] && y >= self.y_range[0] && y <= self.y_range[1]
    }
}

fn default_weight() -> f64 {
    1.0
}

/// A symbolic knowledge domain tagged onto dataset pixels.
///
/// Concepts are immutable, defined once at dataset-build time; identity is
/// the `id` field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Concept {
    pub id: String,
    pub label: String,
    pub description: String,
    /// Lowercase keywords, in ranking priority order.
    pub keywords: Vec<String>,
    pub color: [u8; 3],
    pub region: AffinityRegion,
    /// Phase angle in radians for periodic modulation of scores and shifts.
    #[serde(default)]
    pub loop_phase: f64,
    /// Scalar influence on ranking and vector magnitude.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Concept {
    /// Euclidean distance from this concept's color to an RGB sample.
    pub fn color_distance(&self, rgb: [u8; 3]) -> f64 {
        let dr = self.color[0] as f64 - rgb[0] as f64;
        let dg = self.color[1] as f64 - rgb[1] as f64;
        let db = self.color[2] as f64 - rgb[2] as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

/// A concept paired with its pixel coverage in [0, 1].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConceptSummary {
    pub concept: Concept,
    pub coverage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concept(color: [u8; 3]) -> Concept {
        Concept {
            id: "test".to_string(),
            label: "Test".to_string(),
            description: String::new(),
            keywords: vec!["test".to_string()],
            color,
            region: AffinityRegion::new([0.0, 0.5], [0.5, 1.0]),
            loop_phase: 0.0,
            weight: 1.0,
        }
    }

    #[test]
    fn test_region_contains_inclusive() {
        let r = AffinityRegion::new([0.0, 0.5], [0.5, 1.0]);
        assert!(r.contains(0.0, 0.5));
        assert!(r.contains(0.5, 1.0));
        assert!(r.contains(0.25, 0.75));
        assert!(!r.contains(0.6, 0.75));
        assert!(!r.contains(0.25, 0.4));
    }

    #[test]
    fn test_full_region() {
        let r = AffinityRegion::full();
        assert!(r.contains(0.0, 0.0));
        assert!(r.contains(1.0, 1.0));
    }

    #[test]
    fn test_color_distance() {
        let c = concept([0, 0, 0]);
        assert_eq!(c.color_distance([0, 0, 0]), 0.0);
        assert!((c.color_distance([3, 4, 0]) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_weight_default_on_deserialize() {
        let json = r#"{
            "id": "x", "label": "X", "description": "",
            "keywords": [], "color": [1, 2, 3],
            "region": { "x_range": [0.0, 1.0], "y_range": [0.0, 1.0] }
        }"#;
        let c: Concept = serde_json::from_str(json).unwrap();
        assert_eq!(c.weight, 1.0);
        assert_eq!(c.loop_phase, 0.0);
    }
}
