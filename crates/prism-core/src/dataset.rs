use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::concept::{Concept, ConceptSummary};

/// Luminance-weighted energy of an RGB sample, in [0, 1] (Rec. 709 weights).
pub fn energy(r: u8, g: u8, b: u8) -> f64 {
    (0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64) / 255.0
}

/// One sample from the source raster. Immutable once the dataset is built.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedPixel {
    /// Normalized position in [0, 1].
    pub x: f64,
    pub y: f64,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    /// Luminance-weighted energy in [0, 1].
    pub energy: f64,
    pub concept_id: String,
    /// Source layer, when the dataset was built from a multi-image atlas.
    #[serde(default)]
    pub layer_id: Option<String>,
}

/// Raw dataset contract supplied by a dataset provider:
/// an ordered pixel sequence plus the concept catalog.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedLatents {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<SeedPixel>,
    pub concepts: Vec<Concept>,
}

/// Read-only view over a loaded dataset: coverage stats, concept lookup,
/// and pixel filters. All accessors return copies, never live references
/// into mutable state.
pub struct SeedInterface {
    data: SeedLatents,
}

impl SeedInterface {
    pub fn new(data: SeedLatents) -> Self {
        Self { data }
    }

    /// Coverage per concept: tagged pixel count over total count, in [0, 1].
    /// Pure function of the dataset, in catalog order.
    pub fn concept_summaries(&self) -> Vec<ConceptSummary> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for pixel in &self.data.pixels {
            *counts.entry(pixel.concept_id.as_str()).or_default() += 1;
        }
        let total = self.data.pixels.len().max(1) as f64;

        self.data
            .concepts
            .iter()
            .map(|concept| ConceptSummary {
                concept: concept.clone(),
                coverage: (counts.get(concept.id.as_str()).copied().unwrap_or(0) as f64 / total)
                    .clamp(0.0, 1.0),
            })
            .collect()
    }

    /// First `limit` pixels tagged with `concept_id`, in dataset order.
    pub fn pixels_for_concept(&self, concept_id: &str, limit: usize) -> Vec<SeedPixel> {
        self.data
            .pixels
            .iter()
            .filter(|p| p.concept_id == concept_id)
            .take(limit)
            .cloned()
            .collect()
    }

    /// The `limit` highest-energy pixels, descending. Stable: ties keep
    /// original dataset order.
    pub fn strongest_pixels(&self, limit: usize) -> Vec<SeedPixel> {
        let mut pixels = self.data.pixels.clone();
        pixels.sort_by(|a, b| b.energy.partial_cmp(&a.energy).unwrap_or(Ordering::Equal));
        pixels.truncate(limit);
        pixels
    }

    /// Exact lookup by concept identifier.
    pub fn concept_by_id(&self, id: &str) -> Option<&Concept> {
        self.data.concepts.iter().find(|c| c.id == id)
    }

    pub fn raw(&self) -> &SeedLatents {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::AffinityRegion;

    fn concept(id: &str) -> Concept {
        Concept {
            id: id.to_string(),
            label: id.to_uppercase(),
            description: String::new(),
            keywords: vec![id.to_string()],
            color: [100, 100, 100],
            region: AffinityRegion::full(),
            loop_phase: 0.0,
            weight: 1.0,
        }
    }

    fn pixel(concept_id: &str, energy: f64) -> SeedPixel {
        SeedPixel {
            x: 0.5,
            y: 0.5,
            r: 10,
            g: 20,
            b: 30,
            a: 255,
            energy,
            concept_id: concept_id.to_string(),
            layer_id: None,
        }
    }

    fn make_interface() -> SeedInterface {
        SeedInterface::new(SeedLatents {
            width: 4,
            height: 4,
            pixels: vec![
                pixel("alpha", 0.9),
                pixel("beta", 0.3),
                pixel("alpha", 0.3),
                pixel("alpha", 0.6),
            ],
            concepts: vec![concept("alpha"), concept("beta")],
        })
    }

    #[test]
    fn test_energy_bounds() {
        assert_eq!(energy(0, 0, 0), 0.0);
        assert!((energy(255, 255, 255) - 1.0).abs() < 1e-10);
        assert!(energy(0, 255, 0) > energy(255, 0, 0));
    }

    #[test]
    fn test_coverage() {
        let iface = make_interface();
        let summaries = iface.concept_summaries();
        assert_eq!(summaries.len(), 2);
        assert!((summaries[0].coverage - 0.75).abs() < 1e-10);
        assert!((summaries[1].coverage - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_coverage_sums_to_pixel_count() {
        let iface = make_interface();
        let n = iface.raw().pixels.len() as f64;
        let sum: f64 = iface
            .concept_summaries()
            .iter()
            .map(|s| s.coverage * n)
            .sum();
        assert!((sum - n).abs() < 1e-10, "each pixel counted exactly once");
    }

    #[test]
    fn test_coverage_empty_dataset() {
        let iface = SeedInterface::new(SeedLatents {
            width: 0,
            height: 0,
            pixels: vec![],
            concepts: vec![concept("alpha")],
        });
        assert_eq!(iface.concept_summaries()[0].coverage, 0.0);
    }

    #[test]
    fn test_pixels_for_concept_limit_and_order() {
        let iface = make_interface();
        let pixels = iface.pixels_for_concept("alpha", 2);
        assert_eq!(pixels.len(), 2);
        assert!((pixels[0].energy - 0.9).abs() < 1e-10);
        assert!((pixels[1].energy - 0.3).abs() < 1e-10);

        // fewer available than requested
        assert_eq!(iface.pixels_for_concept("beta", 10).len(), 1);
        assert!(iface.pixels_for_concept("missing", 10).is_empty());
    }

    #[test]
    fn test_strongest_pixels_stable_ties() {
        let iface = make_interface();
        let strongest = iface.strongest_pixels(3);
        assert!((strongest[0].energy - 0.9).abs() < 1e-10);
        assert!((strongest[1].energy - 0.6).abs() < 1e-10);
        // the two 0.3-energy pixels tie; dataset order puts beta first
        assert_eq!(strongest[2].concept_id, "beta");
    }

    #[test]
    fn test_concept_by_id() {
        let iface = make_interface();
        assert!(iface.concept_by_id("alpha").is_some());
        assert!(iface.concept_by_id("gamma").is_none());
    }
}
