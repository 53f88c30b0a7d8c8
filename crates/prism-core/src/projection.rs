//! The seeded projection engine: prompt → keywords → concept ranking →
//! pixel sampling → vector and coordinate synthesis → value field.
//!
//! The engine is a two-state machine, Unloaded → Loaded, transitioned once
//! by `load`. Its PRNG stream carries across calls, so sampling outcomes are
//! a pure function of seed, configuration, dataset, and call order.

use std::cmp::Ordering;
use std::f64::consts::PI;

use crate::concept::Concept;
use crate::constants::{
    DEFAULT_CONCEPT_SAMPLE_SIZE, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_SAMPLE_COUNT,
    MIN_EMBEDDING_DIMENSION,
};
use crate::dataset::{SeedInterface, SeedLatents, SeedPixel};
use crate::error::{EngineError, Result};
use crate::latent::{
    LatentPoint, PixelCoord, PlanarCoordinate, ProjectionOutcome, ProjectionSample,
    ValueProjection, round3,
};
use crate::rng::Mulberry32;
use crate::time::now_unix_millis;
use crate::tokenizer::extract_keywords;

/// Engine configuration. An unset seed falls back to wall-clock time, which
/// gives up reproducibility across runs.
#[derive(Clone, Copy, Debug)]
pub struct ProjectionConfig {
    pub sample_count: usize,
    pub embedding_dimension: usize,
    pub seed: Option<u32>,
    pub concept_sample_size: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            seed: None,
            concept_sample_size: DEFAULT_CONCEPT_SAMPLE_SIZE,
        }
    }
}

impl ProjectionConfig {
    /// Default configuration pinned to a fixed seed.
    pub fn seeded(seed: u32) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Deterministic sampler over a loaded seed dataset.
///
/// Single-owner: concurrent invocation from multiple logical callers is
/// unsupported and must be serialized by the caller.
pub struct ProjectionEngine {
    config: ProjectionConfig,
    rng: Mulberry32,
    seed: Option<SeedInterface>,
}

impl ProjectionEngine {
    pub fn new(mut config: ProjectionConfig) -> Self {
        config.embedding_dimension = config.embedding_dimension.max(MIN_EMBEDDING_DIMENSION);
        let seed_value = config
            .seed
            .unwrap_or_else(|| (now_unix_millis() & 0xffff_ffff) as u32);
        Self {
            config,
            rng: Mulberry32::new(seed_value),
            seed: None,
        }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.seed.is_some()
    }

    /// One-way transition to Loaded. A second load is a no-op; the first
    /// bound dataset wins.
    pub fn load(&mut self, data: SeedLatents) {
        if self.seed.is_none() {
            self.seed = Some(SeedInterface::new(data));
        }
    }

    /// The bound dataset view, or NotLoaded before `load`.
    pub fn dataset(&self) -> Result<&SeedInterface> {
        self.seed.as_ref().ok_or(EngineError::NotLoaded)
    }

    /// Project a prompt onto the dataset. Fails only with NotLoaded; empty
    /// rankings and filters fall back to catalog/pixel order internally.
    pub fn project_prompt(&mut self, prompt: &str) -> Result<ProjectionOutcome> {
        let Self {
            config, rng, seed, ..
        } = self;
        let seed = seed.as_ref().ok_or(EngineError::NotLoaded)?;

        let keywords = extract_keywords(prompt);
        let samples = sample_from_seed(seed, config, rng, &keywords);
        let value_field = samples
            .iter()
            .map(|sample| build_value_projection(sample, &keywords, rng))
            .collect();

        Ok(ProjectionOutcome {
            samples,
            value_field,
        })
    }
}

/// Number of prompt keywords that appear as substrings of any concept
/// keyword.
fn keyword_match_count(keywords: &[String], concept: &Concept) -> usize {
    keywords
        .iter()
        .filter(|kw| concept.keywords.iter().any(|ck| ck.contains(kw.as_str())))
        .count()
}

fn sample_from_seed(
    seed: &SeedInterface,
    config: &ProjectionConfig,
    rng: &mut Mulberry32,
    keywords: &[String],
) -> Vec<ProjectionSample> {
    // Rank concepts: weight x coverage boost x keyword boost x loop rhythm.
    let mut ranked: Vec<(Concept, f64)> = seed
        .concept_summaries()
        .into_iter()
        .map(|summary| {
            let match_count = keyword_match_count(keywords, &summary.concept) as f64;
            let c = &summary.concept;
            let rhythm = (c.loop_phase + match_count * 0.35).cos();
            let score = c.weight
                * (0.8 + summary.coverage * 0.9)
                * (1.0 + match_count * 0.55)
                * (1.0 + rhythm * 0.2);
            (summary.concept, score)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let target = config.concept_sample_size;
    let mut selected: Vec<Concept> = ranked.into_iter().take(target).map(|(c, _)| c).collect();
    if selected.is_empty() {
        selected = seed.raw().concepts.iter().take(target).cloned().collect();
    }

    let mut candidates: Vec<SeedPixel> = seed
        .raw()
        .pixels
        .iter()
        .filter(|p| selected.iter().any(|c| c.id == p.concept_id))
        .cloned()
        .collect();
    if candidates.is_empty() {
        candidates = seed.raw().pixels.clone();
    }

    rng.shuffle(&mut candidates);
    candidates.truncate(config.sample_count);

    let width = seed.raw().width;
    let height = seed.raw().height;
    let mut samples = Vec::with_capacity(candidates.len());

    for (index, pixel) in candidates.iter().enumerate() {
        // Unmatched concept references degrade to the selection head, then
        // the catalog head; a pixel with no resolvable concept is dropped.
        let Some(concept) = selected
            .iter()
            .find(|c| c.id == pixel.concept_id)
            .or_else(|| selected.first())
            .or_else(|| seed.raw().concepts.first())
        else {
            continue;
        };

        let suffix = (rng.next_f64() * 1e6) as u32;
        let point_id = format!("{}-{}-{}", concept.id, index, suffix);
        let vector = vector_from_pixel(pixel, concept, config.embedding_dimension);
        let mut tags = Vec::with_capacity(1 + concept.keywords.len());
        tags.push(concept.label.clone());
        tags.extend(concept.keywords.iter().cloned());

        let pixel_coord = PixelCoord {
            x: (pixel.x * width.saturating_sub(1) as f64).round() as u32,
            y: (pixel.y * height.saturating_sub(1) as f64).round() as u32,
        };
        let projection = coordinate_from_pixel(pixel, keywords, concept, rng);

        samples.push(ProjectionSample {
            point: LatentPoint {
                id: point_id,
                vector,
                pixel: Some(pixel_coord),
                tags,
            },
            projection,
            concept: concept.clone(),
            layer_id: pixel.layer_id.clone(),
        });
    }

    samples
}

/// Embedding layout: position, color, energy as base elements, padded or
/// truncated to `dimension - 1`, then the concept weight appended last.
/// Padding derives from keyword lengths, cyclically indexed, over 12.
fn vector_from_pixel(pixel: &SeedPixel, concept: &Concept, dimension: usize) -> Vec<f64> {
    let base = [
        pixel.x * 2.0 - 1.0,
        pixel.y * 2.0 - 1.0,
        pixel.r as f64 / 255.0,
        pixel.g as f64 / 255.0,
        pixel.b as f64 / 255.0,
        pixel.energy,
    ];
    let target = dimension - 1;

    let mut vector: Vec<f64> = base.iter().copied().take(target).collect();
    while vector.len() < target {
        let idx = vector.len() - base.len();
        let pad = if concept.keywords.is_empty() {
            concept.weight
        } else {
            concept.keywords[idx % concept.keywords.len()].len() as f64
        };
        vector.push(pad / 12.0);
    }
    vector.push(concept.weight);
    vector
}

fn coordinate_from_pixel(
    pixel: &SeedPixel,
    keywords: &[String],
    concept: &Concept,
    rng: &mut Mulberry32,
) -> PlanarCoordinate {
    let affinity = if keywords
        .iter()
        .any(|kw| concept.keywords.iter().any(|ck| ck == kw))
    {
        1.05
    } else {
        0.85
    };
    let loop_shift_x = (concept.loop_phase + pixel.y * PI).sin() * 0.08;
    let loop_shift_y = (concept.loop_phase + pixel.x * PI).cos() * 0.08;

    let x = pixel.x * 2.0 - 1.0 + rng.jitter(0.04 + concept.weight * 0.01) + loop_shift_x;
    let y = pixel.y * 2.0 - 1.0 + rng.jitter(0.04) + loop_shift_y;
    let confidence = (pixel.energy * affinity * concept.weight * 0.95 + 0.05 * rng.next_f64())
        .clamp(0.0, 1.0);

    PlanarCoordinate { x, y, confidence }
}

fn build_value_projection(
    sample: &ProjectionSample,
    keywords: &[String],
    rng: &mut Mulberry32,
) -> ValueProjection {
    let joined = sample.point.tags.join(" ");
    let matches = keywords
        .iter()
        .filter(|kw| joined.contains(kw.as_str()))
        .count() as f64;

    let concept = &sample.concept;
    let loop_contribution = 1.0 + (concept.loop_phase + matches * 0.2).sin() * 0.15;
    let keyword_boost = if matches > 0.0 { 1.0 + matches * 0.2 } else { 0.75 };
    let value = sample.projection.confidence
        * (0.85 + rng.next_f64() * 0.25)
        * keyword_boost
        * concept.weight
        * loop_contribution;

    ValueProjection {
        point_id: sample.point.id.clone(),
        coordinate: sample.projection,
        value: round3(value),
    }
}
