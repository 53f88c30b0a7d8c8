//! Procedural atlas synthesis and raw-buffer dataset building.
//!
//! The synthetic field blends Gaussian influence blobs, one per knowledge
//! domain, over a sine-wave texture. Pixels are tagged with concepts by
//! affinity region first, nearest anchor color second. All of this is pure
//! arithmetic; no files are touched.

use crate::catalog::{assign_concept, knowledge_concepts};
use crate::concept::Concept;
use crate::dataset::{SeedLatents, SeedPixel, energy};
use crate::error::{EngineError, Result};

struct DomainField {
    center: (f64, f64),
    color: [f64; 3],
    radius: f64,
}

const FIELDS: [DomainField; 9] = [
    DomainField { center: (0.25, 0.25), color: [80.0, 160.0, 255.0], radius: 0.30 },
    DomainField { center: (0.20, 0.35), color: [100.0, 200.0, 255.0], radius: 0.25 },
    DomainField { center: (0.70, 0.20), color: [255.0, 200.0, 100.0], radius: 0.28 },
    DomainField { center: (0.80, 0.30), color: [200.0, 150.0, 255.0], radius: 0.25 },
    DomainField { center: (0.25, 0.70), color: [255.0, 100.0, 150.0], radius: 0.28 },
    DomainField { center: (0.35, 0.80), color: [230.0, 120.0, 200.0], radius: 0.25 },
    DomainField { center: (0.70, 0.70), color: [120.0, 220.0, 140.0], radius: 0.26 },
    DomainField { center: (0.78, 0.82), color: [160.0, 200.0, 100.0], radius: 0.23 },
    DomainField { center: (0.50, 0.50), color: [240.0, 240.0, 240.0], radius: 0.20 },
];

/// Render the knowledge-domain influence field as a tightly packed RGBA
/// buffer (row-major, 4 bytes per pixel, alpha always 255).
pub fn render_field(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0u8; (width as usize) * (height as usize) * 4];
    let pi = std::f64::consts::PI;

    for y in 0..height {
        for x in 0..width {
            let x_norm = x as f64 / (width.saturating_sub(1).max(1)) as f64;
            let y_norm = y as f64 / (height.saturating_sub(1).max(1)) as f64;

            let mut total = 0.0;
            let mut r = 0.0;
            let mut g = 0.0;
            let mut b = 0.0;
            for field in &FIELDS {
                let dx = x_norm - field.center.0;
                let dy = y_norm - field.center.1;
                let dist_sq = dx * dx + dy * dy;
                let influence = (-dist_sq / (field.radius * field.radius)).exp();
                r += field.color[0] * influence;
                g += field.color[1] * influence;
                b += field.color[2] * influence;
                total += influence;
            }
            if total > 0.0 {
                r /= total;
                g /= total;
                b /= total;
            }

            let wave1 = (x_norm * pi * 8.0 + y_norm * pi * 3.0).sin() * 8.0;
            let wave2 = (y_norm * pi * 6.0 + x_norm * pi * 4.0).cos() * 6.0;
            let texture = wave1 + wave2;

            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            data[idx] = (r + texture).clamp(0.0, 255.0) as u8;
            data[idx + 1] = (g + texture * 0.8).clamp(0.0, 255.0) as u8;
            data[idx + 2] = (b + texture * 0.6).clamp(0.0, 255.0) as u8;
            data[idx + 3] = 255;
        }
    }

    data
}

/// Build a dataset from a raw RGBA buffer, tagging every pixel with a
/// catalog concept. Fails when the buffer does not match the dimensions
/// or the concept catalog is empty; never substitutes an empty dataset.
pub fn latents_from_rgba(
    width: u32,
    height: u32,
    data: &[u8],
    concepts: Vec<Concept>,
    layer_id: Option<&str>,
) -> Result<SeedLatents> {
    let expected = (width as usize) * (height as usize) * 4;
    if data.len() != expected {
        return Err(EngineError::DatasetUnavailable(format!(
            "buffer length {} does not match {width}x{height} RGBA ({expected})",
            data.len()
        )));
    }
    if concepts.is_empty() {
        return Err(EngineError::DatasetUnavailable(
            "concept catalog is empty".to_string(),
        ));
    }

    let mut pixels = Vec::with_capacity((width as usize) * (height as usize));
    for y in 0..height {
        for x in 0..width {
            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            let (r, g, b, a) = (data[idx], data[idx + 1], data[idx + 2], data[idx + 3]);
            let x_norm = x as f64 / (width.saturating_sub(1).max(1)) as f64;
            let y_norm = y as f64 / (height.saturating_sub(1).max(1)) as f64;

            // catalog is non-empty, so assignment always succeeds
            let Some(concept) = assign_concept(&concepts, x_norm, y_norm, [r, g, b]) else {
                continue;
            };

            pixels.push(SeedPixel {
                x: x_norm,
                y: y_norm,
                r,
                g,
                b,
                a,
                energy: energy(r, g, b),
                concept_id: concept.id.clone(),
                layer_id: layer_id.map(str::to_string),
            });
        }
    }

    Ok(SeedLatents {
        width,
        height,
        pixels,
        concepts,
    })
}

/// Self-contained synthetic dataset: render the influence field and tag it
/// with the built-in knowledge catalog.
pub fn synthesize_latents(width: u32, height: u32) -> SeedLatents {
    let data = render_field(width, height);
    // dimensions and catalog are ours, so this cannot fail
    latents_from_rgba(width, height, &data, knowledge_concepts(), None)
        .unwrap_or(SeedLatents {
            width,
            height,
            pixels: Vec::new(),
            concepts: knowledge_concepts(),
        })
}
