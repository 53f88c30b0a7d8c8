//! Built-in catalog of universal knowledge-domain concepts.
//!
//! Each concept carries the keywords used for prompt ranking, an RGB anchor
//! color, a rectangular affinity region in normalized image space, a loop
//! phase for periodic modulation, and a ranking weight.

use std::f64::consts::PI;

use crate::concept::{AffinityRegion, Concept};

#[allow(clippy::too_many_arguments)]
fn concept(
    id: &str,
    label: &str,
    description: &str,
    keywords: &[&str],
    color: [u8; 3],
    x_range: [f64; 2],
    y_range: [f64; 2],
    loop_phase: f64,
    weight: f64,
) -> Concept {
    Concept {
        id: id.to_string(),
        label: label.to_string(),
        description: description.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        color,
        region: AffinityRegion::new(x_range, y_range),
        loop_phase,
        weight,
    }
}

/// The nine knowledge-domain concepts, in catalog order.
pub fn knowledge_concepts() -> Vec<Concept> {
    vec![
        concept(
            "stem-science",
            "Science & Nature",
            "Natural sciences including physics, chemistry, biology, astronomy, and earth sciences.",
            &[
                "science", "physics", "chemistry", "biology", "astronomy", "nature", "natural",
                "universe", "matter", "energy",
            ],
            [80, 160, 255],
            [0.0, 0.5],
            [0.0, 0.5],
            0.0,
            1.2,
        ),
        concept(
            "stem-mathematics",
            "Mathematics & Logic",
            "Mathematical principles, logic, computation, and quantitative reasoning.",
            &[
                "math", "mathematics", "algebra", "geometry", "calculus", "logic", "number",
                "equation", "proof", "theorem",
            ],
            [100, 200, 255],
            [0.1, 0.4],
            [0.2, 0.5],
            PI / 4.0,
            1.15,
        ),
        concept(
            "arts-literature",
            "Arts & Literature",
            "Creative expression through writing, poetry, storytelling, and visual arts.",
            &[
                "literature", "writing", "poetry", "story", "book", "art", "creative",
                "expression", "novel", "author",
            ],
            [255, 200, 100],
            [0.5, 1.0],
            [0.0, 0.35],
            PI / 2.0,
            1.1,
        ),
        concept(
            "arts-philosophy",
            "Philosophy & Ethics",
            "Philosophical inquiry, ethics, meaning, wisdom, and fundamental questions about existence.",
            &[
                "philosophy", "ethics", "thought", "wisdom", "meaning", "existence", "moral",
                "value", "truth", "knowledge",
            ],
            [200, 150, 255],
            [0.65, 1.0],
            [0.0, 0.5],
            3.0 * PI / 4.0,
            1.25,
        ),
        concept(
            "social-history",
            "History & Culture",
            "Human history, civilizations, cultural development, and historical events.",
            &[
                "history", "civilization", "culture", "historical", "events", "people",
                "society", "past", "heritage", "tradition",
            ],
            [255, 100, 150],
            [0.0, 0.4],
            [0.5, 1.0],
            PI,
            1.1,
        ),
        concept(
            "social-psychology",
            "Psychology & Human Behavior",
            "Understanding the mind, behavior, emotions, and human interaction.",
            &[
                "psychology", "mind", "behavior", "emotion", "human", "mental", "cognitive",
                "social", "personality", "feeling",
            ],
            [230, 120, 200],
            [0.2, 0.5],
            [0.6, 1.0],
            5.0 * PI / 4.0,
            1.15,
        ),
        concept(
            "practical-health",
            "Health & Wellness",
            "Physical and mental health, medicine, wellness practices, and body care.",
            &[
                "health", "medicine", "wellness", "body", "care", "medical", "fitness",
                "nutrition", "disease", "treatment",
            ],
            [120, 220, 140],
            [0.5, 0.85],
            [0.5, 1.0],
            3.0 * PI / 2.0,
            1.2,
        ),
        concept(
            "practical-skills",
            "Skills & How-To",
            "Practical skills, techniques, guides, and applied knowledge for everyday life.",
            &[
                "skills", "practical", "how", "guide", "learn", "technique", "method",
                "tutorial", "instruction", "process",
            ],
            [160, 200, 100],
            [0.6, 1.0],
            [0.65, 1.0],
            7.0 * PI / 4.0,
            1.1,
        ),
        concept(
            "synthesis-meta",
            "Understanding & Connection",
            "Meta-knowledge, synthesis across domains, understanding, explanation, and integration of concepts.",
            &[
                "understand", "explain", "connect", "integrate", "overview", "synthesis",
                "comprehend", "insight", "grasp", "meaning",
            ],
            [240, 240, 240],
            [0.4, 0.6],
            [0.4, 0.6],
            2.0 * PI,
            1.3,
        ),
    ]
}

/// Map a pixel to a concept: the first concept whose affinity region contains
/// the position wins, otherwise the concept with the nearest anchor color.
/// Returns None only for an empty catalog.
pub fn assign_concept<'a>(
    concepts: &'a [Concept],
    x: f64,
    y: f64,
    rgb: [u8; 3],
) -> Option<&'a Concept> {
    if let Some(regional) = concepts.iter().find(|c| c.region.contains(x, y)) {
        return Some(regional);
    }

    concepts.iter().min_by(|a, b| {
        a.color_distance(rgb)
            .partial_cmp(&b.color_distance(rgb))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}
