use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use prism_core::{
    ProjectionConfig, ProjectionEngine, SeedInterface, export_json, import_json,
    synthesize_latents,
};
use prism_store::Store;

const ATLAS_WIDTH: u32 = 128;
const ATLAS_HEIGHT: u32 = 128;

#[derive(Parser)]
#[command(name = "prism", about = "Latent projection engine over a concept atlas")]
struct Cli {
    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project one or more prompts and fold the results into memory
    Project {
        /// Prompt text(s) to project, in order
        #[arg(required = true)]
        prompts: Vec<String>,

        /// Seed for reproducible sampling (default: wall clock)
        #[arg(long)]
        seed: Option<u32>,

        /// Number of pixels to sample per prompt
        #[arg(long)]
        samples: Option<usize>,

        /// Embedding vector dimension
        #[arg(long)]
        dim: Option<usize>,

        /// Number of top-ranked concepts to sample from
        #[arg(long)]
        concepts: Option<usize>,

        /// Attach a response summary to the recorded traces
        #[arg(long)]
        summary: Option<String>,

        /// Emit the raw projection outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List catalog concepts with their atlas coverage
    Concepts,

    /// Show the highest-energy pixels in the atlas
    Strongest {
        /// Number of pixels to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Sample pixels tagged with a concept
    Pixels {
        /// Concept id, e.g. stem-mathematics
        concept: String,

        /// Number of pixels to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Show the recorded memory trace history
    History {
        /// Most recent traces to show (0 = all)
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Emit traces as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export memory state to a JSON file
    Export {
        /// Output file path
        path: PathBuf,
    },

    /// Import memory state from a JSON file
    Import {
        /// Input file path
        path: PathBuf,
    },
}

fn data_dir() -> PathBuf {
    std::env::var("PRISM_DATA_DIR")
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".prism"))
}

fn open_store() -> Result<Store> {
    let dir = data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data dir {}", dir.display()))?;
    Store::open(&dir.join("prism.db")).context("failed to open store")
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Project {
            prompts,
            seed,
            samples,
            dim,
            concepts,
            summary,
            json,
        } => cmd_project(
            prompts,
            *seed,
            *samples,
            *dim,
            *concepts,
            summary.as_deref(),
            *json,
        ),
        Commands::Concepts => cmd_concepts(),
        Commands::Strongest { limit } => cmd_strongest(*limit),
        Commands::Pixels { concept, limit } => cmd_pixels(concept, *limit),
        Commands::History { limit, json } => cmd_history(*limit, *json),
        Commands::Export { path } => cmd_export(path),
        Commands::Import { path } => cmd_import(path),
    }
}

fn build_engine(
    seed: Option<u32>,
    samples: Option<usize>,
    dim: Option<usize>,
    concepts: Option<usize>,
) -> ProjectionEngine {
    let defaults = ProjectionConfig::default();
    let mut engine = ProjectionEngine::new(ProjectionConfig {
        seed,
        sample_count: samples.unwrap_or(defaults.sample_count),
        embedding_dimension: dim.unwrap_or(defaults.embedding_dimension),
        concept_sample_size: concepts.unwrap_or(defaults.concept_sample_size),
    });
    engine.load(synthesize_latents(ATLAS_WIDTH, ATLAS_HEIGHT));
    engine
}

fn cmd_project(
    prompts: &[String],
    seed: Option<u32>,
    samples: Option<usize>,
    dim: Option<usize>,
    concepts: Option<usize>,
    summary: Option<&str>,
    json: bool,
) -> Result<()> {
    // one engine across all prompts, so the sampling stream carries over
    let mut engine = build_engine(seed, samples, dim, concepts);

    let store = open_store()?;
    let mut memory = store.load_graph().context("failed to load memory")?;

    let mut outcomes = Vec::with_capacity(prompts.len());
    for prompt in prompts {
        let outcome = engine.project_prompt(prompt).context("projection failed")?;
        let traces = memory.ingest(prompt, &outcome, summary);
        outcomes.push((prompt, outcome, traces.len()));
    }
    store.save_graph(&memory).context("failed to save memory")?;

    if json {
        let raw: Vec<_> = outcomes.iter().map(|(_, outcome, _)| outcome).collect();
        println!("{}", serde_json::to_string_pretty(&raw)?);
        return Ok(());
    }

    for (prompt, outcome, trace_count) in &outcomes {
        println!("projected \"{prompt}\" into {} samples", outcome.samples.len());
        for (sample, value) in outcome.samples.iter().zip(&outcome.value_field) {
            println!(
                "  {:<28} ({:+.3}, {:+.3})  confidence={:.3}  value={:.3}",
                sample.concept.label,
                value.coordinate.x,
                value.coordinate.y,
                value.coordinate.confidence,
                value.value,
            );
        }
        tracing::debug!("recorded {trace_count} traces");
    }
    println!(
        "memory: {} points, {} edges, {} traces",
        memory.point_count(),
        memory.edge_count(),
        memory.trace_count(),
    );
    Ok(())
}

fn cmd_concepts() -> Result<()> {
    let engine = {
        let mut engine = ProjectionEngine::new(ProjectionConfig::default());
        engine.load(synthesize_latents(ATLAS_WIDTH, ATLAS_HEIGHT));
        engine
    };
    let dataset = engine.dataset().context("dataset not loaded")?;

    println!("{:<20} {:<28} {:>8}  keywords", "id", "label", "coverage");
    for summary in dataset.concept_summaries() {
        let c = &summary.concept;
        println!(
            "{:<20} {:<28} {:>7.1}%  {}",
            c.id,
            c.label,
            summary.coverage * 100.0,
            c.keywords.join(", "),
        );
    }
    Ok(())
}

fn cmd_strongest(limit: usize) -> Result<()> {
    let latents = synthesize_latents(ATLAS_WIDTH, ATLAS_HEIGHT);
    let dataset = SeedInterface::new(latents);

    println!("{:>8} {:>8} {:>8}  concept", "x", "y", "energy");
    for pixel in dataset.strongest_pixels(limit) {
        println!(
            "{:>8.3} {:>8.3} {:>8.3}  {}",
            pixel.x, pixel.y, pixel.energy, pixel.concept_id
        );
    }
    Ok(())
}

fn cmd_pixels(concept: &str, limit: usize) -> Result<()> {
    let latents = synthesize_latents(ATLAS_WIDTH, ATLAS_HEIGHT);
    let dataset = SeedInterface::new(latents);

    if dataset.concept_by_id(concept).is_none() {
        anyhow::bail!("unknown concept: {concept}");
    }

    let pixels = dataset.pixels_for_concept(concept, limit);
    println!("{} pixels tagged {concept}", pixels.len());
    for pixel in &pixels {
        println!(
            "  ({:.3}, {:.3})  rgb=({}, {}, {})  energy={:.3}",
            pixel.x, pixel.y, pixel.r, pixel.g, pixel.b, pixel.energy
        );
    }
    Ok(())
}

fn cmd_history(limit: usize, json: bool) -> Result<()> {
    let store = open_store()?;
    let memory = store.load_graph().context("failed to load memory")?;
    let traces = memory.traces();

    let start = if limit == 0 {
        0
    } else {
        traces.len().saturating_sub(limit)
    };
    let window = &traces[start..];

    if json {
        println!("{}", serde_json::to_string_pretty(window)?);
        return Ok(());
    }

    if window.is_empty() {
        println!("(no traces recorded)");
        return Ok(());
    }

    println!("showing {} of {} traces", window.len(), traces.len());
    for trace in window {
        println!(
            "  {}  value={:.3}  \"{}\"",
            trace.concept_id, trace.projection.value, trace.prompt
        );
    }
    Ok(())
}

fn cmd_export(path: &std::path::Path) -> Result<()> {
    let store = open_store()?;
    let memory = store.load_graph().context("failed to load memory")?;

    let json = export_json(&memory).context("failed to serialize memory")?;
    std::fs::write(path, &json).with_context(|| format!("failed to write {}", path.display()))?;

    println!("exported to {}", path.display());
    Ok(())
}

fn cmd_import(path: &std::path::Path) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let memory = import_json(&json).context("failed to parse memory JSON")?;

    let store = open_store()?;
    store.save_graph(&memory).context("failed to save memory")?;

    println!(
        "imported from {}. points={}, edges={}, traces={}",
        path.display(),
        memory.point_count(),
        memory.edge_count(),
        memory.trace_count(),
    );
    Ok(())
}
