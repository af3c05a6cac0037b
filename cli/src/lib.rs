//! Grove CLI library: seed sources, generator wiring and output formatting used by the
//! `grove` binary.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use grove::preset::{self, Preset};
use grove::{
    ChatOpenAI, ConfigError, GraphError, Generator, GrowError, GrowthConfig, GrowthEngine,
    GrowthEvent, GrowthReport, LlmGenerator, MockLlm, NewNode, Node, ScoredCandidate,
    DEFAULT_EVALUATION,
};
use serde::Deserialize;

/// Model used when neither `--model` nor `GROVE_MODEL` is set.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Reviewer score (0–100) the offline mock generator returns.
pub const MOCK_SCORE: u32 = 60;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("unknown preset: {0} (run `grove presets`)")]
    UnknownPreset(String),
    #[error("read seeds file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse seeds file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("seeds file has no seeds")]
    NoSeeds,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Grow(#[from] GrowError),
}

/// One entry of a seeds file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(alias = "abstract")]
    pub body: String,
    #[serde(default)]
    pub evaluation: Option<f64>,
}

/// Seeds file: either a bare array of entries, or an object with optional instruction
/// and criteria next to `seeds`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SeedFile {
    List(Vec<SeedEntry>),
    Domain {
        #[serde(default)]
        instruction: Option<String>,
        #[serde(default)]
        criteria: Option<String>,
        seeds: Vec<SeedEntry>,
    },
}

/// Where the initial graph comes from.
#[derive(Debug, Clone)]
pub enum GraphSource {
    Preset(&'static Preset),
    Seeds {
        instruction: Option<String>,
        criteria: Option<String>,
        seeds: Vec<NewNode>,
    },
}

impl GraphSource {
    pub fn preset(name: &str) -> Result<Self, CliError> {
        preset::find(name)
            .map(GraphSource::Preset)
            .ok_or_else(|| CliError::UnknownPreset(name.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CliError> {
        let (instruction, criteria, entries) = match serde_json::from_str::<SeedFile>(raw)? {
            SeedFile::List(seeds) => (None, None, seeds),
            SeedFile::Domain {
                instruction,
                criteria,
                seeds,
            } => (instruction, criteria, seeds),
        };
        if entries.is_empty() {
            return Err(CliError::NoSeeds);
        }
        let seeds = entries
            .into_iter()
            .map(|e| {
                let node = NewNode::seed(e.title, e.body)
                    .with_evaluation(e.evaluation.unwrap_or(DEFAULT_EVALUATION));
                match e.id {
                    Some(id) => node.with_id(id),
                    None => node,
                }
            })
            .collect();
        Ok(GraphSource::Seeds {
            instruction,
            criteria,
            seeds,
        })
    }

    /// Fills instruction and criteria from the source where the config has none.
    pub fn apply_prompts(&self, config: &mut GrowthConfig) {
        let (instruction, criteria) = match self {
            GraphSource::Preset(p) => (Some(p.instruction.to_string()), Some(p.criteria.to_string())),
            GraphSource::Seeds {
                instruction,
                criteria,
                ..
            } => (instruction.clone(), criteria.clone()),
        };
        if config.instruction.is_none() {
            config.instruction = instruction;
        }
        if config.criteria.is_none() {
            config.criteria = criteria;
        }
    }

    /// Adds every seed to `engine`.
    pub async fn load_into(&self, engine: &GrowthEngine) -> Result<usize, CliError> {
        match self {
            GraphSource::Preset(p) => Ok(engine.load_preset(p).await?.len()),
            GraphSource::Seeds { seeds, .. } => {
                for seed in seeds {
                    engine.add_seed_node(seed.clone()).await?;
                }
                Ok(seeds.len())
            }
        }
    }
}

/// Offline mock (writer + reviewer replies) or an OpenAI-compatible model.
pub fn build_generator(mock: bool, model: &str) -> Arc<dyn Generator> {
    if mock {
        tracing::info!(score = MOCK_SCORE, "using mock generator");
        Arc::new(LlmGenerator::new(Arc::new(MockLlm::paper_writer(MOCK_SCORE))))
    } else {
        tracing::info!(model = %model, "using OpenAI-compatible generator");
        Arc::new(LlmGenerator::new(Arc::new(ChatOpenAI::new(model))))
    }
}

/// Engine with `source` prompts applied and its seeds loaded.
pub async fn build_engine(
    source: &GraphSource,
    mut config: GrowthConfig,
    generator: Arc<dyn Generator>,
) -> Result<GrowthEngine, CliError> {
    source.apply_prompts(&mut config);
    config.validate()?;
    let engine = GrowthEngine::new(generator, config);
    let n = source.load_into(&engine).await?;
    tracing::info!(seeds = n, "graph seeded");
    Ok(engine)
}

fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// One line per committed node: `+ <id> "<title>" eval=<e> <- <parents>`.
pub fn format_report(report: &GrowthReport) -> String {
    let parents: Vec<&str> = report.parents.iter().map(|p| short(p.as_str())).collect();
    format!(
        "+ {} \"{}\" eval={:.2}{} <- {}",
        short(report.node.id.as_str()),
        report.node.title,
        report.node.evaluation,
        if report.score_defaulted { " (default)" } else { "" },
        parents.join(", ")
    )
}

/// Human-readable line for an auto-growth event.
pub fn format_event(event: &GrowthEvent) -> Option<String> {
    match event {
        GrowthEvent::NodeAdded {
            node_id,
            title,
            parents,
            evaluation,
        } => {
            let parents: Vec<&str> = parents.iter().map(|p| short(p.as_str())).collect();
            Some(format!(
                "+ {} \"{}\" eval={:.2} <- {}",
                short(node_id.as_str()),
                title,
                evaluation,
                parents.join(", ")
            ))
        }
        GrowthEvent::CycleFailed { reason } => Some(format!("! cycle failed: {}", reason)),
        GrowthEvent::CycleSkipped => Some("~ cycle skipped (previous still running)".to_string()),
        GrowthEvent::EvaluationUpdated { .. } | GrowthEvent::SeedAdded { .. } => None,
    }
}

/// Score table sorted by score, highest first.
pub fn format_scores(scores: &[ScoredCandidate], nodes: &[Node]) -> String {
    let mut rows: Vec<&ScoredCandidate> = scores.iter().collect();
    rows.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut out = format!(
        "{:<10} {:>8} {:>8} {:>8}  title\n",
        "id", "score", "exploit", "explore"
    );
    for row in rows {
        let title = nodes
            .iter()
            .find(|n| n.id == row.id)
            .map(|n| n.title.as_str())
            .unwrap_or("");
        let _ = writeln!(
            out,
            "{:<10} {:>8.4} {:>8.4} {:>8.4}  {}",
            short(row.id.as_str()),
            row.score,
            row.exploitation,
            row.exploration,
            title
        );
    }
    out
}
