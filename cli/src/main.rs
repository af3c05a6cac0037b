//! Grove CLI binary: seed a graph, grow it with UCT-selected parents, export it.
//!
//! Subcommands: `presets` (list built-in presets), `grow` (N cycles), `auto` (interval growth
//! until Ctrl-C or `--max-cycles`), `scores` (UCT table of the seeded graph).

mod logging;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use cli::{build_engine, build_generator, format_event, format_report, format_scores, GraphSource};
use grove::export::write_json;
use grove::preset::PRESETS;
use grove::{AutoGrower, GrowError, GrowthConfig, GrowthEngine, SelectionStrategy};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "grove")]
#[command(about = "Grove: grow a graph of generated ideas from seed nodes")]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List built-in presets
    Presets,
    /// Run a fixed number of growth cycles
    Grow {
        #[command(flatten)]
        graph: GraphOpts,
        /// Number of cycles to run
        #[arg(long, default_value_t = 1)]
        cycles: usize,
    },
    /// Grow on an interval until Ctrl-C or --max-cycles
    Auto {
        #[command(flatten)]
        graph: GraphOpts,
        /// Interval between cycles in milliseconds (default: GROVE_INTERVAL_MS or 3000)
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,
        /// Stop after this many cycles
        #[arg(long, value_name = "N")]
        max_cycles: Option<usize>,
    },
    /// Print UCT scores of the seeded graph
    Scores {
        #[command(flatten)]
        graph: GraphOpts,
    },
}

#[derive(clap::Args, Debug)]
struct GraphOpts {
    /// Built-in preset to seed from (paper, story, history)
    #[arg(long, value_name = "NAME", default_value = "paper", conflicts_with = "seeds")]
    preset: String,
    /// JSON seeds file instead of a preset
    #[arg(long, value_name = "FILE")]
    seeds: Option<PathBuf>,
    /// Parents per cycle (default: GROVE_PARENTS or 2)
    #[arg(long, value_name = "K")]
    parents: Option<usize>,
    /// Parent selection strategy: uct or random (default: GROVE_STRATEGY or uct)
    #[arg(long)]
    strategy: Option<SelectionStrategy>,
    /// Use the offline mock generator instead of an LLM
    #[arg(long)]
    mock: bool,
    /// Chat model for generation and review (default: GROVE_MODEL or gpt-4o-mini)
    #[arg(long, value_name = "NAME")]
    model: Option<String>,
    /// Write nodes and evaluations as JSON to this file when done
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

impl GraphOpts {
    fn source(&self) -> Result<GraphSource, cli::CliError> {
        match &self.seeds {
            Some(path) => GraphSource::from_file(path),
            None => GraphSource::preset(&self.preset),
        }
    }

    fn config(&self) -> Result<GrowthConfig, cli::CliError> {
        let mut config = GrowthConfig::from_env()?;
        if let Some(k) = self.parents {
            config.num_parents = k;
        }
        if let Some(s) = self.strategy {
            config.strategy = s;
        }
        if let Some(m) = &self.model {
            config.model = Some(m.clone());
        }
        Ok(config)
    }

    async fn engine(&self, config: GrowthConfig) -> Result<GrowthEngine, cli::CliError> {
        let model = config.model.as_deref().unwrap_or(cli::DEFAULT_MODEL);
        let generator = build_generator(self.mock, model);
        build_engine(&self.source()?, config, generator).await
    }

    async fn export(&self, engine: &GrowthEngine) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(path) = &self.export {
            write_json(path, &engine.export().await)?;
            println!("exported to {}", path.display());
        }
        Ok(())
    }
}

async fn run_grow(graph: GraphOpts, cycles: usize) -> Result<(), Box<dyn std::error::Error>> {
    let engine = graph.engine(graph.config()?).await?;
    let mut failed = 0usize;
    for _ in 0..cycles {
        match engine.grow_once().await {
            Ok(report) => println!("{}", format_report(&report)),
            Err(GrowError::NoEligibleCandidates) => {
                eprintln!("no eligible candidates; add more seed nodes");
                break;
            }
            Err(e) => {
                failed += 1;
                eprintln!("! cycle failed: {}", e);
            }
        }
    }
    if failed > 0 {
        eprintln!("{} of {} cycles failed", failed, cycles);
    }
    graph.export(&engine).await
}

async fn run_auto(
    graph: GraphOpts,
    interval_ms: Option<u64>,
    max_cycles: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = graph.config()?;
    if let Some(ms) = interval_ms {
        config.auto_interval = Duration::from_millis(ms);
    }
    let (tx, mut rx) = mpsc::channel(256);
    let engine = Arc::new(graph.engine(config).await?.with_events(tx));

    let mut grower = AutoGrower::new(Arc::clone(&engine));
    if let Some(n) = max_cycles {
        grower = grower.with_max_cycles(n);
    }
    let handle = grower.spawn();
    eprintln!("auto growth running; Ctrl-C to stop");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    while handle.is_auto_growing() {
        tokio::select! {
            _ = &mut ctrl_c => {
                handle.stop();
                eprintln!("stopping after the current cycle");
            }
            Some(event) = rx.recv() => {
                if let Some(line) = format_event(&event) {
                    println!("{}", line);
                }
            }
            _ = tokio::time::sleep(Duration::from_millis(100)) => {}
        }
    }
    let summary = handle.join().await?;
    while let Ok(event) = rx.try_recv() {
        if let Some(line) = format_event(&event) {
            println!("{}", line);
        }
    }
    eprintln!(
        "{} cycles: {} committed, {} failed",
        summary.cycles, summary.committed, summary.failed
    );
    graph.export(&engine).await
}

async fn run_scores(graph: GraphOpts) -> Result<(), Box<dyn std::error::Error>> {
    let engine = graph.engine(graph.config()?).await?;
    print!("{}", format_scores(&engine.scores().await, &engine.all().await));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = config::load_and_apply("grove", None) {
        eprintln!("config: {}", e);
    }
    logging::init()?;

    let args = Args::parse();
    match args.cmd {
        Command::Presets => {
            for p in PRESETS {
                println!("{:<8} {} ({} seeds)", p.name, p.description, p.seeds.len());
            }
            Ok(())
        }
        Command::Grow { graph, cycles } => run_grow(graph, cycles).await,
        Command::Auto {
            graph,
            interval_ms,
            max_cycles,
        } => run_auto(graph, interval_ms, max_cycles).await,
        Command::Scores { graph } => run_scores(graph).await,
    }
}
