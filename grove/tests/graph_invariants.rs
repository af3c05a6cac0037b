//! Graph invariants over many cycles, preset loading and export, with the LLM-backed generator.

mod init_logging;

use std::sync::Arc;

use grove::export::{read_json, write_json};
use grove::preset;
use grove::{
    AutoGrower, GrowthConfig, GrowthEngine, LlmGenerator, MockLlm, SelectionStrategy,
};

fn engine(strategy: SelectionStrategy, score: u32) -> (GrowthEngine, Arc<MockLlm>) {
    let llm = Arc::new(MockLlm::paper_writer(score));
    let config = GrowthConfig {
        strategy,
        rng_seed: Some(42),
        ..GrowthConfig::default()
    };
    let generator = Arc::new(LlmGenerator::new(llm.clone()));
    (GrowthEngine::new(generator, config), llm)
}

/// **Scenario**: Fifty UCT cycles on the paper preset keep the DAG acyclic and consistent.
#[tokio::test]
async fn uct_growth_keeps_invariants() {
    let (engine, llm) = engine(SelectionStrategy::Uct, 65);
    let seeds = engine.load_preset(&preset::PAPER).await.unwrap();
    assert_eq!(seeds.len(), preset::PAPER.seeds.len());

    for _ in 0..50 {
        let report = engine.grow_once().await.unwrap();
        assert!(!report.parents.is_empty() && report.parents.len() <= 2);
        assert_eq!(report.node.evaluation, 0.65);
    }
    assert_eq!(llm.calls(), 100);

    let store = engine.store();
    let store = store.read().await;
    assert_eq!(store.len(), seeds.len() + 50);
    store.check_consistency().unwrap();
    assert!(store.topological_order().is_some());
    for node in store.all() {
        let mut sorted = node.children.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), node.children.len(), "duplicate child on {}", node.id);
    }
}

/// **Scenario**: Random strategy grows from any node and keeps invariants.
#[tokio::test]
async fn random_growth_keeps_invariants() {
    let (engine, _) = engine(SelectionStrategy::Random, 40);
    engine.load_preset(&preset::STORY).await.unwrap();
    for _ in 0..30 {
        engine.grow_once().await.unwrap();
    }
    let store = engine.store();
    let store = store.read().await;
    assert_eq!(store.len(), preset::STORY.seeds.len() + 30);
    store.check_consistency().unwrap();
}

/// **Scenario**: Same seed, same strategy ⇒ same parent sequence.
#[tokio::test]
async fn seeded_random_selection_is_reproducible() {
    async fn run() -> Vec<Vec<String>> {
        let (engine, _) = engine(SelectionStrategy::Random, 50);
        engine.load_preset(&preset::HISTORY).await.unwrap();
        let mut out = Vec::new();
        for _ in 0..5 {
            let report = engine.grow_once().await.unwrap();
            let parents: Vec<String> = report
                .parents
                .iter()
                .map(|p| p.as_str().to_string())
                .filter(|p| p.starts_with('s'))
                .collect();
            out.push(parents);
        }
        out
    }
    let first = run().await;
    assert!(!first.is_empty());
    assert_eq!(first[0], run().await[0]);
}

/// **Scenario**: Export after auto growth round-trips through a file.
#[tokio::test]
async fn export_after_auto_growth() {
    let (engine, _) = engine(SelectionStrategy::Uct, 80);
    let engine = Arc::new(engine);
    engine.load_preset(&preset::PAPER).await.unwrap();
    let summary = AutoGrower::new(Arc::clone(&engine))
        .with_interval(std::time::Duration::from_millis(5))
        .with_max_cycles(4)
        .spawn()
        .join()
        .await
        .unwrap();
    assert_eq!(summary.committed, 4);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");
    let export = engine.export().await;
    write_json(&path, &export).unwrap();
    let back = read_json(&path).unwrap();
    assert_eq!(back.nodes.len(), preset::PAPER.seeds.len() + 4);
    assert_eq!(back.evaluations.len(), 4);
    assert!(back.evaluations.records().iter().all(|r| r.evaluation == 0.8));
}
