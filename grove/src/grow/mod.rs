//! Growth engine: snapshot → annotate → select → generate → commit.
//!
//! One cycle takes a snapshot of the store under a read lock, ranks candidates on the
//! snapshot, releases every lock, awaits the [`Generator`], then inserts the new node and
//! links it under its parents in one write-lock section. A failed or timed-out generator
//! call commits nothing.
//!
//! Only one automatic or requested cycle runs at a time; a trigger arriving while a cycle
//! is in flight returns [`GrowError::CycleInFlight`] and is skipped.
//!
//! **Interaction**: Owns the [`GraphStore`] (`Arc<RwLock<_>>`) and the [`EvaluationLog`];
//! driven by callers directly or by [`AutoGrower`] on an interval.

mod auto;
mod event;

pub use auto::{AutoGrowHandle, AutoGrowSummary, AutoGrower};
pub use event::GrowthEvent;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, Mutex, RwLock};

use crate::aggregate::annotate;
use crate::config::GrowthConfig;
use crate::eval_log::EvaluationLog;
use crate::export::GraphExport;
use crate::generate::{GenerateError, GenerationRequest, Generator, ParentContent};
use crate::node::{is_valid_evaluation, NewNode, Node, NodeId, DEFAULT_EVALUATION};
use crate::preset::Preset;
use crate::select::{select, uct_scores, ScoredCandidate, SelectError};
use crate::store::{GraphError, GraphStore};

/// Why a growth cycle produced no node. Every variant leaves the graph usable.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GrowError {
    /// Empty graph or everything filtered out.
    #[error("no eligible candidates; add more seed nodes")]
    NoEligibleCandidates,
    #[error("generator failed: {0}")]
    Collaborator(#[from] GenerateError),
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
    /// Another cycle holds the gate; this trigger was skipped.
    #[error("a growth cycle is already in flight")]
    CycleInFlight,
}

impl GrowError {
    /// True when the next trigger may simply try again.
    pub fn is_recoverable(&self) -> bool {
        match self {
            GrowError::NoEligibleCandidates
            | GrowError::Collaborator(_)
            | GrowError::CycleInFlight => true,
            GrowError::Graph(e) => !matches!(e, GraphError::Inconsistent(_)),
        }
    }
}

impl From<SelectError> for GrowError {
    fn from(e: SelectError) -> Self {
        match e {
            SelectError::NoEligibleCandidates => GrowError::NoEligibleCandidates,
        }
    }
}

/// Outcome of one committed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthReport {
    /// The node as committed (children empty at commit time).
    pub node: Node,
    /// Chosen parents in selection order.
    pub parents: Vec<NodeId>,
    /// True when the generator gave no usable score and the default was used.
    pub score_defaulted: bool,
}

/// Owns the graph and runs growth cycles against a [`Generator`].
pub struct GrowthEngine {
    store: Arc<RwLock<GraphStore>>,
    evaluations: RwLock<EvaluationLog>,
    generator: Arc<dyn Generator>,
    config: GrowthConfig,
    rng: std::sync::Mutex<StdRng>,
    gate: Mutex<()>,
    events: Option<mpsc::Sender<GrowthEvent>>,
}

impl GrowthEngine {
    /// Engine over an empty graph.
    pub fn new(generator: Arc<dyn Generator>, config: GrowthConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            store: Arc::new(RwLock::new(GraphStore::new())),
            evaluations: RwLock::new(EvaluationLog::new()),
            generator,
            config,
            rng: std::sync::Mutex::new(rng),
            gate: Mutex::new(()),
            events: None,
        }
    }

    /// Replaces the (empty) store with a shared one.
    pub fn with_store(mut self, store: Arc<RwLock<GraphStore>>) -> Self {
        self.store = store;
        self
    }

    /// Sends [`GrowthEvent`]s to `tx`. Sends never block; a full or closed channel drops them.
    pub fn with_events(mut self, tx: mpsc::Sender<GrowthEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.config
    }

    /// Shared handle to the store.
    pub fn store(&self) -> Arc<RwLock<GraphStore>> {
        Arc::clone(&self.store)
    }

    fn emit(&self, event: GrowthEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.try_send(event);
        }
    }

    /// Runs one cycle with parents picked by the configured strategy.
    pub async fn grow_once(&self) -> Result<GrowthReport, GrowError> {
        let Ok(_flight) = self.gate.try_lock() else {
            tracing::debug!("growth trigger skipped: cycle in flight");
            self.emit(GrowthEvent::CycleSkipped);
            return Err(GrowError::CycleInFlight);
        };
        let result = self.run_cycle().await;
        self.finish(result)
    }

    /// Alias of [`grow_once`](Self::grow_once) for UI callers.
    pub async fn request_growth(&self) -> Result<GrowthReport, GrowError> {
        self.grow_once().await
    }

    pub async fn on_request_growth(&self) -> Result<GrowthReport, GrowError> {
        self.grow_once().await
    }

    /// Grows one node from caller-chosen parents.
    ///
    /// Unknown parents fail with [`GraphError::NotFound`] before the generator is called.
    /// Duplicate ids are collapsed. Does not take the single-flight gate.
    pub async fn grow_from(&self, parent_ids: &[NodeId]) -> Result<GrowthReport, GrowError> {
        if parent_ids.is_empty() {
            return Err(GrowError::NoEligibleCandidates);
        }
        let mut parents: Vec<NodeId> = Vec::with_capacity(parent_ids.len());
        for id in parent_ids {
            if !parents.contains(id) {
                parents.push(id.clone());
            }
        }
        let contents = {
            let store = self.store.read().await;
            parents
                .iter()
                .map(|id| store.get_or_err(id).map(ParentContent::from))
                .collect::<Result<Vec<_>, _>>()?
        };
        let result = self.generate_and_commit(parents, contents).await;
        self.finish(result)
    }

    async fn run_cycle(&self) -> Result<GrowthReport, GrowError> {
        let snapshot = self.store.read().await.clone();
        let pool = annotate(&snapshot, self.config.alpha);
        let params = self.config.selector_params();
        let parents = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            select(self.config.strategy, &pool, &params, &mut rng)?
        };
        tracing::debug!(
            pool = pool.len(),
            strategy = ?self.config.strategy,
            parents = ?parents.iter().map(NodeId::as_str).collect::<Vec<_>>(),
            "parents selected"
        );
        let contents = parents
            .iter()
            .map(|id| snapshot.get_or_err(id).map(ParentContent::from))
            .collect::<Result<Vec<_>, _>>()?;
        self.generate_and_commit(parents, contents).await
    }

    async fn generate_and_commit(
        &self,
        parents: Vec<NodeId>,
        contents: Vec<ParentContent>,
    ) -> Result<GrowthReport, GrowError> {
        let request = GenerationRequest {
            parents: contents,
            instruction: self.config.instruction.clone(),
            criteria: self.config.criteria.clone(),
        };
        let generated = match self.config.generation_timeout {
            Some(limit) => tokio::time::timeout(limit, self.generator.generate(&request))
                .await
                .map_err(|_| GenerateError::Timeout(limit))??,
            None => self.generator.generate(&request).await?,
        };

        let (evaluation, score_defaulted) = match generated.score {
            Some(s) if is_valid_evaluation(s) => (s, false),
            _ => (DEFAULT_EVALUATION, true),
        };
        let new = NewNode::child(generated.title, generated.body, parents.clone())
            .with_evaluation(evaluation);
        let node = {
            let mut store = self.store.write().await;
            let id = store.add_node(new)?;
            store.get_or_err(&id)?.clone()
        };
        self.evaluations
            .write()
            .await
            .record(node.id.clone(), node.evaluation);

        tracing::info!(
            node_id = %node.id,
            title = %node.title,
            evaluation = node.evaluation,
            score_defaulted,
            parents = parents.len(),
            "node grown"
        );
        self.emit(GrowthEvent::NodeAdded {
            node_id: node.id.clone(),
            title: node.title.clone(),
            parents: parents.clone(),
            evaluation: node.evaluation,
        });
        Ok(GrowthReport {
            node,
            parents,
            score_defaulted,
        })
    }

    fn finish(&self, result: Result<GrowthReport, GrowError>) -> Result<GrowthReport, GrowError> {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "growth cycle failed");
            self.emit(GrowthEvent::CycleFailed {
                reason: e.to_string(),
            });
        }
        result
    }

    /// Adds a seed node with a generated id.
    pub async fn add_seed(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
        evaluation: f64,
    ) -> Result<NodeId, GraphError> {
        self.add_seed_node(NewNode::seed(title, body).with_evaluation(evaluation))
            .await
    }

    /// Adds a seed payload (explicit id allowed). Any parents on the payload are dropped.
    pub async fn add_seed_node(&self, new: NewNode) -> Result<NodeId, GraphError> {
        let new = NewNode {
            parents: vec![],
            ..new
        };
        let id = self.store.write().await.add_node(new)?;
        tracing::debug!(node_id = %id, "seed added");
        self.emit(GrowthEvent::SeedAdded {
            node_id: id.clone(),
        });
        Ok(id)
    }

    /// Adds every seed of `preset`. Stops at the first rejected seed.
    pub async fn load_preset(&self, preset: &Preset) -> Result<Vec<NodeId>, GraphError> {
        let mut ids = Vec::with_capacity(preset.seeds.len());
        for seed in preset.seed_nodes() {
            ids.push(self.add_seed_node(seed).await?);
        }
        Ok(ids)
    }

    /// Sets the evaluation of one node. Setting the same value twice is a no-op.
    pub async fn update_evaluation(&self, id: &NodeId, value: f64) -> Result<(), GraphError> {
        self.store.write().await.update_evaluation(id, value)?;
        self.emit(GrowthEvent::EvaluationUpdated {
            node_id: id.clone(),
            evaluation: value,
        });
        Ok(())
    }

    pub async fn on_update_evaluation(&self, id: &NodeId, value: f64) -> Result<(), GraphError> {
        self.update_evaluation(id, value).await
    }

    /// Snapshot of every node in insertion order.
    pub async fn all(&self) -> Vec<Node> {
        self.store.read().await.all()
    }

    pub async fn evaluation_log(&self) -> EvaluationLog {
        self.evaluations.read().await.clone()
    }

    /// Current UCT scores of the eligible pool (inspection only).
    pub async fn scores(&self) -> Vec<ScoredCandidate> {
        let snapshot = self.store.read().await.clone();
        let pool = annotate(&snapshot, self.config.alpha);
        uct_scores(&pool, &self.config.selector_params())
    }

    /// Nodes plus evaluation log, ready for [`export::write_json`](crate::export::write_json).
    pub async fn export(&self) -> GraphExport {
        GraphExport {
            nodes: self.all().await,
            evaluations: self.evaluation_log().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::GeneratedContent;
    use async_trait::async_trait;

    struct Fixed(Option<f64>);

    #[async_trait]
    impl Generator for Fixed {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> Result<GeneratedContent, GenerateError> {
            Ok(GeneratedContent {
                title: format!("child of {}", request.parents.len()),
                body: "grown".into(),
                score: self.0,
            })
        }
    }

    fn engine(score: Option<f64>) -> GrowthEngine {
        GrowthEngine::new(Arc::new(Fixed(score)), GrowthConfig::default())
    }

    #[test]
    fn every_grow_error_is_recoverable_except_inconsistency() {
        assert!(GrowError::NoEligibleCandidates.is_recoverable());
        assert!(GrowError::CycleInFlight.is_recoverable());
        assert!(GrowError::Graph(GraphError::NotFound("x".into())).is_recoverable());
        assert!(!GrowError::Graph(GraphError::Inconsistent("cycle".into())).is_recoverable());
    }

    /// **Scenario**: Empty graph yields NoEligibleCandidates and commits nothing.
    #[tokio::test]
    async fn empty_graph_has_no_candidates() {
        let e = engine(Some(0.9));
        assert!(matches!(
            e.grow_once().await,
            Err(GrowError::NoEligibleCandidates)
        ));
        assert!(e.all().await.is_empty());
        assert!(e.evaluation_log().await.is_empty());
    }

    /// **Scenario**: Out-of-range score falls back to 0.5 and is flagged.
    #[tokio::test]
    async fn out_of_range_score_defaults() {
        let e = engine(Some(1.5));
        e.add_seed("S", "seed", 0.5).await.unwrap();
        let report = e.grow_once().await.unwrap();
        assert!(report.score_defaulted);
        assert_eq!(report.node.evaluation, DEFAULT_EVALUATION);
    }

    #[tokio::test]
    async fn seed_payload_parents_are_dropped() {
        let e = engine(None);
        let a = e.add_seed("A", "a", 0.5).await.unwrap();
        let id = e
            .add_seed_node(NewNode::child("B", "b", vec![a]))
            .await
            .unwrap();
        let store = e.store();
        let store = store.read().await;
        assert!(store.get(&id).unwrap().is_seed());
    }

    #[tokio::test]
    async fn update_evaluation_rejects_nan_and_unknown() {
        let e = engine(None);
        let id = e.add_seed("A", "a", 0.5).await.unwrap();
        assert!(matches!(
            e.update_evaluation(&id, f64::NAN).await,
            Err(GraphError::OutOfRange { .. })
        ));
        assert!(matches!(
            e.on_update_evaluation(&"ghost".into(), 0.3).await,
            Err(GraphError::NotFound(_))
        ));
        e.update_evaluation(&id, 0.9).await.unwrap();
        e.update_evaluation(&id, 0.9).await.unwrap();
        assert_eq!(e.all().await[0].evaluation, 0.9);
    }
}
