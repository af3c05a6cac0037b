//! # Grove
//!
//! Grows a directed acyclic graph of generated content items (research ideas, story plots,
//! fictional historical events). Each growth cycle picks parent nodes with a UCT score over
//! depth-decayed descendant statistics, asks a [`Generator`] for a new item derived from
//! them, and commits it as a child of every chosen parent.
//!
//! ## Growth cycle
//!
//! 1. Snapshot the [`GraphStore`] and annotate every node with [`descendant_stats`].
//! 2. Drop candidates whose parents are all under the branching threshold, then rank the rest
//!    with [`uct_scores`] and take the top `K` ([`select_parents`]).
//! 3. Call the generator with the parents' titles and bodies; no lock is held while waiting.
//! 4. Insert the new node, link it under its parents and record its evaluation.
//!
//! [`GrowthEngine`] runs single cycles; [`AutoGrower`] runs one per interval until stopped.
//!
//! ## Main modules
//!
//! - [`node`]: [`Node`], [`NodeId`], [`NewNode`].
//! - [`store`]: [`GraphStore`], [`GraphError`].
//! - [`aggregate`]: [`descendant_stats`], [`annotate`], [`Candidate`].
//! - [`select`]: [`select_parents`], [`uct_scores`], [`SelectionStrategy`].
//! - [`generate`]: [`Generator`] trait, [`LlmGenerator`] (writer + reviewer calls).
//! - [`llm`]: [`LlmClient`] trait, [`MockLlm`], [`ChatOpenAI`].
//! - [`grow`]: [`GrowthEngine`], [`AutoGrower`], [`GrowthEvent`], [`GrowError`].
//! - [`config`]: [`GrowthConfig`] and its `GROVE_*` environment mapping.
//! - [`preset`]: built-in paper, story and history presets.
//! - [`export`]: JSON export of nodes and the evaluation log.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod eval_log;
pub mod export;
pub mod generate;
pub mod grow;
pub mod llm;
pub mod message;
pub mod node;
pub mod preset;
pub mod select;
pub mod store;

pub use aggregate::{annotate, descendant_stats, Candidate, DescendantStats, DEFAULT_ALPHA};
pub use config::{ConfigError, GrowthConfig};
pub use error::LlmError;
pub use eval_log::{EvaluationLog, EvaluationRecord};
pub use export::{GraphExport, ExportError};
pub use generate::{
    GenerateError, GeneratedContent, GenerationRequest, Generator, LlmGenerator, ParentContent,
};
pub use grow::{
    AutoGrowHandle, AutoGrowSummary, AutoGrower, GrowError, GrowthEngine, GrowthEvent,
    GrowthReport,
};
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm};
pub use message::Message;
pub use node::{NewNode, Node, NodeId, DEFAULT_EVALUATION};
pub use preset::Preset;
pub use select::{
    select_parents, uct_scores, ScoredCandidate, SelectError, SelectionStrategy, SelectorParams,
};
pub use store::{GraphError, GraphStore};
