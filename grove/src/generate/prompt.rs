//! Prompt templates for the writer and reviewer calls.

use super::{GeneratedContent, ParentContent};

/// Instruction used when none is configured.
pub const DEFAULT_INSTRUCTION: &str = "Generate a new research paper title and abstract. \
Get inspiration from the research of the given papers, but make sure to clearly state your \
novelty and contributions.";

/// Review criteria used when none are configured.
pub const DEFAULT_CRITERIA: &str = "Novelty, Impact, Technical Soundness, Clarity.";

pub(super) const WRITER_SYSTEM: &str =
    "You write new items inspired by prior ones. Reply with a single JSON object and nothing else.";

pub(super) const REVIEWER_SYSTEM: &str =
    "You are a harsh but fair reviewer. Reply with a single JSON object and nothing else.";

/// User prompt for the writer call.
pub(super) fn writer_prompt(parents: &[ParentContent], instruction: &str) -> String {
    let works: Vec<String> = parents
        .iter()
        .map(|p| format!("# Prior Related Works\nTitle: {}\nAbstract: {}\n", p.title, p.body))
        .collect();
    format!(
        "{}\n# Task\n{}\n\nReturn the response in the following JSON format:\n\
{{\n  \"title\": \"...\",\n  \"abstract\": \"...\"\n}}\n",
        works.join("\n"),
        instruction.trim()
    )
}

/// User prompt for the reviewer call.
pub(super) fn reviewer_prompt(item: &GeneratedContent, criteria: &str) -> String {
    format!(
        "# Generated Item\nTitle: {}\nAbstract: {}\n\n# Task\n\
As a harsh reviewer, evaluate the generated title and abstract based on the following criteria:\n\
{}\n\n\
Provide a critical, harsh yet valid evaluation comment and an evaluation score (0-100).\n\n\
Return the response in the following JSON format:\n\
{{\n  \"comments\": \"...\",\n  \"score\": int from 0 to 100. Make 50 the default average score.\n}}\n",
        item.title,
        item.body,
        criteria.trim()
    )
}
