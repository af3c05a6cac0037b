//! Built-in domain presets: an instruction, review criteria and a set of seed nodes.

use crate::node::{NewNode, NodeId};

/// One domain preset.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub instruction: &'static str,
    pub criteria: &'static str,
    /// Evaluation given to every seed.
    pub seed_evaluation: f64,
    /// `(title, body)` pairs; seed ids are `s1`, `s2`, ... in this order.
    pub seeds: &'static [(&'static str, &'static str)],
}

impl Preset {
    /// Seed payloads with ids `s1..sN`.
    pub fn seed_nodes(&self) -> Vec<NewNode> {
        self.seeds
            .iter()
            .enumerate()
            .map(|(i, (title, body))| {
                NewNode::seed(*title, *body)
                    .with_id(NodeId::new(format!("s{}", i + 1)))
                    .with_evaluation(self.seed_evaluation)
            })
            .collect()
    }
}

pub const PAPER: Preset = Preset {
    name: "paper",
    description: "Research paper titles and abstracts",
    instruction: "Generate a new paper title and abstract based on the provided examples. Get \
inspiration from the given content, but make sure to clearly state your novelty and contributions.",
    criteria: "Novelty, Impact, Technical Soundness, Clarity.",
    seed_evaluation: 1.0,
    seeds: &[
        (
            "Spacetime: Enabling Fluid Individual and Collaborative Editing in Virtual Reality",
            "A scene editing tool for virtual reality that lets users move between individual and \
collaborative editing by parallelizing and merging their own and others' changes in space and time.",
        ),
        (
            "Remixed Reality: Manipulating Space and Time in Augmented Reality",
            "A mixed reality form where users see a live 3D reconstruction of their environment from \
external depth cameras, which lets the scene be changed in space and time.",
        ),
        (
            "Comparing Synchronous and Asynchronous Task Delivery in Mixed Reality Environments",
            "A study of how recipients process task instructions delivered synchronously versus \
asynchronously inside mixed reality, and how delivery mode affects performance and workload.",
        ),
        (
            "On the Emergence of Symmetrical Reality",
            "A framework in which physical and virtual agents perceive and act on a shared world \
symmetrically, extending virtual, mixed and augmented reality to human-AI coexistence.",
        ),
        (
            "Causality-preserving Asynchronous Reality",
            "A mixed reality system that records physical interruptions while the user is immersed \
and replays them later in causal order, so focused work is not broken by real-world events.",
        ),
        (
            "Asynchronously Assigning, Monitoring, and Managing Assembly Goals in Virtual Reality for High-Level Robot Teleoperation",
            "A virtual reality interface for robot teleoperation where users place virtual replicas \
of task objects to assign multiple assembly goals and monitor the robot as it completes them.",
        ),
    ],
};

pub const STORY: Preset = Preset {
    name: "story",
    description: "Fiction story plots",
    instruction: "Generate a new fiction story plot based on the provided examples. Get inspiration \
from the given content, but make sure to create a *new* engaging plot and well-developed characters.",
    criteria: "Engagement, Plot, Characters, Writing Style",
    seed_evaluation: 0.5,
    seeds: &[
        (
            "The Last of the Time Travelers",
            "In 2050 time travel exists for a select few. A young scientist, Alex, learns the \
government uses it to rewrite history and goes back to stop them.",
        ),
        (
            "The Memory Thief",
            "In a world where memories are traded, Olivia finds she can steal them and is pulled \
into an underground market run by the wealthy and powerful.",
        ),
        (
            "The Quantum Conspiracy",
            "When a renowned quantum physicist dies under mysterious circumstances, his former \
student Jack uncovers a plot to use quantum technology for control.",
        ),
        (
            "The Immortality Gene",
            "Biologist Liam discovers a gene that may hold the key to immortality and becomes the \
target of a biotech corporation that wants it buried.",
        ),
        (
            "The Phantom Vector",
            "In 2075 a virus makes colonists across the solar system vanish without a trace, and a \
team of scientists and soldiers races to find its origin.",
        ),
        (
            "The Fractal Paradox",
            "Mathematician Eve finds a pattern in the stock market that predicts the future and \
realizes it is a fractal spanning multiple dimensions.",
        ),
    ],
};

pub const HISTORY: Preset = Preset {
    name: "history",
    description: "Fictional historical events caused by real ones",
    instruction: "Imagine and generate a fictional new historical event that would happen *as a \
consequence* of all the provided events. Make sure to clearly state the historical connection - \
why and how the provided events will cause your new event. Also explicitly state the year of the event.",
    criteria: "Historical Realisticness, Clarity, Relevance",
    seed_evaluation: 0.5,
    seeds: &[
        (
            "The Cuban Missile Crisis (1962)",
            "In October 1962 the United States and the Soviet Union came to the brink of nuclear \
war over Soviet missiles in Cuba, resolved after a 13-day standoff.",
        ),
        (
            "The Civil Rights Act of 1964 (1964)",
            "Landmark legislation outlawing discrimination based on race, color, religion, sex, or \
national origin, ending segregation in public places.",
        ),
        (
            "The Moon Landing (1969)",
            "On July 20, 1969, Neil Armstrong and Buzz Aldrin became the first humans to walk on the \
moon, a defining moment of the Space Race.",
        ),
        (
            "The Fall of the Berlin Wall (1989)",
            "On November 9, 1989, the wall dividing East and West Germany since 1961 was opened, \
marking the end of the Cold War in Europe.",
        ),
        (
            "The Collapse of the Soviet Union (1991)",
            "In December 1991 the Soviet Union dissolved, giving rise to new independent states and \
a major shift in global politics.",
        ),
        (
            "The September 11 Attacks (2001)",
            "Terrorist attacks on the United States killed nearly 3,000 people and led to the \
\"War on Terror\", reshaping global politics and security.",
        ),
    ],
};

/// All built-in presets.
pub const PRESETS: &[Preset] = &[PAPER, STORY, HISTORY];

/// Looks up a preset by name (case-insensitive).
pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}
