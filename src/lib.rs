//! # Tracemine Process Mining Engine
//!
//! Tracemine reconstructs a formal model of a business process from an
//! event log: a collection of recorded execution traces. Two discovery
//! algorithms are implemented:
//!
//! - the **alpha miner**, which derives a Petri net from the qualitative
//!   ordering relations of the log, and
//! - the **heuristic miner**, which derives a dependency graph and a
//!   causal net from frequency-weighted relations robust to noise.
//!
//! ## Pipeline Architecture
//!
//! ```text
//! Event Log (traces)
//!     ↓
//! [Relation Extractor]   → direct-follows, causality, parallel, choice
//!     ↓
//!     ├── [Footprint Builder]   → relation matrix
//!     ├── [Alpha Engine]        → AB-pairs → places & flows → Petri net
//!     └── [Dependency Engine]   → measures, thresholds → dependency graph
//!             ↓
//!         [Binding Engine]      → retained input/output bindings
//!             ↓
//!         [Net Assembler]       → causal-net nodes & edges
//! ```
//!
//! The pipeline is pure: traces in, descriptions out, no shared mutable
//! state. The emitted descriptions (Petri net, dependency graph, causal
//! net) are value types a renderer can consume; the engine itself performs
//! no I/O.
//!
//! ## Usage
//!
//! ### Alpha miner
//! ```rust
//! use tracemine::{AlphaMiner, EventLog};
//!
//! let log = EventLog::from_traces(vec![
//!     vec!["a".into(), "b".into(), "d".into()],
//!     vec!["a".into(), "c".into(), "d".into()],
//! ]);
//!
//! let miner = AlphaMiner::new();
//! let net = miner.discover(&log);
//! assert!(net.transitions.contains("a"));
//!
//! let footprint = miner.footprint(&log);
//! println!("{footprint}");
//! ```
//!
//! ### Heuristic miner
//! ```rust
//! use tracemine::{EventLog, HeuristicMiner};
//!
//! let log = EventLog::from_traces(vec![
//!     vec!["write".into(), "print".into(), "deliver".into()],
//! ]);
//!
//! let miner = HeuristicMiner::new();
//! let graph = miner.dependency_graph(&log).unwrap();
//! let cnet = miner.causal_net(&log).unwrap();
//! assert_eq!(graph.edges.len(), 2);
//! assert!(cnet.nodes.contains_key("write"));
//! ```
//!
//! ## Module Organization
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `event_log` | trace and log data model |
//! | `relations` | ordering relation extraction |
//! | `footprint` | qualitative relation matrix |
//! | `alpha` | AB-pair synthesis and Petri-net emission |
//! | `dependency` | dependency measures, thresholds, graph emission |
//! | `bindings` | input/output binding enumeration and filtering |
//! | `cnet` | causal-net assembly |
//! | `config` | configuration system |
//! | `error` | error types |

pub mod alpha;
pub mod bindings;
pub mod cnet;
pub mod config;
pub mod dependency;
pub mod error;
pub mod event_log;
pub mod footprint;
pub mod relations;

// Re-export public types
pub use alpha::{AbPair, Flow, PetriNet, PetriNode, Place};
pub use bindings::{Binding, BindingReport, BindingSet, Direction, LabelledBinding};
pub use cnet::{CausalNet, CnetEdge, EdgeKind};
pub use config::{Config, LoggingConfig, MiningConfig, Thresholds};
pub use dependency::{DependencyEdge, DependencyGraph, MeasureMatrix};
pub use error::MineError;
pub use event_log::{Activity, EventLog, Trace};
pub use footprint::{Footprint, RelationSymbol};
pub use relations::OrderingRelations;

/// Alpha miner facade.
///
/// Stateless: the alpha algorithm uses only set-level information and is
/// total over well-formed logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaMiner;

impl AlphaMiner {
    pub fn new() -> Self {
        AlphaMiner
    }

    /// Discover a Petri net from the log.
    pub fn discover(&self, log: &EventLog) -> PetriNet {
        alpha::discover(log)
    }

    /// Build the footprint matrix of the log.
    pub fn footprint(&self, log: &EventLog) -> Footprint {
        Footprint::build(&OrderingRelations::extract(log))
    }
}

/// Heuristic miner facade.
///
/// Carries the mining configuration: dependency-graph thresholds and the
/// binding fan-out ceiling. Thresholds apply to dependency-graph emission
/// only, never to binding computation.
#[derive(Debug, Clone, Default)]
pub struct HeuristicMiner {
    config: MiningConfig,
}

impl HeuristicMiner {
    /// Create a miner with default configuration.
    pub fn new() -> Self {
        HeuristicMiner {
            config: MiningConfig::default(),
        }
    }

    /// Create a miner with a custom configuration.
    pub fn with_config(config: MiningConfig) -> Self {
        HeuristicMiner { config }
    }

    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    /// Emit the dependency graph after threshold filtering.
    pub fn dependency_graph(&self, log: &EventLog) -> Result<DependencyGraph, MineError> {
        DependencyGraph::build(log, &self.config.thresholds)
    }

    /// Build the dependency-measure matrix (unfiltered).
    pub fn measure_matrix(&self, log: &EventLog) -> MeasureMatrix {
        MeasureMatrix::build(log)
    }

    /// Derive the retained input/output bindings of every activity.
    pub fn bindings(&self, log: &EventLog) -> Result<BindingSet, MineError> {
        let relations = OrderingRelations::extract(log);
        BindingSet::derive(log, &relations, self.config.max_fan_out)
    }

    /// Assemble the causal-net description.
    pub fn causal_net(&self, log: &EventLog) -> Result<CausalNet, MineError> {
        let relations = OrderingRelations::extract(log);
        let bindings = BindingSet::derive(log, &relations, self.config.max_fan_out)?;
        Ok(cnet::assemble(log, &relations, &bindings))
    }
}
