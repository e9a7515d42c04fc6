//! Dependency Engine
//!
//! Frequency-weighted relations for the heuristic miner. For every pair in
//! weighted direct-follows the dependency measure quantifies causal
//! strength in `[-1, 1]`:
//!
//! - `a = b` or no reverse pair:  `|a>b| / (|a>b| + 1)`
//! - otherwise:                   `(|a>b| - |b>a|) / (|a>b| + |b>a| + 1)`
//!
//! Measures are rounded to two decimals for display. Threshold filtering
//! drops a pair from the frequency and measure maps in lockstep, producing
//! new maps rather than mutating the inputs.

use crate::config::Thresholds;
use crate::error::MineError;
use crate::event_log::{Activity, EventLog};
use crate::relations::{ActivityPair, OrderingRelations};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Dependency measure per weighted direct-follow pair.
pub fn measures(weighted_follows: &BTreeMap<ActivityPair, u64>) -> BTreeMap<ActivityPair, f64> {
    let mut out = BTreeMap::new();
    for ((a, b), &forward) in weighted_follows {
        let reverse = if a == b {
            None
        } else {
            weighted_follows.get(&(b.clone(), a.clone()))
        };
        let measure = match reverse {
            Some(&reverse) => {
                (forward as f64 - reverse as f64) / (forward as f64 + reverse as f64 + 1.0)
            }
            None => forward as f64 / (forward as f64 + 1.0),
        };
        out.insert((a.clone(), b.clone()), round_two_decimals(measure));
    }
    out
}

/// Weighted parallel pairs: `(a, b)` is parallel iff both directions appear
/// in direct-follows. The parallel frequency `min(|a>b|, |b>a|)` is
/// assigned symmetrically; a self-loop `(a, a)` is parallel with itself
/// with frequency `|a>a|`.
pub fn parallel_frequencies(
    weighted_follows: &BTreeMap<ActivityPair, u64>,
) -> BTreeMap<ActivityPair, u64> {
    let mut out = BTreeMap::new();
    for ((a, b), &forward) in weighted_follows {
        if let Some(&reverse) = weighted_follows.get(&(b.clone(), a.clone())) {
            out.insert((a.clone(), b.clone()), forward.min(reverse));
        }
    }
    out
}

/// Drop every pair below either threshold from both maps, in lockstep.
pub fn apply_thresholds(
    weighted_follows: &BTreeMap<ActivityPair, u64>,
    measures: &BTreeMap<ActivityPair, f64>,
    thresholds: &Thresholds,
) -> Result<(BTreeMap<ActivityPair, u64>, BTreeMap<ActivityPair, f64>), MineError> {
    thresholds.validate()?;
    let frequency_min = thresholds.direct_follows_min as u64;

    let keep = |pair: &ActivityPair| {
        weighted_follows[pair] >= frequency_min
            && measures[pair] >= thresholds.dependency_measure_min
    };

    let frequencies = weighted_follows
        .iter()
        .filter(|(pair, _)| keep(pair))
        .map(|(pair, &count)| (pair.clone(), count))
        .collect();
    let kept_measures = measures
        .iter()
        .filter(|(pair, _)| keep(pair))
        .map(|(pair, &measure)| (pair.clone(), measure))
        .collect();
    Ok((frequencies, kept_measures))
}

/// One edge of the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub source: Activity,
    pub target: Activity,
    pub frequency: u64,
    pub measure: f64,
}

/// The emitted dependency-graph description, after threshold filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub nodes: Vec<Activity>,
    pub edges: Vec<DependencyEdge>,
}

impl DependencyGraph {
    /// Build the graph for a log, filtering with the given thresholds.
    ///
    /// Filtering happens here, once, before emission; it never affects
    /// binding computation.
    pub fn build(log: &EventLog, thresholds: &Thresholds) -> Result<Self, MineError> {
        let relations = OrderingRelations::extract(log);
        let measures = measures(&relations.weighted_follows);
        let (frequencies, measures) =
            apply_thresholds(&relations.weighted_follows, &measures, thresholds)?;

        let edges = frequencies
            .iter()
            .map(|((source, target), &frequency)| DependencyEdge {
                source: source.clone(),
                target: target.clone(),
                frequency,
                measure: measures[&(source.clone(), target.clone())],
            })
            .collect();

        Ok(DependencyGraph {
            nodes: relations.activities.iter().cloned().collect(),
            edges,
        })
    }
}

/// Square dependency-measure matrix in canonical activity order.
///
/// Cell `(a, b)` holds `d(a, b)` when the pair exists, `-d(b, a)` when only
/// the reverse pair exists, and `0` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureMatrix {
    activities: Vec<Activity>,
    cells: Vec<f64>,
}

impl MeasureMatrix {
    pub fn build(log: &EventLog) -> Self {
        let relations = OrderingRelations::extract(log);
        let measures = measures(&relations.weighted_follows);
        let activities: Vec<Activity> = relations.activities.iter().cloned().collect();

        let mut cells = Vec::with_capacity(activities.len() * activities.len());
        for row in &activities {
            for column in &activities {
                let value = if let Some(&d) = measures.get(&(row.clone(), column.clone())) {
                    d
                } else if let Some(&d) = measures.get(&(column.clone(), row.clone())) {
                    -d
                } else {
                    0.0
                };
                cells.push(value);
            }
        }

        MeasureMatrix { activities, cells }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn value(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.activities.iter().position(|a| a == row)?;
        let c = self.activities.iter().position(|a| a == column)?;
        Some(self.cells[r * self.activities.len() + c])
    }
}

impl fmt::Display for MeasureMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .activities
            .iter()
            .map(|a| a.chars().count())
            .max()
            .unwrap_or(1)
            .max(5);

        write!(f, "{:width$}", "")?;
        for column in &self.activities {
            write!(f, " {column:>width$}")?;
        }
        writeln!(f)?;

        for (r, row) in self.activities.iter().enumerate() {
            write!(f, "{row:width$}")?;
            for c in 0..self.activities.len() {
                let value = self.cells[r * self.activities.len() + c];
                write!(f, " {value:>width$.2}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
