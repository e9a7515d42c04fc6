//! Event Log Data Model
//!
//! An event log is a finite collection of traces; a trace is an ordered
//! sequence of activity names recorded for one execution of a process.
//! The log also induces a multiset of traces (trace -> occurrence count),
//! which the heuristic miner uses to weight its relations; the alpha miner
//! only consumes the set-level information.
//!
//! All values are immutable after construction: the mining pipeline reads
//! the log, it never mutates it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An activity is an opaque identifier; equality and ordering are by value.
pub type Activity = String;

/// One recorded execution of the process.
pub type Trace = Vec<Activity>;

/// A finite collection of traces.
///
/// Empty traces are admitted but contribute nothing to any relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    traces: Vec<Trace>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        EventLog { traces: Vec::new() }
    }

    /// Build a log from already-ingested traces.
    ///
    /// The ingestion contract: each trace is a finite ordered sequence of
    /// non-empty activity strings; source-level attributes are discarded
    /// upstream.
    pub fn from_traces(traces: Vec<Trace>) -> Self {
        EventLog { traces }
    }

    /// All traces, in recording order.
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// Number of traces, counting duplicates and empty traces.
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// True when the log has no non-empty trace.
    pub fn is_empty(&self) -> bool {
        self.traces.iter().all(Vec::is_empty)
    }

    /// The induced trace multiset: distinct trace -> occurrence count.
    ///
    /// Empty traces are excluded; they carry no ordering information.
    pub fn trace_counts(&self) -> BTreeMap<Trace, u64> {
        let mut counts = BTreeMap::new();
        for trace in &self.traces {
            if trace.is_empty() {
                continue;
            }
            *counts.entry(trace.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Total occurrences per activity across the whole log.
    pub fn activity_counts(&self) -> BTreeMap<Activity, u64> {
        let mut counts = BTreeMap::new();
        for trace in &self.traces {
            for activity in trace {
                *counts.entry(activity.clone()).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl FromIterator<Trace> for EventLog {
    fn from_iter<I: IntoIterator<Item = Trace>>(iter: I) -> Self {
        EventLog::from_traces(iter.into_iter().collect())
    }
}
