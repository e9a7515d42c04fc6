//! Ordering Relation Extraction
//!
//! First stage of both miners: from the raw traces, derive the qualitative
//! ordering relations over activities.
//!
//! The base relation is direct-follows `a > b` (`b` immediately follows `a`
//! somewhere in some trace). From it:
//!
//! - causality `a -> b`:  `a > b` and not `b > a`
//! - parallel  `a || b`:  `a > b` and `b > a`
//! - choice    `a  # b`:  neither `a > b` nor `b > a`
//!
//! The three derived relations partition `Activities x Activities`. An
//! activity that directly follows itself is parallel with itself, not in
//! choice; the reflexive choice pair `(a, a)` only exists when `a` never
//! self-follows.

use crate::event_log::{Activity, EventLog};
use std::collections::{BTreeMap, BTreeSet};

/// Ordered pair of activities.
pub type ActivityPair = (Activity, Activity);

/// The complete relation bundle extracted from an event log.
///
/// `weighted_follows` has the same keys as `direct_follows`; its values are
/// adjacency counts summed over traces and weighted by trace multiplicity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderingRelations {
    pub activities: BTreeSet<Activity>,
    pub initial: BTreeSet<Activity>,
    pub last: BTreeSet<Activity>,
    pub direct_follows: BTreeSet<ActivityPair>,
    pub weighted_follows: BTreeMap<ActivityPair, u64>,
    pub causality: BTreeSet<ActivityPair>,
    pub parallel: BTreeSet<ActivityPair>,
    pub choice: BTreeSet<ActivityPair>,
}

impl OrderingRelations {
    /// Extract all relations in a single pass over the trace multiset.
    pub fn extract(log: &EventLog) -> Self {
        let mut relations = OrderingRelations::default();

        for (trace, multiplicity) in log.trace_counts() {
            if let Some(first) = trace.first() {
                relations.initial.insert(first.clone());
            }
            if let Some(last) = trace.last() {
                relations.last.insert(last.clone());
            }
            for activity in &trace {
                relations.activities.insert(activity.clone());
            }
            for window in trace.windows(2) {
                let pair = (window[0].clone(), window[1].clone());
                *relations.weighted_follows.entry(pair.clone()).or_insert(0) += multiplicity;
                relations.direct_follows.insert(pair);
            }
        }

        for a in &relations.activities {
            for b in &relations.activities {
                let forward = relations.direct_follows.contains(&(a.clone(), b.clone()));
                let backward = relations.direct_follows.contains(&(b.clone(), a.clone()));
                match (forward, backward) {
                    (true, true) => {
                        relations.parallel.insert((a.clone(), b.clone()));
                    }
                    (true, false) => {
                        relations.causality.insert((a.clone(), b.clone()));
                    }
                    (false, false) => {
                        relations.choice.insert((a.clone(), b.clone()));
                    }
                    // the symmetric visit inserts the causality pair
                    (false, true) => {}
                }
            }
        }

        tracing::debug!(
            activities = relations.activities.len(),
            direct_follows = relations.direct_follows.len(),
            causality = relations.causality.len(),
            parallel = relations.parallel.len(),
            "ordering_relations_extracted"
        );

        relations
    }

    /// True when `(a, a)` is in direct-follows, i.e. `a` is parallel with itself.
    pub fn is_self_parallel(&self, activity: &str) -> bool {
        self.parallel
            .contains(&(activity.to_string(), activity.to_string()))
    }

    /// Ingoing neighbourhood of `t`: all `a` with `a > t`.
    pub fn inputs_of(&self, t: &str) -> BTreeSet<Activity> {
        self.direct_follows
            .iter()
            .filter(|(_, target)| target == t)
            .map(|(source, _)| source.clone())
            .collect()
    }

    /// Outgoing neighbourhood of `t`: all `b` with `t > b`.
    pub fn outputs_of(&self, t: &str) -> BTreeSet<Activity> {
        self.direct_follows
            .iter()
            .filter(|(source, _)| source == t)
            .map(|(_, target)| target.clone())
            .collect()
    }
}
