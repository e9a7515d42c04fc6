//! Alpha Miner
//!
//! Synthesizes a Petri net from the qualitative ordering relations:
//!
//! 1. build candidate activity sets from the choice relation,
//! 2. keep the pairs `(A, B)` whose cross product lies in causality,
//! 3. reduce to maximal pairs under componentwise set inclusion,
//! 4. emit one place per maximal pair plus the synthetic source and sink,
//!    and connect everything with flows.
//!
//! The algorithm is total: any log yields a well-formed (possibly trivial)
//! net. A log with a single trace of length 1 produces `i_L -> a -> o_L`.

use crate::event_log::{Activity, EventLog};
use crate::relations::OrderingRelations;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A pair `(A, B)` of activity sets with internal choice and cross causality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbPair {
    pub sources: BTreeSet<Activity>,
    pub targets: BTreeSet<Activity>,
}

impl AbPair {
    /// True when `other` extends this pair componentwise with at least one
    /// strict inclusion.
    fn is_strictly_contained_in(&self, other: &AbPair) -> bool {
        self != other
            && self.sources.is_subset(&other.sources)
            && self.targets.is_subset(&other.targets)
    }
}

impl fmt::Display for AbPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<Activity>| set.iter().cloned().collect::<Vec<_>>().join(",");
        write!(f, "({{{}}},{{{}}})", join(&self.sources), join(&self.targets))
    }
}

/// A Petri-net place: the synthetic source, the synthetic sink, or a place
/// derived from a maximal AB-pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Place {
    Source,
    Sink,
    Between {
        sources: BTreeSet<Activity>,
        targets: BTreeSet<Activity>,
    },
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Source => write!(f, "i_L"),
            Place::Sink => write!(f, "o_L"),
            Place::Between { sources, targets } => {
                let pair = AbPair {
                    sources: sources.clone(),
                    targets: targets.clone(),
                };
                write!(f, "p{pair}")
            }
        }
    }
}

/// A node of the Petri net: an activity transition or a place.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PetriNode {
    Transition { name: Activity },
    Place { place: Place },
}

impl PetriNode {
    fn transition(name: &str) -> Self {
        PetriNode::Transition {
            name: name.to_string(),
        }
    }

    fn place(place: &Place) -> Self {
        PetriNode::Place {
            place: place.clone(),
        }
    }
}

impl fmt::Display for PetriNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PetriNode::Transition { name } => write!(f, "{name}"),
            PetriNode::Place { place } => write!(f, "{place}"),
        }
    }
}

/// A directed flow between a transition and a place (or vice versa).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Flow {
    pub source: PetriNode,
    pub target: PetriNode,
}

/// The emitted Petri-net description.
///
/// `places` is ordered: source, pair places in canonical order, sink.
/// `flows` is deduplicated and sorted by source then target label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetriNet {
    pub transitions: BTreeSet<Activity>,
    pub places: Vec<Place>,
    pub flows: Vec<Flow>,
}

/// The maximal AB-pairs of a log's relations: candidate enumeration
/// followed by reduction to the maximal anti-chain.
pub fn maximal_ab_pairs(relations: &OrderingRelations) -> Vec<AbPair> {
    maximal_pairs(ab_pairs(relations))
}

/// Discover a Petri net from an event log.
pub fn discover(log: &EventLog) -> PetriNet {
    let relations = OrderingRelations::extract(log);
    let pairs = maximal_ab_pairs(&relations);

    tracing::debug!(
        activities = relations.activities.len(),
        maximal_pairs = pairs.len(),
        "alpha_discovery"
    );

    let mut places = vec![Place::Source];
    places.extend(pairs.iter().map(|pair| Place::Between {
        sources: pair.sources.clone(),
        targets: pair.targets.clone(),
    }));
    places.push(Place::Sink);

    let mut flows = BTreeSet::new();
    for activity in &relations.initial {
        flows.insert(Flow {
            source: PetriNode::place(&Place::Source),
            target: PetriNode::transition(activity),
        });
    }
    for activity in &relations.last {
        flows.insert(Flow {
            source: PetriNode::transition(activity),
            target: PetriNode::place(&Place::Sink),
        });
    }
    for pair in &pairs {
        let place = Place::Between {
            sources: pair.sources.clone(),
            targets: pair.targets.clone(),
        };
        for a in &pair.sources {
            flows.insert(Flow {
                source: PetriNode::transition(a),
                target: PetriNode::place(&place),
            });
        }
        for b in &pair.targets {
            flows.insert(Flow {
                source: PetriNode::place(&place),
                target: PetriNode::transition(b),
            });
        }
    }

    let mut flows: Vec<Flow> = flows.into_iter().collect();
    flows.sort_by_key(|flow| (flow.source.to_string(), flow.target.to_string()));

    PetriNet {
        transitions: relations.activities.clone(),
        places,
        flows,
    }
}

/// The coarse candidate family derived from choice: one singleton per
/// reflexive choice pair, and one two-element set per distinct symmetric
/// choice pair whose members are both reflexive-choice themselves.
///
/// Singletons are always included, even for activities that also appear in
/// non-reflexive choice pairs.
fn candidate_sets(relations: &OrderingRelations) -> Vec<BTreeSet<Activity>> {
    let reflexive = |a: &Activity| relations.choice.contains(&(a.clone(), a.clone()));

    let mut candidates: Vec<BTreeSet<Activity>> = Vec::new();
    for a in &relations.activities {
        if reflexive(a) {
            candidates.push(BTreeSet::from([a.clone()]));
        }
    }
    for (a, b) in &relations.choice {
        if a < b && reflexive(a) && reflexive(b) {
            candidates.push(BTreeSet::from([a.clone(), b.clone()]));
        }
    }
    candidates
}

/// All AB-pairs over the candidate family: every `(a, b)` in `A x B` must
/// be in causality.
fn ab_pairs(relations: &OrderingRelations) -> Vec<AbPair> {
    let candidates = candidate_sets(relations);
    let mut pairs = Vec::new();

    for sources in &candidates {
        for targets in &candidates {
            let all_causal = sources.iter().all(|a| {
                targets
                    .iter()
                    .all(|b| relations.causality.contains(&(a.clone(), b.clone())))
            });
            if all_causal {
                pairs.push(AbPair {
                    sources: sources.clone(),
                    targets: targets.clone(),
                });
            }
        }
    }
    pairs
}

/// Retain only the maximal pairs under componentwise inclusion. Maximal
/// elements form an anti-chain; equal pairs are deduplicated by set
/// equality.
fn maximal_pairs(pairs: Vec<AbPair>) -> Vec<AbPair> {
    let distinct: BTreeSet<AbPair> = pairs.into_iter().collect();
    distinct
        .iter()
        .filter(|pair| {
            !distinct
                .iter()
                .any(|other| pair.is_strictly_contained_in(other))
        })
        .cloned()
        .collect()
}
