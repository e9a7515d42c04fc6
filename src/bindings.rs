//! Binding Engine
//!
//! For every activity `t`, enumerate the candidate input and output
//! bindings (non-empty subsets of the ingoing/outgoing neighbourhood) and
//! filter them down to the bindings the log actually evidences:
//!
//! 1. a singleton `{x}` whose adjacency is fully explained by parallelism
//!    between `t` and `x` is discarded;
//! 2. a singleton `{x}` absorbed by a larger parallel pair `(x, y)` is
//!    discarded;
//! 3. a multi-element binding survives only when some permutation of its
//!    members occurs contiguously next to `t` in at least one trace.
//!
//! Frequencies: a multi-element binding's witness minimum is the smallest
//! occurrence count over the orderings that actually occur; its emitted
//! frequency is that minimum times the binding size. A singleton keeps the
//! adjacency count minus what retained multi-element bindings consume.
//!
//! Enumeration is exponential in fan-in/out, so each side is gated by a
//! configurable ceiling; activities fan out across rayon.

use crate::error::MineError;
use crate::event_log::{Activity, EventLog, Trace};
use crate::relations::{ActivityPair, OrderingRelations};
use crate::dependency::parallel_frequencies;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which side of a node a binding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Input,
    Output,
}

/// One retained binding of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub members: BTreeSet<Activity>,
    /// Witness minimum for multi-element bindings; the standalone residue
    /// for singletons.
    pub witness_min: u64,
    /// Emitted frequency: `witness_min * |members|` for multi-element
    /// bindings, the residue itself for singletons.
    pub frequency: u64,
}

impl Binding {
    pub fn is_multi(&self) -> bool {
        self.members.len() > 1
    }
}

/// A labelled dot position of a multi-element binding.
///
/// Indices are sequential per node and side, in encounter order (bindings
/// in canonical order, members in sorted order). Output positions are
/// labelled `t-x_i`, input positions `i x-t`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Index into the side's `bindings` vector.
    pub binding: usize,
    pub activity: Activity,
    pub index: usize,
    pub label: String,
    pub frequency: u64,
}

/// Retained bindings and dot positions of one side of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideBindings {
    pub bindings: Vec<Binding>,
    pub positions: Vec<Position>,
}

impl SideBindings {
    /// Dot positions that sit on the arc towards (or from) `neighbour`.
    pub fn positions_for(&self, neighbour: &str) -> Vec<&Position> {
        self.positions
            .iter()
            .filter(|position| position.activity == neighbour)
            .collect()
    }
}

/// Input and output bindings of one activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBindings {
    pub input: SideBindings,
    pub output: SideBindings,
}

/// All retained bindings of a log, per activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSet {
    pub nodes: BTreeMap<Activity, NodeBindings>,
}

/// One binding in the labelled report: member labels plus frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledBinding {
    pub members: Vec<String>,
    pub frequency: u64,
}

/// The labelled binding report: per node, the retained bindings with
/// position labels for multi-element members. Singletons whose residue
/// dropped to zero are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingReport {
    pub input: BTreeMap<Activity, Vec<LabelledBinding>>,
    pub output: BTreeMap<Activity, Vec<LabelledBinding>>,
}

impl BindingSet {
    /// Derive bindings for every activity of the log.
    pub fn derive(
        log: &EventLog,
        relations: &OrderingRelations,
        max_fan_out: usize,
    ) -> Result<Self, MineError> {
        let parallel = parallel_frequencies(&relations.weighted_follows);
        let trace_counts = log.trace_counts();
        let activities: Vec<Activity> = relations.activities.iter().cloned().collect();

        let nodes = activities
            .par_iter()
            .map(|t| -> Result<(Activity, NodeBindings), MineError> {
                let node = derive_node(t, relations, &parallel, &trace_counts, max_fan_out)?;
                Ok((t.clone(), node))
            })
            .collect::<Result<BTreeMap<_, _>, MineError>>()?;

        tracing::debug!(nodes = nodes.len(), "bindings_derived");
        Ok(BindingSet { nodes })
    }

    pub fn node(&self, activity: &str) -> Option<&NodeBindings> {
        self.nodes.get(activity)
    }

    /// Produce the labelled report for display and emission.
    pub fn labelled(&self) -> BindingReport {
        let mut report = BindingReport::default();
        for (activity, node) in &self.nodes {
            let input = labelled_side(&node.input);
            let output = labelled_side(&node.output);
            if !input.is_empty() {
                report.input.insert(activity.clone(), input);
            }
            if !output.is_empty() {
                report.output.insert(activity.clone(), output);
            }
        }
        report
    }
}

fn labelled_side(side: &SideBindings) -> Vec<LabelledBinding> {
    side.bindings
        .iter()
        .enumerate()
        .filter(|(_, binding)| binding.is_multi() || binding.frequency > 0)
        .map(|(index, binding)| {
            let members = if binding.is_multi() {
                side.positions
                    .iter()
                    .filter(|position| position.binding == index)
                    .map(|position| position.label.clone())
                    .collect()
            } else {
                binding.members.iter().cloned().collect()
            };
            LabelledBinding {
                members,
                frequency: binding.frequency,
            }
        })
        .collect()
}

fn derive_node(
    t: &Activity,
    relations: &OrderingRelations,
    parallel: &BTreeMap<ActivityPair, u64>,
    trace_counts: &BTreeMap<Trace, u64>,
    max_fan_out: usize,
) -> Result<NodeBindings, MineError> {
    let inputs = relations.inputs_of(t);
    let outputs = relations.outputs_of(t);

    for (neighbours, direction) in [(&inputs, "in"), (&outputs, "out")] {
        if neighbours.len() > max_fan_out {
            return Err(MineError::FanOutExceeded {
                activity: t.clone(),
                direction: direction.to_string(),
                fan_out: neighbours.len(),
                ceiling: max_fan_out,
            });
        }
    }

    Ok(NodeBindings {
        input: derive_side(
            t,
            &inputs,
            Direction::Input,
            relations,
            parallel,
            trace_counts,
        ),
        output: derive_side(
            t,
            &outputs,
            Direction::Output,
            relations,
            parallel,
            trace_counts,
        ),
    })
}

fn derive_side(
    t: &Activity,
    neighbours: &BTreeSet<Activity>,
    direction: Direction,
    relations: &OrderingRelations,
    parallel: &BTreeMap<ActivityPair, u64>,
    trace_counts: &BTreeMap<Trace, u64>,
) -> SideBindings {
    let mut bindings: Vec<Binding> = Vec::new();

    // multi-element candidates first: singleton residues depend on them
    for members in subsets(neighbours) {
        if members.len() < 2 {
            continue;
        }
        let witnesses = witness_counts(t, &members, direction, trace_counts);
        if let Some(&minimum) = witnesses.values().min() {
            bindings.push(Binding {
                frequency: minimum * members.len() as u64,
                witness_min: minimum,
                members,
            });
        }
    }

    for x in neighbours {
        if singleton_absorbed(t, x, direction, relations, parallel) {
            continue;
        }
        let adjacency = adjacency_count(t, x, direction, relations);
        let consumed: u64 = bindings
            .iter()
            .filter(|binding| binding.members.contains(x))
            .map(|binding| binding.witness_min)
            .sum();
        let residue = adjacency.saturating_sub(consumed);
        bindings.push(Binding {
            members: BTreeSet::from([x.clone()]),
            witness_min: residue,
            frequency: residue,
        });
    }

    bindings.sort_by(|left, right| left.members.cmp(&right.members));

    let mut positions = Vec::new();
    let mut index = 0;
    for (binding_index, binding) in bindings.iter().enumerate() {
        if !binding.is_multi() {
            continue;
        }
        for member in &binding.members {
            index += 1;
            let label = match direction {
                Direction::Output => format!("{t}-{member}_{index}"),
                Direction::Input => format!("{index} {member}-{t}"),
            };
            positions.push(Position {
                binding: binding_index,
                activity: member.clone(),
                index,
                label,
                frequency: binding.witness_min,
            });
        }
    }

    SideBindings {
        bindings,
        positions,
    }
}

/// Weighted adjacency count between `t` and a neighbour, respecting the
/// side: `|t>x|` for output bindings, `|x>t|` for input bindings.
fn adjacency_count(
    t: &Activity,
    x: &Activity,
    direction: Direction,
    relations: &OrderingRelations,
) -> u64 {
    let key = match direction {
        Direction::Output => (t.clone(), x.clone()),
        Direction::Input => (x.clone(), t.clone()),
    };
    relations.weighted_follows.get(&key).copied().unwrap_or(0)
}

/// Filter rules 1 and 2: is the singleton `{x}` of `t` fully explained by
/// parallelism rather than by a standalone causal binding?
fn singleton_absorbed(
    t: &Activity,
    x: &Activity,
    direction: Direction,
    relations: &OrderingRelations,
    parallel: &BTreeMap<ActivityPair, u64>,
) -> bool {
    if x == t {
        return false;
    }
    let adjacency = adjacency_count(t, x, direction, relations);
    let pair = match direction {
        Direction::Output => (t.clone(), x.clone()),
        Direction::Input => (x.clone(), t.clone()),
    };

    // rule 1: the direct-follow is entirely explained by parallelism with x
    if let Some(&parallel_frequency) = parallel.get(&pair) {
        return adjacency == parallel_frequency;
    }

    // rule 2: x is absorbed by a larger parallel pair (x, y)
    for ((p, y), &parallel_frequency) in parallel {
        if p != x || y == x || parallel.contains_key(&(y.clone(), y.clone())) {
            continue;
        }
        let to_y = match direction {
            Direction::Output => relations.weighted_follows.get(&(t.clone(), y.clone())),
            Direction::Input => relations.weighted_follows.get(&(y.clone(), t.clone())),
        };
        if let Some(&to_y) = to_y {
            if adjacency == adjacency.min(to_y).min(parallel_frequency) {
                return true;
            }
        }
    }
    false
}

/// Count the witnessing windows of a multi-element binding, keyed by the
/// observed ordering and weighted by trace multiplicity.
///
/// A window next to an occurrence of `t` witnesses the binding iff its
/// sorted form equals the sorted member set; only orderings that actually
/// occur are counted, which makes the minimum deterministic without
/// enumerating permutations.
fn witness_counts(
    t: &Activity,
    members: &BTreeSet<Activity>,
    direction: Direction,
    trace_counts: &BTreeMap<Trace, u64>,
) -> BTreeMap<Vec<Activity>, u64> {
    let size = members.len();
    let sorted: Vec<&Activity> = members.iter().collect();
    let mut counts: BTreeMap<Vec<Activity>, u64> = BTreeMap::new();

    for (trace, &multiplicity) in trace_counts {
        for (position, event) in trace.iter().enumerate() {
            if event != t {
                continue;
            }
            let window = match direction {
                Direction::Output => {
                    if position + size < trace.len() {
                        &trace[position + 1..=position + size]
                    } else {
                        continue;
                    }
                }
                Direction::Input => {
                    if position >= size {
                        &trace[position - size..position]
                    } else {
                        continue;
                    }
                }
            };
            let mut window_sorted: Vec<&Activity> = window.iter().collect();
            window_sorted.sort();
            if window_sorted == sorted {
                *counts.entry(window.to_vec()).or_insert(0) += multiplicity;
            }
        }
    }
    counts
}

/// All non-empty subsets of `items`, smallest bitmask first.
fn subsets(items: &BTreeSet<Activity>) -> Vec<BTreeSet<Activity>> {
    let items: Vec<&Activity> = items.iter().collect();
    let mut out = Vec::new();
    for mask in 1u64..(1u64 << items.len()) {
        let subset: BTreeSet<Activity> = items
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1u64 << bit) != 0)
            .map(|(_, activity)| (*activity).clone())
            .collect();
        out.push(subset);
    }
    out
}
