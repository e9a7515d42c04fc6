//! Causal-Net Assembler
//!
//! Turns the retained bindings and the parallel relation into the emitted
//! causal-net description. Every direct-follow `(t, u)` that is not in
//! parallel becomes exactly one chain from `t` to `u`:
//!
//! - no binding dots on either side: `t -> t-u-i -> t-u-o -> u`
//! - output dots only:              `t -> t-u_1 -> .. -> t-u-o -> u`
//! - input dots only:               `t -> t-u-i -> 1 t-u -> .. -> u`
//! - dots on both sides:            `t -> output dots -> input dots -> u`
//!
//! Dot nodes carry their binding-position frequency, dummy nodes the arc's
//! direct-follows frequency. Positions of one multi-element binding are
//! connected pairwise with distinguished `bind` edges. Self-loops are a
//! single labelled edge; parallel arcs are not drawn at all, their
//! concurrency is expressed by the bind edges.

use crate::bindings::BindingSet;
use crate::event_log::EventLog;
use crate::relations::OrderingRelations;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a causal-net edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Flow,
    Bind,
}

/// One causal-net edge; self-loop edges carry the direct-follows count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CnetEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<u64>,
}

impl CnetEdge {
    fn flow(source: &str, target: &str) -> Self {
        CnetEdge {
            source: source.to_string(),
            target: target.to_string(),
            kind: EdgeKind::Flow,
            label: None,
        }
    }
}

/// The emitted causal-net description: node id -> count, plus edges.
///
/// Node ids are activities, dot labels, or direct-follow dummy labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CausalNet {
    pub nodes: BTreeMap<String, u64>,
    pub edges: Vec<CnetEdge>,
}

/// Assemble the causal net from the log, its relations, and the retained
/// bindings.
pub fn assemble(
    log: &EventLog,
    relations: &OrderingRelations,
    bindings: &BindingSet,
) -> CausalNet {
    let mut nodes: BTreeMap<String, u64> = log.activity_counts().into_iter().collect();
    let mut edges: Vec<CnetEdge> = Vec::new();

    for ((t, u), &frequency) in &relations.weighted_follows {
        if t == u {
            edges.push(CnetEdge {
                source: t.clone(),
                target: t.clone(),
                kind: EdgeKind::Flow,
                label: Some(frequency),
            });
            continue;
        }
        if relations.parallel.contains(&(t.clone(), u.clone())) {
            continue;
        }

        let output_dots = bindings
            .node(t)
            .map(|node| node.output.positions_for(u))
            .unwrap_or_default();
        let input_dots = bindings
            .node(u)
            .map(|node| node.input.positions_for(t))
            .unwrap_or_default();

        let mut chain: Vec<String> = vec![t.clone()];
        if output_dots.is_empty() {
            let dummy = format!("{t}-{u}-i");
            nodes.insert(dummy.clone(), frequency);
            chain.push(dummy);
        } else {
            for position in &output_dots {
                nodes.insert(position.label.clone(), position.frequency);
                chain.push(position.label.clone());
            }
        }
        if input_dots.is_empty() {
            let dummy = format!("{t}-{u}-o");
            nodes.insert(dummy.clone(), frequency);
            chain.push(dummy);
        } else {
            for position in &input_dots {
                nodes.insert(position.label.clone(), position.frequency);
                chain.push(position.label.clone());
            }
        }
        chain.push(u.clone());

        for link in chain.windows(2) {
            edges.push(CnetEdge::flow(&link[0], &link[1]));
        }
    }

    // bind edges between positions of the same multi-element binding; the
    // dots of parallel arcs only appear here, so register their nodes too
    for node in bindings.nodes.values() {
        for side in [&node.input, &node.output] {
            let mut grouped: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
            for position in &side.positions {
                nodes.insert(position.label.clone(), position.frequency);
                grouped
                    .entry(position.binding)
                    .or_default()
                    .push(position.label.as_str());
            }
            for labels in grouped.values() {
                for (i, left) in labels.iter().enumerate() {
                    for right in &labels[i + 1..] {
                        edges.push(CnetEdge {
                            source: (*left).to_string(),
                            target: (*right).to_string(),
                            kind: EdgeKind::Bind,
                            label: None,
                        });
                    }
                }
            }
        }
    }

    edges.sort_by(|a, b| {
        (&a.source, &a.target, a.kind).cmp(&(&b.source, &b.target, b.kind))
    });

    tracing::debug!(nodes = nodes.len(), edges = edges.len(), "causal_net_assembled");
    CausalNet { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::Trace;

    fn log(traces: &[(&[&str], u64)]) -> EventLog {
        let mut all = Vec::new();
        for (trace, multiplicity) in traces {
            let trace: Trace = trace.iter().map(|e| (*e).to_string()).collect();
            for _ in 0..*multiplicity {
                all.push(trace.clone());
            }
        }
        EventLog::from_traces(all)
    }

    fn net(log: &EventLog) -> CausalNet {
        let relations = OrderingRelations::extract(log);
        let bindings = BindingSet::derive(log, &relations, 20).unwrap();
        assemble(log, &relations, &bindings)
    }

    fn has_flow(net: &CausalNet, source: &str, target: &str) -> bool {
        net.edges.iter().any(|edge| {
            edge.kind == EdgeKind::Flow && edge.source == source && edge.target == target
        })
    }

    #[test]
    fn test_sequence_dummy_chain() {
        let net = net(&log(&[(&["write", "print", "deliver"], 1800)]));

        assert_eq!(net.nodes["write"], 1800);
        assert_eq!(net.nodes["write-print-i"], 1800);
        assert_eq!(net.nodes["write-print-o"], 1800);
        assert!(has_flow(&net, "write", "write-print-i"));
        assert!(has_flow(&net, "write-print-i", "write-print-o"));
        assert!(has_flow(&net, "write-print-o", "print"));
        assert!(has_flow(&net, "print", "print-deliver-i"));
    }

    #[test]
    fn test_self_loop_labelled_edge() {
        let net = net(&log(&[(&["a", "b", "b", "c"], 2)]));
        let self_loop = net
            .edges
            .iter()
            .find(|edge| edge.source == "b" && edge.target == "b")
            .unwrap();
        assert_eq!(self_loop.label, Some(2));
    }

    #[test]
    fn test_parallel_arcs_not_drawn() {
        let net = net(&log(&[(&["a", "c", "d", "e"], 2), (&["a", "d", "c", "e"], 1)]));
        assert!(!has_flow(&net, "c", "d"));
        assert!(!has_flow(&net, "d", "c"));
    }

    #[test]
    fn test_binding_dots_and_bind_edge() {
        let net = net(&log(&[(&["a", "c", "d", "e"], 2), (&["a", "d", "c", "e"], 1)]));

        // output dots of a sit on their arcs, chained to the input side
        assert!(has_flow(&net, "a", "a-c_1"));
        assert!(has_flow(&net, "a", "a-d_2"));
        assert_eq!(net.nodes["a-c_1"], 1);
        assert_eq!(net.nodes["a-d_2"], 1);

        let binds: Vec<_> = net
            .edges
            .iter()
            .filter(|edge| edge.kind == EdgeKind::Bind)
            .collect();
        assert!(binds
            .iter()
            .any(|edge| edge.source == "a-c_1" && edge.target == "a-d_2"));
    }

    #[test]
    fn test_every_nonparallel_follow_has_a_chain() {
        let log = log(&[(&["a", "b", "d"], 2), (&["a", "c", "d"], 1)]);
        let relations = OrderingRelations::extract(&log);
        let net = net(&log);

        for (t, u) in &relations.direct_follows {
            if t == u || relations.parallel.contains(&(t.clone(), u.clone())) {
                continue;
            }
            // the chain starts at t and ends at u
            assert!(
                net.edges
                    .iter()
                    .any(|edge| edge.kind == EdgeKind::Flow && edge.source == *t),
                "no chain start for {t}>{u}"
            );
            assert!(
                net.edges
                    .iter()
                    .any(|edge| edge.kind == EdgeKind::Flow && edge.target == *u),
                "no chain end for {t}>{u}"
            );
        }
    }
}
