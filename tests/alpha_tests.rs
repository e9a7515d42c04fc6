//! Alpha miner integration tests
//!
//! Scenario logs follow the classic discovery examples: L1 (sequence with
//! choice), L4 (shared middle activity), L7 (self-loop), plus the trivial
//! and degenerate logs every engine must accept.

use std::collections::{BTreeMap, BTreeSet};
use tracemine::alpha::maximal_ab_pairs;
use tracemine::{
    AbPair, Activity, AlphaMiner, EventLog, Footprint, OrderingRelations, PetriNet, PetriNode,
    Place, RelationSymbol,
};

fn log(traces: &[&[&str]]) -> EventLog {
    EventLog::from_traces(
        traces
            .iter()
            .map(|t| t.iter().map(|e| (*e).to_string()).collect())
            .collect(),
    )
}

fn set(items: &[&str]) -> BTreeSet<Activity> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn pair(sources: &[&str], targets: &[&str]) -> AbPair {
    AbPair {
        sources: set(sources),
        targets: set(targets),
    }
}

fn l1() -> EventLog {
    log(&[&["a", "e", "d"], &["a", "c", "b", "d"], &["a", "b", "c", "d"]])
}

#[test]
fn test_l1_relation_sets() {
    let relations = OrderingRelations::extract(&l1());

    assert_eq!(relations.activities, set(&["a", "b", "c", "d", "e"]));
    assert_eq!(relations.initial, set(&["a"]));
    assert_eq!(relations.last, set(&["d"]));

    let parallel: BTreeSet<_> = [
        ("b".to_string(), "c".to_string()),
        ("c".to_string(), "b".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(relations.parallel, parallel);
}

#[test]
fn test_l1_maximal_ab_pairs() {
    let relations = OrderingRelations::extract(&l1());
    let pairs: BTreeSet<AbPair> = maximal_ab_pairs(&relations).into_iter().collect();

    let expected: BTreeSet<AbPair> = [
        pair(&["a"], &["b", "e"]),
        pair(&["a"], &["c", "e"]),
        pair(&["b", "e"], &["d"]),
        pair(&["c", "e"], &["d"]),
    ]
    .into_iter()
    .collect();
    assert_eq!(pairs, expected);
}

#[test]
fn test_l4_shared_middle_activity() {
    let relations = OrderingRelations::extract(&log(&[
        &["a", "c", "d"],
        &["b", "c", "d"],
        &["b", "c", "e"],
        &["a", "c", "e"],
    ]));
    let pairs: BTreeSet<AbPair> = maximal_ab_pairs(&relations).into_iter().collect();

    assert!(pairs.contains(&pair(&["a", "b"], &["c"])));
    assert!(pairs.contains(&pair(&["c"], &["d", "e"])));
}

#[test]
fn test_l7_self_loop() {
    let log = log(&[
        &["a", "b", "b", "c"],
        &["a", "b", "c"],
        &["a", "b", "b", "b", "b", "c"],
        &["a", "c"],
    ]);
    let relations = OrderingRelations::extract(&log);

    assert!(relations
        .direct_follows
        .contains(&("b".to_string(), "b".to_string())));
    assert!(relations.is_self_parallel("b"));

    let pairs = maximal_ab_pairs(&relations);
    assert_eq!(pairs, vec![pair(&["a"], &["c"])]);

    // b is excluded from every place, but stays a transition
    let net = AlphaMiner::new().discover(&log);
    assert!(net.transitions.contains("b"));
    for place in &net.places {
        if let Place::Between { sources, targets } = place {
            assert!(!sources.contains("b"));
            assert!(!targets.contains("b"));
        }
    }
}

#[test]
fn test_single_event_log_two_place_net() {
    let net = AlphaMiner::new().discover(&log(&[&["a"]]));
    assert_eq!(net.places, vec![Place::Source, Place::Sink]);

    let flows: Vec<(String, String)> = net
        .flows
        .iter()
        .map(|flow| (flow.source.to_string(), flow.target.to_string()))
        .collect();
    assert_eq!(
        flows,
        vec![
            ("a".to_string(), "o_L".to_string()),
            ("i_L".to_string(), "a".to_string()),
        ]
    );
}

#[test]
fn test_footprint_partition() {
    // universal invariant: every cell holds exactly one of the four symbols,
    // parallel cells are symmetric, causality cells are antisymmetric
    let footprint = Footprint::build(&OrderingRelations::extract(&l1()));

    for a in footprint.activities() {
        for b in footprint.activities() {
            let symbol = footprint.symbol(a, b).expect("missing cell");
            let mirrored = footprint.symbol(b, a).expect("missing cell");
            match symbol {
                RelationSymbol::Follows => assert_eq!(mirrored, RelationSymbol::Precedes),
                RelationSymbol::Precedes => assert_eq!(mirrored, RelationSymbol::Follows),
                RelationSymbol::Choice => assert_eq!(mirrored, RelationSymbol::Choice),
                RelationSymbol::Parallel => assert_eq!(mirrored, RelationSymbol::Parallel),
            }
        }
    }
}

#[test]
fn test_flow_synthesis_covers_every_pair_member() {
    let net = AlphaMiner::new().discover(&l1());

    for place in &net.places {
        let Place::Between { sources, targets } = place else {
            continue;
        };
        let label = place.to_string();
        for a in sources {
            assert!(net.flows.iter().any(|flow| {
                flow.source.to_string() == *a && flow.target.to_string() == label
            }));
        }
        for b in targets {
            assert!(net.flows.iter().any(|flow| {
                flow.source.to_string() == label && flow.target.to_string() == *b
            }));
        }
    }
}

// Token-game playout of the discovered net: enumerate the complete traces
// (from the marked source to the marked sink) up to a depth bound.
fn playout(net: &PetriNet, max_len: usize) -> BTreeSet<Vec<String>> {
    let mut pre: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut post: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for transition in &net.transitions {
        pre.entry(transition.clone()).or_default();
        post.entry(transition.clone()).or_default();
    }
    for flow in &net.flows {
        match (&flow.source, &flow.target) {
            (PetriNode::Place { place }, PetriNode::Transition { name }) => {
                pre.entry(name.clone()).or_default().insert(place.to_string());
            }
            (PetriNode::Transition { name }, PetriNode::Place { place }) => {
                post.entry(name.clone()).or_default().insert(place.to_string());
            }
            _ => {}
        }
    }

    let initial: BTreeMap<String, u32> = [("i_L".to_string(), 1)].into_iter().collect();
    let accepting: BTreeMap<String, u32> = [("o_L".to_string(), 1)].into_iter().collect();

    let mut complete = BTreeSet::new();
    let mut stack = vec![(initial, Vec::new())];
    while let Some((marking, trace)) = stack.pop() {
        if marking == accepting {
            complete.insert(trace);
            continue;
        }
        if trace.len() >= max_len {
            continue;
        }
        for (transition, inputs) in &pre {
            let enabled = inputs
                .iter()
                .all(|place| marking.get(place).copied().unwrap_or(0) > 0);
            if !enabled || inputs.is_empty() {
                continue;
            }
            let mut next = marking.clone();
            for place in inputs {
                let tokens = next.get_mut(place).expect("enabled place");
                *tokens -= 1;
                if *tokens == 0 {
                    next.remove(place);
                }
            }
            for place in &post[transition] {
                *next.entry(place.clone()).or_insert(0) += 1;
            }
            let mut extended = trace.clone();
            extended.push(transition.clone());
            stack.push((next, extended));
        }
    }
    complete
}

#[test]
fn test_round_trip_rediscovers_l1() {
    let original = l1();
    let net = AlphaMiner::new().discover(&original);

    let simulated: Vec<Vec<String>> = playout(&net, 8).into_iter().collect();
    assert!(!simulated.is_empty());
    let replayed = AlphaMiner::new().discover(&EventLog::from_traces(simulated));

    // same maximal AB-pairs, hence the same places
    let places = |net: &PetriNet| -> BTreeSet<Place> { net.places.iter().cloned().collect() };
    assert_eq!(places(&net), places(&replayed));
}
