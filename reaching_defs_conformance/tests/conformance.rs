// Copyright 2026 the Reaching Defs Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(missing_docs, reason = "integration test crate")]

use std::cell::Cell;
use std::sync::Arc;
use std::thread;

use reaching_defs::bitset::BitSet;
use reaching_defs::cfg::{BlockGraph, FieldRef, Instr, InstrPos, NodeId};
use reaching_defs::resolve::{ClassTable, DeclaredField};
use reaching_defs::solver::SolveObserver;
use reaching_defs::{
    AnalysisError, CancelFlag, CancelSignal, ReachingDefs, ReachingDefsResult, SolverOptions,
    analyze,
};

fn by_name(f: &FieldRef) -> Option<FieldRef> {
    Some(f.clone())
}

fn out_of(r: &ReachingDefsResult<FieldRef>, node: NodeId) -> Vec<usize> {
    r.out_facts(node).unwrap().iter().collect()
}

fn in_of(r: &ReachingDefsResult<FieldRef>, node: NodeId) -> Vec<usize> {
    r.in_facts(node).unwrap().iter().collect()
}

/// bb0 (entry) -> bb1 (X = ..) -> {bb2 (X = ..), bb3 (Y = ..)} -> bb4
fn diamond() -> (BlockGraph<Instr>, [NodeId; 5]) {
    let x = FieldRef::new("Dataflow", "x");
    let y = FieldRef::new("Dataflow", "y");
    let mut g = BlockGraph::new();
    let b0 = g.add_block(vec![Instr::other(0)]);
    let b1 = g.add_block(vec![Instr::put_static(1, x.clone()), Instr::other(2)]);
    let b2 = g.add_block(vec![Instr::put_static(3, x)]);
    let b3 = g.add_block(vec![Instr::put_static(4, y)]);
    let b4 = g.add_block(vec![Instr::other(5)]);
    g.add_edge(b0, b1);
    g.add_edge(b1, b2);
    g.add_edge(b1, b3);
    g.add_edge(b2, b4);
    g.add_edge(b3, b4);
    (g, [b0, b1, b2, b3, b4])
}

#[test]
fn diamond_end_to_end() {
    let (g, [_, b1, b2, b3, b4]) = diamond();
    let r = analyze(&g, &by_name, None).unwrap();

    assert_eq!(r.fact_count(), 3);
    assert_eq!(r.fact_at(0), Some(InstrPos::new(1)));
    assert_eq!(r.fact_at(1), Some(InstrPos::new(3)));
    assert_eq!(r.fact_at(2), Some(InstrPos::new(4)));

    assert_eq!(out_of(&r, b1), [0]);
    assert_eq!(out_of(&r, b2), [1], "second write of x kills the first");
    assert_eq!(out_of(&r, b3), [0, 2]);

    let out4 = r.out_facts(b4).unwrap();
    assert_eq!(out4.len(), 3);
    assert!(out4.contains(2), "the write of y survives both arms");
    assert!(out4.contains(0) && out4.contains(1));
    let x = FieldRef::new("Dataflow", "x");
    assert_eq!(out4.writes_of(&x).collect::<Vec<_>>(), [0, 1]);
    assert_eq!(
        out4.positions().collect::<Vec<_>>(),
        [InstrPos::new(1), InstrPos::new(3), InstrPos::new(4)]
    );
}

#[test]
fn meet_is_union_of_predecessors() {
    let mut g = BlockGraph::new();
    let p1 = g.add_block(vec![Instr::put_static(0, FieldRef::new("C", "a"))]);
    let p2 = g.add_block(vec![Instr::put_static(1, FieldRef::new("C", "b"))]);
    let join = g.add_block(vec![]);
    g.add_edge(p1, join);
    g.add_edge(p2, join);

    let r = analyze(&g, &by_name, None).unwrap();
    assert_eq!(out_of(&r, p1), [0]);
    assert_eq!(out_of(&r, p2), [1]);
    assert_eq!(in_of(&r, join), [0, 1]);
}

#[test]
fn kill_gen_drops_every_other_write_of_the_field() {
    let f = FieldRef::new("C", "f");
    let other = FieldRef::new("C", "g");
    let mut g = BlockGraph::new();
    let a = g.add_block(vec![Instr::put_static(0, f.clone())]);
    let b = g.add_block(vec![Instr::put_static(1, f.clone())]);
    let c = g.add_block(vec![Instr::put_static(2, other)]);
    let w = g.add_block(vec![Instr::put_static(3, f)]);
    g.add_edge(a, w);
    g.add_edge(b, w);
    g.add_edge(c, w);
    g.add_edge(w, a);

    let r = analyze(&g, &by_name, None).unwrap();
    assert_eq!(in_of(&r, w), [0, 1, 2]);
    assert_eq!(out_of(&r, w), [2, 3]);
}

#[test]
fn identity_nodes_pass_values_through() {
    let (g, nodes) = diamond();
    let analysis = ReachingDefs::new(&g, &by_name).unwrap();
    let r = analysis.solve(SolverOptions::default(), None, None).unwrap();
    for node in nodes {
        if analysis.transfer(node).is_identity() {
            assert_eq!(in_of(&r, node), out_of(&r, node), "{node} is identity");
        }
    }
}

#[test]
fn unreachable_block_still_contributes() {
    // bb2 has no predecessors; its write flows into bb1 like any other.
    let x = FieldRef::new("C", "x");
    let mut g = BlockGraph::new();
    let entry = g.add_block(vec![Instr::other(0)]);
    let join = g.add_block(vec![Instr::other(1)]);
    let dead = g.add_block(vec![Instr::put_static(2, x)]);
    g.add_edge(entry, join);
    g.add_edge(dead, join);

    let r = analyze(&g, &by_name, None).unwrap();
    assert_eq!(in_of(&r, join), [0]);
    assert!(r.in_facts(join).unwrap().contains_pos(InstrPos::new(2)));
    assert!(in_of(&r, dead).is_empty());
}

#[test]
fn self_loop_reaches_itself() {
    let x = FieldRef::new("C", "x");
    let mut g = BlockGraph::new();
    let l = g.add_block(vec![Instr::put_static(0, x)]);
    g.add_edge(l, l);

    let r = analyze(&g, &by_name, None).unwrap();
    assert_eq!(in_of(&r, l), [0]);
    assert_eq!(out_of(&r, l), [0]);
}

#[test]
fn multiple_writes_in_one_block_fold_in_order() {
    let x = FieldRef::new("C", "x");
    let y = FieldRef::new("C", "y");
    let mut g = BlockGraph::new();
    let a = g.add_block(vec![
        Instr::put_static(0, x.clone()),
        Instr::put_static(1, y),
        Instr::put_static(2, x),
    ]);
    let b = g.add_block(vec![]);
    g.add_edge(a, b);

    let r = analyze(&g, &by_name, None).unwrap();
    assert_eq!(in_of(&r, b), [1, 2], "the first write of x is dead at block exit");
}

#[test]
fn instance_writes_and_reads_are_not_facts() {
    let f = FieldRef::new("C", "f");
    let mut g = BlockGraph::new();
    g.add_block(vec![
        Instr::put_instance(0, f.clone()),
        Instr::get_static(1, f.clone()),
        Instr::put_static(2, f),
    ]);

    let r = analyze(&g, &by_name, None).unwrap();
    assert_eq!(r.fact_count(), 1);
    assert_eq!(r.fact_index(InstrPos::new(2)), Some(0));
    assert_eq!(r.fact_index(InstrPos::new(0)), None);
}

#[test]
fn fields_resolve_through_superclasses() {
    let mut table = ClassTable::new();
    table.add_class("Base", None);
    table.add_class("Derived", Some("Base"));
    table.declare_field("Base", "shared");
    table.declare_field("Derived", "own");

    let mut g = BlockGraph::new();
    let a = g.add_block(vec![Instr::put_static(0, FieldRef::new("Derived", "shared"))]);
    let b = g.add_block(vec![Instr::put_static(1, FieldRef::new("Derived", "own"))]);
    let c = g.add_block(vec![Instr::put_static(2, FieldRef::new("Base", "shared"))]);
    g.add_edge(a, b);
    g.add_edge(b, c);

    let r = analyze(&g, &table, None).unwrap();
    let shared = DeclaredField {
        class: "Base".into(),
        name: "shared".into(),
    };
    assert_eq!(r.field_of(0), Some(&shared));
    assert_eq!(r.out_facts(c).unwrap().iter().collect::<Vec<_>>(), [1, 2]);
}

#[test]
fn unresolved_field_is_reported() {
    let mut table = ClassTable::new();
    table.add_class("Known", None);

    let mut g = BlockGraph::new();
    g.add_block(vec![Instr::other(0)]);
    g.add_block(vec![Instr::put_static(1, FieldRef::new("Known", "missing"))]);

    let err = analyze(&g, &table, None).unwrap_err();
    let AnalysisError::UnresolvedField { node, pos, field } = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(*node, NodeId::new(1));
    assert_eq!(*pos, InstrPos::new(1));
    assert!(field.contains("missing"), "message names the field: {field}");
}

#[test]
fn writes_sharing_a_position_are_rejected() {
    // a: x@1 -> mid: x@2 -> b: x@1. Numbering b's write under a's fact would let mid's write
    // leak past b.
    let x = FieldRef::new("C", "x");
    let mut g = BlockGraph::new();
    let a = g.add_block(vec![Instr::put_static(1, x.clone())]);
    let mid = g.add_block(vec![Instr::put_static(2, x.clone())]);
    let b = g.add_block(vec![Instr::put_static(1, x)]);
    g.add_edge(a, mid);
    g.add_edge(mid, b);

    assert_eq!(
        analyze(&g, &by_name, None).unwrap_err(),
        AnalysisError::DuplicatePosition {
            node: b,
            pos: InstrPos::new(1),
        }
    );
}

#[test]
fn repeated_position_with_an_unknown_class_is_still_an_error() {
    let mut table = ClassTable::new();
    table.add_class("C", None);
    table.declare_field("C", "x");

    let mut g = BlockGraph::new();
    g.add_block(vec![Instr::put_static(1, FieldRef::new("C", "x"))]);
    g.add_block(vec![Instr::put_static(1, FieldRef::new("Gone", "nope"))]);

    let err = analyze(&g, &table, None).unwrap_err();
    assert!(
        matches!(err, AnalysisError::DuplicatePosition { .. }),
        "unexpected result: {err}"
    );
}

#[test]
fn dangling_edge_is_malformed() {
    let mut g = BlockGraph::new();
    let a = g.add_block(vec![Instr::other(0)]);
    g.add_edge(a, NodeId::new(3));

    assert_eq!(
        analyze(&g, &by_name, None).unwrap_err(),
        AnalysisError::MalformedCfg {
            node: a,
            successor: NodeId::new(3),
        }
    );
}

#[test]
fn cancel_before_first_iteration() {
    let (g, _) = diamond();
    let flag = CancelFlag::new();
    flag.cancel();
    assert_eq!(
        analyze(&g, &by_name, Some(&flag)).unwrap_err(),
        AnalysisError::Cancelled
    );
}

/// Cancels after a fixed number of polls.
struct CancelAfter {
    polls: Cell<usize>,
    limit: usize,
}

impl CancelSignal for CancelAfter {
    fn is_cancelled(&self) -> bool {
        let n = self.polls.get() + 1;
        self.polls.set(n);
        n > self.limit
    }
}

#[test]
fn cancel_mid_solve() {
    let (g, _) = diamond();
    let cancel = CancelAfter {
        polls: Cell::new(0),
        limit: 2,
    };
    assert_eq!(
        analyze(&g, &by_name, Some(&cancel)).unwrap_err(),
        AnalysisError::Cancelled
    );
    assert_eq!(cancel.polls.get(), 3);
}

#[test]
fn outputs_only_grow() {
    #[derive(Default)]
    struct History {
        changes: Vec<(NodeId, BitSet, BitSet)>,
    }
    impl SolveObserver<BitSet> for History {
        fn out_changed(&mut self, node: NodeId, old: &BitSet, new: &BitSet) {
            self.changes.push((node, old.clone(), new.clone()));
        }
    }

    let x = FieldRef::new("C", "x");
    let y = FieldRef::new("C", "y");
    let mut g = BlockGraph::new();
    let n: Vec<NodeId> = (0..6_u32)
        .map(|i| {
            let f = if i % 3 == 0 { x.clone() } else { y.clone() };
            g.add_block(vec![Instr::put_static(i, f)])
        })
        .collect();
    for w in n.windows(2) {
        g.add_edge(w[0], w[1]);
    }
    g.add_edge(n[5], n[1]);
    g.add_edge(n[4], n[2]);

    let analysis = ReachingDefs::new(&g, &by_name).unwrap();
    let mut history = History::default();
    let r = analysis
        .solve(SolverOptions::default(), None, Some(&mut history))
        .unwrap();

    assert_eq!(history.changes.len(), r.summary().out_updates);
    for (node, old, new) in &history.changes {
        assert!(old.is_subset_of(new), "OUT({node}) shrank: {old:?} -> {new:?}");
    }
}

#[test]
fn independent_analyses_run_in_parallel() {
    let (g, nodes) = diamond();
    let g = Arc::new(g);
    let expected = out_of(&analyze(&*g, &by_name, None).unwrap(), nodes[4]);

    thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let g = Arc::clone(&g);
                s.spawn(move || out_of(&analyze(&*g, &by_name, None).unwrap(), nodes[4]))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}

#[test]
fn pretty_dump_lists_every_block() {
    let (g, _) = diamond();
    let r = analyze(&g, &by_name, None).unwrap();
    let text = reaching_defs::pretty::render(&g, &r);
    assert!(text.contains("bb1 -> bb2 bb3"));
    assert!(text.contains("  out {0@1, 1@3, 2@4}"));
}
