// Copyright 2026 the Reaching Defs Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A reusable forward worklist solver.
//!
//! Analyses provide a [`Lattice`] (join plus partial order) and a per-node transfer closure; the
//! solver owns the iteration mechanics:
//!
//! - every IN/OUT starts at the caller's `bottom`
//! - the worklist is seeded with every node, in [`VisitOrder`]
//! - visiting a node recomputes `IN = join(OUT(p) for p in preds)` and `OUT = transfer(IN)`
//! - when OUT changes, successors not already queued are enqueued
//!
//! Correctness assumes the usual dataflow conditions: transfers are monotone over a
//! finite-height lattice, so iteration reaches the least fixpoint regardless of order. With
//! [`SolverOptions::check_monotone`] the solver verifies that every OUT update only grows.

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::bitset::BitSet;
use crate::cfg::{ControlFlowGraph, NodeId, Predecessors};

/// A join semilattice value.
pub trait Lattice: Clone + PartialEq {
    /// In-place join: `self = self ⊔ other`. Returns `true` if `self` changed.
    fn join_into(&mut self, other: &Self) -> bool;

    /// Partial order: `self ⊑ other`.
    fn leq(&self, other: &Self) -> bool;
}

impl Lattice for BitSet {
    #[inline]
    fn join_into(&mut self, other: &Self) -> bool {
        self.union_with(other)
    }

    #[inline]
    fn leq(&self, other: &Self) -> bool {
        self.is_subset_of(other)
    }
}

/// Order in which nodes are seeded into the worklist.
///
/// Only the number of visits depends on this; the fixpoint does not.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum VisitOrder {
    /// Ascending node ids.
    #[default]
    Forward,
    /// Descending node ids.
    Reverse,
}

/// Solver configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SolverOptions {
    /// Initial worklist order.
    pub order: VisitOrder,
    /// Fail with [`SolveError::NonMonotone`] if an OUT value ever shrinks.
    pub check_monotone: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            order: VisitOrder::Forward,
            check_monotone: true,
        }
    }
}

/// Cooperative cancellation, polled before each node visit.
pub trait CancelSignal {
    /// Returns `true` once the solve should stop.
    fn is_cancelled(&self) -> bool;
}

impl CancelSignal for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// A shareable cancellation flag.
///
/// Wrap it in an `Arc` to cancel from another thread.
#[derive(Debug, Default)]
pub struct CancelFlag(AtomicBool);

impl CancelFlag {
    /// Creates an unset flag.
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl CancelSignal for CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}

/// Receives solver progress events. All methods default to no-ops.
pub trait SolveObserver<L> {
    /// A node is about to be visited.
    fn visit(&mut self, _node: NodeId) {}

    /// A node's OUT value changed from `old` to `new`.
    fn out_changed(&mut self, _node: NodeId, _old: &L, _new: &L) {}
}

/// Cheap counters describing a solve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolveSummary {
    /// Number of node visits (worklist pops).
    pub node_visits: usize,
    /// Number of times some node's OUT value changed.
    pub out_updates: usize,
}

/// IN/OUT values at the fixpoint, indexed by [`NodeId::index`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution<L> {
    /// Value at each node's entry.
    pub ins: Vec<L>,
    /// Value at each node's exit.
    pub outs: Vec<L>,
    /// Iteration counters.
    pub summary: SolveSummary,
}

/// Solver failures.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolveError {
    /// The cancel signal fired.
    Cancelled,
    /// A transfer produced an OUT value that is not above the previous one.
    NonMonotone {
        /// Offending node.
        node: NodeId,
    },
    /// `preds` was computed for a graph with a different node count.
    PredecessorMismatch {
        /// Nodes in the graph being solved.
        nodes: usize,
        /// Nodes covered by the predecessor lists.
        predecessors: usize,
    },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "solve cancelled"),
            Self::NonMonotone { node } => write!(f, "non-monotone transfer at {node}"),
            Self::PredecessorMismatch {
                nodes,
                predecessors,
            } => write!(
                f,
                "predecessor lists cover {predecessors} nodes, graph has {nodes}"
            ),
        }
    }
}

impl core::error::Error for SolveError {}

/// Computes a forward dataflow fixpoint over `cfg`.
///
/// `preds` must have been computed from `cfg` (see [`Predecessors::compute`]); lists for a graph
/// of another size are rejected. The join over an empty predecessor set is `bottom`.
///
/// On error no partial solution is returned.
pub fn solve_forward<G, L, Transfer>(
    cfg: &G,
    preds: &Predecessors,
    bottom: L,
    mut transfer: Transfer,
    options: SolverOptions,
    cancel: Option<&dyn CancelSignal>,
    mut observer: Option<&mut dyn SolveObserver<L>>,
) -> Result<Solution<L>, SolveError>
where
    G: ControlFlowGraph + ?Sized,
    L: Lattice,
    Transfer: FnMut(NodeId, &L) -> L,
{
    let n = cfg.node_count();
    if preds.len() != n {
        return Err(SolveError::PredecessorMismatch {
            nodes: n,
            predecessors: preds.len(),
        });
    }
    let mut ins: Vec<L> = (0..n).map(|_| bottom.clone()).collect();
    let mut outs: Vec<L> = (0..n).map(|_| bottom.clone()).collect();
    let mut summary = SolveSummary::default();

    if n == 0 {
        return Ok(Solution {
            ins,
            outs,
            summary,
        });
    }

    let mut work: VecDeque<NodeId> = match options.order {
        VisitOrder::Forward => (0..n).map(NodeId::from_index).collect(),
        VisitOrder::Reverse => (0..n).rev().map(NodeId::from_index).collect(),
    };
    let mut queued = vec![true; n];

    while let Some(node) = work.pop_front() {
        if cancel.is_some_and(|c| c.is_cancelled()) {
            debug!(
                visits = summary.node_visits,
                pending = work.len() + 1,
                "solve cancelled"
            );
            return Err(SolveError::Cancelled);
        }

        let idx = node.index();
        queued[idx] = false;
        summary.node_visits += 1;
        if let Some(obs) = observer.as_deref_mut() {
            obs.visit(node);
        }
        trace!(node = node.as_u32(), "visit");

        // IN[n] = join over OUT[p].
        let mut new_in = bottom.clone();
        for p in preds.of(node) {
            if let Some(out) = outs.get(p.index()) {
                new_in.join_into(out);
            }
        }
        ins[idx] = new_in;

        // OUT[n] = transfer(n, IN[n]).
        let new_out = transfer(node, &ins[idx]);
        if new_out == outs[idx] {
            continue;
        }
        if options.check_monotone && !outs[idx].leq(&new_out) {
            return Err(SolveError::NonMonotone { node });
        }
        if let Some(obs) = observer.as_deref_mut() {
            obs.out_changed(node, &outs[idx], &new_out);
        }
        outs[idx] = new_out;
        summary.out_updates += 1;
        trace!(node = node.as_u32(), "out changed");

        for &succ in cfg.successors(node) {
            if let Some(q) = queued.get_mut(succ.index())
                && !*q
            {
                *q = true;
                work.push_back(succ);
            }
        }
    }

    debug!(
        nodes = n,
        visits = summary.node_visits,
        updates = summary.out_updates,
        "fixpoint reached"
    );

    Ok(Solution {
        ins,
        outs,
        summary,
    })
}
