// Copyright 2026 the Reaching Defs Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reaching definitions of static-field writes.
//!
//! A write `W` of field `F` reaches a program point `P` if some path from `W` to `P` contains
//! no other write of `F`. Facts are the static writes of the procedure; the lattice is the
//! power set of facts under union (a "may" analysis).
//!
//! Construction numbers the writes, resolves their fields, builds the kill index and the per-node
//! transfers, and validates the edge set. Everything the solve needs is owned by the
//! [`ReachingDefs`] value, so solving borrows only the graph.

use core::fmt;
use core::hash::Hash;

use crate::AnalysisError;
use crate::bitset::BitSet;
use crate::cfg::{ControlFlowGraph, Instruction, NodeId, Predecessors};
use crate::numbering::{StaticWriteFacts, number_static_writes};
use crate::resolve::FieldResolver;
use crate::result::ReachingDefsResult;
use crate::solver::{CancelSignal, SolveObserver, SolverOptions, solve_forward};
use crate::transfer::{BitTransfer, StaticWriteTransfers, TransferProvider};

/// A reaching-definitions analysis bound to one CFG.
pub struct ReachingDefs<'g, G: ?Sized, F> {
    cfg: &'g G,
    preds: Predecessors,
    facts: StaticWriteFacts<F>,
    transfers: StaticWriteTransfers,
}

impl<G: ?Sized, F: fmt::Debug> fmt::Debug for ReachingDefs<'_, G, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReachingDefs")
            .field("preds", &self.preds)
            .field("facts", &self.facts)
            .field("transfers", &self.transfers)
            .finish_non_exhaustive()
    }
}

impl<'g, G, F> ReachingDefs<'g, G, F>
where
    G: ControlFlowGraph + ?Sized,
    G::Instr: Instruction,
    F: Clone + Eq + Hash,
{
    /// Prepares the analysis of `cfg`, resolving written fields with `resolver`.
    ///
    /// Fails if a written field does not resolve or an edge names a nonexistent node.
    pub fn new<R>(cfg: &'g G, resolver: &R) -> Result<Self, AnalysisError>
    where
        R: FieldResolver<<G::Instr as Instruction>::FieldRef, FieldId = F> + ?Sized,
        <G::Instr as Instruction>::FieldRef: fmt::Debug,
    {
        let preds = Predecessors::compute(cfg)?;
        let facts = number_static_writes(cfg, resolver)?;
        let transfers = StaticWriteTransfers::new(cfg.node_count(), &facts);
        Ok(Self {
            cfg,
            preds,
            facts,
            transfers,
        })
    }

    /// Numbered facts.
    #[must_use]
    pub fn facts(&self) -> &StaticWriteFacts<F> {
        &self.facts
    }

    /// Transfer function of `node`.
    #[must_use]
    pub fn transfer(&self, node: NodeId) -> &BitTransfer {
        self.transfers.node_transfer(node)
    }

    /// Predecessor lists of the analysed graph.
    #[must_use]
    pub fn predecessors(&self) -> &Predecessors {
        &self.preds
    }

    /// Solves to the fixpoint.
    ///
    /// `cancel` is polled before every node visit. A cancelled or failed solve yields no result.
    pub fn solve(
        &self,
        options: SolverOptions,
        cancel: Option<&dyn CancelSignal>,
        observer: Option<&mut dyn SolveObserver<BitSet>>,
    ) -> Result<ReachingDefsResult<F>, AnalysisError> {
        let bottom = BitSet::new_empty(self.facts.len());
        let solution = solve_forward(
            self.cfg,
            &self.preds,
            bottom,
            |node, input| self.transfers.node_transfer(node).apply(input),
            options,
            cancel,
            observer,
        )?;
        Ok(ReachingDefsResult::new(self.facts.clone(), solution))
    }
}

/// Runs static-field reaching definitions on `cfg` with default solver options.
pub fn analyze<G, R>(
    cfg: &G,
    resolver: &R,
    cancel: Option<&dyn CancelSignal>,
) -> Result<ReachingDefsResult<R::FieldId>, AnalysisError>
where
    G: ControlFlowGraph + ?Sized,
    G::Instr: Instruction,
    <G::Instr as Instruction>::FieldRef: fmt::Debug,
    R: FieldResolver<<G::Instr as Instruction>::FieldRef> + ?Sized,
{
    ReachingDefs::new(cfg, resolver)?.solve(SolverOptions::default(), cancel, None)
}
