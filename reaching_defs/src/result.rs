// Copyright 2026 the Reaching Defs Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only query surface over a solved analysis.

use alloc::vec::Vec;
use core::hash::Hash;

use crate::bitset::{self, BitSet};
use crate::cfg::{InstrPos, NodeId};
use crate::numbering::StaticWriteFacts;
use crate::solver::{Solution, SolveSummary};

/// Reaching static-field writes at every node, frozen at the fixpoint.
///
/// There is no way to mutate a result; solving again produces a new one.
#[derive(Clone, Debug)]
pub struct ReachingDefsResult<F> {
    facts: StaticWriteFacts<F>,
    ins: Vec<BitSet>,
    outs: Vec<BitSet>,
    summary: SolveSummary,
}

impl<F: Clone + Eq + Hash> ReachingDefsResult<F> {
    pub(crate) fn new(facts: StaticWriteFacts<F>, solution: Solution<BitSet>) -> Self {
        let Solution {
            ins,
            outs,
            summary,
        } = solution;
        Self {
            facts,
            ins,
            outs,
            summary,
        }
    }

    /// Writes that may reach the entry of `node`.
    #[must_use]
    pub fn in_facts(&self, node: NodeId) -> Option<Facts<'_, F>> {
        self.ins.get(node.index()).map(|set| Facts {
            set,
            facts: &self.facts,
        })
    }

    /// Writes that may reach the exit of `node`.
    #[must_use]
    pub fn out_facts(&self, node: NodeId) -> Option<Facts<'_, F>> {
        self.outs.get(node.index()).map(|set| Facts {
            set,
            facts: &self.facts,
        })
    }

    /// Instruction position of fact `index`.
    #[must_use]
    pub fn fact_at(&self, index: usize) -> Option<InstrPos> {
        self.facts.positions().get(index).copied()
    }

    /// Fact index of the write at `pos`, if it is a numbered write.
    #[must_use]
    pub fn fact_index(&self, pos: InstrPos) -> Option<usize> {
        self.facts.positions().index_of(&pos)
    }

    /// Resolved field written by fact `index`.
    #[must_use]
    pub fn field_of(&self, index: usize) -> Option<&F> {
        self.facts.write(index).map(|w| &w.field)
    }

    /// Number of facts (numbered static writes).
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Number of nodes covered.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.ins.len()
    }

    /// The numbered facts this result ranges over.
    #[must_use]
    pub fn facts(&self) -> &StaticWriteFacts<F> {
        &self.facts
    }

    /// Solver counters for the run that produced this result.
    #[must_use]
    pub fn summary(&self) -> SolveSummary {
        self.summary
    }
}

/// A set of facts at one program point.
#[derive(Debug)]
pub struct Facts<'a, F> {
    set: &'a BitSet,
    facts: &'a StaticWriteFacts<F>,
}

impl<F> Clone for Facts<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for Facts<'_, F> {}

impl<'a, F: Clone + Eq + Hash> Facts<'a, F> {
    /// Returns `true` if fact `index` is a member.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.set.contains(index)
    }

    /// Returns `true` if the write at `pos` is a member.
    #[must_use]
    pub fn contains_pos(&self, pos: InstrPos) -> bool {
        self.facts
            .positions()
            .index_of(&pos)
            .is_some_and(|i| self.set.contains(i))
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.set.count()
    }

    /// Returns `true` if no write reaches this point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Member fact indices, ascending.
    pub fn iter(self) -> bitset::Iter<'a> {
        self.set.iter()
    }

    /// Instruction positions of the members, in fact-index order.
    pub fn positions(self) -> impl Iterator<Item = InstrPos> + 'a {
        let facts = self.facts;
        self.set
            .iter()
            .filter_map(move |i| facts.positions().get(i).copied())
    }

    /// Members that write `field`.
    pub fn writes_of(self, field: &'a F) -> impl Iterator<Item = usize> + 'a {
        let facts = self.facts;
        self.set
            .iter()
            .filter(move |&i| facts.write(i).is_some_and(|w| &w.field == field))
    }

    /// The underlying bit set.
    #[must_use]
    pub fn as_bitset(self) -> &'a BitSet {
        self.set
    }
}
