// Copyright 2026 the Reaching Defs Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node transfer functions over bit-vector lattices.

use alloc::vec::Vec;
use core::hash::Hash;

use crate::bitset::BitSet;
use crate::cfg::NodeId;
use crate::numbering::StaticWriteFacts;

/// A gen/kill transfer function: `OUT = (IN \ kill) ∪ gen`, or the identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BitTransfer {
    /// `OUT = IN`.
    Identity,
    /// `OUT = (IN \ kill) ∪ gen`.
    KillGen {
        /// Facts removed.
        kill_set: BitSet,
        /// Facts added (after the kill).
        gen_set: BitSet,
    },
}

impl BitTransfer {
    /// Applies the transfer to `input`.
    #[must_use]
    pub fn apply(&self, input: &BitSet) -> BitSet {
        match self {
            Self::Identity => input.clone(),
            Self::KillGen { kill_set, gen_set } => {
                let mut out = input.clone();
                out.subtract_with(kill_set);
                out.union_with(gen_set);
                out
            }
        }
    }

    /// Returns the transfer equivalent to applying `self`, then `next`.
    ///
    /// `(k1, g1)` then `(k2, g2)` is `(k1 ∪ k2, (g1 \ k2) ∪ g2)`.
    #[must_use]
    pub fn then(self, next: &Self) -> Self {
        match (self, next) {
            (first, Self::Identity) => first,
            (Self::Identity, second) => second.clone(),
            (
                Self::KillGen {
                    mut kill_set,
                    mut gen_set,
                },
                Self::KillGen {
                    kill_set: next_kill,
                    gen_set: next_gen,
                },
            ) => {
                kill_set.union_with(next_kill);
                gen_set.subtract_with(next_kill);
                gen_set.union_with(next_gen);
                Self::KillGen { kill_set, gen_set }
            }
        }
    }

    /// Returns `true` for the identity transfer.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }
}

/// Supplies node transfer functions to a bit-vector analysis.
///
/// The join across predecessors is fixed to union.
pub trait TransferProvider {
    /// Transfer function of `node`. Unknown nodes get the identity.
    fn node_transfer(&self, node: NodeId) -> &BitTransfer;

    /// Whether values are also transformed along edges. The solver only handles node transfers.
    fn has_edge_transfers(&self) -> bool {
        false
    }
}

/// Reaching-definitions transfers for static-field writes, one per node.
///
/// Every write in a node is folded in program order: a write of field `F` numbered `i` is
/// `kill = writes_of(F)` (which includes `i`), `gen = {i}`, and consecutive writes compose with
/// [`BitTransfer::then`]. A node without writes is the identity.
#[derive(Clone, Debug)]
pub struct StaticWriteTransfers {
    per_node: Vec<BitTransfer>,
}

static IDENTITY: BitTransfer = BitTransfer::Identity;

impl StaticWriteTransfers {
    /// Builds the transfer of every node from numbered facts.
    #[must_use]
    pub fn new<F: Clone + Eq + Hash>(node_count: usize, facts: &StaticWriteFacts<F>) -> Self {
        let n = facts.len();
        let mut per_node: Vec<BitTransfer> =
            (0..node_count).map(|_| BitTransfer::Identity).collect();

        // Writes are numbered node by node in program order, so iterating by index folds each
        // node's writes in order.
        for (index, write) in facts.writes().iter().enumerate() {
            let Some(slot) = per_node.get_mut(write.node.index()) else {
                continue;
            };
            let kill_set = facts
                .writes_of(&write.field)
                .cloned()
                .unwrap_or_else(|| BitSet::new_empty(n));
            let step = BitTransfer::KillGen {
                kill_set,
                gen_set: BitSet::from_indices(n, [index]),
            };
            let prev = core::mem::replace(slot, BitTransfer::Identity);
            *slot = prev.then(&step);
        }

        Self { per_node }
    }
}

impl TransferProvider for StaticWriteTransfers {
    fn node_transfer(&self, node: NodeId) -> &BitTransfer {
        self.per_node.get(node.index()).unwrap_or(&IDENTITY)
    }
}
