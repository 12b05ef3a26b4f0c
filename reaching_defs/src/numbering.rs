// Copyright 2026 the Reaching Defs Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dense numbering of analysis facts.
//!
//! Bit-vector lattices need facts numbered `0..N`. [`OrdinalMapping`] is that bijection;
//! [`number_static_writes`] builds it for static-field writes together with the per-field kill
//! index, in a single scan over the CFG.

use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use tracing::debug;

use crate::AnalysisError;
use crate::bitset::BitSet;
use crate::cfg::{ControlFlowGraph, InstrPos, Instruction, NodeId};
use crate::resolve::FieldResolver;

/// A bijection between a finite set of values and the indices `0..len()`.
///
/// Indices are assigned in insertion order and never change.
#[derive(Clone)]
pub struct OrdinalMapping<T> {
    values: Vec<T>,
    index: HashMap<T, usize>,
}

impl<T: fmt::Debug> fmt::Debug for OrdinalMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

impl<T: Clone + Eq + Hash> Default for OrdinalMapping<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> OrdinalMapping<T> {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the index of `value`, assigning the next free index if it is new.
    pub fn add(&mut self, value: T) -> usize {
        if let Some(&i) = self.index.get(&value) {
            return i;
        }
        let i = self.values.len();
        self.values.push(value.clone());
        self.index.insert(value, i);
        i
    }

    /// Index previously assigned to `value`.
    #[must_use]
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.index.get(value).copied()
    }

    /// Value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    /// Number of mapped values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates `(index, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.values.iter().enumerate()
    }
}

/// One numbered static-field write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticWrite<F> {
    /// Node containing the write.
    pub node: NodeId,
    /// Position of the write instruction.
    pub pos: InstrPos,
    /// The resolved (declared) field.
    pub field: F,
}

/// Facts of a static-field reaching-definitions analysis.
///
/// Built once per CFG; read-only afterwards.
#[derive(Clone, Debug)]
pub struct StaticWriteFacts<F> {
    positions: OrdinalMapping<InstrPos>,
    writes: Vec<StaticWrite<F>>,
    kill_index: HashMap<F, BitSet>,
}

impl<F: Clone + Eq + Hash> StaticWriteFacts<F> {
    /// Number of facts (static writes).
    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Returns `true` if the CFG has no static writes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Fact index ↔ instruction position mapping.
    #[must_use]
    pub fn positions(&self) -> &OrdinalMapping<InstrPos> {
        &self.positions
    }

    /// The write numbered `index`.
    #[must_use]
    pub fn write(&self, index: usize) -> Option<&StaticWrite<F>> {
        self.writes.get(index)
    }

    /// All writes in index order.
    #[must_use]
    pub fn writes(&self) -> &[StaticWrite<F>] {
        &self.writes
    }

    /// Every fact index writing `field`, anywhere in the CFG.
    #[must_use]
    pub fn writes_of(&self, field: &F) -> Option<&BitSet> {
        self.kill_index.get(field)
    }

    /// Number of distinct fields written.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.kill_index.len()
    }
}

/// Numbers every static-field write in `cfg` and builds the per-field kill index.
///
/// Instructions are scanned once, nodes in id order and instructions in program order; each
/// write gets the next index in that order.
///
/// Facts are identified by position, so two writes at the same position are rejected with
/// [`AnalysisError::DuplicatePosition`] before the second one is resolved.
pub fn number_static_writes<G, R>(
    cfg: &G,
    resolver: &R,
) -> Result<StaticWriteFacts<R::FieldId>, AnalysisError>
where
    G: ControlFlowGraph + ?Sized,
    G::Instr: Instruction,
    R: FieldResolver<<G::Instr as Instruction>::FieldRef> + ?Sized,
    <G::Instr as Instruction>::FieldRef: fmt::Debug,
{
    let mut positions = OrdinalMapping::new();
    let mut writes = Vec::new();
    let mut members: HashMap<R::FieldId, Vec<usize>> = HashMap::new();

    for i in 0..cfg.node_count() {
        let node = NodeId::from_index(i);
        for instr in cfg.instructions(node) {
            let Some(field_ref) = instr.static_write() else {
                continue;
            };
            let pos = instr.position();
            if positions.index_of(&pos).is_some() {
                return Err(AnalysisError::DuplicatePosition { node, pos });
            }
            let Some(field) = resolver.resolve(field_ref) else {
                return Err(AnalysisError::UnresolvedField {
                    node,
                    pos,
                    field: describe(field_ref),
                });
            };
            let index = positions.add(pos);
            members.entry(field.clone()).or_default().push(index);
            writes.push(StaticWrite { node, pos, field });
        }
    }

    let n = writes.len();
    let kill_index: HashMap<R::FieldId, BitSet> = members
        .into_iter()
        .map(|(field, idxs)| (field, BitSet::from_indices(n, idxs)))
        .collect();

    debug!(
        nodes = cfg.node_count(),
        facts = n,
        fields = kill_index.len(),
        "numbered static writes"
    );

    Ok(StaticWriteFacts {
        positions,
        writes,
        kill_index,
    })
}

/// Renders a field for error messages.
fn describe<T: fmt::Debug>(value: &T) -> Box<str> {
    format!("{value:?}").into_boxed_str()
}
