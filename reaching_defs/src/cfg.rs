// Copyright 2026 the Reaching Defs Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Control-flow graph capability consumed by the analyses.
//!
//! The analyses never build a CFG themselves. They read one through [`ControlFlowGraph`] and
//! classify instructions through [`Instruction`]. [`BlockGraph`] and [`Instr`] are a small owned
//! implementation for embedders that have no CFG type of their own (and for tests).
//!
//! Node ids are dense: a graph with `n` nodes has ids `0..n`.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::AnalysisError;

/// Identifier of a CFG node (basic block).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a new node id.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer backing this id.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the id as a table index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(
            u32::try_from(index).is_ok(),
            "node index {index} does not fit in a NodeId"
        );
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// Program position of an instruction within its procedure.
///
/// This is the stable instruction index assigned by whoever built the IR; facts map back to it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct InstrPos(u32);

impl InstrPos {
    /// Creates a new instruction position.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer backing this position.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstrPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Read-only view of a procedure's control-flow graph.
pub trait ControlFlowGraph {
    /// Instruction type stored in the nodes.
    type Instr;

    /// Number of nodes. Valid ids are `0..node_count()`.
    fn node_count(&self) -> usize;

    /// Successors of `node` (control-flow edges out of it).
    fn successors(&self, node: NodeId) -> &[NodeId];

    /// Instructions of `node` in program order.
    fn instructions(&self, node: NodeId) -> &[Self::Instr];
}

/// Instruction classification needed by the static-field analyses.
pub trait Instruction {
    /// Unresolved field reference carried by the instruction.
    type FieldRef;

    /// Program position of this instruction.
    fn position(&self) -> InstrPos;

    /// The field written, if this instruction writes a static field.
    fn static_write(&self) -> Option<&Self::FieldRef>;
}

/// A symbolic field reference as it appears in an instruction: the class named at the access
/// site plus the field name. The field may be declared by a superclass.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FieldRef {
    /// Class named at the access site.
    pub class: Box<str>,
    /// Field name.
    pub name: Box<str>,
}

impl FieldRef {
    /// Constructs a field reference.
    pub fn new(class: impl Into<Box<str>>, name: impl Into<Box<str>>) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class, self.name)
    }
}

/// What an [`Instr`] does, as far as field analyses care.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InstrKind {
    /// Write of a static field.
    PutStatic(FieldRef),
    /// Write of an instance field.
    PutInstance(FieldRef),
    /// Read of a static field.
    GetStatic(FieldRef),
    /// Anything else.
    Other,
}

/// A minimal instruction: a position and a kind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instr {
    /// Program position.
    pub pos: InstrPos,
    /// Instruction kind.
    pub kind: InstrKind,
}

impl Instr {
    /// A static field write at `pos`.
    pub fn put_static(pos: u32, field: FieldRef) -> Self {
        Self {
            pos: InstrPos::new(pos),
            kind: InstrKind::PutStatic(field),
        }
    }

    /// An instance field write at `pos`.
    pub fn put_instance(pos: u32, field: FieldRef) -> Self {
        Self {
            pos: InstrPos::new(pos),
            kind: InstrKind::PutInstance(field),
        }
    }

    /// A static field read at `pos`.
    pub fn get_static(pos: u32, field: FieldRef) -> Self {
        Self {
            pos: InstrPos::new(pos),
            kind: InstrKind::GetStatic(field),
        }
    }

    /// An instruction irrelevant to field analyses at `pos`.
    pub fn other(pos: u32) -> Self {
        Self {
            pos: InstrPos::new(pos),
            kind: InstrKind::Other,
        }
    }
}

impl Instruction for Instr {
    type FieldRef = FieldRef;

    fn position(&self) -> InstrPos {
        self.pos
    }

    fn static_write(&self) -> Option<&FieldRef> {
        match &self.kind {
            InstrKind::PutStatic(field) => Some(field),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
struct Block<I> {
    instrs: Vec<I>,
    succs: Vec<NodeId>,
}

/// An owned CFG: blocks of instructions plus successor edges.
///
/// Edges may name blocks that are added later. Edges to blocks that never get added make the
/// graph malformed; the analyses report that as [`AnalysisError::MalformedCfg`].
#[derive(Clone, Debug)]
pub struct BlockGraph<I> {
    blocks: Vec<Block<I>>,
}

impl<I> Default for BlockGraph<I> {
    fn default() -> Self {
        Self { blocks: Vec::new() }
    }
}

impl<I> BlockGraph<I> {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block and returns its id.
    pub fn add_block(&mut self, instrs: Vec<I>) -> NodeId {
        let id = NodeId::from_index(self.blocks.len());
        self.blocks.push(Block {
            instrs,
            succs: Vec::new(),
        });
        id
    }

    /// Adds the edge `from -> to`. Duplicate edges are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `from` is not a block of this graph.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        let succs = &mut self.blocks[from.index()].succs;
        if !succs.contains(&to) {
            succs.push(to);
        }
    }
}

impl<I> ControlFlowGraph for BlockGraph<I> {
    type Instr = I;

    fn node_count(&self) -> usize {
        self.blocks.len()
    }

    fn successors(&self, node: NodeId) -> &[NodeId] {
        self.blocks
            .get(node.index())
            .map_or(&[], |b| b.succs.as_slice())
    }

    fn instructions(&self, node: NodeId) -> &[I] {
        self.blocks
            .get(node.index())
            .map_or(&[], |b| b.instrs.as_slice())
    }
}

/// Predecessor lists derived from a graph's successor edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predecessors {
    preds: Vec<Vec<NodeId>>,
}

impl Predecessors {
    /// Computes predecessor lists, rejecting edges to nonexistent nodes.
    pub fn compute<G: ControlFlowGraph + ?Sized>(cfg: &G) -> Result<Self, AnalysisError> {
        let n = cfg.node_count();
        let mut preds: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        for i in 0..n {
            let node = NodeId::from_index(i);
            for &succ in cfg.successors(node) {
                let Some(list) = preds.get_mut(succ.index()) else {
                    return Err(AnalysisError::MalformedCfg {
                        node,
                        successor: succ,
                    });
                };
                if !list.contains(&node) {
                    list.push(node);
                }
            }
        }
        Ok(Self { preds })
    }

    /// Predecessors of `node` (empty for unknown ids).
    #[must_use]
    pub fn of(&self, node: NodeId) -> &[NodeId] {
        self.preds.get(node.index()).map_or(&[], Vec::as_slice)
    }

    /// Number of nodes covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.preds.len()
    }

    /// Returns `true` for a graph without nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.preds.is_empty()
    }
}
