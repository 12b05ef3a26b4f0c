// Copyright 2026 the Reaching Defs Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use core::fmt;

use crate::cfg::{InstrPos, NodeId};
use crate::solver::SolveError;

/// Errors from building or solving an analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalysisError {
    /// A static-field write names a field the resolver cannot map to a declared field.
    UnresolvedField {
        /// Node containing the write.
        node: NodeId,
        /// Position of the write.
        pos: InstrPos,
        /// The field reference as written (debug rendering).
        field: Box<str>,
    },
    /// A node has an edge to a node id that does not exist.
    MalformedCfg {
        /// Source of the edge.
        node: NodeId,
        /// The nonexistent successor.
        successor: NodeId,
    },
    /// Two static-field writes share an instruction position, so facts cannot map back to
    /// positions.
    DuplicatePosition {
        /// Node containing the second write.
        node: NodeId,
        /// The repeated position.
        pos: InstrPos,
    },
    /// Predecessor lists were computed for a graph with a different node count.
    PredecessorMismatch {
        /// Nodes in the graph being solved.
        nodes: usize,
        /// Nodes covered by the predecessor lists.
        predecessors: usize,
    },
    /// The caller cancelled the solve. No result is available.
    Cancelled,
    /// A transfer function shrank a node's output: the solver or the transfer is buggy.
    NonMonotone {
        /// Node whose output shrank.
        node: NodeId,
    },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedField { node, pos, field } => {
                write!(
                    f,
                    "unresolved static field: field={field} node={node} pos={pos}"
                )
            }
            Self::MalformedCfg { node, successor } => {
                write!(
                    f,
                    "malformed cfg: edge from {node} to missing node {successor}"
                )
            }
            Self::DuplicatePosition { node, pos } => {
                write!(f, "duplicate static write position: node={node} pos={pos}")
            }
            Self::PredecessorMismatch {
                nodes,
                predecessors,
            } => {
                write!(
                    f,
                    "predecessor lists cover {predecessors} nodes, graph has {nodes}"
                )
            }
            Self::Cancelled => write!(f, "analysis cancelled"),
            Self::NonMonotone { node } => {
                write!(f, "non-monotone transfer function at {node}")
            }
        }
    }
}

impl core::error::Error for AnalysisError {}

impl From<SolveError> for AnalysisError {
    fn from(e: SolveError) -> Self {
        match e {
            SolveError::Cancelled => Self::Cancelled,
            SolveError::NonMonotone { node } => Self::NonMonotone { node },
            SolveError::PredecessorMismatch {
                nodes,
                predecessors,
            } => Self::PredecessorMismatch {
                nodes,
                predecessors,
            },
        }
    }
}
