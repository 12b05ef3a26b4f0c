// Copyright 2026 the Reaching Defs Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plain-text dump of a solved analysis, one block per node.
//!
//! Intended for debugging; the format is not stable.

use alloc::string::String;
use core::fmt::{self, Write};
use core::hash::Hash;

use crate::cfg::{ControlFlowGraph, Instruction, NodeId};
use crate::result::{Facts, ReachingDefsResult};

fn write_facts<F: Clone + Eq + Hash>(
    out: &mut String,
    facts: Option<Facts<'_, F>>,
) -> fmt::Result {
    let Some(facts) = facts else {
        return write!(out, "-");
    };
    write!(out, "{{")?;
    for (i, (index, pos)) in facts.iter().zip(facts.positions()).enumerate() {
        if i > 0 {
            write!(out, ", ")?;
        }
        write!(out, "{index}{pos}")?;
    }
    write!(out, "}}")
}

fn render_into<G, F>(out: &mut String, cfg: &G, result: &ReachingDefsResult<F>) -> fmt::Result
where
    G: ControlFlowGraph + ?Sized,
    G::Instr: Instruction + fmt::Debug,
    F: Clone + Eq + Hash,
{
    for i in 0..cfg.node_count() {
        let node = NodeId::from_index(i);
        write!(out, "{node}")?;
        let succs = cfg.successors(node);
        if !succs.is_empty() {
            write!(out, " ->")?;
            for s in succs {
                write!(out, " {s}")?;
            }
        }
        writeln!(out)?;
        for instr in cfg.instructions(node) {
            writeln!(out, "  {} {instr:?}", instr.position())?;
        }
        write!(out, "  in  ")?;
        write_facts(out, result.in_facts(node))?;
        writeln!(out)?;
        write!(out, "  out ")?;
        write_facts(out, result.out_facts(node))?;
        writeln!(out)?;
    }
    Ok(())
}

/// Renders every node of `cfg` with its instructions and IN/OUT facts.
///
/// Facts print as `index@position`.
#[must_use]
pub fn render<G, F>(cfg: &G, result: &ReachingDefsResult<F>) -> String
where
    G: ControlFlowGraph + ?Sized,
    G::Instr: Instruction + fmt::Debug,
    F: Clone + Eq + Hash,
{
    let mut out = String::new();
    // Writing into a `String` cannot fail.
    let _ = render_into(&mut out, cfg, result);
    out
}
