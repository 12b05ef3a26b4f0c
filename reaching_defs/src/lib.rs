// Copyright 2026 the Reaching Defs Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `reaching_defs`: intraprocedural bit-vector dataflow over control-flow graphs.
//!
//! The crate is split into a generic part and one concrete analysis:
//!
//! - [`solver`]: a forward worklist fixpoint solver over any [`Lattice`](solver::Lattice), with
//!   cooperative cancellation and an optional progress observer.
//! - [`bitset`], [`numbering`], [`transfer`]: bit-vector lattice values, dense fact numbering,
//!   and gen/kill transfer functions.
//! - [`analysis`]: reaching definitions of static-field writes: which writes of a static field
//!   may still be visible at each block's entry and exit.
//!
//! The CFG and field resolution are supplied by the embedder through [`cfg::ControlFlowGraph`],
//! [`cfg::Instruction`] and [`resolve::FieldResolver`].
//!
//! ## Example
//!
//! ```
//! use reaching_defs::analyze;
//! use reaching_defs::cfg::{BlockGraph, FieldRef, Instr};
//!
//! let x = FieldRef::new("Config", "level");
//! let mut g = BlockGraph::new();
//! let entry = g.add_block(vec![Instr::put_static(0, x.clone())]);
//! let then = g.add_block(vec![Instr::put_static(1, x.clone())]);
//! let join = g.add_block(vec![Instr::other(2)]);
//! g.add_edge(entry, then);
//! g.add_edge(entry, join);
//! g.add_edge(then, join);
//!
//! let result = analyze(&g, &|f: &FieldRef| Some(f.clone()), None)?;
//! let reaching = result.in_facts(join).unwrap();
//! assert_eq!(reaching.len(), 2);
//! assert!(reaching.contains(0) && reaching.contains(1));
//! # Ok::<(), reaching_defs::AnalysisError>(())
//! ```
//!
//! ## Logging
//!
//! Construction and solving emit `tracing` events (`debug` summaries, `trace` per node visit).
//! Nothing is printed unless the embedder installs a subscriber.

#![no_std]

extern crate alloc;

pub mod analysis;
pub mod bitset;
pub mod cfg;
mod error;
pub mod numbering;
pub mod pretty;
pub mod resolve;
pub mod result;
pub mod solver;
pub mod transfer;

pub use analysis::{ReachingDefs, analyze};
pub use error::AnalysisError;
pub use result::{Facts, ReachingDefsResult};
pub use solver::{CancelFlag, CancelSignal, SolverOptions, VisitOrder};
