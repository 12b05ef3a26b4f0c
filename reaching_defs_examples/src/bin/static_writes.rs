// Copyright 2026 the Reaching Defs Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small runnable `reaching_defs` example.
//!
//! Shows:
//! - Resolving static-field references through a class table (a write via a subclass aliases
//!   the declaring class's field)
//! - Which writes reach each block after the branches merge
//! - Reporting an unresolvable field instead of producing a partial result
//!
//! Set `RUST_LOG=reaching_defs=debug` (or `trace`) to see solver events.

use std::process::ExitCode;

use reaching_defs::cfg::{BlockGraph, FieldRef, Instr, NodeId};
use reaching_defs::resolve::ClassTable;
use reaching_defs::{AnalysisError, analyze};
use tracing_subscriber::EnvFilter;

fn class_table() -> ClassTable {
    let mut t = ClassTable::new();
    t.add_class("Settings", None);
    t.add_class("UserSettings", Some("Settings"));
    t.declare_field("Settings", "level");
    t.declare_field("Settings", "verbose");
    t
}

/// ```text
/// bb0: Settings.level = ..
///   |            \
/// bb1: UserSettings.level = ..   bb2: Settings.verbose = ..
///   |            /
/// bb3: read Settings.level
/// ```
fn method(extra: Option<FieldRef>) -> BlockGraph<Instr> {
    let mut g = BlockGraph::new();
    let b0 = g.add_block(vec![
        Instr::other(0),
        Instr::put_static(1, FieldRef::new("Settings", "level")),
    ]);
    let b1 = g.add_block(vec![Instr::put_static(
        2,
        FieldRef::new("UserSettings", "level"),
    )]);
    let mut b2_instrs = vec![Instr::put_static(3, FieldRef::new("Settings", "verbose"))];
    if let Some(field) = extra {
        b2_instrs.push(Instr::put_static(4, field));
    }
    let b2 = g.add_block(b2_instrs);
    let b3 = g.add_block(vec![Instr::get_static(
        5,
        FieldRef::new("Settings", "level"),
    )]);
    g.add_edge(b0, b1);
    g.add_edge(b0, b2);
    g.add_edge(b1, b3);
    g.add_edge(b2, b3);
    g
}

fn run(cfg: &BlockGraph<Instr>, table: &ClassTable) -> Result<(), AnalysisError> {
    let result = analyze(cfg, table, None)?;
    print!("{}", reaching_defs::pretty::render(cfg, &result));

    let join = NodeId::new(3);
    let Some(reaching) = result.in_facts(join) else {
        return Ok(());
    };
    println!("writes reaching {join}:");
    for index in reaching.iter() {
        let pos = result.fact_at(index);
        let field = result.field_of(index);
        if let (Some(pos), Some(field)) = (pos, field) {
            println!("  #{index} {pos} {}.{}", field.class, field.name);
        }
    }
    let summary = result.summary();
    println!(
        "solved in {} visits ({} updates)",
        summary.node_visits, summary.out_updates
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let table = class_table();

    if let Err(e) = run(&method(None), &table) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    println!();
    println!("with a write to an undeclared field:");
    match run(&method(Some(FieldRef::new("UserSettings", "theme"))), &table) {
        Err(AnalysisError::UnresolvedField { node, pos, field }) => {
            println!("  cannot resolve {field} (written at {pos} in {node})");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
        Ok(()) => {
            eprintln!("error: expected a resolution failure");
            ExitCode::FAILURE
        }
    }
}
