//! Human-readable reports over a parsed call graph

use crate::error::Result;
use crate::graph::{CallGraph, FunctionId, FunctionRef};
use fnv::FnvHashSet;
use std::fmt::Write;

const UNRESOLVED: &str = "<unresolved>";
const SEEN: &str = " (expanded above)";

/// Render the call tree below `root` down to `max_depth` call levels
///
/// Each function's calls are listed once, under its first appearance; later
/// call sites of the same callee are printed without their subtree, so the
/// output never exceeds one row per call record.
pub fn render_call_tree(root: FunctionRef<'_>, event: &str, max_depth: usize) -> Result<String> {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}) {}={} self={}",
        display_name(root.name()),
        root.file(),
        event,
        root.measurement(event)?,
        root.own_measurement(event)?
    );
    let mut expanded = FnvHashSet::default();
    expanded.insert(root.id());
    render_calls(&mut out, root, event, 1, max_depth, &mut expanded)?;
    Ok(out)
}

fn render_calls(
    out: &mut String,
    function: FunctionRef<'_>,
    event: &str,
    depth: usize,
    max_depth: usize,
    expanded: &mut FnvHashSet<FunctionId>,
) -> Result<()> {
    if depth > max_depth {
        return Ok(());
    }

    for call in function.calls() {
        let indent = "  ".repeat(depth);
        let callee = call.function();
        let name = callee.map_or(UNRESOLVED, |f| display_name(f.name()));
        // a subtree cut off by the depth limit does not count as expanded
        let repeat = callee.filter(|f| {
            f.call_count() > 0 && depth < max_depth && !expanded.insert(f.id())
        });
        let _ = writeln!(
            out,
            "{}-> {} [line {}] {}={}{}",
            indent,
            name,
            call.line(),
            event,
            call.measurement(event)?,
            if repeat.is_some() { SEEN } else { "" }
        );
        match callee {
            Some(callee) if repeat.is_none() => {
                render_calls(out, callee, event, depth + 1, max_depth, expanded)?
            }
            _ => {}
        }
    }
    Ok(())
}

/// Table of the `limit` most expensive functions by inclusive cost
pub fn render_function_table(graph: &CallGraph, event: &str, limit: usize) -> Result<String> {
    let index = graph.events().require(event)?;

    let mut rows: Vec<_> = graph
        .functions()
        .map(|f| (f, f.inclusive_at(index), f.own_cost().get(index)))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.id().cmp(&b.0.id())));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<50} {:>8} {:>16} {:>16}",
        "Function", "Calls", event, "Self"
    );
    let _ = writeln!(out, "{}", "─".repeat(93));
    for (function, inclusive, own) in rows.into_iter().take(limit) {
        let _ = writeln!(
            out,
            "{:<50} {:>8} {:>16} {:>16}",
            display_name(function.name()),
            function.call_count(),
            inclusive,
            own
        );
    }
    let _ = writeln!(out, "{}", "─".repeat(93));
    Ok(out)
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        UNRESOLVED
    } else {
        name
    }
}
