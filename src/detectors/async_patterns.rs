//! Async pattern detection
//!
//! Promise chains without error handling, async functions that never
//! await, sequential awaits in loops and deeply nested callbacks.

use super::DetectorContext;
use crate::core::Finding;
use crate::frontend::ast::*;
use crate::traversal::{as_method_call, is_loop, NodeRef, WalkContext};
use std::ptr;

/// Callback nesting depth at which `callback-hell` fires.
const CALLBACK_HELL_DEPTH: usize = 3;

/// True if `expr` is the receiver of a further member access.
fn is_receiver_of(parent: Option<NodeRef<'_>>, expr: &Expr) -> bool {
    matches!(
        parent.and_then(|p| p.as_expr()).map(|p| &p.kind),
        Some(ExprKind::Member { object, .. }) if ptr::eq(object.as_ref(), expr)
    )
}

/// True if the value of `expr` is awaited or handed to the caller.
fn is_awaited_or_returned(parent: Option<NodeRef<'_>>) -> bool {
    match parent {
        Some(NodeRef::Expr(p)) => matches!(p.kind, ExprKind::Await(_) | ExprKind::Yield(_)),
        Some(NodeRef::Stmt(p)) => matches!(p.kind, StmtKind::Return(_)),
        // expression body of an arrow function
        Some(NodeRef::Function(_)) => true,
        _ => false,
    }
}

/// Detect `.then()` chains that end without `.catch()`.
///
/// Only the end of a chain is considered: `p.then(a).then(b)` is one
/// finding, reported on the outer call. A two-argument `.then(ok, err)`
/// handles rejection itself.
pub fn detect_promise_without_catch(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, wctx| {
        let (_, method, args) = as_method_call(expr)?;
        if method != "then" || args.len() >= 2 {
            return None;
        }
        let parent = wctx.parent();
        if is_receiver_of(parent, expr) || is_awaited_or_returned(parent) {
            return None;
        }
        Some(
            Finding::issue("promise-without-catch", expr.loc)
                .with_details("promise chain without `.catch()`; rejections go unhandled"),
        )
    })
}

/// Detect async functions whose own body never awaits.
pub fn detect_async_without_await(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    let shallow = ctx.walker.shallow();
    ctx.collect(|node, _| {
        let function = node.as_function().filter(|f| f.is_async && !f.is_generator)?;
        let awaits = shallow.any(node, |inner, _| {
            matches!(inner.as_expr().map(|e| &e.kind), Some(ExprKind::Await(_)))
        });
        (!awaits).then(|| {
            let name = function.name.as_deref().unwrap_or("anonymous function");
            Finding::issue("async-without-await", function.loc)
                .trivial()
                .with_details(format!("`{}` is async but never awaits", name))
        })
    })
}

/// Body statement of a loop node.
fn loop_body(node: NodeRef<'_>) -> Option<&Stmt> {
    match &node.as_stmt()?.kind {
        StmtKind::For { body, .. }
        | StmtKind::ForIn { body, .. }
        | StmtKind::While { body, .. }
        | StmtKind::DoWhile { body, .. } => Some(body),
        _ => None,
    }
}

pub fn detect_await_in_loop(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, wctx| {
        if !matches!(expr.kind, ExprKind::Await(_)) {
            return None;
        }
        let body = wctx.ancestors_in_function().find(|node| is_loop(*node)).and_then(loop_body)?;
        (expr.loc >= body.loc).then(|| {
            Finding::issue("await-in-loop", expr.loc)
                .with_details("each iteration waits for the previous one; consider `Promise.all`")
        })
    })
}

pub fn detect_async_await_usage(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, wctx| {
        let in_async = wctx.enclosing_function().is_some_and(|f| f.is_async);
        (matches!(expr.kind, ExprKind::Await(_)) && in_async)
            .then(|| Finding::good_practice("async-await-usage", expr.loc))
    })
}

/// True if `child` is one of the arguments of the call `parent`.
fn is_call_argument(parent: NodeRef<'_>, child: NodeRef<'_>) -> bool {
    let (Some(parent), Some(child)) = (parent.as_expr(), child.as_expr()) else {
        return false;
    };
    match &parent.kind {
        ExprKind::Call { args, .. } | ExprKind::New { args, .. } => {
            args.iter().any(|arg| ptr::eq(arg, child))
        }
        _ => false,
    }
}

fn is_function_literal(node: NodeRef<'_>) -> bool {
    matches!(node.as_expr().map(|e| &e.kind), Some(ExprKind::Function(_)))
}

/// Number of function literals passed as call arguments on the path to
/// (and including) `expr`.
fn callback_depth(expr: &Expr, wctx: &WalkContext<'_>) -> usize {
    let mut path: Vec<NodeRef<'_>> = wctx.ancestors().to_vec();
    path.push(NodeRef::Expr(expr));
    path.windows(2)
        .filter(|pair| is_function_literal(pair[1]) && is_call_argument(pair[0], pair[1]))
        .count()
}

/// Detect deeply nested callbacks (callback hell)
pub fn detect_callback_hell(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, wctx| {
        if !matches!(expr.kind, ExprKind::Function(_)) {
            return None;
        }
        let depth = callback_depth(expr, wctx);
        (depth >= CALLBACK_HELL_DEPTH).then(|| {
            Finding::issue("callback-hell", expr.loc).with_details(format!(
                "callbacks nested {} levels deep; consider async/await or named functions",
                depth
            ))
        })
    })
}

#[cfg(test)]
mod tests {
    use crate::detectors::test_support::run_detector;
    use indoc::indoc;

    #[test]
    fn test_detect_callback_hell() {
        let source = indoc! {"
            getData(function (a) {
              processA(a, function (b) {
                processB(b, function (c) {
                  done(c);
                });
              });
            });
        "};
        let findings = run_detector("callback-hell", source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location.unwrap().line, 3);
    }

    #[test]
    fn test_two_levels_is_not_callback_hell() {
        let source = "load(function (a) { save(a, function () { done(); }); });";
        assert!(run_detector("callback-hell", source).is_empty());
    }

    #[test]
    fn test_promise_chain_without_catch() {
        let findings = run_detector("promise-without-catch", "fetch(url).then(r => r.json()).then(show);");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_promise_chain_with_catch() {
        let handled = "fetch(url).then(r => r.json()).catch(report);";
        assert!(run_detector("promise-without-catch", handled).is_empty());
        let returned = "function load() { return fetch(url).then(r => r.json()); }";
        assert!(run_detector("promise-without-catch", returned).is_empty());
        let both = "fetch(url).then(show, report);";
        assert!(run_detector("promise-without-catch", both).is_empty());
    }

    #[test]
    fn test_async_without_await() {
        let source = "async function load() { return 1; } async function ok() { await go(); }";
        let findings = run_detector("async-without-await", source);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].details.as_deref().unwrap().contains("load"));
    }

    #[test]
    fn test_nested_await_does_not_count_for_outer() {
        let source = "async function outer() { const f = async () => { await go(); }; return f; }";
        assert_eq!(run_detector("async-without-await", source).len(), 1);
    }

    #[test]
    fn test_await_in_loop() {
        let source = "async function run(ids) { for (const id of ids) { await save(id); } }";
        assert_eq!(run_detector("await-in-loop", source).len(), 1);
        let header = "async function run() { for (const id of await list()) { use(id); } }";
        assert!(run_detector("await-in-loop", header).is_empty());
    }

    #[test]
    fn test_async_await_usage() {
        let source = "async function run() { await go(); }";
        assert_eq!(run_detector("async-await-usage", source).len(), 1);
    }
}
