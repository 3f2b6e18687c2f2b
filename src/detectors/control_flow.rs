//! Conditionals, switches and loops.

use super::DetectorContext;
use crate::core::Finding;
use crate::frontend::ast::*;

fn is_conditional(expr: &Expr) -> bool {
    matches!(expr.unwrapped().kind, ExprKind::Conditional { .. })
}

pub fn detect_nested_ternary(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| match &expr.kind {
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } if is_conditional(test) || is_conditional(consequent) || is_conditional(alternate) => {
            Some(
                Finding::issue("nested-ternary", expr.loc)
                    .with_details("nested conditional expressions are hard to read; use if/else"),
            )
        }
        _ => None,
    })
}

/// True if control cannot fall off the end of `stmts`.
fn terminates(stmts: &[Stmt]) -> bool {
    match stmts.last().map(|s| &s.kind) {
        Some(StmtKind::Break | StmtKind::Continue | StmtKind::Return(_) | StmtKind::Throw(_)) => {
            true
        }
        Some(StmtKind::Block(inner)) => terminates(inner),
        Some(StmtKind::If {
            consequent,
            alternate: Some(alternate),
            ..
        }) => terminates(std::slice::from_ref(consequent)) && terminates(std::slice::from_ref(alternate)),
        _ => false,
    }
}

/// A non-empty case that runs into the next one.
pub fn detect_switch_fallthrough(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.stmts(|stmt, _| match &stmt.kind {
        StmtKind::Switch { cases, .. } => Some(
            cases
                .windows(2)
                .filter(|pair| !pair[0].body.is_empty() && !terminates(&pair[0].body))
                .map(|pair| {
                    Finding::issue("switch-fallthrough", pair[1].loc)
                        .with_details("the previous case falls through; add `break` or `return`")
                })
                .collect::<Vec<_>>(),
        ),
        _ => None,
    })
    .into_iter()
    .flatten()
    .collect()
}

pub fn detect_switch_missing_default(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.stmts(|stmt, _| match &stmt.kind {
        StmtKind::Switch { cases, .. } if cases.iter().all(|case| case.test.is_some()) => Some(
            Finding::issue("switch-missing-default", stmt.loc)
                .trivial()
                .with_details("add a `default` case for unexpected values"),
        ),
        _ => None,
    })
}

pub fn detect_for_of_loop(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.stmts(|stmt, _| match &stmt.kind {
        StmtKind::ForIn { of: true, .. } => Some(Finding::good_practice("for-of-loop", stmt.loc)),
        _ => None,
    })
}
