//! JSON, Date and RegExp pitfalls.

use super::DetectorContext;
use crate::core::Finding;
use crate::frontend::ast::*;
use crate::traversal::{as_call, as_method_call, dotted_name, NodeRef, WalkContext};
use std::collections::HashSet;

fn is_call_to(expr: &Expr, name: &str) -> bool {
    as_call(expr)
        .and_then(|(callee, _)| dotted_name(callee))
        .is_some_and(|callee| callee == name)
}

/// True if `node` sits in the protected block of an enclosing `try`.
pub(crate) fn inside_try_block(node: NodeRef<'_>, ctx: &WalkContext<'_>) -> bool {
    let ancestors = ctx.ancestors();
    ancestors.iter().enumerate().any(|(i, ancestor)| {
        let Some(Stmt {
            kind: StmtKind::Try { block, .. },
            ..
        }) = ancestor.as_stmt()
        else {
            return false;
        };
        let child = ancestors.get(i + 1).copied().unwrap_or(node);
        match child {
            NodeRef::Stmt(stmt) => block.iter().any(|b| std::ptr::eq(b, stmt)),
            _ => false,
        }
    })
}

pub fn detect_json_parse_without_try(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.collect(|node, wctx| {
        let expr = node.as_expr()?;
        (is_call_to(expr, "JSON.parse") && !inside_try_block(node, wctx)).then(|| {
            Finding::issue("json-parse-without-try", expr.loc)
                .with_details("`JSON.parse` throws on malformed input; wrap it in try/catch")
        })
    })
}

/// `JSON.parse(JSON.stringify(x))` works for plain data but drops dates,
/// functions and `undefined`.
pub fn detect_json_deep_clone(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (callee, args) = as_call(expr)?;
        let is_clone = dotted_name(callee).as_deref() == Some("JSON.parse")
            && args.first().is_some_and(|arg| is_call_to(arg, "JSON.stringify"));
        is_clone.then(|| {
            Finding::acceptable("json-deep-clone", expr.loc)
                .with_details("`structuredClone(value)` keeps dates, maps and sets intact")
        })
    })
}

/// `new Date(year, month, …)` with a month literal outside 0–11.
pub fn detect_date_month_off_by_one(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| match &expr.kind {
        ExprKind::New { callee, args } if callee.as_ident() == Some("Date") && args.len() >= 2 => {
            let month = args[1].as_num_lit()?;
            (month >= 12.0).then(|| {
                Finding::issue("date-month-off-by-one", args[1].loc).with_details(format!(
                    "months are zero-based; {} rolls over into the next year",
                    month
                ))
            })
        }
        _ => None,
    })
}

fn has_global_flag(expr: &Expr) -> bool {
    match &expr.unwrapped().kind {
        ExprKind::Lit(Lit::Regex { flags, .. }) => flags.contains('g'),
        ExprKind::New { callee, args } if callee.as_ident() == Some("RegExp") => args
            .get(1)
            .and_then(|flags| flags.as_str_lit())
            .is_some_and(|flags| flags.contains('g')),
        _ => false,
    }
}

/// `.test()` on a global regex keeps `lastIndex` state between calls.
pub fn detect_regex_global_test(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    let global_regexes: HashSet<&str> = ctx
        .stmts(|stmt, _| match &stmt.kind {
            StmtKind::Var(decl) => Some(
                decl.declarators
                    .iter()
                    .filter(|d| d.init.as_ref().is_some_and(has_global_flag))
                    .filter_map(|d| d.name())
                    .collect::<Vec<_>>(),
            ),
            _ => None,
        })
        .into_iter()
        .flatten()
        .collect();

    ctx.exprs(|expr, _| {
        let (object, method, _) = as_method_call(expr)?;
        let global = has_global_flag(object)
            || object
                .as_ident()
                .is_some_and(|name| global_regexes.contains(name));
        (method == "test" && global).then(|| {
            Finding::issue("regex-global-test", expr.loc)
                .with_details("a `g` regex remembers `lastIndex`, so repeated `.test()` calls alternate results")
        })
    })
}
