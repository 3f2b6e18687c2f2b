//! DOM and browser API patterns.

use super::DetectorContext;
use crate::core::Finding;
use crate::frontend::ast::*;
use crate::traversal::{as_call, as_method_call, dotted_name, is_loop, root_identifier};

pub(crate) const DOM_QUERY_METHODS: &[&str] = &[
    "querySelector",
    "querySelectorAll",
    "getElementById",
    "getElementsByClassName",
    "getElementsByTagName",
    "getElementsByName",
];

/// `document.querySelector(…)` and friends.
pub(crate) fn is_dom_query(expr: &Expr) -> bool {
    as_method_call(expr).is_some_and(|(object, method, _)| {
        DOM_QUERY_METHODS.contains(&method) && object.as_ident() == Some("document")
    })
}

pub fn detect_dom_innerhtml_assignment(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let ExprKind::Assign { target, .. } = &expr.kind else {
            return None;
        };
        let ExprKind::Member {
            prop: MemberProp::Ident(prop),
            ..
        } = &target.as_expr()?.kind
        else {
            return None;
        };
        matches!(prop.as_str(), "innerHTML" | "outerHTML").then(|| {
            Finding::issue("dom-innerhtml-assignment", expr.loc).with_details(format!(
                "assigning `{}` parses markup and can inject scripts; use `textContent` or DOM methods",
                prop
            ))
        })
    })
}

pub fn detect_document_write(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (callee, _) = as_call(expr)?;
        matches!(
            dotted_name(callee).as_deref(),
            Some("document.write") | Some("document.writeln")
        )
        .then(|| Finding::issue("document-write", expr.loc))
    })
}

/// DOM lookups repeated on every loop iteration.
pub fn detect_dom_query_in_loop(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.collect(|node, wctx| {
        let expr = node.as_expr()?;
        (is_dom_query(expr) && wctx.ancestors_in_function().any(is_loop)).then(|| {
            Finding::issue("dom-query-in-loop", expr.loc)
                .with_details("query the element once before the loop and reuse it")
        })
    })
}

pub fn detect_browser_blocking_dialog(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (callee, _) = as_call(expr)?;
        let name = dotted_name(callee)?;
        let dialog = name.strip_prefix("window.").unwrap_or(&name);
        let on_window = root_identifier(callee).is_some_and(|root| root == "window")
            || callee.as_ident().is_some();
        (on_window && matches!(dialog, "alert" | "confirm" | "prompt")).then(|| {
            Finding::issue("browser-blocking-dialog", expr.loc)
                .trivial()
                .with_details(format!("`{}` blocks the page until dismissed", dialog))
        })
    })
}
