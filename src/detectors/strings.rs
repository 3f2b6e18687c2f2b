//! String building and number parsing.

use super::DetectorContext;
use crate::core::Finding;
use crate::frontend::ast::*;
use crate::traversal::{as_call, dotted_name};

pub fn detect_parseint_without_radix(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (callee, args) = as_call(expr)?;
        let name = dotted_name(callee)?;
        (matches!(name.as_str(), "parseInt" | "Number.parseInt") && args.len() == 1).then(|| {
            Finding::issue("parseint-without-radix", expr.loc)
                .trivial()
                .with_details("pass the radix explicitly, e.g. `parseInt(value, 10)`")
        })
    })
}

/// Template literals with at least one substitution.
pub fn detect_template_literal(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| match &expr.kind {
        ExprKind::Template { exprs, .. } if !exprs.is_empty() => {
            Some(Finding::good_practice("template-literal", expr.loc))
        }
        _ => None,
    })
}

fn is_string_literal(expr: &Expr) -> bool {
    matches!(expr.unwrapped().kind, ExprKind::Lit(Lit::Str(_)))
}

fn is_value_reference(expr: &Expr) -> bool {
    matches!(
        expr.unwrapped().kind,
        ExprKind::Ident(_) | ExprKind::Member { .. } | ExprKind::Call { .. }
    )
}

/// `"literal" + name` style string building.
pub fn detect_string_concatenation(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| match &expr.kind {
        ExprKind::Binary {
            op: BinaryOp::Add,
            left,
            right,
        } if (is_string_literal(left) && is_value_reference(right))
            || (is_value_reference(left) && is_string_literal(right))
            || (is_string_literal(right) && matches!(left.kind, ExprKind::Binary { op: BinaryOp::Add, .. })) =>
        {
            Some(
                Finding::issue("string-concatenation", expr.loc)
                    .trivial()
                    .with_details("a template literal reads better: `Hello ${name}`"),
            )
        }
        _ => None,
    })
}
