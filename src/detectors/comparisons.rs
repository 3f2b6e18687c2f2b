//! Equality and comparison patterns.

use super::DetectorContext;
use crate::core::Finding;
use crate::frontend::ast::*;
use crate::traversal::dotted_name;

const TYPEOF_RESULTS: &[&str] = &[
    "undefined",
    "object",
    "boolean",
    "number",
    "string",
    "function",
    "symbol",
    "bigint",
];

fn binary(expr: &Expr) -> Option<(BinaryOp, &Expr, &Expr)> {
    match &expr.kind {
        ExprKind::Binary { op, left, right } => Some((*op, left, right)),
        _ => None,
    }
}

fn is_null(expr: &Expr) -> bool {
    matches!(expr.unwrapped().kind, ExprKind::Lit(Lit::Null))
}

fn is_nan(expr: &Expr) -> bool {
    expr.as_ident() == Some("NaN") || dotted_name(expr).as_deref() == Some("Number.NaN")
}

/// `==` and `!=`, except the `x == null` idiom.
pub fn detect_loose_equality(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (op, left, right) = binary(expr)?;
        if !op.is_loose_equality() || is_null(left) || is_null(right) {
            return None;
        }
        let strict = if op == BinaryOp::Eq { "===" } else { "!==" };
        Some(
            Finding::issue("loose-equality", expr.loc)
                .trivial()
                .with_details(format!("loose comparison coerces types; use `{}`", strict)),
        )
    })
}

pub fn detect_strict_equality(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (op, _, _) = binary(expr)?;
        matches!(op, BinaryOp::StrictEq | BinaryOp::StrictNotEq)
            .then(|| Finding::good_practice("strict-equality", expr.loc))
    })
}

/// Comparisons against `NaN` are always false; `Number.isNaN` is needed.
pub fn detect_nan_comparison(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (op, left, right) = binary(expr)?;
        (op.is_comparison() && (is_nan(left) || is_nan(right))).then(|| {
            Finding::issue("nan-comparison", expr.loc)
                .with_details("comparing with NaN is always false; use `Number.isNaN(value)`")
        })
    })
}

pub fn detect_invalid_typeof_comparison(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (op, left, right) = binary(expr)?;
        if !op.is_equality() {
            return None;
        }
        let is_typeof = |e: &Expr| {
            matches!(
                e.unwrapped().kind,
                ExprKind::Unary {
                    op: UnaryOp::Typeof,
                    ..
                }
            )
        };
        let literal = if is_typeof(left) {
            right.as_str_lit()
        } else if is_typeof(right) {
            left.as_str_lit()
        } else {
            None
        }?;
        (!TYPEOF_RESULTS.contains(&literal)).then(|| {
            Finding::issue("invalid-typeof-comparison", expr.loc).with_details(format!(
                "`typeof` never returns \"{}\"",
                literal
            ))
        })
    })
}

/// Exact equality against a fractional literal.
pub fn detect_float_equality(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (op, left, right) = binary(expr)?;
        let fractional = |e: &Expr| e.as_num_lit().is_some_and(|v| v.is_finite() && v.fract() != 0.0);
        (op.is_equality() && (fractional(left) || fractional(right))).then(|| {
            Finding::issue("float-equality", expr.loc).with_details(
                "floating-point results are rarely exact; compare with a tolerance such as `Number.EPSILON`",
            )
        })
    })
}
