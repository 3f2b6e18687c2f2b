//! ES2015+ syntax worth recognizing.

use super::DetectorContext;
use crate::core::Finding;
use crate::frontend::ast::*;
use crate::traversal::NodeRef;

pub fn detect_arrow_function(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.collect(|node, _| match node {
        NodeRef::Function(function) if function.is_arrow => {
            Some(Finding::good_practice("arrow-function", function.loc))
        }
        _ => None,
    })
}

pub fn detect_optional_chaining(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| match &expr.kind {
        ExprKind::Member { optional: true, .. } | ExprKind::Call { optional: true, .. } => {
            Some(Finding::good_practice("optional-chaining", expr.loc))
        }
        _ => None,
    })
}

/// Spread in array literals, call arguments and object literals.
pub fn detect_spread_operator(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| match &expr.kind {
        ExprKind::Spread(_) => Some(Finding::good_practice("spread-operator", expr.loc)),
        ExprKind::Object(props) => props.iter().find_map(|prop| match prop {
            Prop::Spread(value) => Some(Finding::good_practice("spread-operator", value.loc)),
            _ => None,
        }),
        _ => None,
    })
}
