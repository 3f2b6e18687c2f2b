//! Array method pitfalls and idioms.

use super::DetectorContext;
use crate::core::Finding;
use crate::frontend::ast::*;
use crate::traversal::{as_method_call, returns_value, NodeRef};

/// Array methods whose callback result is used.
const VALUE_CALLBACK_METHODS: &[&str] = &[
    "map",
    "filter",
    "find",
    "findIndex",
    "findLast",
    "findLastIndex",
    "some",
    "every",
    "reduce",
    "reduceRight",
    "flatMap",
    "sort",
];

const CHAINABLE_METHODS: &[&str] = &["map", "filter", "reduce", "flatMap"];

/// A block-bodied callback that never returns a value.
///
/// `[1, 2, 3].map(n => n)` is fine; `[1, 2, 3].map(n => { n * 2; })`
/// yields an array of `undefined`.
pub fn detect_array_callback_missing_return(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (_, method, args) = as_method_call(expr)?;
        if !VALUE_CALLBACK_METHODS.contains(&method) {
            return None;
        }
        let callback = args.first()?.as_function()?;
        let block_body = matches!(callback.body, FunctionBody::Block(_));
        (block_body && !callback.is_generator && !returns_value(callback)).then(|| {
            Finding::issue("array-callback-missing-return", callback.loc).with_details(format!(
                "the `.{}` callback never returns a value",
                method
            ))
        })
    })
}

/// `.forEach` always returns `undefined`; using it as a value is a bug.
pub fn detect_foreach_return_value(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, wctx| {
        let (_, method, _) = as_method_call(expr)?;
        if method != "forEach" {
            return None;
        }
        let used = match wctx.parent()? {
            NodeRef::Stmt(stmt) => matches!(stmt.kind, StmtKind::Var(_) | StmtKind::Return(Some(_))),
            NodeRef::Expr(parent) => !matches!(parent.kind, ExprKind::Sequence(_)),
            _ => false,
        };
        used.then(|| {
            Finding::issue("foreach-return-value", expr.loc)
                .with_details("`forEach` returns undefined; use `map` to build a new array")
        })
    })
}

pub fn detect_array_method_chaining(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (object, method, _) = as_method_call(expr)?;
        let (_, inner, _) = as_method_call(object.unwrapped())?;
        (CHAINABLE_METHODS.contains(&method) && CHAINABLE_METHODS.contains(&inner))
            .then(|| Finding::good_practice("array-method-chaining", expr.loc))
    })
}

/// `delete arr[i]` leaves a hole instead of removing the element.
pub fn detect_delete_array_element(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let ExprKind::Unary {
            op: UnaryOp::Delete,
            arg,
        } = &expr.kind
        else {
            return None;
        };
        let ExprKind::Member {
            object,
            prop: MemberProp::Computed(_),
            ..
        } = &arg.unwrapped().kind
        else {
            return None;
        };
        let name = object.as_ident()?;
        ctx.types.is_array(name).then(|| {
            Finding::issue("delete-array-element", expr.loc).with_details(format!(
                "`delete` leaves a hole in `{}`; use `splice` or `filter`",
                name
            ))
        })
    })
}

#[cfg(test)]
mod tests {
    use crate::detectors::test_support::run_detector;

    #[test]
    fn test_implicit_return_is_fine() {
        assert!(run_detector("array-callback-missing-return", "[1, 2, 3].map(n => n);").is_empty());
    }

    #[test]
    fn test_empty_block_body_is_flagged() {
        let findings = run_detector("array-callback-missing-return", "[1, 2, 3].map(n => { });");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].details.as_deref().unwrap().contains(".map"));
    }

    #[test]
    fn test_return_in_nested_callback_does_not_count() {
        let source = "rows.filter(row => { row.cells.some(c => { return c.ok; }); });";
        let findings = run_detector("array-callback-missing-return", source);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_foreach_return_value() {
        assert_eq!(
            run_detector("foreach-return-value", "const out = items.forEach(f);").len(),
            1
        );
        assert!(run_detector("foreach-return-value", "items.forEach(f);").is_empty());
    }

    #[test]
    fn test_array_method_chaining() {
        let source = "const total = items.filter(i => i.ok).map(i => i.price);";
        assert_eq!(run_detector("array-method-chaining", source).len(), 1);
    }

    #[test]
    fn test_delete_array_element() {
        let source = "const arr = [1, 2, 3]; delete arr[1];";
        assert_eq!(run_detector("delete-array-element", source).len(), 1);
        let object = "const obj = { a: 1 }; delete obj['a'];";
        assert!(run_detector("delete-array-element", object).is_empty());
    }
}
