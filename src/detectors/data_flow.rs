//! Data-flow detectors.
//!
//! These read the declaration-site [`TypeMap`](crate::inference::TypeMap) and
//! the [`AliasGroups`](crate::inference::AliasGroups) built before any
//! detector runs.

use super::DetectorContext;
use crate::core::Finding;
use crate::frontend::ast::*;
use crate::inference::{mutated_path, InferredType};
use crate::traversal::{as_method_call, dotted_name, is_ident, MemberPath, NodeRef, Segment};

const ITERATION_METHODS: &[&str] = &[
    "forEach",
    "map",
    "filter",
    "reduce",
    "reduceRight",
    "some",
    "every",
    "find",
    "findIndex",
    "flatMap",
];

/// Counter declared by `let i = 0` or assigned by `i = 0`.
fn zero_initialized_counter(init: &ForInit) -> Option<&str> {
    match init {
        ForInit::Var(decl) => match decl.declarators.as_slice() {
            [declarator] if declarator.init.as_ref()?.as_num_lit() == Some(0.0) => {
                declarator.name()
            }
            _ => None,
        },
        ForInit::Expr(expr) => match &expr.kind {
            ExprKind::Assign {
                op: AssignOp::Assign,
                target,
                value,
            } if value.as_num_lit() == Some(0.0) => match &target.kind {
                PatKind::Ident(name) => Some(name.as_str()),
                _ => None,
            },
            _ => None,
        },
    }
}

fn is_ident_pat(target: &Pat, name: &str) -> bool {
    matches!(&target.kind, PatKind::Ident(bound) if bound == name)
}

/// `i++`, `++i`, `i += 1` or `i = i + 1`.
fn increments_by_one(update: &Expr, counter: &str) -> bool {
    match &update.kind {
        ExprKind::Update {
            op: UpdateOp::Increment,
            arg,
            ..
        } => is_ident(arg, counter),
        ExprKind::Assign {
            op: AssignOp::Add,
            target,
            value,
        } => is_ident_pat(target, counter) && value.as_num_lit() == Some(1.0),
        ExprKind::Assign {
            op: AssignOp::Assign,
            target,
            value,
        } => {
            is_ident_pat(target, counter)
                && matches!(
                    &value.kind,
                    ExprKind::Binary { op: BinaryOp::Add, left, right }
                        if is_ident(left, counter) && right.as_num_lit() == Some(1.0)
                )
        }
        _ => false,
    }
}

/// `collection` in `collection.length`.
fn length_of(expr: &Expr) -> Option<&str> {
    match &expr.unwrapped().kind {
        ExprKind::Member {
            object,
            prop: MemberProp::Ident(prop),
            ..
        } if prop == "length" => object.as_ident(),
        _ => None,
    }
}

/// Detect `for (let i = 0; i <= arr.length; i++)`.
///
/// The last iteration reads `arr[arr.length]`, which is `undefined`. The
/// correct `i <= arr.length - 1` is not flagged.
pub fn detect_loop_bounds_off_by_one(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.stmts(|stmt, _| {
        let StmtKind::For {
            init: Some(init),
            test: Some(test),
            update: Some(update),
            ..
        } = &stmt.kind
        else {
            return None;
        };
        let counter = zero_initialized_counter(init)?;
        if !increments_by_one(update, counter) {
            return None;
        }
        let ExprKind::Binary {
            op: BinaryOp::LtEq,
            left,
            right,
        } = &test.kind
        else {
            return None;
        };
        let collection = length_of(right)?;
        (is_ident(left, counter) && ctx.types.is_array(collection)).then(|| {
            Finding::issue("loop-bounds-off-by-one", test.loc).with_details(format!(
                "`{} <= {}.length` reads one element past the end; use `<`",
                counter, collection
            ))
        })
    })
}

/// `for…in` over an array visits string keys, not elements.
pub fn detect_for_in_array(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.stmts(|stmt, _| match &stmt.kind {
        StmtKind::ForIn {
            right, of: false, ..
        } => {
            let name = right.as_ident()?;
            ctx.types.is_array(name).then(|| {
                Finding::issue("for-in-array", stmt.loc).with_details(format!(
                    "`for…in` iterates the keys of `{}` as strings; use `for…of`",
                    name
                ))
            })
        }
        _ => None,
    })
}

/// True if `path` mutates the array `name` itself: a mutating method on it
/// or an index assignment.
fn mutates_collection(path: &MemberPath, name: &str) -> bool {
    path.root == name
        && match path.segments.as_slice() {
            [] => true,
            [Segment::Index(_)] => true,
            _ => false,
        }
}

/// Detect an iteration callback that mutates the array being iterated.
///
/// Only the callback's own body is scanned; the first mutation per
/// iteration call is reported.
pub fn detect_self_mutation_during_iteration(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    let shallow = ctx.walker.shallow();
    ctx.exprs(|expr, _| {
        let (object, method, args) = as_method_call(expr)?;
        if !ITERATION_METHODS.contains(&method) {
            return None;
        }
        let name = object.as_ident()?;
        if !ctx.types.is_array(name) {
            return None;
        }
        let callback = args.first()?.as_function()?;
        shallow
            .collect(NodeRef::Function(callback), |node, _| {
                let inner = node.as_expr()?;
                mutated_path(inner)
                    .filter(|path| mutates_collection(path, name))
                    .map(|_| inner.loc)
            })
            .into_iter()
            .next()
            .map(|loc| {
                Finding::issue("self-mutation-during-iteration", loc).with_details(format!(
                    "`{}` is modified inside its own `.{}` callback",
                    name, method
                ))
            })
    })
}

/// Detect an array used as a string-keyed map.
pub fn detect_array_as_dictionary(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let ExprKind::Assign { target, value, .. } = &expr.kind else {
            return None;
        };
        let ExprKind::Member {
            object,
            prop: MemberProp::Computed(key),
            ..
        } = &target.as_expr()?.kind
        else {
            return None;
        };
        let name = object.as_ident()?;
        if !ctx.types.is_array(name) {
            return None;
        }
        let map_like = match &key.unwrapped().kind {
            ExprKind::Lit(Lit::Str(_)) => true,
            ExprKind::Template { .. } => true,
            ExprKind::Ident(key_name) => match ctx.types.get(key_name) {
                InferredType::String => true,
                InferredType::Unknown => matches!(value.unwrapped().kind, ExprKind::Object(_)),
                _ => false,
            },
            _ => false,
        };
        map_like.then(|| {
            Finding::issue("array-as-dictionary", expr.loc).with_details(format!(
                "`{}` is an array used with string keys; use an object or a `Map`",
                name
            ))
        })
    })
}

fn may_be_reference(ctx: &DetectorContext<'_>, name: &str) -> bool {
    let ty = ctx.types.get(name);
    ty == InferredType::Unknown || ty.is_reference()
}

/// Source of a one-level copy: `{...x}`, `[...x]` or `Object.assign({}, x)`.
fn shallow_copy_source<'e>(init: &'e Expr) -> Option<&'e str> {
    match &init.unwrapped().kind {
        ExprKind::Object(props) => props.iter().find_map(|prop| match prop {
            Prop::Spread(value) => value.as_ident(),
            _ => None,
        }),
        ExprKind::Array(items) => items.iter().find_map(|item| match &item.kind {
            ExprKind::Spread(value) => value.as_ident(),
            _ => None,
        }),
        ExprKind::Call { callee, args, .. }
            if dotted_name(callee).as_deref() == Some("Object.assign") =>
        {
            match args.as_slice() {
                [target, source, ..]
                    if matches!(&target.unwrapped().kind, ExprKind::Object(props) if props.is_empty()) =>
                {
                    source.as_ident()
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// Path of the object whose contents `expr` changes.
fn mutated_container(expr: &Expr) -> Option<MemberPath> {
    let mut path = mutated_path(expr)?;
    if !matches!(expr.kind, ExprKind::Call { .. }) {
        path.segments.pop();
    }
    Some(path)
}

/// Detect mutation of nested data through a shallow copy.
///
/// `const copy = {...original}; copy.nested.value = 5;` also changes
/// `original.nested.value`: the spread copies one level only.
pub fn detect_shallow_copy_nested_mutation(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    let copies: Vec<(&str, &str)> = ctx.stmts(|stmt, _| match &stmt.kind {
        StmtKind::Var(decl) => Some(
            decl.declarators
                .iter()
                .filter_map(|declarator| {
                    let copy = declarator.name()?;
                    let original = shallow_copy_source(declarator.init.as_ref()?)?;
                    may_be_reference(ctx, original).then_some((copy, original))
                })
                .collect::<Vec<_>>(),
        ),
        _ => None,
    })
    .into_iter()
    .flatten()
    .collect();
    if copies.is_empty() {
        return Vec::new();
    }

    ctx.exprs(|expr, _| {
        let container = mutated_container(expr)?;
        if container.depth() == 0 {
            return None;
        }
        let (copy, original) = copies.iter().find(|(copy, _)| container.root == *copy)?;
        let written = mutated_path(expr)?;
        Some(
            Finding::issue("shallow-copy-nested-mutation", expr.loc).with_details(format!(
                "`{}` is a shallow copy of `{}`; mutating `{}` also changes `{}`",
                copy,
                original,
                written,
                container.to_string().replacen(copy, original, 1)
            )),
        )
    })
}

/// One finding per shared alias group that is mutated.
pub fn detect_reference_sharing_mutation(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.aliases
        .shared()
        .filter_map(|group| {
            let site = group.mutations.first()?;
            let others: Vec<&str> = group.members().filter(|m| *m != site.via).collect();
            Some(
                Finding::issue("reference-sharing-mutation", site.location).with_details(format!(
                    "`{}` refers to the same value as `{}`; mutating `{}` changes both",
                    site.via,
                    others.join("`, `"),
                    site.path
                )),
            )
        })
        .collect()
}

fn is_web_storage(object: &Expr) -> bool {
    matches!(
        dotted_name(object).as_deref(),
        Some("localStorage" | "sessionStorage" | "window.localStorage" | "window.sessionStorage")
    )
}

/// `localStorage.setItem(key, obj)` stores `"[object Object]"`.
pub fn detect_storage_object_serialization(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (object, method, args) = as_method_call(expr)?;
        if method != "setItem" || !is_web_storage(object) {
            return None;
        }
        let value = args.get(1)?.unwrapped();
        let structured = match &value.kind {
            ExprKind::Object(_) | ExprKind::Array(_) => true,
            ExprKind::Ident(name) => ctx.types.is_object_or_array(name),
            _ => false,
        };
        structured.then(|| {
            Finding::issue("storage-object-serialization", expr.loc)
                .with_details("web storage keeps strings only; wrap the value in `JSON.stringify`")
        })
    })
}
