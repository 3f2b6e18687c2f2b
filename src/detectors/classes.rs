//! Class syntax and prototype patterns.

use super::DetectorContext;
use crate::core::{Finding, Location};
use crate::frontend::ast::*;
use crate::traversal::{as_call, dotted_name, member_path, NodeRef, Segment};

const BUILTINS: &[&str] = &[
    "Array", "Object", "String", "Number", "Boolean", "Function", "Date", "RegExp", "Promise",
    "Map", "Set", "Error",
];

fn constructor_of(class: &Class) -> Option<&Function> {
    class.members.iter().find_map(|member| match member {
        ClassMember::Method {
            function,
            kind: MethodKind::Constructor,
            ..
        } => Some(function),
        _ => None,
    })
}

/// `this` touched before `super()` in a derived class constructor.
pub fn detect_this_before_super(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    let shallow = ctx.walker.shallow();
    ctx.collect(|node, _| match node {
        NodeRef::Class(class) if class.super_class.is_some() => Some(class),
        _ => None,
    })
    .into_iter()
    .filter_map(constructor_of)
    .flat_map(|constructor| {
        let body = constructor.body_stmts();
        let first_super: Option<Location> = shallow
            .collect_stmts(body, |node, _| match node.as_expr().map(|e| &e.kind) {
                Some(ExprKind::Call { callee, .. })
                    if matches!(callee.kind, ExprKind::Super) =>
                {
                    node.as_expr().map(|e| e.loc)
                }
                _ => None,
            })
            .into_iter()
            .next();
        shallow
            .collect_stmts(body, |node, _| match node.as_expr() {
                Some(expr) if matches!(expr.kind, ExprKind::This) => Some(expr.loc),
                _ => None,
            })
            .into_iter()
            .filter(move |loc| first_super.map_or(true, |sup| *loc < sup))
            .map(|loc| {
                Finding::issue("this-before-super", loc)
                    .with_details("call `super()` before using `this` in a derived constructor")
            })
            .collect::<Vec<_>>()
    })
    .collect()
}

fn extended_builtin(target: &Expr) -> Option<String> {
    let path = member_path(target)?;
    let on_prototype = matches!(path.segments.first(), Some(Segment::Prop(p)) if p == "prototype");
    (BUILTINS.contains(&path.root.as_str()) && on_prototype && path.depth() >= 2)
        .then(|| path.root.clone())
}

/// Assigning to `Array.prototype.x` and similar.
pub fn detect_builtin_prototype_extension(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let builtin = match &expr.kind {
            ExprKind::Assign { target, .. } => extended_builtin(target.as_expr()?),
            ExprKind::Call { .. } => {
                let (callee, args) = as_call(expr)?;
                if dotted_name(callee).as_deref() != Some("Object.defineProperty") {
                    return None;
                }
                let path = member_path(args.first()?)?;
                (BUILTINS.contains(&path.root.as_str())
                    && path.to_string() == format!("{}.prototype", path.root))
                .then(|| path.root.clone())
            }
            _ => None,
        }?;
        Some(
            Finding::issue("builtin-prototype-extension", expr.loc).with_details(format!(
                "extending `{}.prototype` changes every {} in the program",
                builtin, builtin
            )),
        )
    })
}

pub fn detect_class_syntax(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.collect(|node, _| match node {
        NodeRef::Class(class) => Some(Finding::good_practice("class-syntax", class.loc)),
        _ => None,
    })
}
