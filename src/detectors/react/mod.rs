//! Component-framework detectors.
//!
//! Registered with `framework_only`, so the orchestrator runs them only
//! when the front end saw a framework import, a hook call or markup.

pub mod hooks;
pub mod rendering;
pub mod state;

use crate::frontend::ast::*;
use crate::traversal::{as_call, callee_name, dotted_name, is_component_name, is_hook_name};

/// Hook name of a call such as `useState(0)` or `React.useState(0)`.
pub(crate) fn hook_call_name(expr: &Expr) -> Option<&str> {
    let (callee, _) = as_call(expr)?;
    let name = callee_name(callee)?;
    let qualified = match &callee.unwrapped().kind {
        ExprKind::Ident(_) => true,
        ExprKind::Member { object, .. } => object.as_ident() == Some("React"),
        _ => false,
    };
    (qualified && is_hook_name(name)).then_some(name)
}

pub(crate) fn is_component_function(function: &Function) -> bool {
    function.name.as_deref().is_some_and(is_component_name)
}

pub(crate) fn is_hook_function(function: &Function) -> bool {
    function.name.as_deref().is_some_and(is_hook_name)
}

const COMPONENT_BASES: &[&str] = &[
    "Component",
    "PureComponent",
    "React.Component",
    "React.PureComponent",
];

pub(crate) fn is_class_component(class: &Class) -> bool {
    class
        .super_class
        .as_ref()
        .and_then(dotted_name)
        .is_some_and(|base| COMPONENT_BASES.contains(&base.as_str()))
}
