//! State hook misuse.
//!
//! Each detector runs two passes: the first collects every binding
//! destructured from `useState`/`useReducer`, the second scans for
//! mutations and setter calls against those bindings.

use super::{hook_call_name, is_component_function};
use crate::core::Finding;
use crate::detectors::DetectorContext;
use crate::frontend::ast::*;
use crate::inference::mutated_path;
use crate::traversal::{as_call, NodeRef, Walker};

/// A `const [value, setter] = useState(…)` binding.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StateBinding<'a> {
    value: Option<&'a str>,
    setter: Option<&'a str>,
    /// From `useReducer`: the setter is a dispatch function
    reducer: bool,
}

fn ident_of(pat: Option<&Pat>) -> Option<&str> {
    match &pat?.kind {
        PatKind::Ident(name) => Some(name.as_str()),
        _ => None,
    }
}

/// Pass 1.
fn state_bindings<'a>(ctx: &DetectorContext<'a>) -> Vec<StateBinding<'a>> {
    ctx.stmts(|stmt, _| match &stmt.kind {
        StmtKind::Var(decl) => Some(
            decl.declarators
                .iter()
                .filter_map(|declarator| {
                    let hook = hook_call_name(declarator.init.as_ref()?)?;
                    if hook != "useState" && hook != "useReducer" {
                        return None;
                    }
                    let PatKind::Array(items) = &declarator.id.kind else {
                        return None;
                    };
                    Some(StateBinding {
                        value: ident_of(items.first()),
                        setter: ident_of(items.get(1)),
                        reducer: hook == "useReducer",
                    })
                })
                .collect::<Vec<_>>(),
        ),
        _ => None,
    })
    .into_iter()
    .flatten()
    .collect()
}

fn binding_for_value<'b, 'a>(bindings: &'b [StateBinding<'a>], name: &str) -> Option<&'b StateBinding<'a>> {
    bindings.iter().find(|b| b.value == Some(name))
}

/// Setter call `setX(args)` against a known binding.
fn setter_call<'b, 'a, 'e>(
    bindings: &'b [StateBinding<'a>],
    expr: &'e Expr,
) -> Option<(&'b StateBinding<'a>, &'e [Expr])> {
    let (callee, args) = as_call(expr)?;
    let name = callee.as_ident()?;
    let binding = bindings.iter().find(|b| b.setter == Some(name))?;
    Some((binding, args))
}

/// Name of the state value written by `expr`, if it writes one in place.
fn mutated_state<'b>(bindings: &'b [StateBinding<'_>], expr: &Expr) -> Option<&'b str> {
    let root = match &expr.kind {
        ExprKind::Assign { target, .. } => match &target.kind {
            PatKind::Ident(name) => Some(name.clone()),
            _ => None,
        },
        ExprKind::Update { arg, .. } => arg.as_ident().map(String::from),
        _ => None,
    }
    .or_else(|| mutated_path(expr).map(|path| path.root))?;
    binding_for_value(bindings, &root).and_then(|b| b.value)
}

pub fn detect_state_direct_mutation(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    let bindings = state_bindings(ctx);
    if bindings.is_empty() {
        return Vec::new();
    }
    ctx.exprs(|expr, _| {
        let state = mutated_state(&bindings, expr)?;
        Some(
            Finding::issue("state-direct-mutation", expr.loc).with_details(format!(
                "`{}` is mutated directly; create a new value and pass it to the setter",
                state
            )),
        )
    })
}

/// Setter calls made while rendering, i.e. directly in the component body
/// rather than in an event handler or effect.
pub fn detect_setstate_in_render(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    let bindings = state_bindings(ctx);
    if bindings.is_empty() {
        return Vec::new();
    }
    ctx.exprs(|expr, wctx| {
        let (binding, _) = setter_call(&bindings, expr)?;
        let in_render = wctx.enclosing_function().is_some_and(is_component_function);
        in_render.then(|| {
            Finding::issue("setstate-in-render", expr.loc).with_details(format!(
                "`{}` runs during render and triggers another render",
                binding.setter.unwrap_or("setter")
            ))
        })
    })
}

fn references(expr: &Expr, name: &str) -> bool {
    Walker::default().any(NodeRef::Expr(expr), |node, _| {
        node.as_expr().and_then(Expr::as_ident) == Some(name)
    })
}

/// `setCount(count + 1)` works until updates are batched.
pub fn detect_stale_state_update(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    let bindings = state_bindings(ctx);
    if bindings.is_empty() {
        return Vec::new();
    }
    ctx.exprs(|expr, _| {
        let (binding, args) = setter_call(&bindings, expr)?;
        let value = binding.value.filter(|_| !binding.reducer)?;
        let arg = args.first()?;
        (arg.as_function().is_none() && references(arg, value)).then(|| {
            Finding::acceptable("stale-state-update", expr.loc)
                .trivial()
                .with_details(format!(
                    "use a functional update: `{}(prev => …)`",
                    binding.setter.unwrap_or("setter")
                ))
        })
    })
}

pub fn detect_functional_state_update(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    let bindings = state_bindings(ctx);
    if bindings.is_empty() {
        return Vec::new();
    }
    ctx.exprs(|expr, _| {
        let (binding, args) = setter_call(&bindings, expr)?;
        (!binding.reducer && args.first()?.as_function().is_some())
            .then(|| Finding::good_practice("functional-state-update", expr.loc))
    })
}

#[cfg(test)]
mod tests {
    use crate::detectors::test_support::run_detector;
    use indoc::indoc;

    const COUNTER: &str = indoc! {"
        import { useState } from 'react';
        function Counter() {
          const [count, setCount] = useState(0);
          const [items, setItems] = useState([]);
          const add = (item) => {
            items.push(item);
            setItems(items);
          };
          const inc = () => setCount(count + 1);
          const dec = () => setCount(c => c - 1);
          return <button onClick={inc}>{count}</button>;
        }
    "};

    #[test]
    fn test_state_direct_mutation() {
        let findings = run_detector("state-direct-mutation", COUNTER);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location.unwrap().line, 6);
    }

    #[test]
    fn test_stale_state_update() {
        let findings = run_detector("stale-state-update", COUNTER);
        let lines: Vec<usize> = findings.iter().map(|f| f.location.unwrap().line).collect();
        assert_eq!(lines, vec![7, 9]);
        let tags = findings[0].tags;
        assert!(tags.positive && tags.negative && tags.trivial);
    }

    #[test]
    fn test_functional_state_update() {
        assert_eq!(run_detector("functional-state-update", COUNTER).len(), 1);
    }

    #[test]
    fn test_setstate_in_render() {
        let source = indoc! {"
            import { useState } from 'react';
            function Loop() {
              const [n, setN] = useState(0);
              setN(1);
              return <span onClick={() => setN(2)}>{n}</span>;
            }
        "};
        let findings = run_detector("setstate-in-render", source);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location.unwrap().line, 4);
        assert!(run_detector("setstate-in-render", COUNTER).is_empty());
    }

    #[test]
    fn test_reducer_state_mutation() {
        let source = indoc! {"
            import { useReducer } from 'react';
            function Todos() {
              const [state, dispatch] = useReducer(reduce, { todos: [] });
              state.todos = [];
              return null;
            }
        "};
        assert_eq!(run_detector("state-direct-mutation", source).len(), 1);
    }
}
