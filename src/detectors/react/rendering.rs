//! JSX rendering patterns: list keys, controlled inputs, conditional
//! rendering and component shape.

use super::{is_class_component, is_component_function};
use crate::core::Finding;
use crate::detectors::DetectorContext;
use crate::frontend::ast::*;
use crate::traversal::{as_method_call, root_identifier, NodeRef, Walker};

const CONTROLLED_TAGS: &[&str] = &["input", "textarea", "select"];

/// JSX elements a function returns at its own level.
fn returned_jsx(function: &Function) -> Vec<&JsxElement> {
    let returned: Vec<&Expr> = match &function.body {
        FunctionBody::Expr(expr) => vec![expr.as_ref()],
        FunctionBody::Block(stmts) => Walker::default()
            .shallow()
            .collect_stmts(stmts, |node, _| match node.as_stmt().map(|s| &s.kind) {
                Some(StmtKind::Return(Some(value))) => Some(value),
                _ => None,
            }),
    };
    returned
        .into_iter()
        .filter_map(|expr| match &expr.unwrapped().kind {
            ExprKind::Jsx(element) => Some(element.as_ref()),
            _ => None,
        })
        .collect()
}

/// Callback of `<receiver>.map(cb)` that renders JSX.
fn map_render_callback(expr: &Expr) -> Option<(&Function, Vec<&JsxElement>)> {
    let (_, method, args) = as_method_call(expr)?;
    if method != "map" {
        return None;
    }
    let callback = args.first()?.as_function()?;
    let elements = returned_jsx(callback);
    (!elements.is_empty()).then_some((callback, elements))
}

pub fn detect_list_missing_key(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (_, elements) = map_render_callback(expr)?;
        Some(
            elements
                .into_iter()
                .filter(|element| element.attr("key").is_none() && !element.has_spread_attr())
                .map(|element| {
                    let tag = element.name.as_deref().unwrap_or("fragment");
                    Finding::issue("list-missing-key", element.loc).with_details(format!(
                        "each `<{}>` rendered by `.map` needs a stable `key` prop",
                        tag
                    ))
                })
                .collect::<Vec<_>>(),
        )
    })
    .into_iter()
    .flatten()
    .collect()
}

/// `key={index}` where `index` is the map callback's second parameter.
pub fn detect_list_index_as_key(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, _| {
        let (callback, elements) = map_render_callback(expr)?;
        let index = match callback.params.get(1).map(|p| &p.kind) {
            Some(PatKind::Ident(name)) => name.as_str(),
            _ => return None,
        };
        Some(
            elements
                .into_iter()
                .filter_map(|element| match element.attr("key")? {
                    JsxAttr::Named {
                        value: Some(value),
                        loc,
                        ..
                    } if key_uses(value, index) => Some(*loc),
                    _ => None,
                })
                .map(|loc| {
                    Finding::issue("list-index-as-key", loc)
                        .trivial()
                        .with_details(format!(
                            "`key={{{}}}` changes when items are reordered; use an id from the data",
                            index
                        ))
                })
                .collect::<Vec<_>>(),
        )
    })
    .into_iter()
    .flatten()
    .collect()
}

fn key_uses(value: &Expr, index: &str) -> bool {
    match &value.unwrapped().kind {
        ExprKind::Ident(name) => name == index,
        ExprKind::Template { exprs, .. } => exprs.iter().any(|e| key_uses(e, index)),
        ExprKind::Binary {
            op: BinaryOp::Add,
            left,
            right,
        } => key_uses(left, index) || key_uses(right, index),
        _ => false,
    }
}

/// `<input value={…}>` with no way to change the value.
pub fn detect_controlled_input_without_onchange(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.collect(|node, _| {
        let NodeRef::Jsx(element) = node else {
            return None;
        };
        let tag = element.name.as_deref()?;
        if !CONTROLLED_TAGS.contains(&tag) || element.has_spread_attr() {
            return None;
        }
        let controlled = element.attr("value").is_some() || element.attr("checked").is_some();
        let handled = ["onChange", "onInput", "readOnly", "disabled"]
            .iter()
            .any(|name| element.attr(name).is_some());
        (controlled && !handled).then(|| {
            Finding::issue("controlled-input-without-onchange", element.loc).with_details(format!(
                "`<{}>` has a `value` but no `onChange`; it will be read-only",
                tag
            ))
        })
    })
}

/// `document.querySelector(…)` and similar inside a component.
pub fn detect_direct_dom_in_component(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, wctx| {
        let (object, method, _) = as_method_call(expr)?;
        if root_identifier(object) != Some("document") {
            return None;
        }
        let in_component = wctx.enclosing_functions().any(is_component_function);
        in_component.then(|| {
            Finding::issue("direct-dom-in-component", expr.loc).with_details(format!(
                "`document.{}` bypasses the framework; use a ref",
                method
            ))
        })
    })
}

/// Left operand that renders as `0` when falsy: `x.length` or a number.
fn renders_zero(left: &Expr, ctx: &DetectorContext<'_>) -> bool {
    match &left.unwrapped().kind {
        ExprKind::Member {
            prop: MemberProp::Ident(prop),
            ..
        } => prop == "length" || prop == "size" || prop.ends_with("Count"),
        ExprKind::Ident(name) => ctx.types.is(name, crate::inference::InferredType::Number),
        _ => false,
    }
}

/// `{items.length && <List />}` renders `0` for an empty list.
pub fn detect_conditional_render_zero(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.exprs(|expr, wctx| {
        let ExprKind::Binary {
            op: BinaryOp::And,
            left,
            right,
        } = &expr.kind
        else {
            return None;
        };
        let in_markup = matches!(wctx.parent(), Some(NodeRef::Jsx(_)));
        (in_markup && right.is_jsx() && renders_zero(left, ctx)).then(|| {
            Finding::issue("conditional-render-zero", expr.loc)
                .with_details("a count of 0 is rendered as `0`; compare with `> 0` first")
        })
    })
}

pub fn detect_class_component(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.collect(|node, _| match node {
        NodeRef::Class(class) if is_class_component(class) => Some(
            Finding::acceptable("class-component", class.loc)
                .with_details("function components with hooks are the modern equivalent"),
        ),
        _ => None,
    })
}

pub fn detect_props_destructuring(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.collect(|node, _| {
        let function = node.as_function().filter(|f| is_component_function(f))?;
        let first = match &function.params.first()?.kind {
            PatKind::Default { target, .. } => target.as_ref(),
            _ => function.params.first()?,
        };
        matches!(first.kind, PatKind::Object(_))
            .then(|| Finding::good_practice("props-destructuring", function.loc))
    })
}

#[cfg(test)]
mod tests {
    use crate::detectors::test_support::run_detector;
    use indoc::indoc;

    #[test]
    fn test_list_missing_key() {
        let source = indoc! {"
            import React from 'react';
            function List({ items }) {
              return <ul>{items.map(item => <li>{item.name}</li>)}</ul>;
            }
        "};
        assert_eq!(run_detector("list-missing-key", source).len(), 1);
    }

    #[test]
    fn test_list_with_key_in_block_body() {
        let source = indoc! {"
            import React from 'react';
            function List({ items }) {
              return <ul>{items.map(item => {
                return <li key={item.id}>{item.name}</li>;
              })}</ul>;
            }
        "};
        assert!(run_detector("list-missing-key", source).is_empty());
    }

    #[test]
    fn test_list_index_as_key() {
        let source = indoc! {"
            import React from 'react';
            const List = ({ items }) => (
              <ul>{items.map((item, i) => <li key={i}>{item}</li>)}</ul>
            );
        "};
        assert_eq!(run_detector("list-index-as-key", source).len(), 1);
    }

    #[test]
    fn test_controlled_input() {
        let source = "import React from 'react'; const F = () => <input value={name} />;";
        assert_eq!(run_detector("controlled-input-without-onchange", source).len(), 1);
        let handled =
            "import React from 'react'; const F = () => <input value={name} onChange={set} />;";
        assert!(run_detector("controlled-input-without-onchange", handled).is_empty());
    }

    #[test]
    fn test_direct_dom_in_component() {
        let source = indoc! {"
            import React from 'react';
            function Title() {
              const el = document.getElementById('title');
              return <h1>{el.textContent}</h1>;
            }
        "};
        assert_eq!(run_detector("direct-dom-in-component", source).len(), 1);
    }

    #[test]
    fn test_conditional_render_zero() {
        let source = "import React from 'react'; const L = ({ items }) => <div>{items.length && <List />}</div>;";
        assert_eq!(run_detector("conditional-render-zero", source).len(), 1);
        let ok = "import React from 'react'; const L = ({ items }) => <div>{items.length > 0 && <List />}</div>;";
        assert!(run_detector("conditional-render-zero", ok).is_empty());
    }

    #[test]
    fn test_class_component_is_acceptable() {
        let source = "import React from 'react'; class App extends React.Component { render() { return <div />; } }";
        let findings = run_detector("class-component", source);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].tags.positive && findings[0].tags.negative);
    }

    #[test]
    fn test_props_destructuring() {
        let source = "import React from 'react'; function Card({ title }) { return <h2>{title}</h2>; }";
        assert_eq!(run_detector("props-destructuring", source).len(), 1);
        let plain = "import React from 'react'; function Card(props) { return <h2>{props.title}</h2>; }";
        assert!(run_detector("props-destructuring", plain).is_empty());
    }
}
