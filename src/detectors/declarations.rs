//! Variable declaration patterns: `var`, `const`, `let` and hoisting.

use super::DetectorContext;
use crate::core::Finding;
use crate::frontend::ast::*;
use crate::traversal::NodeRef;
use std::collections::HashSet;

/// Declarations reachable at `node`, including `for` heads.
fn declarations_at<'a>(node: NodeRef<'a>) -> Vec<(DeclKind, &'a Pat, Option<&'a Expr>)> {
    let Some(stmt) = node.as_stmt() else {
        return Vec::new();
    };
    match &stmt.kind {
        StmtKind::Var(decl)
        | StmtKind::For {
            init: Some(ForInit::Var(decl)),
            ..
        } => decl
            .declarators
            .iter()
            .map(|d| (decl.kind, &d.id, d.init.as_ref()))
            .collect(),
        StmtKind::ForIn {
            left: ForHead::Var { kind, pat },
            ..
        } => vec![(*kind, pat, None)],
        _ => Vec::new(),
    }
}

/// `var` declarations are function-scoped and hoisted.
pub fn detect_var_hoisting(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.collect(|node, _| {
        declarations_at(node)
            .into_iter()
            .find(|(kind, _, _)| *kind == DeclKind::Var)
            .map(|(_, pat, _)| {
                Finding::issue("var-hoisting", node.location()).with_details(format!(
                    "`var {}` is function-scoped and hoisted; prefer `let` or `const`",
                    pat.bound_names().join(", ")
                ))
            })
    })
}

pub fn detect_const_declaration(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.collect(|node, _| {
        declarations_at(node)
            .into_iter()
            .any(|(kind, _, _)| kind == DeclKind::Const)
            .then(|| Finding::good_practice("const-declaration", node.location()))
    })
}

/// Every name that is assigned or updated anywhere after its declaration.
fn reassigned_names<'a>(ctx: &DetectorContext<'a>) -> HashSet<&'a str> {
    ctx.collect(|node, _| match node {
        NodeRef::Expr(expr) => match &expr.kind {
            ExprKind::Assign { target, .. } => Some(target.bound_names()),
            ExprKind::Update { arg, .. } => arg.as_ident().map(|name| vec![name]),
            _ => None,
        },
        NodeRef::Stmt(Stmt {
            kind:
                StmtKind::ForIn {
                    left: ForHead::Pat(pat),
                    ..
                },
            ..
        }) => Some(pat.bound_names()),
        _ => None,
    })
    .into_iter()
    .flatten()
    .collect()
}

/// `let` bindings that are never reassigned.
pub fn detect_prefer_const(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    let reassigned = reassigned_names(ctx);
    ctx.stmts(|stmt, _| match &stmt.kind {
        StmtKind::Var(decl) if decl.kind == DeclKind::Let => Some(
            decl.declarators
                .iter()
                .filter(|d| d.init.is_some())
                .filter(|d| {
                    let names = d.id.bound_names();
                    !names.is_empty() && names.iter().all(|name| !reassigned.contains(name))
                })
                .map(|d| {
                    Finding::issue("prefer-const", d.loc)
                        .trivial()
                        .with_details(format!(
                            "`{}` is never reassigned; declare it with `const`",
                            d.id.bound_names().join(", ")
                        ))
                })
                .collect::<Vec<_>>(),
        ),
        _ => None,
    })
    .into_iter()
    .flatten()
    .collect()
}

/// Top-level `var` declarations with an initializer that are read by an
/// earlier top-level statement. Function bodies are skipped since they run
/// later.
pub fn detect_hoisting_use_before_init(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    let body = &ctx.program.body;
    let shallow = ctx.walker.shallow();
    let mut findings = Vec::new();

    for (index, stmt) in body.iter().enumerate() {
        let StmtKind::Var(decl) = &stmt.kind else {
            continue;
        };
        if decl.kind != DeclKind::Var {
            continue;
        }
        for declarator in decl.declarators.iter().filter(|d| d.init.is_some()) {
            let Some(name) = declarator.name() else {
                continue;
            };
            let first_use = shallow
                .collect_stmts(&body[..index], |node, _| match node {
                    NodeRef::Expr(expr) if expr.as_ident() == Some(name) => Some(expr.loc),
                    _ => None,
                })
                .into_iter()
                .next();
            if let Some(location) = first_use {
                findings.push(
                    Finding::issue("hoisting-use-before-init", location).with_details(format!(
                        "`{}` is used before its `var` initialization on line {}; it is `undefined` here",
                        name, declarator.loc.line
                    )),
                );
            }
        }
    }
    findings
}

/// Object or array destructuring in declarations, loop heads and parameters.
pub fn detect_destructuring(ctx: &DetectorContext<'_>) -> Vec<Finding> {
    ctx.collect(|node, _| match node {
        NodeRef::Function(function) => function
            .params
            .iter()
            .find(|param| param.is_destructuring())
            .map(|param| Finding::good_practice("destructuring", param.loc)),
        _ => declarations_at(node)
            .into_iter()
            .find(|(_, pat, _)| pat.is_destructuring())
            .map(|(_, pat, _)| Finding::good_practice("destructuring", pat.loc)),
    })
}

#[cfg(test)]
mod tests {
    use crate::detectors::test_support::run_detector;

    #[test]
    fn test_var_hoisting() {
        let findings = run_detector("var-hoisting", "var x = 1;\nvar y = 2;");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location.unwrap().line, 1);
        assert!(run_detector("var-hoisting", "let x = 1;").is_empty());
    }

    #[test]
    fn test_prefer_const() {
        let findings = run_detector("prefer-const", "let a = 1; let b = 2; b += 1; let c = 0; c++;");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].tags.trivial);
        assert!(findings[0].details.as_deref().unwrap().contains("`a`"));
    }

    #[test]
    fn test_hoisting_use_before_init() {
        let findings = run_detector(
            "hoisting-use-before-init",
            "console.log(total);\nvar total = 10;",
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location.unwrap().line, 1);
    }

    #[test]
    fn test_hoisting_ignores_function_bodies() {
        let findings = run_detector(
            "hoisting-use-before-init",
            "function show() { return total; }\nvar total = 10;\nshow();",
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_destructuring_in_params() {
        let findings = run_detector("destructuring", "function f({ a, b }) { return a + b; }");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].tags.idiomatic);
    }

    #[test]
    fn test_const_declaration_reported_once() {
        let findings = run_detector("const-declaration", "const a = 1; const b = 2;");
        assert_eq!(findings.len(), 1);
    }
}
