//! Node-kind predicates and small extractors shared by detectors.

use super::node::NodeRef;
use super::walker::Walker;
use crate::frontend::ast::*;
use std::fmt;

/// Methods that mutate their receiver in place (arrays, maps and sets).
const MUTATING_METHODS: &[&str] = &[
    "push",
    "pop",
    "shift",
    "unshift",
    "splice",
    "sort",
    "reverse",
    "fill",
    "copyWithin",
    "add",
    "set",
    "delete",
    "clear",
];

pub fn is_function(node: NodeRef<'_>) -> bool {
    matches!(node, NodeRef::Function(_))
}

pub fn is_loop(node: NodeRef<'_>) -> bool {
    matches!(
        node.as_stmt().map(|s| &s.kind),
        Some(StmtKind::For { .. })
            | Some(StmtKind::ForIn { .. })
            | Some(StmtKind::While { .. })
            | Some(StmtKind::DoWhile { .. })
    )
}

/// Branching constructs: `if`, `switch`, `?:` and short-circuit operators.
pub fn is_conditional_branch(node: NodeRef<'_>) -> bool {
    match node {
        NodeRef::Stmt(stmt) => matches!(stmt.kind, StmtKind::If { .. } | StmtKind::Switch { .. }),
        NodeRef::Expr(expr) => match &expr.kind {
            ExprKind::Conditional { .. } => true,
            ExprKind::Binary { op, .. } => op.is_logical(),
            _ => false,
        },
        _ => false,
    }
}

/// Name of the called function: `f` for `f()`, `push` for `a.b.push()`.
pub fn callee_name(callee: &Expr) -> Option<&str> {
    match &callee.unwrapped().kind {
        ExprKind::Ident(name) => Some(name),
        ExprKind::Member {
            prop: MemberProp::Ident(name),
            ..
        } => Some(name),
        _ => None,
    }
}

/// Receiver of a method call: `a.b` for `a.b.push()`.
pub fn callee_object(callee: &Expr) -> Option<&Expr> {
    match &callee.unwrapped().kind {
        ExprKind::Member { object, .. } => Some(object),
        _ => None,
    }
}

/// Static path of a member chain, e.g. `copy.nested.value` or `arr[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPath {
    pub root: String,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Prop(String),
    /// Computed access; carries the index text when it is a name or literal
    Index(Option<String>),
}

impl MemberPath {
    /// Number of member accesses after the root.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Path truncated to the static-property prefix.
    pub fn prop_prefix(&self) -> String {
        let mut out = self.root.clone();
        for segment in &self.segments {
            match segment {
                Segment::Prop(name) => {
                    out.push('.');
                    out.push_str(name);
                }
                Segment::Index(_) => break,
            }
        }
        out
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            match segment {
                Segment::Prop(name) => write!(f, ".{}", name)?,
                Segment::Index(Some(index)) => write!(f, "[{}]", index)?,
                Segment::Index(None) => f.write_str("[]")?,
            }
        }
        Ok(())
    }
}

/// Member path of `expr` rooted at an identifier or `this`.
pub fn member_path(expr: &Expr) -> Option<MemberPath> {
    match &expr.unwrapped().kind {
        ExprKind::Ident(name) => Some(MemberPath {
            root: name.clone(),
            segments: Vec::new(),
        }),
        ExprKind::This => Some(MemberPath {
            root: "this".to_string(),
            segments: Vec::new(),
        }),
        ExprKind::Member { object, prop, .. } => {
            let mut path = member_path(object)?;
            path.segments.push(match prop {
                MemberProp::Ident(name) | MemberProp::Private(name) => Segment::Prop(name.clone()),
                MemberProp::Computed(index) => Segment::Index(match &index.unwrapped().kind {
                    ExprKind::Ident(name) => Some(name.clone()),
                    ExprKind::Lit(Lit::Num { raw, .. }) => Some(raw.clone()),
                    ExprKind::Lit(Lit::Str(value)) => Some(format!("'{}'", value)),
                    _ => None,
                }),
            });
            Some(path)
        }
        _ => None,
    }
}

/// Identifier at the root of a member chain: `a` for `a.b[c].d`.
pub fn root_identifier(expr: &Expr) -> Option<&str> {
    match &expr.unwrapped().kind {
        ExprKind::Ident(name) => Some(name),
        ExprKind::Member { object, .. } => root_identifier(object),
        _ => None,
    }
}

/// Static dotted name of a member chain of identifiers: `React.Component`.
pub fn dotted_name(expr: &Expr) -> Option<String> {
    let path = member_path(expr)?;
    path.segments
        .iter()
        .all(|s| matches!(s, Segment::Prop(_)))
        .then(|| path.to_string())
}

pub fn is_mutating_method(name: &str) -> bool {
    MUTATING_METHODS.contains(&name)
}

pub use crate::frontend::is_hook_name;

/// Component functions are named in PascalCase.
pub fn is_component_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// True if the function can produce a value: an expression body, or a
/// `return <expr>` in its own body.
pub fn returns_value(function: &Function) -> bool {
    match &function.body {
        FunctionBody::Expr(_) => true,
        FunctionBody::Block(stmts) => !Walker::default()
            .shallow()
            .collect_stmts(stmts, |node, _| match node.as_stmt().map(|s| &s.kind) {
                Some(StmtKind::Return(Some(_))) => Some(()),
                _ => None,
            })
            .is_empty(),
    }
}

/// Call expression parts. Type wrappers are not looked through, so a
/// wrapped call is matched once, at the call itself.
pub fn as_call(expr: &Expr) -> Option<(&Expr, &[Expr])> {
    match &expr.kind {
        ExprKind::Call { callee, args, .. } => Some((callee, args)),
        _ => None,
    }
}

/// Method call `<object>.<name>(<args>)`.
pub fn as_method_call(expr: &Expr) -> Option<(&Expr, &str, &[Expr])> {
    let (callee, args) = as_call(expr)?;
    match &callee.unwrapped().kind {
        ExprKind::Member {
            object,
            prop: MemberProp::Ident(name),
            ..
        } => Some((object, name, args)),
        _ => None,
    }
}

/// True when `expr` is a reference to `name` (looking through wrappers).
pub fn is_ident(expr: &Expr, name: &str) -> bool {
    expr.as_ident() == Some(name)
}
