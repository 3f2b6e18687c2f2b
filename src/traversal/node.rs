//! Borrowed view over any AST node with an explicit child list per kind.

use crate::core::Location;
use crate::frontend::ast::*;

#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Pat(&'a Pat),
    Function(&'a Function),
    Class(&'a Class),
    Jsx(&'a JsxElement),
}

impl<'a> NodeRef<'a> {
    pub fn location(&self) -> Location {
        match self {
            NodeRef::Stmt(stmt) => stmt.loc,
            NodeRef::Expr(expr) => expr.loc,
            NodeRef::Pat(pat) => pat.loc,
            NodeRef::Function(function) => function.loc,
            NodeRef::Class(class) => class.loc,
            NodeRef::Jsx(element) => element.loc,
        }
    }

    pub fn as_stmt(&self) -> Option<&'a Stmt> {
        match self {
            NodeRef::Stmt(stmt) => Some(stmt),
            _ => None,
        }
    }

    pub fn as_expr(&self) -> Option<&'a Expr> {
        match self {
            NodeRef::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&'a Function> {
        match self {
            NodeRef::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        match *self {
            NodeRef::Stmt(stmt) => stmt_children(stmt, &mut out),
            NodeRef::Expr(expr) => expr_children(expr, &mut out),
            NodeRef::Pat(pat) => pat_children(pat, &mut out),
            NodeRef::Function(function) => {
                out.extend(function.params.iter().map(NodeRef::Pat));
                match &function.body {
                    FunctionBody::Block(stmts) => out.extend(stmts.iter().map(NodeRef::Stmt)),
                    FunctionBody::Expr(expr) => out.push(NodeRef::Expr(expr)),
                }
            }
            NodeRef::Class(class) => class_children(class, &mut out),
            NodeRef::Jsx(element) => jsx_children(element, &mut out),
        }
        out
    }
}

fn var_decl_children<'a>(decl: &'a VarDecl, out: &mut Vec<NodeRef<'a>>) {
    for declarator in &decl.declarators {
        out.push(NodeRef::Pat(&declarator.id));
        if let Some(init) = &declarator.init {
            out.push(NodeRef::Expr(init));
        }
    }
}

fn prop_key_children<'a>(key: &'a PropKey, out: &mut Vec<NodeRef<'a>>) {
    if let PropKey::Computed(expr) = key {
        out.push(NodeRef::Expr(expr));
    }
}

fn stmt_children<'a>(stmt: &'a Stmt, out: &mut Vec<NodeRef<'a>>) {
    match &stmt.kind {
        StmtKind::Var(decl) => var_decl_children(decl, out),
        StmtKind::Function(function) => out.push(NodeRef::Function(function)),
        StmtKind::Class(class) => out.push(NodeRef::Class(class)),
        StmtKind::Expr(expr) => out.push(NodeRef::Expr(expr)),
        StmtKind::Block(stmts) => out.extend(stmts.iter().map(NodeRef::Stmt)),
        StmtKind::If {
            test,
            consequent,
            alternate,
        } => {
            out.push(NodeRef::Expr(test));
            out.push(NodeRef::Stmt(consequent));
            if let Some(alternate) = alternate {
                out.push(NodeRef::Stmt(alternate));
            }
        }
        StmtKind::For {
            init,
            test,
            update,
            body,
        } => {
            match init {
                Some(ForInit::Var(decl)) => var_decl_children(decl, out),
                Some(ForInit::Expr(expr)) => out.push(NodeRef::Expr(expr)),
                None => {}
            }
            out.extend(test.iter().map(NodeRef::Expr));
            out.extend(update.iter().map(NodeRef::Expr));
            out.push(NodeRef::Stmt(body));
        }
        StmtKind::ForIn {
            left, right, body, ..
        } => {
            match left {
                ForHead::Var { pat, .. } | ForHead::Pat(pat) => out.push(NodeRef::Pat(pat)),
            }
            out.push(NodeRef::Expr(right));
            out.push(NodeRef::Stmt(body));
        }
        StmtKind::While { test, body } => {
            out.push(NodeRef::Expr(test));
            out.push(NodeRef::Stmt(body));
        }
        StmtKind::DoWhile { body, test } => {
            out.push(NodeRef::Stmt(body));
            out.push(NodeRef::Expr(test));
        }
        StmtKind::Return(value) => out.extend(value.iter().map(NodeRef::Expr)),
        StmtKind::Throw(value) => out.push(NodeRef::Expr(value)),
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            out.extend(block.iter().map(NodeRef::Stmt));
            if let Some(handler) = handler {
                out.extend(handler.param.iter().map(NodeRef::Pat));
                out.extend(handler.body.iter().map(NodeRef::Stmt));
            }
            if let Some(finalizer) = finalizer {
                out.extend(finalizer.iter().map(NodeRef::Stmt));
            }
        }
        StmtKind::Switch {
            discriminant,
            cases,
        } => {
            out.push(NodeRef::Expr(discriminant));
            for case in cases {
                out.extend(case.test.iter().map(NodeRef::Expr));
                out.extend(case.body.iter().map(NodeRef::Stmt));
            }
        }
        StmtKind::Labeled { body, .. } => out.push(NodeRef::Stmt(body)),
        StmtKind::Export(ExportDecl::Decl(decl)) => out.push(NodeRef::Stmt(decl)),
        StmtKind::Export(ExportDecl::Default(expr)) => out.push(NodeRef::Expr(expr)),
        StmtKind::Export(ExportDecl::Named { .. })
        | StmtKind::Import(_)
        | StmtKind::TypeDecl(_)
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Empty
        | StmtKind::Debugger
        | StmtKind::Unknown => {}
    }
}

fn expr_children<'a>(expr: &'a Expr, out: &mut Vec<NodeRef<'a>>) {
    match &expr.kind {
        ExprKind::Template { exprs, .. } => out.extend(exprs.iter().map(NodeRef::Expr)),
        ExprKind::Array(items) | ExprKind::Sequence(items) => {
            out.extend(items.iter().map(NodeRef::Expr))
        }
        ExprKind::Object(props) => {
            for prop in props {
                match prop {
                    Prop::KeyValue { key, value, .. } => {
                        prop_key_children(key, out);
                        out.push(NodeRef::Expr(value));
                    }
                    Prop::Method { key, function } => {
                        prop_key_children(key, out);
                        out.push(NodeRef::Function(function));
                    }
                    Prop::Spread(value) => out.push(NodeRef::Expr(value)),
                    Prop::Shorthand { .. } => {}
                }
            }
        }
        ExprKind::Function(function) => out.push(NodeRef::Function(function)),
        ExprKind::Class(class) => out.push(NodeRef::Class(class)),
        ExprKind::Call { callee, args, .. } | ExprKind::New { callee, args } => {
            out.push(NodeRef::Expr(callee));
            out.extend(args.iter().map(NodeRef::Expr));
        }
        ExprKind::Member { object, prop, .. } => {
            out.push(NodeRef::Expr(object));
            if let MemberProp::Computed(index) = prop {
                out.push(NodeRef::Expr(index));
            }
        }
        ExprKind::Assign { target, value, .. } => {
            out.push(NodeRef::Pat(target));
            out.push(NodeRef::Expr(value));
        }
        ExprKind::Update { arg, .. }
        | ExprKind::Unary { arg, .. }
        | ExprKind::Spread(arg)
        | ExprKind::Await(arg)
        | ExprKind::TypeWrap(arg) => out.push(NodeRef::Expr(arg)),
        ExprKind::Yield(arg) => out.extend(arg.iter().map(|a| NodeRef::Expr(a))),
        ExprKind::Binary { left, right, .. } => {
            out.push(NodeRef::Expr(left));
            out.push(NodeRef::Expr(right));
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            out.push(NodeRef::Expr(test));
            out.push(NodeRef::Expr(consequent));
            out.push(NodeRef::Expr(alternate));
        }
        ExprKind::Jsx(element) => out.push(NodeRef::Jsx(element)),
        ExprKind::Ident(_)
        | ExprKind::This
        | ExprKind::Super
        | ExprKind::Lit(_)
        | ExprKind::Unknown => {}
    }
}

fn pat_children<'a>(pat: &'a Pat, out: &mut Vec<NodeRef<'a>>) {
    match &pat.kind {
        PatKind::Object(props) => {
            for prop in props {
                match prop {
                    ObjectPatProp::KeyValue { key, value } => {
                        prop_key_children(key, out);
                        out.push(NodeRef::Pat(value));
                    }
                    ObjectPatProp::Shorthand { default, .. } => {
                        out.extend(default.iter().map(NodeRef::Expr))
                    }
                    ObjectPatProp::Rest(rest) => out.push(NodeRef::Pat(rest)),
                }
            }
        }
        PatKind::Array(items) => out.extend(items.iter().map(NodeRef::Pat)),
        PatKind::Rest(inner) => out.push(NodeRef::Pat(inner)),
        PatKind::Default { target, default } => {
            out.push(NodeRef::Pat(target));
            out.push(NodeRef::Expr(default));
        }
        PatKind::Expr(expr) => out.push(NodeRef::Expr(expr)),
        PatKind::Ident(_) | PatKind::Unknown => {}
    }
}

fn class_children<'a>(class: &'a Class, out: &mut Vec<NodeRef<'a>>) {
    out.extend(class.super_class.iter().map(NodeRef::Expr));
    for member in &class.members {
        match member {
            ClassMember::Method { key, function, .. } => {
                prop_key_children(key, out);
                out.push(NodeRef::Function(function));
            }
            ClassMember::Field { key, value, .. } => {
                prop_key_children(key, out);
                out.extend(value.iter().map(NodeRef::Expr));
            }
            ClassMember::StaticBlock(stmts) => out.extend(stmts.iter().map(NodeRef::Stmt)),
        }
    }
}

fn jsx_children<'a>(element: &'a JsxElement, out: &mut Vec<NodeRef<'a>>) {
    for attr in &element.attrs {
        match attr {
            JsxAttr::Named { value, .. } => out.extend(value.iter().map(NodeRef::Expr)),
            JsxAttr::Spread(expr) => out.push(NodeRef::Expr(expr)),
        }
    }
    for child in &element.children {
        match child {
            JsxChild::Expr(expr) => out.push(NodeRef::Expr(expr)),
            JsxChild::Element(nested) => out.push(NodeRef::Jsx(nested)),
            JsxChild::Text(_) => {}
        }
    }
}
