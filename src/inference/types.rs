//! Declaration-site type inference.
//!
//! One pass over every variable declarator. The initializer is matched
//! against literal forms and a table of well-known constructors and factory
//! calls; everything else is unknown. Reassignment, narrowing and function
//! returns are not followed.

use crate::frontend::ast::*;
use crate::traversal::{dotted_name, NodeRef, Walker};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InferredType {
    Array,
    Object,
    String,
    Number,
    Boolean,
    Function,
    Regex,
    Map,
    Set,
    Date,
    Promise,
    Null,
    Undefined,
    Unknown,
}

impl InferredType {
    /// Values shared by reference.
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            InferredType::Array | InferredType::Object | InferredType::Map | InferredType::Set
        )
    }
}

/// Static factory calls and coercions with a known result type.
const FACTORY_TABLE: &[(&str, InferredType)] = &[
    ("Array.from", InferredType::Array),
    ("Array.of", InferredType::Array),
    ("Object.assign", InferredType::Object),
    ("Object.create", InferredType::Object),
    ("Object.fromEntries", InferredType::Object),
    ("Object.keys", InferredType::Array),
    ("Object.values", InferredType::Array),
    ("Object.entries", InferredType::Array),
    ("String", InferredType::String),
    ("JSON.stringify", InferredType::String),
    ("Number", InferredType::Number),
    ("parseInt", InferredType::Number),
    ("parseFloat", InferredType::Number),
    ("Number.parseInt", InferredType::Number),
    ("Number.parseFloat", InferredType::Number),
    ("Date.now", InferredType::Number),
    ("Boolean", InferredType::Boolean),
    ("Array.isArray", InferredType::Boolean),
    ("RegExp", InferredType::Regex),
    ("Promise.resolve", InferredType::Promise),
    ("Promise.reject", InferredType::Promise),
    ("Promise.all", InferredType::Promise),
    ("Promise.race", InferredType::Promise),
    ("Promise.allSettled", InferredType::Promise),
    ("Promise.any", InferredType::Promise),
];

const CONSTRUCTOR_TABLE: &[(&str, InferredType)] = &[
    ("Array", InferredType::Array),
    ("Map", InferredType::Map),
    ("WeakMap", InferredType::Map),
    ("Set", InferredType::Set),
    ("WeakSet", InferredType::Set),
    ("Date", InferredType::Date),
    ("Promise", InferredType::Promise),
    ("RegExp", InferredType::Regex),
    ("Object", InferredType::Object),
    ("Error", InferredType::Object),
];

/// Variable name to coarse type. Absent names are [`InferredType::Unknown`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TypeMap {
    types: BTreeMap<String, InferredType>,
}

impl TypeMap {
    pub fn get(&self, name: &str) -> InferredType {
        self.types
            .get(name)
            .copied()
            .unwrap_or(InferredType::Unknown)
    }

    pub fn is(&self, name: &str, ty: InferredType) -> bool {
        self.get(name) == ty
    }

    pub fn is_array(&self, name: &str) -> bool {
        self.is(name, InferredType::Array)
    }

    /// Object or array: the two shapes the alias tracker follows.
    pub fn is_object_or_array(&self, name: &str) -> bool {
        matches!(self.get(name), InferredType::Object | InferredType::Array)
    }

    /// Record `ty` unless `name` already has a type; the first declaration wins.
    pub fn insert_first(&mut self, name: impl Into<String>, ty: InferredType) {
        if ty != InferredType::Unknown {
            self.types.entry(name.into()).or_insert(ty);
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, InferredType)> {
        self.types.iter().map(|(name, ty)| (name.as_str(), *ty))
    }
}

/// Coarse type of an initializer expression.
pub fn infer_expr_type(expr: &Expr) -> InferredType {
    let expr = expr.unwrapped();
    match &expr.kind {
        ExprKind::Array(_) => InferredType::Array,
        ExprKind::Object(_) => InferredType::Object,
        ExprKind::Template { .. } | ExprKind::Lit(Lit::Str(_)) => InferredType::String,
        ExprKind::Lit(Lit::Num { .. }) | ExprKind::Lit(Lit::BigInt(_)) => InferredType::Number,
        ExprKind::Lit(Lit::Bool(_)) => InferredType::Boolean,
        ExprKind::Lit(Lit::Null) => InferredType::Null,
        ExprKind::Lit(Lit::Undefined) => InferredType::Undefined,
        ExprKind::Ident(name) if name == "undefined" => InferredType::Undefined,
        ExprKind::Lit(Lit::Regex { .. }) => InferredType::Regex,
        ExprKind::Function(_) | ExprKind::Class(_) => InferredType::Function,
        ExprKind::New { callee, .. } => callee
            .as_ident()
            .and_then(|name| lookup(CONSTRUCTOR_TABLE, name))
            .or_else(|| {
                callee
                    .as_ident()
                    .filter(|name| name.ends_with("Error"))
                    .map(|_| InferredType::Object)
            })
            .unwrap_or(InferredType::Unknown),
        ExprKind::Call { callee, .. } => dotted_name(callee)
            .and_then(|name| lookup(FACTORY_TABLE, &name))
            .unwrap_or(InferredType::Unknown),
        _ => InferredType::Unknown,
    }
}

fn lookup(table: &[(&str, InferredType)], name: &str) -> Option<InferredType> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, ty)| *ty)
}

/// Build the type map from every declarator in the program.
///
/// Destructuring declarators are skipped. Function declarations are recorded
/// as functions.
pub fn infer_types(program: &Program, walker: &Walker) -> TypeMap {
    let entries = walker.collect_program(program, |node, _| match node {
        NodeRef::Stmt(stmt) => match &stmt.kind {
            StmtKind::Var(decl) => Some(declared_types(decl)),
            StmtKind::For {
                init: Some(ForInit::Var(decl)),
                ..
            } => Some(declared_types(decl)),
            StmtKind::Function(function) => function
                .name
                .as_ref()
                .map(|name| vec![(name.as_str(), InferredType::Function)]),
            _ => None,
        },
        _ => None,
    });

    let mut types = TypeMap::default();
    for (name, ty) in entries.into_iter().flatten() {
        types.insert_first(name, ty);
    }
    tracing::trace!(entries = types.len(), "Inferred declaration types");
    types
}

fn declared_types(decl: &VarDecl) -> Vec<(&str, InferredType)> {
    decl.declarators
        .iter()
        .filter_map(|declarator| {
            let name = declarator.name()?;
            let init = declarator.init.as_ref()?;
            Some((name, infer_expr_type(init)))
        })
        .collect()
}
