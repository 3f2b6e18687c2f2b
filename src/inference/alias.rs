//! Alias and mutation tracking for object and array values.
//!
//! Pass 1 records aliasing edges from declarations and object-literal
//! properties. Pass 2 records mutations whose target resolves to a group
//! with at least two members. Pass 1 always completes before pass 2 starts.

use super::types::TypeMap;
use crate::core::Location;
use crate::frontend::ast::*;
use crate::traversal::{
    as_call, callee_name, dotted_name, is_mutating_method, member_path, MemberPath, NodeRef,
    Walker,
};
use std::collections::{BTreeMap, HashMap};

/// Where an alias member was mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationSite {
    /// Mutated path as written, e.g. `b.x` or `list.push`
    pub path: String,
    /// Alias member the path was resolved through
    pub via: String,
    pub location: Location,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasGroup {
    pub canonical: String,
    /// Alternate names and property paths, in discovery order
    pub aliases: Vec<String>,
    pub mutations: Vec<MutationSite>,
}

impl AliasGroup {
    /// Canonical name plus aliases.
    pub fn size(&self) -> usize {
        1 + self.aliases.len()
    }

    pub fn is_shared(&self) -> bool {
        self.size() >= 2
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AliasGroups {
    groups: BTreeMap<String, AliasGroup>,
    canonical_of: HashMap<String, String>,
}

impl AliasGroups {
    /// Canonical source of `name`, following alias-of-alias chains.
    pub fn canonical(&self, name: &str) -> Option<&str> {
        if self.groups.contains_key(name) {
            return Some(self.groups[name].canonical.as_str());
        }
        self.canonical_of.get(name).map(String::as_str)
    }

    pub fn group(&self, canonical: &str) -> Option<&AliasGroup> {
        self.groups.get(canonical)
    }

    /// Groups with at least two members, ordered by canonical name.
    pub fn shared(&self) -> impl Iterator<Item = &AliasGroup> {
        self.groups.values().filter(|group| group.is_shared())
    }

    fn add_alias(&mut self, alias: String, source: &str) {
        let canonical = self
            .canonical(source)
            .map(String::from)
            .unwrap_or_else(|| source.to_string());
        if alias == canonical || self.canonical_of.contains_key(&alias) {
            return;
        }
        let group = self
            .groups
            .entry(canonical.clone())
            .or_insert_with(|| AliasGroup {
                canonical: canonical.clone(),
                ..AliasGroup::default()
            });
        group.aliases.push(alias.clone());
        self.canonical_of.insert(alias, canonical);
    }

    /// Resolve a mutated path to its group: the longest static prefix that is
    /// a known alias or canonical name.
    fn resolve(&self, path: &MemberPath) -> Option<(String, String)> {
        let prefix = path.prop_prefix();
        let mut candidates: Vec<&str> = prefix
            .char_indices()
            .filter(|(_, c)| *c == '.')
            .map(|(i, _)| &prefix[..i])
            .collect();
        candidates.push(&prefix);
        candidates
            .into_iter()
            .rev()
            .find_map(|candidate| {
                self.canonical(candidate)
                    .map(|canonical| (canonical.to_string(), candidate.to_string()))
            })
    }

    fn record_mutation(&mut self, path: &MemberPath, location: Location) {
        let Some((canonical, via)) = self.resolve(path) else {
            return;
        };
        if let Some(group) = self.groups.get_mut(&canonical) {
            if group.is_shared() {
                group.mutations.push(MutationSite {
                    path: path.to_string(),
                    via,
                    location,
                });
            }
        }
    }
}

fn is_tracked(types: &TypeMap, groups: &AliasGroups, name: &str) -> bool {
    types.is_object_or_array(name) || groups.canonical(name).is_some()
}

/// Register `container.<key>` paths for identifier-valued properties of an
/// object literal, recursing into nested literals.
fn object_literal_aliases(
    container: &str,
    props: &[Prop],
    types: &TypeMap,
    groups: &mut AliasGroups,
) {
    for prop in props {
        match prop {
            Prop::KeyValue { key, value, .. } => {
                let Some(key) = key.name() else { continue };
                let path = format!("{}.{}", container, key);
                match &value.unwrapped().kind {
                    ExprKind::Ident(source) if is_tracked(types, groups, source) => {
                        groups.add_alias(path, source);
                    }
                    ExprKind::Object(nested) => {
                        object_literal_aliases(&path, nested, types, groups);
                    }
                    _ => {}
                }
            }
            Prop::Shorthand { name, .. } if is_tracked(types, groups, name) => {
                groups.add_alias(format!("{}.{}", container, name), name);
            }
            _ => {}
        }
    }
}

/// Build alias groups and record mutations against shared ones.
pub fn track_aliases(program: &Program, types: &TypeMap, walker: &Walker) -> AliasGroups {
    let mut groups = AliasGroups::default();

    // Pass 1: aliasing edges, in source order
    let declarators = walker.collect_program(program, |node, _| match node {
        NodeRef::Stmt(Stmt {
            kind: StmtKind::Var(decl),
            ..
        }) => Some(decl.declarators.iter().collect::<Vec<_>>()),
        _ => None,
    });
    for declarator in declarators.into_iter().flatten() {
        let (Some(name), Some(init)) = (declarator.name(), declarator.init.as_ref()) else {
            continue;
        };
        match &init.unwrapped().kind {
            ExprKind::Ident(source) if is_tracked(types, &groups, source) => {
                groups.add_alias(name.to_string(), source);
            }
            ExprKind::Object(props) => object_literal_aliases(name, props, types, &mut groups),
            _ => {}
        }
    }

    // Pass 2: mutation sites
    let mutations = walker.collect_program(program, |node, _| {
        let expr = node.as_expr()?;
        mutated_path(expr).map(|path| (path, expr.loc))
    });
    for (path, location) in mutations {
        groups.record_mutation(&path, location);
    }

    tracing::trace!(
        shared = groups.shared().count(),
        "Tracked alias groups"
    );
    groups
}

/// Path mutated in place by `expr`, if any.
///
/// Covers member assignment, `delete`, `++`/`--` on members, mutating method
/// calls, and `Object.assign(target, …)`.
pub fn mutated_path(expr: &Expr) -> Option<MemberPath> {
    match &expr.kind {
        ExprKind::Assign { target, .. } => {
            let path = member_path(target.as_expr()?)?;
            (path.depth() > 0).then_some(path)
        }
        ExprKind::Update { arg, .. }
        | ExprKind::Unary {
            op: UnaryOp::Delete,
            arg,
        } => {
            let path = member_path(arg)?;
            (path.depth() > 0).then_some(path)
        }
        ExprKind::Call { .. } => {
            let (callee, args) = as_call(expr)?;
            if dotted_name(callee).as_deref() == Some("Object.assign") {
                return member_path(args.first()?);
            }
            let method = callee_name(callee)?;
            if !is_mutating_method(method) {
                return None;
            }
            match &callee.unwrapped().kind {
                ExprKind::Member { object, .. } => member_path(object),
                _ => None,
            }
        }
        _ => None,
    }
}
