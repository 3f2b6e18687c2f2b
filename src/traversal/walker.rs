//! Depth-capped depth-first walker.
//!
//! Two entry styles: [`Walker::visit`] drives a [`Visitor`] that can prune
//! subtrees, and [`Walker::collect`] folds matches into a `Vec` so detectors
//! never push into a shared accumulator.

use super::node::NodeRef;
use crate::frontend::ast::{Function, Program, Stmt};

/// Default recursion cap for structural walks.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What the walker should do after entering a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    SkipChildren,
}

/// Ancestor stack at the current node, innermost last.
#[derive(Debug, Default)]
pub struct WalkContext<'a> {
    ancestors: Vec<NodeRef<'a>>,
}

impl<'a> WalkContext<'a> {
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.ancestors.last().copied()
    }

    /// Ancestors from the outermost to the innermost.
    pub fn ancestors(&self) -> &[NodeRef<'a>] {
        &self.ancestors
    }

    /// Ancestors from innermost outward, stopping before the nearest
    /// enclosing function.
    pub fn ancestors_in_function(&self) -> impl Iterator<Item = NodeRef<'a>> + '_ {
        self.ancestors
            .iter()
            .rev()
            .copied()
            .take_while(|node| !matches!(node, NodeRef::Function(_)))
    }

    pub fn enclosing_function(&self) -> Option<&'a Function> {
        self.ancestors.iter().rev().find_map(|node| node.as_function())
    }

    /// Every enclosing function from innermost outward.
    pub fn enclosing_functions(&self) -> impl Iterator<Item = &'a Function> + '_ {
        self.ancestors.iter().rev().filter_map(|node| node.as_function())
    }
}

pub trait Visitor<'a> {
    fn enter(&mut self, node: NodeRef<'a>, ctx: &WalkContext<'a>) -> Visit;

    fn leave(&mut self, _node: NodeRef<'a>, _ctx: &WalkContext<'a>) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walker {
    pub max_depth: usize,
    /// When false, nested function nodes are entered but their bodies are not walked
    pub enter_functions: bool,
}

impl Default for Walker {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            enter_functions: true,
        }
    }
}

impl Walker {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Same depth cap, but stop at function boundaries.
    pub fn shallow(self) -> Self {
        Self {
            enter_functions: false,
            ..self
        }
    }

    pub fn visit<'a, V: Visitor<'a>>(&self, root: NodeRef<'a>, visitor: &mut V) {
        let mut ctx = WalkContext::default();
        self.walk(root, visitor, &mut ctx, true);
    }

    pub fn visit_stmts<'a, V: Visitor<'a>>(&self, stmts: &'a [Stmt], visitor: &mut V) {
        let mut ctx = WalkContext::default();
        for stmt in stmts {
            self.walk(NodeRef::Stmt(stmt), visitor, &mut ctx, true);
        }
    }

    fn walk<'a, V: Visitor<'a>>(
        &self,
        node: NodeRef<'a>,
        visitor: &mut V,
        ctx: &mut WalkContext<'a>,
        is_root: bool,
    ) {
        if ctx.depth() >= self.max_depth {
            return;
        }
        if visitor.enter(node, ctx) == Visit::SkipChildren {
            return;
        }
        let descend = self.enter_functions || is_root || !matches!(node, NodeRef::Function(_));
        if descend {
            ctx.ancestors.push(node);
            for child in node.children() {
                self.walk(child, visitor, ctx, false);
            }
            ctx.ancestors.pop();
        }
        visitor.leave(node, ctx);
    }

    /// Collect `f`'s results over every node under `root`, in pre-order.
    pub fn collect<'a, T>(
        &self,
        root: NodeRef<'a>,
        f: impl FnMut(NodeRef<'a>, &WalkContext<'a>) -> Option<T>,
    ) -> Vec<T> {
        let mut collector = Collector {
            f,
            found: Vec::new(),
        };
        self.visit(root, &mut collector);
        collector.found
    }

    pub fn collect_stmts<'a, T>(
        &self,
        stmts: &'a [Stmt],
        f: impl FnMut(NodeRef<'a>, &WalkContext<'a>) -> Option<T>,
    ) -> Vec<T> {
        let mut collector = Collector {
            f,
            found: Vec::new(),
        };
        self.visit_stmts(stmts, &mut collector);
        collector.found
    }

    pub fn collect_program<'a, T>(
        &self,
        program: &'a Program,
        f: impl FnMut(NodeRef<'a>, &WalkContext<'a>) -> Option<T>,
    ) -> Vec<T> {
        self.collect_stmts(&program.body, f)
    }

    /// True if any node under `root` satisfies `pred`.
    pub fn any<'a>(
        &self,
        root: NodeRef<'a>,
        mut pred: impl FnMut(NodeRef<'a>, &WalkContext<'a>) -> bool,
    ) -> bool {
        !self
            .collect(root, |node, ctx| pred(node, ctx).then_some(()))
            .is_empty()
    }
}

struct Collector<F, T> {
    f: F,
    found: Vec<T>,
}

impl<'a, F, T> Visitor<'a> for Collector<F, T>
where
    F: FnMut(NodeRef<'a>, &WalkContext<'a>) -> Option<T>,
{
    fn enter(&mut self, node: NodeRef<'a>, ctx: &WalkContext<'a>) -> Visit {
        if let Some(item) = (self.f)(node, ctx) {
            self.found.push(item);
        }
        Visit::Continue
    }
}
