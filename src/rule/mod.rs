//! Declarative rewrite rules.
//!
//! A [`Rule`] pairs a [`Condition`] (what to match) with a [`Transform`]
//! (how to rewrite it). Rules are plain data so an [`Executor`] can sort,
//! count and toggle them; the pieces that need code (predicates and custom
//! rewrites) sit behind the [`Matcher`] and [`Rewriter`] traits.
//!
//! [`Executor`]: crate::Executor

mod builder;
pub mod catalog;

pub use builder::RuleBuilder;

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::{BoxError, Error, Result};
use crate::executor::Context;
use crate::node::{Node, NodeKind};

/// Priority of rules that don't set one. Lower runs first.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Decides whether a node is a match.
pub trait Matcher {
    fn matches(&self, node: &Node, cx: &Context) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&Node, &Context) -> bool,
{
    fn matches(&self, node: &Node, cx: &Context) -> bool {
        self(node, cx)
    }
}

/// Rewrites a node, consuming it and returning its replacement.
pub trait Rewriter {
    fn apply(&self, node: Node, cx: &mut Context) -> Result<Node, BoxError>;
}

impl<F> Rewriter for F
where
    F: Fn(Node, &mut Context) -> Result<Node, BoxError>,
{
    fn apply(&self, node: Node, cx: &mut Context) -> Result<Node, BoxError> {
        self(node, cx)
    }
}

/// Conjunction of match criteria. Every part that is present must hold.
#[derive(Default)]
pub struct Condition {
    /// Node kind must be one of these.
    pub types: Vec<NodeKind>,
    /// Each property must equal the given value.
    pub props: BTreeMap<String, Value>,
    pub predicates: Vec<Box<dyn Matcher>>,
    /// Must hold for the node's parent.
    pub parent: Option<Box<Condition>>,
    /// Must hold for at least one direct child.
    pub children: Option<Box<Condition>>,
}

impl Condition {
    /// A condition matching any node of `kind`.
    pub fn of_type(kind: impl Into<NodeKind>) -> Self {
        Self {
            types: vec![kind.into()],
            ..Self::default()
        }
    }

    /// Whether no criteria are set.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.props.is_empty()
            && self.predicates.is_empty()
            && self.parent.is_none()
            && self.children.is_none()
    }

    fn matches_in<'a>(&self, node: &'a Node, cx: &'a Context, scope: Scope<'a>) -> bool {
        if !self.types.is_empty() && !self.types.contains(&node.kind) {
            return false;
        }
        if !self
            .props
            .iter()
            .all(|(key, want)| node.property(key).as_ref() == Some(want))
        {
            return false;
        }
        if !self.predicates.iter().all(|p| p.matches(node, cx)) {
            return false;
        }
        if let Some(parent) = &self.parent {
            match scope.parent(cx) {
                Some((p, outer)) if parent.matches_in(p, cx, outer) => {}
                _ => return false,
            }
        }
        if let Some(children) = &self.children {
            let below = Scope::Below(node, &scope);
            if !node
                .children()
                .iter()
                .any(|child| children.matches_in(child, cx, below))
            {
                return false;
            }
        }
        true
    }
}

/// Where a node's ancestors come from while a condition is evaluated.
#[derive(Clone, Copy)]
enum Scope<'a> {
    /// The executor's ancestor stack, skipping `usize` innermost entries.
    Stack(usize),
    /// A child reached through a children condition.
    Below(&'a Node, &'a Scope<'a>),
}

impl<'a> Scope<'a> {
    fn parent(self, cx: &'a Context) -> Option<(&'a Node, Scope<'a>)> {
        match self {
            Scope::Stack(up) => cx.ancestor(up).map(|p| (p, Scope::Stack(up + 1))),
            Scope::Below(parent, outer) => Some((parent, *outer)),
        }
    }
}

impl Matcher for Condition {
    fn matches(&self, node: &Node, cx: &Context) -> bool {
        self.matches_in(node, cx, Scope::Stack(0))
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("types", &self.types)
            .field("props", &self.props)
            .field("predicates", &self.predicates.len())
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish()
    }
}

/// A rewrite applied to matched nodes.
///
/// Applied in this order: `kind`, `set`, `remove`, then `custom` on the
/// result. After that, `child` rewrites the direct children (all
/// descendants when `recursive`); `recursive` without `child` re-applies
/// this transform to every descendant.
#[derive(Default)]
pub struct Transform {
    pub kind: Option<NodeKind>,
    pub set: BTreeMap<String, Value>,
    pub remove: Vec<String>,
    pub custom: Option<Box<dyn Rewriter>>,
    pub recursive: bool,
    pub child: Option<Box<Transform>>,
}

impl Transform {
    /// A transform that only changes the node kind.
    pub fn retype(kind: impl Into<NodeKind>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    /// Whether the transform would leave every node untouched.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.set.is_empty()
            && self.remove.is_empty()
            && self.custom.is_none()
            && self.child.is_none()
    }

    /// The node-local part: kind, set, remove, custom.
    fn apply_own(&self, mut node: Node, cx: &mut Context) -> Result<Node, BoxError> {
        if let Some(kind) = &self.kind {
            node.kind = kind.clone();
        }
        for (key, value) in &self.set {
            node.set_property(key, value.clone());
        }
        for key in &self.remove {
            node.remove_property(key);
        }
        match &self.custom {
            Some(custom) => custom.apply(node, cx),
            None => Ok(node),
        }
    }
}

impl Rewriter for Transform {
    fn apply(&self, node: Node, cx: &mut Context) -> Result<Node, BoxError> {
        let node = self.apply_own(node, cx)?;
        match &self.child {
            Some(child) => map_children(node, cx, self.recursive, &|n, cx| child.apply(n, cx)),
            None if self.recursive => {
                map_children(node, cx, true, &|n, cx| self.apply_own(n, cx))
            }
            None => Ok(node),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("kind", &self.kind)
            .field("set", &self.set)
            .field("remove", &self.remove)
            .field("custom", &self.custom.is_some())
            .field("recursive", &self.recursive)
            .field("child", &self.child)
            .finish()
    }
}

type NodeFn<'a> = dyn Fn(Node, &mut Context) -> Result<Node, BoxError> + 'a;

/// Rewrite each child with `f`; with `deep`, also every descendant below.
fn map_children(
    mut node: Node,
    cx: &mut Context,
    deep: bool,
    f: &NodeFn<'_>,
) -> Result<Node, BoxError> {
    if node.children().is_empty() {
        return Ok(node);
    }
    let children = std::mem::take(node.children_mut());
    let mut rewritten = Vec::with_capacity(children.len());
    for child in children {
        let mut child = f(child, cx)?;
        if deep {
            child = map_children(child, cx, true, f)?;
        }
        rewritten.push(child);
    }
    node.set_children(rewritten);
    Ok(node)
}

/// A named condition/transform pair.
#[derive(Debug)]
pub struct Rule {
    pub name: String,
    pub description: Option<String>,
    pub condition: Condition,
    pub transform: Transform,
    /// Lower runs first; ties keep registration order.
    pub priority: i32,
    pub enabled: bool,
}

impl Rule {
    /// Start building a rule.
    pub fn builder(name: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(name)
    }

    pub fn matches(&self, node: &Node, cx: &Context) -> bool {
        self.condition.matches(node, cx)
    }

    /// Apply the transform, tagging any failure with the rule name.
    pub fn apply(&self, node: Node, cx: &mut Context) -> Result<Node> {
        self.transform
            .apply(node, cx)
            .map_err(|source| Error::Transform {
                rule: self.name.clone(),
                source,
            })
    }
}
