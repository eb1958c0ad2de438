//! Applies a rule set to a tree.
//!
//! One pre-order pass: at each node every enabled rule whose condition
//! matches is applied in priority order, each rule seeing the output of the
//! previous one. The pass then descends into the resulting node's children,
//! including any a rule introduced. Rules are not re-run on a node after the
//! chain finishes.

use rustc_hash::FxHashMap;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::{Error, Result};
use crate::node::Node;
use crate::rule::Rule;

/// Context key under which rules collect referenced asset file names.
pub const ASSETS_KEY: &str = "assets";

/// State threaded through one execution pass.
#[derive(Debug, Clone)]
pub struct Context {
    /// Child indices from the root to the node being visited.
    pub path: SmallVec<[usize; 16]>,
    /// The tree the pass started from.
    pub root: Node,
    /// Free-form data shared by all rules; survives the whole pass.
    pub data: FxHashMap<String, Value>,
    /// Already-rewritten ancestors of the current node, outermost first.
    ancestors: Vec<Node>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            path: SmallVec::new(),
            root: Node::document(Vec::new()),
            data: FxHashMap::default(),
            ancestors: Vec::new(),
        }
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parent of the node being visited, after its own rewrites.
    pub fn parent(&self) -> Option<&Node> {
        self.ancestors.last()
    }

    /// Ancestor `up` levels above the parent (`0` is the parent itself).
    pub fn ancestor(&self, up: usize) -> Option<&Node> {
        self.ancestors.iter().rev().nth(up)
    }

    /// Nesting depth of the node being visited; the root is at depth 0.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Resolve an index path against the original tree.
    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        path.iter()
            .try_fold(&self.root, |node, &index| node.children().get(index))
    }

    /// Append `value` to the array stored under `key`, creating it if needed.
    ///
    /// A non-array value already stored under `key` becomes the first element.
    pub fn append(&mut self, key: &str, value: Value) {
        let slot = self
            .data
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => items.push(value),
            other => {
                let first = other.take();
                *other = Value::Array(vec![first, value]);
            }
        }
    }

    /// File names collected under [`ASSETS_KEY`], in collection order.
    pub fn assets(&self) -> Vec<&str> {
        match self.data.get(ASSETS_KEY) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(single)) => vec![single.as_str()],
            _ => Vec::new(),
        }
    }
}

/// Rule counts reported by [`Executor::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub total: usize,
    pub enabled: usize,
    pub disabled: usize,
}

/// An ordered rule set.
#[derive(Debug, Default)]
pub struct Executor {
    rules: Vec<Rule>,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an executor from a list of rules.
    ///
    /// # Errors
    /// [`Error::DuplicateRule`] if two rules share a name.
    pub fn with_rules(rules: impl IntoIterator<Item = Rule>) -> Result<Self> {
        let mut executor = Self::new();
        for rule in rules {
            executor.add_rule(rule)?;
        }
        Ok(executor)
    }

    /// Register a rule, keeping the set sorted by ascending priority.
    ///
    /// Rules with equal priority run in registration order.
    pub fn add_rule(&mut self, rule: Rule) -> Result<()> {
        if self.rules.iter().any(|r| r.name == rule.name) {
            return Err(Error::DuplicateRule(rule.name));
        }
        // Insert after every rule of lower or equal priority
        let at = self.rules.partition_point(|r| r.priority <= rule.priority);
        self.rules.insert(at, rule);
        Ok(())
    }

    /// Registered rules in execution order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn stats(&self) -> Stats {
        let enabled = self.rules.iter().filter(|r| r.enabled).count();
        Stats {
            total: self.rules.len(),
            enabled,
            disabled: self.rules.len() - enabled,
        }
    }

    /// Enable or disable a rule by name. Returns `false` if no rule has that name.
    pub fn set_rule_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.rules.iter_mut().find(|r| r.name == name) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Run the rules over `ast` with a fresh context.
    pub fn execute(&self, ast: &Node) -> Result<Node> {
        self.execute_with(ast, &mut Context::new())
    }

    /// Run the rules over `ast`, keeping `cx.data` from earlier passes.
    ///
    /// # Errors
    /// [`Error::Transform`] if a custom rewriter fails; the pass stops there.
    pub fn execute_with(&self, ast: &Node, cx: &mut Context) -> Result<Node> {
        cx.root = ast.clone();
        cx.path.clear();
        cx.ancestors.clear();
        let result = self.visit(ast, cx);
        cx.path.clear();
        cx.ancestors.clear();
        Ok(result?.unwrap_or_else(|| ast.clone()))
    }

    /// Visit one node. `None` means the subtree is unchanged.
    fn visit(&self, node: &Node, cx: &mut Context) -> Result<Option<Node>> {
        let mut current: Option<Node> = None;
        for rule in self.rules.iter().filter(|r| r.enabled) {
            if !rule.matches(current.as_ref().unwrap_or(node), cx) {
                continue;
            }
            let input = current.take().unwrap_or_else(|| node.clone());
            let from = input.kind.clone();
            let output = rule.apply(input, cx)?;
            debug!(rule = %rule.name, from = %from, to = %output.kind, "rule rewrote node");
            current = Some(output);
        }

        let base = current.as_ref().unwrap_or(node);
        if base.children().is_empty() {
            return Ok(current);
        }

        cx.ancestors.push(base.clone());
        let mut rewritten: Option<Vec<Node>> = None;
        for (index, child) in base.children().iter().enumerate() {
            cx.path.push(index);
            let visited = self.visit(child, cx);
            cx.path.pop();
            let visited = match visited {
                Ok(visited) => visited,
                Err(err) => {
                    cx.ancestors.pop();
                    return Err(err);
                }
            };
            match (visited, &mut rewritten) {
                (Some(new_child), Some(children)) => children.push(new_child),
                (Some(new_child), None) => {
                    let mut children = base.children()[..index].to_vec();
                    children.push(new_child);
                    rewritten = Some(children);
                }
                (None, Some(children)) => children.push(child.clone()),
                (None, None) => {}
            }
        }
        cx.ancestors.pop();

        match rewritten {
            Some(children) => {
                let mut node = current.unwrap_or_else(|| node.clone());
                node.set_children(children);
                Ok(Some(node))
            }
            None => Ok(current),
        }
    }
}
