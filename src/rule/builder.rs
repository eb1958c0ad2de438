//! Fluent construction of rules.

use serde_json::Value;

use super::{Condition, DEFAULT_PRIORITY, Rule, Transform};
use crate::error::{BoxError, Error, Result};
use crate::executor::Context;
use crate::node::{Node, NodeKind};

/// Builder for [`Rule`].
///
/// ```
/// use vaultdown::{Executor, NodeKind, Rule, parse, to_markdown};
///
/// let rule = Rule::builder("demote-h1")
///     .describe("turn top-level headings into second-level ones")
///     .match_type(NodeKind::Heading)
///     .match_property("level", 1)
///     .set_property("level", 2)
///     .build()?;
///
/// let mut executor = Executor::new();
/// executor.add_rule(rule)?;
/// let out = executor.execute(&parse("# Title"))?;
/// assert_eq!(to_markdown(&out), "## Title\n");
/// # Ok::<(), vaultdown::Error>(())
/// ```
#[derive(Debug)]
pub struct RuleBuilder {
    name: String,
    description: Option<String>,
    priority: i32,
    enabled: bool,
    condition: Condition,
    transform: Transform,
}

impl RuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            priority: DEFAULT_PRIORITY,
            enabled: true,
            condition: Condition::default(),
            transform: Transform::default(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Lower priorities run first. Defaults to [`DEFAULT_PRIORITY`].
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Match nodes of `kind`. Repeated calls widen the set.
    pub fn match_type(mut self, kind: impl Into<NodeKind>) -> Self {
        self.condition.types.push(kind.into());
        self
    }

    pub fn match_types<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<NodeKind>,
    {
        self.condition.types.extend(kinds.into_iter().map(Into::into));
        self
    }

    /// Require a property to equal `value`.
    pub fn match_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition.props.insert(key.into(), value.into());
        self
    }

    /// Require an arbitrary predicate to hold.
    pub fn match_with<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Node, &Context) -> bool + 'static,
    {
        self.condition.predicates.push(Box::new(predicate));
        self
    }

    pub fn match_parent(mut self, condition: Condition) -> Self {
        self.condition.parent = Some(Box::new(condition));
        self
    }

    /// Require at least one direct child to satisfy `condition`.
    pub fn match_children(mut self, condition: Condition) -> Self {
        self.condition.children = Some(Box::new(condition));
        self
    }

    pub fn transform_type(mut self, kind: impl Into<NodeKind>) -> Self {
        self.transform.kind = Some(kind.into());
        self
    }

    pub fn set_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.transform.set.insert(key.into(), value.into());
        self
    }

    pub fn remove_property(mut self, key: impl Into<String>) -> Self {
        self.transform.remove.push(key.into());
        self
    }

    /// Custom rewrite, run after the structural changes.
    pub fn transform<F>(mut self, rewrite: F) -> Self
    where
        F: Fn(Node, &mut Context) -> Result<Node, BoxError> + 'static,
    {
        self.transform.custom = Some(Box::new(rewrite));
        self
    }

    /// Rewrite applied to the matched node's children.
    pub fn transform_children(mut self, transform: Transform) -> Self {
        self.transform.child = Some(Box::new(transform));
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.transform.recursive = recursive;
        self
    }

    /// Finish the rule.
    ///
    /// # Errors
    /// [`Error::MissingCondition`] without any match criteria and
    /// [`Error::MissingTransform`] without any rewrite.
    pub fn build(self) -> Result<Rule> {
        if self.condition.is_empty() {
            return Err(Error::MissingCondition(self.name));
        }
        if self.transform.is_empty() {
            return Err(Error::MissingTransform(self.name));
        }
        Ok(Rule {
            name: self.name,
            description: self.description,
            condition: self.condition,
            transform: self.transform,
            priority: self.priority,
            enabled: self.enabled,
        })
    }
}
