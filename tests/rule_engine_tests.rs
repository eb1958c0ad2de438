//! Rules and the executor working together on parsed documents.

use pretty_assertions::assert_eq;
use serde_json::json;
use vaultdown::error::BoxError;
use vaultdown::rule::catalog;
use vaultdown::{
    Condition, Context, Error, Executor, Node, NodeKind, Rule, RuleBuilder, Stats, Transform,
    parse, to_markdown,
};

fn run(rules: Vec<Rule>, input: &str) -> String {
    let executor = Executor::with_rules(rules).unwrap();
    to_markdown(&executor.execute(&parse(input)).unwrap())
}

fn retype(name: &str, from: &str, to: &str, priority: i32) -> Rule {
    RuleBuilder::new(name)
        .match_type(from)
        .transform_type(to)
        .priority(priority)
        .build()
        .unwrap()
}

fn tag(name: &str, value: &str, priority: i32) -> Rule {
    RuleBuilder::new(name)
        .match_type(NodeKind::Heading)
        .set_property("by", value)
        .priority(priority)
        .build()
        .unwrap()
}

// --- Ordering ---

#[test]
fn lower_priority_runs_first() {
    let executor = Executor::with_rules([tag("late", "late", 100), tag("early", "early", 10)]).unwrap();
    let names: Vec<_> = executor.rules().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["early", "late"]);

    let out = executor.execute(&parse("# Title")).unwrap();
    assert_eq!(out.children()[0].property("by"), Some(json!("late")));
}

#[test]
fn equal_priority_keeps_registration_order() {
    let executor = Executor::with_rules([tag("one", "1", 50), tag("two", "2", 50), tag("three", "3", 50)]).unwrap();
    let names: Vec<_> = executor.rules().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["one", "two", "three"]);
}

#[test]
fn chained_rules_equal_manual_composition() {
    let rules = || {
        vec![
            retype("a", "paragraph", "step1", 1),
            retype("b", "step1", "step2", 2),
            retype("c", "step2", "step3", 3),
        ]
    };
    let doc = parse("first\n\nsecond");
    let out = Executor::with_rules(rules()).unwrap().execute(&doc).unwrap();

    let mut cx = Context::new();
    let composed: Vec<Node> = doc
        .children()
        .iter()
        .map(|p| {
            rules()
                .iter()
                .try_fold(p.clone(), |node, rule| rule.apply(node, &mut cx))
                .unwrap()
        })
        .collect();
    assert_eq!(out, Node::document(composed));
    assert_eq!(out.children()[0].kind, NodeKind::Other("step3".into()));
}

#[test]
fn earlier_rule_is_not_rematched_after_later_rewrite() {
    let rules = vec![
        retype("strong-to-em", "strong", "emphasis", 1),
        retype("em-to-strong", "emphasis", "strong", 2),
    ];
    assert_eq!(run(rules, "*a* **b**"), "**a** **b**\n");
}

// --- Toggling ---

#[test]
fn toggling_is_idempotent() {
    let mut executor = Executor::with_rules([catalog::unwrap_highlight()]).unwrap();
    assert!(executor.set_rule_enabled("unwrap-highlight", false));
    assert!(executor.set_rule_enabled("unwrap-highlight", false));
    assert_eq!(
        executor.stats(),
        Stats {
            total: 1,
            enabled: 0,
            disabled: 1
        }
    );

    let doc = parse("==x==");
    assert_eq!(to_markdown(&executor.execute(&doc).unwrap()), "==x==\n");

    executor.set_rule_enabled("unwrap-highlight", true);
    assert_eq!(to_markdown(&executor.execute(&doc).unwrap()), "x\n");
    assert!(!executor.set_rule_enabled("missing", true));
}

#[test]
fn duplicate_names_are_rejected() {
    let err = Executor::with_rules([catalog::unwrap_strike(), catalog::unwrap_strike()]).unwrap_err();
    assert!(matches!(err, Error::DuplicateRule(name) if name == "unwrap-strike"));
}

// --- Conditions ---

#[test]
fn property_condition() {
    let demote = RuleBuilder::new("h1-to-h2")
        .match_type(NodeKind::Heading)
        .match_property("level", 1)
        .set_property("level", 2)
        .build()
        .unwrap();
    assert_eq!(run(vec![demote], "# A\n\n### B"), "## A\n\n### B\n");
}

#[test]
fn parent_condition() {
    let shout = RuleBuilder::new("shout")
        .match_type(NodeKind::Text)
        .match_parent(Condition::of_type(NodeKind::Strong))
        .transform(|mut node, _| {
            let upper = node.value().unwrap_or("").to_uppercase();
            node.set_value(upper);
            Ok(node)
        })
        .build()
        .unwrap();
    assert_eq!(run(vec![shout], "a **b** c"), "a **B** c\n");
}

#[test]
fn parent_condition_sees_earlier_rewrite() {
    let rules = vec![
        retype("to-strong", "emphasis", "strong", 1),
        RuleBuilder::new("shout")
            .match_type(NodeKind::Text)
            .match_parent(Condition::of_type(NodeKind::Strong))
            .transform(|mut node, _| {
                let upper = node.value().unwrap_or("").to_uppercase();
                node.set_value(upper);
                Ok(node)
            })
            .priority(2)
            .build()
            .unwrap(),
    ];
    assert_eq!(run(rules, "*quiet*"), "**QUIET**\n");
}

#[test]
fn children_condition() {
    let mark = RuleBuilder::new("has-links")
        .match_type(NodeKind::Paragraph)
        .match_children(Condition::of_type(NodeKind::WikiLink))
        .set_property("hasLinks", true)
        .build()
        .unwrap();
    let executor = Executor::with_rules([mark]).unwrap();
    let out = executor.execute(&parse("plain\n\nsee [[X]]")).unwrap();
    assert_eq!(out.children()[0].property("hasLinks"), None);
    assert_eq!(out.children()[1].property("hasLinks"), Some(json!(true)));
}

#[test]
fn predicate_condition_reads_context() {
    let top_level = RuleBuilder::new("top-level-lists")
        .match_type(NodeKind::List)
        .match_with(|_, cx| cx.depth() == 1)
        .set_property("top", true)
        .build()
        .unwrap();
    let executor = Executor::with_rules([top_level]).unwrap();
    let out = executor.execute(&parse("- a\n    - b")).unwrap();
    let lists = out.find_all(&NodeKind::List);
    assert_eq!(lists[0].property("top"), Some(json!(true)));
    assert_eq!(lists[1].property("top"), None);
}

// --- Transforms ---

#[test]
fn recursive_child_transform() {
    let plain = RuleBuilder::new("plain-quote")
        .match_type(NodeKind::BlockQuote)
        .transform_children(Transform {
            custom: Some(Box::new(|node: Node, _: &mut Context| -> Result<Node, BoxError> {
                Ok(match node.kind {
                    NodeKind::Strong | NodeKind::Emphasis => {
                        Node::container(NodeKind::Fragment, node.children().to_vec())
                    }
                    _ => node,
                })
            })),
            ..Transform::default()
        })
        .recursive(true)
        .build()
        .unwrap();
    assert_eq!(run(vec![plain], "> *a* **b**\n\n*c*"), "> a b\n\n*c*\n");
}

#[test]
fn removing_a_property() {
    let untask = RuleBuilder::new("untask")
        .match_type(NodeKind::ListItem)
        .remove_property("task")
        .build()
        .unwrap();
    assert_eq!(run(vec![untask], "- [x] done\n- [ ] open"), "- done\n- open\n");
}

#[test]
fn failing_rewrite_aborts_with_rule_name() {
    let fail = RuleBuilder::new("fail")
        .match_type(NodeKind::Heading)
        .transform(|_, _| Err("boom".into()))
        .build()
        .unwrap();
    let executor = Executor::with_rules([fail]).unwrap();
    let err = executor.execute(&parse("text\n\n# H")).unwrap_err();
    assert!(matches!(&err, Error::Transform { rule, .. } if rule == "fail"));
    assert_eq!(err.to_string(), "rule `fail` failed: boom");
}

// --- Input is never modified ---

#[test]
fn input_tree_is_unchanged_and_shared() {
    let doc = parse("# Title\n\nsome ==marked== text\n\n- untouched");
    let before = doc.clone();
    let executor = Executor::with_rules([catalog::unwrap_highlight()]).unwrap();
    let out = executor.execute(&doc).unwrap();

    assert_eq!(doc, before);
    assert_ne!(out, doc);
    assert!(out.children()[0].shares_children_with(&doc.children()[0]));
    assert!(out.children()[2].shares_children_with(&doc.children()[2]));
    assert!(!out.children()[1].shares_children_with(&doc.children()[1]));
}

// --- Context ---

#[test]
fn context_data_survives_passes() {
    let executor = Executor::with_rules([catalog::embeds_to_images(|name| name.to_string())]).unwrap();
    let mut cx = Context::new();
    executor.execute_with(&parse("![[a.png]]"), &mut cx).unwrap();
    executor.execute_with(&parse("![[Doc.pdf]]"), &mut cx).unwrap();
    assert_eq!(cx.assets(), ["a.png", "Doc.pdf"]);
}

#[test]
fn export_pipeline() {
    let executor = Executor::with_rules([
        catalog::strip_frontmatter(),
        catalog::strip_comments(),
        catalog::wikilinks_to_links(|name| format!("{name}.html")),
        catalog::embeds_to_images(|name| format!("media/{name}")),
    ])
    .unwrap();
    let input = "---\ntags: [x]\n---\n# [[Home]]\n\n%% todo %%\n\n![[map.png]] and [[Guide#Setup|setup]]";
    let out = executor.execute(&parse(input)).unwrap();
    assert_eq!(
        to_markdown(&out),
        "# [Home](Home.html)\n\n![map.png](media/map.png) and [setup](Guide.html#setup)\n"
    );
}
