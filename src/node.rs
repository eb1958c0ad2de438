//! Abstract syntax tree for Obsidian-flavored Markdown.
//!
//! A [`Node`] is a kind tag, a body (children *or* a text value), and a set
//! of typed attributes. Children are reference counted so cloning a subtree
//! is cheap and rewrites can share every subtree they do not touch.
//!
//! Attributes can also be read and written by name (see
//! [`Node::property`]) so that declarative rules can match and rewrite them
//! without knowing the Rust field layout. Keys that do not correspond to a
//! typed field live in [`Attrs::extra`].

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::warn;

/// The closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    FrontMatter,
    HtmlComment,
    CodeBlock,
    MathBlock,
    Callout,
    /// Inline title of a callout. Always the first child of its callout.
    CalloutTitle,
    BlockQuote,
    List,
    ListItem,
    HorizontalRule,
    Heading,
    Table,
    TableRow,
    TableCell,
    FootnoteDef,
    HtmlBlock,
    Paragraph,
    Text,
    InlineCode,
    MathSpan,
    WikiLink,
    Embed,
    FootnoteRef,
    Image,
    Link,
    Highlight,
    Strike,
    StrongEmphasis,
    Strong,
    Emphasis,
    HtmlInline,
    AutoLink,
    EscapedChar,
    /// Transparent container; serializes as its children.
    Fragment,
    /// Any kind the engine does not know about.
    Other(String),
}

impl NodeKind {
    /// Every built-in kind, in declaration order.
    pub const BUILTIN: [NodeKind; 35] = [
        Self::Document,
        Self::FrontMatter,
        Self::HtmlComment,
        Self::CodeBlock,
        Self::MathBlock,
        Self::Callout,
        Self::CalloutTitle,
        Self::BlockQuote,
        Self::List,
        Self::ListItem,
        Self::HorizontalRule,
        Self::Heading,
        Self::Table,
        Self::TableRow,
        Self::TableCell,
        Self::FootnoteDef,
        Self::HtmlBlock,
        Self::Paragraph,
        Self::Text,
        Self::InlineCode,
        Self::MathSpan,
        Self::WikiLink,
        Self::Embed,
        Self::FootnoteRef,
        Self::Image,
        Self::Link,
        Self::Highlight,
        Self::Strike,
        Self::StrongEmphasis,
        Self::Strong,
        Self::Emphasis,
        Self::HtmlInline,
        Self::AutoLink,
        Self::EscapedChar,
        Self::Fragment,
    ];

    /// Stable name used in rule definitions and debugging output.
    pub fn name(&self) -> &str {
        match self {
            Self::Document => "document",
            Self::FrontMatter => "frontmatter",
            Self::HtmlComment => "htmlComment",
            Self::CodeBlock => "codeBlock",
            Self::MathBlock => "mathBlock",
            Self::Callout => "callout",
            Self::CalloutTitle => "calloutTitle",
            Self::BlockQuote => "blockquote",
            Self::List => "list",
            Self::ListItem => "listItem",
            Self::HorizontalRule => "horizontalRule",
            Self::Heading => "heading",
            Self::Table => "table",
            Self::TableRow => "tableRow",
            Self::TableCell => "tableCell",
            Self::FootnoteDef => "footnoteDef",
            Self::HtmlBlock => "htmlBlock",
            Self::Paragraph => "paragraph",
            Self::Text => "text",
            Self::InlineCode => "inlineCode",
            Self::MathSpan => "mathSpan",
            Self::WikiLink => "wikiLink",
            Self::Embed => "embed",
            Self::FootnoteRef => "footnoteRef",
            Self::Image => "image",
            Self::Link => "link",
            Self::Highlight => "highlight",
            Self::Strike => "strike",
            Self::StrongEmphasis => "strongEmphasis",
            Self::Strong => "strong",
            Self::Emphasis => "emphasis",
            Self::HtmlInline => "htmlInline",
            Self::AutoLink => "autoLink",
            Self::EscapedChar => "escapedChar",
            Self::Fragment => "fragment",
            Self::Other(name) => name,
        }
    }

    /// Look up a kind by name; unknown names become [`NodeKind::Other`].
    pub fn from_name(name: &str) -> Self {
        Self::BUILTIN
            .iter()
            .find(|kind| kind.name() == name)
            .cloned()
            .unwrap_or_else(|| Self::Other(name.to_string()))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for NodeKind {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

/// Column alignment for table cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// No alignment specified.
    #[default]
    None,
    /// Left-aligned (`:---`).
    Left,
    /// Center-aligned (`:---:`).
    Center,
    /// Right-aligned (`---:`).
    Right,
}

impl Align {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// How a wiki-style link points at its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    /// `[[Note]]`
    Article,
    /// `[[#Heading]]`, a heading in the current note.
    InternalHeading,
    /// `[[Note#Heading]]`
    ExternalHeading,
    /// `![[Note]]`
    Embed,
}

impl LinkType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::InternalHeading => "internal-heading",
            Self::ExternalHeading => "external-heading",
            Self::Embed => "embed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "article" => Some(Self::Article),
            "internal-heading" => Some(Self::InternalHeading),
            "external-heading" => Some(Self::ExternalHeading),
            "embed" => Some(Self::Embed),
            _ => None,
        }
    }
}

/// Fold state of an Obsidian callout (`[!note]+` / `[!note]-`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fold {
    Open,
    Closed,
}

impl Fold {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "+",
            Self::Closed => "-",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "+" => Some(Self::Open),
            "-" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Kind-specific attributes.
///
/// Only the fields relevant to a node's kind are populated by the parser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    /// Heading level (1-6), or list/list item nesting level (0-based).
    pub level: Option<u8>,
    /// Whether a list is ordered.
    pub ordered: Option<bool>,
    /// Task state of a list item: `Some(checked)` for `[ ]` / `[x]` items.
    pub task: Option<bool>,
    /// Literal number of an ordered list item.
    pub number: Option<u32>,
    /// Code block language tag.
    pub lang: Option<String>,
    /// Link or image destination.
    pub url: Option<String>,
    /// Image alternative text.
    pub alt: Option<String>,
    /// Link or image title.
    pub title: Option<String>,
    /// Image written with wiki embed syntax (`![[photo.png]]`).
    pub embed: Option<bool>,
    /// Callout type as written (`note`, `warning`, ...).
    pub callout_type: Option<String>,
    pub fold: Option<Fold>,
    /// Table column alignment, one entry per column.
    pub align: Option<Vec<Align>>,
    /// Footnote identifier.
    pub id: Option<String>,
    /// Wiki-link / embed target file.
    pub file: Option<String>,
    /// Wiki-link / embed heading fragment.
    pub heading: Option<String>,
    /// Wiki-link / embed display alias.
    pub alias: Option<String>,
    pub link_type: Option<LinkType>,
    /// Rule-author-defined attributes.
    pub extra: BTreeMap<String, Value>,
}

/// Content of a node: children for containers, a raw value for leaves.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Children(Rc<Vec<Node>>),
    Value(String),
}

/// One element of the syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub body: Body,
    pub attrs: Attrs,
}

impl Node {
    /// Create a node with no content.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            body: Body::Empty,
            attrs: Attrs::default(),
        }
    }

    /// Create a container node.
    pub fn container(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            body: Body::Children(Rc::new(children)),
            attrs: Attrs::default(),
        }
    }

    /// Create a leaf node carrying a raw text value.
    pub fn leaf(kind: NodeKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            body: Body::Value(value.into()),
            attrs: Attrs::default(),
        }
    }

    pub fn document(children: Vec<Node>) -> Self {
        Self::container(NodeKind::Document, children)
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::container(NodeKind::Paragraph, children)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Text, value)
    }

    /// Replace the attributes.
    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn is(&self, kind: &NodeKind) -> bool {
        &self.kind == kind
    }

    /// Child nodes; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match &self.body {
            Body::Children(children) => children,
            _ => &[],
        }
    }

    /// Raw text value; `None` for containers.
    pub fn value(&self) -> Option<&str> {
        match &self.body {
            Body::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Mutable access to the children, cloning the vector only if it is shared.
    ///
    /// A leaf or empty node becomes an empty container.
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        if !matches!(self.body, Body::Children(_)) {
            self.body = Body::Children(Rc::new(Vec::new()));
        }
        match &mut self.body {
            Body::Children(children) => Rc::make_mut(children),
            _ => unreachable!("body was just set to children"),
        }
    }

    pub fn set_children(&mut self, children: Vec<Node>) {
        self.body = Body::Children(Rc::new(children));
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.body = Body::Value(value.into());
    }

    /// Whether both nodes point at the same child vector.
    pub fn shares_children_with(&self, other: &Node) -> bool {
        match (&self.body, &other.body) {
            (Body::Children(a), Body::Children(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Concatenated text of all leaf values below this node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.body {
            Body::Value(value) => out.push_str(value),
            Body::Children(children) => {
                for child in children.iter() {
                    child.collect_text(out);
                }
            }
            Body::Empty => {}
        }
    }

    /// All nodes of `kind` in this subtree, in document order.
    pub fn find_all(&self, kind: &NodeKind) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect_kind(kind, &mut out);
        out
    }

    fn collect_kind<'a>(&'a self, kind: &NodeKind, out: &mut Vec<&'a Node>) {
        if &self.kind == kind {
            out.push(self);
        }
        for child in self.children() {
            child.collect_kind(kind, out);
        }
    }

    /// Display text of a wiki link or embed: the alias, else
    /// `file > heading`, else whichever of the two is present.
    pub fn wiki_label(&self) -> String {
        let a = &self.attrs;
        if let Some(alias) = &a.alias {
            return alias.clone();
        }
        let file = a.file.as_deref().unwrap_or("");
        match a.heading.as_deref() {
            Some(heading) if file.is_empty() => heading.to_string(),
            Some(heading) => format!("{file} > {heading}"),
            None => file.to_string(),
        }
    }

    /// Read an attribute by name.
    pub fn property(&self, key: &str) -> Option<Value> {
        let a = &self.attrs;
        match key {
            "level" => a.level.map(Value::from),
            "ordered" => a.ordered.map(Value::from),
            "task" => a.task.map(|_| Value::Bool(true)),
            "checked" => a.task.map(Value::from),
            "number" => a.number.map(Value::from),
            "lang" => a.lang.clone().map(Value::from),
            "url" => a.url.clone().map(Value::from),
            "alt" => a.alt.clone().map(Value::from),
            "title" => a.title.clone().map(Value::from),
            "embed" => a.embed.map(Value::from),
            "calloutType" => a.callout_type.clone().map(Value::from),
            "fold" => a.fold.map(|fold| Value::from(fold.as_str())),
            "align" => a.align.as_ref().map(|align| {
                Value::Array(align.iter().map(|col| Value::from(col.as_str())).collect())
            }),
            "id" => a.id.clone().map(Value::from),
            "file" => a.file.clone().map(Value::from),
            "heading" => a.heading.clone().map(Value::from),
            "alias" => a.alias.clone().map(Value::from),
            "linkType" => a.link_type.map(|t| Value::from(t.as_str())),
            "label" => (self.kind == NodeKind::Link).then(|| Value::from(self.text_content())),
            _ => a.extra.get(key).cloned(),
        }
    }

    /// Write an attribute by name. `null` removes it.
    ///
    /// Values of the wrong type for a typed attribute are ignored.
    pub fn set_property(&mut self, key: &str, value: Value) {
        if value.is_null() {
            self.remove_property(key);
            return;
        }

        let a = &mut self.attrs;
        let accepted = match key {
            "level" => assign(&mut a.level, value.as_u64().and_then(|n| u8::try_from(n).ok())),
            "ordered" => assign(&mut a.ordered, value.as_bool()),
            "task" => match value.as_bool() {
                Some(true) => {
                    a.task.get_or_insert(false);
                    true
                }
                Some(false) => {
                    a.task = None;
                    true
                }
                None => false,
            },
            "checked" => assign(&mut a.task, value.as_bool()),
            "number" => assign(&mut a.number, value.as_u64().and_then(|n| u32::try_from(n).ok())),
            "lang" => assign(&mut a.lang, value.as_str().map(str::to_owned)),
            "url" => assign(&mut a.url, value.as_str().map(str::to_owned)),
            "alt" => assign(&mut a.alt, value.as_str().map(str::to_owned)),
            "title" => assign(&mut a.title, value.as_str().map(str::to_owned)),
            "embed" => assign(&mut a.embed, value.as_bool()),
            "calloutType" => assign(&mut a.callout_type, value.as_str().map(str::to_owned)),
            "fold" => assign(&mut a.fold, value.as_str().and_then(Fold::from_name)),
            "align" => assign(
                &mut a.align,
                value.as_array().and_then(|cols| {
                    cols.iter()
                        .map(|col| col.as_str().and_then(Align::from_name))
                        .collect::<Option<Vec<_>>>()
                }),
            ),
            "id" => assign(&mut a.id, value.as_str().map(str::to_owned)),
            "file" => assign(&mut a.file, value.as_str().map(str::to_owned)),
            "heading" => assign(&mut a.heading, value.as_str().map(str::to_owned)),
            "alias" => assign(&mut a.alias, value.as_str().map(str::to_owned)),
            "linkType" => assign(&mut a.link_type, value.as_str().and_then(LinkType::from_name)),
            "label" => false,
            _ => {
                a.extra.insert(key.to_string(), value.clone());
                true
            }
        };

        if !accepted {
            warn!(kind = %self.kind, key, %value, "ignoring property value of unexpected type");
        }
    }

    /// Remove an attribute by name, returning its previous value.
    pub fn remove_property(&mut self, key: &str) -> Option<Value> {
        let previous = self.property(key);
        let a = &mut self.attrs;
        match key {
            "level" => a.level = None,
            "ordered" => a.ordered = None,
            "task" | "checked" => a.task = None,
            "number" => a.number = None,
            "lang" => a.lang = None,
            "url" => a.url = None,
            "alt" => a.alt = None,
            "title" => a.title = None,
            "embed" => a.embed = None,
            "calloutType" => a.callout_type = None,
            "fold" => a.fold = None,
            "align" => a.align = None,
            "id" => a.id = None,
            "file" => a.file = None,
            "heading" => a.heading = None,
            "alias" => a.alias = None,
            "linkType" => a.link_type = None,
            "label" => return None,
            _ => {
                a.extra.remove(key);
            }
        }
        previous
    }
}

fn assign<T>(slot: &mut Option<T>, parsed: Option<T>) -> bool {
    match parsed {
        Some(value) => {
            *slot = Some(value);
            true
        }
        None => false,
    }
}
