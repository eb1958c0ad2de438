//! vaultdown CLI - parse a note, apply export rules, print Markdown, HTML or the tree

use std::fmt::Write as _;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};

use vaultdown::rule::catalog;
use vaultdown::{Context, Executor, Node, Options, Rule};

#[derive(Parser)]
#[command(name = "vaultdown")]
#[command(about = "Parse, rewrite and render Obsidian-flavored Markdown")]
#[command(version)]
struct Cli {
    /// Input file; `-` or nothing reads stdin
    file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Html)]
    to: Format,

    /// Escape raw HTML instead of passing it through
    #[arg(long)]
    no_html: bool,

    /// Treat a leading `---` block as ordinary Markdown
    #[arg(long)]
    no_front_matter: bool,

    /// Remove HTML and `%%` comments
    #[arg(long)]
    strip_comments: bool,

    /// Remove the front matter block
    #[arg(long)]
    strip_frontmatter: bool,

    /// Replace highlights with their content
    #[arg(long)]
    unwrap_highlight: bool,

    /// Replace strikethrough with its content
    #[arg(long)]
    unwrap_strike: bool,

    /// Rewrite `[[wiki links]]` as links to `<name>.md`
    #[arg(long)]
    wikilinks_to_links: bool,

    /// Rewrite `![[embeds]]` as images and list the referenced files
    #[arg(long)]
    embeds_to_images: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Markdown,
    Tree,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            allow_html: !self.no_html,
            front_matter: !self.no_front_matter,
            ..Options::default()
        }
    }

    fn rules(&self) -> Vec<Rule> {
        let mut rules = Vec::new();
        if self.strip_comments {
            rules.push(catalog::strip_comments());
        }
        if self.strip_frontmatter {
            rules.push(catalog::strip_frontmatter());
        }
        if self.unwrap_highlight {
            rules.push(catalog::unwrap_highlight());
        }
        if self.unwrap_strike {
            rules.push(catalog::unwrap_strike());
        }
        if self.wikilinks_to_links {
            rules.push(catalog::wikilinks_to_links(|name| format!("{name}.md")));
        }
        if self.embeds_to_images {
            rules.push(catalog::embeds_to_images(str::to_string));
        }
        rules
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let input = read_input(cli.file.as_ref())?;
    let options = cli.options();

    let doc = vaultdown::parse_with_options(&input, &options);
    let executor = Executor::with_rules(cli.rules()).context("invalid rule set")?;
    let stats = executor.stats();
    debug!(rules = stats.total, enabled = stats.enabled, "executing rules");

    let mut cx = Context::new();
    let doc = executor.execute_with(&doc, &mut cx)?;
    for asset in cx.assets() {
        info!(asset, "referenced asset");
    }

    let output = match cli.to {
        Format::Html => vaultdown::to_html_with_options(&doc, &options),
        Format::Markdown => vaultdown::to_markdown(&doc),
        Format::Tree => {
            let mut out = String::new();
            write_tree(&mut out, &doc, 0);
            out
        }
    };
    io::stdout().write_all(output.as_bytes())?;

    Ok(())
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Attribute names shown in tree output.
const TREE_KEYS: [&str; 14] = [
    "level",
    "ordered",
    "checked",
    "number",
    "lang",
    "url",
    "alt",
    "embed",
    "calloutType",
    "fold",
    "align",
    "id",
    "file",
    "heading",
];

/// One line per node: kind, set attributes, then the value for leaves.
fn write_tree(out: &mut String, node: &Node, depth: usize) {
    let _ = write!(out, "{:indent$}{}", "", node.kind, indent = depth * 2);
    for key in TREE_KEYS {
        if let Some(value) = node.property(key) {
            let _ = write!(out, " {key}={value}");
        }
    }
    for (key, value) in &node.attrs.extra {
        let _ = write!(out, " {key}={value}");
    }
    if let Some(value) = node.value() {
        let _ = write!(out, " {value:?}");
    }
    out.push('\n');
    for child in node.children() {
        write_tree(out, child, depth + 1);
    }
}
