//! Depth-first lowering of a markup tree to Markdown.
//!
//! Each tag name maps to one handler in [`HANDLERS`]. The only state carried
//! through the walk is whether output is inside a callout, where every line
//! must keep its `> ` prefix.

use regex::Regex;
use std::sync::LazyLock;

use super::tree::{Element, Node};

static COLOR_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s*\{color="[^"]+"\}"#).expect("Invalid regex pattern"));

static SLACK_CHANNEL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(\{\{slackChannel://[^}]+\}\}\)").expect("Invalid regex pattern")
});

static URL_WRAPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("Invalid regex pattern"));

const DEFAULT_CALLOUT_ICON: &str = "💡";
const QUOTE_BREAK: &str = "\n> ";
const BLANK_QUOTE_LINE: &str = "\n> \n> ";
const CHAT_SCHEME: &str = "slackChannel://";

type Handler = fn(&mut Renderer, &Element);

/// Tag name to handler. Tags not listed render their children only.
const HANDLERS: &[(&str, Handler)] = &[
    ("callout", render_callout),
    ("columns", render_children),
    ("column", render_column),
    ("page", render_page),
    ("database", render_database),
    ("mention-page", render_mention_page),
    ("span", render_children),
    ("empty-block", render_nothing),
    ("unknown", render_nothing),
    ("omitted", render_nothing),
    ("p", render_paragraph),
    ("div", render_paragraph),
    ("br", render_break),
    ("a", render_link),
    ("strong", render_strong),
    ("b", render_strong),
    ("em", render_emphasis),
    ("i", render_emphasis),
    ("code", render_code),
    ("h1", render_heading),
    ("h2", render_heading),
    ("h3", render_heading),
    ("ul", render_list),
    ("ol", render_list),
    ("li", render_list_item),
];

fn handler_for(name: &str) -> Handler {
    HANDLERS
        .iter()
        .find(|(tag, _)| *tag == name)
        .map_or(render_children as Handler, |(_, handler)| *handler)
}

#[derive(Debug, Default)]
pub struct Renderer {
    out: String,
    in_quote: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(mut self, nodes: &[Node]) -> String {
        self.render_nodes(nodes);
        self.out
    }

    fn render_nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Text(text) => self.write_text(text),
                Node::Element(el) => handler_for(&el.name)(self, el),
            }
        }
    }

    /// Render `nodes` into a fresh buffer without touching the current one
    fn render_isolated(nodes: &[Node], in_quote: bool) -> String {
        let inner = Renderer {
            out: String::new(),
            in_quote,
        };
        inner.render(nodes)
    }

    fn write_text(&mut self, text: &str) {
        let cleaned = clean_text(text);
        if !self.in_quote {
            self.out.push_str(&cleaned);
            return;
        }

        let mut lines = cleaned.split('\n');
        if let Some(first) = lines.next() {
            self.out.push_str(first);
        }
        for line in lines {
            self.out.push_str(QUOTE_BREAK);
            self.out.push_str(line.trim_start_matches([' ', '\t']));
        }
    }

    fn line_break(&mut self) {
        if self.in_quote {
            self.out.push_str(QUOTE_BREAK);
        } else {
            self.out.push('\n');
        }
    }

    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Push block output. Inside a callout each line break becomes a quote
    /// break, and runs of blank quote lines collapse to one.
    fn push_block(&mut self, s: &str) {
        if !self.in_quote {
            self.out.push_str(s);
            return;
        }

        for (i, line) in s.split('\n').enumerate() {
            if i > 0 && !self.out.ends_with(BLANK_QUOTE_LINE) {
                self.out.push_str(QUOTE_BREAK);
            }
            self.out.push_str(line);
        }
    }
}

fn render_children(r: &mut Renderer, el: &Element) {
    r.render_nodes(&el.children);
}

fn render_nothing(_: &mut Renderer, _: &Element) {}

fn render_callout(r: &mut Renderer, el: &Element) {
    let icon = match el.attr("icon").map(str::trim) {
        None | Some("") => DEFAULT_CALLOUT_ICON,
        Some(icon) if icon.starts_with("notion://") => DEFAULT_CALLOUT_ICON,
        Some(icon) => icon,
    };

    let inner = Renderer::render_isolated(&el.children, true);
    let inner = trim_quote_edges(&inner);

    let block = if inner.is_empty() {
        format!("\n\n> {icon}\n\n")
    } else {
        format!("\n\n> {icon} {inner}\n\n")
    };
    r.push_block(&block);
}

fn render_column(r: &mut Renderer, el: &Element) {
    let inner = Renderer::render_isolated(&el.children, false);
    let content = dedent(&inner);
    r.push_block(&format!("\n\n{content}\n\n"));
}

fn render_page(r: &mut Renderer, el: &Element) {
    let url = clean_url(el.attr("url").unwrap_or_default());
    let title = title_or(el, "page");
    if r.in_quote {
        r.push(&format!("**[{title}]({url})**"));
    } else {
        r.push(&format!("\n- [📄 {title}]({url})"));
    }
}

fn render_database(r: &mut Renderer, el: &Element) {
    let url = clean_url(el.attr("url").unwrap_or_default());
    let title = title_or(el, "database");
    r.push_block(&format!("\n\n**[📊 {title}]({url})**\n\n"));
}

fn render_mention_page(r: &mut Renderer, el: &Element) {
    let url = clean_url(el.attr("url").unwrap_or_default());
    let title = title_or(el, "→ page");
    if r.in_quote {
        r.push(&format!("[{title}]({url})"));
    } else {
        r.push(&format!("\n- [{title}]({url})"));
    }
}

fn render_paragraph(r: &mut Renderer, el: &Element) {
    r.render_nodes(&el.children);
    r.line_break();
}

fn render_break(r: &mut Renderer, _: &Element) {
    r.line_break();
}

fn render_link(r: &mut Renderer, el: &Element) {
    let Some(href) = el.attr("href") else {
        r.render_nodes(&el.children);
        return;
    };

    let text = clean_text(&el.text_content());
    let href = clean_url(href);
    if href.starts_with(CHAT_SCHEME) {
        r.write_text(&text);
    } else {
        r.push(&format!("[{text}]({href})"));
    }
}

fn render_strong(r: &mut Renderer, el: &Element) {
    wrap(r, el, "**");
}

fn render_emphasis(r: &mut Renderer, el: &Element) {
    wrap(r, el, "*");
}

fn render_code(r: &mut Renderer, el: &Element) {
    wrap(r, el, "`");
}

fn wrap(r: &mut Renderer, el: &Element, marker: &str) {
    r.push(marker);
    r.render_nodes(&el.children);
    r.push(marker);
}

fn render_heading(r: &mut Renderer, el: &Element) {
    let level = match el.name.as_str() {
        "h1" => 1,
        "h2" => 2,
        _ => 3,
    };
    r.line_break();
    r.push(&"#".repeat(level));
    r.push(" ");
    r.render_nodes(&el.children);
    r.line_break();
}

fn render_list(r: &mut Renderer, el: &Element) {
    r.line_break();
    r.render_nodes(&el.children);
}

fn render_list_item(r: &mut Renderer, el: &Element) {
    r.push("- ");
    r.render_nodes(&el.children);
    r.line_break();
}

fn title_or(el: &Element, default: &str) -> String {
    let title = clean_text(el.text_content().trim());
    if title.is_empty() {
        default.to_string()
    } else {
        title
    }
}

/// Strip inline annotations the service leaves in text runs.
pub fn clean_text(text: &str) -> String {
    let text = COLOR_MARKER.replace_all(text, "");
    let text = SLACK_CHANNEL_LINK.replace_all(&text, "$1");
    URL_WRAPPER.replace_all(&text, "$1").into_owned()
}

/// Remove the `{{ }}` wrapper around a URL attribute
pub fn clean_url(url: &str) -> String {
    let url = url.trim();
    url.strip_prefix("{{")
        .and_then(|u| u.strip_suffix("}}"))
        .unwrap_or(url)
        .trim()
        .to_string()
}

/// Remove common leading indentation from non-blank lines, then trim.
pub fn dedent(content: &str) -> String {
    let indent_of = |line: &str| line.chars().take_while(|c| *c == ' ' || *c == '\t').count();

    let min_indent = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(indent_of)
        .min()
        .unwrap_or(0);

    if min_indent == 0 {
        return content.trim().to_string();
    }

    content
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                let skip: usize = line.chars().take(min_indent).map(char::len_utf8).sum();
                &line[skip..]
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Drop empty quote lines and whitespace at both ends of a callout body.
/// Only the `>` markers written by quote breaks are removed; a `>` in the
/// callout's own text is kept.
fn trim_quote_edges(s: &str) -> &str {
    let mut s = s;
    loop {
        let trimmed = s.trim_matches([' ', '\t']);
        let trimmed = trimmed
            .strip_prefix(QUOTE_BREAK)
            .or_else(|| trimmed.strip_prefix('\n'))
            .unwrap_or(trimmed);
        let trimmed = trimmed
            .strip_suffix("\n>")
            .or_else(|| trimmed.strip_suffix('\n'))
            .unwrap_or(trimmed);
        if trimmed.len() == s.len() {
            return s;
        }
        s = trimmed;
    }
}
