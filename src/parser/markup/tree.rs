//! Lenient tag tree for Notion-flavored markup.
//!
//! The service mixes markdown text with a small set of HTML-like tags. The
//! input is never guaranteed to be well-formed, so the scanner accepts:
//! - unclosed elements (closed at end of input)
//! - stray closing tags (ignored)
//! - self-closing and void tags
//! - single, double or unquoted attribute values
//! - a bare `<` that does not open a tag, or a tag cut short by another `<`
//!   (kept as text)

use thiserror::Error;

/// Nesting beyond this is rejected rather than walked recursively
pub const MAX_DEPTH: usize = 256;

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("markup nested deeper than {0} elements")]
    TooDeep(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name
    pub name: String,
    /// Attributes in source order, names lowercased, values entity-decoded
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// Parse markup into a forest of top-level nodes.
///
/// # Errors
///
/// Returns [`TreeError::TooDeep`] when elements nest past [`MAX_DEPTH`].
pub fn parse(input: &str) -> Result<Vec<Node>, TreeError> {
    let mut builder = TreeBuilder::default();
    let mut scanner = Scanner { src: input, pos: 0 };

    while let Some(token) = scanner.next_token() {
        match token {
            Token::Text(text) => builder.text(text),
            Token::Open {
                name,
                attrs,
                self_closing,
            } => builder.open(name, attrs, self_closing)?,
            Token::Close(name) => builder.close(&name),
            Token::Comment => {}
        }
    }

    Ok(builder.finish())
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Text(String),
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
    Comment,
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl Scanner<'_> {
    fn next_token(&mut self) -> Option<Token> {
        let rest = &self.src[self.pos..];
        if rest.is_empty() {
            return None;
        }

        if rest.starts_with('<') {
            if let Some((token, consumed)) = scan_tag(rest) {
                self.pos += consumed;
                return Some(token);
            }
            // Not a tag: the '<' is literal text up to the next candidate
            let end = rest[1..].find('<').map_or(rest.len(), |i| i + 1);
            self.pos += end;
            return Some(Token::Text(decode_entities(&rest[..end])));
        }

        let end = rest.find('<').unwrap_or(rest.len());
        self.pos += end;
        Some(Token::Text(decode_entities(&rest[..end])))
    }
}

/// Scan one tag at the start of `rest`. Returns the token and bytes consumed,
/// or `None` if `rest` does not begin with a complete tag.
fn scan_tag(rest: &str) -> Option<(Token, usize)> {
    let bytes = rest.as_bytes();

    if rest.starts_with("<!--") {
        let end = rest[4..].find("-->").map_or(rest.len(), |i| i + 4 + 3);
        return Some((Token::Comment, end));
    }
    if rest.starts_with("<!") {
        let end = rest.find('>')?;
        return Some((Token::Comment, end + 1));
    }

    if rest.starts_with("</") {
        let name_len = name_length(&rest[2..]);
        if name_len == 0 {
            return None;
        }
        let gt = rest[2 + name_len..].find('>')?;
        let name = rest[2..2 + name_len].to_ascii_lowercase();
        return Some((Token::Close(name), 2 + name_len + gt + 1));
    }

    if !bytes.get(1).is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }

    let name_len = name_length(&rest[1..]);
    let name = rest[1..1 + name_len].to_ascii_lowercase();
    let mut pos = 1 + name_len;
    let mut attrs = Vec::new();

    loop {
        pos = skip_whitespace(rest, pos);
        match *bytes.get(pos)? {
            b'<' => return None,
            b'>' => {
                let token = Token::Open {
                    name,
                    attrs,
                    self_closing: false,
                };
                return Some((token, pos + 1));
            }
            b'/' if bytes.get(pos + 1) == Some(&b'>') => {
                let token = Token::Open {
                    name,
                    attrs,
                    self_closing: true,
                };
                return Some((token, pos + 2));
            }
            b'/' | b'=' => pos += 1,
            _ => {
                let attr_len = rest[pos..]
                    .find(|c: char| c.is_whitespace() || matches!(c, '=' | '>' | '/' | '<'))
                    .unwrap_or(rest.len() - pos);
                let attr_name = rest[pos..pos + attr_len].to_ascii_lowercase();
                pos += attr_len;

                let after_ws = skip_whitespace(rest, pos);
                let mut value = String::new();
                if bytes.get(after_ws) == Some(&b'=') {
                    pos = skip_whitespace(rest, after_ws + 1);
                    match *bytes.get(pos)? {
                        quote @ (b'"' | b'\'') => {
                            let close = rest[pos + 1..].find(quote as char)?;
                            value = decode_entities(&rest[pos + 1..pos + 1 + close]);
                            pos += close + 2;
                        }
                        _ => {
                            let len = rest[pos..]
                                .find(|c: char| c.is_whitespace() || matches!(c, '>' | '<'))
                                .unwrap_or(rest.len() - pos);
                            value = decode_entities(&rest[pos..pos + len]);
                            pos += len;
                        }
                    }
                }
                attrs.push((attr_name, value));
            }
        }
    }
}

fn name_length(s: &str) -> usize {
    s.bytes()
        .take_while(|&b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.'))
        .count()
}

fn skip_whitespace(s: &str, pos: usize) -> usize {
    let rest = &s[pos..];
    pos + (rest.len() - rest.trim_start().len())
}

/// Decode the handful of entities the service emits, plus numeric ones.
/// Unknown entities are left as written.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => numeric_entity(entity),
            };
            ch.map(|c| (c, semi + 1))
        });

        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn children(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(el) => &mut el.children,
            None => &mut self.root,
        }
    }

    fn text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        let children = self.children();
        if let Some(Node::Text(prev)) = children.last_mut() {
            prev.push_str(&text);
        } else {
            children.push(Node::Text(text));
        }
    }

    fn open(
        &mut self,
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    ) -> Result<(), TreeError> {
        let element = Element {
            name,
            attrs,
            children: Vec::new(),
        };

        if self_closing || VOID_TAGS.contains(&element.name.as_str()) {
            self.children().push(Node::Element(element));
            return Ok(());
        }

        if self.open.len() >= MAX_DEPTH {
            return Err(TreeError::TooDeep(MAX_DEPTH));
        }
        self.open.push(element);
        Ok(())
    }

    /// Close the nearest open element with this name, implicitly closing
    /// anything opened inside it. Unmatched closers are dropped.
    fn close(&mut self, name: &str) {
        let Some(idx) = self.open.iter().rposition(|el| el.name == name) else {
            return;
        };
        while self.open.len() > idx {
            self.pop();
        }
    }

    fn pop(&mut self) {
        if let Some(el) = self.open.pop() {
            self.children().push(Node::Element(el));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.pop();
        }
        self.root
    }
}
