//! Terse indentation markup.
//!
//! Compiles an indentation-based shorthand for HTML into plain HTML. Template
//! directives (`{% ... %}`, `{{ ... }}`) pass through untouched so the result
//! can be composed like any HTML page.
//!
//! ```text
//! doctype html
//! section#intro.dark(data-transition="fade")
//!   h1 Welcome
//!   ul
//!     li: a(href="/docs") Docs
//!     li Second point
//!   p.
//!     A block of text that
//!     spans lines.
//!   | piped text
//!   <b>raw html</b>
//!   //- dropped from the output
//!   {% if metadata.draft %}
//!   p Draft build
//!   {% endif %}
//! ```
//!
//! The first word of an element line is its tag, so `.note` and `#main` are
//! shorthand for a `div`.

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TerseError {
    #[error("line {line}: indentation mixes tabs and spaces")]
    MixedIndent { line: usize },

    #[error("line {line}: unexpected indentation")]
    UnexpectedIndent { line: usize },

    #[error("line {line}: dedent does not match any outer level")]
    InconsistentDedent { line: usize },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// Compile terse markup to HTML.
pub fn compile(source: &str) -> Result<String, TerseError> {
    let lines = scan(source)?;
    let mut parser = Parser { lines, pos: 0 };
    let nodes = parser.block(None)?;

    let mut out = String::new();
    render_nodes(&nodes, &mut out);
    Ok(out)
}

// =============================================================================
// Lines
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    /// 1-based line number, for error messages
    number: usize,
    indent: usize,
    /// Content without indentation; empty for blank lines
    text: &'a str,
    /// The full line, used to keep relative indentation in text blocks
    raw: &'a str,
}

fn scan(source: &str) -> Result<Vec<Line<'_>>, TerseError> {
    let mut style: Option<char> = None;
    let mut lines = Vec::new();

    for (i, raw) in source.lines().enumerate() {
        let number = i + 1;
        let raw = raw.trim_end();
        let text = raw.trim_start_matches([' ', '\t']);
        let lead = &raw[..raw.len() - text.len()];

        if !text.is_empty() && !lead.is_empty() {
            let uses_tabs = lead.contains('\t');
            let uses_spaces = lead.contains(' ');
            if uses_tabs && uses_spaces {
                return Err(TerseError::MixedIndent { line: number });
            }
            let this_style = if uses_tabs { '\t' } else { ' ' };
            match style {
                None => style = Some(this_style),
                Some(s) if s != this_style => {
                    return Err(TerseError::MixedIndent { line: number });
                }
                _ => {}
            }
        }

        lines.push(Line {
            number,
            indent: lead.len(),
            text,
            raw,
        });
    }

    Ok(lines)
}

// =============================================================================
// Tree
// =============================================================================

#[derive(Debug)]
enum Node {
    Element(Element),
    Text(String),
    /// Raw HTML or template directive line, with any nested lines
    Raw { text: String, children: Vec<Node> },
    Comment(String),
    Doctype(String),
}

#[derive(Debug, Default)]
struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
    text: Option<String>,
    children: Vec<Node>,
}

struct Parser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Parse the run of lines indented deeper than `parent`.
    fn block(&mut self, parent: Option<usize>) -> Result<Vec<Node>, TerseError> {
        let mut nodes = Vec::new();
        let mut level: Option<usize> = None;

        while let Some(&line) = self.lines.get(self.pos) {
            if line.text.is_empty() {
                self.pos += 1;
                continue;
            }
            if parent.is_some_and(|p| line.indent <= p) {
                break;
            }
            match level {
                None => level = Some(line.indent),
                Some(l) if line.indent > l => {
                    return Err(TerseError::UnexpectedIndent { line: line.number });
                }
                Some(l) if line.indent < l => {
                    return Err(TerseError::InconsistentDedent { line: line.number });
                }
                _ => {}
            }

            self.pos += 1;
            if let Some(node) = self.node(line)? {
                nodes.push(node);
            }
        }

        Ok(nodes)
    }

    fn node(&mut self, line: Line<'a>) -> Result<Option<Node>, TerseError> {
        let text = line.text;

        if text.starts_with("//-") {
            self.text_block(line.indent);
            return Ok(None);
        }
        if let Some(rest) = text.strip_prefix("//") {
            let mut comment = rest.trim().to_string();
            let nested = self.text_block(line.indent);
            if !nested.is_empty() {
                if !comment.is_empty() {
                    comment.push('\n');
                }
                comment.push_str(&nested);
            }
            return Ok(Some(Node::Comment(comment)));
        }
        if let Some(rest) = text.strip_prefix('|') {
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            return Ok(Some(Node::Text(rest.to_string())));
        }
        if text.starts_with('<') || is_template_tag(text) {
            let children = self.block(Some(line.indent))?;
            return Ok(Some(Node::Raw {
                text: text.to_string(),
                children,
            }));
        }
        if let Some(rest) = text.strip_prefix("doctype")
            && (rest.is_empty() || rest.starts_with(' '))
        {
            let kind = rest.trim();
            let kind = if kind.is_empty() { "html" } else { kind };
            return Ok(Some(Node::Doctype(kind.to_string())));
        }

        let (mut element, rest) = parse_head(text, line.number)?;

        if rest == "." {
            let block = self.text_block(line.indent);
            if !block.is_empty() {
                element.children.push(Node::Text(block));
            }
        } else if let Some(inline) = rest.strip_prefix(": ") {
            // Block expansion: nested lines belong to the innermost element.
            let inline = Line {
                text: inline.trim_start(),
                ..line
            };
            if let Some(child) = self.node(inline)? {
                element.children.push(child);
            }
        } else if rest.is_empty() || rest.starts_with(' ') {
            if let Some(inline) = rest.strip_prefix(' ') {
                element.text = Some(inline.to_string());
            }
            element.children = self.block(Some(line.indent))?;
        } else {
            return Err(TerseError::Syntax {
                line: line.number,
                message: format!("unexpected `{rest}` after element"),
            });
        }

        if is_void(&element.tag) && (element.text.is_some() || !element.children.is_empty()) {
            return Err(TerseError::Syntax {
                line: line.number,
                message: format!("<{}> cannot have content", element.tag),
            });
        }

        Ok(Some(Node::Element(element)))
    }

    /// Consume the lines nested under `indent` as text, keeping their
    /// indentation relative to the shallowest one.
    fn text_block(&mut self, indent: usize) -> String {
        let start = self.pos;
        while let Some(line) = self.lines.get(self.pos) {
            if !line.text.is_empty() && line.indent <= indent {
                break;
            }
            self.pos += 1;
        }

        let nested = &self.lines[start..self.pos];
        let base = nested
            .iter()
            .filter(|l| !l.text.is_empty())
            .map(|l| l.indent)
            .min()
            .unwrap_or(0);

        let text = nested
            .iter()
            .map(|l| if l.text.is_empty() { "" } else { &l.raw[base..] })
            .collect::<Vec<_>>()
            .join("\n");
        text.trim_end_matches('\n').to_string()
    }
}

fn is_template_tag(text: &str) -> bool {
    text.starts_with("{%") || text.starts_with("{{") || text.starts_with("{#")
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Parse `tag#id.class(attrs)` and return the element plus the unparsed rest.
fn parse_head(text: &str, line: usize) -> Result<(Element, &str), TerseError> {
    let syntax = |message: String| TerseError::Syntax { line, message };
    let mut element = Element::default();

    let tag_end = text.find(|c: char| !is_name_char(c)).unwrap_or(text.len());
    element.tag = text[..tag_end].to_string();
    let mut rest = &text[tag_end..];

    loop {
        let Some(marker) = rest.chars().next().filter(|c| *c == '.' || *c == '#') else {
            break;
        };
        let name_len = rest[1..]
            .find(|c: char| !is_name_char(c))
            .unwrap_or(rest.len() - 1);
        if name_len == 0 {
            break;
        }
        let name = rest[1..1 + name_len].to_string();
        if marker == '.' {
            element.classes.push(name);
        } else {
            element.id = Some(name);
        }
        rest = &rest[1 + name_len..];
    }

    if element.tag.is_empty() {
        if element.classes.is_empty() && element.id.is_none() {
            return Err(syntax(format!("expected an element, found `{text}`")));
        }
        element.tag = "div".to_string();
    }

    if let Some(attrs) = rest.strip_prefix('(') {
        let close = find_attr_close(attrs)
            .ok_or_else(|| syntax("unclosed attribute list".to_string()))?;
        for (key, value) in parse_attrs(&attrs[..close], line)? {
            match (key.as_str(), value) {
                ("class", Some(value)) => {
                    element.classes.extend(value.split_whitespace().map(str::to_string));
                }
                ("id", Some(value)) => element.id = Some(value),
                (_, value) => element.attrs.push((key, value)),
            }
        }
        rest = &attrs[close + 1..];
    }

    Ok((element, rest))
}

/// Position of the `)` closing an attribute list, skipping quoted values.
fn find_attr_close(attrs: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in attrs.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == ')' => return Some(i),
            None => {}
        }
    }
    None
}

fn parse_attrs(src: &str, line: usize) -> Result<Vec<(String, Option<String>)>, TerseError> {
    let mut attrs = Vec::new();
    let mut rest = src;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let key_end = rest
            .find(|c: char| c == '=' || c == ',' || c.is_whitespace())
            .unwrap_or(rest.len());
        let key = rest[..key_end].to_string();
        rest = &rest[key_end..];

        let Some(after_eq) = rest.trim_start().strip_prefix('=') else {
            attrs.push((key, None));
            continue;
        };
        let after_eq = after_eq.trim_start();

        let (value, remaining) = match after_eq.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let end = after_eq[1..].find(q).ok_or_else(|| TerseError::Syntax {
                    line,
                    message: format!("unterminated value for attribute `{key}`"),
                })?;
                (&after_eq[1..1 + end], &after_eq[end + 2..])
            }
            _ => {
                let end = after_eq
                    .find(|c: char| c == ',' || c.is_whitespace())
                    .unwrap_or(after_eq.len());
                (&after_eq[..end], &after_eq[end..])
            }
        };
        attrs.push((key, Some(value.to_string())));
        rest = remaining;
    }

    Ok(attrs)
}

// =============================================================================
// Output
// =============================================================================

fn render_nodes(nodes: &[Node], out: &mut String) {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_node(node, out);
    }
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(element) => render_element(element, out),
        Node::Text(text) => out.push_str(text),
        Node::Raw { text, children } => {
            out.push_str(text);
            if !children.is_empty() {
                out.push('\n');
                render_nodes(children, out);
            }
        }
        Node::Comment(text) => {
            out.push_str("<!-- ");
            out.push_str(text);
            out.push_str(" -->");
        }
        Node::Doctype(kind) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(kind);
            out.push('>');
        }
    }
}

fn render_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    if let Some(id) = &element.id {
        push_attr(out, "id", Some(id));
    }
    if !element.classes.is_empty() {
        push_attr(out, "class", Some(&element.classes.join(" ")));
    }
    for (key, value) in &element.attrs {
        push_attr(out, key, value.as_deref());
    }
    out.push('>');

    if is_void(&element.tag) {
        return;
    }

    if let Some(text) = &element.text {
        out.push_str(text);
    }
    if !element.children.is_empty() {
        out.push('\n');
        render_nodes(&element.children, out);
        out.push('\n');
    }

    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

fn push_attr(out: &mut String, key: &str, value: Option<&str>) {
    out.push(' ');
    out.push_str(key);
    if let Some(value) = value {
        out.push_str("=\"");
        out.push_str(&value.replace('"', "&quot;"));
        out.push('"');
    }
}
