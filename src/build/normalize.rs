//! Structural rewriting of rendered page fragments.
//!
//! Rules run in a fixed order:
//!
//! 1. `<hero>` elements become `div.stack-center > div.stacked-center`.
//! 2. With animation on, `.c-step`, `.c-dim` and `.c-shy` become fragment
//!    classes understood by the backends.
//! 3. The page `id` and `class` are stamped onto every top-level block element.
//! 4. Steplist containers mark the items of their list as steps and are
//!    unwrapped.
//!
//! Normalizing already-normalized output returns it unchanged.

use std::io;

use kuchikiki::traits::*;
use kuchikiki::{Attribute, ElementData, ExpandedName, NodeRef};

/// Marker class for a single reveal step.
pub const STEP_CLASS: &str = "c-step";

/// Class the backends animate.
pub const FRAGMENT_CLASS: &str = "ft-fragment";

/// Attribute carrying the page id on block elements.
pub const ID_ATTRIBUTE: &str = "data-id";

const HERO_SELECTOR: &str = "hero";
const STEPLIST_SELECTOR: &str = "steplist, .c-steplist";

/// Marker class, and the classes that replace it when animation is on.
const FRAGMENT_RULES: [(&str, &[&str]); 3] = [
    (STEP_CLASS, &[FRAGMENT_CLASS]),
    ("c-dim", &[FRAGMENT_CLASS, "step"]),
    ("c-shy", &[FRAGMENT_CLASS, "shy"]),
];

const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "dialog",
    "div",
    "dl",
    "fieldset",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

/// Per-page inputs to the rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions<'a> {
    /// Page id from its front matter
    pub id: Option<&'a str>,
    /// Page class from its front matter
    pub class: Option<&'a str>,
    /// Resolved `animation` option
    pub animation: bool,
}

/// Apply every rewrite rule to an HTML fragment.
pub fn normalize_fragment(html: &str, options: &NormalizeOptions) -> io::Result<String> {
    let document = kuchikiki::parse_html().one(format!(
        "<!DOCTYPE html><html><head></head><body>{html}</body></html>"
    ));
    let Ok(body) = document.select_first("body") else {
        return Ok(html.to_string());
    };
    let body = body.as_node();

    replace_heroes(body);
    if options.animation {
        rewrite_fragment_classes(body);
    }
    if options.id.is_some() || options.class.is_some() {
        inject_identity(body, options);
    }
    expand_steplists(body, options.animation);

    let mut out = Vec::new();
    for child in body.children() {
        child.serialize(&mut out)?;
    }
    String::from_utf8(out).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn select_all(root: &NodeRef, selector: &str) -> Vec<NodeRef> {
    root.select(selector)
        .map(|matches| matches.map(|m| m.as_node().clone()).collect())
        .unwrap_or_default()
}

fn replace_heroes(body: &NodeRef) {
    for hero in select_all(body, HERO_SELECTOR) {
        let Some(element) = hero.as_element() else {
            continue;
        };
        let outer = new_div(element, "stack-center");
        let inner = new_div(element, "stacked-center");
        for child in hero.children().collect::<Vec<_>>() {
            inner.append(child);
        }
        outer.append(inner);
        hero.insert_before(outer);
        hero.detach();
    }
}

fn new_div(like: &ElementData, class: &str) -> NodeRef {
    let mut name = like.name.clone();
    name.local = "div".into();
    NodeRef::new_element(
        name,
        [(
            ExpandedName::new("", "class"),
            Attribute {
                prefix: None,
                value: class.to_string(),
            },
        )],
    )
}

fn rewrite_fragment_classes(body: &NodeRef) {
    for (marker, replacements) in FRAGMENT_RULES {
        for node in select_all(body, &format!(".{marker}")) {
            if let Some(element) = node.as_element() {
                let mut classes = classes(element);
                classes.retain(|c| c != marker);
                for replacement in replacements {
                    add_class(&mut classes, replacement);
                }
                set_classes(element, &classes);
            }
        }
    }
}

fn inject_identity(body: &NodeRef, options: &NormalizeOptions) {
    for node in top_level_blocks(body) {
        let Some(element) = node.as_element() else {
            continue;
        };
        if let Some(class) = options.class {
            let mut classes = classes(element);
            for name in class.split_whitespace() {
                add_class(&mut classes, name);
            }
            set_classes(element, &classes);
        }
        if let Some(id) = options.id {
            element
                .attributes
                .borrow_mut()
                .insert(ID_ATTRIBUTE, id.to_string());
        }
    }
}

/// Block-level children of `parent`, looking through steplist containers,
/// which are unwrapped later.
fn top_level_blocks(parent: &NodeRef) -> Vec<NodeRef> {
    let mut blocks = Vec::new();
    for child in parent.children() {
        let Some(element) = child.as_element() else {
            continue;
        };
        if is_steplist(element) {
            blocks.extend(top_level_blocks(&child));
        } else if BLOCK_ELEMENTS.contains(&element.name.local.as_ref()) {
            blocks.push(child);
        }
    }
    blocks
}

fn expand_steplists(body: &NodeRef, animation: bool) {
    // Rule 2 has already run, so items are marked with the final class.
    let marker = if animation { FRAGMENT_CLASS } else { STEP_CLASS };

    for container in select_all(body, STEPLIST_SELECTOR) {
        if let Some(list) = steplist_target(&container) {
            for item in list.children() {
                if let Some(element) = item.as_element()
                    && element.name.local.as_ref() == "li"
                {
                    let mut classes = classes(element);
                    add_class(&mut classes, marker);
                    set_classes(element, &classes);
                }
            }
        }
        for child in container.children().collect::<Vec<_>>() {
            container.insert_before(child);
        }
        container.detach();
    }
}

/// The container's own child list, or else the list right after it.
fn steplist_target(container: &NodeRef) -> Option<NodeRef> {
    container.children().find(is_list).or_else(|| {
        container
            .following_siblings()
            .elements()
            .next()
            .map(|next| next.as_node().clone())
            .filter(is_list)
    })
}

fn is_list(node: &NodeRef) -> bool {
    node.as_element()
        .is_some_and(|e| matches!(e.name.local.as_ref(), "ul" | "ol"))
}

fn is_steplist(element: &ElementData) -> bool {
    element.name.local.as_ref() == "steplist"
        || element
            .attributes
            .borrow()
            .get("class")
            .is_some_and(|c| c.split_whitespace().any(|name| name == "c-steplist"))
}

fn classes(element: &ElementData) -> Vec<String> {
    element
        .attributes
        .borrow()
        .get("class")
        .map(|c| c.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn add_class(classes: &mut Vec<String>, class: &str) {
    if !classes.iter().any(|c| c == class) {
        classes.push(class.to_string());
    }
}

fn set_classes(element: &ElementData, classes: &[String]) {
    let mut attributes = element.attributes.borrow_mut();
    if classes.is_empty() {
        attributes.remove("class");
    } else {
        attributes.insert("class", classes.join(" "));
    }
}
