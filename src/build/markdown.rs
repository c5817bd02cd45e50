//! Markdown page rendering.

use pulldown_cmark::{Options, Parser, html};

/// Render markdown to HTML using pulldown-cmark.
///
/// Raw HTML in the source passes through untouched, so slides can mix
/// markdown with the custom elements the normalizer rewrites (`<hero>`,
/// `<steplist>`).
pub fn render_markdown(markdown: &str) -> String {
    // Enable common extensions
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES;

    let parser = Parser::new_ext(markdown, options);

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}
