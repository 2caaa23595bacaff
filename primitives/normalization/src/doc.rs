//! Documentation normalization.
//!
//! Service descriptions carry documentation as HTML fragments. [`godoc`]
//! reduces them to plain sentences and lays them out as `///` comment lines.

use scraper::{Html, Node};
use textwrap::Options;

use crate::ident::exportable;

/// Column at which generated doc comments are wrapped, prefix included.
pub const LINE_WIDTH: usize = 72;

const DOC_PREFIX: &str = "/// ";

/// Elements that start a new run of text when flattened.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "dl", "dt", "dd", "h1", "h2", "h3", "h4", "h5", "h6",
    "pre", "table", "tr", "td", "th", "blockquote", "note",
];

/// Renders a documentation fragment as a `///` comment block.
///
/// `member` is the name being documented, or empty for free-standing text.
/// When given, its exported form leads the sentence and the first letter of
/// the extracted text is lower-cased ("Returns the trail" becomes
/// "DeleteTrail returns the trail"). An empty or text-less fragment yields
/// `"/// <Name> is undocumented."`. The result always ends with a newline.
///
/// ```
/// use normalization::godoc;
/// assert_eq!(godoc("DeleteTrail", ""), "/// DeleteTrail is undocumented.\n");
/// assert_eq!(
///     godoc("DeleteTrail", "<p>Deletes a trail.</p>"),
///     "/// DeleteTrail deletes a trail.\n"
/// );
/// ```
pub fn godoc(member: &str, content: &str) -> String {
    let text = extract_text(content);
    if text.is_empty() {
        return undocumented(member);
    }

    let sentence = if member.is_empty() {
        text
    } else {
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => {
                format!("{} {}{}", exportable(member), first.to_lowercase(), chars.as_str())
            }
            None => return undocumented(member),
        }
    };

    wrap_comment(&sentence)
}

fn undocumented(member: &str) -> String {
    let name = exportable(member);
    if name.is_empty() {
        format!("{DOC_PREFIX}Undocumented.\n")
    } else {
        format!("{DOC_PREFIX}{name} is undocumented.\n")
    }
}

/// Extracts the visible text of an HTML fragment with whitespace collapsed.
///
/// HTML parsing never fails; malformed markup degrades to whatever text the
/// parser recovers.
pub fn extract_text(content: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(content);
    let mut raw = String::with_capacity(content.len());
    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) => raw.push(' '),
            _ => {}
        }
    }

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn wrap_comment(text: &str) -> String {
    let options = Options::new(LINE_WIDTH)
        .initial_indent(DOC_PREFIX)
        .subsequent_indent(DOC_PREFIX)
        .break_words(false);

    let mut out = String::with_capacity(text.len() + 16);
    for line in textwrap::wrap(text, options) {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
