//! Lightweight markdown rendering for report bodies.
//!
//! Drafts come back from the language model with a handful of markdown
//! conventions. Only those are rendered; everything else is escaped and shown
//! verbatim.

use std::sync::OnceLock;

use regex::Regex;

static BOLD_RE: OnceLock<Regex> = OnceLock::new();
static ITALIC_RE: OnceLock<Regex> = OnceLock::new();
static SECTION_RE: OnceLock<Regex> = OnceLock::new();
static PARAGRAPH_RE: OnceLock<Regex> = OnceLock::new();

fn compile(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("report format regex {pattern} failed: {error}"))
    })
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render report text as HTML.
///
/// The input is escaped first, so the only markup in the output is the markup
/// this function adds:
/// - `**bold**` becomes `<strong>`;
/// - `*italic*` becomes `<em>`;
/// - numbered upper-case headings such as `2. FINDINGS:` become section
///   headers;
/// - blank-line separated paragraphs become `<br><br>` and remaining newlines
///   `<br>`.
///
/// # Examples
/// ```
/// use diagnoseai::domain::markdown_to_html;
///
/// let html = markdown_to_html("1. FINDINGS:\nNormal **liver** <echo>");
/// assert_eq!(
///     html,
///     "<div class=\"report-section-header\"><strong>1. FINDINGS:</strong></div>\
///      <br>Normal <strong>liver</strong> &lt;echo&gt;"
/// );
/// ```
pub fn markdown_to_html(text: &str) -> String {
    let escaped = escape_html(text.replace("\r\n", "\n").as_str());
    let bold = compile(&BOLD_RE, r"\*\*(.*?)\*\*").replace_all(&escaped, "<strong>$1</strong>");
    let italic = compile(&ITALIC_RE, r"\*([^*\n]+?)\*").replace_all(&bold, "<em>$1</em>");
    let sections = compile(&SECTION_RE, r"(?m)^(\d+\.[ \t]+)([A-Z \t:]+)$").replace_all(
        &italic,
        r#"<div class="report-section-header"><strong>$1$2</strong></div>"#,
    );
    let paragraphs = compile(&PARAGRAPH_RE, r"\n\s*\n").replace_all(&sections, "<br><br>");
    paragraphs.replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "")]
    #[case("plain text", "plain text")]
    #[case("**bold**", "<strong>bold</strong>")]
    #[case("*soft*", "<em>soft</em>")]
    #[case("**a** and *b*", "<strong>a</strong> and <em>b</em>")]
    #[case("one\ntwo", "one<br>two")]
    #[case("one\n\n\ntwo", "one<br><br>two")]
    #[case("one\r\ntwo", "one<br>two")]
    fn renders_inline_markup(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(markdown_to_html(input), expected);
    }

    #[rstest]
    #[case("<script>alert('x')</script>", "&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;")]
    #[case("a & b", "a &amp; b")]
    #[case("**<b>**", "<strong>&lt;b&gt;</strong>")]
    fn escapes_user_content(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(markdown_to_html(input), expected);
    }

    #[rstest]
    fn wraps_numbered_headings() {
        let html = markdown_to_html("2. IMPRESSION:\nNo acute findings.\n3. Follow up soon");
        assert_eq!(
            html,
            "<div class=\"report-section-header\"><strong>2. IMPRESSION:</strong></div>\
             <br>No acute findings.<br>3. Follow up soon"
        );
    }

    #[rstest]
    fn headings_do_not_span_lines() {
        let html = markdown_to_html("1. FINDINGS\nNORMAL");
        assert!(html.starts_with("<div class=\"report-section-header\"><strong>1. FINDINGS</strong></div><br>NORMAL"));
    }
}
