//! Content-type dispatch by file extension.

use std::path::Path;

use pulldown_cmark::{html, Parser};

use crate::html::html_escape;

/// How a document is presented, decided solely by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `.txt` or no extension
    PlainText,
    /// `.md`
    Markdown,
    /// `.html`
    Html,
    /// Any other extension
    Other,
}

impl DocumentKind {
    pub fn from_name(name: &str) -> Self {
        match Path::new(name).extension().and_then(|ext| ext.to_str()) {
            None => DocumentKind::PlainText,
            Some("txt") => DocumentKind::PlainText,
            Some("md") => DocumentKind::Markdown,
            Some("html") => DocumentKind::Html,
            Some(_) => DocumentKind::Other,
        }
    }

    /// Render raw document bytes to an HTML fragment for the page body.
    ///
    /// Markdown is converted, HTML passes through untouched, everything else
    /// is escaped into a `<pre>` block. Invalid UTF-8 is replaced lossily.
    pub fn render(self, content: &[u8]) -> String {
        let text = String::from_utf8_lossy(content);
        match self {
            DocumentKind::Markdown => render_markdown(&text),
            DocumentKind::Html => text.into_owned(),
            DocumentKind::PlainText | DocumentKind::Other => {
                format!("<pre>{}</pre>", html_escape(&text))
            }
        }
    }
}

fn render_markdown(text: &str) -> String {
    let parser = Parser::new(text);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_name("about.md"), DocumentKind::Markdown);
        assert_eq!(DocumentKind::from_name("page.html"), DocumentKind::Html);
        assert_eq!(DocumentKind::from_name("changes.txt"), DocumentKind::PlainText);
        assert_eq!(DocumentKind::from_name("README"), DocumentKind::PlainText);
        assert_eq!(DocumentKind::from_name("data.csv"), DocumentKind::Other);
        assert_eq!(DocumentKind::from_name("archive.md.bak"), DocumentKind::Other);
    }

    #[test]
    fn test_render_markdown() {
        let html = DocumentKind::Markdown.render(b"# Heading 1");
        assert!(html.contains("<h1>Heading 1</h1>"));
    }

    #[test]
    fn test_render_html_passes_through() {
        let html = DocumentKind::Html.render(b"<p class=\"x\">raw</p>");
        assert_eq!(html, "<p class=\"x\">raw</p>");
    }

    #[test]
    fn test_render_plain_text_is_escaped() {
        let html = DocumentKind::PlainText.render(b"a < b & c");
        assert_eq!(html, "<pre>a &lt; b &amp; c</pre>");

        let other = DocumentKind::Other.render(b"x,y");
        assert_eq!(other, "<pre>x,y</pre>");
    }
}
