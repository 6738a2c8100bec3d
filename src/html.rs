//! Document parsing helpers built on `scraper`.

use crate::fetcher::{Link, Paragraph, ParsedContent};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extracts the title and the paragraph blocks of an HTML document.
#[derive(Clone)]
pub struct DocumentParser {
    roots: Vec<Selector>,
    paragraph: Selector,
    anchor: Selector,
    title: Selector,
}

impl DocumentParser {
    /// Builds a parser with the default content-root preference:
    /// `#mw-content-text`, `main`, `article`, `body`.
    pub fn new() -> Self {
        Self {
            roots: ["#mw-content-text", "main", "article", "body"]
                .into_iter()
                .map(|css| Selector::parse(css).expect("root selector"))
                .collect(),
            paragraph: Selector::parse("p").expect("paragraph selector"),
            anchor: Selector::parse("a[href]").expect("anchor selector"),
            title: Selector::parse("title").expect("title selector"),
        }
    }

    /// Parses `html` fetched from `base`. Returns `None` when the document has no paragraphs.
    pub fn parse(&self, html: &str, base: &Url) -> Option<ParsedContent> {
        let document = Html::parse_document(html);
        let root = self.pick_root(&document);

        let paragraphs: Vec<Paragraph> = root
            .select(&self.paragraph)
            .map(|element| self.paragraph(element, base))
            .collect();
        if paragraphs.is_empty() {
            return None;
        }

        let title = document
            .select(&self.title)
            .next()
            .map(|element| extract_text(&element))
            .filter(|title| !title.is_empty());

        Some(ParsedContent { title, paragraphs })
    }

    fn pick_root<'a>(&self, document: &'a Html) -> ElementRef<'a> {
        self.roots
            .iter()
            .find_map(|selector| document.select(selector).next())
            .unwrap_or_else(|| document.root_element())
    }

    fn paragraph(&self, element: ElementRef<'_>, base: &Url) -> Paragraph {
        let links = element
            .select(&self.anchor)
            .filter_map(|anchor| anchor.value().attr("href"))
            .map(|href| Link {
                href: href.to_string(),
                target: base.join(href).ok(),
            })
            .collect();

        Paragraph {
            text: extract_text(&element),
            links,
        }
    }
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Joins every text node of `element` before collapsing, so inline markup
/// never splits a word.
fn extract_text(element: &ElementRef<'_>) -> String {
    let mut raw = String::new();
    for piece in element.text() {
        raw.push_str(piece);
    }
    collapse_whitespace(&raw)
}

fn collapse_whitespace(input: &str) -> String {
    let mut buf = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space && !buf.is_empty() {
                buf.push(' ');
            }
            last_space = true;
        } else {
            buf.push(ch);
            last_space = false;
        }
    }
    buf.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://en.wikipedia.org/wiki/Cat").unwrap()
    }

    #[test]
    fn prefers_content_root() {
        let html = r##"
            <html>
              <head><title> Cat - Wikipedia </title></head>
              <body>
                <p>Navigation chrome</p>
                <div id="mw-content-text">
                  <p>The <b>cat</b> is a <a href="/wiki/Mammal">mammal</a>.</p>
                  <p>See <a href="https://example.org/cats">cats</a> and <a href="#cite_note-1">[1]</a>.</p>
                </div>
              </body>
            </html>
        "##;

        let page = DocumentParser::new().parse(html, &base()).expect("content");
        assert_eq!(page.title.as_deref(), Some("Cat - Wikipedia"));
        assert_eq!(page.paragraphs.len(), 2);
        assert_eq!(page.paragraphs[0].text, "The cat is a mammal.");

        let links: Vec<(&str, Option<&str>)> = page
            .links()
            .map(|link| (link.href.as_str(), link.target.as_ref().map(Url::as_str)))
            .collect();
        assert_eq!(
            links,
            [
                ("/wiki/Mammal", Some("https://en.wikipedia.org/wiki/Mammal")),
                ("https://example.org/cats", Some("https://example.org/cats")),
                ("#cite_note-1", Some("https://en.wikipedia.org/wiki/Cat#cite_note-1")),
            ]
        );
    }

    #[test]
    fn falls_back_to_body() {
        let html = "<html><body><div><p>Only   body\n text</p></div></body></html>";
        let page = DocumentParser::new().parse(html, &base()).expect("content");
        assert_eq!(page.title, None);
        assert_eq!(page.texts().collect::<Vec<_>>(), ["Only body text"]);
    }

    #[test]
    fn inline_markup_does_not_split_words() {
        let html = r#"<html><body><p>The <b>cat</b> is a <a href="/wiki/Mammal">mammal</a>. Ja<b>va</b>script</p></body></html>"#;
        let page = DocumentParser::new().parse(html, &base()).expect("content");
        assert_eq!(
            page.texts().collect::<Vec<_>>(),
            ["The cat is a mammal. Javascript"]
        );
    }

    #[test]
    fn document_without_paragraphs_is_empty() {
        let html = "<html><body><div>No paragraphs here</div></body></html>";
        assert!(DocumentParser::new().parse(html, &base()).is_none());
    }
}
