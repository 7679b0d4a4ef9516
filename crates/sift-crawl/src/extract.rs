//! Post extraction from HTML.

use scraper::{ElementRef, Html, Selector};
use sift_config::Selectors;
use sift_document::RawPage;
use url::Url;

use crate::error::CrawlError;

/// Extracts post fields from pages using the configured CSS selectors.
#[derive(Debug, Clone)]
pub struct Extractor {
    /// Marks a page as a post.
    post: Selector,
    /// Title elements.
    title: Selector,
    /// Body elements.
    content: Selector,
    /// Tag elements, one per tag.
    tags: Selector,
}

impl Extractor {
    /// Compiles the selectors.
    pub fn new(selectors: &Selectors) -> Result<Self, CrawlError> {
        Ok(Self {
            post: compile("post", &selectors.post)?,
            title: compile("title", &selectors.title)?,
            content: compile("content", &selectors.content)?,
            tags: compile("tags", &selectors.tags)?,
        })
    }

    /// Extracts a raw page from `html`.
    ///
    /// Returns `None` when the page has no element matching the post selector. Title and
    /// content are the concatenated text of every matching element; each tag element
    /// yields one tag.
    pub fn extract(&self, html: &str, url: &Url) -> Option<RawPage> {
        let document = Html::parse_document(html);
        document.select(&self.post).next()?;

        Some(RawPage {
            title: select_text(&document, &self.title),
            content: select_text(&document, &self.content),
            tags: document.select(&self.tags).map(element_text).collect(),
            url: url.to_string(),
        })
    }
}

/// Parses one selector.
fn compile(name: &'static str, selector: &str) -> Result<Selector, CrawlError> {
    Selector::parse(selector).map_err(|e| CrawlError::InvalidSelector {
        name,
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Concatenated text of every element matching `selector`.
fn select_text(document: &Html, selector: &Selector) -> String {
    document.select(selector).map(element_text).collect()
}

/// Concatenated descendant text of an element.
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST: &str = r#"<!doctype html>
<html><head><title>ignored</title></head>
<body>
  <article class="post-single">
    <h1 class="post-title">
      Hello <em>World</em>
    </h1>
    <div class="post-content">
      <p>Hello world, this is a test.</p>
      <p>Second <strong>paragraph</strong>.</p>
    </div>
    <ul class="post-tags">
      <li><a class="tag" href="/tags/greeting/">greeting</a></li>
      <li><a class="tag" href="/tags/intro/">intro</a></li>
    </ul>
  </article>
</body></html>"#;

    fn url() -> Url {
        Url::parse("http://localhost:1313/en/posts/hello/").unwrap()
    }

    #[test]
    fn extracts_post_fields() {
        let extractor = Extractor::new(&Selectors::default()).unwrap();
        let page = extractor.extract(POST, &url()).unwrap();

        assert_eq!(page.title.trim(), "Hello World");
        assert!(page.content.contains("Hello world, this is a test."));
        assert!(page.content.contains("Second paragraph."));
        assert_eq!(page.tags, vec!["greeting", "intro"]);
        assert_eq!(page.url, "http://localhost:1313/en/posts/hello/");
    }

    #[test]
    fn non_post_pages_are_skipped() {
        let extractor = Extractor::new(&Selectors::default()).unwrap();
        let html = r#"<html><body><ul class="post-list"><li>Post</li></ul></body></html>"#;
        assert!(extractor.extract(html, &url()).is_none());
    }

    #[test]
    fn missing_fields_are_empty() {
        let extractor = Extractor::new(&Selectors::default()).unwrap();
        let html = r#"<div class="post-single"><div class="post-content">Body.</div></div>"#;
        let page = extractor.extract(html, &url()).unwrap();
        assert_eq!(page.title, "");
        assert_eq!(page.content, "Body.");
        assert!(page.tags.is_empty());
    }

    #[test]
    fn custom_selectors_apply() {
        let selectors = Selectors {
            post: "main.entry".into(),
            title: "h2".into(),
            content: ".body".into(),
            tags: ".labels span".into(),
        };
        let extractor = Extractor::new(&selectors).unwrap();
        let html = r#"<main class="entry"><h2>T</h2><div class="body">B.</div>
            <div class="labels"><span>x</span><span>y</span></div></main>"#;
        let page = extractor.extract(html, &url()).unwrap();
        assert_eq!(page.title, "T");
        assert_eq!(page.tags, vec!["x", "y"]);
    }

    #[test]
    fn invalid_selector_is_reported() {
        let selectors = Selectors {
            tags: "[[".into(),
            ..Selectors::default()
        };
        let err = Extractor::new(&selectors).unwrap_err();
        assert!(matches!(err, CrawlError::InvalidSelector { name: "tags", .. }));
    }
}
