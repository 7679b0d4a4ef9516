//! Sitemap parsing.

use quick_xml::{Reader, events::Event};

/// The parsed content of a sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sitemap {
    /// A `<urlset>` listing pages.
    UrlSet(Vec<String>),
    /// A `<sitemapindex>` listing further sitemaps.
    Index(Vec<String>),
}

impl Sitemap {
    /// Returns the listed locations.
    pub fn locations(&self) -> &[String] {
        match self {
            Self::UrlSet(locs) | Self::Index(locs) => locs,
        }
    }
}

/// Parses a sitemap, collecting the text of every `<loc>` element in document order.
///
/// The document is treated as an index when its root element is `<sitemapindex>`.
/// Namespace prefixes are ignored. Returns the parser message on malformed XML.
pub fn parse_sitemap(xml: &str) -> Result<Sitemap, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut locations = Vec::new();
    let mut is_index = false;
    let mut seen_root = false;
    let mut in_loc = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                let name = name.as_ref();
                if !seen_root {
                    seen_root = true;
                    is_index = name == b"sitemapindex";
                }
                if name == b"loc" {
                    in_loc = true;
                    current.clear();
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"loc" {
                    in_loc = false;
                    let loc = current.trim();
                    if !loc.is_empty() {
                        locations.push(loc.to_string());
                    }
                }
            }
            Ok(Event::Text(e)) if in_loc => {
                let text = e.unescape().map_err(|e| e.to_string())?;
                current.push_str(&text);
            }
            Ok(Event::CData(e)) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "error at position {}: {e}",
                    reader.buffer_position()
                ));
            }
            _ => {}
        }
    }

    if !seen_root {
        return Err("document has no root element".to_string());
    }

    Ok(if is_index {
        Sitemap::Index(locations)
    } else {
        Sitemap::UrlSet(locations)
    })
}
