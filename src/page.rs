use regex::Regex;

/// Scans fetched HTML for the favicon and anchor signals.
pub struct PageAnalyzer {
    link_tag: Regex,
    rel_attr: Regex,
    anchor_href: Regex,
}

impl Default for PageAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageAnalyzer {
    pub fn new() -> Self {
        Self {
            link_tag: Regex::new(r"(?is)<link\b[^>]*>").expect("literal pattern"),
            rel_attr: Regex::new(r#"(?is)\brel\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
                .expect("literal pattern"),
            anchor_href: Regex::new(
                r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#,
            )
            .expect("literal pattern"),
        }
    }

    /// True when a `<link>` tag lists `icon` among its rel values.
    pub fn has_favicon(&self, html: &str) -> bool {
        self.link_tag.find_iter(html).any(|tag| {
            self.rel_attr
                .captures(tag.as_str())
                .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
                .map(|rel| {
                    rel.as_str()
                        .split_whitespace()
                        .any(|value| value.eq_ignore_ascii_case("icon"))
                })
                .unwrap_or(false)
        })
    }

    /// Every `href` of an `<a>` tag, in document order.
    pub fn anchor_hrefs<'a>(&self, html: &'a str) -> Vec<&'a str> {
        self.anchor_href
            .captures_iter(html)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
            .map(|m| m.as_str())
            .collect()
    }

    /// Anchors that are neither root-relative nor mention `domain`.
    pub fn external_link_count(&self, html: &str, domain: &str) -> usize {
        self.anchor_hrefs(html)
            .into_iter()
            .filter(|href| !href.starts_with('/') && !href.contains(domain))
            .count()
    }
}
