//! Head elements: stylesheet links and scripts.

use std::collections::HashSet;

use strata_core::{RenderContext, SsrElement};
use url::Url;

use crate::chunk::{chunk_stream, Chunk, ChunkStream};

/// Create stylesheet link elements, in order, without duplicates.
pub fn link_stylesheet_elements<I, S>(hrefs: I, site: Option<&str>) -> Vec<SsrElement>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    hrefs
        .into_iter()
        .map(|href| prefix_asset_path(href.as_ref(), site))
        .filter(|href| seen.insert(href.clone()))
        .map(|href| SsrElement::with_props(vec![("rel", "stylesheet".to_string()), ("href", href)]))
        .collect()
}

/// Create module script elements, in order, without duplicates.
pub fn module_script_elements<I, S>(srcs: I, site: Option<&str>) -> Vec<SsrElement>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    srcs.into_iter()
        .map(|src| prefix_asset_path(src.as_ref(), site))
        .filter(|src| seen.insert(src.clone()))
        .map(|src| SsrElement::with_props(vec![("type", "module".to_string()), ("src", src)]))
        .collect()
}

/// Join an asset path onto the site's base path.
///
/// URLs with a scheme are returned unchanged.
pub fn prefix_asset_path(href: &str, site: Option<&str>) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    let base = site
        .and_then(|site| Url::parse(site).ok())
        .map(|url| url.path().to_string())
        .unwrap_or_else(|| "/".to_string());
    join_posix(&base, href)
}

fn join_posix(base: &str, path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(path.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Head fragment injected into pages that do not render their own head.
#[derive(Debug, Clone, Default)]
pub struct HeadElements {
    /// Stylesheet links.
    pub links: Vec<SsrElement>,
    /// Scripts.
    pub scripts: Vec<SsrElement>,
}

impl HeadElements {
    /// Collect the head elements of a render.
    pub fn from_context(ctx: &RenderContext) -> Self {
        Self {
            links: ctx.links.clone(),
            scripts: ctx.scripts.clone(),
        }
    }

    /// Render the head to HTML.
    pub fn render(&self) -> String {
        let mut html = String::new();

        for link in &self.links {
            html.push_str(&render_void_element("link", link));
        }

        for script in &self.scripts {
            html.push_str(&render_element("script", script));
        }

        html
    }

    /// Render the head as a chunk sequence.
    pub fn render_chunks(&self) -> ChunkStream {
        let html = self.render();
        if html.is_empty() {
            chunk_stream(Vec::new())
        } else {
            chunk_stream(vec![Chunk::Html(html)])
        }
    }
}

/// Render an element with a closing tag.
pub fn render_element(tag: &str, el: &SsrElement) -> String {
    format!("<{tag}{}>{}</{tag}>", render_attrs(el), el.children)
}

fn render_void_element(tag: &str, el: &SsrElement) -> String {
    format!("<{tag}{}>", render_attrs(el))
}

fn render_attrs(el: &SsrElement) -> String {
    el.props
        .iter()
        .map(|(k, v)| format!(r#" {}="{}""#, k, escape_attr(v)))
        .collect()
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Asset Path Tests ===

    #[test]
    fn test_prefix_without_site() {
        assert_eq!(prefix_asset_path("assets/a.css", None), "/assets/a.css");
        assert_eq!(prefix_asset_path("/assets/a.css", None), "/assets/a.css");
    }

    #[test]
    fn test_prefix_with_base_path() {
        let site = Some("https://example.com/blog/");
        assert_eq!(prefix_asset_path("assets/a.css", site), "/blog/assets/a.css");
        assert_eq!(prefix_asset_path("./assets/a.css", site), "/blog/assets/a.css");
    }

    #[test]
    fn test_prefix_leaves_urls() {
        assert_eq!(
            prefix_asset_path("https://cdn.example.com/a.css", Some("https://example.com/blog/")),
            "https://cdn.example.com/a.css"
        );
    }

    // === Element Tests ===

    #[test]
    fn test_link_elements_dedupe_in_order() {
        let links = link_stylesheet_elements(["b.css", "a.css", "b.css"], None);
        let hrefs: Vec<_> = links.iter().filter_map(|l| l.prop("href")).collect();
        assert_eq!(hrefs, vec!["/b.css", "/a.css"]);
        assert_eq!(links[0].prop("rel"), Some("stylesheet"));
    }

    #[test]
    fn test_module_script_elements() {
        let scripts = module_script_elements(["hoisted.js"], Some("https://example.com/docs"));
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].prop("type"), Some("module"));
        assert_eq!(scripts[0].prop("src"), Some("/docs/hoisted.js"));
    }

    #[test]
    fn test_head_render() {
        let head = HeadElements {
            links: link_stylesheet_elements(["a.css"], None),
            scripts: vec![
                SsrElement::inline("window.x = 1;"),
                SsrElement::with_props(vec![("type", "module".into()), ("src", "/h.js".into())]),
            ],
        };

        assert_eq!(
            head.render(),
            concat!(
                r#"<link rel="stylesheet" href="/a.css">"#,
                "<script>window.x = 1;</script>",
                r#"<script type="module" src="/h.js"></script>"#,
            )
        );
    }

    #[test]
    fn test_attribute_escaping() {
        let el = SsrElement::with_props(vec![("href", r#"/a".css"#.into())]);
        assert_eq!(render_void_element("link", &el), r#"<link href="/a&quot;.css">"#);
    }

    #[test]
    fn test_empty_head_renders_nothing() {
        assert!(HeadElements::default().render().is_empty());
    }
}
