use scraper::{Html, Selector};

/// Longest excerpt kept when falling back to body text.
const EXCERPT_MAX_CHARS: usize = 280;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content_html: String,
}

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str) -> ExtractedContent;
}

/// Lightweight "readability-like" extractor:
/// - title from `<title>`, then `og:title`
/// - excerpt from `meta[name=description]`, then `og:description`, then leading body text
/// - content from `<article>`, then `<main>`, then `<body>`, then the whole document
#[derive(Debug, Default)]
pub struct ReadabilityLikeExtractor;

impl Extractor for ReadabilityLikeExtractor {
    fn extract(&self, html: &str) -> ExtractedContent {
        let doc = Html::parse_document(html);

        let title = first_text(&doc, "title")
            .or_else(|| first_attr(&doc, r#"meta[property="og:title"]"#, "content"));

        let content_node = ["article", "main", "body"]
            .iter()
            .filter_map(|css| Selector::parse(css).ok())
            .find_map(|sel| doc.select(&sel).next());

        let excerpt = first_attr(&doc, r#"meta[name="description"]"#, "content")
            .or_else(|| first_attr(&doc, r#"meta[property="og:description"]"#, "content"))
            .or_else(|| {
                content_node.and_then(|node| {
                    let text = node.text().collect::<Vec<_>>().join(" ");
                    summarize(&text)
                })
            });

        let content_html = content_node
            .map(|node| node.inner_html())
            .unwrap_or_else(|| doc.root_element().html());

        ExtractedContent {
            title,
            excerpt,
            content_html,
        }
    }
}

fn first_text(doc: &Html, css: &str) -> Option<String> {
    let sel = Selector::parse(css).ok()?;
    doc.select(&sel)
        .next()
        .map(|node| node.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn first_attr(doc: &Html, css: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(css).ok()?;
    doc.select(&sel)
        .filter_map(|node| node.value().attr(attr))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn summarize(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    if collapsed.chars().count() <= EXCERPT_MAX_CHARS {
        return Some(collapsed);
    }
    let mut cut: String = collapsed.chars().take(EXCERPT_MAX_CHARS).collect();
    if let Some(space) = cut.rfind(' ') {
        cut.truncate(space);
    }
    cut.push('…');
    Some(cut)
}
