use archiver_core::Bookmark;

use crate::FetchMetadata;

/// Renders the archive document: a YAML-ish front matter block followed by the
/// converted body.
pub fn build_archive_document(
    bookmark: &Bookmark,
    metadata: &FetchMetadata,
    encoding: &str,
    archived_utc: &str,
    body_markdown: &str,
) -> String {
    let title = if bookmark.title.is_empty() {
        "untitled"
    } else {
        bookmark.title.as_str()
    };
    let mut doc = String::with_capacity(body_markdown.len() + 256);
    doc.push_str("---\n");
    doc.push_str(&format!("id: {}\n", bookmark.id));
    doc.push_str(&format!("url: {}\n", bookmark.url));
    if metadata.final_url != bookmark.url {
        doc.push_str(&format!("final_url: {}\n", metadata.final_url));
    }
    doc.push_str(&format!("title: {}\n", single_line(title)));
    if !bookmark.excerpt.is_empty() {
        doc.push_str(&format!("excerpt: {}\n", single_line(&bookmark.excerpt)));
    }
    doc.push_str(&format!("archived_utc: {archived_utc}\n"));
    doc.push_str(&format!("encoding: {encoding}\n"));
    doc.push_str("---\n\n");
    doc.push_str(body_markdown);
    doc
}

fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
