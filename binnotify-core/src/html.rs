//! Low-level HTML string helpers for the council scrapers.
//!
//! These are naive on purpose: council pages are small and the scrapers only
//! need a handful of text fragments out of them. Tag and attribute matching is
//! ASCII case-insensitive.

/// Remove every `<...>` tag, decode the common entities, and collapse
/// whitespace.
///
/// Tags are replaced by a space so that words in adjacent elements do not run
/// together.
#[must_use]
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&decode_entities(&out))
}

/// Minimal entity decoding for the entities council pages actually use.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Collapse runs of whitespace into a single space and trim.
#[must_use]
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split `html` at every occurrence of `marker` and return what follows each
/// one, up to the next occurrence.
///
/// Text before the first marker is dropped.
#[must_use]
pub fn segments_after<'a>(html: &'a str, marker: &str) -> Vec<&'a str> {
    let haystack = html.to_ascii_lowercase();
    let needle = marker.to_ascii_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let starts: Vec<usize> = haystack
        .match_indices(&needle)
        .map(|(idx, _)| idx + needle.len())
        .collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(position, &start)| {
            let end = starts
                .get(position + 1)
                .map_or(html.len(), |next| next - needle.len());
            html.get(start..end)
        })
        .collect()
}

/// Text content of the first `<tag ...>...</tag>` element in `html`.
#[must_use]
pub fn first_element_text(html: &str, tag: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let open = format!("<{}", tag.to_ascii_lowercase());
    let close = format!("</{}", tag.to_ascii_lowercase());

    let start = lower.find(&open)?;
    let body_start = start + lower.get(start..)?.find('>')? + 1;
    let body_end = body_start + lower.get(body_start..)?.find(&close)?;
    html.get(body_start..body_end).map(strip_tags)
}

/// Text of the first element whose opening tag mentions `class_name`, up to
/// the next closing tag.
#[must_use]
pub fn element_text_with_class(html: &str, class_name: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let class_at = lower.find(&class_name.to_ascii_lowercase())?;
    let body_start = class_at + lower.get(class_at..)?.find('>')? + 1;
    let body_end = body_start + lower.get(body_start..)?.find("</")?;
    html.get(body_start..body_end).map(strip_tags)
}
