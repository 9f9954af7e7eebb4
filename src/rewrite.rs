//! Idempotent preview-image metadata rewriting.
//!
//! Given a page's HTML text and a target image URL, produce new HTML where
//! the three managed tags — and only those — point at the URL:
//!
//! ```html
//! <meta property="og:image" content="<url>" data-rh="true">
//! <meta name="twitter:image" content="<url>" data-rh="true">
//! <meta name="image" content="<url>" data-rh="true">
//! ```
//!
//! `data-rh="true"` marks the tags as server-rendered for the generator's
//! client-side hydration, so it doesn't flag them as a mismatch.
//!
//! ## Splice, Don't Re-serialize
//!
//! The document is parsed with `tl` only to *locate* edits: the source byte
//! spans of every pre-existing managed tag (anywhere in the document) and
//! the position of the head's closing tag. Output is then assembled from the
//! original text with those spans dropped and a fresh tag block inserted
//! before `</head>`. Everything outside the edits survives byte-for-byte —
//! no attribute reordering, no whitespace normalization — which also makes
//! the operation trivially idempotent: a second pass removes exactly the
//! block the first pass inserted and puts an identical one back.
//!
//! This module is a pure text-to-text transform; it performs no file I/O.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("failed to parse HTML: {0}")]
    Parse(String),
    #[error("document has no <head> element")]
    MissingHead,
    #[error("document <head> has no closing tag")]
    UnclosedHead,
}

/// The three managed tag identities, as (attribute, value) pairs.
const MANAGED: &[(&str, &str)] = &[
    ("property", "og:image"),
    ("name", "twitter:image"),
    ("name", "image"),
];

/// Case-insensitive attribute lookup on a parsed tag.
fn attr_value(tag: &tl::HTMLTag, name: &str) -> Option<String> {
    for (key, value) in tag.attributes().iter() {
        let key_str: &str = key.as_ref();
        if key_str.eq_ignore_ascii_case(name) {
            return Some(value.map(|v| v.to_string()).unwrap_or_default());
        }
    }
    None
}

/// Is this one of the meta tags we own?
fn is_managed_meta(tag: &tl::HTMLTag) -> bool {
    if !tag.name().as_utf8_str().eq_ignore_ascii_case("meta") {
        return false;
    }
    MANAGED
        .iter()
        .any(|(attr, value)| attr_value(tag, attr).as_deref() == Some(value))
}

/// Minimal attribute-value escaping for the generated tags.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// The fresh three-tag block for an image URL.
fn tag_block(image_url: &str) -> String {
    let url = escape_attr(image_url);
    format!(
        r#"<meta property="og:image" content="{url}" data-rh="true"><meta name="twitter:image" content="{url}" data-rh="true"><meta name="image" content="{url}" data-rh="true">"#
    )
}

/// Rewrite the managed metadata tags of an HTML document.
///
/// Removes every existing managed tag regardless of content or position,
/// then inserts one fresh instance of each immediately before `</head>`.
/// Reapplying with the same URL yields byte-identical output.
pub fn rewrite_meta_tags(html: &str, image_url: &str) -> Result<String, RewriteError> {
    let dom = tl::parse(html, tl::ParserOptions::default())
        .map_err(|e| RewriteError::Parse(e.to_string()))?;
    let parser = dom.parser();

    // Source spans of managed tags, converted to half-open ranges
    // (tl boundaries are inclusive on both ends).
    let mut removals: Vec<(usize, usize)> = dom
        .nodes()
        .iter()
        .filter_map(|node| node.as_tag())
        .filter(|tag| is_managed_meta(tag))
        .map(|tag| {
            let (start, end) = tag.boundaries(parser);
            (start, end + 1)
        })
        .collect();
    removals.sort_unstable();

    // Insertion point: just before the head's closing tag.
    let head = dom
        .query_selector("head")
        .and_then(|mut hits| hits.next())
        .and_then(|handle| handle.get(parser))
        .and_then(|node| node.as_tag())
        .ok_or(RewriteError::MissingHead)?;
    let (head_start, head_end) = head.boundaries(parser);
    let insert_at = html[head_start..=head_end]
        .rfind("</head")
        .map(|offset| head_start + offset)
        .ok_or(RewriteError::UnclosedHead)?;

    let block = tag_block(image_url);
    let mut out = String::with_capacity(html.len() + block.len());
    let mut pos = 0;
    let mut inserted = false;
    for (start, end) in removals {
        if !inserted && insert_at <= start {
            out.push_str(&html[pos..insert_at]);
            out.push_str(&block);
            pos = insert_at;
            inserted = true;
        }
        out.push_str(&html[pos..start]);
        pos = end;
    }
    if !inserted {
        out.push_str(&html[pos..insert_at]);
        out.push_str(&block);
        pos = insert_at;
    }
    out.push_str(&html[pos..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://img.example/abc.png";

    /// Count occurrences of a needle in a haystack.
    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    fn assert_three_managed_tags(html: &str, url: &str) {
        assert_eq!(
            count(html, &format!(r#"<meta property="og:image" content="{url}" data-rh="true">"#)),
            1
        );
        assert_eq!(
            count(html, &format!(r#"<meta name="twitter:image" content="{url}" data-rh="true">"#)),
            1
        );
        assert_eq!(
            count(html, &format!(r#"<meta name="image" content="{url}" data-rh="true">"#)),
            1
        );
    }

    #[test]
    fn appends_tags_into_empty_head() {
        let out = rewrite_meta_tags("<head></head><body></body>", URL).unwrap();
        assert_three_managed_tags(&out, URL);
        assert!(out.ends_with("</head><body></body>"));
        assert!(out.starts_with("<head><meta property=\"og:image\""));
    }

    #[test]
    fn is_idempotent_byte_for_byte() {
        let doc = "<!DOCTYPE html><html><head><title>t</title>\n</head><body><p>hi</p></body></html>";
        let once = rewrite_meta_tags(doc, URL).unwrap();
        let twice = rewrite_meta_tags(&once, URL).unwrap();
        assert_eq!(once, twice);
        assert_three_managed_tags(&twice, URL);
    }

    #[test]
    fn replaces_stale_tags_wherever_they_sit() {
        let doc = concat!(
            "<html><head>",
            r#"<meta property="og:image" content="https://old.example/1.png">"#,
            "<title>t</title>",
            r#"<meta name="twitter:image" content="https://old.example/2.png" data-rh="true">"#,
            "</head><body>",
            r#"<meta name="image" content="https://old.example/3.png">"#,
            "</body></html>"
        );
        let out = rewrite_meta_tags(doc, URL).unwrap();
        assert_three_managed_tags(&out, URL);
        assert_eq!(count(&out, "old.example"), 0);
        // non-managed head content untouched
        assert!(out.contains("<title>t</title>"));
        assert!(out.contains("<body></body>"));
    }

    #[test]
    fn preserves_unmanaged_meta_tags() {
        let doc = concat!(
            "<head>",
            r#"<meta charset="utf-8">"#,
            r#"<meta property="og:title" content="My Page">"#,
            "</head><body></body>"
        );
        let out = rewrite_meta_tags(doc, URL).unwrap();
        assert!(out.contains(r#"<meta charset="utf-8">"#));
        assert!(out.contains(r#"<meta property="og:title" content="My Page">"#));
        assert_three_managed_tags(&out, URL);
    }

    #[test]
    fn preserves_surrounding_bytes_exactly() {
        let doc = "<html lang=\"en\">\n  <head>\n    <title>x</title>\n  </head>\n  <body class=\"a  b\">\n    <p>text</p>\n  </body>\n</html>\n";
        let out = rewrite_meta_tags(doc, URL).unwrap();
        // Removing the inserted block restores the input verbatim.
        let stripped = out.replacen(
            &format!(
                r#"<meta property="og:image" content="{URL}" data-rh="true"><meta name="twitter:image" content="{URL}" data-rh="true"><meta name="image" content="{URL}" data-rh="true">"#
            ),
            "",
            1,
        );
        assert_eq!(stripped, doc);
    }

    #[test]
    fn handles_self_closing_stale_tags() {
        let doc = concat!(
            "<head>",
            r#"<meta property="og:image" content="https://old.example/1.png" />"#,
            "</head><body></body>"
        );
        let out = rewrite_meta_tags(doc, URL).unwrap();
        assert_eq!(count(&out, "old.example"), 0);
        assert_three_managed_tags(&out, URL);
    }

    #[test]
    fn escapes_the_image_url() {
        let out = rewrite_meta_tags("<head></head>", "https://img.example/og?a=1&b=\"2\"").unwrap();
        assert!(out.contains(r#"content="https://img.example/og?a=1&amp;b=&quot;2&quot;""#));
    }

    #[test]
    fn missing_head_is_an_error() {
        let err = rewrite_meta_tags("<body><p>no head</p></body>", URL).unwrap_err();
        assert!(matches!(err, RewriteError::MissingHead));
    }

    #[test]
    fn uppercase_meta_is_still_managed() {
        let doc = concat!(
            "<head>",
            r#"<META property="og:image" content="https://old.example/1.png">"#,
            "</head>"
        );
        let out = rewrite_meta_tags(doc, URL).unwrap();
        assert_eq!(count(&out, "old.example"), 0);
        assert_three_managed_tags(&out, URL);
    }

    #[test]
    fn rewrite_with_new_url_converges_again() {
        let doc = "<head><title>t</title></head><body></body>";
        let first = rewrite_meta_tags(doc, "https://img.example/one.png").unwrap();
        let second = rewrite_meta_tags(&first, URL).unwrap();
        assert_eq!(count(&second, "one.png"), 0);
        assert_three_managed_tags(&second, URL);
        // and the second URL is stable under reapplication
        assert_eq!(second, rewrite_meta_tags(&second, URL).unwrap());
    }
}
