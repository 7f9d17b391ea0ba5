//! URL and path helpers for output enrichment.

/// Join URL segments with single slashes, skipping empty segments.
pub fn combine<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Replace the extension of the final path segment.
///
/// `extension` includes the dot (".pdf"); a path without an extension gets
/// one appended.
pub fn change_extension(path: &str, extension: &str) -> String {
    let stem_end = match path.rfind('.') {
        Some(dot) if dot > path.rfind('/').map_or(0, |slash| slash + 1) => dot,
        _ => path.len(),
    };
    format!("{}{}", &path[..stem_end], extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_skips_empty_segments() {
        assert_eq!(combine(["docs", "", "guide"]), "docs/guide");
        assert_eq!(combine(["", ""]), "");
        assert_eq!(combine(["/docs/", "toc.json"]), "docs/toc.json");
    }

    #[test]
    fn change_extension_replaces_only_the_last_segment() {
        assert_eq!(change_extension("guide/toc.json", ".pdf"), "guide/toc.pdf");
        assert_eq!(change_extension("guide/toc", ".pdf"), "guide/toc.pdf");
        assert_eq!(
            change_extension("v1.0/toc.json", ".pdf"),
            "v1.0/toc.pdf"
        );
        assert_eq!(change_extension("v1.0/toc", ".pdf"), "v1.0/toc.pdf");
    }
}
