//! Reference extraction from Markdown source text.
//!
//! Best-effort scan, not a strict Markdown parser: every `![alt](target)`
//! image embed and `[text](target)` plain link is considered a potential
//! asset reference, since Typora emits both forms for local files.

use crate::assets::ExtensionFilter;
use regex::Regex;
use std::collections::BTreeSet;
use std::io;
use std::path::Path;

/// Matches the `[...](...)` tail of both image embeds and plain links;
/// the single capture group is the link target.
const LINK_PATTERN: &str = r"\[[^\]]*\]\(([^)]*)\)";

/// Extract the set of image basenames referenced by `text`.
///
/// Targets are reduced to their final path segment, then kept only if the
/// extension passes the allow-list. Returned names are verbatim substrings
/// of the link target (no case folding); comparison against the directory
/// listing is exact. Malformed link syntax is silently skipped.
pub fn used_images(text: &str, filter: &ExtensionFilter) -> BTreeSet<String> {
    let re = Regex::new(LINK_PATTERN).expect("link pattern is a valid regex");
    let mut used = BTreeSet::new();
    for cap in re.captures_iter(text) {
        let target = cap[1].trim();
        let base = basename(target);
        if !base.is_empty() && filter.matches(base) {
            used.insert(base.to_string());
        }
    }
    used
}

/// Read `doc` and extract its referenced image basenames.
///
/// The bytes are decoded lossily; stray non-UTF-8 sequences do not abort the
/// scan. An I/O failure propagates so the caller can apply its degraded-set
/// policy.
pub fn used_images_in_file(doc: &Path, filter: &ExtensionFilter) -> io::Result<BTreeSet<String>> {
    let bytes = std::fs::read(doc)?;
    Ok(used_images(&String::from_utf8_lossy(&bytes), filter))
}

/// Final path segment of a link target. Both separators are handled because
/// documents written on Windows may contain backslash paths.
fn basename(target: &str) -> &str {
    target.rsplit(['/', '\\']).next().unwrap_or(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<String> {
        used_images(text, &ExtensionFilter::new())
            .into_iter()
            .collect()
    }

    #[test]
    fn finds_image_embeds_and_plain_links() {
        let text = "intro\n![shot](img/a.png)\nsee [the diagram](b.svg) too\n";
        assert_eq!(extract(text), vec!["a.png", "b.svg"]);
    }

    #[test]
    fn strips_path_components() {
        assert_eq!(extract("![x](doc.assets/deep/photo1.png)"), vec!["photo1.png"]);
        assert_eq!(extract(r"![x](doc.assets\win\photo2.png)"), vec!["photo2.png"]);
        assert_eq!(
            extract("[x](https://example.com/img/remote.jpg)"),
            vec!["remote.jpg"]
        );
    }

    #[test]
    fn filters_by_extension_but_keeps_case_verbatim() {
        let text = "![a](Photo.PNG) [b](readme.txt) ![c](page.html)";
        assert_eq!(extract(text), vec!["Photo.PNG"]);
    }

    #[test]
    fn duplicates_collapse_to_one() {
        let text = "![a](x.png) ![again](img/x.png) [link](x.png)";
        assert_eq!(extract(text), vec!["x.png"]);
    }

    #[test]
    fn empty_and_linkless_text_yield_empty_set() {
        assert!(extract("").is_empty());
        assert!(extract("plain prose with no links at all").is_empty());
    }

    #[test]
    fn malformed_syntax_is_ignored() {
        let text = "![broken](a.png [no target]() ![](  ) [half](b.pn";
        assert!(extract(text).is_empty());
    }

    #[test]
    fn extra_extensions_extend_the_allow_list() {
        let filter = ExtensionFilter::with_extra(&["heic".to_string()]);
        let used = used_images("![p](a.heic) ![q](b.png)", &filter);
        let names: Vec<&str> = used.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["a.heic", "b.png"]);
    }

    #[test]
    fn reads_document_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc.md");
        std::fs::write(&doc, "![x](img/photo1.png)").unwrap();
        let used = used_images_in_file(&doc, &ExtensionFilter::new()).unwrap();
        assert_eq!(used.into_iter().collect::<Vec<_>>(), vec!["photo1.png"]);
    }

    #[test]
    fn missing_document_propagates_io_error() {
        let err = used_images_in_file(Path::new("/nonexistent/doc.md"), &ExtensionFilter::new());
        assert!(err.is_err());
    }
}
