//! Frame-set resolution for the top-level report page.

use scraper::{Html, Selector};

/// Navigation frames (button/menu chrome) carry sources starting with this.
const NAV_MARKER: &str = "but";

/// The metadata frame's source starts with this.
const METADATA_MARKER: &str = "trm";

/// The report page partitioned into its metadata and image sub-documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSet {
    /// Source reference of the metadata frame, when the page has one.
    pub metadata: Option<String>,
    /// Source references of the image frames, in document order.
    pub images: Vec<String>,
}

/// Partition the `frame` elements of a report page.
///
/// Navigation frames are dropped entirely. Among the rest, the frame whose
/// source starts with the metadata marker is separated out; every other
/// survivor is an image frame. The target site produces exactly one metadata
/// frame; its absence is the caller's error to raise.
pub fn resolve_frames(html: &str) -> FrameSet {
    let document = Html::parse_document(html);
    let selector = Selector::parse("frame").unwrap();

    let mut metadata = None;
    let mut images = Vec::new();

    for element in document.select(&selector) {
        let src = match element.value().attr("src") {
            Some(s) => s,
            None => continue,
        };
        if src.starts_with(NAV_MARKER) {
            continue;
        }
        if src.starts_with(METADATA_MARKER) {
            if metadata.is_none() {
                metadata = Some(src.to_string());
            }
        } else {
            images.push(src.to_string());
        }
    }

    FrameSet { metadata, images }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT_PAGE: &str = r#"
        <html><frameset rows="10%,*">
            <frame src="buttons.php?id=30215426">
            <frame src="trm.php?id=30215426">
            <frame src="prev.php?xc=779&yc=3255">
            <frame src="traadd.php?id=30215426">
        </frameset></html>
    "#;

    #[test]
    fn test_partitions_metadata_from_image_frames() {
        let frames = resolve_frames(REPORT_PAGE);
        assert_eq!(frames.metadata.as_deref(), Some("trm.php?id=30215426"));
        assert_eq!(
            frames.images,
            vec!["prev.php?xc=779&yc=3255", "traadd.php?id=30215426"]
        );
    }

    #[test]
    fn test_navigation_frames_appear_nowhere() {
        let frames = resolve_frames(REPORT_PAGE);
        assert!(frames.metadata.as_deref().map_or(true, |s| !s.starts_with("but")));
        assert!(frames.images.iter().all(|s| !s.starts_with("but")));
    }

    #[test]
    fn test_missing_metadata_frame() {
        let frames = resolve_frames(r#"<frameset><frame src="prev.php"></frameset>"#);
        assert!(frames.metadata.is_none());
        assert_eq!(frames.images, vec!["prev.php"]);
    }

    #[test]
    fn test_no_frames_at_all() {
        let frames = resolve_frames("<html><body>plain page</body></html>");
        assert!(frames.metadata.is_none());
        assert!(frames.images.is_empty());
    }
}
