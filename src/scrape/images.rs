//! Image URL extraction and artifact-slot classification.

use std::collections::HashMap;

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::models::ArtifactSlot;

/// Template/UI imagery carries this as its fourth path segment.
const SITE_CHROME_MARKER: &str = "site";

/// Host-relative CGI references start with this.
const CGI_MARKER: &str = "/cgi";

/// DSS archive hosts start with this label prefix.
const DSS_HOST_MARKER: &str = "arc";

/// File stem marking the subtraction image in a `fits` query parameter.
const SUB_STEM: &str = "sub";

/// List position the subtraction image is expected at; an empty placeholder
/// is inserted here when the page carries no subtraction image, preserving
/// the positional alignment of the suffix table.
pub const SUBTRACTION_SLOT_INDEX: usize = 2;

/// One aggregated image URL assigned to its semantic slot.
///
/// `url` is `None` for the placeholder standing in for a missing subtraction
/// image: the slot is evaluated (flag false) but nothing is downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedImage {
    pub slot: ArtifactSlot,
    pub url: Option<String>,
}

/// Collect image references from one image frame.
///
/// Site-chrome imagery is filtered out by its fourth path segment. CGI
/// references are host-relative and get absolutized against the report page
/// URL; everything else is already well-formed and passes through.
pub fn extract_image_urls(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("img").unwrap();

    let mut urls = Vec::new();
    for element in document.select(&selector) {
        let src = match element.value().attr("src") {
            Some(s) => s,
            None => continue,
        };
        if src.split('/').nth(3) == Some(SITE_CHROME_MARKER) {
            continue;
        }
        if src.starts_with(CGI_MARKER) {
            match page_url.join(src) {
                Ok(absolute) => urls.push(absolute.to_string()),
                Err(_) => continue,
            }
        } else {
            urls.push(src.to_string());
        }
    }
    urls
}

/// Insert an empty placeholder when no subtraction image is present.
///
/// Without a subtraction image the aggregated list shifts left relative to
/// the suffix table; the placeholder restores alignment and is later
/// classified as "no transient image" instead of being downloaded.
pub fn apply_subtraction_correction(urls: &mut Vec<String>) {
    let has_subtraction = urls.iter().any(|url| {
        let params = query_params(url);
        params.contains_key("cat")
            && params
                .get("fits")
                .is_some_and(|fits| fits_stem(fits) == SUB_STEM)
    });

    if !has_subtraction {
        let at = SUBTRACTION_SLOT_INDEX.min(urls.len());
        urls.insert(at, String::new());
    }
}

/// Assign each aggregated URL to its artifact slot.
///
/// A `cat` query parameter whose `fits` file is not the subtraction marks
/// the primary transient image. DSS archive hosts get the DSS slot. The
/// remaining URLs land in the early bucket; no per-slot discriminants exist
/// for sub/sdss/second-lap/max-limit/log, so their flags stay false unless
/// the upstream page layout changes.
pub fn classify(urls: &[String]) -> Vec<ClassifiedImage> {
    let mut classified = Vec::with_capacity(urls.len());

    for url in urls {
        if url.is_empty() {
            classified.push(ClassifiedImage {
                slot: ArtifactSlot::Transient,
                url: None,
            });
            continue;
        }

        let params = query_params(url);
        let is_primary = params.contains_key("cat")
            && params
                .get("fits")
                .map_or(true, |fits| fits_stem(fits) != SUB_STEM);

        let slot = if is_primary {
            if let Some(prodata_id) = params.get("fits").and_then(|f| f.rsplit('/').nth(1)) {
                // Correlation id separating second-lap from max-limit
                // variants of the primary image.
                debug!("primary image prodata id: {}", prodata_id);
            }
            ArtifactSlot::Transient
        } else if host_label(url).starts_with(DSS_HOST_MARKER) {
            ArtifactSlot::Dss
        } else {
            ArtifactSlot::Early
        };

        classified.push(ClassifiedImage {
            slot,
            url: Some(url.clone()),
        });
    }

    classified
}

/// Query parameters of a URL; empty for anything unparseable.
fn query_params(url: &str) -> HashMap<String, String> {
    Url::parse(url)
        .map(|u| u.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

/// File stem of the final path segment of a `fits` parameter value.
fn fits_stem(fits: &str) -> &str {
    let name = fits.rsplit('/').next().unwrap_or(fits);
    name.split('.').next().unwrap_or(name)
}

/// First dotted label of the URL's host.
fn host_label(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .and_then(|h| h.split('.').next().map(|l| l.to_string()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://tavrida.example.org/tr/").unwrap()
    }

    fn primary_url() -> String {
        "https://tavrida.example.org/cgi-bin/view?cat=tr30215426&fits=/prodata/123/frame.fit"
            .to_string()
    }

    fn sub_url() -> String {
        "https://tavrida.example.org/cgi-bin/view?cat=tr30215426&fits=/prodata/123/sub.fit"
            .to_string()
    }

    #[test]
    fn test_extract_filters_site_chrome() {
        let html = r#"
            <body>
                <img src="/im/data/site/logo.gif">
                <img src="/cgi-bin/view?cat=tr1&fits=/prodata/1/frame.fit">
                <img src="https://archive.example.org/dss/search.gif">
            </body>
        "#;
        let urls = extract_image_urls(html, &page_url());
        assert_eq!(urls.len(), 2);
        assert!(urls.iter().all(|u| !u.contains("/site/")));
    }

    #[test]
    fn test_extract_absolutizes_cgi_references() {
        let html = r#"<img src="/cgi-bin/view?cat=tr1&fits=/prodata/1/frame.fit">"#;
        let urls = extract_image_urls(html, &page_url());
        assert_eq!(
            urls,
            vec!["https://tavrida.example.org/cgi-bin/view?cat=tr1&fits=/prodata/1/frame.fit"]
        );
    }

    #[test]
    fn test_extract_passes_absolute_urls_through() {
        let html = r#"<img src="https://archive.example.org/dss/a/b/search.gif">"#;
        let urls = extract_image_urls(html, &page_url());
        assert_eq!(urls, vec!["https://archive.example.org/dss/a/b/search.gif"]);
    }

    #[test]
    fn test_correction_inserts_placeholder_at_fixed_index() {
        let mut urls = vec![
            primary_url(),
            "https://archive.example.org/dss/search.gif".to_string(),
            "https://tavrida.example.org/im/early.jpeg".to_string(),
        ];
        apply_subtraction_correction(&mut urls);
        assert_eq!(urls.len(), 4);
        assert_eq!(urls[SUBTRACTION_SLOT_INDEX], "");
    }

    #[test]
    fn test_correction_noop_when_subtraction_present() {
        let mut urls = vec![primary_url(), sub_url()];
        apply_subtraction_correction(&mut urls);
        assert_eq!(urls.len(), 2);
        assert!(urls.iter().all(|u| !u.is_empty()));
    }

    #[test]
    fn test_correction_on_short_list_appends() {
        let mut urls = vec![primary_url()];
        apply_subtraction_correction(&mut urls);
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[1], "");
    }

    #[test]
    fn test_classify_primary_dss_and_fallback() {
        let urls = vec![
            primary_url(),
            "https://arc.example.org/cgi-bin/dss_search?v=poss2".to_string(),
            "https://tavrida.example.org/im/whatever.jpeg".to_string(),
        ];
        let classified = classify(&urls);
        assert_eq!(classified[0].slot, ArtifactSlot::Transient);
        assert_eq!(classified[1].slot, ArtifactSlot::Dss);
        assert_eq!(classified[2].slot, ArtifactSlot::Early);
        assert!(classified.iter().all(|c| c.url.is_some()));
    }

    #[test]
    fn test_classify_placeholder_is_transient_without_url() {
        let classified = classify(&[String::new()]);
        assert_eq!(classified.len(), 1);
        assert_eq!(classified[0].slot, ArtifactSlot::Transient);
        assert!(classified[0].url.is_none());
    }

    #[test]
    fn test_classify_subtraction_lands_in_fallback_bucket() {
        // The sub image has a cat parameter but a sub fits stem, so it is
        // not the primary; it has no DSS host either, so it falls through.
        let classified = classify(&[sub_url()]);
        assert_eq!(classified[0].slot, ArtifactSlot::Early);
    }
}
