//! Image reference normalization.
//!
//! Stored image references come in several shapes: CDN URLs, embedded data
//! URIs, bare relative paths from the old local storage scheme, and shareable
//! Google Drive links pasted into the admin panel before the CDN existed. The
//! drive links point at an HTML viewer page, so they are rewritten to the
//! direct-content form before being embedded.

use std::sync::LazyLock;

use regex::Regex;

/// Host that serves legacy share links.
const LEGACY_SHARE_HOST: &str = "drive.google.com";

/// Host fragment of CDN delivery URLs.
const CDN_HOST: &str = "cloudinary.com";

static LEGACY_SHARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.)?drive\.google\.com(?:[/?#]|$)").expect("Invalid regex")
});

static LEGACY_FILE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([^/?#&]+)|[?&]id=([^&#]+)").expect("Invalid regex"));

static CDN_VERSION_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+$").expect("Invalid regex"));

/// Classification of a stored image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef<'a> {
    /// No image.
    Empty,
    /// Absolute URL that can be loaded as is.
    Url(&'a str),
    /// Legacy share link with the embedded file id.
    LegacyShare { file_id: &'a str },
    /// Self-contained `data:` URI.
    DataUri(&'a str),
    /// Bare relative path from the old local storage scheme.
    Relative(&'a str),
}

/// Classify a stored reference without allocating.
#[must_use]
pub fn classify(reference: &str) -> ImageRef<'_> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return ImageRef::Empty;
    }

    if has_scheme(trimmed, "data:") {
        return ImageRef::DataUri(trimmed);
    }

    if has_scheme(trimmed, "http://") || has_scheme(trimmed, "https://") || has_scheme(trimmed, "blob:") {
        if LEGACY_SHARE_URL.is_match(trimmed)
            && let Some(file_id) = legacy_file_id(trimmed)
        {
            return ImageRef::LegacyShare { file_id };
        }
        return ImageRef::Url(trimmed);
    }

    ImageRef::Relative(trimmed)
}

/// Resolve a stored reference into a directly loadable URL.
///
/// Empty input yields an empty string; callers render their "no image" state.
/// The function is idempotent: resolving an already resolved reference returns
/// it unchanged.
///
/// ```
/// use esther_core::image_ref::resolve;
///
/// let share = "https://drive.google.com/file/d/1AbC/view?usp=sharing";
/// let direct = resolve(share);
/// assert_eq!(direct, "https://drive.google.com/uc?export=view&id=1AbC");
/// assert_eq!(resolve(&direct), direct);
/// ```
#[must_use]
pub fn resolve(reference: &str) -> String {
    match classify(reference) {
        ImageRef::Empty => String::new(),
        ImageRef::LegacyShare { file_id } => {
            format!("https://{LEGACY_SHARE_HOST}/uc?export=view&id={file_id}")
        }
        ImageRef::Url(url) | ImageRef::DataUri(url) | ImageRef::Relative(url) => url.to_owned(),
    }
}

/// Extract the image store's public reference id from a CDN delivery URL.
///
/// `https://res.cloudinary.com/<cloud>/image/upload/v1755569051/esther/products/abc123.png`
/// yields `esther/products/abc123`. Returns `None` for URLs that are not CDN
/// delivery URLs.
#[must_use]
pub fn cdn_public_id(url: &str) -> Option<String> {
    if !url.contains(CDN_HOST) {
        return None;
    }

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segments: Vec<&str> = path.split('/').collect();
    let upload = segments.iter().position(|s| *s == "upload")?;

    let mut rest = segments.get(upload + 1..)?;
    if let Some((first, tail)) = rest.split_first()
        && CDN_VERSION_SEGMENT.is_match(first)
    {
        rest = tail;
    }

    let joined = rest.join("/");
    let public_id = match joined.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => stem,
        _ => joined.as_str(),
    };

    if public_id.is_empty() {
        None
    } else {
        Some(public_id.to_owned())
    }
}

fn has_scheme(reference: &str, scheme: &str) -> bool {
    reference
        .get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}

fn legacy_file_id(url: &str) -> Option<&str> {
    let captures = LEGACY_FILE_ID.captures(url)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str())
        .filter(|id| !id.is_empty())
}
