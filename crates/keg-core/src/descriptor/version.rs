//! Derive a release version from an archive URL.
//!
//! Handles the two shapes seen for tag archives:
//! `.../archive/refs/tags/v1.0.0.tar.gz` and `.../name-2.3.1.tar.gz`,
//! including pre-release tails such as `-rc1` or `-beta.2`.

use url::Url;

const ARCHIVE_SUFFIXES: &[&str] = &[
    ".tar.gz", ".tgz", ".tar.xz", ".txz", ".tar.bz2", ".tbz2", ".tar", ".zip",
];

/// Returns the version embedded in the last path segment of `url`, if any.
pub fn version_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let stem = strip_archive_suffix(segment);

    if let Some(v) = stem.strip_prefix('v').or_else(|| stem.strip_prefix('V')) {
        if is_version(v) {
            return Some(v.to_string());
        }
    }
    if is_version(stem) {
        return Some(stem.to_string());
    }
    // Leftmost `-` that starts a version, so `tool-1.0.0-rc1` keeps its tail.
    stem.match_indices('-').find_map(|(i, _)| {
        let tail = &stem[i + 1..];
        let tail = tail.strip_prefix('v').unwrap_or(tail);
        is_version(tail).then(|| tail.to_string())
    })
}

fn strip_archive_suffix(segment: &str) -> &str {
    let lower = segment.to_ascii_lowercase();
    for suffix in ARCHIVE_SUFFIXES {
        if lower.ends_with(suffix) {
            return &segment[..segment.len() - suffix.len()];
        }
    }
    segment
}

/// Starts with a digit and ends with an alphanumeric; ASCII alphanumerics,
/// dots and `-` in between.
fn is_version(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
        && s.chars().last().is_some_and(|c| c.is_ascii_alphanumeric())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}
