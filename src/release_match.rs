//! Resolving a loosely specified version against a catalog's releases.

use crate::versioning::{is_prerelease_tag, sort_versions, toggle_v_prefix};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// One published version of a tool, as listed by a release catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseRecord {
    /// Human label; may differ from the tag.
    pub display_name: String,
    /// Canonical identifier; may carry a `v` prefix or extraneous text.
    pub tag: String,
    pub is_prerelease: bool,
}

impl ReleaseRecord {
    pub fn new(display_name: impl Into<String>, tag: impl Into<String>, is_prerelease: bool) -> Self {
        Self {
            display_name: display_name.into(),
            tag: tag.into(),
            is_prerelease,
        }
    }

    fn excluded_from_partial_match(&self) -> bool {
        self.is_prerelease || is_prerelease_tag(&self.tag)
    }
}

// Leading letters and separators before the first (optionally v-prefixed) digit run,
// e.g. the `jq-` of `jq-1.6` or the `toolname_` of `toolname_v2.0`.
static TAG_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_-]+?(v?[0-9].*)$").expect("tag prefix pattern is valid"));

/// Whether `request` is the empty/`latest` sentinel for the newest release.
pub fn is_latest(request: &str) -> bool {
    let request = request.trim();
    request.is_empty() || request.eq_ignore_ascii_case("latest")
}

/// Resolves `request` to the tag of exactly one release, trying in order:
/// the `latest` sentinel, the tag, the tag with its `v` prefix toggled, the release
/// display name, the display name with the `v` prefix toggled, and finally a
/// partial-version prefix match against non-prerelease tags.
pub fn match_version(request: &str, releases: &[ReleaseRecord]) -> Option<String> {
    let request = request.trim();
    debug!("matching version {request:?} against {} releases", releases.len());
    if is_latest(request) {
        return match_partial_version("", releases);
    }
    let toggled = toggle_v_prefix(request);
    tag_exists(request, releases)
        .or_else(|| tag_exists(&toggled, releases))
        .or_else(|| tag_for_display_name(request, releases))
        .or_else(|| tag_for_display_name(&toggled, releases))
        .or_else(|| match_partial_version(request, releases))
}

fn tag_exists(want: &str, releases: &[ReleaseRecord]) -> Option<String> {
    let found = releases.iter().find(|r| !r.tag.is_empty() && r.tag.eq_ignore_ascii_case(want));
    match found {
        Some(r) => {
            debug!("found tag {:?} for release {:?}", r.tag, r.display_name);
            Some(r.tag.clone())
        }
        None => {
            debug!("tag {want:?} not found");
            None
        }
    }
}

fn tag_for_display_name(want: &str, releases: &[ReleaseRecord]) -> Option<String> {
    let found = releases
        .iter()
        .find(|r| !r.display_name.is_empty() && !r.tag.is_empty() && r.display_name.eq_ignore_ascii_case(want));
    match found {
        Some(r) => {
            debug!("found release name {:?} which has tag {:?}", r.display_name, r.tag);
            Some(r.tag.clone())
        }
        None => {
            debug!("release name {want:?} not found");
            None
        }
    }
}

/// Matches the newest non-prerelease tag starting with `partial` (or `v` + `partial`).
///
/// Tags are ordered with [`sort_versions`] and scanned newest first. When nothing
/// matches, the scan is repeated with any leading non-version text stripped from each
/// tag, so `1.6` finds `jq-1.6`. An empty `partial` selects the newest tag.
pub fn match_partial_version(partial: &str, releases: &[ReleaseRecord]) -> Option<String> {
    debug!("matching tag from partial version {partial:?}");
    let mut tags: Vec<&str> = Vec::with_capacity(releases.len());
    for r in releases {
        if r.excluded_from_partial_match() {
            debug!("skipping pre-release tag {:?}", r.tag);
            continue;
        }
        if r.tag.is_empty() {
            continue;
        }
        tags.push(&r.tag);
    }
    let sorted = sort_versions(&tags);
    let lc_partial = partial.to_lowercase();

    if let Some(tag) = sorted.iter().rev().find(|t| has_version_prefix(&t.to_lowercase(), &lc_partial)) {
        debug!("matched tag {tag:?} for partial version {partial:?}");
        return Some(tag.clone());
    }
    for tag in sorted.iter().rev() {
        let Some(caps) = TAG_PREFIX_RE.captures(tag) else {
            continue;
        };
        let stripped = caps[1].to_lowercase();
        if has_version_prefix(&stripped, &lc_partial) {
            debug!("matched tag {tag:?} (as {stripped:?}) for partial version {partial:?}");
            return Some(tag.clone());
        }
    }
    debug!("no partial match for {partial:?}");
    None
}

/// `candidate` starts with `partial` or `v` + `partial`. Both are lower case.
fn has_version_prefix(candidate: &str, partial: &str) -> bool {
    candidate.starts_with(partial) || candidate.starts_with(&format!("v{partial}"))
}

/// A hint for a failed match when the catalog's tags do not look like versions.
pub fn unversioned_tags_hint(releases: &[ReleaseRecord]) -> Option<String> {
    let tags: Vec<&str> = releases.iter().map(|r| r.tag.as_str()).filter(|t| !t.is_empty()).collect();
    if tags.is_empty() {
        return Some("there are no tagged releases".to_string());
    }
    if tags.iter().all(|t| !t.chars().any(|c| c.is_ascii_digit())) {
        return Some(format!("none of the {} release tags look like version numbers", tags.len()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<ReleaseRecord> {
        vec![
            ReleaseRecord::new("0.8", "0.8", false),
            ReleaseRecord::new("0.9", "0.9", false),
            ReleaseRecord::new("1.0.0", "1.0.0", false),
            ReleaseRecord::new("1.0.2", "1.0.2", false),
            ReleaseRecord::new("release with no version", "", false),
            ReleaseRecord::new("1.0.3-rc1", "1.0.3-rc1", true),
            ReleaseRecord::new("2.0.1", "2.0.1", false),
            ReleaseRecord::new("3.0.0", "3.0.0", false),
            ReleaseRecord::new("3.0.1", "3.0.1", false),
            ReleaseRecord::new("3.0.2", "3.0.2", false),
            ReleaseRecord::new("3.0.3", "3.0.3", false),
            ReleaseRecord::new("jq 1.6", "jq-1.6", false),
        ]
    }

    #[test]
    fn partial_versions_match_newest_release() {
        let releases = fixture();
        let cases = [("3.0", "3.0.3"), ("1", "1.0.2"), ("2.0", "2.0.1"), ("1.6", "jq-1.6")];
        for (request, want) in cases {
            assert_eq!(match_version(request, &releases).as_deref(), Some(want), "request {request:?}");
        }
    }

    #[test]
    fn partial_match_skips_prerelease_without_flag() {
        let releases = vec![
            ReleaseRecord::new("1.0.2", "1.0.2", false),
            ReleaseRecord::new("1.0.3-beta", "1.0.3-beta", false),
        ];
        assert_eq!(match_version("1.0", &releases).as_deref(), Some("1.0.2"));
    }

    #[test]
    fn exact_tag_match_includes_prereleases() {
        let releases = fixture();
        assert_eq!(match_version("1.0.3-RC1", &releases).as_deref(), Some("1.0.3-rc1"));
    }

    #[test]
    fn toggles_v_prefix_both_ways() {
        let releases = vec![ReleaseRecord::new("", "v0.9.0", false), ReleaseRecord::new("", "1.2.0", false)];
        assert_eq!(match_version("0.9.0", &releases).as_deref(), Some("v0.9.0"));
        assert_eq!(match_version("v1.2.0", &releases).as_deref(), Some("1.2.0"));
    }

    #[test]
    fn matches_display_name() {
        let releases = vec![
            ReleaseRecord::new("Release 2024.1", "build-8812", false),
            ReleaseRecord::new("v5", "build-9000", false),
        ];
        assert_eq!(match_version("release 2024.1", &releases).as_deref(), Some("build-8812"));
        assert_eq!(match_version("5", &releases).as_deref(), Some("build-9000"));
    }

    #[test]
    fn latest_is_newest_non_prerelease() {
        let releases = fixture();
        // jq-1.6 makes the set sort as strings, where it is last.
        assert_eq!(match_version("", &releases).as_deref(), Some("jq-1.6"));
        let numeric: Vec<ReleaseRecord> = releases.into_iter().filter(|r| r.tag != "jq-1.6").collect();
        assert_eq!(match_version("LATEST", &numeric).as_deref(), Some("3.0.3"));
        let with_newer_rc = vec![
            ReleaseRecord::new("", "9.0.0", false),
            ReleaseRecord::new("", "10.0.0-rc1", false),
        ];
        assert_eq!(match_version("latest", &with_newer_rc).as_deref(), Some("9.0.0"));
    }

    #[test]
    fn partial_match_is_a_plain_prefix() {
        let releases = vec![ReleaseRecord::new("", "10.0.0", false), ReleaseRecord::new("", "1.4.0", false)];
        assert_eq!(match_version("1", &releases).as_deref(), Some("10.0.0"));
        assert_eq!(match_version("1.4", &releases).as_deref(), Some("1.4.0"));
    }

    #[test]
    fn strips_prefix_with_v() {
        let releases = vec![ReleaseRecord::new("", "toolname_v2.1.0", false)];
        assert_eq!(match_version("2.1", &releases).as_deref(), Some("toolname_v2.1.0"));
    }

    #[test]
    fn no_match_is_none() {
        let releases = fixture();
        assert_eq!(match_version("4", &releases), None);
        assert_eq!(match_version("1.0.3", &releases), None);
        assert_eq!(match_version("latest", &[]), None);
    }

    #[test]
    fn tolerates_duplicates_and_is_repeatable() {
        let mut releases = fixture();
        releases.extend(fixture());
        let first = match_version("3", &releases);
        assert_eq!(first.as_deref(), Some("3.0.3"));
        assert_eq!(match_version("3", &releases), first);
    }

    #[test]
    fn hints_when_tags_are_not_versions() {
        let hashes = vec![ReleaseRecord::new("", "a1b2c3", false), ReleaseRecord::new("", "deadbeef", false)];
        assert_eq!(unversioned_tags_hint(&hashes), None);
        let words = vec![ReleaseRecord::new("", "nightly", false), ReleaseRecord::new("", "stable", false)];
        assert!(unversioned_tags_hint(&words).is_some());
        assert!(unversioned_tags_hint(&fixture()).is_none());
    }
}
