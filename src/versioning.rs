//! Ordering of version-like strings.
//!
//! Versions are parsed leniently (`1`, `1.2`, `v1.2.3`, `1.0.3-rc1`, `2.0.0+build`)
//! and compared segment by segment. A set containing anything that does not parse
//! is ordered lexicographically as a whole, so two incompatible orderings are never
//! mixed within one result.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use semver::Prerelease;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[vV]?(?P<segments>[0-9]+(?:\.[0-9]+)*)(?:-(?P<pre>[0-9A-Za-z.-]+)|(?P<bare_pre>[A-Za-z][0-9A-Za-z.-]*))?(?:\+(?P<meta>[0-9A-Za-z.-]+))?$",
    )
    .expect("version pattern is valid")
});

/// A parsed version. Build metadata is accepted but ignored when comparing.
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    segments: Vec<u64>,
    pre: Prerelease,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVersionError(String);

impl fmt::Display for ParseVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed version {:?}", self.0)
    }
}

impl std::error::Error for ParseVersionError {}

impl Version {
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    fn segment(&self, i: usize) -> u64 {
        self.segments.get(i).copied().unwrap_or(0)
    }
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = VERSION_RE
            .captures(s.trim())
            .ok_or_else(|| ParseVersionError(s.to_string()))?;
        let segments = caps["segments"]
            .split('.')
            .map(|seg| seg.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseVersionError(s.to_string()))?;
        let pre = match caps.name("pre").or_else(|| caps.name("bare_pre")) {
            Some(m) => Prerelease::new(m.as_str()).map_err(|_| ParseVersionError(s.to_string()))?,
            None => Prerelease::EMPTY,
        };
        Ok(Version {
            original: s.to_string(),
            segments,
            pre,
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            match self.segment(i).cmp(&other.segment(i)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        // Prerelease::EMPTY sorts after any prerelease, matching semver rules.
        self.pre.cmp(&other.pre)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

/// Returns the versions in ascending order; the newest version is last.
///
/// Empty strings are compared as `0.0.0` but are returned unchanged. If any
/// entry cannot be parsed the whole set is sorted as plain strings instead.
pub fn sort_versions<S: AsRef<str>>(versions: &[S]) -> Vec<String> {
    debug!("sorting {} versions", versions.len());
    let mut parsed = Vec::with_capacity(versions.len());
    for (i, v) in versions.iter().enumerate() {
        let v = v.as_ref();
        let effective = if v.is_empty() {
            debug!("the version at index {i} is an empty string, using 0.0.0 instead");
            "0.0.0"
        } else {
            v
        };
        match effective.parse::<Version>() {
            Ok(parsed_version) => parsed.push((parsed_version, v)),
            Err(e) => {
                debug!("using string-sort, {e} probably starts with extraneous text");
                let mut plain: Vec<String> = versions.iter().map(|s| s.as_ref().to_string()).collect();
                plain.sort();
                return plain;
            }
        }
    }
    // Stable, so equal versions keep their input order.
    parsed.sort_by(|a, b| a.0.cmp(&b.0));
    let sorted: Vec<String> = parsed.into_iter().map(|(_, original)| original.to_string()).collect();
    debug!("sorted versions are: {sorted:?}");
    sorted
}

/// Adds a missing leading `v`, or removes an existing one (either case).
pub fn toggle_v_prefix(s: &str) -> String {
    match s.strip_prefix(['v', 'V']) {
        Some(rest) => rest.to_string(),
        None => format!("v{s}"),
    }
}

/// Whether a tag names a pre-release by convention (`-rc`, `-alpha`, `-beta`).
pub fn is_prerelease_tag(tag: &str) -> bool {
    let lc = tag.to_lowercase();
    ["-rc", "-alpha", "-beta"].iter().any(|marker| lc.contains(marker))
}
