//! Selecting the artifact built for a given OS and architecture.
//!
//! Catalogs name the same platform in many ways (`darwin`, `macOS`, `apple-darwin`,
//! `amd64`, `x86_64`, `64bit`), so matching goes through an alias table. GitHub-style
//! catalogs only encode the platform in the file name; HashiCorp-style catalogs supply
//! structured `os`/`arch` fields.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// One downloadable file attached to a release. Only `name` is used for matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetRecord {
    pub name: String,
    /// Opaque download reference, usually a URL.
    pub locator: String,
}

impl AssetRecord {
    pub fn new(name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
        }
    }
}

/// A build with explicit platform fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildRecord {
    pub os: String,
    pub arch: String,
    pub locator: String,
}

impl BuildRecord {
    pub fn new(os: impl Into<String>, arch: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
            locator: locator.into(),
        }
    }
}

/// The selected asset and the literal text that matched the OS and architecture,
/// kept so they can later be removed from the asset name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMatch<'a> {
    pub asset: &'a AssetRecord,
    pub matched_os: String,
    pub matched_arch: String,
}

/// Alternative spellings of an architecture, most specific first. `universal`
/// (macOS fat binaries) must stay last.
pub fn architecture_aliases(arch: &str) -> &'static [&'static str] {
    match arch.to_ascii_lowercase().as_str() {
        "amd64" => &["x86_64", "64bit", "64-bit", "universal"],
        "arm64" => &["aarch64"],
        _ => &[],
    }
}

/// Alternative spellings of an operating system.
pub fn os_aliases(os: &str) -> &'static [&'static str] {
    match os.to_ascii_lowercase().as_str() {
        "darwin" => &["macos", "osx", "apple-darwin"],
        _ => &[],
    }
}

/// Returns the first of `token` and its aliases contained in `haystack`, as it is
/// written in `haystack`. Candidates are tried in order.
fn find_token(haystack: &str, token: &str, aliases: &[&str]) -> Option<String> {
    let lc_haystack = haystack.to_ascii_lowercase();
    std::iter::once(token).chain(aliases.iter().copied()).find_map(|candidate| {
        let lc_candidate = candidate.to_ascii_lowercase();
        lc_haystack.find(&lc_candidate).map(|i| {
            let matched = &haystack[i..i + lc_candidate.len()];
            debug!("matched substring {matched:?} at index {i} in {haystack:?}");
            matched.to_string()
        })
    })
}

fn eq_one_of(value: &str, token: &str, aliases: &[&str]) -> bool {
    std::iter::once(token).chain(aliases.iter().copied()).any(|candidate| value.eq_ignore_ascii_case(candidate))
}

/// Whether a platform with no native build may fall back to `amd64`
/// (Apple Silicon runs x86_64 binaries under Rosetta).
fn rosetta_fallback(os: &str, arch: &str) -> bool {
    os == "darwin" && arch == "arm64"
}

/// Selects the first asset whose name mentions both the OS and the architecture.
///
/// Linux amd64 also accepts the combined `linux64` token. darwin/arm64 falls back to
/// darwin/amd64 when no arm64 asset exists.
pub fn match_asset<'a>(assets: &'a [AssetRecord], os: &str, arch: &str) -> Option<AssetMatch<'a>> {
    let lc_os = os.to_ascii_lowercase();
    let lc_arch = arch.to_ascii_lowercase();
    debug!("matching {} assets for OS {lc_os:?} and architecture {lc_arch:?}", assets.len());
    for asset in assets {
        let matched_os = find_token(&asset.name, &lc_os, os_aliases(&lc_os));
        let matched_arch = find_token(&asset.name, &lc_arch, architecture_aliases(&lc_arch));
        if let (Some(matched_os), Some(matched_arch)) = (matched_os, matched_arch) {
            debug!("matched asset {:?} for OS {os:?} and arch {arch:?}", asset.name);
            return Some(AssetMatch {
                asset,
                matched_os,
                matched_arch,
            });
        }
        if lc_os == "linux" && lc_arch == "amd64" {
            if let Some(combined) = find_token(&asset.name, "linux64", &[]) {
                debug!("matched asset {:?} using the combined token {combined:?}", asset.name);
                return Some(AssetMatch {
                    asset,
                    matched_os: combined.clone(),
                    matched_arch: combined,
                });
            }
        }
    }
    if rosetta_fallback(&lc_os, &lc_arch) {
        debug!("trying to match an asset for darwin/amd64 as none were found for arm64");
        return match_asset(assets, os, "amd64");
    }
    debug!("no asset matched OS {os:?} and architecture {arch:?}");
    None
}

/// Selects the first build whose `os` and `arch` equal the target or one of its
/// aliases, with the same darwin/arm64 fallback as [`match_asset`].
pub fn match_build<'a>(builds: &'a [BuildRecord], os: &str, arch: &str) -> Option<&'a BuildRecord> {
    let lc_os = os.to_ascii_lowercase();
    let lc_arch = arch.to_ascii_lowercase();
    debug!("matching {} builds for OS {lc_os:?} and architecture {lc_arch:?}", builds.len());
    let found = builds.iter().find(|b| {
        eq_one_of(&b.os, &lc_os, os_aliases(&lc_os)) && eq_one_of(&b.arch, &lc_arch, architecture_aliases(&lc_arch))
    });
    if let Some(build) = found {
        debug!("matched build {build:?}");
        return Some(build);
    }
    if rosetta_fallback(&lc_os, &lc_arch) {
        debug!("trying to match a build for darwin/amd64 as none were found for arm64");
        return match_build(builds, os, "amd64");
    }
    debug!("no build matched OS {os:?} and architecture {arch:?}");
    None
}

static VERSION_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-_][vV]?[0-9].*$").expect("version suffix pattern is valid"));

const ARCHIVE_EXTENSIONS: &[&str] = &[".tar.gz", ".tgz", ".tar.bz2", ".tbz2", ".tar", ".zip", ".gz", ".bz2"];

/// Derives a tool name from an asset file name.
///
/// Each of `strip` (typically the matched OS, the matched architecture and the release
/// tag) is removed where it follows a `-` or `_`, along with a known archive
/// extension. A trailing version (`-1.2.3`, `_v1.2.3`, ...) and everything after it
/// is then dropped; without one, the name is cut at its first `-` or `_`.
pub fn derived_base_name(asset_name: &str, strip: &[&str]) -> String {
    let mut name = asset_name.to_string();
    for token in strip.iter().filter(|t| !t.is_empty()) {
        name = name.replace(&format!("-{token}"), "").replace(&format!("_{token}"), "");
    }
    let lc_name = name.to_ascii_lowercase();
    if let Some(ext) = ARCHIVE_EXTENSIONS.iter().find(|ext| lc_name.ends_with(*ext)) {
        name.truncate(name.len() - ext.len());
    }
    let base = match VERSION_SUFFIX_RE.find(&name) {
        Some(m) => name[..m.start()].to_string(),
        None => name.split(['-', '_']).next().unwrap_or_default().to_string(),
    };
    if base.is_empty() {
        debug!("could not derive a base name from {asset_name:?}, using it as-is");
        return asset_name.to_string();
    }
    debug!("derived base name {base:?} from asset {asset_name:?}");
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prme_assets() -> Vec<AssetRecord> {
        let base = "https://api.github.com/repos/ivanfetch/PRMe/releases/assets";
        vec![
            AssetRecord::new("checksums.txt", format!("{base}/47905347")),
            AssetRecord::new("prme_0.0.6_Darwin_x86_64.tar.gz", format!("{base}/47905345")),
            AssetRecord::new("prme_0.0.6_Linux_arm64.tar.gz", format!("{base}/47905348")),
            AssetRecord::new("prme_0.0.6_Linux_x86_64.tar.gz", format!("{base}/47905353")),
            AssetRecord::new("prme_0.0.6_Windows_x86_64.tar.gz", format!("{base}/47905349")),
        ]
    }

    #[test]
    fn matches_asset_by_os_and_arch_alias() {
        let assets = prme_assets();
        let m = match_asset(&assets, "darwin", "amd64").expect("an asset should match");
        assert_eq!(m.asset, &assets[1]);
        assert_eq!(m.matched_os, "Darwin");
        assert_eq!(m.matched_arch, "x86_64");

        let m = match_asset(&assets, "Linux", "ARM64").expect("an asset should match");
        assert_eq!(m.asset.name, "prme_0.0.6_Linux_arm64.tar.gz");
        assert_eq!(m.matched_arch, "arm64");
    }

    #[test]
    fn darwin_arm64_falls_back_to_amd64() {
        let assets = prme_assets();
        let m = match_asset(&assets, "darwin", "arm64").expect("fallback should match");
        assert_eq!(m.asset.name, "prme_0.0.6_Darwin_x86_64.tar.gz");
        assert_eq!(m.matched_arch, "x86_64");
    }

    #[test]
    fn linux_arm64_does_not_fall_back() {
        let assets = vec![AssetRecord::new("tool_linux_amd64.tar.gz", "")];
        assert_eq!(match_asset(&assets, "linux", "arm64"), None);
        assert_eq!(match_asset(&assets, "windows", "amd64"), None);
    }

    #[test]
    fn prefers_native_arm64_over_fallback() {
        let assets = vec![
            AssetRecord::new("tool-macos-x86_64", ""),
            AssetRecord::new("tool-macos-aarch64", ""),
        ];
        let m = match_asset(&assets, "darwin", "arm64").unwrap();
        assert_eq!(m.asset.name, "tool-macos-aarch64");
        assert_eq!(m.matched_os, "macos");
        assert_eq!(m.matched_arch, "aarch64");
    }

    #[test]
    fn universal_is_a_last_resort_within_an_asset() {
        let assets = vec![AssetRecord::new("tool_universal_macOS_x86_64.zip", "")];
        let m = match_asset(&assets, "darwin", "amd64").unwrap();
        assert_eq!(m.matched_os, "macOS");
        assert_eq!(m.matched_arch, "x86_64");

        let assets = vec![AssetRecord::new("tool_macOS_universal.zip", "")];
        let m = match_asset(&assets, "darwin", "amd64").unwrap();
        assert_eq!(m.matched_arch, "universal");
    }

    #[test]
    fn linux64_combined_token() {
        let assets = vec![
            AssetRecord::new("jq-osx-amd64", ""),
            AssetRecord::new("jq-linux64", ""),
            AssetRecord::new("jq-win64.exe", ""),
        ];
        let m = match_asset(&assets, "linux", "amd64").unwrap();
        assert_eq!(m.asset.name, "jq-linux64");
        assert_eq!(m.matched_os, "linux64");
        assert_eq!(m.matched_arch, "linux64");
        assert_eq!(derived_base_name(&m.asset.name, &[&m.matched_os, &m.matched_arch, "jq-1.6"]), "jq");

        let m = match_asset(&assets, "darwin", "amd64").unwrap();
        assert_eq!(m.asset.name, "jq-osx-amd64");
    }

    #[test]
    fn matching_is_repeatable() {
        let assets = prme_assets();
        assert_eq!(match_asset(&assets, "linux", "amd64"), match_asset(&assets, "linux", "amd64"));
    }

    #[test]
    fn matches_structured_builds() {
        let builds = vec![
            BuildRecord::new("linux", "amd64", "https://example.test/linux_amd64.zip"),
            BuildRecord::new("darwin", "amd64", "https://example.test/darwin_amd64.zip"),
            BuildRecord::new("Linux", "ARM64", "https://example.test/linux_arm64.zip"),
        ];
        assert_eq!(match_build(&builds, "linux", "arm64"), Some(&builds[2]));
        assert_eq!(match_build(&builds, "darwin", "arm64"), Some(&builds[1]));
        assert_eq!(match_build(&builds, "windows", "amd64"), None);

        let aliased = vec![BuildRecord::new("macos", "x86_64", "u")];
        assert_eq!(match_build(&aliased, "darwin", "amd64"), Some(&aliased[0]));
    }

    #[test]
    fn structured_builds_require_equality() {
        let builds = vec![BuildRecord::new("linux-musl", "amd64", "u")];
        assert_eq!(match_build(&builds, "linux", "amd64"), None);
    }

    #[test]
    fn derives_base_names() {
        let cases: &[(&str, &[&str], &str)] = &[
            ("app_v1.2.3_darwin_x64.tar.gz", &["darwin", "x64"], "app"),
            ("app-darwin-amd64", &["darwin", "amd64"], "app"),
            ("prme_0.0.6_Darwin_x86_64.tar.gz", &["Darwin", "x86_64", "v0.0.6"], "prme"),
            ("rbac-lookup_0.9.0_Linux_x86_64.tar.gz", &["Linux", "x86_64", "v0.9.0"], "rbac-lookup"),
            ("kubectl-tool_Linux_x86_64.tar.gz", &["Linux", "x86_64"], "kubectl"),
            ("age-v1.1.1-darwin-amd64.tar.gz", &["darwin", "amd64", "v1.1.1"], "age"),
        ];
        for (name, strip, want) in cases {
            assert_eq!(derived_base_name(name, strip), *want, "asset {name:?}");
        }
    }

    #[test]
    fn base_name_never_empty() {
        assert_eq!(derived_base_name("-linux", &["linux"]), "-linux");
    }
}
