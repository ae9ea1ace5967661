use std::sync::LazyLock;

use regex::Regex;

use crate::error::{BumpError, Result};

// Recognized tag shapes:
// - an optional 'v' and an 8-digit date, a dash, an optional
//   `v<semver-ish>-g` block, then a 6-10 char hex hash
//   (e.g. `v20220714-abcdef12`, `20220714-v1.2.3-gabcdef1`)
// - or the literal `latest`
// Either may carry a trailing `-<variant>` suffix, captured separately.
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(v?\d{8}-(?:v\d(?:[.-]\d+)*-g)?[0-9a-f]{6,10}|latest)(-.+)?$").unwrap()
});

/// Semantic parts of a registry tag.
///
/// The literal tag `latest` is a sentinel: it decomposes to empty date and
/// commit, with only the variant (if any) captured.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecomposedTag {
    /// 8-digit date prefix, without the leading `v`
    pub date: String,
    /// Trailing commit block of the version part
    pub commit: String,
    /// Suffix distinguishing tag flavors, including its leading `-`
    pub variant: String,
}

impl DecomposedTag {
    /// True for the `latest` sentinel (possibly variant-suffixed).
    pub fn is_latest(&self) -> bool {
        self.date.is_empty() && self.commit.is_empty()
    }
}

/// Parts of a `git describe`-style commit descriptor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommitDescriptor {
    /// Nearest ancestor tag, or empty for a bare hash
    pub tag: String,
    /// Commits since the tag
    pub commits_ahead: u32,
    /// Commit hash with any leading `g` stripped, or empty
    pub commit: String,
}

/// Splits a tag into its date, commit, and variant components.
///
/// Returns `None` when the tag matches no recognized shape; callers treat
/// that as "not resolvable", not as a fault.
pub fn decompose_tag(tag: &str) -> Option<DecomposedTag> {
    let caps = TAG_PATTERN.captures(tag)?;
    let version = &caps[1];
    let variant = caps
        .get(2)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    if version == "latest" {
        return Some(DecomposedTag {
            variant,
            ..Default::default()
        });
    }

    let parts: Vec<&str> = version.split('-').collect();
    let date = parts[0].strip_prefix('v').unwrap_or(parts[0]).to_string();
    let commit = parts[parts.len() - 1].to_string();

    Some(DecomposedTag {
        date,
        commit,
        variant,
    })
}

/// Separates a `git describe` string into its parts.
///
/// Examples:
///
/// ```text
/// v0.0.30-14-gdeadbeef => (v0.0.30, 14, deadbeef)
/// v0.0.30              => (v0.0.30, 0, "")
/// deadbeef             => ("", 0, deadbeef)
/// ```
///
/// Unrecognized shapes yield the zero value rather than an error; only a
/// non-numeric commits-ahead field in the three-part form is malformed.
pub fn decompose_commit(descriptor: &str) -> Result<CommitDescriptor> {
    let parts: Vec<&str> = descriptor.split('-').collect();

    match parts.as_slice() {
        [single] => {
            let full_hash =
                single.len() == 40 && single.chars().all(|c| c.is_ascii_hexdigit());
            if full_hash || !single.starts_with('v') {
                let hash = single.strip_prefix('g').unwrap_or(single);
                Ok(CommitDescriptor {
                    commit: hash.to_string(),
                    ..Default::default()
                })
            } else {
                Ok(CommitDescriptor {
                    tag: (*single).to_string(),
                    ..Default::default()
                })
            }
        }
        [tag, hash] => {
            if let Some(hash) = hash.strip_prefix('g') {
                Ok(CommitDescriptor {
                    tag: (*tag).to_string(),
                    commits_ahead: 0,
                    commit: hash.to_string(),
                })
            } else {
                // Two dash-separated parts with no hash form one longer tag
                Ok(CommitDescriptor {
                    tag: descriptor.to_string(),
                    ..Default::default()
                })
            }
        }
        [tag, count, hash] => {
            let commits_ahead =
                count
                    .parse::<u32>()
                    .map_err(|e| BumpError::MalformedCommitDescriptor {
                        descriptor: descriptor.to_string(),
                        reason: format!("commit count {count:?}: {e}"),
                    })?;
            match hash.strip_prefix('g') {
                Some(hash) => Ok(CommitDescriptor {
                    tag: (*tag).to_string(),
                    commits_ahead,
                    commit: hash.to_string(),
                }),
                None => Ok(CommitDescriptor::default()),
            }
        }
        _ => Ok(CommitDescriptor::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposes_dated_tag() {
        let d = decompose_tag("v20220714-abcdef1234").unwrap();
        assert_eq!(d.date, "20220714");
        assert_eq!(d.commit, "abcdef1234");
        assert_eq!(d.variant, "");
        assert!(!d.is_latest());
    }

    #[test]
    fn decomposes_tag_without_v_prefix() {
        let d = decompose_tag("20220714-abcdef1").unwrap();
        assert_eq!(d.date, "20220714");
        assert_eq!(d.commit, "abcdef1");
    }

    #[test]
    fn decomposes_tag_with_variant() {
        let d = decompose_tag("v20220714-abcdef12-k3s").unwrap();
        assert_eq!(d.date, "20220714");
        assert_eq!(d.commit, "abcdef12");
        assert_eq!(d.variant, "-k3s");
    }

    #[test]
    fn decomposes_tag_with_describe_block() {
        let d = decompose_tag("v20220714-v1.2.3-gabcdef1").unwrap();
        assert_eq!(d.date, "20220714");
        assert_eq!(d.commit, "gabcdef1");
        assert_eq!(d.variant, "");
    }

    #[test]
    fn latest_is_a_sentinel() {
        let d = decompose_tag("latest").unwrap();
        assert_eq!(d, DecomposedTag::default());
        assert!(d.is_latest());
    }

    #[test]
    fn latest_keeps_its_variant() {
        let d = decompose_tag("latest-arm64").unwrap();
        assert!(d.is_latest());
        assert_eq!(d.variant, "-arm64");
    }

    #[test]
    fn unrecognized_tags_decompose_to_none() {
        assert_eq!(decompose_tag("1.2.3"), None);
        assert_eq!(decompose_tag("v0.0.30"), None);
        assert_eq!(decompose_tag("main"), None);
        // Date without a hash is not a recognized shape
        assert_eq!(decompose_tag("v20220714"), None);
    }

    #[test]
    fn pattern_is_anchored() {
        assert_eq!(decompose_tag("not_latest_at_all:"), None);
        assert_eq!(decompose_tag("xv20220714-abcdef12"), None);
    }

    #[test]
    fn decomposes_full_describe_output() {
        let c = decompose_commit("v0.0.30-14-gdeadbeef").unwrap();
        assert_eq!(c.tag, "v0.0.30");
        assert_eq!(c.commits_ahead, 14);
        assert_eq!(c.commit, "deadbeef");
    }

    #[test]
    fn decomposes_bare_tag() {
        let c = decompose_commit("v0.0.30").unwrap();
        assert_eq!(c.tag, "v0.0.30");
        assert_eq!(c.commits_ahead, 0);
        assert_eq!(c.commit, "");
    }

    #[test]
    fn decomposes_bare_hash() {
        let c = decompose_commit("deadbeef").unwrap();
        assert_eq!(c.tag, "");
        assert_eq!(c.commit, "deadbeef");
    }

    #[test]
    fn decomposes_full_length_hash() {
        let hash = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
        let c = decompose_commit(hash).unwrap();
        assert_eq!(c.commit, hash);
    }

    #[test]
    fn strips_g_prefix_from_two_part_hash() {
        let c = decompose_commit("v0.0.30-gdeadbeef").unwrap();
        assert_eq!(c.tag, "v0.0.30");
        assert_eq!(c.commit, "deadbeef");
    }

    #[test]
    fn two_parts_without_hash_form_one_tag() {
        let c = decompose_commit("v0.0.30-rc1").unwrap();
        assert_eq!(c.tag, "v0.0.30-rc1");
        assert_eq!(c.commit, "");
    }

    #[test]
    fn non_numeric_commit_count_is_malformed() {
        let err = decompose_commit("v0.0.30-x-gdeadbeef").unwrap_err();
        assert!(matches!(err, BumpError::MalformedCommitDescriptor { .. }));
    }

    #[test]
    fn unexpected_shapes_yield_zero_value() {
        assert_eq!(
            decompose_commit("v0.0.30-14-deadbeef").unwrap(),
            CommitDescriptor::default()
        );
        assert_eq!(
            decompose_commit("a-2-gbb-extra").unwrap(),
            CommitDescriptor::default()
        );
    }
}
