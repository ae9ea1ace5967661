use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::bytes::Regex;

// Matches image references with the following structure:
// - The registry part is gcr.io or docker.pkg.dev, optionally preceded by a
//   subdomain (e.g. `us.gcr.io`, `europe-docker.pkg.dev`)
// - The repository part begins with a lowercase letter followed by 5-29
//   lowercase letters, digits, or hyphens, then a slash and the image path
// - The tag contains alphanumerics, dots, underscores, or hyphens
// Word boundaries keep the match from eating into surrounding tokens.
static IMAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b((?:[a-z0-9]+\.)?gcr\.io|(?:[a-z0-9-]+)?docker\.pkg\.dev)/([a-z][a-z0-9-]{5,29}/[a-zA-Z0-9][a-zA-Z0-9_./-]+):([a-zA-Z0-9_.-]+)\b",
    )
    .unwrap()
});

/// One container image reference as written in a text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Registry hostname, e.g. `eu.gcr.io`
    pub host: String,
    /// Slash-separated repository path within the host
    pub repository: String,
    /// Tag as currently written
    pub tag: String,
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.host, self.repository, self.tag)
    }
}

/// A located [`ImageReference`] plus the byte ranges needed to rewrite it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMatch {
    pub reference: ImageReference,
    /// Byte range of the whole `host/repository:tag` match
    pub span: Range<usize>,
    /// Byte range of just the tag part
    pub tag_span: Range<usize>,
}

/// Scans `content` for image references, in order of appearance.
///
/// Matches never overlap, and `Display` of each reference reproduces the
/// matched substring byte-for-byte.
pub fn find_references(content: &[u8]) -> impl Iterator<Item = ReferenceMatch> + '_ {
    IMAGE_PATTERN.captures_iter(content).map(|caps| {
        let whole = caps.get(0).expect("capture 0 always present");
        let host = caps.get(1).expect("host group");
        let repository = caps.get(2).expect("repository group");
        let tag = caps.get(3).expect("tag group");

        ReferenceMatch {
            reference: ImageReference {
                host: String::from_utf8_lossy(host.as_bytes()).into_owned(),
                repository: String::from_utf8_lossy(repository.as_bytes()).into_owned(),
                tag: String::from_utf8_lossy(tag.as_bytes()).into_owned(),
            },
            span: whole.range(),
            tag_span: tag.range(),
        }
    })
}
