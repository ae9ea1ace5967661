use std::path::Path;

use regex::bytes::Regex;
use tracing::{info, warn};

use crate::error::{BumpError, Result};
use crate::reference::find_references;
use crate::resolver::TagResolver;

/// Rewrites every resolvable image reference in `content`.
///
/// References failing `filter` (matched against the raw `host/repository:tag`
/// text) are passed through untouched. A resolver error for one reference
/// leaves that reference byte-identical and never aborts the rest of the
/// buffer; all bytes outside matched tags are copied through unchanged.
pub async fn rewrite_all(
    content: &[u8],
    resolver: &mut dyn TagResolver,
    filter: Option<&Regex>,
) -> Vec<u8> {
    let mut output = Vec::with_capacity(content.len());
    let mut last = 0;

    for m in find_references(content) {
        output.extend_from_slice(&content[last..m.tag_span.start]);
        last = m.span.end;

        let raw = &content[m.span.clone()];
        if filter.is_some_and(|f| !f.is_match(raw)) {
            output.extend_from_slice(&content[m.tag_span.start..m.span.end]);
            continue;
        }

        let r = &m.reference;
        match resolver.resolve(&r.host, &r.repository, &r.tag).await {
            Ok(new_tag) => output.extend_from_slice(new_tag.as_bytes()),
            Err(err) => {
                warn!(image = %r, %err, "Failed to resolve image, leaving it unchanged");
                output.extend_from_slice(&content[m.tag_span.start..m.span.end]);
            }
        }
    }

    output.extend_from_slice(&content[last..]);
    output
}

/// Rewrites a file in place.
///
/// Succeeds even when no reference changed; per-image resolution failures
/// are contained by [`rewrite_all`], so only read/write failures surface.
pub async fn update_file(
    path: impl AsRef<Path>,
    resolver: &mut dyn TagResolver,
    filter: Option<&Regex>,
) -> Result<()> {
    let path = path.as_ref();
    info!(path = %path.display(), "Updating file");

    let content = tokio::fs::read(path).await.map_err(|e| BumpError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let new_content = rewrite_all(&content, resolver, filter).await;

    tokio::fs::write(path, new_content)
        .await
        .map_err(|e| BumpError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}
