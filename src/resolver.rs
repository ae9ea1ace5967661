use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{BumpError, Result};
use crate::registry::{Manifest, RegistryClient};
use crate::tag::decompose_tag;

/// Picks a replacement tag for one image reference.
///
/// This is the seam between the content rewriter and whatever policy decides
/// new tags; [`Bumper`] is the registry-backed implementation.
#[async_trait]
pub trait TagResolver: Send {
    async fn resolve(
        &mut self,
        host: &str,
        repository: &str,
        current_tag: &str,
    ) -> Result<String>;
}

/// The tag resolution engine: a registry client plus the run-scoped cache of
/// every replacement made so far.
///
/// The cache is the only mutable state and is not synchronized; concurrent
/// use requires one engine per worker or an external lock.
pub struct Bumper {
    registry: RegistryClient,
    // Keys are `host/repository:currentTag`, values the resolved tags.
    replacements: HashMap<String, String>,
}

impl Bumper {
    pub fn new(registry: RegistryClient) -> Self {
        Self {
            registry,
            replacements: HashMap::new(),
        }
    }

    /// Returns the best up-to-date tag for the given image.
    ///
    /// Resolutions are memoized per `host/repository:current_tag`; a cached
    /// result is returned without touching the registry. A current tag of
    /// `latest` is up to date by construction and returned as-is.
    pub async fn find_latest_tag(
        &mut self,
        host: &str,
        repository: &str,
        current_tag: &str,
    ) -> Result<String> {
        let image = format!("{host}/{repository}:{current_tag}");
        if let Some(cached) = self.replacements.get(&image) {
            return Ok(cached.clone());
        }

        let current = decompose_tag(current_tag)
            .ok_or_else(|| BumpError::UnrecognizedTagFormat(current_tag.to_string()))?;
        if current.is_latest() {
            return Ok(current_tag.to_string());
        }

        let manifest = self.registry.fetch_manifest(host, repository).await?;
        let best = pick_best_tag(&current.variant, &manifest)
            .ok_or_else(|| BumpError::NoSuitableTag(image.clone()))?;

        debug!(%image, new_tag = %best, "Resolved replacement tag");
        self.replacements.insert(image, best.clone());
        Ok(best)
    }

    /// Checks whether the repository currently has the given tag.
    pub async fn tag_exists(&self, host: &str, repository: &str, tag: &str) -> Result<bool> {
        let manifest = self.registry.fetch_manifest(host, repository).await?;
        Ok(manifest
            .values()
            .any(|entry| entry.tags.iter().any(|t| t == tag)))
    }

    /// Records a replacement decided outside the engine, so it shows up in
    /// [`Bumper::replacements`].
    pub fn add_replacement(&mut self, image: String, new_tag: String) {
        self.replacements.insert(image, new_tag);
    }

    /// All replacements made during this run, keyed `host/repository:oldTag`.
    pub fn replacements(&self) -> &HashMap<String, String> {
        &self.replacements
    }
}

#[async_trait]
impl TagResolver for Bumper {
    async fn resolve(
        &mut self,
        host: &str,
        repository: &str,
        current_tag: &str,
    ) -> Result<String> {
        self.find_latest_tag(host, repository, current_tag).await
    }
}

/// Resolves every image to one fixed target tag.
pub struct FixedTagResolver {
    tag: String,
}

impl FixedTagResolver {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

#[async_trait]
impl TagResolver for FixedTagResolver {
    async fn resolve(&mut self, _: &str, _: &str, _: &str) -> Result<String> {
        Ok(self.tag.clone())
    }
}

/// Picks the best replacement tag out of a fetched manifest.
///
/// Per digest, the candidate is the shortest tag whose variant matches the
/// current tag's variant exactly. A digest also carrying a same-variant
/// `latest` alias wins outright, regardless of creation time; otherwise the
/// most recently created digest wins. Digests are visited in sorted order so
/// ties resolve deterministically.
fn pick_best_tag(variant: &str, manifest: &Manifest) -> Option<String> {
    let mut digests: Vec<&String> = manifest.keys().collect();
    digests.sort();

    let mut best: Option<(i64, &str)> = None;
    for digest in digests {
        let entry = &manifest[digest];
        let mut candidate: Option<&str> = None;
        let mut is_latest = false;

        for tag in &entry.tags {
            let Some(parts) = decompose_tag(tag) else {
                continue;
            };
            if parts.variant != variant {
                continue;
            }
            if parts.is_latest() {
                is_latest = true;
                continue;
            }
            if candidate.map_or(true, |c| tag.len() < c.len()) {
                candidate = Some(tag);
            }
        }

        let Some(candidate) = candidate else {
            continue;
        };
        if is_latest {
            return Some(candidate.to_string());
        }
        if best.map_or(true, |(created, _)| entry.time_created_ms > created) {
            best = Some((entry.time_created_ms, candidate));
        }
    }

    best.map(|(_, tag)| tag.to_string())
}
