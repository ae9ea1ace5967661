use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use tracing::debug;

use crate::error::{BumpError, Result};

/// One digest's metadata as reported by the registry tag-listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Creation time in epoch milliseconds
    pub time_created_ms: i64,
    /// Tags currently pointing at this digest
    pub tags: Vec<String>,
}

/// The registry's reported map of digest to [`ManifestEntry`].
pub type Manifest = HashMap<String, ManifestEntry>;

// Wire shape: timeCreatedMs arrives string-encoded and is parsed at fetch
// time; a bad value fails the whole fetch.
#[derive(Debug, Deserialize)]
struct RawManifestEntry {
    #[serde(rename = "timeCreatedMs")]
    time_created_ms: String,
    #[serde(rename = "tag", default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TagListResponse {
    #[serde(default)]
    manifest: HashMap<String, RawManifestEntry>,
}

/// A client for fetching tag manifests from a container registry.
pub struct RegistryClient {
    http: ReqwestClient,
    scheme: &'static str,
}

impl RegistryClient {
    /// Create a client on top of the given HTTP client, so callers can
    /// supply one that already carries registry credentials.
    pub fn new(http: ReqwestClient) -> Self {
        Self {
            http,
            scheme: "https",
        }
    }

    /// Plain-HTTP client, for local registries and tests.
    pub fn insecure(http: ReqwestClient) -> Self {
        Self {
            http,
            scheme: "http",
        }
    }

    fn manifest_url(&self, host: &str, repository: &str) -> String {
        format!("{}://{}/v2/{}/tags/list", self.scheme, host, repository)
    }

    /// Fetch the digest -> entry manifest for one repository.
    ///
    /// No retry happens here; retry and backoff policy belongs to the
    /// orchestrating caller.
    pub async fn fetch_manifest(&self, host: &str, repository: &str) -> Result<Manifest> {
        let url = self.manifest_url(host, repository);
        debug!(%url, "Fetching tag list");

        let response = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .map_err(|e| BumpError::RegistryUnavailable(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BumpError::RegistryUnavailable(format!(
                "{url} returned {status}"
            )));
        }

        let body: TagListResponse = response
            .json()
            .await
            .map_err(|e| BumpError::MalformedManifest(format!("{url}: {e}")))?;

        let mut manifest = Manifest::with_capacity(body.manifest.len());
        for (digest, raw) in body.manifest {
            let time_created_ms = raw.time_created_ms.parse::<i64>().map_err(|e| {
                BumpError::MalformedManifest(format!(
                    "bad timeCreatedMs {:?} for digest {digest}: {e}",
                    raw.time_created_ms
                ))
            })?;
            manifest.insert(
                digest,
                ManifestEntry {
                    time_created_ms,
                    tags: raw.tags,
                },
            );
        }

        Ok(manifest)
    }
}
