//! Named-artifact retrieval with ordered fallback.
//!
//! A fetch walks its sources in priority order and returns the first payload.
//! A failing source is logged and skipped; only exhausting every source is
//! reported to the caller, as "not found".

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::config::ReaderConfig;
use crate::error::IngestError;
use crate::logging::{log_fetch_attempt, log_fetch_failed, log_fetch_ok};

pub const RUN_LOG: &str = "bayes_log.csv";
pub const DESIGN: &str = "design.json";

/// One fetchable payload: an artifact filename within a job's results bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub job: u64,
    pub name: String,
}

impl ArtifactRef {
    pub fn new(job: u64, name: impl Into<String>) -> Self {
        Self {
            job,
            name: name.into(),
        }
    }
}

#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Human-readable location, for logs.
    fn location(&self, artifact: &ArtifactRef) -> String;
    async fn fetch(&self, artifact: &ArtifactRef) -> Result<Vec<u8>>;
}

/// Results bundles unpacked under `<root>/job-<job>-results/`.
pub struct LocalCache {
    root: PathBuf,
}

impl LocalCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, artifact: &ArtifactRef) -> PathBuf {
        self.root
            .join(format!("job-{}-results", artifact.job))
            .join(&artifact.name)
    }
}

#[async_trait]
impl ArtifactSource for LocalCache {
    fn location(&self, artifact: &ArtifactRef) -> String {
        self.path_for(artifact).display().to_string()
    }

    async fn fetch(&self, artifact: &ArtifactRef) -> Result<Vec<u8>> {
        let path = self.path_for(artifact);
        tokio::fs::read(&path)
            .await
            .map_err(|e| anyhow!("{}: {}", path.display(), e))
    }
}

/// `GET <base>/jobs/<job>/results/file?name=<filename>`
pub struct ResultsService {
    client: Client,
    base_url: String,
}

impl ResultsService {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| anyhow!("building http client: {}", e))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, artifact: &ArtifactRef) -> Result<Url> {
        let raw = format!("{}/jobs/{}/results/file", self.base_url, artifact.job);
        Ok(Url::parse_with_params(&raw, &[("name", artifact.name.as_str())])?)
    }
}

#[async_trait]
impl ArtifactSource for ResultsService {
    fn location(&self, artifact: &ArtifactRef) -> String {
        self.url_for(artifact)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{}/jobs/{}/results/file?name={}", self.base_url, artifact.job, artifact.name))
    }

    async fn fetch(&self, artifact: &ArtifactRef) -> Result<Vec<u8>> {
        let url = self.url_for(artifact)?;
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("http status {}", status.as_u16()));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

pub struct ArtifactFetcher {
    sources: Vec<Box<dyn ArtifactSource>>,
}

impl ArtifactFetcher {
    /// Sources are tried in the order given.
    pub fn new(sources: Vec<Box<dyn ArtifactSource>>) -> Self {
        Self { sources }
    }

    /// Local cache first, then the results service unless `local_only`.
    pub fn from_config(cfg: &ReaderConfig) -> Result<Self> {
        let mut sources: Vec<Box<dyn ArtifactSource>> = vec![Box::new(LocalCache::new(&cfg.cache_root))];
        if !cfg.local_only {
            sources.push(Box::new(ResultsService::new(&cfg.base_url, cfg.timeout_secs)?));
        }
        Ok(Self::new(sources))
    }

    /// First successful payload, or `None` once every source has failed.
    pub async fn fetch(&self, artifact: &ArtifactRef) -> Option<Vec<u8>> {
        for source in &self.sources {
            let location = source.location(artifact);
            log_fetch_attempt(&location);
            match source.fetch(artifact).await {
                Ok(bytes) => {
                    log_fetch_ok(&location, bytes.len(), &sha256_hex(&bytes));
                    return Some(bytes);
                }
                Err(e) => log_fetch_failed(&location, &e.to_string()),
            }
        }
        None
    }

    /// Like [`fetch`](Self::fetch), classifying exhaustion as a transport failure.
    pub async fn fetch_required(&self, artifact: &ArtifactRef) -> Result<Vec<u8>, IngestError> {
        self.fetch(artifact).await.ok_or_else(|| IngestError::Transport {
            job: artifact.job,
            artifact: artifact.name.clone(),
        })
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
