//! HTTP clients for the network-facing backends.
//!
//! [`HttpObjectStore`] speaks path-style object-storage URLs
//! (`{endpoint}/{bucket}/{key}`), presigned with SigV4 when credentials are
//! configured; [`HttpIndexClient`] queries the community index API.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::Duration;

use rusty_s3::{Bucket, Credentials, S3Action, UrlStyle};
use tracing::debug;
use url::Url;

use crate::community::IndexClient;
use crate::error::{io_err, transport_err, FetchError};
use crate::object_store::ObjectStoreClient;

const TIMEOUT: Duration = Duration::from_secs(300);

/// Lifetime of a presigned request URL.
const SIGNATURE_TTL: Duration = Duration::from_secs(3600);

/// Parts smaller than this are not worth a separate request.
const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

pub const DEFAULT_REGION: &str = "us-east-1";

fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(TIMEOUT).build()
}

/// Default endpoint for a region, or the global endpoint without one.
pub fn default_endpoint(region: Option<&str>) -> String {
    match region {
        Some(r) if !r.is_empty() => format!("https://s3.{r}.amazonaws.com"),
        _ => "https://s3.amazonaws.com".to_owned(),
    }
}

// ---------------------------------------------------------------------------
// HttpObjectStore
// ---------------------------------------------------------------------------

/// [`ObjectStoreClient`] over HTTP.
pub struct HttpObjectStore {
    endpoint: Url,
    region: String,
    credentials: Option<Credentials>,
    agent: ureq::Agent,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, region: &str) -> Result<Self, FetchError> {
        let mut endpoint = Url::parse(endpoint).map_err(|e| transport_err(endpoint, e))?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        Ok(Self {
            endpoint,
            region: region.to_owned(),
            credentials: None,
            agent: agent(),
        })
    }

    /// Sign every request with this key pair.
    pub fn with_credentials(mut self, access_key_id: &str, secret_access_key: &str) -> Self {
        self.credentials = Some(Credentials::new(access_key_id, secret_access_key));
        self
    }

    fn bucket(&self, name: &str) -> Result<Bucket, FetchError> {
        Bucket::new(
            self.endpoint.clone(),
            UrlStyle::Path,
            name.to_owned(),
            self.region.clone(),
        )
        .map_err(|e| transport_err(name, e))
    }

    fn head_url(&self, bucket: &str, key: &str) -> Result<Url, FetchError> {
        let key = key.trim_start_matches('/');
        Ok(self
            .bucket(bucket)?
            .head_object(self.credentials.as_ref(), key)
            .sign(SIGNATURE_TTL))
    }

    fn get_url(&self, bucket: &str, key: &str) -> Result<Url, FetchError> {
        let key = key.trim_start_matches('/');
        Ok(self
            .bucket(bucket)?
            .get_object(self.credentials.as_ref(), key)
            .sign(SIGNATURE_TTL))
    }

    fn put_url(&self, bucket: &str, key: &str) -> Result<Url, FetchError> {
        let key = key.trim_start_matches('/');
        Ok(self
            .bucket(bucket)?
            .put_object(self.credentials.as_ref(), key)
            .sign(SIGNATURE_TTL))
    }

    fn content_length(&self, url: &str) -> Result<Option<u64>, FetchError> {
        let resp = self.agent.head(url).call().map_err(|e| transport_err(url, e))?;
        Ok(resp
            .header("Content-Length")
            .and_then(|v| v.parse::<u64>().ok()))
    }

    /// Write bytes `start..=end` of `url` at the same offset in `dest`.
    fn get_range(&self, url: &str, dest: &Path, start: u64, end: u64) -> Result<u64, FetchError> {
        let resp = self
            .agent
            .get(url)
            .set("Range", &format!("bytes={start}-{end}"))
            .call()
            .map_err(|e| transport_err(url, e))?;
        let mut file = OpenOptions::new()
            .write(true)
            .open(dest)
            .map_err(|e| io_err(dest, e))?;
        file.seek(SeekFrom::Start(start))
            .map_err(|e| io_err(dest, e))?;
        let len = end - start + 1;
        let copied = std::io::copy(&mut resp.into_reader().take(len), &mut file)
            .map_err(|e| transport_err(url, e))?;
        if copied != len {
            return Err(transport_err(
                url,
                format!("short read for bytes {start}-{end}: got {copied}"),
            ));
        }
        Ok(copied)
    }

    fn get_whole(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let resp = self.agent.get(url).call().map_err(|e| transport_err(url, e))?;
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(dest)
            .map_err(|e| io_err(dest, e))?;
        let mut reader = resp.into_reader();
        let written = std::io::copy(&mut reader, &mut file).map_err(|e| transport_err(url, e))?;
        file.flush().map_err(|e| io_err(dest, e))?;
        Ok(written)
    }

    fn get_parts(
        &self,
        url: &str,
        size: u64,
        concurrency: usize,
        dest: &Path,
    ) -> Result<u64, FetchError> {
        let part = size.div_ceil(concurrency as u64).max(MIN_PART_SIZE);
        let ranges: Vec<(u64, u64)> = (0..size)
            .step_by(part as usize)
            .map(|start| (start, (start + part).min(size) - 1))
            .collect();
        debug!(url, parts = ranges.len(), "ranged download");

        OpenOptions::new()
            .write(true)
            .open(dest)
            .and_then(|f| f.set_len(size))
            .map_err(|e| io_err(dest, e))?;

        let results: Vec<Result<u64, FetchError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = ranges
                .iter()
                .map(|&(start, end)| scope.spawn(move || self.get_range(url, dest, start, end)))
                .collect();
            handles
                .into_iter()
                .map(|h| {
                    h.join()
                        .unwrap_or_else(|_| Err(transport_err(url, "download worker panicked")))
                })
                .collect()
        });

        results.into_iter().sum()
    }
}

impl ObjectStoreClient for HttpObjectStore {
    fn head_object(&self, bucket: &str, key: &str) -> Result<bool, FetchError> {
        let url = self.head_url(bucket, key)?;
        match self.agent.head(url.as_str()).call() {
            Ok(_) => Ok(true),
            Err(ureq::Error::Status(404, _)) => Ok(false),
            Err(e) => Err(transport_err(format!("{bucket}/{key}"), e)),
        }
    }

    fn get_object(
        &self,
        bucket: &str,
        key: &str,
        dest: &Path,
        concurrency: usize,
    ) -> Result<u64, FetchError> {
        let url = self.get_url(bucket, key)?;
        if concurrency > 1 {
            let head = self.head_url(bucket, key)?;
            if let Some(size) = self.content_length(head.as_str())? {
                if size > MIN_PART_SIZE {
                    return self.get_parts(url.as_str(), size, concurrency, dest);
                }
            }
        }
        self.get_whole(url.as_str(), dest)
    }

    fn put_object(&self, bucket: &str, key: &str, body: &mut dyn Read) -> Result<(), FetchError> {
        let url = self.put_url(bucket, key)?;
        self.agent
            .put(url.as_str())
            .set("Content-Type", "application/octet-stream")
            .send(body)
            .map_err(|e| transport_err(format!("{bucket}/{key}"), e))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// HttpIndexClient
// ---------------------------------------------------------------------------

pub const DEFAULT_INDEX_URL: &str = "https://bosh.io";

/// [`IndexClient`] for the public community index.
pub struct HttpIndexClient {
    base: String,
    agent: ureq::Agent,
}

impl HttpIndexClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_owned(),
            agent: agent(),
        }
    }
}

impl Default for HttpIndexClient {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_URL)
    }
}

impl IndexClient for HttpIndexClient {
    fn release_exists(&self, repo: &str) -> Result<bool, FetchError> {
        let url = format!("{}/api/v1/releases/github.com/{}", self.base, repo);
        let body = match self.agent.get(&url).call() {
            Ok(resp) => resp.into_string().map_err(|e| transport_err(&url, e))?,
            Err(ureq::Error::Status(404, _)) => return Ok(false),
            Err(e) => return Err(transport_err(repo, e)),
        };
        Ok(body.trim() != "null")
    }

    fn download_url(&self, repo: &str, version: &str) -> String {
        format!("{}/d/github.com/{}?v={}", self.base, repo, version)
    }

    fn fetch(&self, url: &str, out: &mut dyn Write) -> Result<u64, FetchError> {
        let resp = self.agent.get(url).call().map_err(|e| transport_err(url, e))?;
        let mut reader = resp.into_reader();
        std::io::copy(&mut reader, out).map_err(|e| transport_err(url, e))
    }
}
