//! Filesystem-backed cache storage
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/<hex(store name)>/<sha256(request key)>.entry
//! ```
//!
//! An entry file holds one line of JSON metadata followed by the raw body.
//! Store names come from a remote document, so they are hex-encoded rather
//! than used as path components. Every entry is written to its own temporary
//! file and renamed into place, so concurrent writers never share a temp path
//! and readers never see metadata paired with another write's body.

use super::{CacheStorage, CacheStore, Request, Response};
use crate::error::{SwcacheError, SwcacheResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

const ENTRY_EXTENSION: &str = "entry";

/// Metadata line at the head of each entry file
#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    request: Request,
    response: Response,
    stored_at: DateTime<Utc>,
}

impl EntryRecord {
    /// Encode as a metadata line followed by the body
    fn encode(&self, body: &[u8]) -> SwcacheResult<Vec<u8>> {
        // Compact JSON escapes newlines inside strings, so the header is one line
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(b'\n');
        bytes.extend_from_slice(body);
        Ok(bytes)
    }

    /// Split an entry file back into metadata and body
    fn decode(bytes: &[u8]) -> SwcacheResult<(Self, Vec<u8>)> {
        let split = bytes.iter().position(|b| *b == b'\n').unwrap_or(bytes.len());
        let record = serde_json::from_slice(&bytes[..split])?;
        let body = bytes.get(split + 1..).unwrap_or_default().to_vec();
        Ok((record, body))
    }
}

/// A store rooted at one directory
pub struct DiskCacheStore {
    name: String,
    dir: PathBuf,
}

impl DiskCacheStore {
    fn entry_path(&self, request: &Request) -> PathBuf {
        let stem = hex::encode(Sha256::digest(request.cache_key().as_bytes()));
        self.dir.join(format!("{}.{}", stem, ENTRY_EXTENSION))
    }

    async fn write_atomic(&self, path: PathBuf, contents: Vec<u8>) -> SwcacheResult<()> {
        let dir = self.dir.clone();
        let context = format!("writing {}", path.display());

        tokio::task::spawn_blocking(move || {
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(&contents)?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok::<_, std::io::Error>(())
        })
        .await
        .map_err(|e| SwcacheError::Internal(format!("store write task failed: {}", e)))?
        .map_err(|e| SwcacheError::io(context, e))
    }

    async fn write_entry(&self, request: &Request, mut response: Response) -> SwcacheResult<()> {
        let body = std::mem::take(&mut response.body);
        let record = EntryRecord {
            request: request.clone(),
            response,
            stored_at: Utc::now(),
        };
        let bytes = record.encode(&body)?;
        self.write_atomic(self.entry_path(request), bytes).await?;

        debug!("Stored {} in {}", request, self.name);
        Ok(())
    }

    /// Read only the metadata line of an entry file
    async fn read_record(&self, path: &Path) -> SwcacheResult<Option<EntryRecord>> {
        let file = match fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SwcacheError::io(format!("reading {}", path.display()), e));
            }
        };

        let mut line = String::new();
        BufReader::new(file)
            .read_line(&mut line)
            .await
            .map_err(|e| SwcacheError::io(format!("reading {}", path.display()), e))?;
        Ok(Some(serde_json::from_str(&line)?))
    }
}

#[async_trait]
impl CacheStore for DiskCacheStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, request: &Request, response: Response) -> SwcacheResult<()> {
        request.check_cacheable(&response)?;
        self.write_entry(request, response).await
    }

    async fn put_all(&self, batch: Vec<(Request, Response)>) -> SwcacheResult<()> {
        for (request, response) in &batch {
            request.check_cacheable(response)?;
        }
        for (request, response) in batch {
            self.write_entry(&request, response).await?;
        }
        Ok(())
    }

    async fn lookup(&self, request: &Request) -> SwcacheResult<Option<Response>> {
        if request.method != "GET" {
            return Ok(None);
        }

        let path = self.entry_path(request);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SwcacheError::io(format!("reading {}", path.display()), e));
            }
        };

        let (record, body) = EntryRecord::decode(&bytes)?;
        let mut response = record.response;
        response.body = body;
        Ok(Some(response))
    }

    async fn requests(&self) -> SwcacheResult<Vec<Request>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(SwcacheError::io(
                    format!("reading store directory {}", self.dir.display()),
                    e,
                ))
            }
        };

        let mut records = vec![];
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SwcacheError::io("reading store entry", e))?
        {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION) {
                continue;
            }
            match self.read_record(&path).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable entry {}: {}", path.display(), e),
            }
        }

        records.sort_by(|a, b| a.stored_at.cmp(&b.stored_at));
        Ok(records.into_iter().map(|r| r.request).collect())
    }
}

/// Collection of stores under one root directory
pub struct DiskCacheStorage {
    root: PathBuf,
}

impl DiskCacheStorage {
    /// Create storage rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn store_dir(&self, name: &str) -> PathBuf {
        self.root.join(hex::encode(name.as_bytes()))
    }
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    async fn open(&self, name: &str) -> SwcacheResult<Arc<dyn CacheStore>> {
        let dir = self.store_dir(name);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| SwcacheError::io(format!("creating store {}", name), e))?;

        let store: Arc<dyn CacheStore> = Arc::new(DiskCacheStore {
            name: name.to_string(),
            dir,
        });
        Ok(store)
    }

    async fn has(&self, name: &str) -> SwcacheResult<bool> {
        fs::try_exists(self.store_dir(name))
            .await
            .map_err(|e| SwcacheError::io(format!("checking store {}", name), e))
    }

    async fn keys(&self) -> SwcacheResult<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(SwcacheError::io(
                    format!("reading storage root {}", self.root.display()),
                    e,
                ))
            }
        };

        let mut names = vec![];
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SwcacheError::io("reading storage entry", e))?
        {
            let file_name = entry.file_name();
            let decoded = file_name
                .to_str()
                .and_then(|s| hex::decode(s).ok())
                .and_then(|bytes| String::from_utf8(bytes).ok());
            match decoded {
                Some(name) => names.push(name),
                None => debug!("Ignoring foreign entry {:?} in storage root", file_name),
            }
        }

        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> SwcacheResult<bool> {
        match fs::remove_dir_all(self.store_dir(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SwcacheError::store(name, e)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}
