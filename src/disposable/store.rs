//! On-disk storage for the disposable lists.
//!
//! Layout of the storage directory:
//! - `disposable_domains.txt` - last successfully downloaded remote list
//! - `disposable_domains.json` - when and from where it was downloaded
//! - `custom_disposable_domains.txt` - per-install custom list

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::config::{
    CUSTOM_LIST_FILE, CUSTOM_LIST_HEADER, DISPOSABLE_FETCH_TIMEOUT, REMOTE_LIST_FILE,
    REMOTE_METADATA_FILE,
};
use crate::error_handling::SourceError;

use super::set::parse_list;

/// Metadata stored next to the cached remote list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteListMetadata {
    /// URL the list was downloaded from
    pub source: String,
    /// When the download completed
    pub last_updated: SystemTime,
    /// Number of domains in the list
    pub domains: usize,
}

/// Paths of the files kept in the storage directory.
#[derive(Debug, Clone)]
pub struct ListStore {
    dir: PathBuf,
}

impl ListStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn remote_list_path(&self) -> PathBuf {
        self.dir.join(REMOTE_LIST_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(REMOTE_METADATA_FILE)
    }

    pub fn custom_list_path(&self) -> PathBuf {
        self.dir.join(CUSTOM_LIST_FILE)
    }

    /// Creates the storage directory and the default custom list if missing.
    ///
    /// An existing custom list is left untouched.
    pub async fn ensure_layout(&self) -> Result<(), SourceError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SourceError::io(&self.dir, e))?;

        let custom = self.custom_list_path();
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&custom)
            .await
        {
            Ok(_) => {
                fs::write(&custom, CUSTOM_LIST_HEADER)
                    .await
                    .map_err(|e| SourceError::io(&custom, e))?;
                log::info!("Created custom disposable list at {}", custom.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(SourceError::io(&custom, e)),
        }
    }

    /// Loads the remote list metadata, `None` if it was never downloaded.
    pub async fn load_metadata(&self) -> Result<Option<RemoteListMetadata>, SourceError> {
        let path = self.metadata_path();
        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SourceError::io(&path, e)),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Returns true if the cached remote list must be downloaded again.
    ///
    /// The copy is stale when it is missing, older than `max_age`, or was
    /// downloaded from a different URL.
    pub async fn is_stale(&self, source: &str, max_age: Duration) -> bool {
        if !fs::try_exists(self.remote_list_path()).await.unwrap_or(false) {
            return true;
        }

        match self.load_metadata().await {
            Ok(Some(metadata)) => {
                if metadata.source != source {
                    log::debug!(
                        "Cached disposable list came from {}, configured source is {}",
                        metadata.source,
                        source
                    );
                    return true;
                }
                // a clock that moved backwards counts as fresh
                metadata
                    .last_updated
                    .elapsed()
                    .map(|age| age > max_age)
                    .unwrap_or(false)
            }
            Ok(None) => true,
            Err(e) => {
                log::warn!("Ignoring unreadable disposable list metadata: {e}");
                true
            }
        }
    }

    /// Downloads the remote list and replaces the cached copy.
    ///
    /// The list is written to a temporary file and renamed into place so a
    /// failed download never truncates the previous copy.
    pub async fn download(
        &self,
        client: &reqwest::Client,
        source: &str,
    ) -> Result<RemoteListMetadata, SourceError> {
        let response = client
            .get(source)
            .timeout(DISPOSABLE_FETCH_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let domains = parse_list(&body).count();

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SourceError::io(&self.dir, e))?;

        let target = self.remote_list_path();
        let partial = target.with_extension("txt.partial");
        fs::write(&partial, body.as_bytes())
            .await
            .map_err(|e| SourceError::io(&partial, e))?;
        fs::rename(&partial, &target)
            .await
            .map_err(|e| SourceError::io(&target, e))?;

        let metadata = RemoteListMetadata {
            source: source.to_string(),
            last_updated: SystemTime::now(),
            domains,
        };
        let metadata_path = self.metadata_path();
        let metadata_json = serde_json::to_string_pretty(&metadata)?;
        fs::write(&metadata_path, metadata_json)
            .await
            .map_err(|e| SourceError::io(&metadata_path, e))?;

        Ok(metadata)
    }
}

/// Reads a list file into `into`. A missing file contributes nothing.
///
/// Returns the number of entries read.
pub async fn read_list_file(path: &Path, into: &mut HashSet<Box<str>>) -> Result<usize, SourceError> {
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(SourceError::io(path, e)),
    };

    let mut count = 0;
    for domain in parse_list(&text) {
        into.insert(domain.into_boxed_str());
        count += 1;
    }
    Ok(count)
}

/// Identity of a file's current contents, used to notice edits.
pub type FileStamp = Option<(SystemTime, u64)>;

/// Returns the modification time and length of `path`, `None` if unreadable.
pub async fn file_stamp(path: &Path) -> FileStamp {
    let metadata = fs::metadata(path).await.ok()?;
    Some((metadata.modified().ok()?, metadata.len()))
}
