// Shared helpers for the integration tests: scripted MX answers and run configs
// rooted in a temporary directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use email_sieve::error_handling::DnsLookupError;
use email_sieve::mx::MxLookup;
use email_sieve::Config;

/// URL nothing listens on; downloads fail immediately.
#[allow(dead_code)]
pub const UNREACHABLE_LIST_URL: &str = "http://127.0.0.1:9/disposable.txt";

/// Answers MX queries from a fixed set of domains and counts the queries.
#[allow(dead_code)]
pub struct StaticMx {
    domains: HashSet<String>,
    queries: AtomicUsize,
}

#[allow(dead_code)]
impl StaticMx {
    pub fn new(domains: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            domains: domains.iter().map(|d| d.to_string()).collect(),
            queries: AtomicUsize::new(0),
        })
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MxLookup for StaticMx {
    async fn lookup_mx(&self, domain: &str) -> Result<bool, DnsLookupError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.domains.contains(domain) {
            Ok(true)
        } else {
            Err(DnsLookupError::NoRecords)
        }
    }
}

/// Never answers within the lifetime of a test.
#[allow(dead_code)]
pub struct StalledMx;

#[async_trait]
impl MxLookup for StalledMx {
    async fn lookup_mx(&self, _domain: &str) -> Result<bool, DnsLookupError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(true)
    }
}

/// Run config reading `input` and keeping all state under `root`.
#[allow(dead_code)]
pub fn test_config(root: &Path, input: PathBuf, list_url: &str) -> Config {
    Config {
        file: Some(input),
        output_dir: root.join("results"),
        storage_dir: root.join("storage"),
        disposable_url: list_url.to_string(),
        workers: 4,
        dns_timeout_secs: 1,
        retry_base_delay_secs: 0,
        retry_jitter_secs: 0,
        ..Default::default()
    }
}

/// Writes `lines` to `root/name` and returns the path.
#[allow(dead_code)]
pub fn write_input(root: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = root.join(name);
    std::fs::write(&path, lines.join("\n")).expect("Failed to write input file");
    path
}

/// Reads a result file into sorted lines.
#[allow(dead_code)]
pub fn read_sorted(path: &Path) -> Vec<String> {
    let mut lines: Vec<String> = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()))
        .lines()
        .map(str::to_string)
        .collect();
    lines.sort();
    lines
}

/// Sorted file names in `dir`.
#[allow(dead_code)]
pub fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
