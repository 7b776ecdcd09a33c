//! Result sinks.
//!
//! Each category has one bounded channel and one drain task that owns the
//! category's sink. Workers block on a full channel, which caps memory use
//! no matter how large the input is.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error_handling::{ErrorType, PipelineError, ProcessingStats};

use super::outcome::Category;

/// Append-only destination for the addresses of one category.
#[async_trait]
pub trait OutcomeSink: Send {
    async fn write(&mut self, address: &str) -> io::Result<()>;

    /// Called once after the last write.
    async fn flush(&mut self) -> io::Result<()>;
}

/// Writes one address per line to a file.
pub struct FileSink {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileSink {
    /// Creates (or truncates) `path`.
    pub async fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).await?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OutcomeSink for FileSink {
    async fn write(&mut self, address: &str) -> io::Result<()> {
        self.writer.write_all(address.as_bytes()).await?;
        self.writer.write_all(b"\n").await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.writer.flush().await
    }
}

/// Keeps addresses in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Addresses written so far, in write order.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl OutcomeSink for MemorySink {
    async fn write(&mut self, address: &str) -> io::Result<()> {
        self.lines
            .lock()
            .map_err(|_| io::Error::other("memory sink poisoned"))?
            .push(address.to_string());
        Ok(())
    }

    async fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// One sink per category.
pub struct CategorySinks {
    pub valid: Box<dyn OutcomeSink>,
    pub invalid_format: Box<dyn OutcomeSink>,
    pub disposable: Box<dyn OutcomeSink>,
    pub missing_mx: Box<dyn OutcomeSink>,
}

impl CategorySinks {
    fn into_entries(self) -> [(Category, Box<dyn OutcomeSink>); 4] {
        [
            (Category::Valid, self.valid),
            (Category::InvalidFormat, self.invalid_format),
            (Category::Disposable, self.disposable),
            (Category::MissingMx, self.missing_mx),
        ]
    }
}

/// Producer side of the four category channels.
#[derive(Clone)]
pub(crate) struct SinkSenders {
    senders: [mpsc::Sender<String>; 4],
}

impl SinkSenders {
    pub(crate) fn for_category(&self, category: Category) -> &mpsc::Sender<String> {
        &self.senders[category.index()]
    }
}

/// Starts one drain task per category.
///
/// Each task returns the number of addresses it wrote. A drain stops at its
/// first write error; its channel closes and later sends fail.
pub(crate) fn spawn_drains(
    sinks: CategorySinks,
    capacity: usize,
    stats: &Arc<ProcessingStats>,
) -> (SinkSenders, Vec<JoinHandle<Result<u64, PipelineError>>>) {
    let mut handles = Vec::with_capacity(4);
    let senders = sinks.into_entries().map(|(category, sink)| {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        handles.push(tokio::spawn(drain(category, rx, sink, Arc::clone(stats))));
        tx
    });

    (SinkSenders { senders }, handles)
}

async fn drain(
    category: Category,
    mut rx: mpsc::Receiver<String>,
    mut sink: Box<dyn OutcomeSink>,
    stats: Arc<ProcessingStats>,
) -> Result<u64, PipelineError> {
    let sink_error = |source: io::Error| {
        log::error!("Failed to write {category} result: {source}");
        stats.increment_error(ErrorType::SinkWriteError);
        PipelineError::Sink {
            category: category.as_str(),
            source,
        }
    };

    let mut written = 0;
    while let Some(address) = rx.recv().await {
        sink.write(&address).await.map_err(&sink_error)?;
        written += 1;
    }
    sink.flush().await.map_err(&sink_error)?;

    log::debug!("{category} sink drained ({written} addresses)");
    Ok(written)
}
