//! Output directory bookkeeping.
//!
//! Results are written to hidden `.partial` files next to their final names
//! and only renamed into place once the run finishes. An abandoned run can
//! therefore be undone without touching anything that existed before it.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tokio::fs;

use super::outcome::Category;
use super::sinks::{CategorySinks, FileSink};

/// Tracks what a run created inside its output directory.
#[derive(Debug)]
pub struct OutputGuard {
    dir: PathBuf,
    /// Topmost directory this run created, if any
    created_root: Option<PathBuf>,
    /// (staging file, final file)
    staged: Vec<(PathBuf, PathBuf)>,
}

impl OutputGuard {
    /// Creates `dir` (and missing parents) and remembers whether it existed.
    pub async fn prepare(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let created_root = first_missing_ancestor(&dir).await;
        fs::create_dir_all(&dir).await?;

        if let Some(root) = &created_root {
            log::debug!("Created output directory {}", root.display());
        }

        Ok(Self {
            dir,
            created_root,
            staged: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True if the output directory did not exist before this run.
    pub fn created_dir(&self) -> bool {
        self.created_root.is_some()
    }

    /// Opens one staging file per category.
    pub async fn file_sinks(&mut self) -> io::Result<CategorySinks> {
        Ok(CategorySinks {
            valid: Box::new(self.stage(Category::Valid).await?),
            invalid_format: Box::new(self.stage(Category::InvalidFormat).await?),
            disposable: Box::new(self.stage(Category::Disposable).await?),
            missing_mx: Box::new(self.stage(Category::MissingMx).await?),
        })
    }

    async fn stage(&mut self, category: Category) -> io::Result<FileSink> {
        let target = self.dir.join(category.file_name());
        let staging = self.dir.join(format!(".{}.partial", category.file_name()));
        let sink = FileSink::create(&staging).await?;
        self.staged.push((staging, target));
        Ok(sink)
    }

    /// Moves the staged files to their final names.
    ///
    /// Returns the paths of the result files. If a rename fails, the staging
    /// files not yet moved are deleted; files already renamed stay.
    pub async fn commit(self) -> io::Result<Vec<PathBuf>> {
        let mut committed = Vec::with_capacity(self.staged.len());
        let mut staged = self.staged.into_iter();
        while let Some((staging, target)) = staged.next() {
            if let Err(e) = fs::rename(&staging, &target).await {
                remove_staging(std::iter::once(staging).chain(staged.map(|(s, _)| s))).await;
                return Err(e);
            }
            committed.push(target);
        }
        Ok(committed)
    }

    /// Removes everything this run created.
    ///
    /// A directory created by the run is removed entirely; in a pre-existing
    /// directory only the staging files are deleted.
    pub async fn discard(self) -> io::Result<()> {
        if let Some(root) = &self.created_root {
            log::info!("Removing partial output directory {}", root.display());
            return match fs::remove_dir_all(root).await {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            };
        }

        for (staging, _) in &self.staged {
            match fs::remove_file(staging).await {
                Err(e) if e.kind() != ErrorKind::NotFound => return Err(e),
                _ => {}
            }
        }
        log::info!("Removed partial results from {}", self.dir.display());
        Ok(())
    }
}

async fn remove_staging(files: impl Iterator<Item = PathBuf>) {
    for file in files {
        match fs::remove_file(&file).await {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                log::warn!("Failed to remove {}: {e}", file.display());
            }
            _ => {}
        }
    }
}

/// Returns the highest ancestor of `dir` (or `dir` itself) that does not exist yet.
async fn first_missing_ancestor(dir: &Path) -> Option<PathBuf> {
    let mut missing = None;
    for ancestor in dir.ancestors() {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        if fs::try_exists(ancestor).await.unwrap_or(false) {
            break;
        }
        missing = Some(ancestor.to_path_buf());
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::OutcomeSink;
    use tempfile::TempDir;

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_commit_renames_staged_files() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("results");

        let mut guard = OutputGuard::prepare(&out).await.unwrap();
        assert!(guard.created_dir());
        let mut sinks = guard.file_sinks().await.unwrap();
        sinks.valid.write("ok@example.test").await.unwrap();
        sinks.valid.flush().await.unwrap();
        drop(sinks);

        let files = guard.commit().await.unwrap();
        assert_eq!(files.len(), 4);
        assert_eq!(
            listing(&out),
            vec!["disposable.txt", "invalid_format.txt", "missing_mx.txt", "valid.txt"]
        );
        assert_eq!(
            std::fs::read_to_string(out.join("valid.txt")).unwrap(),
            "ok@example.test\n"
        );
    }

    #[tokio::test]
    async fn test_discard_removes_created_directory_tree() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("a").join("b");

        let mut guard = OutputGuard::prepare(&out).await.unwrap();
        guard.file_sinks().await.unwrap();
        guard.discard().await.unwrap();

        assert!(!temp_dir.path().join("a").exists());
    }

    #[tokio::test]
    async fn test_discard_keeps_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path();
        std::fs::write(out.join("notes.txt"), "keep me").unwrap();
        std::fs::write(out.join("valid.txt"), "old@example.test\n").unwrap();

        let mut guard = OutputGuard::prepare(out).await.unwrap();
        assert!(!guard.created_dir());
        let mut sinks = guard.file_sinks().await.unwrap();
        sinks.valid.write("new@example.test").await.unwrap();
        sinks.valid.flush().await.unwrap();
        drop(sinks);
        guard.discard().await.unwrap();

        assert_eq!(listing(out), vec!["notes.txt", "valid.txt"]);
        assert_eq!(
            std::fs::read_to_string(out.join("valid.txt")).unwrap(),
            "old@example.test\n"
        );
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_no_staging_files() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path();
        // a non-empty directory cannot be replaced by a rename
        std::fs::create_dir(out.join("disposable.txt")).unwrap();
        std::fs::write(out.join("disposable.txt").join("keep"), "x").unwrap();

        let mut guard = OutputGuard::prepare(out).await.unwrap();
        drop(guard.file_sinks().await.unwrap());

        assert!(guard.commit().await.is_err());
        assert_eq!(
            listing(out),
            vec!["disposable.txt", "invalid_format.txt", "valid.txt"]
        );
    }
}
