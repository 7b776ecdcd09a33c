//! Address list merging.
//!
//! Combines several address files into one deduplicated list and optionally
//! removes the addresses found in another file. Only addresses passing the
//! syntax check are kept; the domain part is lowercased so that
//! `a@Example.test` and `a@example.test` count once.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncWriteExt, BufReader, BufWriter};

use crate::email::check_syntax;
use crate::error_handling::RunError;
use crate::input::{read_line_lossy, split_line};

/// Result of a merge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Files read
    pub inputs: usize,
    /// Well-formed addresses seen across all inputs, duplicates included
    pub read: usize,
    /// Addresses dropped because they were in the subtract list
    pub removed: usize,
    /// Addresses written
    pub written: usize,
    /// Destination file
    pub output: PathBuf,
}

/// Canonical form of `address`, or `None` if it fails the syntax check.
pub fn normalize_address(address: &str) -> Option<String> {
    check_syntax(address).map(|parsed| format!("{}@{}", parsed.local, parsed.domain.as_str()))
}

/// Unions the well-formed addresses of `lists`, keeping first-seen order.
pub fn merge_lists<I, L, S>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for address in lists.into_iter().flatten() {
        if let Some(normalized) = normalize_address(address.as_ref()) {
            if seen.insert(normalized.clone()) {
                merged.push(normalized);
            }
        }
    }
    merged
}

/// Removes every address of `remove` from `base`, preserving `base` order.
pub fn subtract_lists<S: AsRef<str>>(base: Vec<String>, remove: &[S]) -> Vec<String> {
    let remove: HashSet<String> = remove
        .iter()
        .filter_map(|address| normalize_address(address.as_ref()))
        .collect();
    base.into_iter()
        .filter(|address| {
            normalize_address(address).map_or(true, |normalized| !remove.contains(&normalized))
        })
        .collect()
}

/// Reads every address token of the file at `path`.
///
/// # Errors
///
/// Returns `RunError::InputUnavailable` if the file cannot be read.
pub async fn read_addresses(path: &Path) -> Result<Vec<String>, RunError> {
    let unavailable = |source| RunError::InputUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let file = tokio::fs::File::open(path).await.map_err(unavailable)?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut addresses = Vec::new();
    while let Some(line) = read_line_lossy(&mut reader, &mut buf)
        .await
        .map_err(unavailable)?
    {
        addresses.extend(split_line(&line).map(str::to_string));
    }
    Ok(addresses)
}

/// Merges `inputs`, subtracts `subtract` if given and writes the result to `output`.
pub async fn run_merge(
    inputs: &[PathBuf],
    subtract: Option<&Path>,
    output: &Path,
) -> Result<MergeReport, RunError> {
    let mut lists = Vec::with_capacity(inputs.len());
    for path in inputs {
        let addresses = read_addresses(path).await?;
        log::info!("Read {} addresses from {}", addresses.len(), path.display());
        lists.push(addresses);
    }

    let read = lists
        .iter()
        .flatten()
        .filter(|address| check_syntax(address).is_some())
        .count();
    let mut merged = merge_lists(lists);
    let before = merged.len();

    if let Some(path) = subtract {
        let remove = read_addresses(path).await?;
        merged = subtract_lists(merged, &remove);
        log::info!(
            "Removed {} addresses listed in {}",
            before - merged.len(),
            path.display()
        );
    }

    write_lines(output, &merged)
        .await
        .map_err(|source| RunError::OutputUnavailable {
            path: output.to_path_buf(),
            source,
        })?;

    Ok(MergeReport {
        inputs: inputs.len(),
        read,
        removed: before - merged.len(),
        written: merged.len(),
        output: output.to_path_buf(),
    })
}

async fn write_lines(path: &Path, lines: &[String]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut writer = BufWriter::new(tokio::fs::File::create(path).await?);
    for line in lines {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_address_lowercases_domain_only() {
        assert_eq!(
            normalize_address(" Jane.Doe@Example.TEST ").as_deref(),
            Some("Jane.Doe@example.test")
        );
        assert_eq!(normalize_address("no-at-sign"), None);
    }

    #[test]
    fn test_merge_lists_dedups_in_first_seen_order() {
        let merged = merge_lists([
            vec!["b@x.test", "a@X.test", "junk"],
            vec!["a@x.test", "c@y.test", "b@x.test"],
        ]);
        assert_eq!(merged, vec!["b@x.test", "a@x.test", "c@y.test"]);
    }

    #[test]
    fn test_subtract_lists() {
        let base = merge_lists([vec!["a@x.test", "b@x.test", "c@x.test"]]);
        let result = subtract_lists(base, &["B@X.TEST", "z@x.test"]);
        assert_eq!(result, vec!["a@x.test", "c@x.test"]);
    }

    #[test]
    fn test_subtract_nothing() {
        let base = vec!["a@x.test".to_string()];
        let empty: [&str; 0] = [];
        assert_eq!(subtract_lists(base.clone(), &empty), base);
    }

    #[tokio::test]
    async fn test_run_merge_writes_output() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.txt");
        let second = temp_dir.path().join("second.csv");
        let unsubscribed = temp_dir.path().join("unsubscribed.txt");
        let output = temp_dir.path().join("out").join("merged.txt");
        std::fs::write(&first, "a@x.test\nb@x.test\n# comment\nbroken\n").unwrap();
        std::fs::write(&second, "b@X.test, c@y.test\n").unwrap();
        std::fs::write(&unsubscribed, "a@x.test\n").unwrap();

        let report = run_merge(
            &[first, second],
            Some(unsubscribed.as_path()),
            &output,
        )
        .await
        .unwrap();

        assert_eq!(report.inputs, 2);
        assert_eq!(report.read, 4);
        assert_eq!(report.removed, 1);
        assert_eq!(report.written, 2);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "b@x.test\nc@y.test\n"
        );
    }

    #[tokio::test]
    async fn test_run_merge_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let err = run_merge(
            &[temp_dir.path().join("absent.txt")],
            None,
            &temp_dir.path().join("merged.txt"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
