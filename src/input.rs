//! Address input parsing.
//!
//! Input files hold one or more addresses per line, separated by commas.
//! Blank entries and lines starting with `#` are skipped. Surrounding quotes
//! (as written by spreadsheet exports) are removed.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

use futures::stream::{self, BoxStream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::error_handling::RunError;

/// Splits one input line into trimmed address tokens.
pub fn split_line(line: &str) -> impl Iterator<Item = &str> {
    let trimmed = line.trim();
    let body = if trimmed.starts_with('#') { "" } else { trimmed };

    body.split(',')
        .map(|token| token.trim().trim_matches('"').trim())
        .filter(|token| !token.is_empty() && !token.starts_with('#'))
}

/// Address tokens of the run input, in file order.
pub type AddressStream = BoxStream<'static, io::Result<String>>;

/// Reads the next line of `reader` into `buf`, without its line terminator.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD, so a stray
/// Latin-1 byte spoils one token instead of the whole input.
pub(crate) async fn read_line_lossy<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let line = buf.as_slice();
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    Ok(Some(String::from_utf8_lossy(line).into_owned()))
}

/// Lazily yields the address tokens of `reader`.
///
/// Lines are read on demand, so the whole input is never held in memory.
/// A read error is yielded once and ends the stream.
pub fn address_stream<R>(reader: R) -> AddressStream
where
    R: AsyncBufRead + Send + Unpin + 'static,
{
    stream::unfold(
        Some((reader, Vec::new(), VecDeque::new())),
        |state| async move {
            let (mut reader, mut buf, mut pending) = state?;
            loop {
                if let Some(address) = pending.pop_front() {
                    return Some((Ok(address), Some((reader, buf, pending))));
                }

                match read_line_lossy(&mut reader, &mut buf).await {
                    Ok(Some(line)) => pending.extend(split_line(&line).map(str::to_string)),
                    Ok(None) => return None,
                    Err(e) => return Some((Err(e), None)),
                }
            }
        },
    )
    .boxed()
}

/// Counts the address tokens in the file at `path`.
pub async fn count_addresses(path: &Path) -> io::Result<u64> {
    let mut reader = BufReader::new(tokio::fs::File::open(path).await?);
    let mut buf = Vec::new();
    let mut count = 0u64;
    while let Some(line) = read_line_lossy(&mut reader, &mut buf).await? {
        count += split_line(&line).count() as u64;
    }
    Ok(count)
}

/// Returns true if `path` means standard input.
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Opens the run input.
///
/// Files are counted first so progress can show a percentage; standard
/// input has no expected total.
///
/// # Errors
///
/// Returns `RunError::InputUnavailable` if the file cannot be opened or read.
pub async fn open_input(path: &Path) -> Result<(AddressStream, Option<u64>), RunError> {
    if is_stdin(path) {
        log::info!("Reading addresses from stdin");
        return Ok((address_stream(BufReader::new(tokio::io::stdin())), None));
    }

    let unavailable = |source: io::Error| RunError::InputUnavailable {
        path: PathBuf::from(path),
        source,
    };

    let total = count_addresses(path).await.map_err(unavailable)?;
    log::info!("Total addresses in file: {total}");

    let file = tokio::fs::File::open(path).await.map_err(unavailable)?;
    Ok((address_stream(BufReader::new(file)), Some(total)))
}
