//! Immutable disposable-domain snapshot and list parsing.

use std::collections::HashSet;

use crate::email::normalize_domain;

/// An immutable set of disposable domains.
///
/// A snapshot is built once and never mutated; the owning
/// [`super::DisposableDomainSource`] publishes a fresh one on every rebuild.
#[derive(Debug, Default)]
pub struct DisposableSet {
    domains: HashSet<Box<str>>,
    generation: u64,
}

impl DisposableSet {
    pub fn new(domains: HashSet<Box<str>>, generation: u64) -> Self {
        Self {
            domains,
            generation,
        }
    }

    /// Builds a snapshot from already-normalized entries.
    pub fn from_entries<I, S>(entries: I, generation: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Box<str>>,
    {
        Self::new(entries.into_iter().map(Into::into).collect(), generation)
    }

    /// Returns true if `domain` or any of its parent suffixes is listed.
    ///
    /// `domain` must already be normalized (see [`normalize_domain`]).
    pub fn matches(&self, domain: &str) -> bool {
        if domain.is_empty() || self.domains.is_empty() {
            return false;
        }

        let mut part = domain;
        loop {
            if self.domains.contains(part) {
                return true;
            }

            // Strip leading label
            match part.find('.') {
                Some(idx) => {
                    part = &part[idx + 1..];
                    if part.is_empty() {
                        return false;
                    }
                }
                None => return false,
            }
        }
    }

    /// Returns true if `domain` is listed exactly.
    pub fn contains_exact(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Monotonic rebuild counter; 0 is the empty pre-initialization snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Parses one line of a list file.
///
/// Skips blank lines and `#` comments, strips inline comments and wildcard
/// prefixes (`*.` or `.`), and normalizes the remainder.
pub fn parse_line(line: &str) -> Option<String> {
    let line = line.split('#').next().unwrap_or_default().trim();
    if line.is_empty() {
        return None;
    }

    let line = line
        .strip_prefix("*.")
        .or_else(|| line.strip_prefix('.'))
        .unwrap_or(line);

    let domain = normalize_domain(line);
    if domain.is_empty() || domain.contains(char::is_whitespace) {
        None
    } else {
        Some(domain)
    }
}

/// Parses a whole list file into normalized domains.
pub fn parse_list(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines().filter_map(parse_line)
}
