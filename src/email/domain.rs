//! Domain name normalization.

use std::fmt;
use std::sync::Arc;

/// A normalized domain name: trimmed, lowercased, trailing dot removed.
///
/// Two `Domain`s compare equal whenever their inputs differed only in case
/// or in a trailing root dot. Cloning is a pointer copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Domain(Arc<str>);

impl Domain {
    /// Normalizes `raw`, returning `None` if nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_domain(raw);
        if normalized.is_empty() {
            None
        } else {
            Some(Domain(Arc::from(normalized)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the domain itself followed by each parent suffix.
    ///
    /// `a.b.example.com` yields `a.b.example.com`, `b.example.com`,
    /// `example.com`, `com`.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            rest: Some(self.as_str()),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Iterator returned by [`Domain::ancestors`].
pub struct Ancestors<'a> {
    rest: Option<&'a str>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.rest?;
        self.rest = current
            .find('.')
            .map(|idx| &current[idx + 1..])
            .filter(|parent| !parent.is_empty());
        Some(current)
    }
}

/// Lowercases a domain and strips surrounding whitespace and trailing dots.
pub fn normalize_domain(raw: &str) -> String {
    raw.trim().trim_end_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_trailing_dot() {
        let a = Domain::parse("Example.COM.").unwrap();
        let b = Domain::parse("example.com").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "example.com");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(Domain::parse("").is_none());
        assert!(Domain::parse("  ").is_none());
        assert!(Domain::parse("...").is_none());
    }

    #[test]
    fn test_ancestors_walks_every_suffix() {
        let domain = Domain::parse("a.b.evil.com").unwrap();
        let ancestors: Vec<&str> = domain.ancestors().collect();
        assert_eq!(ancestors, vec!["a.b.evil.com", "b.evil.com", "evil.com", "com"]);
    }

    #[test]
    fn test_ancestors_single_label() {
        let domain = Domain::parse("localhost").unwrap();
        assert_eq!(domain.ancestors().collect::<Vec<_>>(), vec!["localhost"]);
    }

    #[test]
    fn test_display_matches_as_str() {
        let domain = Domain::parse("Mail.Example.org").unwrap();
        assert_eq!(domain.to_string(), "mail.example.org");
    }
}
