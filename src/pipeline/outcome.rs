//! Per-address validation results.

use std::fmt;

use crate::email::Domain;

/// Why an address was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// The address failed the syntax check
    InvalidFormat,
    /// The domain belongs to a disposable mailbox provider
    Disposable,
    /// The domain publishes no usable MX record
    MissingMx,
}

/// Output bucket of an address. Every address lands in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Valid,
    InvalidFormat,
    Disposable,
    MissingMx,
}

impl Category {
    /// All categories in output order.
    pub const ALL: [Category; 4] = [
        Category::Valid,
        Category::InvalidFormat,
        Category::Disposable,
        Category::MissingMx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Valid => "valid",
            Category::InvalidFormat => "invalid_format",
            Category::Disposable => "disposable",
            Category::MissingMx => "missing_mx",
        }
    }

    /// Name of the result file for this category.
    pub fn file_name(&self) -> &'static str {
        match self {
            Category::Valid => "valid.txt",
            Category::InvalidFormat => "invalid_format.txt",
            Category::Disposable => "disposable.txt",
            Category::MissingMx => "missing_mx.txt",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Category::Valid => 0,
            Category::InvalidFormat => 1,
            Category::Disposable => 2,
            Category::MissingMx => 3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RejectReason> for Category {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::InvalidFormat => Category::InvalidFormat,
            RejectReason::Disposable => Category::Disposable,
            RejectReason::MissingMx => Category::MissingMx,
        }
    }
}

/// Result of validating one address.
///
/// `reason` is set exactly when `valid` is false. `domain` is present once
/// the syntax check passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub reason: Option<RejectReason>,
    pub domain: Option<Domain>,
}

impl ValidationOutcome {
    pub fn accepted(domain: Domain) -> Self {
        Self {
            valid: true,
            reason: None,
            domain: Some(domain),
        }
    }

    pub fn rejected(reason: RejectReason, domain: Option<Domain>) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
            domain,
        }
    }

    pub fn category(&self) -> Category {
        self.reason.map_or(Category::Valid, Category::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_of_outcomes() {
        let domain = Domain::parse("example.test").unwrap();
        assert_eq!(
            ValidationOutcome::accepted(domain.clone()).category(),
            Category::Valid
        );
        assert_eq!(
            ValidationOutcome::rejected(RejectReason::InvalidFormat, None).category(),
            Category::InvalidFormat
        );
        assert_eq!(
            ValidationOutcome::rejected(RejectReason::MissingMx, Some(domain)).category(),
            Category::MissingMx
        );
    }

    #[test]
    fn test_rejected_outcome_has_reason() {
        let outcome = ValidationOutcome::rejected(RejectReason::Disposable, None);
        assert!(!outcome.valid);
        assert_eq!(outcome.reason, Some(RejectReason::Disposable));
    }

    #[test]
    fn test_category_indices_are_distinct() {
        let mut seen = [false; 4];
        for category in Category::ALL {
            assert!(!seen[category.index()]);
            seen[category.index()] = true;
        }
    }
}
