//! Basic address syntax check.
//!
//! This is deliberately not a full RFC 5322 parser: it accepts dot-atom local
//! parts and hostname-style domains, which covers what real mailbox providers
//! hand out. Quoted local parts and domain literals are rejected.

use std::sync::LazyLock;

use regex::Regex;

use super::domain::Domain;

/// Maximum address length (RFC 5321 forward-path limit)
const MAX_ADDRESS_LEN: usize = 254;
/// Maximum local-part length
const MAX_LOCAL_LEN: usize = 64;
/// Maximum domain length
const MAX_DOMAIN_LEN: usize = 253;
/// Maximum length of a single domain label
const MAX_LABEL_LEN: usize = 63;

static LOCAL_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w!#$%&'*+/=?^`{|}~-]+(?:\.[\w!#$%&'*+/=?^`{|}~-]+)*$")
        .expect("local-part pattern is valid")
});

static DOMAIN_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\W_](?:(?:[^\W_]|-)*[^\W_])?$").expect("domain label pattern is valid")
});

/// An address that passed the syntax check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    /// Local part exactly as written
    pub local: String,
    /// Normalized domain
    pub domain: Domain,
}

/// Checks the basic syntax of `address` and extracts its domain.
///
/// Returns `None` when the address is malformed.
pub fn check_syntax(address: &str) -> Option<ParsedAddress> {
    let address = address.trim();
    if address.is_empty() || address.len() > MAX_ADDRESS_LEN {
        return None;
    }

    let (local, domain) = address.rsplit_once('@')?;
    if local.is_empty() || local.len() > MAX_LOCAL_LEN || !LOCAL_PART.is_match(local) {
        return None;
    }

    let domain = domain.strip_suffix('.').unwrap_or(domain);
    if !is_valid_domain(domain) {
        return None;
    }

    Some(ParsedAddress {
        local: local.to_string(),
        domain: Domain::parse(domain)?,
    })
}

fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > MAX_DOMAIN_LEN {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels
        .iter()
        .all(|label| label.len() <= MAX_LABEL_LEN && DOMAIN_LABEL.is_match(label));

    // an all-numeric TLD means this is an IP address, not a host name
    let tld_ok = labels
        .last()
        .is_some_and(|tld| !tld.chars().all(|c| c.is_ascii_digit()));

    labels_ok && tld_ok
}
