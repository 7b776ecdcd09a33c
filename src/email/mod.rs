//! Address syntax checking and domain normalization.
//!
//! Key items:
//! - [`check_syntax`] - basic address syntax check returning the extracted domain
//! - [`Domain`] - normalized, case-insensitive domain name

mod domain;
mod syntax;

pub use domain::{normalize_domain, Ancestors, Domain};
pub use syntax::{check_syntax, ParsedAddress};
