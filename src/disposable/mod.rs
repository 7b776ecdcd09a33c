//! Disposable email domain lists.
//!
//! This module keeps the merged set of disposable domains:
//! - A community-maintained remote list, cached in the storage directory
//! - A per-install custom list, created empty on first use
//! - An optional override list supplied for a single run
//!
//! Lookups match the domain itself or any parent domain, so listing
//! `evil.com` also catches `mail.evil.com`.

mod set;
mod source;
mod store;

// Re-export public API
pub use set::{parse_line, parse_list, DisposableSet};
pub use source::{DisposableDomainSource, DisposableSettings, RefreshReport};
pub use store::{ListStore, RemoteListMetadata};

#[cfg(test)]
mod tests;
