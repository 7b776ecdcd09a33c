//! Mail exchanger (MX) reachability checks.
//!
//! This module answers "can this domain receive mail?":
//! - [`MxLookup`] - a single MX query, implemented over `hickory-resolver`
//! - [`MxResolver`] - admission gate, per-query timeout and jittered retries
//!
//! Every failure resolves to "no MX"; nothing is propagated to the caller.

mod lookup;
mod resolver;
mod retry;

// Re-export public API
pub use lookup::{HickoryMxLookup, MxLookup};
pub use resolver::{MxResolver, MxSettings};
