//! Resolution of free-form "preferred doctor" answers to directory providers.
//!
//! Pipeline: strip title → exact match → substring match (either direction).
//! When nothing matches, [`suggest`] ranks providers by similarity for a
//! "did you mean" hint; it never selects on the client's behalf.

mod provider;

pub use provider::*;
