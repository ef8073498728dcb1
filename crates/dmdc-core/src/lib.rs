//! dmdc-core: stable foundation for the DMDc workspace.
//!
//! Contains:
//! - key (entity identifiers taken from the id column)

pub mod key;

// Re-exports: nice ergonomics for downstream crates
pub use key::EntityKey;
