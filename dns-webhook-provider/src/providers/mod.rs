//! DNS provider client implementations

/// Shared utilities used by client implementations.
pub mod common;

#[cfg(feature = "edgecenter")]
mod edgecenter;

#[cfg(feature = "edgecenter")]
pub use edgecenter::EdgecenterClient;
