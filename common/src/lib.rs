//! Shared plumbing for the hostbridge workspace.
//!
//! This crate contains the pieces every other crate leans on but that
//! carry no bridge semantics of their own. Today that is the error
//! location machinery used by all `thiserror` enums in the workspace.

pub mod error;

pub use error::error_location::ErrorLocation;

#[cfg(test)]
mod tests;
