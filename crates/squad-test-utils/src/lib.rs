//! Shared test fixtures for the AI Squad workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`source`]: [`TestSource`] builder for fake source stores
//! - [`target`]: [`TestTarget`] scratch project directory with assertions

pub mod source;
pub mod target;

pub use source::TestSource;
pub use target::TestTarget;
