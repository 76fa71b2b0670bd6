//! # Codepage Testkit
//!
//! Test utilities for Codepage.
//!
//! This crate provides:
//! - A test site (pipeline plus HTTP handler) over in-memory or file storage
//! - Helpers that drive the edit form like a browser would
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use codepage_testkit::prelude::*;
//!
//! #[test]
//! fn saves_through_the_form() {
//!     let site = TestSite::memory();
//!     let id = site.published_page("Landing");
//!     let cookie = site.login(Role::Editor);
//!     site.submit(id, &cookie, &[("html_code", "<p>hi</p>")]);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use codepage_core::Role;
}

pub use fixtures::*;
pub use generators::*;
