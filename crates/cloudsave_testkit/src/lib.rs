//! # CloudSave Testkit
//!
//! Test utilities for CloudSave.
//!
//! This crate provides:
//! - Temporary on-disk stores and record fixtures
//! - Property-based test generators using proptest
//! - Wire vectors for the data-URI codec
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cloudsave_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_store() {
//!     with_temp_store("/_savedata", |store| {
//!         store.put("timestamp", &SaveRecord::new()).unwrap();
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use vectors::*;
