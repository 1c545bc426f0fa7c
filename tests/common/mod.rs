#![allow(unused_imports)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `fixtures`: module bytes, archives and package trees on disk
//! - `mocks`: a recording definer and counting injections
//! - `assertions`: assertion helpers with readable failure messages

pub mod assertions;
pub mod fixtures;
pub mod mocks;

pub use assertions::{assert_error_contains, assert_ok};
pub use fixtures::{module_bytes, test_module, write_archive, write_package_dir};
pub use mocks::{CountingInjection, DefinedModule, RecordingDefiner};
