//! Rewrites JavaScript and TypeScript imports of WebAssembly binaries.
//!
//! A module system that only understands text modules cannot evaluate
//! `import wasm from './mod.wasm'`. This crate replaces such an import with
//! code that fetches the binary, instantiates it with the modules listed in
//! its import section, and binds the export table to the original name.
//!
//! ```no_run
//! use wasm_import_rewrite::{Dialect, has_wasm_imports, transform};
//!
//! let source = std::fs::read_to_string("src/main.ts")?;
//! if has_wasm_imports(&source, Dialect::Ts) {
//!     let rewritten = transform(&source, "src/main.ts", Dialect::Ts)?;
//!     println!("{rewritten}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![allow(
    clippy::missing_errors_doc, // error variants are documented on `Error`
    clippy::module_name_repetitions
)]

pub mod binary;
pub mod dialect;
pub mod error;
pub mod rewrite;
pub mod scan;

/// Test harness module for writing unit and integration tests.
///
/// This module is only available when running tests or when the
/// `test-harness` feature is enabled.
#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;

pub use binary::{CachedReader, DependencyReader, FsReader, module_dependencies};
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use rewrite::{Instantiation, TransformOptions, Transformer, transform};
pub use scan::has_wasm_imports;
