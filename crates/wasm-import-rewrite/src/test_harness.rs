//! Test harness for wasm-import-rewrite unit and integration tests
//!
//! This module is only available when running tests or when the
//! `test-harness` feature is enabled.
//!
//! # Example
//!
//! ```rust
//! use wasm_import_rewrite::test_harness::*;
//! use wasm_import_rewrite::{Dialect, Transformer};
//!
//! let reader = StaticReader::new(["./mod_bg.js"]);
//! let out = Transformer::with_reader(&reader)
//!     .transform("import wasm from './mod.wasm';", "src/main.js", Dialect::Js)
//!     .expect("Failed to transform");
//!
//! assert!(squash(&out).contains(&squash(r#"{ "./mod_bg.js": __wasm_dep0_wasm }"#)));
//! ```

#![allow(
    clippy::must_use_candidate,
    clippy::missing_panics_doc,
    clippy::uninlined_format_args
)]

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use swc_core::common::sync::Lrc;
use swc_core::common::{DUMMY_SP, FilePathMapping, SourceMap};
use swc_core::ecma::ast::{ImportDecl, Module, ModuleDecl, ModuleItem};

use crate::binary::DependencyReader;
use crate::{Dialect, Error, Result, rewrite};

thread_local! {
    static SOURCE_MAP: Lrc<SourceMap> = Lrc::new(SourceMap::new(FilePathMapping::empty()));
}

/// Parse WAT (WebAssembly Text) format to WASM binary
pub fn wat_to_wasm(wat: &str) -> Vec<u8> {
    wat::parse_str(wat).unwrap_or_else(|e| panic!("WAT parse error: {e}"))
}

/// Build a core module whose import section holds one function import per
/// `(module, name)` pair, in the given order.
pub fn wasm_importing(imports: &[(&str, &str)]) -> Vec<u8> {
    let mut wat = String::from("(module\n");
    for (module, name) in imports {
        wat.push_str(&format!("  (import {module:?} {name:?} (func))\n"));
    }
    wat.push(')');
    wat_to_wasm(&wat)
}

/// Parse `source` as a module under `dialect`, panicking on syntax errors.
///
/// Nodes keep spans into a per-thread source map shared with
/// [`print_items`], so parsed nodes can be printed again.
pub fn parse_module(source: &str, dialect: Dialect) -> Module {
    SOURCE_MAP.with(|cm| {
        rewrite::parse(cm, None, source, "test", dialect)
            .unwrap_or_else(|e| panic!("failed to parse {source:?}: {e}"))
    })
}

/// Parse a single TypeScript import declaration.
pub fn parse_import(source: &str) -> ImportDecl {
    let mut module = parse_module(source, Dialect::Ts);
    assert_eq!(module.body.len(), 1, "expected exactly one item in {source:?}");
    match module.body.remove(0) {
        ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) => decl,
        other => panic!("expected an import declaration, got {other:?}"),
    }
}

/// Print module items as source text.
pub fn print_items(items: Vec<ModuleItem>) -> String {
    let module = Module {
        span: DUMMY_SP,
        body: items,
        shebang: None,
    };
    SOURCE_MAP.with(|cm| {
        rewrite::print(cm, None, &module, "test").unwrap_or_else(|e| panic!("print error: {e}"))
    })
}

/// Drop all whitespace and unify quotes, so generated code can be compared
/// without depending on printer layout.
pub fn squash(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '\'' { '"' } else { c })
        .collect()
}

/// A [`DependencyReader`] answering every path with the same dependency
/// list, recording each path it is asked about.
#[derive(Debug, Default)]
pub struct StaticReader {
    dependencies: Vec<String>,
    missing: Vec<PathBuf>,
    calls: Mutex<Vec<PathBuf>>,
}

impl StaticReader {
    pub fn new<I>(dependencies: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Answer `path` with a not-found I/O error.
    #[must_use]
    pub fn missing(mut self, path: impl Into<PathBuf>) -> Self {
        self.missing.push(path.into());
        self
    }

    /// Every path read so far, in order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DependencyReader for StaticReader {
    fn read_dependencies(&self, path: &Path) -> Result<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_path_buf());
        if self.missing.iter().any(|m| m == path) {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source: ErrorKind::NotFound.into(),
            });
        }
        Ok(self.dependencies.clone())
    }
}

/// A temporary directory holding source files and binaries.
pub struct Fixture {
    dir: tempfile::TempDir,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `name` (relative to the fixture root), creating
    /// parent directories as needed.
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        std::fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    /// The file identifier a host would pass for `name`.
    pub fn file_id(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }
}
