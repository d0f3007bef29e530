//! Reading the import table of a core WASM module.
//!
//! Only the import section is interpreted. Every other section is walked
//! far enough for `wasmparser` to check its framing (so truncated or
//! mis-sized binaries are rejected) but its contents are never decoded or
//! validated.

mod cache;

use std::collections::HashSet;
use std::path::Path;

use wasmparser::{Encoding, Parser, Payload};

use crate::{Error, Result};

pub use cache::CachedReader;

/// Source of the dependency names declared by a WASM binary.
///
/// The rewriter only ever asks for the names of the modules a binary
/// imports from, so anything able to answer that for a resolved path can
/// stand in for the filesystem.
pub trait DependencyReader {
    /// Return the distinct module names imported by the binary at `path`,
    /// in order of first occurrence in its import section.
    fn read_dependencies(&self, path: &Path) -> Result<Vec<String>>;
}

impl<R: DependencyReader + ?Sized> DependencyReader for &R {
    fn read_dependencies(&self, path: &Path) -> Result<Vec<String>> {
        (**self).read_dependencies(path)
    }
}

impl<R: DependencyReader + ?Sized> DependencyReader for std::sync::Arc<R> {
    fn read_dependencies(&self, path: &Path) -> Result<Vec<String>> {
        (**self).read_dependencies(path)
    }
}

/// Reads binaries straight from disk on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl DependencyReader for FsReader {
    fn read_dependencies(&self, path: &Path) -> Result<Vec<String>> {
        let wasm = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = wasm.len(), "reading WASM imports");
        module_dependencies(&wasm, path)
    }
}

/// Collect the de-duplicated module names from the import section of `wasm`.
///
/// `origin` is only used to label errors.
pub fn module_dependencies(wasm: &[u8], origin: &Path) -> Result<Vec<String>> {
    let malformed = |source| Error::MalformedBinary {
        path: origin.to_path_buf(),
        source,
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut modules = Vec::new();

    for payload in Parser::new(0).parse_all(wasm) {
        match payload.map_err(malformed)? {
            Payload::Version { encoding, .. } => {
                if matches!(encoding, Encoding::Component) {
                    return Err(Error::UnsupportedBinary {
                        path: origin.to_path_buf(),
                        reason: "components have no core import section".to_string(),
                    });
                }
            }
            Payload::ImportSection(reader) => {
                for import in reader {
                    let import = import.map_err(malformed)?;
                    if seen.insert(import.module) {
                        modules.push(import.module.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_harness::wasm_importing;

    fn deps(wasm: &[u8]) -> Result<Vec<String>> {
        module_dependencies(wasm, Path::new("test.wasm"))
    }

    #[test]
    fn module_without_imports_has_no_dependencies() {
        let wasm = wat::parse_str("(module (func (export \"add\")))").unwrap();
        assert!(deps(&wasm).unwrap().is_empty());
    }

    #[test]
    fn dependencies_are_deduplicated_in_first_occurrence_order() {
        let wasm = wasm_importing(&[
            ("./b.js", "x"),
            ("./a.js", "y"),
            ("./b.js", "z"),
            ("./a.js", "w"),
        ]);
        assert_eq!(deps(&wasm).unwrap(), vec!["./b.js", "./a.js"]);
    }

    #[test]
    fn non_function_imports_count_as_dependencies() {
        let wasm = wat::parse_str(
            r#"(module
                (import "env" "memory" (memory 1))
                (import "./glue.js" "g" (global i32))
                (import "env" "table" (table 1 funcref)))"#,
        )
        .unwrap();
        assert_eq!(deps(&wasm).unwrap(), vec!["env", "./glue.js"]);
    }

    #[test]
    fn bad_magic_is_malformed() {
        let err = deps(b"\0asx\x01\0\0\0").unwrap_err();
        assert!(err.is_malformed_binary(), "{err}");
    }

    #[test]
    fn empty_input_is_malformed() {
        let err = deps(&[]).unwrap_err();
        assert!(matches!(err, Error::MalformedBinary { .. }), "{err}");
    }

    #[test]
    fn truncated_import_section_is_malformed() {
        let wasm = wasm_importing(&[("./a.js", "f")]);
        let err = deps(&wasm[..wasm.len() - 3]).unwrap_err();
        assert!(matches!(err, Error::MalformedBinary { .. }), "{err}");
    }

    #[test]
    fn component_binaries_are_rejected() {
        let wasm = wat::parse_str("(component)").unwrap();
        let err = deps(&wasm).unwrap_err();
        assert!(matches!(err, Error::UnsupportedBinary { .. }), "{err}");
    }

    #[test]
    fn fs_reader_reports_missing_files_as_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsReader
            .read_dependencies(&dir.path().join("missing.wasm"))
            .unwrap_err();
        match err {
            Error::Io { source, .. } => assert_eq!(source.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }
}
