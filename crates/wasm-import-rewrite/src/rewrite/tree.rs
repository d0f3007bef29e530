use std::io::ErrorKind;
use std::path::Path;

use swc_core::ecma::ast::{ModuleDecl, ModuleItem};

use super::Instantiation;
use super::classify::{Classification, classify};
use super::synthesize::synthesize;
use crate::binary::DependencyReader;
use crate::{Error, Result};

/// Rewrites the WASM imports of one module.
///
/// Import declarations are only legal at the top level of a module, so the
/// item list is the whole search space; everything that is not a matching
/// import is moved into the output untouched.
pub(crate) struct ModuleRewriter<'a, R> {
    pub reader: &'a R,
    /// Identifier of the importing file, for diagnostics.
    pub file_id: &'a str,
    /// Directory WASM specifiers are resolved against.
    pub base_dir: &'a Path,
    pub instantiation: Instantiation,
}

impl<R: DependencyReader> ModuleRewriter<'_, R> {
    /// Rebuild `items` with every rewritable WASM import replaced by its
    /// statement group. Returns the new items and the number of imports
    /// replaced.
    pub fn rewrite_items(&self, items: Vec<ModuleItem>) -> Result<(Vec<ModuleItem>, usize)> {
        let mut out = Vec::with_capacity(items.len());
        let mut rewritten = 0;

        for item in items {
            let decl = match item {
                ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) => decl,
                other => {
                    out.push(other);
                    continue;
                }
            };

            match classify(&decl) {
                Classification::Rewritable(binding) => {
                    let dependencies = match self.instantiation {
                        Instantiation::Streaming => self.dependencies(&decl.src.value)?,
                        Instantiation::CompileOnly => Vec::new(),
                    };
                    tracing::debug!(
                        file = self.file_id,
                        specifier = %decl.src.value,
                        local = %binding.local.sym,
                        dependencies = dependencies.len(),
                        "rewriting WASM import"
                    );
                    out.extend(synthesize(decl, &binding, &dependencies, self.instantiation));
                    rewritten += 1;
                }
                Classification::Unsupported => {
                    tracing::trace!(
                        file = self.file_id,
                        specifier = %decl.src.value,
                        "WASM import has no rebindable local, leaving as is"
                    );
                    out.push(ModuleItem::ModuleDecl(ModuleDecl::Import(decl)));
                }
                Classification::NotApplicable => {
                    out.push(ModuleItem::ModuleDecl(ModuleDecl::Import(decl)));
                }
            }
        }

        Ok((out, rewritten))
    }

    fn dependencies(&self, specifier: &str) -> Result<Vec<String>> {
        let path = self.base_dir.join(specifier);
        self.reader.read_dependencies(&path).map_err(|err| match err {
            Error::Io { path, source } if source.kind() == ErrorKind::NotFound => {
                Error::Resolution {
                    specifier: specifier.to_string(),
                    file: self.file_id.to_string(),
                    path,
                }
            }
            other => other,
        })
    }
}
