pub mod classify;
pub mod specifier;
pub mod synthesize;
mod tree;

use std::path::Path;

use swc_core::common::comments::{Comments, SingleThreadedComments};
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, FilePathMapping, SourceMap, Spanned};
use swc_core::ecma::ast::{EsVersion, Module};
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::codegen::{Config, Emitter};
use swc_core::ecma::parser::parse_file_as_module;

use crate::binary::{DependencyReader, FsReader};
use crate::{Dialect, Error, Result};

use tree::ModuleRewriter;

/// Which WebAssembly JS API the generated declaration calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Instantiation {
    /// `WebAssembly.instantiateStreaming` with an import object built from
    /// the binary's import section. The bound name holds the export table.
    #[default]
    Streaming,
    /// `WebAssembly.compileStreaming` without imports. The bound name holds
    /// an uninstantiated `WebAssembly.Module`, and the binary is never read.
    CompileOnly,
}

/// Options controlling how imports are rewritten.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    pub instantiation: Instantiation,
}

/// Rewrites WASM imports in source modules.
///
/// Holds no per-file state: one `Transformer` can serve any number of files,
/// from any number of threads when `R` allows it.
#[derive(Debug, Clone, Default)]
pub struct Transformer<R = FsReader> {
    reader: R,
    options: TransformOptions,
}

impl Transformer<FsReader> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: DependencyReader> Transformer<R> {
    pub fn with_reader(reader: R) -> Self {
        Self {
            reader,
            options: TransformOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: TransformOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Rewrite every WASM import in `source`.
    ///
    /// `file_id` is the path of the importing file; WASM specifiers are
    /// resolved against its directory. When nothing is rewritten the input
    /// is returned byte-for-byte, otherwise the whole module is reprinted.
    pub fn transform(&self, source: &str, file_id: &str, dialect: Dialect) -> Result<String> {
        let cm: Lrc<SourceMap> = Lrc::new(SourceMap::new(FilePathMapping::empty()));
        let comments = SingleThreadedComments::default();
        let module = parse(&cm, Some(&comments), source, file_id, dialect)?;

        let base_dir = Path::new(file_id).parent().unwrap_or_else(|| Path::new(""));
        let rewriter = ModuleRewriter {
            reader: &self.reader,
            file_id,
            base_dir,
            instantiation: self.options.instantiation,
        };

        let Module {
            span,
            body,
            shebang,
        } = module;
        let (body, rewritten) = rewriter.rewrite_items(body)?;
        if rewritten == 0 {
            return Ok(source.to_owned());
        }

        tracing::debug!(file = file_id, %dialect, rewritten, "printing rewritten module");
        let module = Module {
            span,
            body,
            shebang,
        };
        print(&cm, Some(&comments), &module, file_id)
    }
}

/// Rewrite `source` with the default options, reading binaries from disk.
pub fn transform(source: &str, file_id: &str, dialect: Dialect) -> Result<String> {
    Transformer::new().transform(source, file_id, dialect)
}

/// Parse `source` as a module. Any diagnostic, including ones the parser
/// recovered from, fails the parse.
pub(crate) fn parse(
    cm: &Lrc<SourceMap>,
    comments: Option<&dyn Comments>,
    source: &str,
    file_id: &str,
    dialect: Dialect,
) -> Result<Module> {
    let fm = cm.new_source_file(
        FileName::Custom(file_id.to_owned()).into(),
        source.to_owned(),
    );
    let mut recovered = Vec::new();
    let parsed = parse_file_as_module(
        &fm,
        dialect.syntax(),
        EsVersion::EsNext,
        comments,
        &mut recovered,
    );

    let module = parsed.map_err(|err| syntax_error(cm, file_id, &err))?;
    if let Some(err) = recovered.first() {
        return Err(syntax_error(cm, file_id, err));
    }
    Ok(module)
}

fn syntax_error(cm: &SourceMap, file_id: &str, err: &swc_core::ecma::parser::error::Error) -> Error {
    let span = err.span();
    let (line, column) = if span.is_dummy() {
        (0, 0)
    } else {
        let loc = cm.lookup_char_pos(span.lo);
        (loc.line, loc.col_display + 1)
    };
    Error::Syntax {
        file: file_id.to_owned(),
        line,
        column,
        message: err.kind().msg().into_owned(),
    }
}

/// Print `module` with `\n` line endings.
pub(crate) fn print(
    cm: &Lrc<SourceMap>,
    comments: Option<&dyn Comments>,
    module: &Module,
    file_id: &str,
) -> Result<String> {
    let emit_error = |source| Error::Emit {
        file: file_id.to_owned(),
        source,
    };

    let mut buf = Vec::new();
    {
        let mut emitter = Emitter {
            cfg: Config::default().with_target(EsVersion::EsNext),
            cm: cm.clone(),
            comments,
            wr: JsWriter::new(cm.clone(), "\n", &mut buf, None),
        };
        emitter.emit_module(module).map_err(emit_error)?;
    }

    String::from_utf8(buf)
        .map_err(|err| emit_error(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}
