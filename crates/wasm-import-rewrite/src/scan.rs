//! Cheap check for whether a source file could contain a WASM import.
//!
//! Runs the tokenizer first. Every import specifier is a string literal
//! token, so when the token stream is unambiguous looking at string
//! literals alone never misses one; other strings ending in `.wasm` only
//! cost a wasted full transform.
//!
//! The tokenizer alone cannot tell a regex from a division, and a quote
//! inside a misread regex shifts every string after it. Token streams with a
//! `/`, a `<` or a template fall back to a module parse.

use memchr::{memchr, memmem};
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, FilePathMapping, SourceMap};
use swc_core::ecma::ast::{AssignOp, EsVersion, ModuleDecl, ModuleItem};
use swc_core::ecma::parser::StringInput;
use swc_core::ecma::parser::lexer::Lexer;
use swc_core::ecma::parser::token::{BinOpToken, Token};

use crate::Dialect;
use crate::rewrite::classify::{WASM_EXTENSION, is_wasm_specifier};

/// Whether `source` may import a WASM binary.
///
/// A `false` answer is definitive. Source the tokenizer or parser rejects
/// answers `true` so the full transform gets to report the error.
pub fn has_wasm_imports(source: &str, dialect: Dialect) -> bool {
    // Without the extension spelled out, or an escape that could spell it,
    // no string literal can end in it.
    if memmem::find(source.as_bytes(), WASM_EXTENSION.as_bytes()).is_none()
        && memchr(b'\\', source.as_bytes()).is_none()
    {
        return false;
    }

    let cm = SourceMap::new(FilePathMapping::empty());
    let fm = cm.new_source_file(FileName::Anon.into(), source.to_owned());
    let lexer = Lexer::new(dialect.syntax(), EsVersion::EsNext, StringInput::from(&*fm), None);

    let mut ambiguous = false;
    for token in lexer {
        match token.token {
            Token::Str { value, .. } if is_wasm_specifier(&value) => return true,
            Token::Error(err) => {
                tracing::trace!(error = ?err, "tokenizer error, assuming eligible");
                return true;
            }
            Token::BinOp(BinOpToken::Div | BinOpToken::Lt)
            | Token::AssignOp(AssignOp::DivAssign)
            | Token::Regex(..)
            | Token::JSXTagStart
            | Token::BackQuote => ambiguous = true,
            _ => {}
        }
    }

    ambiguous && imports_wasm(source, dialect)
}

/// Decide from the parsed module's import declarations.
fn imports_wasm(source: &str, dialect: Dialect) -> bool {
    let cm: Lrc<SourceMap> = Lrc::new(SourceMap::new(FilePathMapping::empty()));
    match crate::rewrite::parse(&cm, None, source, "<scan>", dialect) {
        Ok(module) => module.body.iter().any(|item| {
            matches!(
                item,
                ModuleItem::ModuleDecl(ModuleDecl::Import(decl))
                    if is_wasm_specifier(&decl.src.value)
            )
        }),
        Err(err) => {
            tracing::trace!(error = %err, "parse error, assuming eligible");
            true
        }
    }
}
