//! Building the statements that replace a WASM import.
//!
//! For `import wasm from './mod.wasm'` where `mod.wasm` imports from
//! `./mod_bg.js`, streaming instantiation produces:
//!
//! ```text
//! import * as __wasm_dep0_wasm from "./mod_bg.js";
//! import __wasm_import_wasm from './mod.wasm';
//! const wasm = (await WebAssembly.instantiateStreaming(
//!     fetch(__wasm_import_wasm.default || __wasm_import_wasm),
//!     { "./mod_bg.js": __wasm_dep0_wasm },
//! )).instance.exports;
//! ```
//!
//! The rewritten import keeps its specifier: the host bundler treats the
//! binary as an asset and binds its served URL, which is then fetched.

use swc_core::common::{DUMMY_SP, SyntaxContext};
use swc_core::ecma::ast::{
    AwaitExpr, BinExpr, BinaryOp, BindingIdent, CallExpr, Callee, Decl, Expr, ExprOrSpread,
    Ident, IdentName, ImportDecl, ImportPhase, ImportSpecifier, ImportStarAsSpecifier,
    KeyValueProp, MemberExpr, MemberProp, ModuleDecl, ModuleExportName, ModuleItem, ObjectLit,
    ParenExpr, Pat, Prop, PropName, PropOrSpread, Stmt, Str, VarDecl, VarDeclKind,
    VarDeclarator,
};

use super::Instantiation;
use super::classify::{Binding, BindingKind};
use super::specifier::dependency_specifier;

/// Prefix of the identifier the rewritten import binds the binary's URL to.
pub const BINDING_PREFIX: &str = "__wasm_import_";
/// Prefix of the identifiers helper imports bind dependency modules to.
pub const DEPENDENCY_PREFIX: &str = "__wasm_dep";

/// A dependency module and the identifier its namespace is bound to.
struct DependencyImport<'a> {
    key: &'a str,
    ident: Ident,
    item: ModuleItem,
}

/// Replace `decl` with the statements that instantiate the binary it names.
///
/// `dependencies` are the module names from the binary's import section,
/// already de-duplicated. Identifiers are derived from the user's binding
/// and the dependency's position only, so two rewrites never share state.
pub fn synthesize(
    decl: ImportDecl,
    binding: &Binding,
    dependencies: &[String],
    instantiation: Instantiation,
) -> Vec<ModuleItem> {
    let local = &binding.local;
    let binary = decl.src.value.to_string();

    let dep_imports: Vec<DependencyImport<'_>> = match instantiation {
        Instantiation::Streaming => dependencies
            .iter()
            .enumerate()
            .map(|(index, key)| {
                let ident = ident(&format!("{DEPENDENCY_PREFIX}{index}_{}", local.sym));
                let item = namespace_import(ident.clone(), &dependency_specifier(&binary, key));
                DependencyImport { key, ident, item }
            })
            .collect(),
        Instantiation::CompileOnly => Vec::new(),
    };

    let internal = ident(&format!("{BINDING_PREFIX}{}", local.sym));
    let fetch = fetch_call(&internal);
    let value = match instantiation {
        Instantiation::Streaming => instance_exports(instantiate_streaming(fetch, &dep_imports)),
        Instantiation::CompileOnly => await_expr(call(
            member(Expr::Ident(ident("WebAssembly")), "compileStreaming"),
            vec![fetch],
        )),
    };

    let rewritten = rename_binding(decl, binding, internal);
    let declaration = const_decl(local.clone(), value);

    let mut items: Vec<ModuleItem> = dep_imports.into_iter().map(|dep| dep.item).collect();
    items.push(ModuleItem::ModuleDecl(ModuleDecl::Import(rewritten)));
    items.push(declaration);
    items
}

/// Point the chosen specifier of `decl` at `internal`, keeping its kind,
/// every other specifier, and the module specifier itself.
///
/// Other specifiers (`sub` in `{ add, sub }`, `raw` in `wasm, * as raw`)
/// keep binding whatever the host resolves the binary to, usually its URL.
/// Only the chosen binding is replaced by the export table.
fn rename_binding(mut decl: ImportDecl, binding: &Binding, internal: Ident) -> ImportDecl {
    let target = decl.specifiers.iter_mut().find(|specifier| match (specifier, binding.kind) {
        (ImportSpecifier::Default(s), BindingKind::Default) => s.local.sym == binding.local.sym,
        (ImportSpecifier::Namespace(s), BindingKind::Namespace) => s.local.sym == binding.local.sym,
        (ImportSpecifier::Named(s), BindingKind::Named) => s.local.sym == binding.local.sym,
        _ => false,
    });

    match target {
        Some(ImportSpecifier::Default(s)) => s.local = internal,
        Some(ImportSpecifier::Namespace(s)) => s.local = internal,
        Some(ImportSpecifier::Named(s)) => {
            // `{ add }` becomes `{ add as __wasm_import_add }`.
            if s.imported.is_none() {
                s.imported = Some(ModuleExportName::Ident(s.local.clone()));
            }
            s.local = internal;
        }
        None => {}
    }
    decl
}

fn ident(sym: &str) -> Ident {
    Ident::new(sym.into(), DUMMY_SP, SyntaxContext::empty())
}

fn str_lit(value: &str) -> Str {
    Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: None,
    }
}

fn member(obj: Expr, prop: &str) -> Expr {
    Expr::Member(MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(obj),
        prop: MemberProp::Ident(IdentName::new(prop.into(), DUMMY_SP)),
    })
}

fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        callee: Callee::Expr(Box::new(callee)),
        args: args
            .into_iter()
            .map(|expr| ExprOrSpread {
                spread: None,
                expr: Box::new(expr),
            })
            .collect(),
        type_args: None,
    })
}

fn await_expr(arg: Expr) -> Expr {
    Expr::Await(AwaitExpr {
        span: DUMMY_SP,
        arg: Box::new(arg),
    })
}

/// `import * as <ident> from "<specifier>"`
fn namespace_import(ident: Ident, specifier: &str) -> ModuleItem {
    ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
        span: DUMMY_SP,
        specifiers: vec![ImportSpecifier::Namespace(ImportStarAsSpecifier {
            span: DUMMY_SP,
            local: ident,
        })],
        src: Box::new(str_lit(specifier)),
        type_only: false,
        with: None,
        phase: ImportPhase::Evaluation,
    }))
}

/// `fetch(<internal>.default || <internal>)`
///
/// The host may bind the asset URL as the default export or as the module
/// namespace itself, depending on how the user wrote the import.
fn fetch_call(internal: &Ident) -> Expr {
    let url = Expr::Bin(BinExpr {
        span: DUMMY_SP,
        op: BinaryOp::LogicalOr,
        left: Box::new(member(Expr::Ident(internal.clone()), "default")),
        right: Box::new(Expr::Ident(internal.clone())),
    });
    call(Expr::Ident(ident("fetch")), vec![url])
}

/// `await WebAssembly.instantiateStreaming(<fetch>, { "<dep>": <ident>, ... })`
fn instantiate_streaming(fetch: Expr, deps: &[DependencyImport<'_>]) -> Expr {
    let import_object = Expr::Object(ObjectLit {
        span: DUMMY_SP,
        props: deps
            .iter()
            .map(|dep| {
                PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
                    key: PropName::Str(str_lit(dep.key)),
                    value: Box::new(Expr::Ident(dep.ident.clone())),
                })))
            })
            .collect(),
    });
    await_expr(call(
        member(Expr::Ident(ident("WebAssembly")), "instantiateStreaming"),
        vec![fetch, import_object],
    ))
}

/// `(<instantiate>).instance.exports`
fn instance_exports(instantiate: Expr) -> Expr {
    let parenthesized = Expr::Paren(ParenExpr {
        span: DUMMY_SP,
        expr: Box::new(instantiate),
    });
    member(member(parenthesized, "instance"), "exports")
}

fn const_decl(name: Ident, init: Expr) -> ModuleItem {
    ModuleItem::Stmt(Stmt::Decl(Decl::Var(Box::new(VarDecl {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        kind: VarDeclKind::Const,
        declare: false,
        decls: vec![VarDeclarator {
            span: DUMMY_SP,
            name: Pat::Ident(BindingIdent {
                id: name,
                type_ann: None,
            }),
            init: Some(Box::new(init)),
            definite: false,
        }],
    }))))
}
