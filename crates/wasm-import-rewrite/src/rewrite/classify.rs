//! Deciding whether an import declaration targets a WASM binary and which
//! local name it binds.

use swc_core::ecma::ast::{Ident, ImportDecl, ImportNamedSpecifier, ImportPhase, ImportSpecifier};

/// Extension identifying a WASM binary specifier.
pub const WASM_EXTENSION: &str = ".wasm";

/// How the rewritten binding was written in the original clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `import foo from './m.wasm'`
    Default,
    /// `import * as foo from './m.wasm'`
    Namespace,
    /// `import { foo } from './m.wasm'`, first element only
    Named,
}

/// The clause of an import declaration, decided once.
#[derive(Debug)]
pub enum ImportClauseShape<'a> {
    Default(&'a Ident),
    Namespace(&'a Ident),
    NamedList(Vec<&'a ImportNamedSpecifier>),
    None,
}

impl<'a> ImportClauseShape<'a> {
    /// A default binding wins over a namespace binding (`import a, * as b`),
    /// and either wins over a named list.
    pub fn of(decl: &'a ImportDecl) -> Self {
        let mut namespace = None;
        let mut named = Vec::new();
        for specifier in &decl.specifiers {
            match specifier {
                ImportSpecifier::Default(d) => return ImportClauseShape::Default(&d.local),
                ImportSpecifier::Namespace(ns) => namespace = Some(&ns.local),
                ImportSpecifier::Named(n) => named.push(n),
            }
        }
        match namespace {
            Some(local) => ImportClauseShape::Namespace(local),
            None if named.is_empty() => ImportClauseShape::None,
            None => ImportClauseShape::NamedList(named),
        }
    }
}

/// The local binding an import will be rewritten around.
#[derive(Debug, Clone)]
pub struct Binding {
    pub local: Ident,
    pub kind: BindingKind,
}

#[derive(Debug, Clone)]
pub enum Classification {
    /// Not a WASM import, or one carrying a phase modifier.
    NotApplicable,
    /// A WASM import with no binding we know how to rebind.
    Unsupported,
    Rewritable(Binding),
}

pub fn is_wasm_specifier(specifier: &str) -> bool {
    specifier.ends_with(WASM_EXTENSION)
}

pub fn classify(decl: &ImportDecl) -> Classification {
    if !is_wasm_specifier(&decl.src.value) || !matches!(decl.phase, ImportPhase::Evaluation) {
        return Classification::NotApplicable;
    }
    // Type-only imports are erased before evaluation, so there is nothing to
    // instantiate.
    if decl.type_only {
        return Classification::Unsupported;
    }

    let (local, kind) = match ImportClauseShape::of(decl) {
        ImportClauseShape::Default(local) => (local, BindingKind::Default),
        ImportClauseShape::Namespace(local) => (local, BindingKind::Namespace),
        ImportClauseShape::NamedList(named) => match named.first() {
            Some(first) if !first.is_type_only => (&first.local, BindingKind::Named),
            _ => return Classification::Unsupported,
        },
        ImportClauseShape::None => return Classification::Unsupported,
    };

    Classification::Rewritable(Binding {
        local: local.clone(),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_harness::parse_import;

    fn binding(src: &str) -> Option<(String, BindingKind)> {
        match classify(&parse_import(src)) {
            Classification::Rewritable(b) => Some((b.local.sym.to_string(), b.kind)),
            _ => None,
        }
    }

    #[test]
    fn default_import() {
        assert_eq!(
            binding("import foo from './foo.wasm'"),
            Some(("foo".into(), BindingKind::Default))
        );
    }

    #[test]
    fn namespace_import() {
        assert_eq!(
            binding("import * as foo from '../pkg/foo_bg.wasm'"),
            Some(("foo".into(), BindingKind::Namespace))
        );
    }

    #[test]
    fn default_wins_over_namespace() {
        assert_eq!(
            binding("import foo, * as bar from './foo.wasm'"),
            Some(("foo".into(), BindingKind::Default))
        );
    }

    #[test]
    fn named_list_takes_first_element() {
        assert_eq!(
            binding("import { add, sub } from './math.wasm'"),
            Some(("add".into(), BindingKind::Named))
        );
        assert_eq!(
            binding("import { add as plus } from './math.wasm'"),
            Some(("plus".into(), BindingKind::Named))
        );
    }

    #[test]
    fn other_extensions_are_not_applicable() {
        for src in [
            "import foo from './foo.js'",
            "import foo from './foo.wasm.js'",
            "import foo from './foo.wat'",
            "import './foo.css'",
        ] {
            assert!(
                matches!(classify(&parse_import(src)), Classification::NotApplicable),
                "{src}"
            );
        }
    }

    #[test]
    fn bare_import_is_unsupported() {
        assert!(matches!(
            classify(&parse_import("import './foo.wasm'")),
            Classification::Unsupported
        ));
        assert!(matches!(
            classify(&parse_import("import {} from './foo.wasm'")),
            Classification::Unsupported
        ));
    }

    #[test]
    fn type_only_imports_are_unsupported() {
        assert!(matches!(
            classify(&parse_import("import type Foo from './foo.wasm'")),
            Classification::Unsupported
        ));
        assert!(matches!(
            classify(&parse_import("import { type Foo, bar } from './foo.wasm'")),
            Classification::Unsupported
        ));
    }

    #[test]
    fn phase_modified_import_is_not_applicable() {
        let mut decl = parse_import("import foo from './foo.wasm'");
        decl.phase = ImportPhase::Source;
        assert!(matches!(classify(&decl), Classification::NotApplicable));
        decl.phase = ImportPhase::Defer;
        assert!(matches!(classify(&decl), Classification::NotApplicable));
    }

    #[test]
    fn clause_shapes() {
        let decl = parse_import("import { a, b as c } from './x.wasm'");
        match ImportClauseShape::of(&decl) {
            ImportClauseShape::NamedList(named) => {
                let locals: Vec<_> = named.iter().map(|n| n.local.sym.to_string()).collect();
                assert_eq!(locals, ["a", "c"]);
            }
            other => panic!("unexpected shape {other:?}"),
        }
        let decl = parse_import("import './x.wasm'");
        assert!(matches!(ImportClauseShape::of(&decl), ImportClauseShape::None));
    }
}
