//! Property-based tests for the import rewriter.
//!
//! Uses `proptest` to generate random modules and verify invariants:
//! - The pre-check never says "no" for a module the transform would change
//! - Modules without rewritable WASM imports come back byte-for-byte
//! - Every rewritable import yields exactly one instantiation
//! - Dependency names come back de-duplicated in first-occurrence order

use std::collections::HashSet;
use std::path::Path;

use proptest::prelude::*;
use wasm_import_rewrite::test_harness::*;
use wasm_import_rewrite::{Dialect, Transformer, has_wasm_imports, module_dependencies};

#[derive(Debug, Clone)]
enum Item {
    DefaultImport(String),
    NamespaceImport(String),
    BareImport(String),
    Const(i32),
    Call,
    Comment(String),
    Template(String),
    QuoteRegex,
}

fn specifier() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("./"), Just("../"), Just("./pkg/"), Just("")],
        "[a-z_]{1,8}",
        prop_oneof![Just(".js"), Just(".wasm"), Just(".wasm.js"), Just(".css"), Just(".wat")],
    )
        .prop_map(|(dir, name, ext)| format!("{dir}{name}{ext}"))
}

fn item() -> impl Strategy<Value = Item> {
    prop_oneof![
        specifier().prop_map(Item::DefaultImport),
        specifier().prop_map(Item::NamespaceImport),
        specifier().prop_map(Item::BareImport),
        any::<i32>().prop_map(Item::Const),
        Just(Item::Call),
        specifier().prop_map(Item::Comment),
        specifier().prop_map(Item::Template),
        Just(Item::QuoteRegex),
    ]
}

/// Render items as a module, with identifiers numbered by position so
/// bindings never clash.
fn render(items: &[Item]) -> String {
    let mut src = String::new();
    for (i, item) in items.iter().enumerate() {
        let line = match item {
            Item::DefaultImport(s) => format!("import x{i} from '{s}';"),
            Item::NamespaceImport(s) => format!("import * as x{i} from \"{s}\";"),
            Item::BareImport(s) => format!("import '{s}';"),
            Item::Const(v) => format!("const c{i} = {v} ;"),
            Item::Call => format!("console.log(  {i} )"),
            Item::Comment(s) => format!("// {s}"),
            Item::Template(s) => format!("const t{i} = `{s}`;"),
            Item::QuoteRegex => format!("if (c) /'/.test(\"{i}\");"),
        };
        src.push_str(&line);
        src.push('\n');
    }
    src
}

fn rewritable(items: &[Item]) -> usize {
    items
        .iter()
        .filter(|item| match item {
            Item::DefaultImport(s) | Item::NamespaceImport(s) => s.ends_with(".wasm"),
            _ => false,
        })
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn precheck_has_no_false_negatives(items in prop::collection::vec(item(), 0..12)) {
        let src = render(&items);
        let reader = StaticReader::new(["./glue.js"]);
        let out = Transformer::with_reader(&reader)
            .transform(&src, "src/main.js", Dialect::Js)
            .expect("generated module should transform");

        if out != src {
            prop_assert!(has_wasm_imports(&src, Dialect::Js), "missed:\n{src}");
        }
        if !has_wasm_imports(&src, Dialect::Js) {
            prop_assert_eq!(&out, &src);
            prop_assert!(reader.calls().is_empty());
        }
    }

    #[test]
    fn one_instantiation_per_rewritable_import(items in prop::collection::vec(item(), 0..12)) {
        let src = render(&items);
        let reader = StaticReader::new(["./glue.js", "env"]);
        let out = Transformer::with_reader(&reader)
            .transform(&src, "src/main.js", Dialect::Js)
            .expect("generated module should transform");

        let expected = rewritable(&items);
        prop_assert_eq!(out.matches("WebAssembly.instantiateStreaming").count(), expected);
        prop_assert_eq!(reader.calls().len(), expected);
        if expected == 0 {
            prop_assert_eq!(&out, &src);
        }
        let squashed = squash(&out);
        for (i, item) in items.iter().enumerate() {
            if let Item::DefaultImport(s) | Item::NamespaceImport(s) = item
                && s.ends_with(".wasm")
            {
                let decl = squash(&format!("const x{i} = (await WebAssembly.instantiateStreaming("));
                prop_assert!(squashed.contains(&decl), "missing binding for x{}:\n{}", i, out);
            }
        }
    }

    #[test]
    fn transform_is_deterministic(items in prop::collection::vec(item(), 0..12)) {
        let src = render(&items);
        let reader = StaticReader::new(["./a.js", "./b.js"]);
        let transformer = Transformer::with_reader(&reader);
        let first = transformer.transform(&src, "main.ts", Dialect::Ts).expect("transform");
        let second = transformer.transform(&src, "main.ts", Dialect::Ts).expect("transform");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn dependencies_are_deduplicated(modules in prop::collection::vec(0u8..5, 0..16)) {
        let imports: Vec<(String, String)> = modules
            .iter()
            .enumerate()
            .map(|(i, m)| (format!("./m{m}.js"), format!("f{i}")))
            .collect();
        let pairs: Vec<(&str, &str)> = imports
            .iter()
            .map(|(module, name)| (module.as_str(), name.as_str()))
            .collect();
        let wasm = wasm_importing(&pairs);

        let mut seen = HashSet::new();
        let expected: Vec<String> = imports
            .iter()
            .filter(|(module, _)| seen.insert(module.clone()))
            .map(|(module, _)| module.clone())
            .collect();

        let deps = module_dependencies(&wasm, Path::new("gen.wasm")).expect("valid binary");
        prop_assert_eq!(deps, expected);
    }
}
