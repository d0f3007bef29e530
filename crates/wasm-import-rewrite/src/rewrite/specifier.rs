//! Module specifier arithmetic.
//!
//! Specifiers are URL-like and always use `/`, so these work on strings
//! rather than `std::path` to keep the output identical on every host.

/// Directory part of a specifier, `.` when it has none.
pub fn dirname(specifier: &str) -> &str {
    match specifier.rfind('/') {
        Some(0) => "/",
        Some(idx) => &specifier[..idx],
        None => ".",
    }
}

/// Specifier for a binary's dependency, as seen from the importing file.
///
/// `dependency` is relative to the directory holding the binary, so it is
/// joined onto that directory. A binary in the importer's own directory
/// leaves the dependency name untouched.
pub fn dependency_specifier(binary: &str, dependency: &str) -> String {
    let dir = dirname(binary);
    if dir == "." {
        return dependency.to_string();
    }
    join(dir, dependency)
}

/// Join and normalize `dir` and `name`.
///
/// A relative `dir` yields a result that still starts with `./` or `../`
/// so it never turns into a bare package specifier.
fn join(dir: &str, name: &str) -> String {
    let absolute = dir.starts_with('/');
    let relative = dir.starts_with('.');

    let mut parts: Vec<&str> = Vec::new();
    for segment in dir.split('/').chain(name.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            segment => parts.push(segment),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if relative && joined != ".." && !joined.starts_with("../") {
        format!("./{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirname_of_specifiers() {
        assert_eq!(dirname("./mod.wasm"), ".");
        assert_eq!(dirname("mod.wasm"), ".");
        assert_eq!(dirname("../../rust/pkg/demo_bg.wasm"), "../../rust/pkg");
        assert_eq!(dirname("/mod.wasm"), "/");
        assert_eq!(dirname("/assets/mod.wasm"), "/assets");
    }

    #[test]
    fn same_directory_keeps_dependency_verbatim() {
        assert_eq!(dependency_specifier("./mod.wasm", "./mod_bg.js"), "./mod_bg.js");
        assert_eq!(dependency_specifier("mod.wasm", "env"), "env");
    }

    #[test]
    fn dependency_is_relative_to_the_binary() {
        assert_eq!(
            dependency_specifier("../../rust/pkg/demo_bg.wasm", "./demo_bg.js"),
            "../../rust/pkg/demo_bg.js"
        );
        assert_eq!(
            dependency_specifier("./pkg/demo_bg.wasm", "./demo_bg.js"),
            "./pkg/demo_bg.js"
        );
        assert_eq!(
            dependency_specifier("./pkg/demo_bg.wasm", "../glue.js"),
            "./glue.js"
        );
        assert_eq!(
            dependency_specifier("./pkg/demo_bg.wasm", "../../glue.js"),
            "../glue.js"
        );
    }

    #[test]
    fn absolute_binary_directory() {
        assert_eq!(dependency_specifier("/assets/m.wasm", "./m_bg.js"), "/assets/m_bg.js");
        assert_eq!(dependency_specifier("/m.wasm", "./m_bg.js"), "/m_bg.js");
        assert_eq!(dependency_specifier("/m.wasm", "../m_bg.js"), "/m_bg.js");
    }

    #[test]
    fn bare_binary_directory_stays_bare() {
        assert_eq!(dependency_specifier("pkg/m.wasm", "./m_bg.js"), "pkg/m_bg.js");
    }
}
