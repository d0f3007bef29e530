use std::fmt;
use std::path::Path;

use swc_core::ecma::parser::{EsSyntax, Syntax, TsSyntax};

/// Grammar variant a source module is parsed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    Js,
    Jsx,
    Ts,
    Tsx,
    /// Fallback for unrecognized loader tags: plain script, no JSX or types.
    #[default]
    Generic,
}

impl Dialect {
    /// Map a host loader tag (`js`, `jsx`, `ts`, `tsx`) to a dialect.
    ///
    /// Anything else selects [`Dialect::Generic`].
    pub fn from_loader(tag: &str) -> Self {
        match tag {
            "js" | "mjs" | "cjs" => Dialect::Js,
            "jsx" => Dialect::Jsx,
            "ts" | "mts" | "cts" => Dialect::Ts,
            "tsx" => Dialect::Tsx,
            _ => Dialect::Generic,
        }
    }

    /// Dialect implied by a file's extension, if it names one.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match Self::from_loader(ext) {
            Dialect::Generic => None,
            dialect => Some(dialect),
        }
    }

    pub(crate) fn syntax(self) -> Syntax {
        match self {
            // `.js` files may hold JSX, as with the host's `js` loader.
            Dialect::Js | Dialect::Jsx => Syntax::Es(EsSyntax {
                jsx: true,
                import_attributes: true,
                ..EsSyntax::default()
            }),
            Dialect::Generic => Syntax::Es(EsSyntax {
                import_attributes: true,
                ..EsSyntax::default()
            }),
            Dialect::Ts => Syntax::Typescript(TsSyntax {
                decorators: true,
                ..TsSyntax::default()
            }),
            Dialect::Tsx => Syntax::Typescript(TsSyntax {
                tsx: true,
                decorators: true,
                ..TsSyntax::default()
            }),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Js => "js",
            Dialect::Jsx => "jsx",
            Dialect::Ts => "ts",
            Dialect::Tsx => "tsx",
            Dialect::Generic => "generic",
        })
    }
}
