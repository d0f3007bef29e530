use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot resolve '{specifier}' imported from {file}: {} does not exist", path.display())]
    Resolution {
        specifier: String,
        file: String,
        path: PathBuf,
    },

    #[error("Malformed WASM binary {}: {source}", path.display())]
    MalformedBinary {
        path: PathBuf,
        #[source]
        source: wasmparser::BinaryReaderError,
    },

    /// A well-formed binary using an encoding other than a core module
    /// (for example a component), which has no flat import table to read.
    #[error("Unsupported WASM binary {}: {reason}", path.display())]
    UnsupportedBinary { path: PathBuf, reason: String },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Syntax error in {file}:{line}:{column}: {message}")]
    Syntax {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Failed to print rewritten module {file}: {source}")]
    Emit {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether this error means the binary (or the file importing it) could
    /// not be found, as opposed to being found but unreadable.
    pub fn is_resolution(&self) -> bool {
        matches!(self, Error::Resolution { .. })
    }

    /// Whether the binary was found but could not be read as a core module.
    pub fn is_malformed_binary(&self) -> bool {
        matches!(
            self,
            Error::MalformedBinary { .. } | Error::UnsupportedBinary { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
