use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use wasm_import_rewrite::{Dialect, Instantiation, TransformOptions, Transformer};

#[derive(Parser)]
#[command(name = "wasm-import-rewrite")]
#[command(about = "Rewrite WASM imports in JavaScript/TypeScript modules into streaming instantiation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite the WASM imports of a source file
    Transform {
        #[arg(help = "Input JavaScript or TypeScript file")]
        input: PathBuf,

        #[arg(short, long, help = "Output file (defaults to stdout)")]
        output: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Loader tag: js, jsx, ts or tsx (defaults to the input extension)"
        )]
        loader: Option<String>,

        #[arg(
            long,
            help = "Emit WebAssembly.compileStreaming without wiring up the binary's imports"
        )]
        compile_only: bool,
    },
    /// Report whether a source file imports any WASM binary
    Scan {
        #[arg(help = "Input JavaScript or TypeScript file")]
        input: PathBuf,

        #[arg(short, long, help = "Loader tag: js, jsx, ts or tsx")]
        loader: Option<String>,
    },
    /// List the modules a WASM binary imports from
    Imports {
        #[arg(help = "Input WASM or WAT file")]
        input: PathBuf,

        #[arg(long, help = "Print a JSON array instead of one name per line")]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transform {
            input,
            output,
            loader,
            compile_only,
        } => {
            let source = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let dialect = dialect_for(&input, loader.as_deref());

            let rewritten = if wasm_import_rewrite::has_wasm_imports(&source, dialect) {
                let options = TransformOptions {
                    instantiation: if compile_only {
                        Instantiation::CompileOnly
                    } else {
                        Instantiation::Streaming
                    },
                };
                let file_id = input.to_string_lossy();
                let transformer = Transformer::new().with_options(options);
                tracing::debug!(
                    input = %input.display(),
                    %dialect,
                    instantiation = ?transformer.options().instantiation,
                    "transforming"
                );
                transformer
                    .transform(&source, &file_id, dialect)
                    .with_context(|| format!("Failed to transform {}", input.display()))?
            } else {
                tracing::debug!(input = %input.display(), "no WASM imports, copying through");
                source
            };

            match output {
                Some(path) => fs::write(&path, &rewritten)
                    .with_context(|| format!("Failed to write output to {}", path.display()))?,
                None => print!("{rewritten}"),
            }
        }
        Commands::Scan { input, loader } => {
            let source = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let dialect = dialect_for(&input, loader.as_deref());
            let eligible = wasm_import_rewrite::has_wasm_imports(&source, dialect);
            println!("{}: {}", input.display(), if eligible { "wasm" } else { "none" });
        }
        Commands::Imports { input, json } => {
            let wasm = read_wasm(&input)?;
            let deps = wasm_import_rewrite::module_dependencies(&wasm, &input)
                .with_context(|| format!("Failed to read imports of {}", input.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&deps)?);
            } else {
                for dep in deps {
                    println!("{dep}");
                }
            }
        }
    }

    Ok(())
}

/// An explicit loader tag wins; otherwise the extension decides, falling
/// back to the generic dialect.
fn dialect_for(input: &Path, loader: Option<&str>) -> Dialect {
    match loader {
        Some(tag) => Dialect::from_loader(tag),
        None => Dialect::from_path(input).unwrap_or_default(),
    }
}

fn read_wasm(path: &Path) -> Result<Vec<u8>> {
    let contents = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    if path.extension().is_some_and(|e| e == "wat") {
        wat::parse_bytes(&contents)
            .map(std::borrow::Cow::into_owned)
            .map_err(|e| anyhow::anyhow!("WAT parse error: {e}"))
    } else {
        Ok(contents)
    }
}
