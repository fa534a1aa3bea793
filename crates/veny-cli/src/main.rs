//! Binary entry point for the Veny compiler front-end.
//!
//! A thin driver: walk a source tree for `.veny` files, validate each
//! file's declared `package` against the directory it lives in, hand
//! the parsed files to `veny_core::compile`, and map whatever comes
//! back onto a process exit code. No incremental compilation, no
//! caching, no configuration beyond the single positional argument —
//! the driver is explicitly out of scope for the core's own design,
//! so it stays small.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use veny_core::ast::File;
use veny_core::error::{CompileError, ErrorCode};
use veny_core::lexer::Lexer;
use veny_core::parser::{ParseError, Parser as VenyParser};
use veny_core::resolver::SourceRoot;
use veny_core::source_map::FileSet;

/// Compiles a directory of Veny source files.
#[derive(Parser)]
#[command(name = "venyc", version, about = "Veny compiler front-end")]
struct Cli {
    /// Source root directory to compile (default: current directory).
    source_root: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let root = cli.source_root.unwrap_or_else(|| PathBuf::from("."));
    match run(&root) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.code())
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Every way the driver itself (as opposed to `veny-core`) can fail.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0} source file(s) failed to load, see messages above")]
    FileErrors(usize),
    #[error("source map overflow: {0}")]
    SourceMap(#[from] veny_core::source_map::SourceMapError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl CliError {
    fn code(&self) -> u8 {
        match self {
            CliError::FileErrors(_) => 2,
            CliError::SourceMap(_) => 3,
            CliError::Compile(err) => match err.code() {
                ErrorCode::Syntax => 4,
                ErrorCode::Import => 5,
                ErrorCode::Semantic => 6,
            },
        }
    }
}

fn run(root: &Path) -> Result<(), CliError> {
    let mut file_set = FileSet::new();
    let mut own_files = Vec::new();
    let mut fqcn_index: HashMap<String, (String, String)> = HashMap::new();
    let mut failures = 0usize;

    for path in discover_source_files(root) {
        let display_path = path.to_string_lossy().into_owned();

        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(err) => {
                tracing::error!(path = %display_path, %err, "failed to read source file");
                failures += 1;
                continue;
            }
        };

        let file = match parse_file(&mut file_set, &display_path, &source)? {
            Ok(file) => file,
            Err(err) => {
                tracing::error!(path = %display_path, %err, "parse failed");
                failures += 1;
                continue;
            }
        };

        let expected_package = derive_package_name(root, &path);
        if file.package != expected_package {
            tracing::error!(
                path = %display_path,
                declared = %file.package,
                expected = %expected_package,
                "declared package does not match its directory path",
            );
            failures += 1;
            continue;
        }

        for name in file.declared_type_names() {
            fqcn_index.insert(format!("{}.{name}", file.package), (display_path.clone(), source.clone()));
        }
        own_files.push(file);
    }

    let project_root = ProjectRoot { by_fqcn: fqcn_index };
    let roots: [&dyn SourceRoot; 1] = [&project_root];

    let program = veny_core::compile(&roots, own_files, &mut file_set)?;
    tracing::info!(files = program.files.len(), "compilation succeeded");

    if failures > 0 {
        return Err(CliError::FileErrors(failures));
    }
    Ok(())
}

/// Walks `root` for `.veny` files, sorted for deterministic output.
fn discover_source_files(root: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().and_then(|ext| ext.to_str()) == Some("veny"))
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();
    paths
}

/// The declared package a file at `path` (under `root`) must equal:
/// the relative *directory* path with separators replaced by `.`.
/// A file sitting directly at `root` has no directory component and
/// so must declare the empty package — which can never satisfy the
/// core's non-empty-package invariant, correctly forcing every file
/// into at least one subdirectory.
fn derive_package_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let dir = relative.parent().unwrap_or_else(|| Path::new(""));
    dir.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(".")
}

fn parse_file(file_set: &mut FileSet, path: &str, source: &str) -> Result<Result<File, ParseError>, CliError> {
    let idx = file_set.add_file(path.to_string(), source.len() as u32)?;
    file_set.get_mut(idx).expect("index just returned by add_file").populate_lines(source);

    let map = file_set.get(idx).expect("index just returned by add_file");
    let lexer = Lexer::new(source, map.base());
    let tokens = lexer.scan_tokens();
    let parser = VenyParser::new(tokens, map);
    Ok(parser.parse().map(|mut file| {
        file.path = Some(path.to_string());
        file
    }))
}

/// Indexes every type declared by the files this driver itself
/// discovered, by fully-qualified name, so the resolver can locate
/// them when an import reaches back into the same source tree. There
/// is no stdlib root or development override here — both are out of
/// scope for this driver — so an import the local tree can't satisfy
/// simply fails with `FileNotFound`.
struct ProjectRoot {
    by_fqcn: HashMap<String, (String, String)>,
}

impl SourceRoot for ProjectRoot {
    fn locate(&self, fqcn: &str) -> Option<(String, String)> {
        self.by_fqcn.get(fqcn).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn package_name_matches_relative_directory() {
        let root = PathBuf::from("/proj");
        let path = PathBuf::from("/proj/demo/App.veny");
        assert_eq!(derive_package_name(&root, &path), "demo");
    }

    #[test]
    fn nested_package_name_joins_with_dots() {
        let root = PathBuf::from("/proj");
        let path = PathBuf::from("/proj/demo/util/Helpers.veny");
        assert_eq!(derive_package_name(&root, &path), "demo.util");
    }

    #[test]
    fn root_level_file_has_empty_package() {
        let root = PathBuf::from("/proj");
        let path = PathBuf::from("/proj/App.veny");
        assert_eq!(derive_package_name(&root, &path), "");
    }

    #[test]
    fn discover_source_files_finds_veny_files_only() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("demo")).unwrap();
        fs::write(dir.path().join("demo/App.veny"), "package demo\n").unwrap();
        fs::write(dir.path().join("demo/notes.txt"), "ignore me\n").unwrap();

        let found = discover_source_files(dir.path());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_name().unwrap(), "App.veny");
    }

    #[test]
    fn successful_compilation_exits_zero() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("demo")).unwrap();
        fs::write(
            dir.path().join("demo/App.veny"),
            "package demo\nclass App { entry(args: [Text]) { } }\n",
        )
        .unwrap();

        assert!(run(dir.path()).is_ok());
    }

    #[test]
    fn package_mismatch_is_reported_as_a_file_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("demo")).unwrap();
        fs::write(
            dir.path().join("demo/App.veny"),
            "package wrong\nclass App { entry(args: [Text]) { } }\n",
        )
        .unwrap();

        let err = run(dir.path()).unwrap_err();
        assert!(matches!(err, CliError::FileErrors(1)));
    }

    #[test]
    fn cross_file_import_within_the_tree_resolves() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("demo")).unwrap();
        fs::create_dir(dir.path().join("lib")).unwrap();
        fs::write(
            dir.path().join("demo/App.veny"),
            "package demo\nimport lib.Greeter\nclass App { entry(args: [Text]) { } }\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("lib/Greeter.veny"),
            "package lib\nclass Greeter { entry(args: [Text]) { } }\n",
        )
        .unwrap();

        assert!(run(dir.path()).is_ok());
    }
}
