//! Front-end for the Veny language: lexer, parser, import resolver,
//! and semantic analyzer.
//!
//! This crate stops at a type-checked `Program`. Code generation, the
//! runtime value model, and diagnostic rendering are the concern of
//! other crates (or, for now, simply don't exist yet) — see the
//! driver in `veny-cli` for how a caller walks a source tree and
//! turns these pieces into a compiled-or-rejected verdict.

pub mod analyzer;
pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod scope;
pub mod source_map;
pub mod symbol;
pub mod token;
pub mod types;

use std::rc::Rc;

use ast::{File, Program};
use error::CompileError;
use resolver::{AstCache, SourceRoot};
use scope::GlobalScope;
use source_map::FileSet;

/// Parses, resolves, and type-checks one compilation.
///
/// `own_files` are the files the driver has already discovered on
/// disk and run through its own lexer/parser pass, each with its
/// `path` set and already registered in `file_set` (see `veny_cli`'s
/// source-tree walk). This function registers their declared types,
/// resolves every import reachable from any of them against `roots`,
/// and runs the analyzer over the merged result.
pub fn compile(roots: &[&dyn SourceRoot], own_files: Vec<File>, file_set: &mut FileSet) -> Result<Program, CompileError> {
    let global = GlobalScope::new();
    let mut cache = AstCache::new();

    let mut files = Vec::with_capacity(own_files.len());
    let mut root_imports = Vec::new();
    for file in own_files {
        resolver::register_declared_types(&global, &file)?;
        root_imports.extend(file.imports.iter().cloned());
        let file_rc = Rc::new(file);
        if let Some(path) = &file_rc.path {
            cache.insert(path.clone(), file_rc.clone());
        }
        files.push(file_rc);
    }

    let discovered = resolver::resolve(roots, &global, &root_imports, file_set, &mut cache)?;
    files.extend(discovered);

    let program = Program { files };
    let errors = analyzer::Analyzer::new(global, file_set).analyze(&program);
    if !errors.is_empty() {
        return Err(CompileError::Semantic(errors));
    }
    Ok(program)
}
