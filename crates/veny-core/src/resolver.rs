//! Import resolution: turns a worklist of `package.Type` references
//! into fully-parsed files and placeholder symbols in the global
//! scope, ready for the semantic analyzer to fill in.
//!
//! File-system access is out of scope here — see [`SourceRoot`]. This
//! module only knows how to ask "does some root have source for this
//! name", never how that source is actually stored.

use std::collections::HashMap;
use std::collections::HashSet;
use std::rc::Rc;

use crate::ast::{File, Visibility};
use crate::lexer::Lexer;
use crate::parser::{ParseError, Parser};
use crate::scope::{GlobalScope, Scope};
use crate::source_map::{FileSet, SourceMapError};
use crate::symbol::{ClassSymbol, InterfaceSymbol, Symbol};

/// A place the resolver can ask for Veny source by fully-qualified
/// name. Implemented by the driver (walking a directory tree, reading
/// packaged stdlib resources, consulting a development override
/// root); the resolver never touches a filesystem directly.
pub trait SourceRoot {
    /// Returns `(cache_key, source_text)` for `fqcn` if this root
    /// provides it. `cache_key` is typically the file path and is
    /// what the shared AST cache and cycle detection key on.
    fn locate(&self, fqcn: &str) -> Option<(String, String)>;
}

#[derive(Debug, thiserror::Error)]
pub enum ImportResolutionError {
    #[error("cannot locate source for `{fqcn}`")]
    FileNotFound { fqcn: String },
    #[error("failed to parse `{path}`")]
    ParseFailed { path: String, #[source] source: ParseError },
    #[error("duplicate class: `{fqcn}` is already defined")]
    DuplicateFqcn { fqcn: String },
    #[error("circular import detected: {cycle}")]
    CircularImport { cycle: String },
    #[error("malformed import `{import}`: expected `package.Type`")]
    MalformedImport { import: String },
    #[error("source map overflow while registering `{path}`")]
    SourceMapOverflow { path: String },
}

/// The shared `path -> File` cache: every file is parsed at most once
/// across the resolver, the driver's own initial parse pass, and the
/// analyzer.
#[derive(Default)]
pub struct AstCache {
    by_path: HashMap<String, Rc<File>>,
}

impl AstCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Rc<File>> {
        self.by_path.get(path).cloned()
    }

    pub fn insert(&mut self, path: impl Into<String>, file: Rc<File>) {
        self.by_path.insert(path.into(), file);
    }

    fn paths(&self) -> impl Iterator<Item = &String> {
        self.by_path.keys()
    }
}

struct ResolveContext<'r> {
    roots: &'r [&'r dyn SourceRoot],
    global_scope: &'r Rc<GlobalScope>,
    file_set: &'r mut FileSet,
    cache: &'r mut AstCache,
    /// Paths on the current import chain, not yet fully resolved —
    /// re-encountering one of these is a cycle.
    active: HashSet<String>,
    done: HashSet<String>,
    discovered: Vec<Rc<File>>,
}

/// Resolves every `(package, type)` pair reachable from `root_imports`,
/// parsing each defining file at most once and registering a
/// placeholder `ClassSymbol`/`InterfaceSymbol` for each declared type
/// in `global_scope`. Returns the files discovered this way (in
/// resolution order), for the driver to fold into the `Program` the
/// analyzer will visit.
///
/// Resolution follows each import chain to completion before moving
/// to the next (depth-first) rather than a flat FIFO queue: a flat
/// queue can only ever observe one in-flight file at a time, which
/// cannot detect a mutual-import cycle (`A` imports `B` imports `A`)
/// since by the time `B`'s queue entry re-enqueues `A`, the original
/// `A` has already finished and is marked done, not in-progress. A
/// depth-first active-path set keeps every ancestor in the current
/// chain marked in-progress for the whole time its descendants are
/// being resolved, so the cycle is caught exactly when it closes.
///
/// `cache` may already hold entries the caller registered itself
/// (e.g. the driver's own pre-parsed files, whose declared types are
/// registered before this function is ever called). Those paths are
/// seeded into `done` up front so an import chain that loops back to
/// one of them short-circuits like any other already-resolved file,
/// rather than re-running `register_declared_types` and tripping a
/// spurious `DuplicateFqcn`.
pub fn resolve(
    roots: &[&dyn SourceRoot],
    global_scope: &Rc<GlobalScope>,
    root_imports: &[String],
    file_set: &mut FileSet,
    cache: &mut AstCache,
) -> Result<Vec<Rc<File>>, ImportResolutionError> {
    let seeded_done: HashSet<String> = cache.paths().cloned().collect();
    let mut ctx = ResolveContext {
        roots,
        global_scope,
        file_set,
        cache,
        active: HashSet::new(),
        done: seeded_done,
        discovered: Vec::new(),
    };
    for fqcn in root_imports {
        resolve_one(&mut ctx, fqcn)?;
    }
    Ok(ctx.discovered)
}

fn resolve_one(ctx: &mut ResolveContext<'_>, fqcn: &str) -> Result<(), ImportResolutionError> {
    validate_fqcn_shape(fqcn)?;
    let (path, source) = locate(ctx.roots, fqcn)?;

    if ctx.done.contains(&path) {
        return Ok(());
    }
    if ctx.active.contains(&path) {
        return Err(ImportResolutionError::CircularImport {
            cycle: format!("{path} (reached again via `{fqcn}`)"),
        });
    }
    ctx.active.insert(path.clone());

    let file_rc = match ctx.cache.get(&path) {
        Some(cached) => cached,
        None => {
            let file = parse_source(&path, &source, ctx.file_set)?;
            let file_rc = Rc::new(file);
            ctx.cache.insert(path.clone(), file_rc.clone());
            ctx.discovered.push(file_rc.clone());
            file_rc
        }
    };

    register_declared_types(ctx.global_scope, &file_rc)?;

    for import in &file_rc.imports {
        resolve_one(ctx, import)?;
    }

    ctx.active.remove(&path);
    ctx.done.insert(path);
    Ok(())
}

fn locate(roots: &[&dyn SourceRoot], fqcn: &str) -> Result<(String, String), ImportResolutionError> {
    for root in roots {
        if let Some(found) = root.locate(fqcn) {
            return Ok(found);
        }
    }
    Err(ImportResolutionError::FileNotFound { fqcn: fqcn.to_string() })
}

fn validate_fqcn_shape(fqcn: &str) -> Result<(), ImportResolutionError> {
    match fqcn.rsplit_once('.') {
        Some((package, type_name)) if !package.is_empty() && !type_name.is_empty() => Ok(()),
        _ => Err(ImportResolutionError::MalformedImport { import: fqcn.to_string() }),
    }
}

fn parse_source(path: &str, source: &str, file_set: &mut FileSet) -> Result<File, ImportResolutionError> {
    let idx = file_set
        .add_file(path.to_string(), source.len() as u32)
        .map_err(|_: SourceMapError| ImportResolutionError::SourceMapOverflow { path: path.to_string() })?;
    file_set.get_mut(idx).expect("index just returned by add_file").populate_lines(source);

    let map = file_set.get(idx).expect("index just returned by add_file");
    let lexer = Lexer::new(source, map.base());
    let tokens = lexer.scan_tokens();
    let parser = Parser::new(tokens, map);
    let mut file = parser
        .parse()
        .map_err(|source| ImportResolutionError::ParseFailed { path: path.to_string(), source })?;
    file.path = Some(path.to_string());
    Ok(file)
}

/// Registers a placeholder symbol for each class/interface this file
/// declares. Placeholders start with an empty member map; the
/// analyzer fills those in when it later visits this same file's
/// declarations (the `Rc<ClassSymbol>` is shared, not replaced).
///
/// `pub(crate)` rather than private: the pipeline entry point in
/// `lib.rs` calls this directly for the driver's own initially-loaded
/// files, which never go through `resolve_one` since they aren't
/// reached via an import.
pub(crate) fn register_declared_types(global_scope: &Rc<GlobalScope>, file: &File) -> Result<(), ImportResolutionError> {
    let scope_dyn: Rc<dyn Scope> = global_scope.clone();

    for class in &file.classes {
        let fqcn = format!("{}.{}", file.package, class.name);
        if global_scope.resolve_fqcn(&fqcn).is_some() {
            return Err(ImportResolutionError::DuplicateFqcn { fqcn });
        }
        let symbol = ClassSymbol::new(class.name.clone(), Visibility::Public);
        symbol.set_enclosing(Rc::downgrade(&scope_dyn));
        global_scope.define_fqcn(fqcn, Symbol::Class(symbol));
    }

    for iface in &file.interfaces {
        let fqcn = format!("{}.{}", file.package, iface.name);
        if global_scope.resolve_fqcn(&fqcn).is_some() {
            return Err(ImportResolutionError::DuplicateFqcn { fqcn });
        }
        let symbol = InterfaceSymbol::new(iface.name.clone());
        symbol.set_enclosing(Rc::downgrade(&scope_dyn));
        global_scope.define_fqcn(fqcn, Symbol::Interface(symbol));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct InMemoryRoot {
        files: HashMap<String, (String, String)>,
    }

    impl InMemoryRoot {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            let mut files = HashMap::new();
            for (fqcn, path, source) in entries {
                files.insert(fqcn.to_string(), (path.to_string(), source.to_string()));
            }
            Self { files }
        }
    }

    impl SourceRoot for InMemoryRoot {
        fn locate(&self, fqcn: &str) -> Option<(String, String)> {
            self.files.get(fqcn).cloned()
        }
    }

    #[test]
    fn resolves_a_single_import() {
        let root = InMemoryRoot::new(&[(
            "lib.Greeter",
            "lib/Greeter.veny",
            "package lib\nclass Greeter { entry(args: [Text]) { } }",
        )]);
        let roots: Vec<&dyn SourceRoot> = vec![&root];
        let global = GlobalScope::new();
        let mut file_set = FileSet::new();
        let mut cache = AstCache::new();

        let discovered = resolve(&roots, &global, &["lib.Greeter".to_string()], &mut file_set, &mut cache).unwrap();
        assert_eq!(discovered.len(), 1);
        assert!(global.resolve_local("Greeter").is_some());
    }

    #[test]
    fn missing_import_is_file_not_found() {
        let root = InMemoryRoot::new(&[]);
        let roots: Vec<&dyn SourceRoot> = vec![&root];
        let global = GlobalScope::new();
        let mut file_set = FileSet::new();
        let mut cache = AstCache::new();

        let err = resolve(&roots, &global, &["nope.Missing".to_string()], &mut file_set, &mut cache).unwrap_err();
        assert!(matches!(err, ImportResolutionError::FileNotFound { .. }));
    }

    #[test]
    fn malformed_import_is_rejected() {
        let root = InMemoryRoot::new(&[]);
        let roots: Vec<&dyn SourceRoot> = vec![&root];
        let global = GlobalScope::new();
        let mut file_set = FileSet::new();
        let mut cache = AstCache::new();

        let err = resolve(&roots, &global, &["NoDot".to_string()], &mut file_set, &mut cache).unwrap_err();
        assert!(matches!(err, ImportResolutionError::MalformedImport { .. }));
    }

    #[test]
    fn circular_import_is_detected() {
        let root = InMemoryRoot::new(&[
            ("a.A", "a/A.veny", "package a\nimport b.B\nclass A { entry(args: [Text]) { } }"),
            ("b.B", "b/B.veny", "package b\nimport a.A\nclass B { entry(args: [Text]) { } }"),
        ]);
        let roots: Vec<&dyn SourceRoot> = vec![&root];
        let global = GlobalScope::new();
        let mut file_set = FileSet::new();
        let mut cache = AstCache::new();

        let err = resolve(&roots, &global, &["a.A".to_string()], &mut file_set, &mut cache).unwrap_err();
        assert!(matches!(err, ImportResolutionError::CircularImport { .. }));
    }

    #[test]
    fn each_file_is_parsed_at_most_once() {
        let root = InMemoryRoot::new(&[
            ("lib.Foo", "lib/Multi.veny", "package lib\nclass Foo { entry(args: [Text]) { } } class Bar { entry(args: [Text]) { } }"),
            ("lib.Bar", "lib/Multi.veny", "package lib\nclass Foo { entry(args: [Text]) { } } class Bar { entry(args: [Text]) { } }"),
        ]);
        let roots: Vec<&dyn SourceRoot> = vec![&root];
        let global = GlobalScope::new();
        let mut file_set = FileSet::new();
        let mut cache = AstCache::new();

        let discovered = resolve(
            &roots,
            &global,
            &["lib.Foo".to_string(), "lib.Bar".to_string()],
            &mut file_set,
            &mut cache,
        )
        .unwrap();
        assert_eq!(discovered.len(), 1, "both fqcns resolve to the same file, parsed once");
    }

    #[test]
    fn duplicate_fqcn_within_the_same_package_is_rejected() {
        let root = InMemoryRoot::new(&[
            ("lib.Foo", "lib/Foo.veny", "package lib\nclass Foo { entry(args: [Text]) { } }"),
            // a second, distinct file that also declares `lib.Foo` —
            // the genuine collision the resolver must catch.
            (
                "lib.Trigger",
                "lib/Trigger.veny",
                "package lib\nclass Foo { entry(args: [Text]) { } }\nclass Trigger { entry(args: [Text]) { } }",
            ),
        ]);
        let roots: Vec<&dyn SourceRoot> = vec![&root];
        let global = GlobalScope::new();
        let mut file_set = FileSet::new();
        let mut cache = AstCache::new();

        let err = resolve(
            &roots,
            &global,
            &["lib.Foo".to_string(), "lib.Trigger".to_string()],
            &mut file_set,
            &mut cache,
        )
        .unwrap_err();
        assert!(matches!(err, ImportResolutionError::DuplicateFqcn { .. }));
    }

    #[test]
    fn same_class_name_in_different_packages_is_not_a_duplicate() {
        // `lib.Foo` and `lib2.Foo` are distinct FQCNs; both must
        // resolve cleanly even though the bare class name collides.
        let root = InMemoryRoot::new(&[
            ("lib.Foo", "lib/Foo.veny", "package lib\nclass Foo { entry(args: [Text]) { } }"),
            ("lib2.Foo", "lib2/Foo.veny", "package lib2\nclass Foo { entry(args: [Text]) { } }"),
        ]);
        let roots: Vec<&dyn SourceRoot> = vec![&root];
        let global = GlobalScope::new();
        let mut file_set = FileSet::new();
        let mut cache = AstCache::new();

        let discovered = resolve(
            &roots,
            &global,
            &["lib.Foo".to_string(), "lib2.Foo".to_string()],
            &mut file_set,
            &mut cache,
        )
        .unwrap();
        assert_eq!(discovered.len(), 2);
        assert!(global.resolve_fqcn("lib.Foo").is_some());
        assert!(global.resolve_fqcn("lib2.Foo").is_some());
    }
}
