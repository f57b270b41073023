//! Module graph driver (spec §4.9): given an entry file, discovers the
//! transitive import closure, rejects cycles and self-imports, orders
//! modules topologically, and runs the full per-module pipeline
//! (lex → parse → canon → typecheck → extern → emit) over each one in
//! that order, threading each module's exported registry into its
//! importers' type checker.

pub mod discovery;
pub mod error;

pub use discovery::{module_name, resolve_module_path, ModuleRoots};
pub use error::DriverError;

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use sigil_common::diagnostic::Diagnostic;
use sigil_common::module_graph::{topological_sort, ModuleGraph, ModuleId};
use sigil_common::span::LineIndex;
use sigil_codegen::semmap::SemanticMap;
use sigil_extern::ExternLoader;
use sigil_parser::ast::decl::{Decl, SourceFile};
use sigil_typeck::ModuleExports;

/// The entry module's dotted name. No real import path can ever resolve
/// to this string (Sigil identifiers cannot start with `_`), so it never
/// collides with a registered dependency name.
const ENTRY_MODULE_NAME: &str = "__entry__";

/// One module's output once every pipeline stage has run over it.
pub struct CompiledModule {
    pub name: String,
    pub path: PathBuf,
    pub is_entry: bool,
    pub js: String,
    pub semantic_map: SemanticMap,
}

struct Parsed {
    path: PathBuf,
    source: String,
    file: SourceFile,
}

fn read_source(path: &Path) -> Result<String, Diagnostic> {
    std::fs::read_to_string(path).map_err(|e| {
        DriverError::Io { path: path.display().to_string(), message: e.to_string() }.into()
    })
}

fn lex_and_parse(source: &str) -> Result<SourceFile, Diagnostic> {
    let tokens = sigil_lexer::lex(source)?;
    let file = sigil_parser::parse(source, tokens).map_err(Diagnostic::from)?;
    Ok(file)
}

fn import_decls(file: &SourceFile) -> impl Iterator<Item = &sigil_parser::ast::decl::ImportDecl> {
    file.decls.iter().filter_map(|d| match d {
        Decl::Import(i) => Some(i),
        _ => None,
    })
}

/// Discovers the entry file's transitive import closure and returns it
/// topologically ordered, entry last. Unresolvable import first segments
/// (anything but `stdlib`/`src`) are silently skipped, per spec §4.9.
fn discover(entry_path: &Path, roots: &ModuleRoots) -> Result<(ModuleGraph, HashMap<ModuleId, Parsed>), Diagnostic> {
    let mut graph = ModuleGraph::new();
    let mut parsed: HashMap<ModuleId, Parsed> = HashMap::new();
    let mut path_to_id: HashMap<PathBuf, ModuleId> = HashMap::new();

    let entry_source = read_source(entry_path)?;
    let entry_file = lex_and_parse(&entry_source)?;
    let entry_id = graph.add_module(ENTRY_MODULE_NAME.to_string(), entry_path.to_path_buf(), true);
    path_to_id.insert(entry_path.to_path_buf(), entry_id);
    parsed.insert(entry_id, Parsed { path: entry_path.to_path_buf(), source: entry_source, file: entry_file });

    let mut queue = VecDeque::new();
    queue.push_back(entry_id);

    while let Some(id) = queue.pop_front() {
        let imports: Vec<(Vec<String>, sigil_common::span::Span)> =
            import_decls(&parsed[&id].file).map(|i| (i.module_path.clone(), i.span)).collect();

        for (module_path, span) in imports {
            let Some(dep_path) = resolve_module_path(&module_path, roots) else {
                continue;
            };
            let dep_name = module_name(&module_path);

            let dep_id = if let Some(&existing) = path_to_id.get(&dep_path) {
                existing
            } else {
                let source = read_source(&dep_path)?;
                let file = lex_and_parse(&source)?;
                let new_id = graph.add_module(dep_name, dep_path.clone(), false);
                path_to_id.insert(dep_path.clone(), new_id);
                parsed.insert(new_id, Parsed { path: dep_path.clone(), source, file });
                queue.push_back(new_id);
                new_id
            };

            if dep_id == id {
                return Err(DriverError::SelfImport { module: module_name(&module_path), span }.into());
            }
            graph.add_dependency(id, dep_id);
        }
    }

    Ok((graph, parsed))
}

/// Runs the discover → order → compile pipeline for a project rooted at
/// `entry_path`, using `loader` to resolve extern host modules (spec
/// §4.6) and stamping `generated_at` on every emitted semantic map. The
/// entry file must declare `main`.
pub fn compile_project(
    entry_path: &Path,
    roots: &ModuleRoots,
    generated_at: &str,
    loader: &mut dyn ExternLoader,
) -> Result<Vec<CompiledModule>, Diagnostic> {
    compile_with_entry_policy(entry_path, roots, generated_at, loader, true)
}

/// Same pipeline as [`compile_project`], but for a standalone test or
/// library unit: its import closure is still discovered and compiled,
/// but the designated entry module is not required to declare `main`.
pub fn compile_unit(
    entry_path: &Path,
    roots: &ModuleRoots,
    generated_at: &str,
    loader: &mut dyn ExternLoader,
) -> Result<Vec<CompiledModule>, Diagnostic> {
    compile_with_entry_policy(entry_path, roots, generated_at, loader, false)
}

fn compile_with_entry_policy(
    entry_path: &Path,
    roots: &ModuleRoots,
    generated_at: &str,
    loader: &mut dyn ExternLoader,
    require_main: bool,
) -> Result<Vec<CompiledModule>, Diagnostic> {
    let (graph, mut parsed) = discover(entry_path, roots)?;
    let order = topological_sort(&graph).map_err(|e| Diagnostic::from(DriverError::Cycle(e)))?;

    let mut exports_by_name: HashMap<String, ModuleExports> = HashMap::new();
    let mut compiled = Vec::with_capacity(order.len());

    for id in order {
        let info = graph.get(id);
        let unit = parsed.remove(&id).expect("every graph module was parsed during discovery");
        let path_str = unit.path.to_string_lossy().to_string();

        sigil_canon::check_source_file(&unit.file, &path_str)?;
        if info.is_entry && require_main {
            sigil_canon::file_purpose::check_entry_file(&unit.file)?;
        }

        let (exports, mut errors) = sigil_typeck::check_module(&unit.file, &exports_by_name);
        if !errors.is_empty() {
            return Err(errors.remove(0).into());
        }

        sigil_extern::check_externs(&unit.file, loader)?;

        let js = sigil_codegen::emit_module_js(&unit.file, &unit.source);
        let lines = LineIndex::new(&unit.source);
        let semantic_map = sigil_codegen::emit_semantic_map(&unit.file, &path_str, generated_at, &lines);

        exports_by_name.insert(info.name.clone(), exports);
        compiled.push(CompiledModule {
            name: info.name.clone(),
            path: unit.path,
            is_entry: info.is_entry,
            js,
            semantic_map,
        });
    }

    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullLoader;
    impl ExternLoader for NullLoader {
        fn load(&mut self, _specifier: &str) -> Result<Vec<String>, String> {
            Ok(Vec::new())
        }
    }

    fn write(dir: &Path, relative: &str, contents: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn compiles_entry_only_project() {
        let dir = tempfile::tempdir().unwrap();
        let entry = write(dir.path(), "main.sig", "λmain()→ℤ=1\n");
        let roots = ModuleRoots::new(dir.path().join("stdlib"), dir.path().join("src"));
        let mut loader = NullLoader;
        let modules = compile_project(&entry, &roots, "2026-01-01T00:00:00Z", &mut loader).unwrap();
        assert_eq!(modules.len(), 1);
        assert!(modules[0].is_entry);
        assert!(modules[0].js.contains("async function main"));
    }

    #[test]
    fn compiles_dependency_before_importer() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/math.sig", "export λdouble(n:ℤ)→ℤ=n*2\n");
        let entry = write(dir.path(), "main.sig", "i src⋅math\nλmain()→ℤ=math.double(2)\n");
        let roots = ModuleRoots::new(dir.path().join("stdlib"), dir.path().join("src"));
        let mut loader = NullLoader;
        let modules = compile_project(&entry, &roots, "2026-01-01T00:00:00Z", &mut loader).unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].name, "src.math");
        assert!(modules[1].is_entry);
    }

    #[test]
    fn self_import_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/loop.sig", "i src⋅loop\nλnoop()→ℤ=1\n");
        let entry = write(dir.path(), "main.sig", "i src⋅loop\nλmain()→ℤ=1\n");
        let roots = ModuleRoots::new(dir.path().join("stdlib"), dir.path().join("src"));
        let mut loader = NullLoader;
        let err = compile_project(&entry, &roots, "2026-01-01T00:00:00Z", &mut loader).unwrap_err();
        assert_eq!(err.code, "SIGIL-LINK-MODULE-SELF-IMPORT");
    }

    #[test]
    fn unresolvable_import_root_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let entry = write(dir.path(), "main.sig", "i vendor⋅thing\nλmain()→ℤ=1\n");
        let roots = ModuleRoots::new(dir.path().join("stdlib"), dir.path().join("src"));
        let mut loader = NullLoader;
        let modules = compile_project(&entry, &roots, "2026-01-01T00:00:00Z", &mut loader).unwrap();
        assert_eq!(modules.len(), 1);
    }
}
