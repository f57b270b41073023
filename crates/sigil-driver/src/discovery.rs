//! Import resolution (spec §4.9): maps an `ImportDecl`'s dotted module
//! path to a file on disk and to the canonical dotted name under which
//! the module is registered in the graph.

use std::path::PathBuf;

/// File-system roots the first segment of an import path resolves against.
/// `stdlib⋅X` resolves under `stdlib`; `src⋅X` resolves under `src`.
#[derive(Clone, Debug)]
pub struct ModuleRoots {
    pub stdlib: PathBuf,
    pub src: PathBuf,
}

impl ModuleRoots {
    pub fn new(stdlib: PathBuf, src: PathBuf) -> Self {
        ModuleRoots { stdlib, src }
    }
}

/// The dotted module name used to key the graph and the import-exports
/// map, e.g. `"stdlib.list"` or `"src.math.vector"`. Identical to
/// `module_path.join(".")`.
pub fn module_name(module_path: &[String]) -> String {
    module_path.join(".")
}

/// Resolves an import's module path to a source file path, or `None` if
/// the first segment names neither `stdlib` nor `src` (per spec §4.9,
/// unresolvable first segments are silently skipped rather than erroring).
pub fn resolve_module_path(module_path: &[String], roots: &ModuleRoots) -> Option<PathBuf> {
    let (root, rest) = match module_path.split_first()? {
        (first, rest) if first == "stdlib" => (&roots.stdlib, rest),
        (first, rest) if first == "src" => (&roots.src, rest),
        _ => return None,
    };
    if rest.is_empty() {
        return None;
    }
    let mut path = root.clone();
    for segment in rest {
        path.push(segment);
    }
    path.set_extension("sig");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots() -> ModuleRoots {
        ModuleRoots::new(PathBuf::from("/proj/stdlib"), PathBuf::from("/proj/src"))
    }

    #[test]
    fn resolves_stdlib_import() {
        let path = resolve_module_path(&["stdlib".to_string(), "list".to_string()], &roots()).unwrap();
        assert_eq!(path, PathBuf::from("/proj/stdlib/list.sig"));
    }

    #[test]
    fn resolves_nested_src_import() {
        let path = resolve_module_path(&["src".to_string(), "math".to_string(), "vector".to_string()], &roots()).unwrap();
        assert_eq!(path, PathBuf::from("/proj/src/math/vector.sig"));
    }

    #[test]
    fn unknown_root_segment_is_skipped() {
        assert!(resolve_module_path(&["vendor".to_string(), "thing".to_string()], &roots()).is_none());
    }

    #[test]
    fn bare_root_with_no_remainder_is_skipped() {
        assert!(resolve_module_path(&["src".to_string()], &roots()).is_none());
    }

    #[test]
    fn module_name_joins_with_dot() {
        assert_eq!(module_name(&["src".to_string(), "math".to_string(), "vector".to_string()]), "src.math.vector");
    }
}
