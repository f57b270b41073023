//! Type environment: a scope stack plus the type/module registries built
//! during the module's first pass (spec §4.5 "Two-pass module check").

use rustc_hash::FxHashMap;

use crate::ty::Ty;

#[derive(Clone, Debug)]
pub struct Binding {
    pub ty: Ty,
    pub is_mockable: bool,
    pub is_extern_namespace: bool,
    pub is_mutable: bool,
}

impl Binding {
    pub fn value(ty: Ty) -> Self {
        Binding { ty, is_mockable: false, is_extern_namespace: false, is_mutable: false }
    }

    pub fn mockable(ty: Ty) -> Self {
        Binding { ty, is_mockable: true, is_extern_namespace: false, is_mutable: false }
    }

    pub fn extern_namespace(ty: Ty) -> Self {
        Binding { ty, is_mockable: false, is_extern_namespace: true, is_mutable: false }
    }

    pub fn mutable(ty: Ty) -> Self {
        Binding { ty, is_mockable: false, is_extern_namespace: false, is_mutable: true }
    }
}

/// A user-declared type: either an alias or a sum type whose variants are
/// registered as constructor function types elsewhere in the environment.
#[derive(Clone, Debug)]
pub enum TypeDef {
    Alias(Ty),
    Sum { variants: Vec<String> },
}

/// The set of names a module re-exports, keyed by name. Populated by the
/// module graph driver before an importer's second pass runs; absent
/// entries default the namespace to `Any` (spec §4.5 first pass, rule 1).
#[derive(Clone, Debug, Default)]
pub struct ModuleExports {
    pub members: FxHashMap<String, Ty>,
}

pub struct TypeEnv {
    scopes: Vec<FxHashMap<String, Binding>>,
    pub type_defs: FxHashMap<String, TypeDef>,
    pub modules: FxHashMap<String, ModuleExports>,
}

impl TypeEnv {
    pub fn new() -> Self {
        TypeEnv { scopes: vec![FxHashMap::default()], type_defs: FxHashMap::default(), modules: FxHashMap::default() }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn bind(&mut self, name: impl Into<String>, binding: Binding) {
        self.scopes.last_mut().expect("at least one scope").insert(name.into(), binding);
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::new()
    }
}
