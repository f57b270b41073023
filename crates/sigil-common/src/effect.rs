//! The effect vocabulary declared on function signatures (spec §3, §4.5).

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum Effect {
    IO,
    Network,
    Async,
    Error,
    Mut,
}

impl Effect {
    pub fn from_name(name: &str) -> Option<Effect> {
        match name {
            "IO" => Some(Effect::IO),
            "Network" => Some(Effect::Network),
            "Async" => Some(Effect::Async),
            "Error" => Some(Effect::Error),
            "Mut" => Some(Effect::Mut),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Effect::IO => "IO",
            Effect::Network => "Network",
            Effect::Async => "Async",
            Effect::Error => "Error",
            Effect::Mut => "Mut",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A declared or inferred effect set. Ordered (`BTreeSet`) so diagnostics
/// that list effects are deterministic.
pub type EffectSet = BTreeSet<Effect>;

/// `inferred` must be a subset of `declared`; returns the extras if not.
pub fn undeclared_effects(declared: &EffectSet, inferred: &EffectSet) -> Vec<Effect> {
    inferred.difference(declared).copied().collect()
}
