//! Process-wide registry of mapping definitions.
//!
//! Definitions registered here can be resolved by name from anywhere in the
//! process, so a mapping declared once at startup is usable wherever the
//! objects it maps are handled. Registration is last-write-wins; entries
//! live for the lifetime of the process.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::definition::MappingDefinition;
use crate::engine::Mapper;
use crate::error::Result;
use crate::fields::FieldAccess;

static DEFINITIONS: Lazy<RwLock<HashMap<String, Arc<MappingDefinition>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a definition under its own name.
///
/// Returns the definition previously registered under that name, if any.
pub fn register(def: MappingDefinition) -> Option<Arc<MappingDefinition>> {
    let def = Arc::new(def);
    tracing::debug!(mapping = %def.name(), "mapping registered");
    DEFINITIONS.write().insert(def.name().to_string(), def)
}

/// Look up a registered definition.
pub fn get(name: &str) -> Option<Arc<MappingDefinition>> {
    DEFINITIONS.read().get(name).cloned()
}

pub fn contains(name: &str) -> bool {
    DEFINITIONS.read().contains_key(name)
}

/// Names of all registered definitions, sorted.
pub fn names() -> Vec<String> {
    let mut names: Vec<String> = DEFINITIONS.read().keys().cloned().collect();
    names.sort();
    names
}

/// Mapping shortcuts for objects that act as the source side.
///
/// Available on every [`FieldAccess`] type. Both methods resolve the named
/// mapping from the registry and run it with a fresh [`Mapper`], so they
/// suit mappings whose guards and computations need no per-run state. Build
/// the mapper by hand when state matters.
pub trait MapSource: FieldAccess {
    /// Forward-map `self` into `dest` using the named registered mapping.
    fn map_into(&self, mapping: &str, dest: &mut dyn FieldAccess) -> Result<()>
    where
        Self: Sized,
    {
        Mapper::resolve(mapping)?.map(self, dest)
    }

    /// Map `dest` back into `self` using the named registered mapping.
    fn map_back_from(&mut self, mapping: &str, dest: &dyn FieldAccess) -> Result<()>
    where
        Self: Sized,
    {
        Mapper::resolve(mapping)?.map_back(dest, self)
    }
}

impl<T: FieldAccess> MapSource for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;

    #[test]
    fn test_register_and_get() {
        register(MappingDefinition::builder("registry_unit_basic").build());
        assert!(contains("registry_unit_basic"));
        let def = get("registry_unit_basic").unwrap();
        assert_eq!(def.name(), "registry_unit_basic");
        assert!(get("registry_unit_absent").is_none());
    }

    #[test]
    fn test_register_returns_previous() {
        let first = MappingDefinition::builder("registry_unit_replace")
            .field("a")
            .build();
        assert!(register(first).is_none());

        let second = MappingDefinition::builder("registry_unit_replace")
            .field("b")
            .build();
        let previous = register(second).unwrap();
        assert!(previous.forward_rule("a").is_some());
        assert!(get("registry_unit_replace")
            .unwrap()
            .forward_rule("b")
            .is_some());
    }

    #[test]
    fn test_names_are_sorted() {
        register(MappingDefinition::builder("registry_unit_names_b").build());
        register(MappingDefinition::builder("registry_unit_names_a").build());
        let names = names();
        let a = names
            .iter()
            .position(|n| n == "registry_unit_names_a")
            .unwrap();
        let b = names
            .iter()
            .position(|n| n == "registry_unit_names_b")
            .unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_resolve_unknown_mapping() {
        let err = Mapper::resolve("registry_unit_missing").unwrap_err();
        assert!(matches!(err, MapError::UnknownMapping(n) if n == "registry_unit_missing"));
    }
}
