//! Mapping execution.
//!
//! A [`Mapper`] binds one [`MappingDefinition`] and applies its rule tables
//! to a pair of objects. The mapper itself carries an ad-hoc state bag so
//! that instance guards and computations can consult values set for a
//! single run, such as feature toggles or the acting user.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::definition::MappingDefinition;
use crate::error::{MapError, Result};
use crate::fields::{truthy, FieldAccess};
use crate::registry;
use crate::rule::{FieldRule, Getter, Predicate};

/// Executor bound to one mapping definition.
#[derive(Debug)]
pub struct Mapper {
    def: Arc<MappingDefinition>,
    state: HashMap<String, Value>,
}

impl Mapper {
    pub fn new(def: Arc<MappingDefinition>) -> Self {
        Self {
            def,
            state: HashMap::new(),
        }
    }

    /// Mapper bound to a registered definition.
    pub fn resolve(name: &str) -> Result<Self> {
        registry::get(name)
            .map(Self::new)
            .ok_or_else(|| MapError::UnknownMapping(name.to_string()))
    }

    pub fn definition(&self) -> &Arc<MappingDefinition> {
        &self.def
    }

    /// Set a state value consulted by instance guards and computations.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.state.insert(name.into(), value);
    }

    /// Builder-style state value for call sites constructing a mapper inline.
    pub fn with_state(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    /// Read a state value. Unset names read as `null`.
    pub fn get(&self, name: &str) -> Value {
        self.state.get(name).cloned().unwrap_or(Value::Null)
    }

    /// Apply the forward rules, writing into `dest`.
    pub fn map(&self, src: &dyn FieldAccess, dest: &mut dyn FieldAccess) -> Result<()> {
        tracing::debug!(
            mapping = %self.def.name(),
            rules = self.def.forward().len(),
            "applying forward mapping"
        );
        self.apply(self.def.forward(), src, dest)
    }

    /// Apply the reverse rules: `dest` is read and `src` written back.
    pub fn map_back(&self, dest: &dyn FieldAccess, src: &mut dyn FieldAccess) -> Result<()> {
        tracing::debug!(
            mapping = %self.def.name(),
            rules = self.def.reverse().len(),
            "applying reverse mapping"
        );
        self.apply(self.def.reverse(), dest, src)
    }

    /// Run one rule table. Rules run in declaration order; the first error
    /// aborts the run, leaving earlier writes in place.
    fn apply(
        &self,
        table: &IndexMap<String, FieldRule>,
        read: &dyn FieldAccess,
        write: &mut dyn FieldAccess,
    ) -> Result<()> {
        for rule in table.values() {
            if self.skip(rule, read, write)? {
                tracing::trace!(mapping = %self.def.name(), field = %rule.dest, "rule gated off");
                continue;
            }
            let value = self.value_for(rule, read)?;
            write.set_field(&rule.setter, value)?;
        }
        Ok(())
    }

    /// Evaluate a rule's guards: instance pair first, then destination pair,
    /// then source pair. Here "source" and "destination" are the rule's own
    /// sides, so for reverse rules they gate on the objects their declaration
    /// already swapped them for.
    fn skip(
        &self,
        rule: &FieldRule,
        read: &dyn FieldAccess,
        write: &dyn FieldAccess,
    ) -> Result<bool> {
        let guards = &rule.guards;
        if let Some(p) = &guards.when {
            if !self.check(p, self)? {
                return Ok(true);
            }
        }
        if let Some(p) = &guards.unless {
            if self.check(p, self)? {
                return Ok(true);
            }
        }
        if let Some(p) = &guards.when_dest {
            if !self.check(p, write)? {
                return Ok(true);
            }
        }
        if let Some(p) = &guards.unless_dest {
            if self.check(p, write)? {
                return Ok(true);
            }
        }
        if let Some(p) = &guards.when_src {
            if !self.check(p, read)? {
                return Ok(true);
            }
        }
        if let Some(p) = &guards.unless_src {
            if self.check(p, read)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn check(&self, predicate: &Predicate, receiver: &dyn FieldAccess) -> Result<bool> {
        match predicate {
            Predicate::Named(name) => Ok(truthy(&receiver.get_field(name)?)),
            Predicate::Func(f) => f(receiver),
        }
    }

    fn value_for(&self, rule: &FieldRule, read: &dyn FieldAccess) -> Result<Value> {
        match &rule.getter {
            Getter::Field(name) => read.get_field(name),
            Getter::Method(name) => {
                let f = self
                    .def
                    .method(name)
                    .ok_or_else(|| MapError::UnknownComputation {
                        mapping: self.def.name().to_string(),
                        name: name.clone(),
                    })?;
                f(self, read)
            }
            Getter::Closure(f) => f(self, read),
        }
    }
}

/// Instance guards and computations see the mapper's state bag as fields.
/// Unlike mapped objects, unset state reads as `null` instead of failing.
impl FieldAccess for Mapper {
    fn get_field(&self, name: &str) -> Result<Value> {
        Ok(self.get(name))
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        self.set(name, value);
        Ok(())
    }
}
