//! Field rules and the references they are built from.
//!
//! A [`FieldRule`] is one resolved mapping instruction: where to read,
//! where to write, and which guards gate it. Declarations supply a
//! [`FieldOptions`] overlay; anything not supplied is derived from the
//! source and destination field names.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::engine::Mapper;
use crate::error::Result;
use crate::fields::FieldAccess;

/// Computation invoked to produce a rule's value.
///
/// Receives the executing [`Mapper`] and the object being read from.
pub type ComputeFn = Arc<dyn Fn(&Mapper, &dyn FieldAccess) -> Result<Value> + Send + Sync>;

/// Inline guard predicate, invoked with the object it gates on.
pub type PredicateFn = Arc<dyn Fn(&dyn FieldAccess) -> Result<bool> + Send + Sync>;

/// How a rule resolves its value.
#[derive(Clone)]
pub enum Getter {
    /// Read the named field from the object on the read side.
    Field(String),
    /// Invoke the named computation registered on the definition.
    Method(String),
    /// Invoke an inline computation.
    Closure(ComputeFn),
}

impl Getter {
    pub fn field(name: impl Into<String>) -> Self {
        Getter::Field(name.into())
    }

    pub fn method(name: impl Into<String>) -> Self {
        Getter::Method(name.into())
    }

    pub fn closure(
        f: impl Fn(&Mapper, &dyn FieldAccess) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Getter::Closure(Arc::new(f))
    }

    /// True for the computation forms, which never derive a reverse rule.
    pub fn is_computed(&self) -> bool {
        !matches!(self, Getter::Field(_))
    }
}

impl fmt::Debug for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Getter::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Getter::Method(name) => f.debug_tuple("Method").field(name).finish(),
            Getter::Closure(_) => f.debug_tuple("Closure").field(&"<fn>").finish(),
        }
    }
}

/// A guard reference: the name of a field to test for truthiness, or an
/// inline predicate function.
#[derive(Clone)]
pub enum Predicate {
    /// Read the named field on the gated object and test truthiness.
    Named(String),
    /// Invoke the function with the gated object.
    Func(PredicateFn),
}

impl Predicate {
    pub fn named(name: impl Into<String>) -> Self {
        Predicate::Named(name.into())
    }

    pub fn func(f: impl Fn(&dyn FieldAccess) -> Result<bool> + Send + Sync + 'static) -> Self {
        Predicate::Func(Arc::new(f))
    }
}

impl From<&str> for Predicate {
    fn from(name: &str) -> Self {
        Predicate::Named(name.to_string())
    }
}

impl From<String> for Predicate {
    fn from(name: String) -> Self {
        Predicate::Named(name)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Predicate::Func(_) => f.debug_tuple("Func").field(&"<fn>").finish(),
        }
    }
}

/// The six optional gating predicates of a rule.
///
/// `when`/`unless` gate on the mapper instance, `when_src`/`unless_src` on
/// the source object and `when_dest`/`unless_dest` on the destination
/// object. All present guards must pass for the rule to apply.
#[derive(Debug, Clone, Default)]
pub struct Guards {
    pub when: Option<Predicate>,
    pub unless: Option<Predicate>,
    pub when_src: Option<Predicate>,
    pub unless_src: Option<Predicate>,
    pub when_dest: Option<Predicate>,
    pub unless_dest: Option<Predicate>,
}

impl Guards {
    pub fn is_empty(&self) -> bool {
        self.when.is_none()
            && self.unless.is_none()
            && self.when_src.is_none()
            && self.unless_src.is_none()
            && self.when_dest.is_none()
            && self.unless_dest.is_none()
    }

    /// Guard set for the derived reverse rule: instance guards stay in
    /// place, source and destination guards trade places.
    pub fn swap_sides(&self) -> Guards {
        Guards {
            when: self.when.clone(),
            unless: self.unless.clone(),
            when_src: self.when_dest.clone(),
            unless_src: self.unless_dest.clone(),
            when_dest: self.when_src.clone(),
            unless_dest: self.unless_src.clone(),
        }
    }
}

/// Declaration options overlaid on the defaults derived from field names.
///
/// Every setting is optional; a supplied setting wins over the derived
/// default.
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    dest: Option<String>,
    getter: Option<Getter>,
    setter: Option<String>,
    guards: Guards,
    description: Option<String>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the destination field.
    pub fn dest(mut self, name: impl Into<String>) -> Self {
        self.dest = Some(name.into());
        self
    }

    /// Override how the value is produced.
    pub fn getter(mut self, getter: Getter) -> Self {
        self.getter = Some(getter);
        self
    }

    /// Shorthand for an inline computation getter.
    pub fn compute(
        self,
        f: impl Fn(&Mapper, &dyn FieldAccess) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.getter(Getter::closure(f))
    }

    /// Override the field written on the destination.
    pub fn setter(mut self, name: impl Into<String>) -> Self {
        self.setter = Some(name.into());
        self
    }

    /// Apply the rule only when the predicate holds on the mapper instance.
    pub fn when(mut self, p: impl Into<Predicate>) -> Self {
        self.guards.when = Some(p.into());
        self
    }

    /// Skip the rule when the predicate holds on the mapper instance.
    pub fn unless(mut self, p: impl Into<Predicate>) -> Self {
        self.guards.unless = Some(p.into());
        self
    }

    /// Apply the rule only when the predicate holds on the source object.
    pub fn when_src(mut self, p: impl Into<Predicate>) -> Self {
        self.guards.when_src = Some(p.into());
        self
    }

    /// Skip the rule when the predicate holds on the source object.
    pub fn unless_src(mut self, p: impl Into<Predicate>) -> Self {
        self.guards.unless_src = Some(p.into());
        self
    }

    /// Apply the rule only when the predicate holds on the destination object.
    pub fn when_dest(mut self, p: impl Into<Predicate>) -> Self {
        self.guards.when_dest = Some(p.into());
        self
    }

    /// Skip the rule when the predicate holds on the destination object.
    pub fn unless_dest(mut self, p: impl Into<Predicate>) -> Self {
        self.guards.unless_dest = Some(p.into());
        self
    }

    /// Attach a human-readable description to the rule.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

/// One resolved mapping instruction.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Source field identifier, absent for computed rules.
    pub src: Option<String>,
    /// Destination field identifier and table key.
    pub dest: String,
    /// How the value is produced from the read side.
    pub getter: Getter,
    /// Field written on the write side.
    pub setter: String,
    /// Gating predicates.
    pub guards: Guards,
    /// Optional human-readable description.
    pub description: Option<String>,
}

impl FieldRule {
    /// Resolve a plain field declaration: defaults derived from `src`, then
    /// the caller's options on top.
    pub(crate) fn plain(src: &str, opts: FieldOptions) -> FieldRule {
        let dest = opts.dest.unwrap_or_else(|| src.to_string());
        FieldRule {
            src: Some(src.to_string()),
            getter: opts.getter.unwrap_or_else(|| Getter::Field(src.to_string())),
            setter: opts.setter.unwrap_or_else(|| dest.clone()),
            dest,
            guards: opts.guards,
            description: opts.description,
        }
    }

    /// Resolve a computed declaration: no source field, computation defaults
    /// to the definition method named after the destination.
    pub(crate) fn computed(dest: &str, opts: FieldOptions) -> FieldRule {
        let method = match &opts.getter {
            Some(getter) => getter.clone(),
            None => Getter::Method(dest.to_string()),
        };
        let dest = opts.dest.unwrap_or_else(|| dest.to_string());
        FieldRule {
            src: None,
            getter: method,
            setter: opts.setter.unwrap_or_else(|| dest.clone()),
            dest,
            guards: opts.guards,
            description: opts.description,
        }
    }

    /// Derived inverse of a plain rule: read and write sides swapped, side
    /// guards traded. Computed rules have no derivable inverse.
    pub(crate) fn reversed(&self) -> Option<FieldRule> {
        let src = self.src.clone()?;
        let read = match &self.getter {
            Getter::Field(name) => name.clone(),
            _ => return None,
        };
        Some(FieldRule {
            src: Some(self.dest.clone()),
            dest: src,
            getter: Getter::Field(self.setter.clone()),
            setter: read,
            guards: self.guards.swap_sides(),
            description: self.description.clone(),
        })
    }
}
