//! Mapping definitions and their builder.
//!
//! A [`MappingDefinition`] is a named, immutable set of field rules in two
//! tables: forward rules applied when mapping a source object into a
//! destination, and reverse rules applied when mapping the destination back.
//! Declaring a plain field populates both tables at once; the reverse rule
//! is derived by swapping the read and write sides and trading the
//! source/destination guards. Computed declarations populate only the table
//! they are declared for.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::engine::Mapper;
use crate::error::Result;
use crate::fields::FieldAccess;
use crate::rule::{ComputeFn, FieldOptions, FieldRule};
use crate::util::classify_name;

/// A named, reusable set of field mapping rules.
///
/// Built through [`MappingDefinition::builder`] and executed by a
/// [`Mapper`]. Both rule tables preserve declaration order; re-declaring a
/// field overwrites the earlier rule without moving it.
pub struct MappingDefinition {
    name: String,
    display_name: String,
    forward: IndexMap<String, FieldRule>,
    reverse: IndexMap<String, FieldRule>,
    methods: HashMap<String, ComputeFn>,
}

impl MappingDefinition {
    /// Start declaring a mapping under the given name.
    pub fn builder(name: impl Into<String>) -> MappingBuilder {
        MappingBuilder {
            name: name.into(),
            display_name: None,
            forward: IndexMap::new(),
            reverse: IndexMap::new(),
            methods: HashMap::new(),
        }
    }

    /// Name the definition was declared under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type-style display name, derived from the name unless overridden.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Forward rules, keyed by destination field, in declaration order.
    pub fn forward(&self) -> &IndexMap<String, FieldRule> {
        &self.forward
    }

    /// Reverse rules, keyed by the field they write back, in declaration
    /// order.
    pub fn reverse(&self) -> &IndexMap<String, FieldRule> {
        &self.reverse
    }

    pub fn forward_rule(&self, dest: &str) -> Option<&FieldRule> {
        self.forward.get(dest)
    }

    pub fn reverse_rule(&self, dest: &str) -> Option<&FieldRule> {
        self.reverse.get(dest)
    }

    pub(crate) fn method(&self, name: &str) -> Option<&ComputeFn> {
        self.methods.get(name)
    }
}

impl fmt::Debug for MappingDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingDefinition")
            .field("name", &self.name)
            .field("display_name", &self.display_name)
            .field("forward", &self.forward)
            .field("reverse", &self.reverse)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder accumulating field declarations for a [`MappingDefinition`].
pub struct MappingBuilder {
    name: String,
    display_name: Option<String>,
    forward: IndexMap<String, FieldRule>,
    reverse: IndexMap<String, FieldRule>,
    methods: HashMap<String, ComputeFn>,
}

impl MappingBuilder {
    /// Declare a field copied under the same name on both sides.
    pub fn field(self, src: &str) -> Self {
        self.field_with(src, FieldOptions::new())
    }

    /// Declare a field copied under a different destination name.
    pub fn field_as(self, src: &str, dest: &str) -> Self {
        self.field_with(src, FieldOptions::new().dest(dest))
    }

    /// Declare a field with explicit options.
    pub fn field_with(mut self, src: &str, opts: FieldOptions) -> Self {
        self.put_forward(FieldRule::plain(src, opts));
        self
    }

    /// Declare a computed destination field. The value comes from the
    /// definition method named after the field unless the options override
    /// the getter.
    pub fn computed(self, dest: &str) -> Self {
        self.computed_with(dest, FieldOptions::new())
    }

    /// Declare a computed destination field with explicit options.
    pub fn computed_with(mut self, dest: &str, opts: FieldOptions) -> Self {
        self.put_forward(FieldRule::computed(dest, opts));
        self
    }

    /// Declare a computed reverse rule, applied only when mapping back.
    pub fn computed_back(self, dest: &str) -> Self {
        self.computed_back_with(dest, FieldOptions::new())
    }

    /// Declare a computed reverse rule with explicit options.
    pub fn computed_back_with(mut self, dest: &str, opts: FieldOptions) -> Self {
        let rule = FieldRule::computed(dest, opts);
        self.reverse.insert(rule.dest.clone(), rule);
        self
    }

    /// Register a named computation referenced by computed rules.
    pub fn method(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&Mapper, &dyn FieldAccess) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.methods.insert(name.into(), Arc::new(f));
        self
    }

    /// Override the derived display name.
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Finish the declaration.
    pub fn build(self) -> MappingDefinition {
        let display_name = self
            .display_name
            .unwrap_or_else(|| format!("{}Mapping", classify_name(&self.name)));
        tracing::debug!(
            mapping = %self.name,
            forward = self.forward.len(),
            reverse = self.reverse.len(),
            "mapping definition built"
        );
        MappingDefinition {
            name: self.name,
            display_name,
            forward: self.forward,
            reverse: self.reverse,
            methods: self.methods,
        }
    }

    /// Insert a forward rule together with its derived reverse twin.
    ///
    /// Replacing the rule at a destination also replaces its twin; when the
    /// new rule derives no twin, or derives one under a different key, the
    /// stale twin is dropped. The twin is only dropped while it still belongs
    /// to the replaced rule: a later declaration reading the same source
    /// field takes the reverse slot over, and an explicit reverse declaration
    /// owns its slot outright.
    fn put_forward(&mut self, rule: FieldRule) {
        let back = rule.reversed();
        if let Some(old) = self.forward.get(&rule.dest) {
            if let Some(old_back) = old.reversed() {
                let same_key = back.as_ref().is_some_and(|b| b.dest == old_back.dest);
                // a derived twin records its owner's dest as its src
                let owned = self
                    .reverse
                    .get(&old_back.dest)
                    .is_some_and(|twin| twin.src.as_deref() == Some(old.dest.as_str()));
                if !same_key && owned {
                    self.reverse.shift_remove(&old_back.dest);
                }
            }
        }
        if let Some(back) = back {
            self.reverse.insert(back.dest.clone(), back);
        }
        self.forward.insert(rule.dest.clone(), rule);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Getter, Predicate};

    #[test]
    fn test_tables_keep_declaration_order() {
        let def = MappingDefinition::builder("contact")
            .computed("name")
            .field_as("email", "email_address")
            .field("phone")
            .build();
        let forward: Vec<&str> = def.forward().keys().map(String::as_str).collect();
        assert_eq!(forward, vec!["name", "email_address", "phone"]);
        let reverse: Vec<&str> = def.reverse().keys().map(String::as_str).collect();
        assert_eq!(reverse, vec!["email", "phone"]);
    }

    #[test]
    fn test_redeclaring_overwrites_in_place() {
        let def = MappingDefinition::builder("contact")
            .field("a")
            .field_with("b", FieldOptions::new().describe("first"))
            .field("c")
            .field_with("b", FieldOptions::new().describe("second"))
            .build();
        let keys: Vec<&str> = def.forward().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        let rule = def.forward_rule("b").unwrap();
        assert_eq!(rule.description.as_deref(), Some("second"));
    }

    #[test]
    fn test_plain_fields_derive_reverse_rules() {
        let def = MappingDefinition::builder("contact")
            .field_as("email", "email_address")
            .build();
        let back = def.reverse_rule("email").unwrap();
        assert_eq!(back.src.as_deref(), Some("email_address"));
        assert!(matches!(&back.getter, Getter::Field(n) if n == "email_address"));
        assert_eq!(back.setter, "email");
    }

    #[test]
    fn test_computed_fields_derive_nothing() {
        let def = MappingDefinition::builder("contact")
            .computed("name")
            .build();
        assert!(def.reverse().is_empty());
    }

    #[test]
    fn test_computed_back_populates_reverse_only() {
        let def = MappingDefinition::builder("contact")
            .computed_back("first_name")
            .build();
        assert!(def.forward().is_empty());
        let back = def.reverse_rule("first_name").unwrap();
        assert!(matches!(&back.getter, Getter::Method(n) if n == "first_name"));
    }

    #[test]
    fn test_replacing_a_field_replaces_its_twin() {
        let def = MappingDefinition::builder("contact")
            .field_as("email", "address")
            .field_as("backup_email", "address")
            .build();
        let reverse: Vec<&str> = def.reverse().keys().map(String::as_str).collect();
        assert_eq!(reverse, vec!["backup_email"]);
    }

    #[test]
    fn test_replacing_with_computed_drops_the_twin() {
        let def = MappingDefinition::builder("contact")
            .field("name")
            .computed("name")
            .build();
        assert!(def.reverse().is_empty());
    }

    #[test]
    fn test_shared_source_keeps_the_live_twin() {
        // two rules read the same source field; the reverse slot follows the
        // later one and survives replacement of the earlier destination
        let def = MappingDefinition::builder("contact")
            .field_as("email", "address")
            .field_as("email", "backup")
            .computed("address")
            .build();
        let reverse: Vec<&str> = def.reverse().keys().map(String::as_str).collect();
        assert_eq!(reverse, vec!["email"]);
        let back = def.reverse_rule("email").unwrap();
        assert_eq!(back.src.as_deref(), Some("backup"));

        let def = MappingDefinition::builder("contact")
            .field_as("email", "address")
            .field_as("email", "backup")
            .field_as("other", "address")
            .build();
        let reverse: Vec<&str> = def.reverse().keys().map(String::as_str).collect();
        assert_eq!(reverse, vec!["email", "other"]);
        let back = def.reverse_rule("email").unwrap();
        assert_eq!(back.src.as_deref(), Some("backup"));
    }

    #[test]
    fn test_explicit_reverse_survives_replacement() {
        let def = MappingDefinition::builder("contact")
            .field_as("email", "address")
            .computed_back("email")
            .computed("address")
            .build();
        let back = def.reverse_rule("email").unwrap();
        assert!(back.src.is_none());
        assert!(matches!(&back.getter, Getter::Method(name) if name == "email"));
    }

    #[test]
    fn test_display_name() {
        let def = MappingDefinition::builder("external-contact_v1").build();
        assert_eq!(def.display_name(), "ExternalContactV1Mapping");

        let def = MappingDefinition::builder("contact")
            .display_name("LegacyContact")
            .build();
        assert_eq!(def.display_name(), "LegacyContact");
    }

    #[test]
    fn test_side_guards_trade_places_in_reverse() {
        let def = MappingDefinition::builder("contact")
            .field_with(
                "v",
                FieldOptions::new()
                    .when_dest("persisted")
                    .unless_src("locked"),
            )
            .build();
        let back = def.reverse_rule("v").unwrap();
        assert!(matches!(&back.guards.when_src, Some(Predicate::Named(n)) if n == "persisted"));
        assert!(matches!(&back.guards.unless_dest, Some(Predicate::Named(n)) if n == "locked"));
        assert!(back.guards.when_dest.is_none());
        assert!(back.guards.unless_src.is_none());
    }
}
