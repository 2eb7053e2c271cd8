//! Declarative, bidirectional field mapping between objects.
//!
//! A mapping is declared once as a named set of field rules and applied in
//! both directions: forward from a source object into a destination, and
//! backward from the destination into the source. Plain field rules derive
//! their own reverse rule; computed fields are one-way unless a reverse
//! computation is declared for them.
//!
//! # Features
//!
//! - **Field rules**: copy fields between objects, renaming and overriding
//!   getters and setters per rule
//! - **Computed fields**: produce destination values from named or inline
//!   computations over the whole source object
//! - **Guards**: gate each rule on the mapper instance, the source object,
//!   or the destination object
//! - **Registry**: register definitions once and resolve them by name
//!   anywhere in the process
//!
//! # Example
//!
//! ```
//! use fieldmap::{FieldOptions, Mapper, MappingDefinition, Record};
//! use serde_json::json;
//!
//! let def = MappingDefinition::builder("contact")
//!     .computed_with("name", FieldOptions::new().describe("first and last name combined"))
//!     .method("name", |_, src| {
//!         let first = src.get_field("first_name")?;
//!         let last = src.get_field("last_name")?;
//!         Ok(json!(format!(
//!             "{} {}",
//!             first.as_str().unwrap_or_default(),
//!             last.as_str().unwrap_or_default()
//!         )))
//!     })
//!     .field_as("email", "email_address")
//!     .build();
//!
//! let src = Record::new()
//!     .with("first_name", json!("Ada"))
//!     .with("last_name", json!("Lovelace"))
//!     .with("email", json!("ada@example.com"));
//! let mut dest = Record::new();
//!
//! Mapper::new(def.into()).map(&src, &mut dest)?;
//! assert_eq!(dest.get("name"), Some(&json!("Ada Lovelace")));
//! assert_eq!(dest.get("email_address"), Some(&json!("ada@example.com")));
//! # Ok::<(), fieldmap::MapError>(())
//! ```

pub mod definition;
pub mod engine;
pub mod error;
pub mod fields;
pub mod registry;
pub mod rule;
pub mod util;

pub use definition::{MappingBuilder, MappingDefinition};
pub use engine::Mapper;
pub use error::{MapError, Result};
pub use fields::{truthy, FieldAccess, Record, Value};
pub use registry::MapSource;
pub use rule::{FieldOptions, FieldRule, Getter, Guards, Predicate};
pub use util::classify_name;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
