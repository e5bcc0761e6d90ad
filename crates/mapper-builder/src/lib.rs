//! Schema-described objects with a nested builder.
//!
//! Types are declared once through [`ObjectType::define`] /
//! [`ObjectType::extend`] and frozen by [`TypeDefinition::finish`]. Instances
//! are built through closures that receive the instance being configured;
//! nested attributes get their own closure via [`Instance::with`].

pub mod attribute;
pub mod codec;
pub mod error;
pub mod instance;
pub mod registry;
pub mod schema;
pub mod tracking;
pub mod types;
pub mod validation;
pub mod value;

pub use attribute::{AttributeDef, DefaultFactory};
pub use error::{Error, Result};
pub use instance::Instance;
pub use registry::{AttributeDocument, RuleDocument, SchemaDocument, SchemaRegistry, TypeDocument};
pub use schema::{DEFAULT_SEPARATOR, ObjectType, TypeDefinition};
pub use tracking::AttributeValue;
pub use types::{PrimitiveKind, TypeRef};
pub use validation::{AttributeError, CustomRule, Errors, Rule};
pub use validator::ValidationError;
pub use value::Value;
