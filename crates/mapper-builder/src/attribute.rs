use std::{collections::BTreeSet, fmt, sync::Arc};

use crate::{types::TypeRef, validation::Rule, value::Value};

/// Produces the construction-time value of an attribute.
#[derive(Clone)]
pub struct DefaultFactory(Arc<dyn Fn() -> Value + Send + Sync>);

impl DefaultFactory {
  pub fn new(factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
    Self(Arc::new(factory))
  }

  /// A factory that hands out clones of a fixed value.
  pub fn value(value: impl Into<Value>) -> Self {
    let value = value.into();
    Self::new(move || value.clone())
  }

  #[must_use]
  pub fn produce(&self) -> Value {
    (self.0)()
  }
}

impl fmt::Debug for DefaultFactory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("DefaultFactory")
  }
}

/// A named, typed attribute of an object type.
#[derive(Debug, Clone, bon::Builder)]
#[builder(on(String, into))]
pub struct AttributeDef {
  name: String,
  #[builder(into)]
  type_ref: TypeRef,
  #[builder(default)]
  collection: bool,
  default: Option<DefaultFactory>,
  doc: Option<String>,
  #[builder(default)]
  rules: Vec<Rule>,
  #[builder(skip)]
  aliases: BTreeSet<String>,
}

impl AttributeDef {
  #[must_use]
  pub fn name(&self) -> &str {
    &self.name
  }

  #[must_use]
  pub fn type_ref(&self) -> &TypeRef {
    &self.type_ref
  }

  #[must_use]
  pub fn is_collection(&self) -> bool {
    self.collection
  }

  #[must_use]
  pub fn default_factory(&self) -> Option<&DefaultFactory> {
    self.default.as_ref()
  }

  #[must_use]
  pub fn doc(&self) -> Option<&str> {
    self.doc.as_deref()
  }

  #[must_use]
  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  /// Alternative names that read and write this attribute's slot.
  #[must_use]
  pub fn aliases(&self) -> &BTreeSet<String> {
    &self.aliases
  }

  /// Whether the attribute gets a building accessor.
  #[must_use]
  pub fn is_nested(&self) -> bool {
    self.type_ref.is_object()
  }

  /// Whether nested validation cascades into this attribute.
  #[must_use]
  pub fn is_validatable(&self) -> bool {
    self.type_ref.object_type().is_some_and(|ty| ty.is_validatable())
  }

  pub(crate) fn add_alias(&mut self, alias: &str) {
    self.aliases.insert(alias.to_string());
  }

  pub(crate) fn push_rule(&mut self, rule: Rule) {
    self.rules.push(rule);
  }

  /// Textual form of the declared type, `[T]` for collections.
  #[must_use]
  pub fn type_signature(&self) -> String {
    let base = self.type_ref.describe();
    if self.collection { format!("[{base}]") } else { base }
  }
}

impl PartialEq for AttributeDef {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name && self.type_ref == other.type_ref && self.collection == other.collection
  }
}
