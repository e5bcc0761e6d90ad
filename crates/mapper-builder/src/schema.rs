use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::{
  attribute::AttributeDef,
  error::{Error, Result},
  instance::Instance,
  types::TypeRef,
  validation::Rule,
};

pub const DEFAULT_SEPARATOR: &str = ".";

/// Resolved schema of an object type.
///
/// Everything derived from the inheritance chain (merged attributes, aliases,
/// capability flags, error path separator) is computed once by
/// [`TypeDefinition::finish`]; an `ObjectType` never changes afterwards.
#[derive(Debug)]
pub struct ObjectType {
  name: String,
  parent: Option<Arc<ObjectType>>,
  attributes: IndexMap<String, AttributeDef>,
  declared: IndexSet<String>,
  aliases: IndexMap<String, String>,
  separator: String,
  xml_root: String,
  validatable: bool,
  nested_validations: bool,
  track_assignments: bool,
  validatable_attributes: Vec<String>,
}

impl ObjectType {
  /// Starts the definition of a root type.
  pub fn define(name: impl Into<String>) -> TypeDefinition {
    TypeDefinition::new(name.into(), None)
  }

  /// Starts the definition of a subtype inheriting every attribute, alias
  /// and capability of `parent`.
  pub fn extend(name: impl Into<String>, parent: &Arc<ObjectType>) -> TypeDefinition {
    TypeDefinition::new(name.into(), Some(Arc::clone(parent)))
  }

  #[must_use]
  pub fn name(&self) -> &str {
    &self.name
  }

  #[must_use]
  pub fn parent(&self) -> Option<&Arc<ObjectType>> {
    self.parent.as_ref()
  }

  /// All attributes, ancestors first. Overrides keep the inherited position.
  pub fn attributes(&self) -> impl Iterator<Item = &AttributeDef> {
    self.attributes.values()
  }

  /// Attributes declared (or overridden) at this level of the hierarchy.
  pub fn declared_attributes(&self) -> impl Iterator<Item = &AttributeDef> {
    self.declared.iter().filter_map(|name| self.attributes.get(name))
  }

  /// Attributes whose type is itself schema-described.
  pub fn nested_attributes(&self) -> impl Iterator<Item = &AttributeDef> {
    self.attributes().filter(|attr| attr.is_nested())
  }

  /// Attributes nested validation cascades into.
  pub fn validatable_attributes(&self) -> impl Iterator<Item = &AttributeDef> {
    self
      .validatable_attributes
      .iter()
      .filter_map(|name| self.attributes.get(name))
  }

  #[must_use]
  pub fn attribute_count(&self) -> usize {
    self.attributes.len()
  }

  /// Maps an attribute or alias name to the canonical attribute name.
  #[must_use]
  pub fn canonical_name<'a>(&'a self, name: &'a str) -> Option<&'a str> {
    if let Some(canonical) = self.aliases.get(name) {
      return Some(canonical.as_str());
    }
    self.attributes.get_key_value(name).map(|(key, _)| key.as_str())
  }

  #[must_use]
  pub fn find(&self, name: &str) -> Option<&AttributeDef> {
    self.canonical_name(name).and_then(|canonical| self.attributes.get(canonical))
  }

  /// Looks an attribute up by name or alias.
  pub fn resolve(&self, name: &str) -> Result<&AttributeDef> {
    self.find(name).ok_or_else(|| Error::unknown_attribute(&self.name, name))
  }

  /// Alias name to canonical name, including inherited aliases.
  #[must_use]
  pub fn aliases(&self) -> &IndexMap<String, String> {
    &self.aliases
  }

  #[must_use]
  pub fn separator(&self) -> &str {
    &self.separator
  }

  #[must_use]
  pub fn xml_root(&self) -> &str {
    &self.xml_root
  }

  #[must_use]
  pub fn is_validatable(&self) -> bool {
    self.validatable
  }

  #[must_use]
  pub fn has_nested_validations(&self) -> bool {
    self.nested_validations
  }

  #[must_use]
  pub fn tracks_assignments(&self) -> bool {
    self.track_assignments
  }

  /// True when `self` is `other` or one of its descendants.
  #[must_use]
  pub fn is_a(&self, other: &ObjectType) -> bool {
    let mut current = Some(self);
    while let Some(ty) = current {
      if std::ptr::eq(ty, other) {
        return true;
      }
      current = ty.parent.as_deref();
    }
    false
  }

  /// Creates a default instance, hands it to `mutate` and returns it.
  ///
  /// ```
  /// use mapper_builder::{ObjectType, TypeRef};
  ///
  /// let mut amount = ObjectType::define("Amount");
  /// amount.attribute("value", TypeRef::FLOAT)?.attribute("currency", TypeRef::STRING)?;
  /// let amount = amount.finish();
  ///
  /// let mut transaction = ObjectType::define("Transaction");
  /// transaction
  ///   .attribute("cvv_code", TypeRef::STRING)?
  ///   .attribute("amount", &amount)?;
  /// let transaction = transaction.finish();
  ///
  /// let built = transaction.build(|t| {
  ///   t.set("cvv_code", "321")?;
  ///   t.with("amount", |a| {
  ///     a.set("value", 45.0)?;
  ///     a.set("currency", "USD")
  ///   })?;
  ///   Ok(())
  /// })?;
  ///
  /// assert_eq!(built.get("cvv_code")?.and_then(|v| v.as_str()), Some("321"));
  /// # Ok::<(), mapper_builder::Error>(())
  /// ```
  pub fn build<F>(self: &Arc<Self>, mutate: F) -> Result<Instance>
  where
    F: FnOnce(&mut Instance) -> Result<()>,
  {
    Instance::build(self, mutate)
  }
}

/// Mutable declaration layer for one level of a type hierarchy.
#[derive(Debug)]
pub struct TypeDefinition {
  name: String,
  parent: Option<Arc<ObjectType>>,
  attributes: IndexMap<String, AttributeDef>,
  declared: IndexSet<String>,
  aliases: IndexMap<String, String>,
  separator: Option<String>,
  xml_root: Option<String>,
  validatable: bool,
  nested_validations: bool,
  track_assignments: bool,
}

impl TypeDefinition {
  fn new(name: String, parent: Option<Arc<ObjectType>>) -> Self {
    let (attributes, aliases, validatable, nested_validations, track_assignments) = match &parent {
      Some(parent) => (
        parent.attributes.clone(),
        parent.aliases.clone(),
        parent.validatable,
        parent.nested_validations,
        parent.track_assignments,
      ),
      None => (IndexMap::new(), IndexMap::new(), false, false, false),
    };

    Self {
      name,
      parent,
      attributes,
      declared: IndexSet::new(),
      aliases,
      separator: None,
      xml_root: None,
      validatable,
      nested_validations,
      track_assignments,
    }
  }

  #[must_use]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Marks the type as carrying the validation capability.
  #[must_use]
  pub fn validatable(mut self) -> Self {
    self.validatable = true;
    self
  }

  /// Cascades validation into validatable nested attributes. Implies
  /// [`validatable`](Self::validatable).
  #[must_use]
  pub fn nested_validations(mut self) -> Self {
    self.validatable = true;
    self.nested_validations = true;
    self
  }

  /// Records which attributes are assigned after construction.
  #[must_use]
  pub fn track_assignments(mut self) -> Self {
    self.track_assignments = true;
    self
  }

  /// Separator used when nested error paths are rewritten, `.` unless set
  /// here or on an ancestor.
  #[must_use]
  pub fn nested_error_separator(mut self, separator: impl Into<String>) -> Self {
    self.separator = Some(separator.into());
    self
  }

  #[must_use]
  pub fn xml_root(mut self, root: impl Into<String>) -> Self {
    self.xml_root = Some(root.into());
    self
  }

  /// Registers an attribute at this level.
  ///
  /// Declaring a name twice at the same level fails; declaring a name that
  /// an ancestor already has replaces the inherited definition in place and
  /// keeps its aliases.
  pub fn declare(&mut self, mut def: AttributeDef) -> Result<&mut Self> {
    let name = def.name().to_string();
    if self.declared.contains(&name) || self.aliases.contains_key(&name) {
      return Err(Error::duplicate_attribute(&self.name, &name));
    }

    if let Some(inherited) = self.attributes.get(&name) {
      for alias in inherited.aliases() {
        def.add_alias(alias);
      }
    }

    self.attributes.insert(name.clone(), def);
    self.declared.insert(name);
    Ok(self)
  }

  pub fn attribute(&mut self, name: impl Into<String>, type_ref: impl Into<TypeRef>) -> Result<&mut Self> {
    self.declare(AttributeDef::builder().name(name).type_ref(type_ref).build())
  }

  pub fn collection(&mut self, name: impl Into<String>, type_ref: impl Into<TypeRef>) -> Result<&mut Self> {
    self.declare(
      AttributeDef::builder()
        .name(name)
        .type_ref(type_ref)
        .collection(true)
        .build(),
    )
  }

  /// Makes `alias` read and write the same slot as `existing`.
  pub fn alias(&mut self, alias: &str, existing: &str) -> Result<&mut Self> {
    let canonical = self.aliases.get(existing).map_or(existing, String::as_str).to_string();
    if !self.attributes.contains_key(&canonical) {
      return Err(Error::unknown_attribute(&self.name, existing));
    }
    if self.attributes.contains_key(alias) || self.aliases.contains_key(alias) {
      return Err(Error::duplicate_attribute(&self.name, alias));
    }

    if let Some(def) = self.attributes.get_mut(&canonical) {
      def.add_alias(alias);
    }
    self.aliases.insert(alias.to_string(), canonical);
    Ok(self)
  }

  /// Adds a validation rule to an attribute visible at this level.
  pub fn validates(&mut self, name: &str, rule: Rule) -> Result<&mut Self> {
    let canonical = self.aliases.get(name).map_or(name, String::as_str).to_string();
    let Some(def) = self.attributes.get_mut(&canonical) else {
      return Err(Error::unknown_attribute(&self.name, name));
    };
    def.push_rule(rule);
    Ok(self)
  }

  #[must_use]
  pub fn finish(self) -> Arc<ObjectType> {
    let separator = self
      .separator
      .or_else(|| self.parent.as_ref().map(|p| p.separator.clone()))
      .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string());
    let xml_root = self.xml_root.unwrap_or_else(|| self.name.clone());
    let validatable_attributes = self
      .attributes
      .values()
      .filter(|attr| attr.is_validatable())
      .map(|attr| attr.name().to_string())
      .collect();

    Arc::new(ObjectType {
      name: self.name,
      parent: self.parent,
      attributes: self.attributes,
      declared: self.declared,
      aliases: self.aliases,
      separator,
      xml_root,
      validatable: self.validatable,
      nested_validations: self.nested_validations,
      track_assignments: self.track_assignments,
      validatable_attributes,
    })
  }
}
