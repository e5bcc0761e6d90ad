use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::{
  attribute::AttributeDef,
  error::{Error, Result},
  schema::ObjectType,
  validation::Errors,
  value::Value,
};

/// An object of a schema-described type.
///
/// Values are stored under canonical attribute names; aliases resolve to the
/// same slot. Nested objects and collections are owned by their parent.
#[derive(Debug, Clone)]
pub struct Instance {
  pub(crate) ty: Arc<ObjectType>,
  pub(crate) values: IndexMap<String, Value>,
  pub(crate) assigned: IndexSet<String>,
  pub(crate) initialized: bool,
  pub(crate) errors: Errors,
}

impl Instance {
  /// Creates an instance with every attribute default applied.
  #[must_use]
  pub fn new(ty: &Arc<ObjectType>) -> Self {
    let mut instance = Self::uninitialized(ty);
    instance.initialized = true;
    instance
  }

  /// Creates an instance from initial values.
  ///
  /// Values are type checked like regular assignments but, being part of
  /// construction, are never reported as assigned.
  pub fn with_values<I, K, V>(ty: &Arc<ObjectType>, values: I) -> Result<Self>
  where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<Value>,
  {
    let mut instance = Self::uninitialized(ty);
    for (name, value) in values {
      instance.set(name.as_ref(), value)?;
    }
    instance.initialized = true;
    Ok(instance)
  }

  pub(crate) fn uninitialized(ty: &Arc<ObjectType>) -> Self {
    let values = ty
      .attributes()
      .filter_map(|attr| {
        attr
          .default_factory()
          .map(|factory| (attr.name().to_string(), factory.produce()))
      })
      .collect();

    Self {
      ty: Arc::clone(ty),
      values,
      assigned: IndexSet::new(),
      initialized: false,
      errors: Errors::default(),
    }
  }

  /// Creates a default instance of `ty`, applies `mutate` and returns the
  /// instance.
  pub fn build<F>(ty: &Arc<ObjectType>, mutate: F) -> Result<Self>
  where
    F: FnOnce(&mut Instance) -> Result<()>,
  {
    let mut instance = Self::new(ty);
    mutate(&mut instance)?;
    Ok(instance)
  }

  #[must_use]
  pub fn object_type(&self) -> &Arc<ObjectType> {
    &self.ty
  }

  #[must_use]
  pub fn is_initialized(&self) -> bool {
    self.initialized
  }

  pub fn get(&self, name: &str) -> Result<Option<&Value>> {
    let attr = self.ty.resolve(name)?;
    Ok(self.values.get(attr.name()))
  }

  pub fn get_mut(&mut self, name: &str) -> Result<Option<&mut Value>> {
    let ty = Arc::clone(&self.ty);
    let attr = ty.resolve(name)?;
    Ok(self.values.get_mut(attr.name()))
  }

  pub fn is_set(&self, name: &str) -> Result<bool> {
    self.get(name).map(|value| value.is_some())
  }

  /// Assigns an attribute (or alias) after checking the value against the
  /// declared type.
  pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
    let ty = Arc::clone(&self.ty);
    let attr = ty.resolve(name)?;
    let value = value.into();
    let found = value.kind_name();
    let Some(value) = value.conform(attr.type_ref(), attr.is_collection()) else {
      return Err(Error::TypeMismatch {
        type_name: ty.name().to_string(),
        attribute: name.to_string(),
        expected: attr.type_signature(),
        found,
      });
    };

    self.values.insert(attr.name().to_string(), value);
    self.mark_assigned(attr);
    Ok(())
  }

  /// Unsets an attribute. Counts as an assignment.
  pub fn clear(&mut self, name: &str) -> Result<()> {
    let ty = Arc::clone(&self.ty);
    let attr = ty.resolve(name)?;
    self.values.shift_remove(attr.name());
    self.mark_assigned(attr);
    Ok(())
  }

  /// The dispatching accessor.
  ///
  /// Without a callback it reads the attribute. With a callback on a nested
  /// attribute it builds a fresh instance of the attribute's type, applies
  /// the callback and either assigns it (singular) or appends it
  /// (collection), returning the new value. A callback given for a
  /// primitive attribute is never called.
  pub fn access<F>(&mut self, name: &str, mutate: Option<F>) -> Result<Option<&mut Value>>
  where
    F: FnOnce(&mut Instance) -> Result<()>,
  {
    let ty = Arc::clone(&self.ty);
    let attr = ty.resolve(name)?;

    let (Some(mutate), Some(child_ty)) = (mutate, attr.type_ref().object_type()) else {
      return Ok(self.values.get_mut(attr.name()));
    };

    let child = Value::Object(Self::build(child_ty, mutate)?);
    self.mark_assigned(attr);

    if !attr.is_collection() {
      self.values.insert(attr.name().to_string(), child);
      return Ok(self.values.get_mut(attr.name()));
    }

    let slot = self
      .values
      .entry(attr.name().to_string())
      .or_insert_with(|| Value::List(Vec::new()));
    if !matches!(slot, Value::List(_)) {
      *slot = Value::List(Vec::new());
    }
    let items = slot.as_list_mut();
    Ok(items.and_then(|items| {
      items.push(child);
      items.last_mut()
    }))
  }

  /// Builds a nested object through `mutate` and returns it.
  ///
  /// Singular attributes always receive a new instance, replacing whatever
  /// was bound before; collections get the instance appended.
  pub fn with<F>(&mut self, name: &str, mutate: F) -> Result<&mut Instance>
  where
    F: FnOnce(&mut Instance) -> Result<()>,
  {
    let ty = Arc::clone(&self.ty);
    let attr = ty.resolve(name)?;
    if !attr.is_nested() {
      return Err(Error::NotNested {
        type_name: ty.name().to_string(),
        attribute: name.to_string(),
      });
    }

    self
      .access(name, Some(mutate))?
      .and_then(Value::as_object_mut)
      .ok_or_else(|| Error::NotNested {
        type_name: ty.name().to_string(),
        attribute: name.to_string(),
      })
  }

  /// Set attributes paired with their definitions, in schema order.
  pub fn iter(&self) -> impl Iterator<Item = (&AttributeDef, &Value)> {
    self
      .ty
      .attributes()
      .filter_map(|attr| self.values.get(attr.name()).map(|value| (attr, value)))
  }

  fn mark_assigned(&mut self, attr: &AttributeDef) {
    if self.initialized && self.ty.tracks_assignments() {
      self.assigned.insert(attr.name().to_string());
    }
  }
}

impl PartialEq for Instance {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.ty, &other.ty) && self.values == other.values
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{attribute::DefaultFactory, types::TypeRef};

  fn amount() -> Arc<ObjectType> {
    let mut def = ObjectType::define("Amount");
    def
      .attribute("value", TypeRef::FLOAT)
      .unwrap()
      .declare(
        AttributeDef::builder()
          .name("currency")
          .type_ref(TypeRef::STRING)
          .default(DefaultFactory::value("USD"))
          .build(),
      )
      .unwrap();
    def.finish()
  }

  fn transaction(amount: &Arc<ObjectType>) -> Arc<ObjectType> {
    let mut def = ObjectType::define("Transaction");
    def
      .attribute("cvv_code", TypeRef::STRING)
      .unwrap()
      .attribute("amount", amount)
      .unwrap()
      .collection("refunds", amount)
      .unwrap()
      .collection("tags", TypeRef::STRING)
      .unwrap();
    def.finish()
  }

  #[test]
  fn test_new_applies_defaults() {
    let ty = amount();
    let instance = Instance::new(&ty);

    assert_eq!(instance.get("currency").unwrap(), Some(&Value::from("USD")));
    assert_eq!(instance.get("value").unwrap(), None);
    assert!(instance.is_initialized());
  }

  #[test]
  fn test_set_rejects_incompatible_values() {
    let ty = amount();
    let mut instance = Instance::new(&ty);

    let err = instance.set("value", "forty five").unwrap_err();
    assert!(matches!(
      err,
      Error::TypeMismatch { ref expected, ref found, .. } if expected == "float" && found == "string"
    ));

    instance.set("value", 45).unwrap();
    assert_eq!(instance.get("value").unwrap(), Some(&Value::Float(45.0)));
  }

  #[test]
  fn test_unknown_attribute_access() {
    let ty = amount();
    let mut instance = Instance::new(&ty);

    assert!(matches!(
      instance.set("inexistent_method", 3).unwrap_err(),
      Error::UnknownAttribute { .. }
    ));
    assert!(matches!(instance.get("nope").unwrap_err(), Error::UnknownAttribute { .. }));
  }

  #[test]
  fn test_access_without_callback_is_a_getter() {
    let amount = amount();
    let ty = transaction(&amount);
    let mut instance = Instance::new(&ty);

    let value = instance
      .access::<fn(&mut Instance) -> Result<()>>("amount", None)
      .unwrap();
    assert!(value.is_none());
  }

  #[test]
  fn test_access_ignores_callback_on_primitive() {
    let amount = amount();
    let ty = transaction(&amount);
    let mut instance = Instance::new(&ty);
    instance.set("cvv_code", "123").unwrap();

    let value = instance
      .access("cvv_code", Some(|_: &mut Instance| panic!("callback must not run")))
      .unwrap()
      .cloned();
    assert_eq!(value, Some(Value::from("123")));
  }

  #[test]
  fn test_with_builds_a_fresh_child_each_time() {
    let amount = amount();
    let ty = transaction(&amount);
    let mut instance = Instance::new(&ty);

    instance.with("amount", |a| a.set("value", 1.0)).unwrap();
    let first = instance.get("amount").unwrap().cloned();

    instance.with("amount", |a| a.set("currency", "PLN")).unwrap();
    let second = instance.get("amount").unwrap().and_then(Value::as_object).unwrap();

    assert_eq!(second.get("value").unwrap(), None);
    assert_eq!(second.get("currency").unwrap(), Some(&Value::from("PLN")));
    assert_ne!(first.as_ref().and_then(Value::as_object), Some(second));
  }

  #[test]
  fn test_with_appends_to_collections() {
    let amount = amount();
    let ty = transaction(&amount);
    let mut instance = Instance::new(&ty);

    instance.with("refunds", |a| a.set("value", 1.0)).unwrap();
    instance.with("refunds", |a| a.set("value", 2.0)).unwrap();

    let refunds = instance.get("refunds").unwrap().and_then(Value::as_list).unwrap();
    assert_eq!(refunds.len(), 2);
    assert_eq!(
      refunds[1].as_object().unwrap().get("value").unwrap(),
      Some(&Value::Float(2.0))
    );
  }

  #[test]
  fn test_with_rejects_primitive_attributes() {
    let amount = amount();
    let ty = transaction(&amount);
    let mut instance = Instance::new(&ty);

    let err = instance.with("tags", |_| Ok(())).unwrap_err();
    assert!(matches!(err, Error::NotNested { .. }));
  }

  #[test]
  fn test_direct_assignment_of_prebuilt_child() {
    let amount = amount();
    let ty = transaction(&amount);

    let child = Instance::with_values(&amount, [("value", 45.0)]).unwrap();
    let built = Instance::build(&ty, |t| t.set("amount", child.clone())).unwrap();

    assert_eq!(built.get("amount").unwrap(), Some(&Value::Object(child)));
  }

  #[test]
  fn test_clear_unsets_value() {
    let ty = amount();
    let mut instance = Instance::new(&ty);
    instance.clear("currency").unwrap();
    assert!(!instance.is_set("currency").unwrap());
  }

  #[test]
  fn test_nested_errors_propagate_from_callbacks() {
    let amount = amount();
    let ty = transaction(&amount);

    let err = Instance::build(&ty, |t| {
      t.set("cvv_code", "321")?;
      t.with("amount", |a| {
        a.set("value", 45.0)?;
        a.set("inexistent_method", 3)
      })?;
      Ok(())
    })
    .unwrap_err();

    assert!(matches!(err, Error::UnknownAttribute { ref attribute, .. } if attribute == "inexistent_method"));
  }

  #[test]
  fn test_iter_follows_schema_order() {
    let ty = amount();
    let mut instance = Instance::new(&ty);
    instance.set("value", 3.5).unwrap();

    let names: Vec<&str> = instance.iter().map(|(attr, _)| attr.name()).collect();
    assert_eq!(names, vec!["value", "currency"]);
  }
}
