use indexmap::IndexSet;

use crate::{attribute::AttributeDef, instance::Instance, value::Value};

/// An assigned attribute together with its current value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeValue<'a> {
  pub attribute: &'a AttributeDef,
  pub value: Option<&'a Value>,
}

impl Instance {
  /// Canonical names of the attributes assigned since construction finished,
  /// in assignment order.
  ///
  /// Always empty for types without assignment tracking.
  #[must_use]
  pub fn assigned_attribute_names(&self) -> &IndexSet<String> {
    &self.assigned
  }

  #[must_use]
  pub fn assigned_attributes(&self) -> Vec<&AttributeDef> {
    self
      .assigned
      .iter()
      .filter_map(|name| self.ty.find(name))
      .collect()
  }

  #[must_use]
  pub fn assigned_values(&self) -> Vec<AttributeValue<'_>> {
    self
      .assigned_attributes()
      .into_iter()
      .map(|attribute| AttributeValue {
        attribute,
        value: self.values.get(attribute.name()),
      })
      .collect()
  }
}
