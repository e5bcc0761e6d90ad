use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::{
  instance::Instance,
  types::{PrimitiveKind, TypeRef},
};

/// A dynamically typed attribute value.
///
/// Unset attributes have no value at all; there is no null variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  String(String),
  Integer(i64),
  Float(f64),
  Boolean(bool),
  Date(NaiveDate),
  Time(DateTime<FixedOffset>),
  Decimal(String),
  Opaque(serde_json::Value),
  Object(Instance),
  List(Vec<Value>),
}

impl Value {
  /// Short description of the value's shape, used in type mismatch errors.
  #[must_use]
  pub fn kind_name(&self) -> String {
    match self {
      Self::String(_) => "string".to_string(),
      Self::Integer(_) => "integer".to_string(),
      Self::Float(_) => "float".to_string(),
      Self::Boolean(_) => "boolean".to_string(),
      Self::Date(_) => "date".to_string(),
      Self::Time(_) => "time".to_string(),
      Self::Decimal(_) => "decimal".to_string(),
      Self::Opaque(_) => "opaque".to_string(),
      Self::Object(instance) => format!("{} object", instance.object_type().name()),
      Self::List(_) => "list".to_string(),
    }
  }

  #[must_use]
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::String(s) | Self::Decimal(s) => Some(s),
      _ => None,
    }
  }

  #[must_use]
  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Integer(i) => Some(*i),
      _ => None,
    }
  }

  #[must_use]
  #[allow(clippy::cast_precision_loss)]
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Float(f) => Some(*f),
      Self::Integer(i) => Some(*i as f64),
      Self::Decimal(s) => s.parse().ok(),
      _ => None,
    }
  }

  #[must_use]
  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Boolean(b) => Some(*b),
      _ => None,
    }
  }

  #[must_use]
  pub fn as_date(&self) -> Option<NaiveDate> {
    match self {
      Self::Date(d) => Some(*d),
      _ => None,
    }
  }

  #[must_use]
  pub fn as_time(&self) -> Option<&DateTime<FixedOffset>> {
    match self {
      Self::Time(t) => Some(t),
      _ => None,
    }
  }

  #[must_use]
  pub fn as_object(&self) -> Option<&Instance> {
    match self {
      Self::Object(instance) => Some(instance),
      _ => None,
    }
  }

  pub fn as_object_mut(&mut self) -> Option<&mut Instance> {
    match self {
      Self::Object(instance) => Some(instance),
      _ => None,
    }
  }

  #[must_use]
  pub fn as_list(&self) -> Option<&[Value]> {
    match self {
      Self::List(items) => Some(items),
      _ => None,
    }
  }

  pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
    match self {
      Self::List(items) => Some(items),
      _ => None,
    }
  }

  /// Checks the value against an attribute's declared type, applying the
  /// lossless widenings the mapping layer allows (integer to float or decimal,
  /// scalars to opaque). Returns `None` when the value does not fit.
  pub(crate) fn conform(self, type_ref: &TypeRef, collection: bool) -> Option<Self> {
    if collection {
      let Self::List(items) = self else {
        return None;
      };
      return items
        .into_iter()
        .map(|item| item.conform_single(type_ref))
        .collect::<Option<Vec<_>>>()
        .map(Self::List);
    }

    self.conform_single(type_ref)
  }

  #[allow(clippy::cast_precision_loss)]
  fn conform_single(self, type_ref: &TypeRef) -> Option<Self> {
    match type_ref {
      TypeRef::Object(ty) => match self {
        Self::Object(instance) if instance.object_type().is_a(ty) => Some(Self::Object(instance)),
        _ => None,
      },
      TypeRef::Primitive(kind) => match (kind, self) {
        (PrimitiveKind::String, v @ Self::String(_))
        | (PrimitiveKind::Integer, v @ Self::Integer(_))
        | (PrimitiveKind::Float, v @ Self::Float(_))
        | (PrimitiveKind::Boolean, v @ Self::Boolean(_))
        | (PrimitiveKind::Date, v @ Self::Date(_))
        | (PrimitiveKind::Time, v @ Self::Time(_))
        | (PrimitiveKind::Decimal, v @ Self::Decimal(_))
        | (PrimitiveKind::Opaque, v @ Self::Opaque(_)) => Some(v),
        (PrimitiveKind::Float, Self::Integer(i)) => Some(Self::Float(i as f64)),
        (PrimitiveKind::Decimal, Self::Integer(i)) => Some(Self::Decimal(i.to_string())),
        (PrimitiveKind::Opaque, Self::String(s)) => Some(Self::Opaque(serde_json::Value::String(s))),
        (PrimitiveKind::Opaque, Self::Integer(i)) => Some(Self::Opaque(i.into())),
        (PrimitiveKind::Opaque, Self::Boolean(b)) => Some(Self::Opaque(b.into())),
        (PrimitiveKind::Opaque, Self::Float(f)) => serde_json::Number::from_f64(f)
          .map(serde_json::Value::Number)
          .map(Self::Opaque),
        _ => None,
      },
    }
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Self::String(value.to_string())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Self::String(value)
  }
}

impl From<i64> for Value {
  fn from(value: i64) -> Self {
    Self::Integer(value)
  }
}

impl From<i32> for Value {
  fn from(value: i32) -> Self {
    Self::Integer(i64::from(value))
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Self::Float(value)
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Self::Boolean(value)
  }
}

impl From<NaiveDate> for Value {
  fn from(value: NaiveDate) -> Self {
    Self::Date(value)
  }
}

impl From<DateTime<FixedOffset>> for Value {
  fn from(value: DateTime<FixedOffset>) -> Self {
    Self::Time(value)
  }
}

impl From<Instance> for Value {
  fn from(value: Instance) -> Self {
    Self::Object(value)
  }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
  fn from(values: Vec<T>) -> Self {
    Self::List(values.into_iter().map(Into::into).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::ObjectType;

  #[test]
  fn test_integer_widens_to_float() {
    let value = Value::Integer(45).conform(&TypeRef::FLOAT, false);
    assert_eq!(value, Some(Value::Float(45.0)));
  }

  #[test]
  fn test_collection_requires_list() {
    assert!(Value::from("a").conform(&TypeRef::STRING, true).is_none());
    assert!(Value::from(vec!["a"]).conform(&TypeRef::STRING, false).is_none());

    let list = Value::from(vec![1, 2]).conform(&TypeRef::FLOAT, true);
    assert_eq!(list, Some(Value::List(vec![Value::Float(1.0), Value::Float(2.0)])));
  }

  #[test]
  fn test_object_must_match_declared_type() {
    let amount = ObjectType::define("Amount").finish();
    let other = ObjectType::define("Other").finish();

    let value = Value::Object(Instance::new(&other));
    assert!(value.conform(&TypeRef::object(&amount), false).is_none());

    let value = Value::Object(Instance::new(&amount));
    assert!(value.conform(&TypeRef::object(&amount), false).is_some());
  }

  #[test]
  fn test_kind_name_describes_objects() {
    let amount = ObjectType::define("Amount").finish();
    assert_eq!(Value::Object(Instance::new(&amount)).kind_name(), "Amount object");
    assert_eq!(Value::from(true).kind_name(), "boolean");
  }
}
