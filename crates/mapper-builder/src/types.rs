use std::{fmt, sync::Arc};

use crate::schema::ObjectType;

/// Scalar attribute kinds understood by the mapping layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveKind {
  String,
  Integer,
  Float,
  Boolean,
  /// Calendar date, `YYYY-MM-DD`.
  Date,
  /// RFC 3339 timestamp with offset.
  Time,
  /// Arbitrary precision number kept in its textual form.
  Decimal,
  /// Any JSON value, passed through untouched.
  Opaque,
}

/// Declared type of an attribute.
///
/// Object references hold the referenced type itself, so a type has to be
/// finished before another type can point at it.
#[derive(Clone)]
pub enum TypeRef {
  Primitive(PrimitiveKind),
  Object(Arc<ObjectType>),
}

impl TypeRef {
  pub const STRING: Self = Self::Primitive(PrimitiveKind::String);
  pub const INTEGER: Self = Self::Primitive(PrimitiveKind::Integer);
  pub const FLOAT: Self = Self::Primitive(PrimitiveKind::Float);
  pub const BOOLEAN: Self = Self::Primitive(PrimitiveKind::Boolean);
  pub const DATE: Self = Self::Primitive(PrimitiveKind::Date);
  pub const TIME: Self = Self::Primitive(PrimitiveKind::Time);
  pub const DECIMAL: Self = Self::Primitive(PrimitiveKind::Decimal);
  pub const OPAQUE: Self = Self::Primitive(PrimitiveKind::Opaque);

  #[must_use]
  pub fn object(ty: &Arc<ObjectType>) -> Self {
    Self::Object(Arc::clone(ty))
  }

  #[must_use]
  pub fn object_type(&self) -> Option<&Arc<ObjectType>> {
    match self {
      Self::Object(ty) => Some(ty),
      Self::Primitive(_) => None,
    }
  }

  #[must_use]
  pub fn primitive(&self) -> Option<PrimitiveKind> {
    match self {
      Self::Primitive(kind) => Some(*kind),
      Self::Object(_) => None,
    }
  }

  #[must_use]
  pub fn is_object(&self) -> bool {
    matches!(self, Self::Object(_))
  }

  /// Display name used in error messages and reflection output.
  #[must_use]
  pub fn describe(&self) -> String {
    match self {
      Self::Primitive(kind) => kind.to_string(),
      Self::Object(ty) => ty.name().to_string(),
    }
  }
}

impl From<PrimitiveKind> for TypeRef {
  fn from(kind: PrimitiveKind) -> Self {
    Self::Primitive(kind)
  }
}

impl From<&Arc<ObjectType>> for TypeRef {
  fn from(ty: &Arc<ObjectType>) -> Self {
    Self::object(ty)
  }
}

impl fmt::Debug for TypeRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Primitive(kind) => write!(f, "Primitive({kind})"),
      Self::Object(ty) => write!(f, "Object({})", ty.name()),
    }
  }
}

impl PartialEq for TypeRef {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Self::Primitive(a), Self::Primitive(b)) => a == b,
      (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
      _ => false,
    }
  }
}
