use std::sync::Arc;

use serde_json::{Map, Value as Json};

use super::{parse_scalar, scalar_text};
use crate::{
  attribute::AttributeDef,
  error::{Error, Result},
  instance::Instance,
  schema::ObjectType,
  types::{PrimitiveKind, TypeRef},
  value::Value,
};

impl Instance {
  /// Hash form of the instance. Unset attributes are omitted.
  #[must_use]
  pub fn to_hash(&self) -> Map<String, Json> {
    self
      .iter()
      .map(|(attr, value)| (attr.name().to_string(), value.to_json()))
      .collect()
  }

  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string(&self.to_hash())?)
  }

  pub fn to_json_pretty(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(&self.to_hash())?)
  }

  /// Reads an instance from its hash form.
  ///
  /// Keys that are not attribute names are skipped; `null` clears the
  /// attribute.
  pub fn from_hash(ty: &Arc<ObjectType>, hash: &Map<String, Json>) -> Result<Self> {
    Self::new(ty).read_hash(hash, true)
  }

  /// Reads an instance from its hash form as part of construction: neither
  /// the instance nor any object nested in it reports the keys as assigned.
  pub(crate) fn from_hash_untracked(ty: &Arc<ObjectType>, hash: &Map<String, Json>) -> Result<Self> {
    let mut instance = Self::uninitialized(ty).read_hash(hash, false)?;
    instance.initialized = true;
    Ok(instance)
  }

  fn read_hash(mut self, hash: &Map<String, Json>, tracked: bool) -> Result<Self> {
    let ty = Arc::clone(&self.ty);
    for (key, json) in hash {
      let Some(attr) = ty.find(key).filter(|attr| attr.name() == key.as_str()) else {
        continue;
      };

      if json.is_null() {
        self.clear(key)?;
        continue;
      }

      let value = value_from_json(attr, json, tracked)?;
      self.set(key, value)?;
    }
    Ok(self)
  }

  pub fn from_json(ty: &Arc<ObjectType>, json: &str) -> Result<Self> {
    match serde_json::from_str::<Json>(json)? {
      Json::Object(hash) => Self::from_hash(ty, &hash),
      other => Err(Error::invalid_value(
        ty.name(),
        format!("expected a JSON object, got {}", json_kind(&other)),
      )),
    }
  }

  /// Keys of `hash` (recursively, as dotted paths) that no attribute maps.
  #[must_use]
  pub fn unknown_keys(ty: &ObjectType, hash: &Map<String, Json>) -> Vec<String> {
    let mut unknown = Vec::new();
    collect_unknown_keys(ty, hash, "", &mut unknown);
    unknown
  }
}

fn collect_unknown_keys(ty: &ObjectType, hash: &Map<String, Json>, prefix: &str, unknown: &mut Vec<String>) {
  for (key, json) in hash {
    let path = format!("{prefix}{key}");
    let Some(attr) = ty.find(key).filter(|attr| attr.name() == key.as_str()) else {
      unknown.push(path);
      continue;
    };
    let Some(child_ty) = attr.type_ref().object_type() else {
      continue;
    };

    match json {
      Json::Object(child) => collect_unknown_keys(child_ty, child, &format!("{path}."), unknown),
      Json::Array(items) => {
        for (index, item) in items.iter().enumerate() {
          if let Json::Object(child) = item {
            collect_unknown_keys(child_ty, child, &format!("{path}[{index}]."), unknown);
          }
        }
      }
      _ => {}
    }
  }
}

impl serde::Serialize for Instance {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    self.to_hash().serialize(serializer)
  }
}

impl Value {
  /// Hash form of a single value.
  #[must_use]
  pub fn to_json(&self) -> Json {
    match self {
      Self::Integer(i) => Json::from(*i),
      Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
      Self::Boolean(b) => Json::Bool(*b),
      Self::Opaque(json) => json.clone(),
      Self::Object(instance) => Json::Object(instance.to_hash()),
      Self::List(items) => Json::Array(items.iter().map(Self::to_json).collect()),
      Self::String(_) | Self::Decimal(_) | Self::Date(_) | Self::Time(_) => {
        scalar_text(self).map_or(Json::Null, Json::String)
      }
    }
  }
}

/// Converts the hash form of one attribute, collections included.
pub(crate) fn attribute_value_from_json(attr: &AttributeDef, json: &Json) -> Result<Value> {
  value_from_json(attr, json, true)
}

/// Converts the hash form of an attribute default. Objects in it are built
/// without assignment tracking.
pub(crate) fn default_value_from_json(attr: &AttributeDef, json: &Json) -> Result<Value> {
  value_from_json(attr, json, false)
}

fn value_from_json(attr: &AttributeDef, json: &Json, tracked: bool) -> Result<Value> {
  if !attr.is_collection() {
    return from_json_single(attr, json, tracked);
  }

  let Json::Array(items) = json else {
    return Err(Error::invalid_value(
      attr.name(),
      format!("expected an array, got {}", json_kind(json)),
    ));
  };
  items
    .iter()
    .map(|item| from_json_single(attr, item, tracked))
    .collect::<Result<Vec<_>>>()
    .map(Value::List)
}

fn from_json_single(attr: &AttributeDef, json: &Json, tracked: bool) -> Result<Value> {
  let mismatch = || {
    Error::invalid_value(
      attr.name(),
      format!("expected {}, got {}", attr.type_ref().describe(), json_kind(json)),
    )
  };

  let kind = match attr.type_ref() {
    TypeRef::Object(child_ty) => {
      let Json::Object(hash) = json else {
        return Err(mismatch());
      };
      let child = if tracked {
        Instance::from_hash(child_ty, hash)?
      } else {
        Instance::from_hash_untracked(child_ty, hash)?
      };
      return Ok(Value::Object(child));
    }
    TypeRef::Primitive(kind) => *kind,
  };

  let value = match (kind, json) {
    (PrimitiveKind::Opaque, json) => Some(Value::Opaque(json.clone())),
    (PrimitiveKind::Integer, Json::Number(n)) => n.as_i64().map(Value::Integer),
    (PrimitiveKind::Float, Json::Number(n)) => n.as_f64().map(Value::Float),
    (PrimitiveKind::Decimal, Json::Number(n)) => Some(Value::Decimal(n.to_string())),
    (PrimitiveKind::Boolean, Json::Bool(b)) => Some(Value::Boolean(*b)),
    (PrimitiveKind::String, Json::Number(_) | Json::Bool(_)) => Some(Value::String(json.to_string())),
    (kind, Json::String(text)) => parse_scalar(kind, text),
    _ => None,
  };
  value.ok_or_else(mismatch)
}

fn json_kind(json: &Json) -> &'static str {
  match json {
    Json::Null => "null",
    Json::Bool(_) => "a boolean",
    Json::Number(_) => "a number",
    Json::String(_) => "a string",
    Json::Array(_) => "an array",
    Json::Object(_) => "an object",
  }
}
