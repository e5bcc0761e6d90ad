use std::{str::FromStr, sync::Arc};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
  attribute::{AttributeDef, DefaultFactory},
  codec::hash::default_value_from_json,
  error::{Error, Result},
  schema::ObjectType,
  types::{PrimitiveKind, TypeRef},
  validation::Rule,
};

/// Declarative form of a set of object types, as read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
  pub types: Vec<TypeDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDocument {
  pub name: String,
  /// Name of a type defined earlier in the document.
  #[serde(default)]
  pub extends: Option<String>,
  #[serde(default)]
  pub validatable: bool,
  #[serde(default)]
  pub nested_validations: bool,
  #[serde(default)]
  pub track_assignments: bool,
  #[serde(default)]
  pub separator: Option<String>,
  #[serde(default)]
  pub xml_root: Option<String>,
  #[serde(default)]
  pub attributes: Vec<AttributeDocument>,
  /// Alias name to existing attribute name.
  #[serde(default)]
  pub aliases: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeDocument {
  pub name: String,
  /// A primitive keyword (`string`, `float`, ...) or the name of a type
  /// defined earlier in the document.
  #[serde(rename = "type")]
  pub type_name: String,
  #[serde(default)]
  pub collection: bool,
  #[serde(default)]
  pub doc: Option<String>,
  #[serde(default)]
  pub default: Option<serde_json::Value>,
  #[serde(default)]
  pub rules: Vec<RuleDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleDocument {
  Presence,
  Length { min: Option<u64>, max: Option<u64> },
  Range { min: Option<f64>, max: Option<f64> },
  Email,
  Url,
}

impl From<&RuleDocument> for Rule {
  fn from(doc: &RuleDocument) -> Self {
    match doc {
      RuleDocument::Presence => Self::Presence,
      RuleDocument::Length { min, max } => Self::Length { min: *min, max: *max },
      RuleDocument::Range { min, max } => Self::Range { min: *min, max: *max },
      RuleDocument::Email => Self::Email,
      RuleDocument::Url => Self::Url,
    }
  }
}

/// Named object types, in definition order.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
  types: IndexMap<String, Arc<ObjectType>>,
}

impl SchemaRegistry {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_json_str(json: &str) -> Result<Self> {
    let document: SchemaDocument = serde_json::from_str(json)?;
    Self::from_document(&document)
  }

  /// Defines every type of the document in order. A type can only refer to
  /// types defined before it.
  pub fn from_document(document: &SchemaDocument) -> Result<Self> {
    let mut registry = Self::new();
    for ty in &document.types {
      registry.define(ty)?;
    }
    Ok(registry)
  }

  pub fn register(&mut self, ty: Arc<ObjectType>) -> Result<()> {
    if self.types.contains_key(ty.name()) {
      return Err(Error::DuplicateType(ty.name().to_string()));
    }
    self.types.insert(ty.name().to_string(), ty);
    Ok(())
  }

  pub fn get(&self, name: &str) -> Result<&Arc<ObjectType>> {
    self.types.get(name).ok_or_else(|| Error::UnknownType(name.to_string()))
  }

  pub fn types(&self) -> impl Iterator<Item = &Arc<ObjectType>> {
    self.types.values()
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.types.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.types.is_empty()
  }

  /// Resolves a primitive keyword or a registered type name.
  pub fn type_ref(&self, name: &str) -> Result<TypeRef> {
    if let Ok(kind) = PrimitiveKind::from_str(name) {
      return Ok(TypeRef::Primitive(kind));
    }
    self.get(name).map(TypeRef::object)
  }

  fn define(&mut self, doc: &TypeDocument) -> Result<()> {
    let mut def = match &doc.extends {
      Some(parent) => ObjectType::extend(&doc.name, self.get(parent)?),
      None => ObjectType::define(&doc.name),
    };

    if doc.validatable {
      def = def.validatable();
    }
    if doc.nested_validations {
      def = def.nested_validations();
    }
    if doc.track_assignments {
      def = def.track_assignments();
    }
    if let Some(separator) = &doc.separator {
      def = def.nested_error_separator(separator);
    }
    if let Some(root) = &doc.xml_root {
      def = def.xml_root(root);
    }

    for attr in &doc.attributes {
      def.declare(self.attribute(attr)?)?;
    }
    for (alias, existing) in &doc.aliases {
      def.alias(alias, existing)?;
    }

    self.register(def.finish())
  }

  fn attribute(&self, doc: &AttributeDocument) -> Result<AttributeDef> {
    let type_ref = self.type_ref(&doc.type_name)?;
    let rules = doc.rules.iter().map(Rule::from).collect();

    let default = match &doc.default {
      Some(json) => {
        let target = AttributeDef::builder()
          .name(&doc.name)
          .type_ref(type_ref.clone())
          .collection(doc.collection)
          .build();
        Some(DefaultFactory::value(default_value_from_json(&target, json)?))
      }
      None => None,
    };

    Ok(
      AttributeDef::builder()
        .name(&doc.name)
        .type_ref(type_ref)
        .collection(doc.collection)
        .maybe_default(default)
        .maybe_doc(doc.doc.clone())
        .rules(rules)
        .build(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{instance::Instance, value::Value};

  const DOCUMENT: &str = r#"{
    "types": [
      {
        "name": "Amount",
        "validatable": true,
        "attributes": [
          { "name": "value", "type": "float", "rules": [{ "rule": "presence" }, { "rule": "range", "min": 0 }] },
          { "name": "currency", "type": "string", "default": "USD", "doc": "ISO 4217 code" }
        ]
      },
      {
        "name": "Transaction",
        "nested_validations": true,
        "track_assignments": true,
        "separator": "/",
        "attributes": [
          { "name": "cvv_code", "type": "string" },
          { "name": "amount", "type": "Amount" },
          { "name": "refunds", "type": "Amount", "collection": true }
        ],
        "aliases": { "code": "cvv_code" }
      },
      { "name": "Sale", "extends": "Transaction", "xml_root": "sale" }
    ]
  }"#;

  #[test]
  fn test_document_defines_types_in_order() {
    let registry = SchemaRegistry::from_json_str(DOCUMENT).unwrap();
    assert_eq!(
      registry.types().map(|ty| ty.name()).collect::<Vec<_>>(),
      vec!["Amount", "Transaction", "Sale"]
    );

    let sale = registry.get("Sale").unwrap();
    assert!(sale.is_a(registry.get("Transaction").unwrap()));
    assert_eq!(sale.separator(), "/");
    assert_eq!(sale.xml_root(), "sale");
    assert_eq!(sale.resolve("code").unwrap().name(), "cvv_code");
    assert!(sale.resolve("amount").unwrap().is_validatable());
  }

  #[test]
  fn test_document_defaults_and_rules() {
    let registry = SchemaRegistry::from_json_str(DOCUMENT).unwrap();
    let amount = registry.get("Amount").unwrap();

    let currency = amount.resolve("currency").unwrap();
    assert_eq!(currency.doc(), Some("ISO 4217 code"));
    assert_eq!(Instance::new(amount).get("currency").unwrap(), Some(&Value::from("USD")));
    assert_eq!(amount.resolve("value").unwrap().rules().len(), 2);
  }

  #[test]
  fn test_forward_references_are_rejected() {
    let json = r#"{ "types": [ { "name": "A", "attributes": [ { "name": "b", "type": "B" } ] }, { "name": "B" } ] }"#;
    let err = SchemaRegistry::from_json_str(json).unwrap_err();
    assert!(matches!(err, Error::UnknownType(ref name) if name == "B"));
  }

  #[test]
  fn test_duplicate_types_are_rejected() {
    let json = r#"{ "types": [ { "name": "A" }, { "name": "A" } ] }"#;
    assert!(matches!(
      SchemaRegistry::from_json_str(json).unwrap_err(),
      Error::DuplicateType(_)
    ));
  }

  #[test]
  fn test_invalid_default_is_reported() {
    let json = r#"{ "types": [ { "name": "A", "attributes": [ { "name": "n", "type": "integer", "default": "x" } ] } ] }"#;
    assert!(matches!(
      SchemaRegistry::from_json_str(json).unwrap_err(),
      Error::InvalidValue { .. }
    ));
  }

  #[test]
  fn test_object_defaults_are_not_reported_as_assigned() {
    let json = r#"{
      "types": [
        { "name": "Amount", "track_assignments": true, "attributes": [ { "name": "currency", "type": "string" } ] },
        {
          "name": "Transaction",
          "track_assignments": true,
          "attributes": [
            { "name": "amount", "type": "Amount", "default": { "currency": "USD" } },
            { "name": "refunds", "type": "Amount", "collection": true, "default": [{ "currency": "EUR" }] }
          ]
        }
      ]
    }"#;
    let registry = SchemaRegistry::from_json_str(json).unwrap();
    let mut transaction = Instance::new(registry.get("Transaction").unwrap());

    assert!(transaction.assigned_attribute_names().is_empty());
    let Some(Value::Object(amount)) = transaction.get("amount").unwrap() else {
      panic!("expected a default amount");
    };
    assert_eq!(amount.get("currency").unwrap(), Some(&Value::from("USD")));
    assert!(amount.assigned_attribute_names().is_empty());
    let Some(Value::List(refunds)) = transaction.get("refunds").unwrap() else {
      panic!("expected default refunds");
    };
    let Value::Object(refund) = &refunds[0] else {
      panic!("expected a refund object");
    };
    assert!(refund.assigned_attribute_names().is_empty());

    transaction
      .with("amount", |amount| amount.set("currency", "GBP"))
      .unwrap();
    assert_eq!(
      transaction.assigned_attribute_names().iter().collect::<Vec<_>>(),
      vec!["amount"]
    );
    let Some(Value::Object(amount)) = transaction.get("amount").unwrap() else {
      panic!("expected an amount");
    };
    assert_eq!(
      amount.assigned_attribute_names().iter().collect::<Vec<_>>(),
      vec!["currency"]
    );
  }
}
