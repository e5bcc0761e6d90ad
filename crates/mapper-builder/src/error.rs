pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("attribute '{attribute}' is already declared on '{type_name}'")]
  DuplicateAttribute { type_name: String, attribute: String },

  #[error("'{type_name}' has no attribute '{attribute}'")]
  UnknownAttribute { type_name: String, attribute: String },

  #[error("cannot assign {found} to '{type_name}.{attribute}' (expected {expected})")]
  TypeMismatch {
    type_name: String,
    attribute: String,
    expected: String,
    found: String,
  },

  #[error("'{type_name}.{attribute}' is not a nested object attribute")]
  NotNested { type_name: String, attribute: String },

  #[error("unknown type '{0}'")]
  UnknownType(String),

  #[error("type '{0}' is already registered")]
  DuplicateType(String),

  #[error("invalid value for '{attribute}': {reason}")]
  InvalidValue { attribute: String, reason: String },

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("XML error: {0}")]
  Xml(#[from] quick_xml::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  pub(crate) fn unknown_attribute(type_name: &str, attribute: &str) -> Self {
    Self::UnknownAttribute {
      type_name: type_name.to_string(),
      attribute: attribute.to_string(),
    }
  }

  pub(crate) fn duplicate_attribute(type_name: &str, attribute: &str) -> Self {
    Self::DuplicateAttribute {
      type_name: type_name.to_string(),
      attribute: attribute.to_string(),
    }
  }

  pub(crate) fn invalid_value(attribute: &str, reason: impl Into<String>) -> Self {
    Self::InvalidValue {
      attribute: attribute.to_string(),
      reason: reason.into(),
    }
  }
}
