use std::{borrow::Cow, fmt, sync::Arc};

use itertools::Itertools;
use validator::{ValidateEmail, ValidateUrl, ValidationError};

use crate::{instance::Instance, value::Value};

type CustomCheck = dyn Fn(&Value) -> Result<(), ValidationError> + Send + Sync;

/// Caller-supplied check for a present attribute value.
#[derive(Clone)]
pub struct CustomRule(Arc<CustomCheck>);

impl CustomRule {
  pub fn new(check: impl Fn(&Value) -> Result<(), ValidationError> + Send + Sync + 'static) -> Self {
    Self(Arc::new(check))
  }
}

impl fmt::Debug for CustomRule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("CustomRule")
  }
}

/// Per-attribute validation rules.
///
/// Only `Presence` looks at unset attributes; every other rule passes when
/// there is no value, and ignores values of a shape it does not apply to.
#[derive(Debug, Clone)]
pub enum Rule {
  Presence,
  /// Character count for strings, item count for collections.
  Length {
    min: Option<u64>,
    max: Option<u64>,
  },
  Range {
    min: Option<f64>,
    max: Option<f64>,
  },
  Email,
  Url,
  Custom(CustomRule),
}

impl Rule {
  pub fn custom(check: impl Fn(&Value) -> Result<(), ValidationError> + Send + Sync + 'static) -> Self {
    Self::Custom(CustomRule::new(check))
  }

  #[must_use]
  pub fn check(&self, value: Option<&Value>) -> Option<ValidationError> {
    if let Self::Presence = self {
      return match value {
        Some(value) if !is_blank(value) => None,
        _ => Some(ValidationError::new("presence").with_message(Cow::Borrowed("can't be blank"))),
      };
    }

    let value = value?;
    match self {
      Self::Presence => None,
      Self::Length { min, max } => {
        let len = match value {
          Value::String(s) => s.chars().count() as u64,
          Value::List(items) => items.len() as u64,
          _ => return None,
        };
        let too_short = min.is_some_and(|min| len < min);
        let too_long = max.is_some_and(|max| len > max);
        (too_short || too_long).then(|| {
          let mut err = ValidationError::new("length").with_message(Cow::Owned(length_message(*min, *max)));
          err.add_param(Cow::Borrowed("value"), &len);
          err
        })
      }
      Self::Range { min, max } => {
        let number = value.as_f64()?;
        let below = min.is_some_and(|min| number < min);
        let above = max.is_some_and(|max| number > max);
        (below || above).then(|| {
          let mut err = ValidationError::new("range").with_message(Cow::Owned(range_message(*min, *max)));
          err.add_param(Cow::Borrowed("value"), &number);
          err
        })
      }
      Self::Email => {
        let text = value.as_str()?;
        (!text.validate_email()).then(|| ValidationError::new("email").with_message(Cow::Borrowed("is not a valid email")))
      }
      Self::Url => {
        let text = value.as_str()?;
        (!text.validate_url()).then(|| ValidationError::new("url").with_message(Cow::Borrowed("is not a valid URL")))
      }
      Self::Custom(rule) => (rule.0)(value).err(),
    }
  }
}

fn is_blank(value: &Value) -> bool {
  match value {
    Value::String(s) => s.trim().is_empty(),
    Value::List(items) => items.is_empty(),
    Value::Opaque(serde_json::Value::Null) => true,
    _ => false,
  }
}

fn length_message(min: Option<u64>, max: Option<u64>) -> String {
  match (min, max) {
    (Some(min), Some(max)) => format!("length must be between {min} and {max}"),
    (Some(min), None) => format!("length must be at least {min}"),
    (None, Some(max)) => format!("length must be at most {max}"),
    (None, None) => "has an invalid length".to_string(),
  }
}

fn range_message(min: Option<f64>, max: Option<f64>) -> String {
  match (min, max) {
    (Some(min), Some(max)) => format!("must be between {min} and {max}"),
    (Some(min), None) => format!("must be greater than or equal to {min}"),
    (None, Some(max)) => format!("must be less than or equal to {max}"),
    (None, None) => "is out of range".to_string(),
  }
}

/// One validation failure and the attribute path it belongs to.
#[derive(Debug, Clone)]
pub struct AttributeError {
  pub attribute: String,
  pub error: ValidationError,
}

impl AttributeError {
  #[must_use]
  pub fn message(&self) -> Cow<'_, str> {
    match &self.error.message {
      Some(message) => Cow::Borrowed(message.as_ref()),
      None => Cow::Borrowed(self.error.code.as_ref()),
    }
  }
}

impl fmt::Display for AttributeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.attribute, self.message())
  }
}

/// Error collection of an instance, filled by [`Instance::validate`].
#[derive(Debug, Clone, Default)]
pub struct Errors {
  entries: Vec<AttributeError>,
}

impl Errors {
  pub fn add(&mut self, attribute: impl Into<String>, error: ValidationError) {
    self.entries.push(AttributeError {
      attribute: attribute.into(),
      error,
    });
  }

  /// Copies an error from another collection under a new attribute path.
  pub fn import(&mut self, error: &AttributeError, attribute: impl Into<String>) {
    self.add(attribute, error.error.clone());
  }

  pub fn on<'a>(&'a self, attribute: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
    self
      .entries
      .iter()
      .filter(move |entry| entry.attribute == attribute)
      .map(|entry| &entry.error)
  }

  pub fn iter(&self) -> impl Iterator<Item = &AttributeError> {
    self.entries.iter()
  }

  /// Distinct attribute paths, in the order they first failed.
  #[must_use]
  pub fn attributes(&self) -> Vec<&str> {
    self.entries.iter().map(|entry| entry.attribute.as_str()).unique().collect()
  }

  #[must_use]
  pub fn full_messages(&self) -> Vec<String> {
    self.entries.iter().map(ToString::to_string).collect()
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }
}

impl<'a> IntoIterator for &'a Errors {
  type Item = &'a AttributeError;
  type IntoIter = std::slice::Iter<'a, AttributeError>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.iter()
  }
}

impl Instance {
  /// Runs the attribute rules and, for types with nested validations, every
  /// validatable nested value. Child errors are imported with their path
  /// prefixed by the attribute name and the type's separator.
  ///
  /// All attributes are visited even after a failure.
  pub fn validate(&mut self) -> bool {
    self.errors.clear();
    let ty = Arc::clone(&self.ty);
    let mut valid = true;

    for attr in ty.attributes() {
      let value = self.values.get(attr.name());
      for rule in attr.rules() {
        if let Some(err) = rule.check(value) {
          self.errors.add(attr.name(), err);
          valid = false;
        }
      }
    }

    if !ty.has_nested_validations() {
      return valid;
    }

    let separator = ty.separator();
    for attr in ty.validatable_attributes() {
      let Some(value) = self.values.get_mut(attr.name()) else {
        continue;
      };

      match value {
        Value::Object(child) => {
          if !child.validate() {
            valid = false;
            for err in &child.errors {
              self
                .errors
                .import(err, format!("{}{separator}{}", attr.name(), err.attribute));
            }
          }
        }
        Value::List(items) => {
          for (index, item) in items.iter_mut().enumerate() {
            let Value::Object(child) = item else {
              continue;
            };
            if child.validate() {
              continue;
            }
            valid = false;
            for err in &child.errors {
              self
                .errors
                .import(err, format!("{}[{index}]{separator}{}", attr.name(), err.attribute));
            }
          }
        }
        _ => {}
      }
    }

    valid
  }

  #[must_use]
  pub fn errors(&self) -> &Errors {
    &self.errors
  }
}
