//! Deserialization entry points and serializers.
//!
//! Every entry point builds a default instance first and then goes through
//! [`Instance::set`](crate::Instance::set), so values read from a document
//! count as assigned on tracking types.

pub mod hash;
pub mod xml;

use chrono::{DateTime, NaiveDate};

use crate::{types::PrimitiveKind, value::Value};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses the textual form of a scalar.
pub(crate) fn parse_scalar(kind: PrimitiveKind, text: &str) -> Option<Value> {
  match kind {
    PrimitiveKind::String => Some(Value::String(text.to_string())),
    PrimitiveKind::Integer => text.trim().parse().ok().map(Value::Integer),
    PrimitiveKind::Float => text.trim().parse().ok().map(Value::Float),
    PrimitiveKind::Boolean => match text.trim() {
      "true" | "1" => Some(Value::Boolean(true)),
      "false" | "0" => Some(Value::Boolean(false)),
      _ => None,
    },
    PrimitiveKind::Date => NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok().map(Value::Date),
    PrimitiveKind::Time => DateTime::parse_from_rfc3339(text.trim()).ok().map(Value::Time),
    PrimitiveKind::Decimal => {
      let text = text.trim();
      text.parse::<f64>().is_ok().then(|| Value::Decimal(text.to_string()))
    }
    PrimitiveKind::Opaque => Some(Value::Opaque(
      serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string())),
    )),
  }
}

/// Textual form of a scalar; `None` for objects and lists.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) | Value::Decimal(s) => Some(s.clone()),
    Value::Integer(i) => Some(i.to_string()),
    Value::Float(f) => Some(f.to_string()),
    Value::Boolean(b) => Some(b.to_string()),
    Value::Date(d) => Some(d.format(DATE_FORMAT).to_string()),
    Value::Time(t) => Some(t.to_rfc3339()),
    Value::Opaque(json) => Some(json.to_string()),
    Value::Object(_) | Value::List(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_scalar_kinds() {
    assert_eq!(parse_scalar(PrimitiveKind::Integer, " 42 "), Some(Value::Integer(42)));
    assert_eq!(parse_scalar(PrimitiveKind::Float, "123.1"), Some(Value::Float(123.1)));
    assert_eq!(parse_scalar(PrimitiveKind::Boolean, "false"), Some(Value::Boolean(false)));
    assert_eq!(
      parse_scalar(PrimitiveKind::Date, "2045-12-01"),
      Some(Value::Date(NaiveDate::from_ymd_opt(2045, 12, 1).unwrap()))
    );
    assert_eq!(parse_scalar(PrimitiveKind::Decimal, "12.50"), Some(Value::Decimal("12.50".into())));
    assert_eq!(parse_scalar(PrimitiveKind::Decimal, "twelve"), None);
    assert_eq!(
      parse_scalar(PrimitiveKind::Opaque, "[1,2]"),
      Some(Value::Opaque(serde_json::json!([1, 2])))
    );
  }

  #[test]
  fn test_scalar_text_round_trips_times() {
    let time = DateTime::parse_from_rfc3339("2024-05-01T10:30:00+02:00").unwrap();
    let text = scalar_text(&Value::Time(time)).unwrap();
    assert_eq!(parse_scalar(PrimitiveKind::Time, &text), Some(Value::Time(time)));
  }
}
