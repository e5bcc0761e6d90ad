use std::{ffi::OsStr, path::Path, sync::Arc};

use clap::ValueEnum;
use mapper_builder::{Instance, ObjectType, SchemaRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DocumentFormat {
  #[default]
  Json,
  Xml,
}

impl DocumentFormat {
  #[must_use]
  pub fn from_extension(ext: &str) -> Self {
    match ext.to_ascii_lowercase().as_str() {
      "xml" => Self::Xml,
      _ => Self::Json,
    }
  }

  #[must_use]
  pub fn from_path(path: &Path) -> Self {
    path
      .extension()
      .and_then(OsStr::to_str)
      .map_or(Self::default(), Self::from_extension)
  }
}

pub async fn load_registry(path: &Path) -> anyhow::Result<SchemaRegistry> {
  let content = tokio::fs::read_to_string(path).await?;
  Ok(SchemaRegistry::from_json_str(&content)?)
}

/// A data document read from disk, not yet mapped onto a type.
pub struct DocumentLoader {
  content: String,
  format: DocumentFormat,
}

impl DocumentLoader {
  pub async fn open(path: &Path, format: Option<DocumentFormat>) -> anyhow::Result<Self> {
    let format = format.unwrap_or_else(|| DocumentFormat::from_path(path));
    let content = tokio::fs::read_to_string(path).await?;
    Ok(Self { content, format })
  }

  #[must_use]
  pub fn format(&self) -> DocumentFormat {
    self.format
  }

  pub fn parse(&self, ty: &Arc<ObjectType>) -> anyhow::Result<Instance> {
    match self.format {
      DocumentFormat::Json => Ok(Instance::from_json(ty, &self.content)?),
      DocumentFormat::Xml => Ok(Instance::from_xml(ty, &self.content)?),
    }
  }

  /// Keys of a JSON document that the type does not map. XML documents are
  /// not inspected.
  pub fn unknown_keys(&self, ty: &ObjectType) -> anyhow::Result<Vec<String>> {
    match self.format {
      DocumentFormat::Json => match serde_json::from_str::<serde_json::Value>(&self.content)? {
        serde_json::Value::Object(hash) => Ok(Instance::unknown_keys(ty, &hash)),
        _ => Ok(Vec::new()),
      },
      DocumentFormat::Xml => Ok(Vec::new()),
    }
  }
}

pub fn render(instance: &Instance, format: DocumentFormat) -> anyhow::Result<String> {
  match format {
    DocumentFormat::Json => Ok(instance.to_json_pretty()?),
    DocumentFormat::Xml => Ok(instance.to_xml_pretty()?),
  }
}
