use std::path::Path;

use crossterm::style::Stylize;

use super::check::format_timestamp;
use crate::{
  ui::{Colors, ConvertCommand},
  utils::{DocumentLoader, load_registry, render},
};

pub async fn convert_document(command: ConvertCommand, colors: &Colors) -> anyhow::Result<()> {
  let ConvertCommand {
    schema,
    type_name,
    input,
    format,
    to,
    output,
  } = command;

  let registry = load_registry(&schema).await?;
  let ty = registry.get(&type_name)?;
  let loader = DocumentLoader::open(&input, format).await?;
  let instance = loader.parse(ty)?;
  let rendered = render(&instance, to)?;

  match output {
    Some(path) => {
      write_output(&path, rendered).await?;
      println!(
        "{} {}",
        format_timestamp().with(colors.timestamp()),
        format!("Wrote {to} to: {}", path.display()).with(colors.success())
      );
    }
    None => println!("{rendered}"),
  }

  Ok(())
}

async fn write_output(path: &Path, content: String) -> anyhow::Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent).await?;
  }
  tokio::fs::write(path, content).await?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ui::colors::Theme, utils::DocumentFormat};

  const SCHEMA: &str = r#"{
    "types": [
      {
        "name": "Person",
        "xml_root": "person",
        "attributes": [
          { "name": "first_name", "type": "string" },
          { "name": "tags", "type": "string", "collection": true }
        ]
      }
    ]
  }"#;

  #[tokio::test]
  async fn test_convert_json_to_xml_file() {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("schema.json");
    let input = dir.path().join("person.json");
    let output = dir.path().join("out/person.xml");
    std::fs::write(&schema, SCHEMA).unwrap();
    std::fs::write(&input, r#"{"first_name":"Ada","tags":["a","b"]}"#).unwrap();

    let command = ConvertCommand {
      schema,
      type_name: "Person".to_string(),
      input,
      format: None,
      to: DocumentFormat::Xml,
      output: Some(output.clone()),
    };
    convert_document(command, &Colors::new(false, Theme::Dark)).await.unwrap();

    let xml = std::fs::read_to_string(output).unwrap();
    assert!(xml.starts_with("<person>"));
    assert!(xml.contains("<first_name>Ada</first_name>"));
    assert_eq!(xml.matches("<tags>").count(), 2);
  }

  #[tokio::test]
  async fn test_convert_unknown_type_fails() {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("schema.json");
    let input = dir.path().join("person.json");
    std::fs::write(&schema, SCHEMA).unwrap();
    std::fs::write(&input, "{}").unwrap();

    let command = ConvertCommand {
      schema,
      type_name: "Robot".to_string(),
      input,
      format: None,
      to: DocumentFormat::Json,
      output: None,
    };
    let err = convert_document(command, &Colors::new(false, Theme::Dark))
      .await
      .unwrap_err();
    assert!(err.to_string().contains("Robot"));
  }
}
