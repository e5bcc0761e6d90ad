use std::{path::Path, sync::Arc};

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};
use crossterm::style::Stylize;
use itertools::Itertools;
use mapper_builder::{AttributeDef, ObjectType};

use crate::{
  ui::{Colors, colors::ToComfyColor, term_width},
  utils::load_registry,
};

pub async fn inspect_schema(schema: &Path, type_name: Option<&str>, colors: &Colors) -> anyhow::Result<()> {
  let registry = load_registry(schema).await?;

  let types: Vec<&Arc<ObjectType>> = match type_name {
    Some(name) => vec![registry.get(name)?],
    None => registry.types().collect(),
  };

  for (index, ty) in types.into_iter().enumerate() {
    if index > 0 {
      println!();
    }
    println!("{}", type_heading(ty, colors));
    println!("{}", attribute_table(ty, colors));
  }

  Ok(())
}

fn type_heading(ty: &ObjectType, colors: &Colors) -> String {
  let mut heading = ty.name().with(colors.primary()).bold().to_string();
  if let Some(parent) = ty.parent() {
    heading.push_str(&format!(" < {}", parent.name().with(colors.label())));
  }

  let flags = type_flags(ty);
  if !flags.is_empty() {
    heading.push_str(&format!("  [{}]", flags.join(", ").with(colors.timestamp())));
  }
  heading
}

fn type_flags(ty: &ObjectType) -> Vec<String> {
  let mut flags = Vec::new();
  if ty.has_nested_validations() {
    flags.push(format!("nested validations ({})", ty.separator()));
  } else if ty.is_validatable() {
    flags.push("validatable".to_string());
  }
  if ty.tracks_assignments() {
    flags.push("tracks assignments".to_string());
  }
  if ty.xml_root() != ty.name() {
    flags.push(format!("xml <{}>", ty.xml_root()));
  }
  flags
}

fn attribute_table(ty: &ObjectType, colors: &Colors) -> Table {
  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut header = Row::new();
  for title in ["ATTRIBUTE", "TYPE", "NESTED", "VALIDATED", "ALIASES", "DOC"] {
    header.add_cell(Cell::new(title).fg(colors.label().to_comfy()));
  }
  table.set_header(header);

  for attr in ty.attributes() {
    table.add_row(attribute_row(attr, colors));
  }
  table
}

fn attribute_row(attr: &AttributeDef, colors: &Colors) -> Row {
  let mut row = Row::new();
  row.add_cell(
    Cell::new(attr.name())
      .fg(colors.value().to_comfy())
      .add_attribute(Attribute::Bold),
  );
  row.add_cell(Cell::new(attr.type_signature()).fg(colors.primary().to_comfy()));
  row.add_cell(flag_cell(attr.is_nested(), colors));
  row.add_cell(flag_cell(attr.is_validatable() || !attr.rules().is_empty(), colors));
  row.add_cell(Cell::new(attr.aliases().iter().join(", ")).fg(colors.warning().to_comfy()));
  row.add_cell(Cell::new(attr.doc().unwrap_or_default()));
  row
}

fn flag_cell(set: bool, colors: &Colors) -> Cell {
  let cell = Cell::new(if set { "yes" } else { "" }).set_alignment(CellAlignment::Center);
  cell.fg(colors.success().to_comfy())
}

#[cfg(test)]
mod tests {
  use mapper_builder::SchemaRegistry;

  use super::*;
  use crate::ui::colors::Theme;

  const SCHEMA: &str = r#"{
    "types": [
      { "name": "Amount", "validatable": true, "attributes": [ { "name": "value", "type": "float" } ] },
      {
        "name": "Transaction",
        "nested_validations": true,
        "track_assignments": true,
        "xml_root": "transaction",
        "attributes": [
          { "name": "cvv_code", "type": "string", "doc": "Card security code" },
          { "name": "amount", "type": "Amount" }
        ],
        "aliases": { "cvv": "cvv_code" }
      }
    ]
  }"#;

  fn plain() -> Colors {
    Colors::new(false, Theme::Dark)
  }

  #[test]
  fn test_type_flags() {
    let registry = SchemaRegistry::from_json_str(SCHEMA).unwrap();
    assert_eq!(type_flags(registry.get("Amount").unwrap()), vec!["validatable"]);
    assert_eq!(
      type_flags(registry.get("Transaction").unwrap()),
      vec!["nested validations (.)", "tracks assignments", "xml <transaction>"]
    );
  }

  #[test]
  fn test_attribute_table_lists_aliases_and_docs() {
    let registry = SchemaRegistry::from_json_str(SCHEMA).unwrap();
    let rendered = attribute_table(registry.get("Transaction").unwrap(), &plain()).to_string();

    assert!(rendered.contains("cvv_code"));
    assert!(rendered.contains("cvv"));
    assert!(rendered.contains("security"));
    assert!(rendered.contains("Amount"));
  }
}
