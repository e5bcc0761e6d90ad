use std::{path::PathBuf, sync::Arc};

use chrono::{Local, Timelike};
use crossterm::style::Stylize;
use mapper_builder::{Instance, ObjectType};

use crate::{
  ui::{CheckCommand, Colors},
  utils::{DocumentFormat, DocumentLoader, load_registry},
};

pub(crate) fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

#[derive(Debug, Clone)]
pub struct CheckConfig {
  pub schema: PathBuf,
  pub type_name: String,
  pub input: PathBuf,
  pub format: Option<DocumentFormat>,
  pub verbose: bool,
  pub quiet: bool,
}

impl From<CheckCommand> for CheckConfig {
  fn from(command: CheckCommand) -> Self {
    let CheckCommand {
      schema,
      type_name,
      input,
      format,
      verbose,
      quiet,
    } = command;

    Self {
      schema,
      type_name,
      input,
      format,
      verbose: verbose && !quiet,
      quiet,
    }
  }
}

/// Result of mapping one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
  /// Canonical names of the attributes the document assigned, in order.
  pub assigned: Vec<String>,
  pub unknown_keys: Vec<String>,
  /// `None` when the type has no validation capability.
  pub errors: Option<Vec<String>>,
}

impl CheckReport {
  #[must_use]
  pub fn is_valid(&self) -> bool {
    self.errors.as_ref().is_none_or(Vec::is_empty)
  }
}

struct CheckLogger<'a> {
  config: &'a CheckConfig,
  colors: &'a Colors,
}

impl<'a> CheckLogger<'a> {
  fn new(config: &'a CheckConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!("{} {message}", format_timestamp().with(self.colors.timestamp()));
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      );
    }
  }

  fn log_loading(&self) {
    self.info(
      &format!("Loading schema from: {}", self.config.schema.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_mapping(&self, format: DocumentFormat) {
    self.info(
      &format!(
        "Mapping {format} document {} onto {}",
        self.config.input.display(),
        self.config.type_name
      )
      .with(self.colors.primary())
      .to_string(),
    );
  }

  fn print_assigned(&self, report: &CheckReport, instance: &Instance) {
    self.stat("Assigned attributes:", report.assigned.len().to_string());

    if self.config.verbose {
      for name in &report.assigned {
        let shown = instance
          .get(name)
          .ok()
          .flatten()
          .map_or_else(|| "(cleared)".to_string(), |value| value.to_json().to_string());
        println!(
          "              {}: {}",
          name.as_str().with(self.colors.label()),
          shown.with(self.colors.value())
        );
      }
    }
  }

  fn print_unknown_keys(&self, keys: &[String]) {
    if keys.is_empty() || self.config.quiet {
      return;
    }

    self.stat("Unknown keys:", keys.len().to_string());
    for key in keys {
      eprintln!(
        "{} {}",
        "Warning:".with(self.colors.warning()),
        format!("'{key}' is not an attribute of {}", self.config.type_name).with(self.colors.primary())
      );
    }
  }

  fn print_errors(&self, errors: &[String]) {
    for message in errors {
      eprintln!(
        "{} {}",
        "Invalid:".with(self.colors.error()),
        message.as_str().with(self.colors.primary())
      );
    }
  }

  fn log_result(&self, report: &CheckReport) {
    if self.config.quiet {
      return;
    }

    let message = match &report.errors {
      None => format!("{} has no validations; document mapped", self.config.type_name),
      Some(errors) if errors.is_empty() => format!("Document is a valid {}", self.config.type_name),
      Some(errors) => format!("Document has {} validation error(s)", errors.len()),
    };
    let color = if report.is_valid() {
      self.colors.success()
    } else {
      self.colors.error()
    };

    println!();
    println!("{} {}", format_timestamp().with(self.colors.timestamp()), message.with(color));
  }
}

/// Maps the document onto the type and validates it when the type supports
/// validation.
pub fn check_instance(ty: &Arc<ObjectType>, loader: &DocumentLoader) -> anyhow::Result<(Instance, CheckReport)> {
  let unknown_keys = loader.unknown_keys(ty)?;
  let mut instance = loader.parse(ty)?;
  let assigned = instance.assigned_attribute_names().iter().cloned().collect();

  let errors = ty.is_validatable().then(|| {
    instance.validate();
    instance.errors().full_messages()
  });

  Ok((
    instance,
    CheckReport {
      assigned,
      unknown_keys,
      errors,
    },
  ))
}

pub async fn check_document(config: CheckConfig, colors: &Colors) -> anyhow::Result<CheckReport> {
  let logger = CheckLogger::new(&config, colors);

  logger.log_loading();
  let registry = load_registry(&config.schema).await?;
  let ty = registry.get(&config.type_name)?;

  let loader = DocumentLoader::open(&config.input, config.format).await?;
  logger.log_mapping(loader.format());

  let (instance, report) = check_instance(ty, &loader)?;
  logger.print_assigned(&report, &instance);
  logger.print_unknown_keys(&report.unknown_keys);
  if let Some(errors) = &report.errors {
    logger.print_errors(errors);
  }
  logger.log_result(&report);

  Ok(report)
}
