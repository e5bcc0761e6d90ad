#![allow(clippy::missing_errors_doc)]
use std::process::ExitCode;

use clap::Parser;

use crate::ui::{Cli, Colors, Commands, colors};

mod ui;
mod utils;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  let cli = Cli::parse();
  let colors = Colors::new(colors::colors_enabled(cli.color), colors::detect_theme(cli.theme));

  match cli.command {
    Commands::Inspect { schema, type_name } => {
      ui::commands::inspect_schema(&schema, type_name.as_deref(), &colors).await?;
    }
    Commands::Check(command) => {
      let report = ui::commands::check_document(ui::commands::CheckConfig::from(command), &colors).await?;
      if !report.is_valid() {
        return Ok(ExitCode::FAILURE);
      }
    }
    Commands::Convert(command) => ui::commands::convert_document(command, &colors).await?,
  }

  Ok(ExitCode::SUCCESS)
}
