use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, Colors, ThemeMode};
use crate::utils::DocumentFormat;

#[derive(Parser, Debug)]
#[command(name = "mapper-builder")]
#[command(author, version, about = "Inspect schema documents and map data documents onto them")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Show the resolved attributes of the types in a schema document
  Inspect {
    /// Path to the JSON schema document
    #[arg(short, long, value_name = "FILE")]
    schema: PathBuf,

    /// Only show this type
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    type_name: Option<String>,
  },
  /// Map a data document onto a type, then report assignments and validation errors
  Check(CheckCommand),
  /// Map a data document onto a type and write it back out in another format
  Convert(ConvertCommand),
}

#[derive(Args, Debug, Clone)]
pub struct CheckCommand {
  /// Path to the JSON schema document
  #[arg(short, long, value_name = "FILE")]
  pub schema: PathBuf,

  /// Type the document is mapped onto
  #[arg(short = 't', long = "type", value_name = "TYPE")]
  pub type_name: String,

  /// Path to the data document
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Format of the data document (default: from the file extension)
  #[arg(short, long, value_enum)]
  pub format: Option<DocumentFormat>,

  /// Enable verbose output with detailed progress information
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertCommand {
  /// Path to the JSON schema document
  #[arg(short, long, value_name = "FILE")]
  pub schema: PathBuf,

  /// Type the document is mapped onto
  #[arg(short = 't', long = "type", value_name = "TYPE")]
  pub type_name: String,

  /// Path to the data document
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Format of the data document (default: from the file extension)
  #[arg(short, long, value_enum)]
  pub format: Option<DocumentFormat>,

  /// Output format
  #[arg(long, value_enum)]
  pub to: DocumentFormat,

  /// Where to write the converted document (default: stdout)
  #[arg(short, long, value_name = "FILE")]
  pub output: Option<PathBuf>,
}
