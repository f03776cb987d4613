use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{fields::CanonicalField, output::OutputFormat};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Normalize government spending disclosures into canonical records",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Normalize a CSV/TSV/XLSX disclosure into canonical JSON or CSV records
    Normalize(NormalizeArgs),
    /// Show which raw header each canonical field resolves to
    Headers(HeadersArgs),
    /// Print the alias table as YAML (a starting point for --aliases)
    Aliases(AliasesArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct AliasSource {
    /// YAML file mapping canonical field names to alias lists
    #[arg(long = "aliases")]
    pub aliases: Option<PathBuf>,
    /// Use only the aliases from --aliases instead of overlaying the built-in table
    #[arg(long = "replace-aliases", requires = "aliases")]
    pub replace_aliases: bool,
}

#[derive(Debug, Args, Clone, Default)]
pub struct InputArgs {
    /// Input file (`-` reads CSV from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Force the input character encoding (default: try utf-8, then windows-1252)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub alias_source: AliasSource,
    /// Output file (stdout if omitted or `-`)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(long = "format", value_enum, default_value = "json")]
    pub format: OutputFormat,
    /// Omit the `amount_raw` audit column
    #[arg(long = "no-amount-raw")]
    pub no_amount_raw: bool,
    /// Key field whose joint absence drops a row (repeatable; default: supplier, amount_gbp, date, description)
    #[arg(long = "key-field", action = clap::ArgAction::Append, value_parser = parse_field)]
    pub key_fields: Vec<CanonicalField>,
    /// Source URL or label recorded in the metadata sidecar (defaults to the input path)
    #[arg(long)]
    pub source: Option<String>,
    /// Publisher recorded in the metadata sidecar
    #[arg(long, default_value = crate::output::DEFAULT_PUBLISHER)]
    pub publisher: String,
    /// License recorded in the metadata sidecar
    #[arg(long, default_value = crate::output::DEFAULT_LICENSE)]
    pub license: String,
    /// Skip writing the `.meta.json` sidecar next to a JSON output file
    #[arg(long = "no-meta")]
    pub no_meta: bool,
}

#[derive(Debug, Args)]
pub struct HeadersArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub alias_source: AliasSource,
}

#[derive(Debug, Args)]
pub struct AliasesArgs {
    #[command(flatten)]
    pub alias_source: AliasSource,
    /// Destination YAML file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn parse_field(value: &str) -> Result<CanonicalField, String> {
    value.parse().map_err(|err: crate::error::NormalizeError| err.to_string())
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
