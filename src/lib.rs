//! Schema normalization for monthly government spending disclosures.
//!
//! The engine ([`normalize`]) takes a [`RawTable`] of arbitrarily named
//! columns and produces [`CanonicalRecord`]s with a fixed field set: headers
//! are resolved through an [`AliasTable`], amounts and dates are parsed, and
//! rows with no usable key field are dropped. Reading files and writing
//! output are handled by the surrounding `sheet`, `output` and CLI modules.

pub mod aliases;
pub mod amount;
pub mod cli;
pub mod data;
pub mod date;
pub mod error;
pub mod fields;
pub mod filter;
pub mod header;
pub mod io_utils;
pub mod mapping;
pub mod normalize;
pub mod output;
pub mod raw;
pub mod sheet;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

pub use crate::{
    aliases::AliasTable,
    data::{CanonicalRecord, CellValue, FieldValue},
    error::NormalizeError,
    fields::CanonicalField,
    mapping::HeaderMapping,
    normalize::{NormalizeOptions, NormalizeReport, Normalized, normalize, normalize_with},
    raw::RawTable,
};

use crate::{
    aliases::OverrideMode,
    cli::{AliasSource, AliasesArgs, Cli, Commands, HeadersArgs, InputArgs, NormalizeArgs},
    output::{OutputFormat, OutputMeta},
    sheet::ReadOptions,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("spend_normalizer", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize(args) => handle_normalize(&args),
        Commands::Headers(args) => handle_headers(&args),
        Commands::Aliases(args) => handle_aliases(&args),
    }
}

fn load_aliases(source: &AliasSource) -> Result<AliasTable> {
    match &source.aliases {
        Some(path) => {
            let mode = if source.replace_aliases {
                OverrideMode::Replace
            } else {
                OverrideMode::Merge
            };
            debug!("Loading aliases from {path:?} ({mode:?})");
            AliasTable::load(path, mode)
        }
        None => Ok(AliasTable::default()),
    }
}

fn read_input(args: &InputArgs) -> Result<RawTable> {
    let options = ReadOptions {
        delimiter: args.delimiter,
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
    };
    sheet::read_table(&args.input, &options)
}

fn handle_normalize(args: &NormalizeArgs) -> Result<()> {
    let aliases = load_aliases(&args.alias_source)?;
    let table = read_input(&args.input)?;
    let options = NormalizeOptions {
        key_fields: if args.key_fields.is_empty() {
            fields::DEFAULT_KEY_FIELDS.to_vec()
        } else {
            args.key_fields.clone()
        },
        keep_amount_raw: !args.no_amount_raw,
    };

    let normalized = normalize_with(&table, &aliases, &options);
    let report = &normalized.report;
    info!(
        "Normalized {} row(s) from {:?}: kept {}, dropped {}, unparseable amounts {}, unparseable dates {}",
        report.rows_read,
        args.input.input,
        report.rows_kept,
        report.rows_dropped,
        report.unparseable_amounts,
        report.unparseable_dates
    );
    let unmapped = normalized.mapping.unmapped_fields();
    if !unmapped.is_empty() {
        info!(
            "Unmapped field(s): {}",
            unmapped
                .iter()
                .map(|field| field.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let output_path = args.output.as_deref().filter(|path| !io_utils::is_dash(path));
    output::write_records(&normalized.records, args.format, output_path)
        .with_context(|| format!("Writing output for {:?}", args.input.input))?;

    if let Some(path) = output_path
        && args.format == OutputFormat::Json
        && !args.no_meta
    {
        let source = args
            .source
            .clone()
            .unwrap_or_else(|| args.input.input.display().to_string());
        let mut meta = OutputMeta::new(source, normalized.records.len());
        meta.publisher = args.publisher.clone();
        meta.license = args.license.clone();
        if !io_utils::is_dash(&args.input.input) {
            let bytes = io_utils::read_input_bytes(&args.input.input)?;
            meta = meta.with_checksum(&bytes);
        }
        let meta_path = output::meta_path_for(path);
        output::write_meta(&meta, &meta_path)?;
        info!(
            "Wrote {} record(s) to {:?} with metadata {:?}",
            meta.rows, path, meta_path
        );
    }
    Ok(())
}

fn handle_headers(args: &HeadersArgs) -> Result<()> {
    let aliases = load_aliases(&args.alias_source)?;
    let raw = read_input(&args.input)?;
    let mapping = HeaderMapping::build(raw.headers(), &aliases);
    print!("{}", table::render_mapping(&mapping));
    info!(
        "Resolved {} of {} field(s) against {} header(s)",
        mapping.mapped_fields().count(),
        CanonicalField::COUNT,
        raw.headers().len()
    );
    Ok(())
}

fn handle_aliases(args: &AliasesArgs) -> Result<()> {
    let aliases = load_aliases(&args.alias_source)?;
    match args.output.as_deref().filter(|path| !io_utils::is_dash(path)) {
        Some(path) => {
            aliases.save(path)?;
            info!("Alias table written to {path:?}");
        }
        None => print!("{}", aliases.to_yaml_string()?),
    }
    Ok(())
}
