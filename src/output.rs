//! Emission of normalized records and their metadata sidecar.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{data::CanonicalRecord, fields::CanonicalField, io_utils};

pub const DEFAULT_PUBLISHER: &str = "HM Treasury";
pub const DEFAULT_LICENSE: &str = "Open Government Licence v3.0";

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputMeta {
    pub source: String,
    pub publisher: String,
    pub license: String,
    pub generated_at: String,
    pub rows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_sha256: Option<String>,
}

impl OutputMeta {
    pub fn new(source: impl Into<String>, rows: usize) -> Self {
        Self {
            source: source.into(),
            publisher: DEFAULT_PUBLISHER.to_string(),
            license: DEFAULT_LICENSE.to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            rows,
            source_sha256: None,
        }
    }

    pub fn with_checksum(mut self, bytes: &[u8]) -> Self {
        self.source_sha256 = Some(format!("{:x}", Sha256::digest(bytes)));
        self
    }
}

/// `data/2024-01.json` -> `data/2024-01.meta.json`.
pub fn meta_path_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output.with_file_name(format!("{stem}.meta.json"))
}

pub fn write_records(
    records: &[CanonicalRecord],
    format: OutputFormat,
    path: Option<&Path>,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(records, path),
        OutputFormat::Csv => write_csv(records, path),
    }
}

pub fn write_json(records: &[CanonicalRecord], path: Option<&Path>) -> Result<()> {
    let mut writer = io_utils::open_output(path)?;
    serde_json::to_writer_pretty(&mut writer, records).context("Writing records as JSON")?;
    writeln!(writer)?;
    writer.flush().context("Flushing JSON output")
}

pub fn write_csv(records: &[CanonicalRecord], path: Option<&Path>) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(path, io_utils::DEFAULT_CSV_DELIMITER)?;
    let include_raw = records.iter().any(|record| record.amount_raw().is_some());

    let mut header = CanonicalField::ALL
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>();
    if include_raw {
        header.push("amount_raw");
    }
    writer.write_record(&header).context("Writing CSV header")?;

    for record in records {
        let mut row = record
            .iter()
            .map(|(_, value)| value.map(|v| v.as_display()).unwrap_or_default())
            .collect::<Vec<_>>();
        if include_raw {
            row.push(
                record
                    .amount_raw()
                    .map(|raw| raw.as_display())
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&row).context("Writing CSV row")?;
    }
    writer.flush().context("Flushing CSV output")
}

pub fn write_meta(meta: &OutputMeta, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Creating meta file {path:?}"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, meta).context("Writing metadata JSON")?;
    writeln!(writer)?;
    writer.flush().context("Flushing metadata JSON")
}
