//! I/O utilities for reading disclosure files and writing normalized output.
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Encoding**: published CSVs arrive as UTF-8 (often with a BOM) or
//!   Windows-1252. Without an explicit encoding each candidate is tried in
//!   turn and the first clean decode wins.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::debug;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// Tried in order when no encoding is forced. `latin1` labels resolve to
/// Windows-1252 in `encoding_rs`, so it covers both.
pub fn fallback_encodings() -> [&'static Encoding; 2] {
    [UTF_8, WINDOWS_1252]
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<Option<&'static Encoding>> {
    label
        .map(|value| {
            Encoding::for_label(value.trim().as_bytes())
                .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
        })
        .transpose()
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn read_input_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if is_dash(path) {
        io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("Opening input file {path:?}"))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    Ok(bytes)
}

/// Decodes `bytes`, stripping a BOM when present.
///
/// With `forced` set, that encoding is used as-is (malformed sequences become
/// U+FFFD). Otherwise [`fallback_encodings`] are tried until one decodes
/// cleanly; the last candidate is used lossily if none does.
pub fn decode_text(bytes: &[u8], forced: Option<&'static Encoding>) -> (String, &'static Encoding) {
    if let Some(encoding) = forced {
        let (text, used, _) = encoding.decode(bytes);
        return (text.into_owned(), used);
    }
    let candidates = fallback_encodings();
    for encoding in candidates {
        let (text, used, had_errors) = encoding.decode(bytes);
        if !had_errors {
            debug!("Decoded input as {}", used.name());
            return (text.into_owned(), used);
        }
        debug!("Input is not valid {}; trying next encoding", encoding.name());
    }
    let (text, used, _) = candidates[candidates.len() - 1].decode(bytes);
    (text.into_owned(), used)
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        // Ragged rows are reported by the table contract check, not the reader.
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(io::stdout()),
    })
}

pub fn open_csv_writer(path: Option<&Path>, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    Ok(builder.from_writer(open_output(path)?))
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
