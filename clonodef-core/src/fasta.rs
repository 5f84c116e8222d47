//! Export of assembling-feature sequences to FASTA.
//!
//! The input TSV has one key column (`clonotypeKey` or `scClonotypeKey`) and
//! any number of sequence columns. Every non-empty cell becomes one record
//! named `>{key}|{column}`.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::io::{cell, csv_reader, open_reader, tsv_reader};

pub const BULK_KEY_COLUMN: &str = "clonotypeKey";
pub const SINGLE_CELL_KEY_COLUMN: &str = "scClonotypeKey";

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("Key column '{0}' not found in TSV")]
    KeyColumnMissing(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Table error: {0}")]
    Table(#[from] csv::Error),
}

/// Keys listed in a final-clonotypes CSV. `None` when the CSV has no columns.
pub fn read_allowed_keys<R: Read>(reader: R) -> Result<Option<HashSet<String>>, FastaError> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers()?.clone();

    let key_idx = headers
        .iter()
        .position(|h| h == BULK_KEY_COLUMN)
        .or_else(|| headers.iter().position(|h| h == SINGLE_CELL_KEY_COLUMN))
        .or(if headers.is_empty() { None } else { Some(0) });
    let Some(key_idx) = key_idx else {
        return Ok(None);
    };

    let mut keys = HashSet::new();
    for record in reader.records() {
        let record = record?;
        keys.insert(record.get(key_idx).unwrap_or("").to_string());
    }
    Ok(Some(keys))
}

fn key_column_index(headers: &csv::StringRecord, key_column: &str) -> Result<usize, FastaError> {
    headers
        .iter()
        .position(|h| h == key_column)
        .ok_or_else(|| FastaError::KeyColumnMissing(key_column.to_string()))
}

/// Write one FASTA record per non-empty sequence cell; returns the number of
/// records written.
pub fn write_fasta<R: Read, W: Write>(
    tsv: R,
    key_column: &str,
    allowed: Option<&HashSet<String>>,
    out: W,
) -> Result<usize, FastaError> {
    let mut reader = tsv_reader(tsv);
    let headers = reader.headers()?.clone();
    let key_idx = key_column_index(&headers, key_column)?;
    write_records(reader, &headers, key_idx, allowed, out)
}

fn write_records<R: Read, W: Write>(
    mut reader: csv::Reader<R>,
    headers: &csv::StringRecord,
    key_idx: usize,
    allowed: Option<&HashSet<String>>,
    mut out: W,
) -> Result<usize, FastaError> {
    let sequence_columns: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != key_idx)
        .collect();

    let mut written = 0;
    for record in reader.records() {
        let record = record?;
        let key = cell(&record, Some(key_idx));
        if key.is_empty() {
            continue;
        }
        if allowed.is_some_and(|keys| !keys.contains(key)) {
            continue;
        }
        for (idx, column) in &sequence_columns {
            let sequence = cell(&record, Some(*idx));
            if sequence.is_empty() {
                continue;
            }
            writeln!(out, ">{}|{}", key, column)?;
            writeln!(out, "{}", sequence)?;
            written += 1;
        }
    }
    out.flush()?;
    Ok(written)
}

/// File-level export. With an allow-list that has no columns nothing is
/// written and the output file is not created.
pub fn export_fasta_file(
    input_tsv: &Path,
    key_column: &str,
    output_fasta: &Path,
    final_clonotypes_csv: Option<&Path>,
) -> Result<usize> {
    let allowed = match final_clonotypes_csv {
        Some(path) => {
            let reader = open_reader(path)
                .with_context(|| format!("Failed to open final clonotypes CSV: {}", path.display()))?;
            match read_allowed_keys(reader)
                .with_context(|| format!("Failed to read final clonotypes CSV: {}", path.display()))?
            {
                Some(keys) => {
                    log::info!("Restricting export to {} clonotypes", keys.len());
                    Some(keys)
                }
                None => {
                    log::warn!("Final clonotypes CSV {} has no columns, nothing to export", path.display());
                    return Ok(0);
                }
            }
        }
        None => None,
    };

    let input = open_reader(input_tsv)
        .with_context(|| format!("Failed to open input TSV: {}", input_tsv.display()))?;
    let mut reader = tsv_reader(input);
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", input_tsv.display()))?
        .clone();
    // The output is only created once the key column is known to exist.
    let key_idx = key_column_index(&headers, key_column)?;

    let output = File::create(output_fasta)
        .with_context(|| format!("Failed to create FASTA file: {}", output_fasta.display()))?;
    let written = write_records(reader, &headers, key_idx, allowed.as_ref(), BufWriter::new(output))?;
    log::info!("Wrote {} sequences to {}", written, output_fasta.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSV: &str = "clonotypeKey\tcdr3_aa\tvdj_nt\n\
                       k1\tCASS\tTGTGCC\n\
                       k2\t\tATG\n\
                       \tCAR\tAAA\n";

    fn export(allowed: Option<&HashSet<String>>) -> (usize, String) {
        let mut out = Vec::new();
        let n = write_fasta(TSV.as_bytes(), BULK_KEY_COLUMN, allowed, &mut out).unwrap();
        (n, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_every_non_empty_cell_is_a_record() {
        let (n, fasta) = export(None);
        assert_eq!(n, 3);
        assert_eq!(fasta, ">k1|cdr3_aa\nCASS\n>k1|vdj_nt\nTGTGCC\n>k2|vdj_nt\nATG\n");
    }

    #[test]
    fn test_allow_list_filters_keys() {
        let allowed: HashSet<String> = ["k2".to_string()].into_iter().collect();
        let (n, fasta) = export(Some(&allowed));
        assert_eq!(n, 1);
        assert!(fasta.starts_with(">k2|vdj_nt"));
    }

    #[test]
    fn test_missing_key_column() {
        let result = write_fasta(TSV.as_bytes(), SINGLE_CELL_KEY_COLUMN, None, Vec::new());
        assert!(matches!(result, Err(FastaError::KeyColumnMissing(_))));
    }

    #[test]
    fn test_allowed_keys_column_preference() {
        let csv = "x,scClonotypeKey\n1,a\n2,b\n";
        let keys = read_allowed_keys(csv.as_bytes()).unwrap().unwrap();
        assert!(keys.contains("a") && keys.contains("b"));

        let csv = "first,second\nk9,z\n";
        let keys = read_allowed_keys(csv.as_bytes()).unwrap().unwrap();
        assert!(keys.contains("k9"));
    }

    #[test]
    fn test_allowed_keys_without_columns() {
        assert!(read_allowed_keys("".as_bytes()).unwrap().is_none());
    }
}
