//! Clonotype count report produced by the redefinition run.
//!
//! The report is a two-line TSV: a header row and a value row, columns in any
//! order, containing at least `nClonotypesBefore` and `nClonotypesAfter`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BEFORE_HEADER: &str = "nClonotypesBefore";
pub const AFTER_HEADER: &str = "nClonotypesAfter";

/// Clonotype counts before and after redefinition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatsRecord {
    #[serde(rename = "nClonotypesBefore")]
    pub before: i64,
    #[serde(rename = "nClonotypesAfter")]
    pub after: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("Empty stats report")]
    Empty,
    #[error("Invalid stats report: expected 2 lines, got {0}")]
    LineCount(usize),
    #[error("Missing header: {0}")]
    MissingHeader(&'static str),
    #[error("Missing value for header: {0}")]
    MissingValue(&'static str),
    #[error("Invalid count for {header}: {value:?}")]
    InvalidCount { header: &'static str, value: String },
}

/// Parse the report, explaining why it could not be read.
pub fn try_parse_stats(text: &str) -> Result<StatsRecord, StatsError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(StatsError::Empty);
    }

    let lines: Vec<&str> = trimmed
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    if lines.len() != 2 {
        return Err(StatsError::LineCount(lines.len()));
    }

    let headers: Vec<&str> = lines[0].split('\t').collect();
    let values: Vec<&str> = lines[1].split('\t').collect();

    let before = count_at(&headers, &values, BEFORE_HEADER)?;
    let after = count_at(&headers, &values, AFTER_HEADER)?;

    Ok(StatsRecord { before, after })
}

fn count_at(headers: &[&str], values: &[&str], header: &'static str) -> Result<i64, StatsError> {
    let idx = headers
        .iter()
        .position(|h| *h == header)
        .ok_or(StatsError::MissingHeader(header))?;
    let raw = values.get(idx).ok_or(StatsError::MissingValue(header))?;
    raw.trim().parse::<i64>().map_err(|_| StatsError::InvalidCount {
        header,
        value: raw.to_string(),
    })
}

/// Parse the report if one exists. Anything unreadable means "no stats yet".
pub fn parse_stats(text: Option<&str>) -> Option<StatsRecord> {
    let text = text?;
    match try_parse_stats(text) {
        Ok(record) => Some(record),
        Err(StatsError::Empty) => None,
        Err(e @ StatsError::InvalidCount { .. }) => {
            log::warn!("Ignoring stats report: {}", e);
            None
        }
        Err(e) => {
            log::debug!("No stats available: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_report() {
        let stats = parse_stats(Some("a\tnClonotypesBefore\tnClonotypesAfter\n1\t10\t7"));
        assert_eq!(stats, Some(StatsRecord { before: 10, after: 7 }));
    }

    #[test]
    fn test_column_order_is_free() {
        let stats = parse_stats(Some("nClonotypesAfter\tnClonotypesBefore\n3\t12\n"));
        assert_eq!(stats, Some(StatsRecord { before: 12, after: 3 }));
    }

    #[test]
    fn test_single_line_is_absent() {
        assert_eq!(parse_stats(Some("onlyoneline")), None);
        assert_eq!(try_parse_stats("onlyoneline"), Err(StatsError::LineCount(1)));
    }

    #[test]
    fn test_missing_after_header() {
        let text = "nClonotypesBefore\tother\n10\t7";
        assert_eq!(parse_stats(Some(text)), None);
        assert_eq!(try_parse_stats(text), Err(StatsError::MissingHeader(AFTER_HEADER)));
    }

    #[test]
    fn test_empty_and_missing_input() {
        assert_eq!(parse_stats(None), None);
        assert_eq!(parse_stats(Some("")), None);
        assert_eq!(parse_stats(Some("  \n\n ")), None);
    }

    #[test]
    fn test_three_lines_rejected() {
        let text = "nClonotypesBefore\tnClonotypesAfter\n1\t2\n3\t4";
        assert_eq!(try_parse_stats(text), Err(StatsError::LineCount(3)));
    }

    #[test]
    fn test_crlf_report() {
        let text = "nClonotypesBefore\tnClonotypesAfter\r\n100\t80\r\n";
        assert_eq!(parse_stats(Some(text)), Some(StatsRecord { before: 100, after: 80 }));
    }

    #[test]
    fn test_non_numeric_count_is_absent() {
        let text = "nClonotypesBefore\tnClonotypesAfter\nNA\t80";
        assert_eq!(parse_stats(Some(text)), None);
        assert!(matches!(
            try_parse_stats(text),
            Err(StatsError::InvalidCount { header: BEFORE_HEADER, .. })
        ));
    }

    #[test]
    fn test_short_value_row() {
        let text = "nClonotypesBefore\tnClonotypesAfter\n5";
        assert_eq!(try_parse_stats(text), Err(StatsError::MissingValue(AFTER_HEADER)));
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(StatsRecord { before: 2, after: 1 }).unwrap();
        assert_eq!(json["nClonotypesBefore"], 2);
        assert_eq!(json["nClonotypesAfter"], 1);
    }
}
