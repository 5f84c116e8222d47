//! Per-region sequences from antibody numbering.
//!
//! ANARCI numbers every residue of a variable domain; each scheme assigns
//! position ranges to the framework (FR) and complementarity-determining (CDR)
//! regions. This module slices amino-acid and nucleotide VDJRegion sequences
//! into those regions and encodes CDR locations as compact annotations.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use thiserror::Error;

use crate::io::{cell, csv_reader, open_reader, tsv_reader, tsv_writer};
use crate::types::NumberingScheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    Fr1,
    Cdr1,
    Fr2,
    Cdr2,
    Fr3,
    Cdr3,
    Fr4,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::Fr1,
        Region::Cdr1,
        Region::Fr2,
        Region::Cdr2,
        Region::Fr3,
        Region::Cdr3,
        Region::Fr4,
    ];

    pub const CDRS: [Region; 3] = [Region::Cdr1, Region::Cdr2, Region::Cdr3];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Fr1 => "FR1",
            Region::Cdr1 => "CDR1",
            Region::Fr2 => "FR2",
            Region::Cdr2 => "CDR2",
            Region::Fr3 => "FR3",
            Region::Cdr3 => "CDR3",
            Region::Fr4 => "FR4",
        }
    }

    pub fn parse_cdr(name: &str) -> Option<Region> {
        match name.trim().to_uppercase().as_str() {
            "CDR1" => Some(Region::Cdr1),
            "CDR2" => Some(Region::Cdr2),
            "CDR3" => Some(Region::Cdr3),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heavy chain, or kappa/lambda light chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chain {
    H,
    KL,
}

impl Chain {
    pub const ALL: [Chain; 2] = [Chain::H, Chain::KL];

    pub fn as_str(self) -> &'static str {
        match self {
            Chain::H => "H",
            Chain::KL => "KL",
        }
    }
}

/// Inclusive position range of every region, in region order.
pub type RegionRanges = [(Region, u32, u32); 7];

const IMGT: RegionRanges = [
    (Region::Fr1, 1, 26),
    (Region::Cdr1, 27, 38),
    (Region::Fr2, 39, 55),
    (Region::Cdr2, 56, 65),
    (Region::Fr3, 66, 104),
    (Region::Cdr3, 105, 117),
    (Region::Fr4, 118, 129),
];

const KABAT_HEAVY: RegionRanges = [
    (Region::Fr1, 1, 30),
    (Region::Cdr1, 31, 35),
    (Region::Fr2, 36, 49),
    (Region::Cdr2, 50, 65),
    (Region::Fr3, 66, 94),
    (Region::Cdr3, 95, 102),
    (Region::Fr4, 103, 113),
];

const CHOTHIA_HEAVY: RegionRanges = [
    (Region::Fr1, 1, 25),
    (Region::Cdr1, 26, 32),
    (Region::Fr2, 33, 52),
    (Region::Cdr2, 53, 55),
    (Region::Fr3, 56, 94),
    (Region::Cdr3, 95, 102),
    (Region::Fr4, 103, 113),
];

// Kabat and Chothia agree on light chains.
const KABAT_CHOTHIA_LIGHT: RegionRanges = [
    (Region::Fr1, 1, 23),
    (Region::Cdr1, 24, 34),
    (Region::Fr2, 35, 49),
    (Region::Cdr2, 50, 56),
    (Region::Fr3, 57, 88),
    (Region::Cdr3, 89, 97),
    (Region::Fr4, 98, 107),
];

pub fn region_ranges(scheme: NumberingScheme, chain: Chain) -> &'static RegionRanges {
    match (scheme, chain) {
        (NumberingScheme::Imgt, _) => &IMGT,
        (NumberingScheme::Kabat, Chain::H) => &KABAT_HEAVY,
        (NumberingScheme::Chothia, Chain::H) => &CHOTHIA_HEAVY,
        (NumberingScheme::Kabat | NumberingScheme::Chothia, Chain::KL) => &KABAT_CHOTHIA_LIGHT,
    }
}

pub fn region_for_position(num: u32, ranges: &RegionRanges) -> Option<Region> {
    ranges
        .iter()
        .find(|(_, start, end)| (*start..=*end).contains(&num))
        .map(|(region, _, _)| *region)
}

fn leading_digits() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)").ok()).as_ref()
}

/// Numeric part of a position label such as `111A`.
pub fn position_number(label: &str) -> Option<u32> {
    leading_digits()?
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn is_gap(residue: &str) -> bool {
    matches!(residue, "" | "-" | ".")
}

#[derive(Debug, Error)]
pub enum RegionsError {
    #[error("Table error: {0}")]
    Table(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// ANARCI numbering of one chain: the position labels and, per sequence
/// key, the residue at every position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnarciTable {
    pub positions: Vec<String>,
    pub rows: HashMap<String, Vec<String>>,
}

impl AnarciTable {
    /// Position columns start at the first header beginning with a digit.
    /// Rows are keyed by the `Id` prefix before `|`; the first row per key wins.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RegionsError> {
        let mut reader = csv_reader(reader);
        let headers = reader.headers()?.clone();

        let Some(first_position) = headers
            .iter()
            .position(|h| h.starts_with(|c: char| c.is_ascii_digit()))
        else {
            return Ok(Self::default());
        };
        let positions: Vec<String> = headers.iter().skip(first_position).map(str::to_string).collect();

        let Some(id_idx) = headers.iter().position(|h| h == "Id") else {
            return Ok(Self {
                positions,
                rows: HashMap::new(),
            });
        };

        let mut rows = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let id = cell(&record, Some(id_idx));
            if id.is_empty() {
                continue;
            }
            let key = id.split('|').next().unwrap_or("");
            if key.is_empty() || rows.contains_key(key) {
                continue;
            }
            let residues = (first_position..headers.len())
                .map(|i| cell(&record, Some(i)).to_string())
                .collect();
            rows.insert(key.to_string(), residues);
        }
        Ok(Self { positions, rows })
    }

    /// Missing or absent files mean the chain was not numbered.
    pub fn from_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => {
                let reader = open_reader(path)
                    .with_context(|| format!("Failed to open ANARCI CSV: {}", path.display()))?;
                let table = Self::from_reader(reader)
                    .with_context(|| format!("Failed to parse ANARCI CSV: {}", path.display()))?;
                log::info!(
                    "Loaded {} numbered sequences over {} positions from {}",
                    table.rows.len(),
                    table.positions.len(),
                    path.display()
                );
                Ok(table)
            }
            Some(path) => {
                log::warn!("ANARCI CSV {} does not exist, chain left unnumbered", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.positions.is_empty()
    }
}

/// Amino-acid and nucleotide sequence of every region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSequences {
    pub aa: BTreeMap<Region, String>,
    pub nt: BTreeMap<Region, String>,
}

impl RegionSequences {
    pub fn aa(&self, region: Region) -> &str {
        self.aa.get(&region).map(String::as_str).unwrap_or("")
    }

    pub fn nt(&self, region: Region) -> &str {
        self.nt.get(&region).map(String::as_str).unwrap_or("")
    }
}

/// Slice numbered residues into regions. Every non-gap residue consumes one
/// codon of `nt_seq`, even when its position lies outside every region.
pub fn build_regions(
    positions: &[String],
    residues: &[String],
    nt_seq: &str,
    ranges: &RegionRanges,
) -> RegionSequences {
    let nt: Vec<u8> = nt_seq
        .bytes()
        .filter(|b| *b != b' ')
        .map(|b| b.to_ascii_uppercase())
        .collect();
    let mut out = RegionSequences::default();
    for region in Region::ALL {
        out.aa.insert(region, String::new());
        out.nt.insert(region, String::new());
    }

    let mut nt_idx = 0;
    for (label, residue) in positions.iter().zip(residues) {
        let residue = residue.trim();
        let gap = is_gap(residue);

        let mut codon = "";
        if !gap {
            if let Some(bytes) = nt.get(nt_idx..nt_idx + 3) {
                codon = std::str::from_utf8(bytes).unwrap_or("");
            }
            nt_idx += 3;
        }

        let Some(region) = position_number(label).and_then(|n| region_for_position(n, ranges)) else {
            continue;
        };
        if gap {
            continue;
        }
        if let Some(aa) = out.aa.get_mut(&region) {
            aa.push_str(residue);
        }
        if let Some(seq) = out.nt.get_mut(&region) {
            seq.push_str(codon);
        }
    }
    out
}

/// Numbered residues as one string with `-` for every gap.
pub fn aligned_sequence(residues: &[String]) -> String {
    residues
        .iter()
        .map(|r| {
            let r = r.trim();
            if is_gap(r) {
                "-"
            } else {
                r
            }
        })
        .collect()
}

/// Aligned `[start, end)` column span of every CDR present in the numbering.
pub fn cdr_boundaries(positions: &[String], ranges: &RegionRanges) -> BTreeMap<Region, (usize, usize)> {
    let mut boundaries = BTreeMap::new();
    for (region, start, end) in ranges.iter().filter(|(r, _, _)| Region::CDRS.contains(r)) {
        let mut span: Option<(usize, usize)> = None;
        for (idx, label) in positions.iter().enumerate() {
            match position_number(label) {
                Some(num) if (*start..=*end).contains(&num) => {
                    span = Some(span.map_or((idx, idx + 1), |(s, _)| (s, idx + 1)));
                }
                _ => {}
            }
        }
        if let Some(span) = span {
            boundaries.insert(*region, span);
        }
    }
    boundaries
}

pub fn base36(mut n: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[n % 36]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// `(code, regionName)` pairs in the order they appear in the JSON object.
pub type CdrMapping = Vec<(String, String)>;

/// Annotation code per CDR, parsed from a JSON object `{code: regionName}`.
/// Invalid JSON or a non-object means no mapping.
pub fn parse_cdr_mapping(raw: Option<&str>) -> Option<CdrMapping> {
    let raw = raw.filter(|r| !r.is_empty())?;
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Ignoring invalid CDR mapping JSON: {}", e);
            return None;
        }
    };
    let object = value.as_object()?;
    Some(
        object
            .iter()
            .map(|(k, v)| {
                let label = match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), label)
            })
            .collect(),
    )
}

/// Encode CDR locations within the ungapped sequence as
/// `code:start+length` (base 36), sorted by start and joined with `|`.
pub fn encode_cdr_annotations(
    aligned: &str,
    boundaries: &BTreeMap<Region, (usize, usize)>,
    mapping: &[(String, String)],
) -> String {
    if aligned.is_empty() || mapping.is_empty() {
        return String::new();
    }

    // First code listed for a CDR wins.
    let mut region_to_code: BTreeMap<Region, &str> = BTreeMap::new();
    for (code, label) in mapping {
        if let Some(region) = Region::parse_cdr(label) {
            region_to_code.entry(region).or_insert(code.as_str());
        }
    }

    let columns: Vec<char> = aligned.chars().collect();
    let gaps = |from: usize, to: usize| {
        columns[from.min(columns.len())..to.min(columns.len())]
            .iter()
            .filter(|c| **c == '-')
            .count()
    };

    let mut segments: Vec<(usize, String)> = Vec::new();
    let mut seen = HashSet::new();
    for region in Region::CDRS {
        let (Some(code), Some(&(start, end))) = (region_to_code.get(&region), boundaries.get(&region)) else {
            continue;
        };
        let start_ungapped = start - gaps(0, start);
        let length_ungapped = (end - start).saturating_sub(gaps(start, end));
        if length_ungapped == 0 {
            continue;
        }
        if !seen.insert((*code, start_ungapped, length_ungapped)) {
            continue;
        }
        segments.push((
            start_ungapped,
            format!("{}:{}+{}", code, base36(start_ungapped), base36(length_ungapped)),
        ));
    }

    segments.sort_by_key(|(start, _)| *start);
    segments
        .into_iter()
        .map(|(_, s)| s)
        .collect::<Vec<_>>()
        .join("|")
}

/// VDJRegion sequences of one chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainSequences {
    pub aa: Option<String>,
    pub nt: Option<String>,
}

/// Clonotype keys with their VDJRegion sequences, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VdjRegionTable {
    pub keys: Vec<String>,
    pub sequences: HashMap<String, HashMap<Chain, ChainSequences>>,
    pub chains: Vec<Chain>,
}

impl VdjRegionTable {
    /// Columns: `clonotypeKey`, `vdjRegion_aa_{H,KL}`, `vdjRegion_nt_{H,KL}`.
    /// A chain is present only when its amino-acid column is.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RegionsError> {
        let mut reader = tsv_reader(reader);
        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let key_idx = column("clonotypeKey");
        let chain_columns: Vec<(Chain, Option<usize>, Option<usize>)> = Chain::ALL
            .iter()
            .map(|chain| {
                (
                    *chain,
                    column(&format!("vdjRegion_aa_{}", chain.as_str())),
                    column(&format!("vdjRegion_nt_{}", chain.as_str())),
                )
            })
            .collect();
        let chains = chain_columns
            .iter()
            .filter(|(_, aa, _)| aa.is_some())
            .map(|(chain, _, _)| *chain)
            .collect();

        let mut table = VdjRegionTable {
            chains,
            ..Self::default()
        };
        for record in reader.records() {
            let record = record?;
            let key = cell(&record, key_idx);
            if key.is_empty() {
                continue;
            }
            table.keys.push(key.to_string());
            let entry = table.sequences.entry(key.to_string()).or_default();
            for (chain, aa_idx, nt_idx) in &chain_columns {
                if aa_idx.is_none() && nt_idx.is_none() {
                    continue;
                }
                let seqs = entry.entry(*chain).or_default();
                if aa_idx.is_some() {
                    seqs.aa = Some(cell(&record, *aa_idx).to_string());
                }
                if nt_idx.is_some() {
                    seqs.nt = Some(cell(&record, *nt_idx).to_string());
                }
            }
        }
        Ok(table)
    }

    fn nt(&self, key: &str, chain: Chain) -> &str {
        self.sequences
            .get(key)
            .and_then(|chains| chains.get(&chain))
            .and_then(|s| s.nt.as_deref())
            .unwrap_or("")
    }
}

/// Everything needed to build the region table of one run.
pub struct NumberingInputs {
    pub scheme: NumberingScheme,
    pub vdj: VdjRegionTable,
    pub anarci: HashMap<Chain, AnarciTable>,
    pub cdr_mappings: HashMap<Chain, CdrMapping>,
}

impl NumberingInputs {
    fn cdr_mapping(&self, chain: Chain) -> Option<&CdrMapping> {
        self.cdr_mappings.get(&chain).filter(|m| !m.is_empty())
    }

    pub fn header(&self) -> Vec<String> {
        let mut cols = vec!["clonotypeKey".to_string()];
        for chain in &self.vdj.chains {
            for region in Region::ALL {
                cols.push(format!("{}_{}_aa_{}", self.scheme, region, chain.as_str()));
                cols.push(format!("{}_{}_nt_{}", self.scheme, region, chain.as_str()));
            }
            if self.cdr_mapping(*chain).is_some() {
                cols.push(format!("cdrs_annotations_{}", chain.as_str()));
            }
        }
        cols
    }

    pub fn row(&self, key: &str) -> Vec<String> {
        let mut row = vec![key.to_string()];
        for chain in &self.vdj.chains {
            let mapping = self.cdr_mapping(*chain);
            let residues = self
                .anarci
                .get(chain)
                .filter(|t| !t.is_empty())
                .and_then(|t| t.rows.get(key).map(|r| (t, r)));

            let Some((table, residues)) = residues else {
                row.extend(std::iter::repeat(String::new()).take(Region::ALL.len() * 2));
                if mapping.is_some() {
                    row.push(String::new());
                }
                continue;
            };

            let ranges = region_ranges(self.scheme, *chain);
            let regions = build_regions(&table.positions, residues, self.vdj.nt(key, *chain), ranges);
            for region in Region::ALL {
                row.push(regions.aa(region).to_string());
                row.push(regions.nt(region).to_string());
            }
            if let Some(mapping) = mapping {
                let aligned = aligned_sequence(residues);
                let boundaries = cdr_boundaries(&table.positions, ranges);
                row.push(encode_cdr_annotations(&aligned, &boundaries, mapping));
            }
        }
        row
    }

    pub fn write_tsv<W: Write>(&self, out: W) -> Result<usize, RegionsError> {
        let mut writer = tsv_writer(out);
        writer.write_record(self.header())?;
        for key in &self.vdj.keys {
            writer.write_record(self.row(key))?;
        }
        writer.flush()?;
        Ok(self.vdj.keys.len())
    }
}

/// File paths of one numbering-region run.
pub struct NumberingRun<'a> {
    pub input_tsv: &'a Path,
    pub scheme: NumberingScheme,
    pub h_csv: Option<&'a Path>,
    pub kl_csv: Option<&'a Path>,
    pub cdr_mapping_h: Option<&'a str>,
    pub cdr_mapping_kl: Option<&'a str>,
    pub out_tsv: &'a Path,
}

pub fn build_numbering_table(run: &NumberingRun<'_>) -> Result<usize> {
    let reader = open_reader(run.input_tsv)
        .with_context(|| format!("Failed to open input TSV: {}", run.input_tsv.display()))?;
    let vdj = VdjRegionTable::from_reader(reader)
        .with_context(|| format!("Failed to parse input TSV: {}", run.input_tsv.display()))?;
    log::info!(
        "Read {} clonotypes with chains {:?}",
        vdj.keys.len(),
        vdj.chains.iter().map(|c| c.as_str()).collect::<Vec<_>>()
    );

    let mut anarci = HashMap::new();
    anarci.insert(Chain::H, AnarciTable::from_path(run.h_csv)?);
    anarci.insert(Chain::KL, AnarciTable::from_path(run.kl_csv)?);

    let mut cdr_mappings = HashMap::new();
    for (chain, raw) in [(Chain::H, run.cdr_mapping_h), (Chain::KL, run.cdr_mapping_kl)] {
        if let Some(mapping) = parse_cdr_mapping(raw) {
            cdr_mappings.insert(chain, mapping);
        }
    }

    let inputs = NumberingInputs {
        scheme: run.scheme,
        vdj,
        anarci,
        cdr_mappings,
    };

    let out = File::create(run.out_tsv)
        .with_context(|| format!("Failed to create output TSV: {}", run.out_tsv.display()))?;
    let rows = inputs.write_tsv(BufWriter::new(out))?;
    log::info!("Wrote {} rows to {}", rows, run.out_tsv.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_position_number() {
        assert_eq!(position_number("111A"), Some(111));
        assert_eq!(position_number("27"), Some(27));
        assert_eq!(position_number("Id"), None);
    }

    #[test]
    fn test_region_lookup_per_scheme() {
        let imgt = region_ranges(NumberingScheme::Imgt, Chain::KL);
        assert_eq!(region_for_position(105, imgt), Some(Region::Cdr3));
        assert_eq!(region_for_position(130, imgt), None);

        let kabat_h = region_ranges(NumberingScheme::Kabat, Chain::H);
        assert_eq!(region_for_position(31, kabat_h), Some(Region::Cdr1));
        let chothia_h = region_ranges(NumberingScheme::Chothia, Chain::H);
        assert_eq!(region_for_position(31, chothia_h), Some(Region::Cdr1));
        assert_eq!(region_for_position(33, chothia_h), Some(Region::Fr2));
        let chothia_kl = region_ranges(NumberingScheme::Chothia, Chain::KL);
        assert_eq!(region_for_position(24, chothia_kl), Some(Region::Cdr1));
    }

    #[test]
    fn test_build_regions_consumes_codons_for_residues() {
        let ranges = region_ranges(NumberingScheme::Imgt, Chain::H);
        // 26 is FR1, 27/28 are CDR1; 0 lies outside every region.
        let positions = labels(&["0", "26", "27", "27A", "28"]);
        let residues = labels(&["M", "Q", "-", "G", "F"]);
        let regions = build_regions(&positions, &residues, "atg cag ggc ttc", ranges);

        assert_eq!(regions.aa(Region::Fr1), "Q");
        assert_eq!(regions.nt(Region::Fr1), "CAG");
        assert_eq!(regions.aa(Region::Cdr1), "GF");
        assert_eq!(regions.nt(Region::Cdr1), "GGCTTC");
        assert_eq!(regions.aa(Region::Fr4), "");
    }

    #[test]
    fn test_short_nucleotide_sequence_leaves_codons_empty() {
        let ranges = region_ranges(NumberingScheme::Imgt, Chain::H);
        let regions = build_regions(&labels(&["1", "2"]), &labels(&["E", "V"]), "GAG", ranges);
        assert_eq!(regions.aa(Region::Fr1), "EV");
        assert_eq!(regions.nt(Region::Fr1), "GAG");
    }

    #[test]
    fn test_base36() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "Z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(1295), "ZZ");
    }

    #[test]
    fn test_cdr_annotations() {
        let ranges = region_ranges(NumberingScheme::Imgt, Chain::H);
        let positions = labels(&["25", "26", "27", "28", "56", "57", "105"]);
        let residues = labels(&["A", "-", "G", "F", "I", "-", "C"]);
        let aligned = aligned_sequence(&residues);
        assert_eq!(aligned, "A-GFI-C");

        let boundaries = cdr_boundaries(&positions, ranges);
        assert_eq!(boundaries.get(&Region::Cdr1), Some(&(2, 4)));
        assert_eq!(boundaries.get(&Region::Cdr2), Some(&(4, 6)));
        assert_eq!(boundaries.get(&Region::Cdr3), Some(&(6, 7)));

        let mapping = parse_cdr_mapping(Some(r#"{"1": "CDR1", "3": "cdr3", "9": "FR1"}"#)).unwrap();
        let encoded = encode_cdr_annotations(&aligned, &boundaries, &mapping);
        assert_eq!(encoded, "1:1+2|3:4+1");
    }

    #[test]
    fn test_first_listed_code_wins_for_shared_cdr() {
        let ranges = region_ranges(NumberingScheme::Imgt, Chain::H);
        let positions = labels(&["27", "28"]);
        let boundaries = cdr_boundaries(&positions, ranges);
        assert_eq!(boundaries.get(&Region::Cdr1), Some(&(0, 2)));

        let mapping = parse_cdr_mapping(Some(r#"{"z": "CDR1", "a": "CDR1"}"#)).unwrap();
        assert_eq!(mapping[0].0, "z");
        assert_eq!(encode_cdr_annotations("GF", &boundaries, &mapping), "z:0+2");
    }

    #[test]
    fn test_invalid_mapping() {
        assert!(parse_cdr_mapping(None).is_none());
        assert!(parse_cdr_mapping(Some("")).is_none());
        assert!(parse_cdr_mapping(Some("not json")).is_none());
        assert!(parse_cdr_mapping(Some("[1, 2]")).is_none());
    }

    #[test]
    fn test_anarci_table() {
        let csv = "Id,domain_no,hmm_species,1,2,3\n\
                   k1|H,0,human,E,V,-\n\
                   k1|H,0,human,Q,Q,Q\n\
                   ,0,human,A,A,A\n";
        let table = AnarciTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.positions, labels(&["1", "2", "3"]));
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows["k1"], labels(&["E", "V", "-"]));
    }

    #[test]
    fn test_anarci_table_without_positions() {
        let table = AnarciTable::from_reader("Id,foo\nk1,x\n".as_bytes()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_row_for_unnumbered_key() {
        let vdj = VdjRegionTable::from_reader(
            "clonotypeKey\tvdjRegion_aa_H\tvdjRegion_nt_H\nk1\tEV\tGAGGTG\n".as_bytes(),
        )
        .unwrap();
        assert_eq!(vdj.chains, vec![Chain::H]);

        let mut cdr_mappings = HashMap::new();
        cdr_mappings.insert(Chain::H, parse_cdr_mapping(Some(r#"{"c": "CDR3"}"#)).unwrap());
        let inputs = NumberingInputs {
            scheme: NumberingScheme::Kabat,
            vdj,
            anarci: HashMap::new(),
            cdr_mappings,
        };
        let header = inputs.header();
        assert_eq!(header.len(), 1 + 14 + 1);
        assert_eq!(header[1], "kabat_FR1_aa_H");
        assert_eq!(header[15], "cdrs_annotations_H");
        let row = inputs.row("k1");
        assert_eq!(row.len(), header.len());
        assert!(row[1..].iter().all(String::is_empty));
    }
}
