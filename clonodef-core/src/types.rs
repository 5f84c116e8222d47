use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Tag-name to tag-value mapping attached to an axis or a column.
pub type Domain = BTreeMap<String, String>;

/// Free-form string annotations of an axis or a column.
pub type Annotations = BTreeMap<String, String>;

/// Well-known axis, column, domain and annotation names.
pub mod names {
    pub const SAMPLE_ID: &str = "pl7.app/sampleId";
    pub const CLONOTYPE_KEY: &str = "pl7.app/vdj/clonotypeKey";
    pub const SC_CLONOTYPE_KEY: &str = "pl7.app/vdj/scClonotypeKey";

    pub const SEQUENCE: &str = "pl7.app/vdj/sequence";
    pub const GENE_HIT: &str = "pl7.app/vdj/geneHit";

    pub const IS_ANCHOR: &str = "pl7.app/isAnchor";
    pub const IS_ASSEMBLING_FEATURE: &str = "pl7.app/vdj/isAssemblingFeature";
    pub const LABEL: &str = "pl7.app/label";

    pub const ALPHABET: &str = "pl7.app/alphabet";
    pub const FEATURE: &str = "pl7.app/vdj/feature";
    pub const RECEPTOR: &str = "pl7.app/vdj/receptor";
    pub const CHAIN: &str = "pl7.app/vdj/chain";
    pub const SC_CHAIN: &str = "pl7.app/vdj/scClonotypeChain";
    pub const SC_CHAIN_INDEX: &str = "pl7.app/vdj/scClonotypeChain/index";
}

/// Reference to an output of another block, used as the dataset anchor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlRef {
    pub block_id: String,
    pub name: String,
}

impl PlRef {
    pub fn new<S: Into<String>>(block_id: S, name: S) -> Self {
        Self {
            block_id: block_id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PlRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_id, self.name)
    }
}

impl FromStr for PlRef {
    type Err = String;

    /// Parses `<blockId>:<name>`; the name may itself contain colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((block_id, name)) if !block_id.is_empty() && !name.is_empty() => {
                Ok(PlRef::new(block_id, name))
            }
            _ => Err(format!("Invalid reference '{}', expected <blockId>:<name>", s)),
        }
    }
}

/// Opaque canonical identifier of a selectable column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnRef(pub String);

impl ColumnRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnRef {
    fn from(s: &str) -> Self {
        ColumnRef(s.to_string())
    }
}

fn default_value_type() -> String { "String".to_string() }
fn default_kind() -> String { "PColumn".to_string() }

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisSpec {
    pub name: String,

    #[serde(rename = "type", default = "default_value_type")]
    pub value_type: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub domain: Domain,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

impl AxisSpec {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            value_type: default_value_type(),
            domain: Domain::new(),
            annotations: Annotations::new(),
        }
    }

    pub fn with_domain<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.domain.insert(key.into(), value.into());
        self
    }

    pub fn domain_value(&self, key: &str) -> Option<&str> {
        self.domain.get(key).map(String::as_str)
    }
}

/// Metadata snapshot of a column as published by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    #[serde(default = "default_kind")]
    pub kind: String,

    pub name: String,

    #[serde(default = "default_value_type")]
    pub value_type: String,

    #[serde(default)]
    pub axes_spec: Vec<AxisSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub domain: Domain,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

impl ColumnSpec {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            kind: default_kind(),
            name: name.into(),
            value_type: default_value_type(),
            axes_spec: Vec::new(),
            domain: Domain::new(),
            annotations: Annotations::new(),
        }
    }

    pub fn with_axis(mut self, axis: AxisSpec) -> Self {
        self.axes_spec.push(axis);
        self
    }

    pub fn with_domain<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.domain.insert(key.into(), value.into());
        self
    }

    pub fn with_annotation<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn axis(&self, idx: usize) -> Option<&AxisSpec> {
        self.axes_spec.get(idx)
    }

    pub fn domain_value(&self, key: &str) -> Option<&str> {
        self.domain.get(key).map(String::as_str)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// Annotations carry booleans as the literal string `"true"`.
    pub fn annotation_is_true(&self, key: &str) -> bool {
        self.annotation(key) == Some("true")
    }
}

/// Shape of the anchored dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatasetMode {
    Bulk,
    SingleCell,
}

impl DatasetMode {
    /// Single-cell datasets are keyed by `scClonotypeKey` on their second axis;
    /// everything else is treated as bulk.
    pub fn of(anchor: &ColumnSpec) -> Self {
        match anchor.axis(1) {
            Some(axis) if axis.name == names::SC_CLONOTYPE_KEY => DatasetMode::SingleCell,
            _ => DatasetMode::Bulk,
        }
    }

    pub fn is_single_cell(self) -> bool {
        matches!(self, DatasetMode::SingleCell)
    }
}

pub const NUMBERING_SCHEMES: [&str; 3] = ["imgt", "kabat", "chothia"];

/// Antibody numbering scheme offered when numbering is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberingScheme {
    Imgt,
    Kabat,
    Chothia,
}

impl NumberingScheme {
    pub fn all() -> [Self; 3] {
        [NumberingScheme::Imgt, NumberingScheme::Kabat, NumberingScheme::Chothia]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NumberingScheme::Imgt => "imgt",
            NumberingScheme::Kabat => "kabat",
            NumberingScheme::Chothia => "chothia",
        }
    }
}

impl fmt::Display for NumberingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumberingScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "imgt" => Ok(NumberingScheme::Imgt),
            "kabat" => Ok(NumberingScheme::Kabat),
            "chothia" => Ok(NumberingScheme::Chothia),
            unknown => Err(format!(
                "Unknown numbering scheme '{}'. Supported schemes are: [{}]",
                unknown,
                NUMBERING_SCHEMES.join(", ")
            )),
        }
    }
}
