//! Metadata query capability of the host platform.
//!
//! Option resolvers only describe *what* they are looking for through
//! [`ColumnSelector`]s; the search itself is done by a [`ResultPool`]. The
//! host supplies its own pool; [`SnapshotPool`] answers the same queries from
//! an in-memory JSON snapshot of published columns.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::io::open_reader;
use crate::types::{Annotations, AxisSpec, ColumnRef, ColumnSpec, Domain, PlRef};

/// Named anchors an anchored query is expressed relative to.
pub type AnchorSet = BTreeMap<String, PlRef>;

/// Id of the user-selected dataset in anchored queries.
pub const MAIN_ANCHOR: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionEntry<V> {
    pub value: V,
    pub label: String,
}

impl<V> OptionEntry<V> {
    pub fn new<S: Into<String>>(value: V, label: S) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Axis template: either a literal axis or an axis borrowed from an anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisSelector {
    Anchored {
        anchor: String,
        idx: usize,
    },
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        domain: Domain,
    },
}

impl AxisSelector {
    pub fn named<S: Into<String>>(name: S) -> Self {
        AxisSelector::Named {
            name: name.into(),
            domain: Domain::new(),
        }
    }

    pub fn anchored<S: Into<String>>(anchor: S, idx: usize) -> Self {
        AxisSelector::Anchored {
            anchor: anchor.into(),
            idx,
        }
    }
}

/// Column template. Empty fields match anything; domain and annotation
/// entries must all be present on a matching column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub axes: Vec<AxisSelector>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub domain: Domain,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

impl ColumnSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_axis(mut self, axis: AxisSelector) -> Self {
        self.axes.push(axis);
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
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelOptions {
    /// Append the column's own `pl7.app/label` to the derived label.
    pub include_native_label: bool,
}

/// Read-only metadata queries answered by the host.
pub trait ResultPool {
    /// Spec of a published column.
    fn get_spec(&self, reference: &PlRef) -> Option<ColumnSpec>;

    /// Columns matching any of the selectors, as selectable references.
    fn get_options(
        &self,
        selectors: &[ColumnSelector],
        label: &LabelOptions,
    ) -> Vec<OptionEntry<PlRef>>;

    /// Columns matching any of the anchored selectors, identified canonically
    /// relative to the anchors. `None` when an anchor cannot be resolved.
    fn get_canonical_options(
        &self,
        anchors: &AnchorSet,
        selectors: &[ColumnSelector],
    ) -> Option<Vec<OptionEntry<ColumnRef>>>;

    /// Specs of the columns matching any of the anchored selectors.
    fn get_anchored_columns(
        &self,
        anchors: &AnchorSet,
        selectors: &[ColumnSelector],
    ) -> Option<Vec<ColumnSpec>>;
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate column reference in snapshot: {0}")]
    DuplicateRef(PlRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    #[serde(rename = "ref")]
    pub reference: PlRef,
    pub label: String,
    pub spec: ColumnSpec,
}

/// In-memory result pool over a fixed list of published columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPool {
    pub columns: Vec<PoolEntry>,
}

/// Selector with every anchored axis replaced by the anchor's concrete axis.
struct ResolvedSelector<'a> {
    selector: &'a ColumnSelector,
    axes: Vec<ResolvedAxis>,
}

struct ResolvedAxis {
    axis: AxisSpec,
    anchor: Option<(String, usize)>,
}

/// Canonical form of an anchored column id.
#[derive(Serialize)]
struct CanonicalColumnId<'a> {
    name: &'a str,
    axes: Vec<AxisSelector>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    domain: &'a Domain,
}

impl SnapshotPool {
    pub fn new(columns: Vec<PoolEntry>) -> Result<Self, SnapshotError> {
        let mut seen = std::collections::HashSet::new();
        for entry in &columns {
            if !seen.insert(&entry.reference) {
                return Err(SnapshotError::DuplicateRef(entry.reference.clone()));
            }
        }
        Ok(Self { columns })
    }

    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        let raw: SnapshotPool = serde_json::from_str(json)?;
        Self::new(raw.columns)
    }

    /// Load a snapshot from a JSON file (optionally gzipped).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let reader = open_reader(path.as_ref())?;
        let raw: SnapshotPool = serde_json::from_reader(reader)?;
        let pool = Self::new(raw.columns)?;
        log::debug!(
            "Loaded {} columns from snapshot {}",
            pool.columns.len(),
            path.as_ref().display()
        );
        Ok(pool)
    }

    fn entry(&self, reference: &PlRef) -> Option<&PoolEntry> {
        self.columns.iter().find(|e| &e.reference == reference)
    }

    fn resolve<'a>(
        &self,
        anchors: &AnchorSet,
        selector: &'a ColumnSelector,
    ) -> Option<ResolvedSelector<'a>> {
        let mut axes = Vec::with_capacity(selector.axes.len());
        for axis in &selector.axes {
            let resolved = match axis {
                AxisSelector::Named { name, domain } => ResolvedAxis {
                    axis: AxisSpec {
                        domain: domain.clone(),
                        ..AxisSpec::new(name.clone())
                    },
                    anchor: None,
                },
                AxisSelector::Anchored { anchor, idx } => {
                    let Some(reference) = anchors.get(anchor) else {
                        log::debug!("Unknown anchor '{}' in selector", anchor);
                        return None;
                    };
                    let spec = &self.entry(reference)?.spec;
                    ResolvedAxis {
                        axis: spec.axis(*idx)?.clone(),
                        anchor: Some((anchor.clone(), *idx)),
                    }
                }
            };
            axes.push(resolved);
        }
        Some(ResolvedSelector { selector, axes })
    }

    fn resolve_all<'a>(
        &self,
        anchors: &AnchorSet,
        selectors: &'a [ColumnSelector],
    ) -> Option<Vec<ResolvedSelector<'a>>> {
        selectors.iter().map(|s| self.resolve(anchors, s)).collect()
    }

    fn matching<'a>(
        &'a self,
        resolved: &'a [ResolvedSelector<'a>],
    ) -> Vec<(&'a PoolEntry, &'a ResolvedSelector<'a>)> {
        self.columns
            .iter()
            .filter_map(|entry| {
                resolved
                    .iter()
                    .find(|r| selector_matches(r, &entry.spec))
                    .map(|r| (entry, r))
            })
            .collect()
    }

    fn canonical_id(entry: &PoolEntry, resolved: &ResolvedSelector<'_>) -> ColumnRef {
        let axes = resolved
            .axes
            .iter()
            .zip(&entry.spec.axes_spec)
            .map(|(r, axis)| match &r.anchor {
                Some((anchor, idx)) => AxisSelector::anchored(anchor.clone(), *idx),
                None => AxisSelector::Named {
                    name: axis.name.clone(),
                    domain: axis.domain.clone(),
                },
            })
            .collect();
        let id = CanonicalColumnId {
            name: &entry.spec.name,
            axes,
            domain: &entry.spec.domain,
        };
        // Struct fields and BTreeMaps serialize in a fixed order.
        ColumnRef(serde_json::to_string(&id).unwrap_or_else(|_| entry.spec.name.clone()))
    }
}

fn is_subset(required: &BTreeMap<String, String>, actual: &BTreeMap<String, String>) -> bool {
    required.iter().all(|(k, v)| actual.get(k) == Some(v))
}

fn selector_matches(resolved: &ResolvedSelector<'_>, spec: &ColumnSpec) -> bool {
    let selector = resolved.selector;
    if let Some(name) = &selector.name {
        if name != &spec.name {
            return false;
        }
    }
    if !resolved.axes.is_empty() {
        if resolved.axes.len() != spec.axes_spec.len() {
            return false;
        }
        let axes_match = resolved
            .axes
            .iter()
            .zip(&spec.axes_spec)
            .all(|(want, have)| want.axis.name == have.name && is_subset(&want.axis.domain, &have.domain));
        if !axes_match {
            return false;
        }
    }
    is_subset(&selector.domain, &spec.domain) && is_subset(&selector.annotations, &spec.annotations)
}

fn display_label(entry: &PoolEntry, label: &LabelOptions) -> String {
    match entry.spec.annotation(crate::types::names::LABEL) {
        Some(native) if label.include_native_label && native != entry.label => {
            format!("{} / {}", entry.label, native)
        }
        _ => entry.label.clone(),
    }
}

impl ResultPool for SnapshotPool {
    fn get_spec(&self, reference: &PlRef) -> Option<ColumnSpec> {
        self.entry(reference).map(|e| e.spec.clone())
    }

    fn get_options(
        &self,
        selectors: &[ColumnSelector],
        label: &LabelOptions,
    ) -> Vec<OptionEntry<PlRef>> {
        let Some(resolved) = self.resolve_all(&AnchorSet::new(), selectors) else {
            return Vec::new();
        };
        self.matching(&resolved)
            .into_iter()
            .map(|(entry, _)| OptionEntry::new(entry.reference.clone(), display_label(entry, label)))
            .collect()
    }

    fn get_canonical_options(
        &self,
        anchors: &AnchorSet,
        selectors: &[ColumnSelector],
    ) -> Option<Vec<OptionEntry<ColumnRef>>> {
        let resolved = self.resolve_all(anchors, selectors)?;
        let mut options: Vec<OptionEntry<ColumnRef>> = Vec::new();
        for (entry, r) in self.matching(&resolved) {
            let value = Self::canonical_id(entry, r);
            if options.iter().all(|o| o.value != value) {
                options.push(OptionEntry::new(value, entry.label.clone()));
            }
        }
        Some(options)
    }

    fn get_anchored_columns(
        &self,
        anchors: &AnchorSet,
        selectors: &[ColumnSelector],
    ) -> Option<Vec<ColumnSpec>> {
        let resolved = self.resolve_all(anchors, selectors)?;
        Some(self.matching(&resolved).into_iter().map(|(entry, _)| entry.spec.clone()).collect())
    }
}
