//! Availability of antibody numbering for the anchored dataset.
//!
//! Numbering needs amino-acid VDJRegion sequences of assembling features of
//! immunoglobulin chains. Bulk datasets qualify with either chain alone;
//! single-cell datasets need both the heavy and the light primary chain.

use crate::pool::{AnchorSet, AxisSelector, ColumnSelector, ResultPool, MAIN_ANCHOR};
use crate::retentive::RetentiveCache;
use crate::types::{names, ColumnSpec, DatasetMode, PlRef};

/// Sequence features numbering can be computed from.
pub const NUMBERING_FEATURES: [&str; 2] = ["VDJRegion", "VDJRegionInFrame"];

const IG_HEAVY: &str = "IGHeavy";
const IG_LIGHT: &str = "IGLight";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainPresence {
    pub heavy: bool,
    pub light: bool,
}

impl ChainPresence {
    fn merge(self, other: ChainPresence) -> ChainPresence {
        ChainPresence {
            heavy: self.heavy || other.heavy,
            light: self.light || other.light,
        }
    }
}

/// Chain classification rules of one dataset shape.
pub trait ChainRules {
    /// Which chains a single assembling candidate provides.
    fn classify(&self, candidate: &ColumnSpec) -> ChainPresence;

    /// Whether the chains found are enough for numbering.
    fn is_sufficient(&self, presence: ChainPresence) -> bool;
}

pub struct BulkRules;

pub struct SingleCellRules;

impl BulkRules {
    fn carries_chain(candidate: &ColumnSpec, chain: &str) -> bool {
        candidate.domain_value(names::CHAIN) == Some(chain)
            || candidate
                .axes_spec
                .iter()
                .any(|axis| axis.domain_value(names::CHAIN) == Some(chain))
    }
}

impl ChainRules for BulkRules {
    fn classify(&self, candidate: &ColumnSpec) -> ChainPresence {
        ChainPresence {
            heavy: Self::carries_chain(candidate, IG_HEAVY),
            light: Self::carries_chain(candidate, IG_LIGHT),
        }
    }

    fn is_sufficient(&self, presence: ChainPresence) -> bool {
        presence.heavy || presence.light
    }
}

impl SingleCellRules {
    fn is_primary_ig(candidate: &ColumnSpec) -> bool {
        let receptor = candidate
            .axis(0)
            .and_then(|axis| axis.domain_value(names::RECEPTOR));
        receptor == Some("IG") && candidate.domain_value(names::SC_CHAIN_INDEX) == Some("primary")
    }
}

impl ChainRules for SingleCellRules {
    fn classify(&self, candidate: &ColumnSpec) -> ChainPresence {
        if !Self::is_primary_ig(candidate) {
            return ChainPresence::default();
        }
        let chain = candidate.domain_value(names::SC_CHAIN);
        ChainPresence {
            heavy: chain == Some("A"),
            light: chain == Some("B"),
        }
    }

    fn is_sufficient(&self, presence: ChainPresence) -> bool {
        presence.heavy && presence.light
    }
}

impl DatasetMode {
    pub fn chain_rules(self) -> &'static dyn ChainRules {
        match self {
            DatasetMode::Bulk => &BulkRules,
            DatasetMode::SingleCell => &SingleCellRules,
        }
    }
}

pub fn is_assembling_feature(spec: &ColumnSpec) -> bool {
    spec.annotation_is_true(names::IS_ASSEMBLING_FEATURE)
}

/// Chains provided by the assembling candidates under the rules of `mode`.
pub fn chain_presence(mode: DatasetMode, candidates: &[ColumnSpec]) -> ChainPresence {
    let rules = mode.chain_rules();
    candidates
        .iter()
        .filter(|c| is_assembling_feature(c))
        .map(|c| rules.classify(c))
        .fold(ChainPresence::default(), ChainPresence::merge)
}

/// Whether numbering can be offered for the anchored dataset, given its
/// amino-acid VDJRegion candidates.
pub fn is_numbering_available(anchor: &ColumnSpec, candidates: &[ColumnSpec]) -> bool {
    if !candidates.iter().any(is_assembling_feature) {
        return false;
    }
    let mode = DatasetMode::of(anchor);
    let presence = chain_presence(mode, candidates);
    mode.chain_rules().is_sufficient(presence)
}

/// Selectors for the numbering candidates of the anchored dataset.
pub fn numbering_candidate_selectors() -> Vec<ColumnSelector> {
    NUMBERING_FEATURES
        .iter()
        .map(|feature| {
            ColumnSelector::new()
                .with_name(names::SEQUENCE)
                .with_axis(AxisSelector::anchored(MAIN_ANCHOR, 1))
                .with_domain(names::ALPHABET, "aminoacid")
                .with_domain(names::FEATURE, *feature)
        })
        .collect()
}

/// Local re-check of what [`numbering_candidate_selectors`] asks the pool for.
pub fn is_numbering_candidate(spec: &ColumnSpec) -> bool {
    spec.name == names::SEQUENCE
        && spec.domain_value(names::ALPHABET) == Some("aminoacid")
        && spec
            .domain_value(names::FEATURE)
            .is_some_and(|f| NUMBERING_FEATURES.contains(&f))
}

/// Memoised availability: recomputed only when the anchor spec or the
/// candidate set actually change.
#[derive(Debug, Default)]
pub struct NumberingAvailabilityCache {
    cache: RetentiveCache<(ColumnSpec, Vec<ColumnSpec>), bool>,
    recomputations: usize,
}

impl NumberingAvailabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&mut self, anchor: &ColumnSpec, candidates: &[ColumnSpec]) -> bool {
        let recomputations = &mut self.recomputations;
        self.cache.get_or_compute(
            |(kept_anchor, kept_candidates)| kept_anchor == anchor && kept_candidates.as_slice() == candidates,
            || (anchor.clone(), candidates.to_vec()),
            |(a, c)| {
                *recomputations += 1;
                let available = is_numbering_available(a, c);
                log::debug!(
                    "Numbering availability recomputed over {} candidates: {} (evaluation #{})",
                    c.len(),
                    available,
                    recomputations
                );
                available
            },
        )
    }

    /// How many times the predicate actually ran.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// Query the pool for the anchor's candidates and evaluate them.
    /// `None` while no anchor is set or its metadata is not published yet.
    pub fn resolve<P: ResultPool + ?Sized>(&mut self, pool: &P, anchor: Option<&PlRef>) -> Option<bool> {
        let anchor = anchor?;
        let anchor_spec = pool.get_spec(anchor)?;

        let mut anchors = AnchorSet::new();
        anchors.insert(MAIN_ANCHOR.to_string(), anchor.clone());
        let candidates: Vec<ColumnSpec> = pool
            .get_anchored_columns(&anchors, &numbering_candidate_selectors())?
            .into_iter()
            .filter(is_numbering_candidate)
            .collect();

        Some(self.evaluate(&anchor_spec, &candidates))
    }
}
