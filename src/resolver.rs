//! Layered territory resolution: raw label in, canonical identity out.
//!
//! Strategies run in a fixed priority order and the first hit wins:
//! exact alias lookup, exact canonical match (province, then region, then
//! macro-area), fuzzy match per tier in the same order, one narrow
//! heuristic, then `Unknown`. Province always beats region beats macro-area
//! because province names are the most specific. Resolution is pure: no
//! I/O, no mutation, `Unknown` is an ordinary result rather than an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;
use tracing::debug;

use crate::alias_index::AliasIndex;
use crate::error::Result;
use crate::normalize::normalize;
use crate::reference::ReferenceData;

/// Acceptance threshold for the fuzzy fallback pass.
pub const FUZZY_THRESHOLD: f64 = 0.90;

const AOSTA_REGION: &str = "Valle d'Aosta/Vallée d'Aoste";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerritoryLevel {
    Province,
    Region,
    #[serde(rename = "macro")]
    MacroArea,
    Unknown,
}

impl TerritoryLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerritoryLevel::Province => "province",
            TerritoryLevel::Region => "region",
            TerritoryLevel::MacroArea => "macro",
            TerritoryLevel::Unknown => "unknown",
        }
    }
}

/// Resolved identity of a territory label, with the hierarchy derived
/// from the reference tables: a province implies its region and macro-area,
/// a region implies its macro-area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritoryIdentity {
    pub level: TerritoryLevel,
    pub province: Option<String>,
    pub region: Option<String>,
    pub macro_area: Option<String>,
}

impl TerritoryIdentity {
    pub fn unknown() -> Self {
        Self {
            level: TerritoryLevel::Unknown,
            province: None,
            region: None,
            macro_area: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.level == TerritoryLevel::Unknown
    }
}

/// Resolution strategies, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    ExactAlias,
    ExactCanonical,
    FuzzyCanonical,
    AostaHeuristic,
}

const STRATEGY_ORDER: &[Strategy] = &[
    Strategy::ExactAlias,
    Strategy::ExactCanonical,
    Strategy::FuzzyCanonical,
    Strategy::AostaHeuristic,
];

pub struct TerritoryResolver {
    reference: ReferenceData,
    aliases: AliasIndex,
    // Normalized-token -> canonical name, one map per tier. BTreeMap keeps
    // fuzzy candidate iteration in alphabetical order, which is also the
    // documented tie-break for equal similarity scores.
    norm_provinces: BTreeMap<String, String>,
    norm_regions: BTreeMap<String, String>,
    norm_macros: BTreeMap<String, String>,
}

impl TerritoryResolver {
    pub fn new(reference: ReferenceData) -> Self {
        let aliases = AliasIndex::build(&reference);
        let norm_provinces = reference.normalized_tier(reference.provinces());
        let norm_regions = reference.normalized_tier(reference.regions());
        let norm_macros = reference.normalized_tier(reference.macro_areas());
        Self {
            reference,
            aliases,
            norm_provinces,
            norm_regions,
            norm_macros,
        }
    }

    /// Resolver over the built-in reference tables, validated at build time.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(ReferenceData::builtin()?))
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Resolve a possibly-missing raw label. `None` resolves to `Unknown`.
    pub fn resolve_opt(&self, raw: Option<&str>) -> TerritoryIdentity {
        match raw {
            Some(raw) => self.resolve(raw),
            None => TerritoryIdentity::unknown(),
        }
    }

    /// Resolve a raw label to its territory identity. Deterministic, total,
    /// side-effect-free; `Unknown` is the only "no match" signal.
    pub fn resolve(&self, raw: &str) -> TerritoryIdentity {
        let token = normalize(raw);
        if token.is_empty() {
            return TerritoryIdentity::unknown();
        }
        for strategy in STRATEGY_ORDER {
            if let Some(identity) = self.apply(*strategy, &token) {
                return identity;
            }
        }
        TerritoryIdentity::unknown()
    }

    fn apply(&self, strategy: Strategy, token: &str) -> Option<TerritoryIdentity> {
        match strategy {
            Strategy::ExactAlias => {
                let canonical = self.aliases.get(token)?;
                Some(self.identity_for(canonical))
            }
            Strategy::ExactCanonical => {
                for tier in [&self.norm_provinces, &self.norm_regions, &self.norm_macros] {
                    if let Some(canonical) = tier.get(token) {
                        return Some(self.identity_for(canonical));
                    }
                }
                None
            }
            Strategy::FuzzyCanonical => {
                for tier in [&self.norm_provinces, &self.norm_regions, &self.norm_macros] {
                    if let Some(canonical) = best_fuzzy_candidate(token, tier) {
                        debug!(token, canonical, "fuzzy match accepted");
                        return Some(self.identity_for(canonical));
                    }
                }
                None
            }
            Strategy::AostaHeuristic => {
                // Apostrophe-heavy bilingual canonical name; free-form
                // spellings that slip past normalization and aliases still
                // mention "aosta" somewhere.
                if token.contains("aosta") {
                    debug!(token, "aosta heuristic applied");
                    Some(self.identity_for(AOSTA_REGION))
                } else {
                    None
                }
            }
        }
    }

    /// Identity of a canonical name, with hierarchy fields always derived
    /// through the ownership maps rather than supplied by the caller.
    fn identity_for(&self, canonical: &str) -> TerritoryIdentity {
        if let Some(region) = self.reference.region_of(canonical) {
            let macro_area = self.reference.macro_of(region);
            return TerritoryIdentity {
                level: TerritoryLevel::Province,
                province: Some(canonical.to_string()),
                region: Some(region.to_string()),
                macro_area: macro_area.map(str::to_string),
            };
        }
        if let Some(macro_area) = self.reference.macro_of(canonical) {
            return TerritoryIdentity {
                level: TerritoryLevel::Region,
                province: None,
                region: Some(canonical.to_string()),
                macro_area: Some(macro_area.to_string()),
            };
        }
        if self.reference.is_macro_area(canonical) {
            return TerritoryIdentity {
                level: TerritoryLevel::MacroArea,
                province: None,
                region: None,
                macro_area: Some(canonical.to_string()),
            };
        }
        TerritoryIdentity::unknown()
    }
}

/// Single best candidate above the acceptance threshold, or none.
/// Candidates iterate in alphabetical (BTreeMap key) order and only a
/// strictly better score replaces the current best, so equal top scores
/// resolve to the alphabetically first candidate.
fn best_fuzzy_candidate<'a>(
    token: &str,
    candidates: &'a BTreeMap<String, String>,
) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for (normalized, canonical) in candidates {
        let score = jaro_winkler(token, normalized);
        if score >= FUZZY_THRESHOLD && best.map_or(true, |(_, s)| score > s) {
            best = Some((canonical.as_str(), score));
        }
    }
    best.map(|(canonical, _)| canonical)
}
