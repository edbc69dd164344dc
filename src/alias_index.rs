//! Alias index: normalized token -> canonical territory name.
//!
//! Built once from the reference tables by merging, in override order:
//! canonical self-keys, auto-generated structural variants per province,
//! then the hand-curated alias table. Later entries win for the same token,
//! so the manual table always has the last word.

use std::collections::HashMap;

use tracing::debug;

use crate::normalize::normalize;
use crate::reference::ReferenceData;

#[derive(Debug, Clone)]
pub struct AliasIndex {
    map: HashMap<String, String>,
}

impl AliasIndex {
    /// Build the index from validated reference data. Total: no failure mode.
    pub fn build(reference: &ReferenceData) -> Self {
        let mut map: HashMap<String, String> = HashMap::new();

        // Canonical self-keys, guaranteeing self-resolution.
        for region in reference.regions() {
            map.insert(normalize(region), region.clone());
        }
        for province in reference.provinces() {
            map.insert(normalize(province), province.clone());
        }
        for macro_area in reference.macro_areas() {
            map.insert(normalize(macro_area), macro_area.clone());
        }

        // Structural variants per province.
        for province in reference.provinces() {
            for variant in province_variants(reference, province) {
                map.insert(variant, province.clone());
            }
        }

        // Hand-curated variants override anything generated above.
        for (canonical, variants) in reference.manual_aliases() {
            for variant in variants {
                map.insert(normalize(variant), canonical.clone());
            }
        }

        debug!(entries = map.len(), "alias index built");
        Self { map }
    }

    /// Exact lookup of a normalized token.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.map.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Common structural forms of a province name: the bare token,
/// "provincia di ..." and "prov di ...", plus the metropolitan form
/// for provinces flagged as metro cities.
fn province_variants(reference: &ReferenceData, province: &str) -> Vec<String> {
    let base = normalize(province);
    let mut variants = vec![
        base.clone(),
        normalize(&format!("provincia di {base}")),
        normalize(&format!("prov di {base}")),
    ];
    if reference.is_metro_city(province) {
        variants.push(normalize(&format!("citta metropolitana di {base}")));
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> AliasIndex {
        AliasIndex::build(&ReferenceData::builtin().unwrap())
    }

    #[test]
    fn test_canonical_self_keys() {
        let index = index();
        assert_eq!(index.get("bologna"), Some("Bologna"));
        assert_eq!(index.get("emilia romagna"), Some("Emilia-Romagna"));
        assert_eq!(index.get("nord est"), Some("Nord-est"));
    }

    #[test]
    fn test_structural_variants() {
        let index = index();
        assert_eq!(index.get(&normalize("provincia di Napoli")), Some("Napoli"));
        assert_eq!(index.get(&normalize("prov di Cuneo")), Some("Cuneo"));
    }

    #[test]
    fn test_metro_variant_only_for_metro_cities() {
        let index = index();
        assert_eq!(
            index.get(&normalize("città metropolitana di Torino")),
            Some("Torino")
        );
        // Lodi is not a metro city; the prefix still strips during
        // normalization, so the bare token resolves anyway.
        assert_eq!(index.get(&normalize("citta metropolitana di Lodi")), Some("Lodi"));
    }

    #[test]
    fn test_manual_aliases_win() {
        let index = index();
        assert_eq!(index.get("reggio emilia"), Some("Reggio nell'Emilia"));
        assert_eq!(index.get("bat"), Some("Barletta-Andria-Trani"));
        assert_eq!(index.get(&normalize("b.a.t.")), Some("Barletta-Andria-Trani"));
        assert_eq!(index.get("bolzano"), Some("Bolzano/Bozen"));
        assert_eq!(index.get("spezia"), Some("La Spezia"));
    }

    #[test]
    fn test_alias_keys_are_normalized() {
        let index = index();
        // Raw manual entries carry apostrophes; lookup works on tokens only.
        assert_eq!(
            index.get(&normalize("valle d’aosta")),
            Some("Valle d'Aosta/Vallée d'Aoste")
        );
    }
}
