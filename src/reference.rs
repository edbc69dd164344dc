//! Canonical reference tables for Italian administrative territories.
//!
//! Regions, provinces and ISTAT macro-areas form a closed hierarchy:
//! every province belongs to exactly one region and every region to exactly
//! one macro-area. The tables are authored here as static data; the derived
//! inverse maps and the consistency validation live in [`ReferenceData`].
//! Updating a provincial boundary means editing the tables, never the
//! resolution code.

use std::collections::{HashMap, HashSet};

use crate::error::{Result, TerritoryError};
use crate::normalize::normalize;

/// Region -> provinces (current assetto).
const REGION_PROVINCES: &[(&str, &[&str])] = &[
    ("Abruzzo", &["L'Aquila", "Teramo", "Pescara", "Chieti"]),
    ("Basilicata", &["Potenza", "Matera"]),
    (
        "Calabria",
        &["Catanzaro", "Cosenza", "Crotone", "Reggio Calabria", "Vibo Valentia"],
    ),
    (
        "Campania",
        &["Avellino", "Benevento", "Caserta", "Napoli", "Salerno"],
    ),
    (
        "Emilia-Romagna",
        &[
            "Bologna",
            "Ferrara",
            "Forlì-Cesena",
            "Modena",
            "Parma",
            "Piacenza",
            "Ravenna",
            "Reggio nell'Emilia",
            "Rimini",
        ],
    ),
    (
        "Friuli-Venezia Giulia",
        &["Gorizia", "Pordenone", "Trieste", "Udine"],
    ),
    ("Lazio", &["Frosinone", "Latina", "Rieti", "Roma", "Viterbo"]),
    ("Liguria", &["Genova", "Imperia", "La Spezia", "Savona"]),
    (
        "Lombardia",
        &[
            "Bergamo",
            "Brescia",
            "Como",
            "Cremona",
            "Lecco",
            "Lodi",
            "Mantova",
            "Milano",
            "Monza e della Brianza",
            "Pavia",
            "Sondrio",
            "Varese",
        ],
    ),
    (
        "Marche",
        &["Ancona", "Ascoli Piceno", "Fermo", "Macerata", "Pesaro e Urbino"],
    ),
    ("Molise", &["Campobasso", "Isernia"]),
    (
        "Piemonte",
        &[
            "Alessandria",
            "Asti",
            "Biella",
            "Cuneo",
            "Novara",
            "Torino",
            "Verbano-Cusio-Ossola",
            "Vercelli",
        ],
    ),
    (
        "Puglia",
        &["Bari", "Barletta-Andria-Trani", "Brindisi", "Foggia", "Lecce", "Taranto"],
    ),
    (
        "Sardegna",
        &["Cagliari", "Nuoro", "Oristano", "Sassari", "Sud Sardegna"],
    ),
    (
        "Sicilia",
        &[
            "Agrigento",
            "Caltanissetta",
            "Catania",
            "Enna",
            "Messina",
            "Palermo",
            "Ragusa",
            "Siracusa",
            "Trapani",
        ],
    ),
    (
        "Toscana",
        &[
            "Arezzo",
            "Firenze",
            "Grosseto",
            "Livorno",
            "Lucca",
            "Massa-Carrara",
            "Pisa",
            "Pistoia",
            "Prato",
            "Siena",
        ],
    ),
    ("Trentino-Alto Adige/Südtirol", &["Bolzano/Bozen", "Trento"]),
    ("Umbria", &["Perugia", "Terni"]),
    ("Valle d'Aosta/Vallée d'Aoste", &["Aosta"]),
    (
        "Veneto",
        &["Belluno", "Padova", "Rovigo", "Treviso", "Venezia", "Verona", "Vicenza"],
    ),
];

/// ISTAT macro-area -> regions.
const MACRO_REGIONS: &[(&str, &[&str])] = &[
    (
        "Nord-ovest",
        &["Piemonte", "Valle d'Aosta/Vallée d'Aoste", "Liguria", "Lombardia"],
    ),
    (
        "Nord-est",
        &["Trentino-Alto Adige/Südtirol", "Veneto", "Friuli-Venezia Giulia", "Emilia-Romagna"],
    ),
    ("Centro", &["Toscana", "Umbria", "Marche", "Lazio"]),
    (
        "Sud",
        &["Abruzzo", "Molise", "Campania", "Puglia", "Basilicata", "Calabria"],
    ),
    ("Isole", &["Sicilia", "Sardegna"]),
];

/// Province-level cities eligible for the "città metropolitana di ..." form.
const METRO_CITIES: &[&str] = &[
    "Torino",
    "Milano",
    "Venezia",
    "Genova",
    "Bologna",
    "Firenze",
    "Roma",
    "Napoli",
    "Bari",
    "Reggio Calabria",
    "Cagliari",
    "Catania",
    "Messina",
    "Palermo",
];

/// Hand-curated alias spellings, only for names where the auto-generated
/// structural variants are not enough: compound names, legacy spellings,
/// initialisms, bilingual names.
const MANUAL_ALIASES: &[(&str, &[&str])] = &[
    // Provinces
    ("Reggio nell'Emilia", &["reggio emilia"]),
    ("Reggio Calabria", &["reggio di calabria"]),
    ("Forlì-Cesena", &["forli cesena", "forli-cesena", "forlì cesena"]),
    ("La Spezia", &["spezia"]),
    ("Massa-Carrara", &["massa carrara", "massa-carrara"]),
    ("Monza e della Brianza", &["monza e brianza", "monza brianza"]),
    ("Bolzano/Bozen", &["bolzano", "bozen", "bolzano-bozen", "bozen-bolzano"]),
    ("Barletta-Andria-Trani", &["barletta andria trani", "bat", "b.a.t."]),
    ("Pesaro e Urbino", &["pesaro urbino"]),
    (
        "Valle d'Aosta/Vallée d'Aoste",
        &["valle d aosta", "valle d'aosta", "valle d’aosta", "vallee daoste"],
    ),
    // Regions
    ("Friuli-Venezia Giulia", &["friuli venezia giulia"]),
    ("Trentino-Alto Adige/Südtirol", &["trentino alto adige", "trentino-alto adige"]),
];

/// Immutable reference data: the canonical lists plus the derived inverse
/// maps. Built once at startup, validated, then shared read-only.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    regions: Vec<String>,
    provinces: Vec<String>,
    macro_areas: Vec<String>,
    province_to_region: HashMap<String, String>,
    region_to_macro: HashMap<String, String>,
    metro_cities: HashSet<String>,
    manual_aliases: Vec<(String, Vec<String>)>,
}

impl ReferenceData {
    /// Build and validate the built-in tables.
    pub fn builtin() -> Result<Self> {
        Self::from_tables(REGION_PROVINCES, MACRO_REGIONS, METRO_CITIES, MANUAL_ALIASES)
    }

    /// Build from explicit tables, failing fast on any inconsistency:
    /// a province claimed by two regions, a region claimed by two macro-areas,
    /// a macro-area or alias referring to an unknown canonical name.
    pub fn from_tables(
        region_provinces: &[(&str, &[&str])],
        macro_regions: &[(&str, &[&str])],
        metro_cities: &[&str],
        manual_aliases: &[(&str, &[&str])],
    ) -> Result<Self> {
        let mut regions = Vec::new();
        let mut provinces = Vec::new();
        let mut province_to_region: HashMap<String, String> = HashMap::new();

        for (region, provs) in region_provinces {
            if regions.contains(&region.to_string()) {
                return Err(TerritoryError::Reference(format!(
                    "region '{region}' listed twice"
                )));
            }
            regions.push(region.to_string());
            for province in *provs {
                if let Some(other) = province_to_region.get(*province) {
                    return Err(TerritoryError::Reference(format!(
                        "province '{province}' claimed by both '{other}' and '{region}'"
                    )));
                }
                province_to_region.insert(province.to_string(), region.to_string());
                provinces.push(province.to_string());
            }
        }
        provinces.sort();

        let mut macro_areas = Vec::new();
        let mut region_to_macro: HashMap<String, String> = HashMap::new();
        for (macro_area, macro_region_list) in macro_regions {
            macro_areas.push(macro_area.to_string());
            for region in *macro_region_list {
                if !regions.contains(&region.to_string()) {
                    return Err(TerritoryError::Reference(format!(
                        "macro-area '{macro_area}' lists unknown region '{region}'"
                    )));
                }
                if let Some(other) = region_to_macro.get(*region) {
                    return Err(TerritoryError::Reference(format!(
                        "region '{region}' claimed by both '{other}' and '{macro_area}'"
                    )));
                }
                region_to_macro.insert(region.to_string(), macro_area.to_string());
            }
        }
        macro_areas.sort();

        for region in &regions {
            if !region_to_macro.contains_key(region) {
                return Err(TerritoryError::Reference(format!(
                    "region '{region}' belongs to no macro-area"
                )));
            }
        }

        for city in metro_cities {
            if !province_to_region.contains_key(*city) {
                return Err(TerritoryError::Reference(format!(
                    "metro city '{city}' is not a known province"
                )));
            }
        }

        let mut aliases = Vec::new();
        for (canonical, variants) in manual_aliases {
            let known = province_to_region.contains_key(*canonical)
                || regions.contains(&canonical.to_string())
                || macro_areas.contains(&canonical.to_string());
            if !known {
                return Err(TerritoryError::Reference(format!(
                    "alias group refers to unknown canonical name '{canonical}'"
                )));
            }
            aliases.push((
                canonical.to_string(),
                variants.iter().map(|v| v.to_string()).collect(),
            ));
        }

        Ok(Self {
            regions,
            provinces,
            macro_areas,
            province_to_region,
            region_to_macro,
            metro_cities: metro_cities.iter().map(|c| c.to_string()).collect(),
            manual_aliases: aliases,
        })
    }

    /// Canonical region names, in table order.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Canonical province names, sorted.
    pub fn provinces(&self) -> &[String] {
        &self.provinces
    }

    /// Canonical macro-area names, sorted.
    pub fn macro_areas(&self) -> &[String] {
        &self.macro_areas
    }

    /// Region owning a province, by canonical province name.
    pub fn region_of(&self, province: &str) -> Option<&str> {
        self.province_to_region.get(province).map(String::as_str)
    }

    /// Macro-area owning a region, by canonical region name.
    pub fn macro_of(&self, region: &str) -> Option<&str> {
        self.region_to_macro.get(region).map(String::as_str)
    }

    pub fn is_province(&self, name: &str) -> bool {
        self.province_to_region.contains_key(name)
    }

    pub fn is_region(&self, name: &str) -> bool {
        self.region_to_macro.contains_key(name)
    }

    pub fn is_macro_area(&self, name: &str) -> bool {
        self.macro_areas.iter().any(|m| m == name)
    }

    pub fn is_metro_city(&self, province: &str) -> bool {
        self.metro_cities.contains(province)
    }

    /// Hand-curated (canonical, variants) alias groups.
    pub fn manual_aliases(&self) -> &[(String, Vec<String>)] {
        &self.manual_aliases
    }

    /// Normalized-token -> canonical map for one tier, used by the exact
    /// and fuzzy canonical passes. Sorted keys (BTreeMap iteration order)
    /// give the fuzzy pass its deterministic alphabetical tie-break.
    pub fn normalized_tier(&self, names: &[String]) -> std::collections::BTreeMap<String, String> {
        names
            .iter()
            .map(|n| (normalize(n), n.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_consistent() {
        let reference = ReferenceData::builtin().expect("builtin tables must validate");
        assert_eq!(reference.regions().len(), 20);
        assert_eq!(reference.provinces().len(), 107);
        assert_eq!(reference.macro_areas().len(), 5);
    }

    #[test]
    fn test_every_region_has_macro() {
        let reference = ReferenceData::builtin().unwrap();
        for region in reference.regions() {
            assert!(
                reference.macro_of(region).is_some(),
                "region {region} has no macro-area"
            );
        }
    }

    #[test]
    fn test_hierarchy_lookups() {
        let reference = ReferenceData::builtin().unwrap();
        assert_eq!(reference.region_of("Bologna"), Some("Emilia-Romagna"));
        assert_eq!(reference.macro_of("Emilia-Romagna"), Some("Nord-est"));
        assert_eq!(reference.region_of("Aosta"), Some("Valle d'Aosta/Vallée d'Aoste"));
        assert!(reference.is_metro_city("Napoli"));
        assert!(!reference.is_metro_city("Lodi"));
    }

    #[test]
    fn test_duplicate_province_rejected() {
        let result = ReferenceData::from_tables(
            &[("A", &["X", "Y"]), ("B", &["X"])],
            &[("M", &["A", "B"])],
            &[],
            &[],
        );
        assert!(matches!(result, Err(TerritoryError::Reference(_))));
    }

    #[test]
    fn test_region_in_two_macro_areas_rejected() {
        let result = ReferenceData::from_tables(
            &[("A", &["X"])],
            &[("M1", &["A"]), ("M2", &["A"])],
            &[],
            &[],
        );
        assert!(matches!(result, Err(TerritoryError::Reference(_))));
    }

    #[test]
    fn test_unknown_alias_canonical_rejected() {
        let result = ReferenceData::from_tables(
            &[("A", &["X"])],
            &[("M", &["A"])],
            &[],
            &[("Nowhere", &["nowhere"])],
        );
        assert!(matches!(result, Err(TerritoryError::Reference(_))));
    }

    #[test]
    fn test_region_without_macro_rejected() {
        let result = ReferenceData::from_tables(&[("A", &["X"])], &[], &[], &[]);
        assert!(matches!(result, Err(TerritoryError::Reference(_))));
    }
}
