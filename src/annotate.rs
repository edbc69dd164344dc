//! Bulk annotation: resolve a label column and attach the standardized
//! territory fields as new columns. One row in, one row out, order kept.

use polars::prelude::*;
use tracing::debug;

use crate::error::{Result, TerritoryError};
use crate::resolver::{TerritoryIdentity, TerritoryResolver};

/// Column names appended by [`annotate_territories`].
pub const LEVEL_COL: &str = "level";
pub const PROVINCE_COL: &str = "province_std";
pub const REGION_COL: &str = "region_std";
pub const MACRO_COL: &str = "macro_std";

/// Resolve every value of `label_col` and return the frame with four new
/// columns: `level`, `province_std`, `region_std`, `macro_std`. Null labels
/// resolve to unknown; no rows are filtered, created or reordered.
pub fn annotate_territories(
    df: &DataFrame,
    label_col: &str,
    resolver: &TerritoryResolver,
) -> Result<DataFrame> {
    let labels = df.column(label_col).map_err(|_| {
        TerritoryError::Annotation(format!("label column '{label_col}' not found"))
    })?;
    let labels = if labels.dtype() == &DataType::String {
        labels.clone()
    } else {
        labels.cast(&DataType::String)?
    };
    let labels = labels.str()?;

    let mut levels: Vec<&'static str> = Vec::with_capacity(df.height());
    let mut provinces: Vec<Option<String>> = Vec::with_capacity(df.height());
    let mut regions: Vec<Option<String>> = Vec::with_capacity(df.height());
    let mut macros: Vec<Option<String>> = Vec::with_capacity(df.height());
    let mut unknown_count = 0usize;

    for raw in labels.into_iter() {
        let identity: TerritoryIdentity = resolver.resolve_opt(raw);
        if identity.is_unknown() {
            unknown_count += 1;
        }
        levels.push(identity.level.as_str());
        provinces.push(identity.province);
        regions.push(identity.region);
        macros.push(identity.macro_area);
    }

    debug!(
        rows = df.height(),
        unknown = unknown_count,
        "territory annotation complete"
    );

    let annotated = df.hstack(&[
        Series::new(LEVEL_COL, levels),
        Series::new(PROVINCE_COL, provinces),
        Series::new(REGION_COL, regions),
        Series::new(MACRO_COL, macros),
    ])?;
    Ok(annotated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_preserves_rows_and_order() {
        let resolver = TerritoryResolver::builtin().unwrap();
        let df = df![
            "territory" => ["provincia di Napoli", "Trentino Alto Adige", "Xyzzy", "BAT"],
            "value" => [1.0, 2.0, 3.0, 4.0]
        ]
        .unwrap();

        let out = annotate_territories(&df, "territory", &resolver).unwrap();
        assert_eq!(out.height(), 4);

        let levels = out.column(LEVEL_COL).unwrap().str().unwrap();
        assert_eq!(levels.get(0), Some("province"));
        assert_eq!(levels.get(1), Some("region"));
        assert_eq!(levels.get(2), Some("unknown"));
        assert_eq!(levels.get(3), Some("province"));

        let provinces = out.column(PROVINCE_COL).unwrap().str().unwrap();
        assert_eq!(provinces.get(0), Some("Napoli"));
        assert_eq!(provinces.get(1), None);
        assert_eq!(provinces.get(3), Some("Barletta-Andria-Trani"));

        let macros = out.column(MACRO_COL).unwrap().str().unwrap();
        assert_eq!(macros.get(1), Some("Nord-est"));
    }

    #[test]
    fn test_null_labels_resolve_to_unknown() {
        let resolver = TerritoryResolver::builtin().unwrap();
        let df = df![
            "territory" => [Some("Roma"), None, Some("")]
        ]
        .unwrap();

        let out = annotate_territories(&df, "territory", &resolver).unwrap();
        let levels = out.column(LEVEL_COL).unwrap().str().unwrap();
        assert_eq!(levels.get(0), Some("province"));
        assert_eq!(levels.get(1), Some("unknown"));
        assert_eq!(levels.get(2), Some("unknown"));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let resolver = TerritoryResolver::builtin().unwrap();
        let df = df!["x" => [1]].unwrap();
        let result = annotate_territories(&df, "territory", &resolver);
        assert!(matches!(result, Err(TerritoryError::Annotation(_))));
    }
}
