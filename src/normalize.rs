//! Text normalization for territory label matching.
//!
//! Every comparison in the crate happens between normalized tokens:
//! accent-stripped, lower-cased, apostrophes and dashes folded to spaces,
//! whitespace collapsed, and leading legal-entity prefixes removed.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref APOSTROPHES: Regex = Regex::new(r"[’'`]").unwrap();
    static ref DASHES: Regex = Regex::new(r"[-–—]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref ENTITY_PREFIX: Regex =
        Regex::new(r"^(provincia di|prov di|citta metropolitana di)\s+").unwrap();
}

/// Decompose accented characters (NFKD) and drop the combining marks,
/// so "Forlì" becomes "Forli" and "Südtirol" becomes "Sudtirol".
pub fn strip_accents(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Normalize a raw territory label into its comparison token.
///
/// Total over any input and idempotent: `normalize(normalize(x)) == normalize(x)`.
/// An empty or whitespace-only input normalizes to the empty token.
pub fn normalize(raw: &str) -> String {
    let s = strip_accents(raw).to_lowercase();
    let s = APOSTROPHES.replace_all(&s, " ");
    let s = DASHES.replace_all(&s, " ");
    let s = WHITESPACE.replace_all(&s, " ");
    let mut token = s.trim().to_string();

    // Stripping one prefix can expose another ("provincia di provincia di x"),
    // so strip until the token is stable. This keeps normalize idempotent.
    loop {
        let stripped = ENTITY_PREFIX.replace(&token, "").trim().to_string();
        if stripped == token {
            break;
        }
        token = stripped;
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_accents() {
        assert_eq!(strip_accents("Forlì"), "Forli");
        assert_eq!(strip_accents("Südtirol"), "Sudtirol");
        assert_eq!(strip_accents("Vallée"), "Vallee");
    }

    #[test]
    fn test_basic_normalization() {
        assert_eq!(normalize("  Reggio   Emilia  "), "reggio emilia");
        assert_eq!(normalize("Forlì-Cesena"), "forli cesena");
        assert_eq!(normalize("Valle d'Aosta"), "valle d aosta");
        assert_eq!(normalize("Valle d’Aosta"), "valle d aosta");
        assert_eq!(normalize("Monza e della Brianza"), "monza e della brianza");
    }

    #[test]
    fn test_dash_variants() {
        assert_eq!(normalize("Emilia–Romagna"), "emilia romagna");
        assert_eq!(normalize("Emilia—Romagna"), "emilia romagna");
        assert_eq!(normalize("Emilia-Romagna"), "emilia romagna");
    }

    #[test]
    fn test_prefix_stripping() {
        assert_eq!(normalize("provincia di Napoli"), "napoli");
        assert_eq!(normalize("Prov di Torino"), "torino");
        assert_eq!(normalize("Città Metropolitana di Milano"), "milano");
        // Prefix only strips at the start of the token
        assert_eq!(normalize("la provincia di prova"), "la provincia di prova");
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("\t\n"), "");
    }

    #[test]
    fn test_idempotence() {
        let samples = [
            "Provincia di Reggio nell'Emilia",
            "FORLÌ-CESENA",
            "  città   metropolitana   di  Roma ",
            "Trentino-Alto Adige/Südtirol",
            "provincia di provincia di Bologna",
            "",
            "Xyzzy Nonexistent",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }
}
