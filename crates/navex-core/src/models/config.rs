//! Configuration structures for the extraction engine.
//!
//! Everything the rules consume is data: vocabulary lists, the pattern
//! table, thresholds and field weights all live here and can be changed
//! without touching the engine logic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Main configuration for the navex engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Thresholds, confidence bases and field weights.
    pub extraction: ExtractionConfig,

    /// Regex pattern table keyed by rule name.
    pub patterns: PatternConfig,

    /// Maritime vocabulary and detector keyword lists.
    pub vocabulary: VocabularyConfig,
}

/// Scoring and strategy thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum overall confidence for a `success` status.
    pub confidence_threshold: f32,

    /// Row count above which a table is considered complex.
    pub table_size_threshold: usize,

    /// Confidence assigned to a match found behind its anchor keyword.
    pub anchored_confidence: f32,

    /// Confidence assigned to a heuristic fallback match.
    pub fallback_confidence: f32,

    /// Penalty subtracted from the aggregate for each absent mandatory field.
    pub missing_mandatory_penalty: f32,

    /// Importance weight per field name; mandatory fields weigh
    /// substantially more than optional ones.
    pub field_weights: HashMap<String, f32>,

    /// Weight used for fields absent from `field_weights`.
    pub default_field_weight: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.6,
            table_size_threshold: 10,
            anchored_confidence: 0.9,
            fallback_confidence: 0.6,
            missing_mandatory_penalty: 0.1,
            field_weights: default_field_weights(),
            default_field_weight: 0.25,
        }
    }
}

impl ExtractionConfig {
    /// Weight of a field, falling back to the default weight.
    pub fn weight(&self, field: &str) -> f32 {
        self.field_weights
            .get(field)
            .copied()
            .unwrap_or(self.default_field_weight)
    }
}

fn default_field_weights() -> HashMap<String, f32> {
    let weights = [
        // Mandatory fields
        ("n_sysi", 1.0),
        ("nom_bapteme", 1.0),
        ("position", 1.0),
        ("nature_support", 1.0),
        // Important optional fields
        ("marque", 0.5),
        ("fonction", 0.5),
        ("nom_patrimoine", 0.5),
        // The rest
        ("feu_couleur", 0.25),
        ("feu_rythme", 0.25),
        ("feu_portee", 0.25),
        ("ais_aton", 0.25),
        ("reflecteur_radar", 0.25),
        ("racon_present", 0.25),
    ];
    weights
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Regex pattern table. Keys mirror the rule identifiers; values are plain
/// regex strings compiled once at engine construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// ESM-anchored SYSSI number.
    pub esm: String,

    /// SYSSI-labelled number.
    pub syssi: String,

    /// Bare 7-8 digit number, validated against department prefixes.
    pub n_sysi: String,

    /// Degrees-minutes coordinates pair.
    pub position_coords: String,

    /// Decimal-degrees coordinates pair.
    pub position_decimal: String,

    /// Numeric date (dd/mm/yyyy and variants).
    pub date: String,

    /// Labelled nominal range in nautical miles.
    pub portee: String,

    /// One coordinate-bearing table row (used for row counting).
    pub table_row: String,

    /// One buoy/beacon row with name, side and coordinates.
    pub exemple_bouee: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            esm: r"(?i)ESM\s*N°?\s*(\d{7,8})".to_string(),
            syssi: r"(?i)SYSSI\s*[:N°]?\s*(\d{7,8})".to_string(),
            n_sysi: r"\b\d{7,8}\b".to_string(),
            position_coords:
                r"\d{1,2}[°\s]*\d{1,2}[,.\s]*\d{0,3}\s*['′]?\s*[NS]\s*,?\s*\d{1,3}[°\s]*\d{1,2}[,.\s]*\d{0,3}\s*['′]?\s*[EWO]"
                    .to_string(),
            position_decimal: r"\d{1,2}\.\d{4,}\s*[NS]\s*,?\s*\d{1,3}\.\d{4,}\s*[EWO]".to_string(),
            date: r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b".to_string(),
            portee: r"(?i)port[ée]e?\s*:?\s*(\d+)\s*M".to_string(),
            table_row: r"\d{2}°\s*\d{1,2}[,.\s]+\d{0,3}\s*[NS]".to_string(),
            exemple_bouee:
                r"(?i)(Bouée|Balise)\s+(babord|tribord|bâbord)\s+(\d+)?[^\d]*(\d{2}°\s*\d{1,2}[,.\s]+\d{0,3}\s*[NS])[^\d]*(\d{1,3}°\s*\d{1,2}[,.\s]+\d{0,3}\s*[EWO])"
                    .to_string(),
        }
    }
}

/// Maritime vocabulary and document-type keyword lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub natures_support: Vec<String>,
    pub marques: Vec<String>,
    pub fonctions: Vec<String>,
    pub couleurs_feu: Vec<String>,
    pub couleurs_marque: Vec<String>,
    pub rythmes_feu: Vec<String>,
    pub types_aide_sonore: Vec<String>,
    pub types_voyant: Vec<String>,

    /// SYSSI department prefixes accepted for bare-number matches.
    pub departements: Vec<String>,

    // Detector keyword lists
    pub keywords_catalogue: Vec<String>,
    pub keywords_courrier: Vec<String>,
    pub keywords_arrete: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            natures_support: strings(&[
                "Phare", "Feu", "Tourelle", "Balise", "Espar", "Bouée", "Panneau",
                "Bouée conique", "Bouée cylindrique", "Bouée sphérique",
                "Bouée charpente", "Bouée fuseau", "Bouée tronconique",
                "Balise à flotteur immergé", "Balise/espar",
                "Coffre d'amarrage", "Éolienne fixe", "Éolienne flottante",
                "Duc d'albe", "AIS virtuel",
            ]),
            marques: strings(&[
                "Latérale tribord", "Latérale bâbord", "Latérale babord",
                "Latéral tribord", "Latéral bâbord", "Latéral babord",
                "Latérale tribord modifiée", "Latérale bâbord modifiée",
                "Cardinale Nord", "Cardinale Est", "Cardinale Sud", "Cardinale Ouest",
                "Danger isolé", "Eaux saines", "Marque spéciale", "Marque d'eaux saines",
                "Feu d'atterrissage", "Feu de jalonnement", "Feu d'alignement",
                "Marque d'alignement", "Feu à secteur",
            ]),
            fonctions: strings(&[
                "Atterrissage", "Jalonnement", "Chenalage", "Alignement",
                "Secteur", "Danger", "Signalisation",
            ]),
            couleurs_feu: strings(&["Blanc", "Vert", "Rouge", "Jaune"]),
            couleurs_marque: strings(&["Rouge", "Vert", "Blanc", "Jaune", "Noir", "Bleu"]),
            rythmes_feu: strings(&[
                "Fl(2+1)", "Fl(2)", "Fl(3)", "Fl(4)", "Fl(5)", "Fl(6)", "LFl", "Fl",
                "Oc(2)", "Oc(3)", "Oc(4)", "Oc",
                "Iso",
                "Q(3)", "Q(6)+LFl", "Q(9)", "Q",
                "VQ(3)", "VQ(6)+LFl", "VQ(9)", "VQ",
            ]),
            types_aide_sonore: strings(&[
                "Cloche", "Sifflet", "Sirène", "Vibrateur", "Corne de brume",
            ]),
            types_voyant: strings(&[
                "Cône", "Cylindre", "Sphère", "Croix de Saint-André", "Triangle", "Rectangle",
            ]),
            departements: strings(&[
                "85", "44", "56", "29", "22", "35", "50", "76", "62", "59",
                "80", "17", "33", "64", "40", "66", "34", "13", "83", "06",
            ]),
            keywords_catalogue: strings(&[
                "prix", "tarif", "kg", "poids", "volume", "matériaux", "eur", "€",
            ]),
            keywords_courrier: strings(&[
                "monsieur", "madame", "objet", "référence", "signé", "affaire suivie",
            ]),
            keywords_arrete: strings(&[
                "arrêté", "préfet", "article", "considérant", "vu le décret",
            ]),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file. An unreadable file is an I/O
    /// error; a file that does not parse is a configuration error.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| crate::error::EngineError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::error::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| crate::error::EngineError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_consistent() {
        let config = EngineConfig::default();
        assert_eq!(config.extraction.confidence_threshold, 0.6);
        assert_eq!(config.extraction.table_size_threshold, 10);
        assert!(config.extraction.anchored_confidence > config.extraction.fallback_confidence);
        assert!(!config.vocabulary.natures_support.is_empty());
        assert!(!config.vocabulary.departements.is_empty());
    }

    #[test]
    fn test_mandatory_fields_weigh_more() {
        let config = ExtractionConfig::default();
        assert!(config.weight("n_sysi") > config.weight("marque"));
        assert!(config.weight("marque") > config.weight("feu_couleur"));
        assert_eq!(config.weight("unknown_field"), config.default_field_weight);
    }

    #[test]
    fn test_config_roundtrip_json() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back.extraction.table_size_threshold,
            config.extraction.table_size_threshold
        );
        assert_eq!(back.vocabulary.marques, config.vocabulary.marques);
    }

    #[test]
    fn test_unparseable_file_is_config_error() {
        let path = std::env::temp_dir().join("navex_config_unparseable_test.json");
        std::fs::write(&path, "{ pas du json").unwrap();
        let err = EngineConfig::from_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, crate::error::EngineError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::path::Path::new("/nonexistent/navex.json");
        let err = EngineConfig::from_file(path).unwrap_err();
        assert!(matches!(err, crate::error::EngineError::Io(_)));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{ "extraction": { "confidence_threshold": 0.75 } }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.extraction.confidence_threshold, 0.75);
        assert_eq!(config.extraction.table_size_threshold, 10);
        assert!(!config.vocabulary.rythmes_feu.is_empty());
    }
}
