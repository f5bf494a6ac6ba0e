//! Document-type detection.
//!
//! Classification is purely structural and lexical: anchor identifiers,
//! key:value density, coordinate-bearing lines and keyword scores. The
//! detector never fails; a document it cannot place lands in `Autre`.

use regex::Regex;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::config::EngineConfig;
use crate::models::document::DocumentType;
use crate::rules::patterns;

/// Fiche field labels that identify the individual-fiche layout even in
/// long documents.
const FICHE_FIELD_KEYWORDS: [&str; 6] = [
    "nom de baptème",
    "nom de baptême",
    "mode d'accès",
    "caractère",
    "fonction",
    "système géodésique",
];

/// Minimum key:value lines for the fiche layout.
const MIN_KEY_VALUE_LINES: usize = 3;

/// Minimum coordinate-bearing lines for the table layout.
const MIN_GPS_LINES: usize = 5;

/// Minimum whitespace-aligned lines for the table layout.
const MIN_ALIGNED_LINES: usize = 10;

/// Classifies a document from its raw text.
pub struct DocumentTypeDetector {
    esm: Regex,
    syssi: Regex,
    table_row: Regex,
    keywords_catalogue: Vec<String>,
    keywords_courrier: Vec<String>,
    keywords_arrete: Vec<String>,
    table_size_threshold: usize,
}

impl DocumentTypeDetector {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            esm: compile("esm", &config.patterns.esm)?,
            syssi: compile("syssi", &config.patterns.syssi)?,
            table_row: compile("table_row", &config.patterns.table_row)?,
            keywords_catalogue: lowercase(&config.vocabulary.keywords_catalogue),
            keywords_courrier: lowercase(&config.vocabulary.keywords_courrier),
            keywords_arrete: lowercase(&config.vocabulary.keywords_arrete),
            table_size_threshold: config.extraction.table_size_threshold,
        })
    }

    /// Classify the text. Returns the type and, for tables, the estimated
    /// row count (zero for non-tabular documents).
    ///
    /// Checks run in priority order: a document with an ESM anchor and a
    /// key:value layout is a fiche even if it also contains decree
    /// keywords.
    pub fn detect(&self, text: &str) -> (DocumentType, usize) {
        let lower = text.to_lowercase();

        if self.is_fiche(text, &lower) {
            info!(doc_type = %DocumentType::FicheIndividuelle, "document classé");
            return (DocumentType::FicheIndividuelle, 0);
        }

        if self.is_catalogue(text, &lower) {
            info!(doc_type = %DocumentType::CatalogueProduit, "document classé");
            return (DocumentType::CatalogueProduit, 0);
        }

        if let Some(row_count) = self.table_rows(text) {
            let doc_type = if row_count > self.table_size_threshold {
                DocumentType::TableauComplexe
            } else {
                DocumentType::TableauSimple
            };
            info!(doc_type = %doc_type, row_count, "document classé");
            return (doc_type, row_count);
        }

        if self.is_arrete(&lower) {
            info!(doc_type = %DocumentType::ArretePrefectoral, "document classé");
            return (DocumentType::ArretePrefectoral, 0);
        }

        if self.is_courrier(&lower) {
            info!(doc_type = %DocumentType::Courrier, "document classé");
            return (DocumentType::Courrier, 0);
        }

        info!(doc_type = %DocumentType::Autre, "document classé");
        (DocumentType::Autre, 0)
    }

    fn is_fiche(&self, text: &str, lower: &str) -> bool {
        let has_anchor = self.esm.is_match(text) || self.syssi.is_match(text);
        if !has_anchor {
            return false;
        }
        let key_value_lines = patterns::KEY_VALUE_LINE.find_iter(text).count();
        if key_value_lines < MIN_KEY_VALUE_LINES {
            return false;
        }
        // A fiche is short, or carries its typical field labels.
        let line_count = text.lines().count();
        let has_fiche_fields = FICHE_FIELD_KEYWORDS.iter().any(|k| lower.contains(k));
        line_count < 50 || has_fiche_fields
    }

    fn is_catalogue(&self, text: &str, lower: &str) -> bool {
        if self.esm.is_match(text) {
            return false;
        }
        let score = keyword_score(lower, &self.keywords_catalogue);
        debug!(score, "score catalogue");
        score >= 3
    }

    /// Row count when the text looks tabular, `None` otherwise.
    ///
    /// Qualification and counting are separate: column-aligned lines can
    /// qualify the layout, but coordinate-bearing lines are the reliable
    /// row count whenever any exist.
    fn table_rows(&self, text: &str) -> Option<usize> {
        let gps_lines = text
            .lines()
            .filter(|l| self.table_row.is_match(l))
            .count();
        let aligned_lines = text
            .lines()
            .filter(|l| l.len() > 10 && patterns::COLUMN_GAP.is_match(l))
            .count();

        if gps_lines < MIN_GPS_LINES && aligned_lines < MIN_ALIGNED_LINES {
            return None;
        }
        if gps_lines > 0 {
            Some(gps_lines)
        } else {
            Some(aligned_lines)
        }
    }

    fn is_arrete(&self, lower: &str) -> bool {
        keyword_score(lower, &self.keywords_arrete) >= 2
            || patterns::ARTICLE_NUMBER.is_match(lower)
    }

    fn is_courrier(&self, lower: &str) -> bool {
        keyword_score(lower, &self.keywords_courrier) >= 2
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| crate::error::EngineError::Pattern {
        name: name.to_string(),
        source,
    })
}

fn lowercase(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

fn keyword_score(lower: &str, keywords: &[String]) -> usize {
    keywords.iter().filter(|k| lower.contains(k.as_str())).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> DocumentTypeDetector {
        DocumentTypeDetector::new(&EngineConfig::default()).unwrap()
    }

    fn table_text(rows: usize) -> String {
        (1..=rows)
            .map(|i| {
                format!(
                    "Bouée bâbord {}    47°{:02},123 N    2°08,997 W\n",
                    i,
                    i % 60
                )
            })
            .collect()
    }

    #[test]
    fn test_detects_fiche() {
        let text = "ESM N° 8500101\n\
                    Nom de Baptème : LES MOUTONS\n\
                    Caractère : Cardinale Sud\n\
                    Fonction : Danger\n\
                    Position : 46°53,546' N, 2°08,997' W\n";
        let (doc_type, rows) = detector().detect(text);
        assert_eq!(doc_type, DocumentType::FicheIndividuelle);
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_fiche_wins_over_arrete_keywords() {
        let text = "Arrêté préfectoral - Article 1\n\
                    ESM N° 8500101\n\
                    Nom de Baptème : LES MOUTONS\n\
                    Caractère : Cardinale Sud\n\
                    Fonction : Danger\n";
        let (doc_type, _) = detector().detect(text);
        assert_eq!(doc_type, DocumentType::FicheIndividuelle);
    }

    #[test]
    fn test_detects_simple_and_complex_tables() {
        let (simple, rows_simple) = detector().detect(&table_text(7));
        assert_eq!(simple, DocumentType::TableauSimple);
        assert_eq!(rows_simple, 7);

        let (complexe, rows_complexe) = detector().detect(&table_text(42));
        assert_eq!(complexe, DocumentType::TableauComplexe);
        assert_eq!(rows_complexe, 42);
    }

    #[test]
    fn test_mixed_table_counts_coordinate_rows() {
        // Two coordinate rows among twelve aligned descriptive rows: the
        // coordinate rows are the aid count, not the aligned-line total.
        let mut text = String::new();
        for i in 1..=2 {
            text.push_str(&format!(
                "Bouée tribord {}    47°0{},123 N    2°08,997 W\n",
                i, i
            ));
        }
        for i in 3..=14 {
            text.push_str(&format!(
                "Bouée tribord {}    chenal nord    acier galvanisé\n",
                i
            ));
        }

        let (doc_type, rows) = detector().detect(&text);
        assert_eq!(doc_type, DocumentType::TableauSimple);
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_detects_catalogue() {
        let text = "Catalogue fournisseur\n\
                    Bouée conique - prix : 1200 EUR\n\
                    Poids : 350 kg, volume : 2 m3\n\
                    Matériaux : polyéthylène\n";
        let (doc_type, _) = detector().detect(text);
        assert_eq!(doc_type, DocumentType::CatalogueProduit);
    }

    #[test]
    fn test_esm_blocks_catalogue() {
        let text = "ESM N° 8500101\nprix : 1200 EUR\npoids : 350 kg\nvolume : 2 m3\n";
        let (doc_type, _) = detector().detect(text);
        assert_ne!(doc_type, DocumentType::CatalogueProduit);
    }

    #[test]
    fn test_detects_arrete() {
        let text = "Le préfet maritime,\nVu le décret du 3 mai,\nConsidérant...\nArticle 1 : ...\n";
        let (doc_type, _) = detector().detect(text);
        assert_eq!(doc_type, DocumentType::ArretePrefectoral);
    }

    #[test]
    fn test_detects_courrier() {
        let text = "Monsieur le directeur,\nObjet : balisage du chenal\nAffaire suivie par...\n";
        let (doc_type, _) = detector().detect(text);
        assert_eq!(doc_type, DocumentType::Courrier);
    }

    #[test]
    fn test_unclassifiable_is_autre() {
        let (doc_type, rows) = detector().detect("rien d'utile ici");
        assert_eq!(doc_type, DocumentType::Autre);
        assert_eq!(rows, 0);
    }
}
