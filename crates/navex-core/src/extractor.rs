//! Rule application.
//!
//! The extractor walks the compiled rule table in order and emits one
//! candidate per field, first rule wins. It is pure with respect to the
//! document text: no IO, no clock, no mutation of the table.

use tracing::debug;

use crate::models::aide::BoueeExemple;
use crate::models::document::{DocumentType, ExtractionStrategy};
use crate::rules::{
    patterns, table, FieldCandidate, FieldRule, RuleKind, RuleTable,
};

/// Output of one extraction pass over a document.
#[derive(Debug, Default)]
pub struct Extraction {
    pub candidates: Vec<FieldCandidate>,
    pub exemples: Vec<BoueeExemple>,
    pub warnings: Vec<String>,
}

/// Applies the rule table to document text according to a strategy.
pub struct FieldExtractor<'a> {
    table: &'a RuleTable,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(table: &'a RuleTable) -> Self {
        Self { table }
    }

    pub fn extract(
        &self,
        text: &str,
        doc_type: DocumentType,
        strategy: ExtractionStrategy,
    ) -> Extraction {
        let mut out = Extraction::default();

        match strategy {
            ExtractionStrategy::MetadataOnly => {}
            ExtractionStrategy::ExtractAll => {
                for rule in self.table.rules.iter().filter(|r| r.applies(doc_type)) {
                    self.apply_rule(rule, text, &mut out);
                }
            }
            ExtractionStrategy::ExtractPartial => {
                for rule in self.table.generic_rules() {
                    self.apply_rule(rule, text, &mut out);
                }
                if doc_type.is_tableau() {
                    out.exemples = table::sample_rows(text, &self.table.exemple_bouee);
                    if out.exemples.len() < table::MIN_EXEMPLES {
                        out.warnings.push(format!(
                            "tableau: seulement {} exemple(s) de bouée extraits",
                            out.exemples.len()
                        ));
                    }
                }
            }
        }

        out
    }

    fn apply_rule(&self, rule: &FieldRule, text: &str, out: &mut Extraction) {
        // First rule wins per field.
        if out.candidates.iter().any(|c| c.field == rule.field) {
            return;
        }

        match &rule.kind {
            RuleKind::Pattern { regex, anchor, group } => {
                self.apply_pattern(rule, regex, anchor.as_ref(), *group, text, out);
            }
            RuleKind::Vocabulary { terms, anchor } => {
                self.apply_vocabulary(rule, terms, anchor.as_ref(), text, out);
            }
            RuleKind::VocabularyAll { terms, separator } => {
                let found: Vec<&str> = terms
                    .iter()
                    .filter(|t| t.matcher.is_match(text))
                    .map(|t| t.canonical.as_str())
                    .collect();
                if !found.is_empty() {
                    let value = found.join(separator);
                    out.candidates.push(FieldCandidate::rule(
                        &rule.field,
                        value.clone(),
                        value,
                        self.table.fallback_confidence,
                        &rule.id,
                    ));
                }
            }
            RuleKind::KeywordFlag { keywords } => {
                self.apply_keyword_flag(rule, keywords, text, out);
            }
        }
    }

    fn apply_pattern(
        &self,
        rule: &FieldRule,
        regex: &regex::Regex,
        anchor: Option<&regex::Regex>,
        group: usize,
        text: &str,
        out: &mut Extraction,
    ) {
        // Anchored region first, whole text as fallback.
        if let Some(anchor) = anchor {
            if let Some(m) = anchor.find(text) {
                let region = line_rest(text, m.end());
                if self.push_pattern_match(
                    rule,
                    regex,
                    group,
                    region,
                    self.table.anchored_confidence,
                    out,
                ) {
                    return;
                }
            }
        }

        let confidence = if anchor.is_none() && rule.self_anchored {
            self.table.anchored_confidence
        } else {
            self.table.fallback_confidence
        };
        self.push_pattern_match(rule, regex, group, text, confidence, out);
    }

    /// True when a candidate was pushed.
    fn push_pattern_match(
        &self,
        rule: &FieldRule,
        regex: &regex::Regex,
        group: usize,
        region: &str,
        confidence: f32,
        out: &mut Extraction,
    ) -> bool {
        let mut saw_match = false;
        for caps in regex.captures_iter(region) {
            let Some(m) = caps.get(group) else { continue };
            saw_match = true;
            let raw = m.as_str();
            if let Some(value) = rule.normalizer.apply(raw, &self.table.departements) {
                debug!(field = %rule.field, rule = %rule.id, "champ extrait");
                out.candidates.push(FieldCandidate::rule(
                    &rule.field,
                    raw,
                    value,
                    confidence,
                    &rule.id,
                ));
                return true;
            }
        }
        if saw_match {
            out.warnings.push(format!(
                "valeur non normalisable pour le champ '{}'",
                rule.field
            ));
        }
        false
    }

    fn apply_vocabulary(
        &self,
        rule: &FieldRule,
        terms: &[crate::rules::VocabTerm],
        anchor: Option<&regex::Regex>,
        text: &str,
        out: &mut Extraction,
    ) {
        if let Some(anchor) = anchor {
            if let Some(m) = anchor.find(text) {
                let region = line_rest(text, m.end());
                if let Some(term) = terms.iter().find(|t| t.matcher.is_match(region)) {
                    out.candidates.push(FieldCandidate::rule(
                        &rule.field,
                        term.canonical.clone(),
                        term.canonical.clone(),
                        self.table.anchored_confidence,
                        &rule.id,
                    ));
                    return;
                }
            }
        }

        if let Some(term) = terms.iter().find(|t| t.matcher.is_match(text)) {
            out.candidates.push(FieldCandidate::rule(
                &rule.field,
                term.canonical.clone(),
                term.canonical.clone(),
                self.table.fallback_confidence,
                &rule.id,
            ));
        }
    }

    fn apply_keyword_flag(
        &self,
        rule: &FieldRule,
        keywords: &[String],
        text: &str,
        out: &mut Extraction,
    ) {
        let lower = text.to_lowercase();
        for keyword in keywords {
            let needle = keyword.to_lowercase();
            let Some(idx) = find_word(&lower, &needle) else { continue };

            let context =
                patterns::context_window(&lower, idx, needle.len(), patterns::NEGATION_WINDOW);
            let negated = self
                .table
                .negations
                .iter()
                .any(|n| find_word(context, n).is_some());
            let value = if negated { "false" } else { "true" };

            out.candidates.push(FieldCandidate::rule(
                &rule.field,
                keyword.as_str(),
                value,
                self.table.fallback_confidence,
                &rule.id,
            ));
            return;
        }
    }
}

/// Rest of the line starting at `from`.
fn line_rest(text: &str, from: usize) -> &str {
    let rest = &text[from..];
    match rest.find('\n') {
        Some(end) => &rest[..end],
        None => rest,
    }
}

/// Word-bounded substring search over already-lowercased text.
fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    for (idx, _) in haystack.match_indices(needle) {
        let before_ok = idx == 0
            || haystack[..idx]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric());
        let after = idx + needle.len();
        let after_ok = after >= haystack.len()
            || haystack[after..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return Some(idx);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::config::EngineConfig;
    use crate::rules::fields;

    fn extraction(text: &str, doc_type: DocumentType, strategy: ExtractionStrategy) -> Extraction {
        let table = RuleTable::compile(&EngineConfig::default()).unwrap();
        FieldExtractor::new(&table).extract(text, doc_type, strategy)
    }

    fn candidate<'a>(out: &'a Extraction, field: &str) -> Option<&'a FieldCandidate> {
        out.candidates.iter().find(|c| c.field == field)
    }

    #[test]
    fn test_esm_number_is_anchored() {
        let out = extraction(
            "ESM N° 8500101\nNom de Baptème : LES MOUTONS\n",
            DocumentType::FicheIndividuelle,
            ExtractionStrategy::ExtractAll,
        );
        let sysi = candidate(&out, fields::N_SYSI).unwrap();
        assert_eq!(sysi.value, "8500101");
        assert!(sysi.confidence >= 0.8);
        assert_eq!(sysi.rule_id, "esm");
    }

    #[test]
    fn test_bare_number_needs_department_prefix() {
        // 12 is not a coastal department prefix, 85 is.
        let none = extraction(
            "référence interne 1200042\n",
            DocumentType::FicheIndividuelle,
            ExtractionStrategy::ExtractAll,
        );
        assert!(candidate(&none, fields::N_SYSI).is_none());

        let some = extraction(
            "identifiant 8500042 au large\n",
            DocumentType::FicheIndividuelle,
            ExtractionStrategy::ExtractAll,
        );
        let sysi = candidate(&some, fields::N_SYSI).unwrap();
        assert_eq!(sysi.value, "8500042");
        assert_eq!(sysi.rule_id, "sysi_bare");
        assert!(sysi.confidence < 0.8);
    }

    #[test]
    fn test_first_rule_wins_per_field() {
        let out = extraction(
            "ESM N° 8500101 et SYSSI : 2900042\n",
            DocumentType::FicheIndividuelle,
            ExtractionStrategy::ExtractAll,
        );
        let matches: Vec<_> = out
            .candidates
            .iter()
            .filter(|c| c.field == fields::N_SYSI)
            .collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].value, "8500101");
    }

    #[test]
    fn test_marque_behind_anchor() {
        let out = extraction(
            "Caractère : Cardinale Sud\n",
            DocumentType::FicheIndividuelle,
            ExtractionStrategy::ExtractAll,
        );
        let marque = candidate(&out, fields::MARQUE).unwrap();
        assert_eq!(marque.value, "Cardinale Sud");
        assert!(marque.confidence >= 0.8);
    }

    #[test]
    fn test_position_is_normalized() {
        let out = extraction(
            "Position : 46° 53.546 N  2° 08.997 O\n",
            DocumentType::FicheIndividuelle,
            ExtractionStrategy::ExtractAll,
        );
        let position = candidate(&out, fields::POSITION).unwrap();
        assert_eq!(position.value, "46°53,546' N, 2°08,997' W");
    }

    #[test]
    fn test_keyword_flag_and_negation() {
        let with = extraction(
            "bouée équipée d'un réflecteur radar\n",
            DocumentType::FicheIndividuelle,
            ExtractionStrategy::ExtractAll,
        );
        assert_eq!(
            candidate(&with, fields::REFLECTEUR_RADAR).unwrap().value,
            "true"
        );

        let without = extraction(
            "bouée sans réflecteur radar\n",
            DocumentType::FicheIndividuelle,
            ExtractionStrategy::ExtractAll,
        );
        assert_eq!(
            candidate(&without, fields::REFLECTEUR_RADAR).unwrap().value,
            "false"
        );
    }

    #[test]
    fn test_negation_found_across_wide_context() {
        // "sans" sits 40 bytes before the keyword; it must still negate.
        let out = extraction(
            "bouée sans dispositif lumineux ni équipement réflecteur radar\n",
            DocumentType::FicheIndividuelle,
            ExtractionStrategy::ExtractAll,
        );
        assert_eq!(
            candidate(&out, fields::REFLECTEUR_RADAR).unwrap().value,
            "false"
        );
    }

    #[test]
    fn test_feu_fields() {
        let out = extraction(
            "Feu blanc Fl(2) 6s, portée : 8 M\n",
            DocumentType::FicheIndividuelle,
            ExtractionStrategy::ExtractAll,
        );
        assert_eq!(candidate(&out, fields::FEU_COULEUR).unwrap().value, "Blanc");
        assert_eq!(candidate(&out, fields::FEU_RYTHME).unwrap().value, "Fl(2)");
        assert_eq!(candidate(&out, fields::FEU_PORTEE).unwrap().value, "8");
    }

    #[test]
    fn test_partial_runs_generic_rules_only() {
        let text = "ESM N° 8500101\nMode d'Accès : bateau\n";
        let out = extraction(
            text,
            DocumentType::ArretePrefectoral,
            ExtractionStrategy::ExtractPartial,
        );
        assert!(candidate(&out, fields::N_SYSI).is_some());
        assert!(candidate(&out, fields::MODE_ACCES).is_none());
    }

    #[test]
    fn test_partial_table_samples_rows() {
        let text: String = (1..=12)
            .map(|i| format!("Bouée tribord {}   47°0{},123 N   2°08,997 W\n", i, i % 10))
            .collect();
        let out = extraction(
            &text,
            DocumentType::TableauComplexe,
            ExtractionStrategy::ExtractPartial,
        );
        assert_eq!(out.exemples.len(), table::MAX_EXEMPLES);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_sparse_table_warns() {
        let text = "Bouée tribord 1   47°01,123 N   2°08,997 W\n";
        let out = extraction(
            text,
            DocumentType::TableauComplexe,
            ExtractionStrategy::ExtractPartial,
        );
        assert_eq!(out.exemples.len(), 1);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_metadata_only_extracts_nothing() {
        let out = extraction(
            "ESM N° 8500101 prix 1200 EUR\n",
            DocumentType::CatalogueProduit,
            ExtractionStrategy::MetadataOnly,
        );
        assert!(out.candidates.is_empty());
        assert!(out.exemples.is_empty());
    }

    #[test]
    fn test_mode_acces_restricted_to_fiche() {
        let text = "Mode d'Accès : bateau\n";
        let fiche = extraction(
            text,
            DocumentType::FicheIndividuelle,
            ExtractionStrategy::ExtractAll,
        );
        assert!(candidate(&fiche, fields::MODE_ACCES).is_some());

        let tableau = extraction(
            text,
            DocumentType::TableauSimple,
            ExtractionStrategy::ExtractAll,
        );
        assert!(candidate(&tableau, fields::MODE_ACCES).is_none());
    }
}
