//! Extraction engine orchestration.
//!
//! One engine instance owns the compiled rules and the detector; it is
//! immutable after construction and safe to share. `extract` never
//! escapes an error: any internal fault becomes a `failed` result so a
//! batch is never lost to a single document.

use std::time::Instant;

use tracing::{debug, error, info};

use crate::detector::DocumentTypeDetector;
use crate::error::{EngineError, Result};
use crate::extractor::{Extraction, FieldExtractor};
use crate::merge::{merge, EntityCandidateSource};
use crate::models::aide::{
    AideNavigation, AideSonore, BaliseRacon, BoueeExemple, ExtractionResult, ExtractionStatus,
    Feu,
};
use crate::models::config::EngineConfig;
use crate::models::document::{DocumentRecord, DocumentType, ExtractionStrategy};
use crate::rules::{fields, FieldCandidate, RuleTable};
use crate::{scorer, strategy};

/// Rule-based extraction engine for navigation-aid documents.
pub struct ExtractionEngine {
    config: EngineConfig,
    rules: RuleTable,
    detector: DocumentTypeDetector,
    entity_source: Option<Box<dyn EntityCandidateSource>>,
}

impl ExtractionEngine {
    /// Build an engine from configuration, compiling every pattern up
    /// front.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let rules = RuleTable::compile(&config)?;
        let detector = DocumentTypeDetector::new(&config)?;
        Ok(Self {
            config,
            rules,
            detector,
            entity_source: None,
        })
    }

    /// Attach a secondary candidate source (entity recognition).
    pub fn with_entity_source(mut self, source: Box<dyn EntityCandidateSource>) -> Self {
        self.entity_source = Some(source);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full pipeline on one document.
    ///
    /// Never panics and never returns an error: faults are folded into a
    /// `failed` result carrying the document identity.
    pub fn extract(&self, document: &DocumentRecord) -> ExtractionResult {
        let started = Instant::now();
        let result = match self.run_pipeline(document) {
            Ok(result) => result,
            Err(e) => {
                error!(document = %document.nom_fichier, error = %e, "extraction échouée");
                ExtractionResult::failed(document, e.to_string())
            }
        };
        info!(
            document = %document.nom_fichier,
            status = %result.status,
            confidence = result.confidence,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "document traité"
        );
        result
    }

    /// Process documents sequentially with per-document isolation; one
    /// faulty document never aborts the batch.
    pub fn extract_batch(
        &self,
        documents: &[DocumentRecord],
        limit: Option<usize>,
    ) -> Vec<ExtractionResult> {
        let take = limit.unwrap_or(documents.len());
        documents
            .iter()
            .take(take)
            .map(|doc| self.extract(doc))
            .collect()
    }

    fn run_pipeline(&self, document: &DocumentRecord) -> Result<ExtractionResult> {
        if document.texte.trim().is_empty() {
            return Err(EngineError::DocumentUnavailable(format!(
                "document '{}' sans texte exploitable",
                document.nom_fichier
            )));
        }

        let (doc_type, row_count) = self.detector.detect(&document.texte);
        let strategy = strategy::select(
            doc_type,
            row_count,
            self.config.extraction.table_size_threshold,
        );
        debug!(doc_type = %doc_type, strategy = %strategy, row_count, "stratégie choisie");

        let extractor = FieldExtractor::new(&self.rules);
        let Extraction {
            candidates,
            exemples,
            mut warnings,
        } = extractor.extract(&document.texte, doc_type, strategy);

        let mut methods_used = Vec::new();
        match strategy {
            ExtractionStrategy::ExtractAll => methods_used.push("full_rules_extraction".into()),
            ExtractionStrategy::ExtractPartial => {
                methods_used.push("generic_patterns".into());
                if doc_type.is_tableau() {
                    methods_used.push("table_sampling".into());
                }
            }
            ExtractionStrategy::MetadataOnly => methods_used.push("metadata_only".into()),
        }

        let candidates = match (&self.entity_source, strategy) {
            (Some(source), ExtractionStrategy::ExtractAll | ExtractionStrategy::ExtractPartial) => {
                let extra = source.candidates(&document.texte);
                if !extra.is_empty() {
                    methods_used.push("nlp_extraction".into());
                }
                merge(candidates, extra, &mut warnings)
            }
            _ => candidates,
        };

        let (confidence, mut status) = scorer::score(&candidates, &self.config.extraction);

        // Partial extraction never claims a self-standing record.
        if strategy == ExtractionStrategy::ExtractPartial && status == ExtractionStatus::Success {
            status = ExtractionStatus::Partial;
        }
        if strategy == ExtractionStrategy::MetadataOnly {
            status = ExtractionStatus::Skipped;
        }

        let aide = build_aide(&candidates, exemples);

        let nombre_aides = match doc_type {
            DocumentType::FicheIndividuelle | DocumentType::ArretePrefectoral => 1,
            DocumentType::TableauSimple | DocumentType::TableauComplexe => row_count as u32,
            _ => 0,
        };

        let voir_document_original = strategy != ExtractionStrategy::ExtractAll;
        let raison_reference_originale =
            reference_reason(doc_type, strategy, row_count);

        Ok(ExtractionResult {
            document_id: document.id.clone(),
            nom_fichier: document.nom_fichier.clone(),
            type_document: doc_type,
            strategy,
            status,
            confidence,
            methods_used,
            warnings,
            voir_document_original,
            raison_reference_originale,
            nombre_aides,
            aide,
        })
    }
}

fn reference_reason(
    doc_type: DocumentType,
    strategy: ExtractionStrategy,
    row_count: usize,
) -> Option<String> {
    match strategy {
        ExtractionStrategy::ExtractAll => None,
        ExtractionStrategy::MetadataOnly => Some(format!(
            "Document de type '{}' - non pertinent pour l'extraction",
            doc_type
        )),
        ExtractionStrategy::ExtractPartial => Some(match doc_type {
            DocumentType::TableauComplexe | DocumentType::TableauSimple => format!(
                "Tableau complexe avec {} entrées - consulter l'original pour la liste complète",
                row_count
            ),
            _ => format!(
                "Document de type '{}' - extraction partielle, consulter l'original",
                doc_type
            ),
        }),
    }
}

/// Assemble the structured record from field candidates. Unparseable
/// typed values are dropped silently; the raw candidate list already
/// went through normalization.
fn build_aide(candidates: &[FieldCandidate], exemples: Vec<BoueeExemple>) -> AideNavigation {
    let mut aide = AideNavigation {
        exemples_bouees: exemples,
        ..Default::default()
    };

    let mut feu = Feu::default();
    let mut racon_present: Option<bool> = None;
    let mut racon_lettre: Option<String> = None;

    for c in candidates {
        if c.value.is_empty() {
            continue;
        }
        let value = c.value.clone();
        match c.field.as_str() {
            f if f == fields::N_SYSI => aide.n_sysi = Some(value),
            f if f == fields::NOM_PATRIMOINE => aide.nom_patrimoine = Some(value),
            f if f == fields::NOM_BAPTEME => aide.nom_bapteme = Some(value),
            f if f == fields::POSITION => aide.position = Some(value),
            f if f == fields::SYSTEME_GEODESIQUE => aide.systeme_geodesique = Some(value),
            f if f == fields::ZONE => aide.zone = Some(value),
            f if f == fields::NATURE_SUPPORT => aide.nature_support = Some(value),
            f if f == fields::HAUTEUR_SUPPORT => aide.hauteur_support = value.parse().ok(),
            f if f == fields::ALTITUDE_BASE => aide.altitude_base = value.parse().ok(),
            f if f == fields::MARQUE => aide.marque = Some(value),
            f if f == fields::FONCTION => aide.fonction = Some(value),
            f if f == fields::CLASSEMENT => aide.classement = Some(value),
            f if f == fields::VALIDITE => aide.validite = Some(value),
            f if f == fields::MARQUE_JOUR => aide.marque_jour = Some(value),
            f if f == fields::VOYANT => aide.voyant = parse_bool(&value),
            f if f == fields::REFLECTEUR_RADAR => aide.reflecteur_radar = parse_bool(&value),
            f if f == fields::FEU_COULEUR => feu.couleur = Some(value),
            f if f == fields::FEU_RYTHME => feu.rythme = Some(value),
            f if f == fields::FEU_PORTEE => feu.portee = value.parse().ok(),
            f if f == fields::AIDE_SONORE => aide.aide_sonore = Some(AideSonore { r#type: value }),
            f if f == fields::AIS_ATON => aide.ais_aton = parse_bool(&value),
            f if f == fields::RACON_PRESENT => racon_present = parse_bool(&value),
            f if f == fields::RACON_LETTRE => racon_lettre = Some(value),
            f if f == fields::MODE_ACCES => aide.mode_acces = Some(value),
            f if f == fields::DATE_DECISION => {
                aide.date_decision =
                    chrono::NaiveDate::parse_from_str(&value, "%Y-%m-%d").ok();
            }
            f if f == fields::REFERENCE_ARRETE => aide.reference_arrete = Some(value),
            _ => {}
        }
    }

    if !feu.is_empty() {
        aide.feu = Some(feu);
    }
    if racon_present == Some(true) || racon_lettre.is_some() {
        aide.balise_racon = Some(BaliseRacon {
            present: true,
            lettre_morse: racon_lettre,
        });
    } else if racon_present == Some(false) {
        aide.balise_racon = Some(BaliseRacon {
            present: false,
            lettre_morse: None,
        });
    }

    aide
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
