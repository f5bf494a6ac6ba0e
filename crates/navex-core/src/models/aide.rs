//! Navigation-aid data models and the extraction result envelope.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::document::{DocumentRecord, DocumentType, ExtractionStrategy};

/// Light characteristics of an aid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feu {
    /// Light colour (Blanc, Vert, Rouge, Jaune).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub couleur: Option<String>,

    /// Rhythm in list-of-lights notation (Fl, Oc(2), Iso, Q, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rythme: Option<String>,

    /// Nominal range in nautical miles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portee: Option<u32>,
}

impl Feu {
    pub fn is_empty(&self) -> bool {
        self.couleur.is_none() && self.rythme.is_none() && self.portee.is_none()
    }
}

/// Sound signal carried by the aid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AideSonore {
    /// Signal type (Cloche, Sifflet, Sirène, ...).
    pub r#type: String,
}

/// Radar transponder beacon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaliseRacon {
    pub present: bool,

    /// Morse identification letter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lettre_morse: Option<String>,
}

/// One sampled row from a table document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoueeExemple {
    pub nom: String,
    pub marque: String,
    pub position: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero: Option<String>,
}

/// Structured navigation-aid record assembled from field candidates.
///
/// Mandatory fields are `n_sysi`, `nom_bapteme`, `position` and
/// `nature_support`; everything else is best effort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AideNavigation {
    // Identification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_sysi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom_patrimoine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom_bapteme: Option<String>,

    // Localisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systeme_geodesique: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,

    // Support
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nature_support: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hauteur_support: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_base: Option<f64>,

    // Signalisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marque: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fonction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marque_jour: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voyant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflecteur_radar: Option<bool>,

    // Feu
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feu: Option<Feu>,

    // Aide sonore
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aide_sonore: Option<AideSonore>,

    // Électronique
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ais_aton: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balise_racon: Option<BaliseRacon>,

    // Accès, dates et références
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_acces: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_decision: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_arrete: Option<String>,

    /// Sampled rows for partially extracted tables, capped to 5.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exemples_bouees: Vec<BoueeExemple>,
}

impl AideNavigation {
    /// True when no field at all was extracted.
    pub fn is_empty(&self) -> bool {
        *self == AideNavigation::default()
    }

    /// True when at least one mandatory field is filled.
    pub fn has_mandatory_field(&self) -> bool {
        self.n_sysi.is_some()
            || self.nom_bapteme.is_some()
            || self.position.is_some()
            || self.nature_support.is_some()
    }
}

/// Terminal state of one extraction call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// Confidence above threshold with at least one mandatory field.
    Success,
    /// Some fields extracted, original document remains the reference.
    Partial,
    /// Nothing to extract (irrelevant or unclassifiable document).
    Skipped,
    /// An internal fault was caught at the engine boundary.
    Failed,
}

impl ExtractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Success => "success",
            ExtractionStatus::Partial => "partial",
            ExtractionStatus::Skipped => "skipped",
            ExtractionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one extraction call.
///
/// Carries no wall-clock data: identical `(text, config)` inputs serialize
/// to byte-identical results. Timing is reported through `tracing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub document_id: String,
    pub nom_fichier: String,

    pub type_document: DocumentType,
    pub strategy: ExtractionStrategy,
    pub status: ExtractionStatus,

    /// Overall confidence, clamped to [0, 1].
    pub confidence: f32,

    /// Pipeline stages that contributed to the result.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods_used: Vec<String>,

    /// Warnings collected from every stage, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// The extracted record does not stand on its own; consult the source.
    pub voir_document_original: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raison_reference_originale: Option<String>,

    /// Estimated number of aids described by the document.
    pub nombre_aides: u32,

    pub aide: AideNavigation,
}

impl ExtractionResult {
    /// Result for a document the pipeline could not process at all.
    pub fn failed(document: &DocumentRecord, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            document_id: document.id.clone(),
            nom_fichier: document.nom_fichier.clone(),
            type_document: DocumentType::Autre,
            strategy: ExtractionStrategy::MetadataOnly,
            status: ExtractionStatus::Failed,
            confidence: 0.0,
            methods_used: Vec::new(),
            warnings: vec![message.clone()],
            voir_document_original: true,
            raison_reference_originale: Some(message),
            nombre_aides: 0,
            aide: AideNavigation::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_aide() {
        let aide = AideNavigation::default();
        assert!(aide.is_empty());
        assert!(!aide.has_mandatory_field());

        let aide = AideNavigation {
            position: Some("46°53,546' N, 2°08,997' W".to_string()),
            ..Default::default()
        };
        assert!(!aide.is_empty());
        assert!(aide.has_mandatory_field());
    }

    #[test]
    fn test_failed_result_keeps_identity() {
        let doc = DocumentRecord::from_text("epave.txt", "");
        let result = ExtractionResult::failed(&doc, "document unavailable: no text");

        assert_eq!(result.status, ExtractionStatus::Failed);
        assert_eq!(result.nom_fichier, "epave.txt");
        assert!(result.voir_document_original);
        assert!(result.raison_reference_originale.is_some());
        assert!(result.aide.is_empty());
    }

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&ExtractionStatus::Skipped).unwrap();
        assert_eq!(json, "\"skipped\"");
    }
}
