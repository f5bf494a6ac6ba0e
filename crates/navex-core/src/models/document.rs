//! Source document model and classification enums.

use serde::{Deserialize, Serialize};

/// A source document handed to the engine by the acquisition collaborator.
///
/// The engine never reads files or performs OCR itself; `texte` is the
/// already-acquired raw text, immutable once handed over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Stable identifier assigned by the acquisition layer.
    pub id: String,

    /// Original file name, kept on every result for traceability.
    pub nom_fichier: String,

    /// Raw document text.
    pub texte: String,

    /// Optional format hint (e.g. "txt", "pdf_ocr").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_hint: Option<String>,
}

impl DocumentRecord {
    /// Build a record from raw text, using the file name as identifier.
    pub fn from_text(nom_fichier: impl Into<String>, texte: impl Into<String>) -> Self {
        let nom_fichier = nom_fichier.into();
        Self {
            id: nom_fichier.clone(),
            nom_fichier,
            texte: texte.into(),
            format_hint: None,
        }
    }
}

/// Type of source document, derived by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Individual navigation-aid fiche (key:value layout, ESM/SYSSI anchor).
    FicheIndividuelle,
    /// Small structured table of aids.
    TableauSimple,
    /// Large structured table of aids.
    TableauComplexe,
    /// Prefectoral decree.
    ArretePrefectoral,
    /// Administrative letter.
    Courrier,
    /// Supplier product catalogue, irrelevant for extraction.
    CatalogueProduit,
    /// Anything else.
    Autre,
}

impl DocumentType {
    /// Snake-case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::FicheIndividuelle => "fiche_individuelle",
            DocumentType::TableauSimple => "tableau_simple",
            DocumentType::TableauComplexe => "tableau_complexe",
            DocumentType::ArretePrefectoral => "arrete_prefectoral",
            DocumentType::Courrier => "courrier",
            DocumentType::CatalogueProduit => "catalogue_produit",
            DocumentType::Autre => "autre",
        }
    }

    /// True for the two tabular types.
    pub fn is_tableau(&self) -> bool {
        matches!(self, DocumentType::TableauSimple | DocumentType::TableauComplexe)
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much of the document the extractor attempts to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Run every applicable rule against the full text.
    ExtractAll,
    /// Generic rules plus table-row sampling; the original document
    /// remains the reference.
    ExtractPartial,
    /// Record the document, extract nothing.
    MetadataOnly,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::ExtractAll => "extract_all",
            ExtractionStrategy::ExtractPartial => "extract_partial",
            ExtractionStrategy::MetadataOnly => "metadata_only",
        }
    }
}

impl std::fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
