//! Strategy selection.
//!
//! A pure, total function of the detected type and the table row count:
//! the same inputs always select the same strategy.

use crate::models::document::{DocumentType, ExtractionStrategy};

/// Select the extraction strategy for a classified document.
///
/// `row_count` only matters for simple tables, which are promoted to
/// partial extraction once they exceed `table_size_threshold` rows.
pub fn select(
    doc_type: DocumentType,
    row_count: usize,
    table_size_threshold: usize,
) -> ExtractionStrategy {
    match doc_type {
        DocumentType::FicheIndividuelle => ExtractionStrategy::ExtractAll,
        DocumentType::TableauSimple => {
            if row_count <= table_size_threshold {
                ExtractionStrategy::ExtractAll
            } else {
                ExtractionStrategy::ExtractPartial
            }
        }
        DocumentType::TableauComplexe => ExtractionStrategy::ExtractPartial,
        DocumentType::ArretePrefectoral | DocumentType::Courrier => {
            ExtractionStrategy::ExtractPartial
        }
        DocumentType::CatalogueProduit | DocumentType::Autre => ExtractionStrategy::MetadataOnly,
    }
}
