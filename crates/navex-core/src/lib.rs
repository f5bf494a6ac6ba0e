//! Core library for maritime navigation-aid extraction.
//!
//! This crate provides:
//! - Document-type detection (fiche, tableau, arrêté, courrier, catalogue)
//! - Strategy selection (full, partial or metadata-only extraction)
//! - Rule-based field extraction with per-field confidence
//! - Multi-source candidate merging and confidence scoring
//! - Batch orchestration with per-document fault isolation

pub mod detector;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod merge;
pub mod models;
pub mod rules;
pub mod scorer;
pub mod strategy;

pub use detector::DocumentTypeDetector;
pub use engine::ExtractionEngine;
pub use error::{EngineError, Result};
pub use extractor::{Extraction, FieldExtractor};
pub use merge::{EntityCandidateSource, NoopEntitySource};
pub use models::aide::{
    AideNavigation, BoueeExemple, ExtractionResult, ExtractionStatus,
};
pub use models::config::EngineConfig;
pub use models::document::{DocumentRecord, DocumentType, ExtractionStrategy};
pub use rules::{CandidateSource, FieldCandidate, RuleTable};
