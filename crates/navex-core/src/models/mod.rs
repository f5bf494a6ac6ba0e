//! Data models: documents, navigation aids, results and configuration.

pub mod aide;
pub mod config;
pub mod document;

pub use aide::{
    AideNavigation, AideSonore, BaliseRacon, BoueeExemple, ExtractionResult, ExtractionStatus,
    Feu,
};
pub use config::{EngineConfig, ExtractionConfig, PatternConfig, VocabularyConfig};
pub use document::{DocumentRecord, DocumentType, ExtractionStrategy};
