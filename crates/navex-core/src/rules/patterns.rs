//! Fixed internal patterns shared by the detector and the extractor.
//!
//! These are structural helpers, not extraction rules: the field-extraction
//! pattern table itself is configuration data (see `PatternConfig`).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// One `key : value` line, the backbone of an individual fiche.
    pub static ref KEY_VALUE_LINE: Regex =
        Regex::new(r"(?m)^[^:\n]{3,40}\s*:\s*.+$").unwrap();

    /// Numbered decree article ("Article 3").
    pub static ref ARTICLE_NUMBER: Regex = Regex::new(r"(?i)article\s+\d+").unwrap();

    /// Column gap of a whitespace-aligned table row.
    pub static ref COLUMN_GAP: Regex = Regex::new(r"\s{4,}").unwrap();
}

// Label patterns for fiche fields. These follow the fixed layout of the
// source fiches, so they stay compiled-in rather than in the config table.
pub const LABEL_NOM_BAPTEME: &str = r"(?i)Nom de Bapt[èê]me\s*:?\s*([A-ZÀ-Ÿ][^\n]*)";
pub const LABEL_NOM_PATRIMOINE: &str = r"(?i)(?:nom\s+de\s+)?patrimoine\s*:?\s*([A-ZÀ-Ÿ][^\n]*)";
pub const LABEL_NOM_OFFICIEL: &str = r"(?i)nom\s+officiel\s*:?\s*([A-ZÀ-Ÿ][^\n]*)";
pub const LABEL_SYSTEME_GEODESIQUE: &str = r"(?i)Système géodésique\s*:\s*([^\n]+)";
pub const WGS84_DIRECT: &str = r"(?i)\bWGS\s*84\b";
pub const LABEL_HAUTEUR: &str = r"(?i)Hauteur du support\s*:\s*(\d+(?:[.,]\d+)?)\s*m";
pub const LABEL_ALTITUDE: &str = r"(?i)Altitude de la base\s*:\s*(\d+(?:[.,]\d+)?)\s*m";
pub const LABEL_FONCTION: &str = r"(?i)Fonction\s*:\s*([^\n]+)";
pub const LABEL_CLASSEMENT: &str = r"(?i)Classement\s+dominant\s*:\s*([^\n]+)";
pub const LABEL_VALIDITE: &str = r"(?i)Validité\s*:\s*([^\n]+)";
pub const LABEL_MODE_ACCES: &str = r"(?i)Mode d['’]Accès\s*:\s*([^\n]+)";
pub const LABEL_REFERENCE_ARRETE: &str = r"(?i)Arrêté\s+n°?\s*:?\s*([\w\-/]+)";
pub const ANCHOR_CARACTERE: &str = r"(?i)Caractère\s*:";
pub const ZONE_OF: &str = r"(?i)(?:zone|secteur|estuaire|chenal)\s+(?:de|du|d['’])\s*([A-ZÀ-Ÿ][a-zà-ÿ\-\s]+)";
pub const ZONE_BEFORE: &str = r"(?i)([A-ZÀ-Ÿ][a-zà-ÿ\-\s]+)\s+(?:estuaire|chenal|goulet)";
pub const RACON_LETTRE: &str = r"(?i:racon).{0,40}?\b([A-Z])\b";

/// Negation markers checked around a boolean keyword.
pub const NEGATIONS: [&str; 5] = ["non", "sans", "pas", "aucun", "absent"];

/// Context window (in bytes) searched for negations around a keyword.
pub const NEGATION_WINDOW: usize = 50;

/// Context window around a keyword occurrence, clipped to char boundaries.
pub fn context_window(text: &str, index: usize, len: usize, window: usize) -> &str {
    let mut start = index.saturating_sub(window);
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (index + len + window).min(text.len());
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    &text[start..end]
}
