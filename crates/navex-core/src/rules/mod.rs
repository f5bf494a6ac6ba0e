//! Declarative field-extraction rules.
//!
//! Rules are data: each [`FieldRule`] names its field, carries a matching
//! kind (regex pattern, vocabulary lookup or boolean keyword flag), an
//! applicability filter, a normalizer and its confidence class. The table
//! is compiled once from [`EngineConfig`] and shared read-only across
//! extraction calls. Rules for the same field are ordered; the first one
//! that yields a candidate wins.

pub mod patterns;
pub mod position;
pub mod table;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::models::config::EngineConfig;
use crate::models::document::DocumentType;

/// Field names used throughout the pipeline (candidates, weights, merge).
pub mod fields {
    pub const N_SYSI: &str = "n_sysi";
    pub const NOM_PATRIMOINE: &str = "nom_patrimoine";
    pub const NOM_BAPTEME: &str = "nom_bapteme";
    pub const POSITION: &str = "position";
    pub const SYSTEME_GEODESIQUE: &str = "systeme_geodesique";
    pub const ZONE: &str = "zone";
    pub const NATURE_SUPPORT: &str = "nature_support";
    pub const HAUTEUR_SUPPORT: &str = "hauteur_support";
    pub const ALTITUDE_BASE: &str = "altitude_base";
    pub const MARQUE: &str = "marque";
    pub const FONCTION: &str = "fonction";
    pub const CLASSEMENT: &str = "classement";
    pub const VALIDITE: &str = "validite";
    pub const MARQUE_JOUR: &str = "marque_jour";
    pub const VOYANT: &str = "voyant";
    pub const REFLECTEUR_RADAR: &str = "reflecteur_radar";
    pub const FEU_COULEUR: &str = "feu_couleur";
    pub const FEU_RYTHME: &str = "feu_rythme";
    pub const FEU_PORTEE: &str = "feu_portee";
    pub const AIDE_SONORE: &str = "aide_sonore";
    pub const AIS_ATON: &str = "ais_aton";
    pub const RACON_PRESENT: &str = "racon_present";
    pub const RACON_LETTRE: &str = "racon_lettre";
    pub const MODE_ACCES: &str = "mode_acces";
    pub const DATE_DECISION: &str = "date_decision";
    pub const REFERENCE_ARRETE: &str = "reference_arrete";

    /// Fields a record must carry to count as a usable navigation aid.
    pub const MANDATORY: [&str; 4] = [N_SYSI, NOM_BAPTEME, POSITION, NATURE_SUPPORT];
}

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Rule,
    Nlp,
}

/// One extracted field value with its provenance and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCandidate {
    pub field: String,
    /// Raw matched text.
    pub raw: String,
    /// Normalized value; never empty in a final record.
    pub value: String,
    /// Confidence in [0, 1].
    pub confidence: f32,
    pub source: CandidateSource,
    /// Identifier of the rule (or external source) that produced it.
    pub rule_id: String,
}

impl FieldCandidate {
    pub fn rule(
        field: &str,
        raw: impl Into<String>,
        value: impl Into<String>,
        confidence: f32,
        rule_id: &str,
    ) -> Self {
        Self {
            field: field.to_string(),
            raw: raw.into(),
            value: value.into(),
            confidence: confidence.clamp(0.0, 1.0),
            source: CandidateSource::Rule,
            rule_id: rule_id.to_string(),
        }
    }

    pub fn nlp(
        field: &str,
        raw: impl Into<String>,
        value: impl Into<String>,
        confidence: f32,
        source_name: &str,
    ) -> Self {
        Self {
            field: field.to_string(),
            raw: raw.into(),
            value: value.into(),
            confidence: confidence.clamp(0.0, 1.0),
            source: CandidateSource::Nlp,
            rule_id: source_name.to_string(),
        }
    }
}

/// A vocabulary term with its precompiled word-bounded matcher.
#[derive(Debug, Clone)]
pub struct VocabTerm {
    pub canonical: String,
    pub matcher: Regex,
}

/// Matching behavior of a rule.
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Regex over the text; `group` selects the captured value.
    Pattern {
        regex: Regex,
        /// Optional anchor searched first; a match after the anchor gets
        /// the anchored confidence, otherwise the whole text is searched
        /// at fallback confidence.
        anchor: Option<Regex>,
        group: usize,
    },
    /// First vocabulary term found wins (terms ordered longest first).
    Vocabulary {
        terms: Vec<VocabTerm>,
        anchor: Option<Regex>,
    },
    /// Every matching term, joined in configuration order.
    VocabularyAll {
        terms: Vec<VocabTerm>,
        separator: String,
    },
    /// Boolean field: keyword presence, negated by context markers.
    KeywordFlag { keywords: Vec<String> },
}

/// Post-match normalization applied to the raw value.
#[derive(Debug, Clone)]
pub enum Normalizer {
    /// Trim surrounding whitespace.
    Trim,
    /// Keep ASCII digits only.
    Digits,
    /// Decimal number, comma accepted as separator.
    Decimal,
    /// Uppercase the value.
    Uppercase,
    /// Numeric date to ISO `YYYY-MM-DD`.
    Date,
    /// Degrees-minutes coordinates to canonical form.
    Position,
    /// Digits, accepted only with a known department prefix.
    SysiPrefix,
    /// Map to the canonical casing of one of the given terms.
    Canonical(Vec<String>),
}

impl Normalizer {
    /// Normalize a raw match. `None` means the match is unusable and the
    /// rule should try the next occurrence (or give up with a warning).
    pub fn apply(&self, raw: &str, departements: &[String]) -> Option<String> {
        match self {
            Normalizer::Trim => {
                let v = raw.trim();
                (!v.is_empty()).then(|| v.to_string())
            }
            Normalizer::Digits => {
                let v: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
                (!v.is_empty()).then_some(v)
            }
            Normalizer::Decimal => {
                let v = raw.trim().replace(',', ".");
                v.parse::<f64>().ok().map(|n| n.to_string())
            }
            Normalizer::Uppercase => {
                let v = raw.trim().to_uppercase();
                (!v.is_empty()).then_some(v)
            }
            Normalizer::Date => normalize_date(raw),
            Normalizer::Position => position::normalize(raw),
            Normalizer::SysiPrefix => {
                let v: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
                departements
                    .iter()
                    .any(|d| v.starts_with(d.as_str()))
                    .then_some(v)
            }
            Normalizer::Canonical(terms) => {
                let key = collapse(raw);
                terms.iter().find(|t| collapse(t) == key).cloned()
            }
        }
    }
}

fn collapse(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect()
}

fn normalize_date(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw.trim().split(['/', '-']).collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let mut year: i32 = parts[2].parse().ok()?;
    if year < 100 {
        // Two-digit year: 00-50 are 2000s, 51-99 are 1900s.
        year += if year <= 50 { 2000 } else { 1900 };
    }
    chrono::NaiveDate::from_ymd_opt(year, month, day).map(|d| d.format("%Y-%m-%d").to_string())
}

/// One declarative extraction rule.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub id: String,
    pub field: String,
    pub kind: RuleKind,
    /// Document types this rule applies to under `extract_all`;
    /// `None` means all types.
    pub applies_to: Option<Vec<DocumentType>>,
    /// Part of the generic subset that runs under `extract_partial`.
    pub generic: bool,
    /// A pattern with its anchor baked in (e.g. `ESM N° ...`) counts as
    /// anchored even without a separate anchor regex.
    pub self_anchored: bool,
    pub normalizer: Normalizer,
}

impl FieldRule {
    pub fn applies(&self, doc_type: DocumentType) -> bool {
        match &self.applies_to {
            None => true,
            Some(types) => types.contains(&doc_type),
        }
    }
}

/// Immutable compiled rule set, shared across concurrent extractions.
#[derive(Debug, Clone)]
pub struct RuleTable {
    pub rules: Vec<FieldRule>,
    /// Coordinate-bearing row pattern (row counting).
    pub table_row: Regex,
    /// Full buoy row pattern (example sampling).
    pub exemple_bouee: Regex,
    pub anchored_confidence: f32,
    pub fallback_confidence: f32,
    pub departements: Vec<String>,
    /// Negation markers for boolean keyword rules.
    pub negations: Vec<String>,
}

impl RuleTable {
    /// Compile the rule table from configuration. A malformed pattern is a
    /// configuration error; nothing is compiled lazily afterwards.
    pub fn compile(config: &EngineConfig) -> Result<Self> {
        let p = &config.patterns;
        let v = &config.vocabulary;

        let mut rules = Vec::new();

        // Identification
        rules.push(FieldRule {
            id: "esm".into(),
            field: fields::N_SYSI.into(),
            kind: pattern_kind("esm", &p.esm, None, 1)?,
            applies_to: None,
            generic: true,
            self_anchored: true,
            normalizer: Normalizer::Digits,
        });
        rules.push(FieldRule {
            id: "syssi_label".into(),
            field: fields::N_SYSI.into(),
            kind: pattern_kind("syssi", &p.syssi, None, 1)?,
            applies_to: None,
            generic: true,
            self_anchored: true,
            normalizer: Normalizer::Digits,
        });
        rules.push(FieldRule {
            id: "sysi_bare".into(),
            field: fields::N_SYSI.into(),
            kind: pattern_kind("n_sysi", &p.n_sysi, None, 0)?,
            applies_to: None,
            generic: true,
            self_anchored: false,
            normalizer: Normalizer::SysiPrefix,
        });
        rules.push(FieldRule {
            id: "nom_bapteme".into(),
            field: fields::NOM_BAPTEME.into(),
            kind: pattern_kind("nom_bapteme", patterns::LABEL_NOM_BAPTEME, None, 1)?,
            applies_to: None,
            generic: false,
            self_anchored: true,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "patrimoine_label".into(),
            field: fields::NOM_PATRIMOINE.into(),
            kind: pattern_kind("nom_patrimoine", patterns::LABEL_NOM_PATRIMOINE, None, 1)?,
            applies_to: None,
            generic: false,
            self_anchored: true,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "nom_officiel".into(),
            field: fields::NOM_PATRIMOINE.into(),
            kind: pattern_kind("nom_officiel", patterns::LABEL_NOM_OFFICIEL, None, 1)?,
            applies_to: None,
            generic: false,
            self_anchored: true,
            normalizer: Normalizer::Trim,
        });

        // Localisation
        rules.push(FieldRule {
            id: "position_dms".into(),
            field: fields::POSITION.into(),
            kind: pattern_kind("position_coords", &p.position_coords, None, 0)?,
            applies_to: None,
            generic: true,
            self_anchored: true,
            normalizer: Normalizer::Position,
        });
        rules.push(FieldRule {
            id: "position_decimal".into(),
            field: fields::POSITION.into(),
            kind: pattern_kind("position_decimal", &p.position_decimal, None, 0)?,
            applies_to: None,
            generic: true,
            self_anchored: false,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "geodesique_label".into(),
            field: fields::SYSTEME_GEODESIQUE.into(),
            kind: pattern_kind(
                "systeme_geodesique",
                patterns::LABEL_SYSTEME_GEODESIQUE,
                None,
                1,
            )?,
            applies_to: None,
            generic: false,
            self_anchored: true,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "wgs84_direct".into(),
            field: fields::SYSTEME_GEODESIQUE.into(),
            kind: pattern_kind("wgs84", patterns::WGS84_DIRECT, None, 0)?,
            applies_to: None,
            generic: false,
            self_anchored: false,
            normalizer: Normalizer::Canonical(vec!["WGS 84".to_string()]),
        });
        rules.push(FieldRule {
            id: "zone_of".into(),
            field: fields::ZONE.into(),
            kind: pattern_kind("zone_of", patterns::ZONE_OF, None, 1)?,
            applies_to: None,
            generic: false,
            self_anchored: false,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "zone_before".into(),
            field: fields::ZONE.into(),
            kind: pattern_kind("zone_before", patterns::ZONE_BEFORE, None, 1)?,
            applies_to: None,
            generic: false,
            self_anchored: false,
            normalizer: Normalizer::Trim,
        });

        // Support
        rules.push(FieldRule {
            id: "nature_support".into(),
            field: fields::NATURE_SUPPORT.into(),
            kind: RuleKind::Vocabulary {
                terms: vocab_terms(&v.natures_support)?,
                anchor: None,
            },
            applies_to: None,
            generic: true,
            self_anchored: false,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "hauteur_support".into(),
            field: fields::HAUTEUR_SUPPORT.into(),
            kind: pattern_kind("hauteur_support", patterns::LABEL_HAUTEUR, None, 1)?,
            applies_to: None,
            generic: false,
            self_anchored: true,
            normalizer: Normalizer::Decimal,
        });
        rules.push(FieldRule {
            id: "altitude_base".into(),
            field: fields::ALTITUDE_BASE.into(),
            kind: pattern_kind("altitude_base", patterns::LABEL_ALTITUDE, None, 1)?,
            applies_to: None,
            generic: false,
            self_anchored: true,
            normalizer: Normalizer::Decimal,
        });

        // Signalisation
        rules.push(FieldRule {
            id: "marque".into(),
            field: fields::MARQUE.into(),
            kind: RuleKind::Vocabulary {
                terms: vocab_terms(&v.marques)?,
                anchor: Some(compile("anchor_caractere", patterns::ANCHOR_CARACTERE)?),
            },
            applies_to: None,
            generic: true,
            self_anchored: false,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "fonction_label".into(),
            field: fields::FONCTION.into(),
            kind: pattern_kind("fonction", patterns::LABEL_FONCTION, None, 1)?,
            applies_to: None,
            generic: false,
            self_anchored: true,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "fonction_vocab".into(),
            field: fields::FONCTION.into(),
            kind: RuleKind::Vocabulary {
                terms: vocab_terms(&v.fonctions)?,
                anchor: None,
            },
            applies_to: None,
            generic: false,
            self_anchored: false,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "classement".into(),
            field: fields::CLASSEMENT.into(),
            kind: pattern_kind("classement", patterns::LABEL_CLASSEMENT, None, 1)?,
            applies_to: None,
            generic: false,
            self_anchored: true,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "validite".into(),
            field: fields::VALIDITE.into(),
            kind: pattern_kind("validite", patterns::LABEL_VALIDITE, None, 1)?,
            applies_to: None,
            generic: false,
            self_anchored: true,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "marque_jour".into(),
            field: fields::MARQUE_JOUR.into(),
            kind: RuleKind::VocabularyAll {
                terms: vocab_terms_in_config_order(&v.couleurs_marque)?,
                separator: "/".to_string(),
            },
            applies_to: None,
            generic: false,
            self_anchored: false,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "voyant".into(),
            field: fields::VOYANT.into(),
            kind: RuleKind::KeywordFlag {
                keywords: {
                    let mut k = v.types_voyant.clone();
                    k.push("voyant".to_string());
                    k
                },
            },
            applies_to: None,
            generic: false,
            self_anchored: false,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "reflecteur_radar".into(),
            field: fields::REFLECTEUR_RADAR.into(),
            kind: RuleKind::KeywordFlag {
                keywords: vec![
                    "réflecteur radar".to_string(),
                    "reflecteur radar".to_string(),
                ],
            },
            applies_to: None,
            generic: false,
            self_anchored: false,
            normalizer: Normalizer::Trim,
        });

        // Feu
        rules.push(FieldRule {
            id: "feu_couleur".into(),
            field: fields::FEU_COULEUR.into(),
            kind: pattern_kind("feu_couleur", &feu_couleur_pattern(&v.couleurs_feu), None, 1)?,
            applies_to: None,
            generic: false,
            self_anchored: true,
            normalizer: Normalizer::Canonical(v.couleurs_feu.clone()),
        });
        rules.push(FieldRule {
            id: "feu_rythme".into(),
            field: fields::FEU_RYTHME.into(),
            kind: RuleKind::Vocabulary {
                terms: vocab_terms(&v.rythmes_feu)?,
                anchor: None,
            },
            applies_to: None,
            generic: false,
            self_anchored: false,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "feu_portee".into(),
            field: fields::FEU_PORTEE.into(),
            kind: pattern_kind("portee", &p.portee, None, 1)?,
            applies_to: None,
            generic: false,
            self_anchored: true,
            normalizer: Normalizer::Digits,
        });

        // Aide sonore
        rules.push(FieldRule {
            id: "aide_sonore".into(),
            field: fields::AIDE_SONORE.into(),
            kind: RuleKind::Vocabulary {
                terms: vocab_terms(&v.types_aide_sonore)?,
                anchor: None,
            },
            applies_to: None,
            generic: false,
            self_anchored: false,
            normalizer: Normalizer::Trim,
        });

        // Électronique
        rules.push(FieldRule {
            id: "ais_aton".into(),
            field: fields::AIS_ATON.into(),
            kind: RuleKind::KeywordFlag {
                keywords: vec![
                    "ais aton".to_string(),
                    "ais".to_string(),
                    "aton".to_string(),
                ],
            },
            applies_to: None,
            generic: false,
            self_anchored: false,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "racon_present".into(),
            field: fields::RACON_PRESENT.into(),
            kind: RuleKind::KeywordFlag {
                keywords: vec!["balise racon".to_string(), "racon".to_string()],
            },
            applies_to: None,
            generic: false,
            self_anchored: false,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "racon_lettre".into(),
            field: fields::RACON_LETTRE.into(),
            kind: pattern_kind("racon_lettre", patterns::RACON_LETTRE, None, 1)?,
            applies_to: None,
            generic: false,
            self_anchored: true,
            normalizer: Normalizer::Uppercase,
        });

        // Accès, dates et références
        rules.push(FieldRule {
            id: "mode_acces".into(),
            field: fields::MODE_ACCES.into(),
            kind: pattern_kind("mode_acces", patterns::LABEL_MODE_ACCES, None, 1)?,
            applies_to: Some(vec![DocumentType::FicheIndividuelle]),
            generic: false,
            self_anchored: true,
            normalizer: Normalizer::Trim,
        });
        rules.push(FieldRule {
            id: "date_decision".into(),
            field: fields::DATE_DECISION.into(),
            kind: pattern_kind("date", &p.date, None, 0)?,
            applies_to: None,
            generic: true,
            self_anchored: false,
            normalizer: Normalizer::Date,
        });
        rules.push(FieldRule {
            id: "reference_arrete".into(),
            field: fields::REFERENCE_ARRETE.into(),
            kind: pattern_kind(
                "reference_arrete",
                patterns::LABEL_REFERENCE_ARRETE,
                None,
                1,
            )?,
            applies_to: Some(vec![
                DocumentType::FicheIndividuelle,
                DocumentType::ArretePrefectoral,
            ]),
            generic: false,
            self_anchored: true,
            normalizer: Normalizer::Trim,
        });

        Ok(Self {
            rules,
            table_row: compile("table_row", &p.table_row)?,
            exemple_bouee: compile("exemple_bouee", &p.exemple_bouee)?,
            anchored_confidence: config.extraction.anchored_confidence,
            fallback_confidence: config.extraction.fallback_confidence,
            departements: v.departements.clone(),
            negations: patterns::NEGATIONS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Rules of the generic subset (identifier, position, nature, marque,
    /// date) that run under `extract_partial`.
    pub fn generic_rules(&self) -> impl Iterator<Item = &FieldRule> {
        self.rules.iter().filter(|r| r.generic)
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| EngineError::Pattern {
        name: name.to_string(),
        source,
    })
}

fn pattern_kind(name: &str, pattern: &str, anchor: Option<Regex>, group: usize) -> Result<RuleKind> {
    Ok(RuleKind::Pattern {
        regex: compile(name, pattern)?,
        anchor,
        group,
    })
}

/// Word-bounded case-insensitive matcher for one vocabulary term.
fn vocab_matcher(term: &str) -> Result<Regex> {
    let mut pattern = String::from("(?i)");
    if term.chars().next().is_some_and(|c| c.is_alphanumeric()) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(term));
    if term.chars().last().is_some_and(|c| c.is_alphanumeric()) {
        pattern.push_str(r"\b");
    }
    compile(term, &pattern)
}

/// Compile vocabulary terms, longest first so the most specific term wins
/// ("Bouée conique" before "Bouée").
fn vocab_terms(terms: &[String]) -> Result<Vec<VocabTerm>> {
    let mut compiled = vocab_terms_in_config_order(terms)?;
    compiled.sort_by(|a, b| {
        b.canonical
            .chars()
            .count()
            .cmp(&a.canonical.chars().count())
            .then_with(|| a.canonical.cmp(&b.canonical))
    });
    Ok(compiled)
}

fn vocab_terms_in_config_order(terms: &[String]) -> Result<Vec<VocabTerm>> {
    terms
        .iter()
        .map(|t| {
            Ok(VocabTerm {
                canonical: t.clone(),
                matcher: vocab_matcher(t)?,
            })
        })
        .collect()
}

fn feu_couleur_pattern(couleurs: &[String]) -> String {
    let alternatives: Vec<String> = couleurs
        .iter()
        .map(|c| regex::escape(&c.to_lowercase()))
        .collect();
    format!(r"(?i)\bfeu\s+({})\b", alternatives.join("|"))
}
