//! Row-level sub-extraction for table documents.
//!
//! Large tables are never extracted in full; the engine samples the first
//! qualifying rows (at most 5) so the record carries a few concrete
//! examples and points back to the original document for the rest.

use regex::Regex;

use crate::models::aide::BoueeExemple;
use crate::rules::position;

/// Maximum number of sampled rows.
pub const MAX_EXEMPLES: usize = 5;

/// Minimum number of rows a complex table is expected to yield.
pub const MIN_EXEMPLES: usize = 3;

/// Scan the text for buoy/beacon rows and build one example per row,
/// stopping after [`MAX_EXEMPLES`]. Fewer qualifying rows than requested
/// simply yields a shorter list.
pub fn sample_rows(text: &str, row: &Regex) -> Vec<BoueeExemple> {
    let mut exemples = Vec::new();

    for caps in row.captures_iter(text) {
        let kind = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let side = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let numero = caps.get(3).map(|m| m.as_str().to_string());
        let lat = caps.get(4).map(|m| m.as_str()).unwrap_or("");
        let lon = caps.get(5).map(|m| m.as_str()).unwrap_or("");

        let raw_position = format!("{}, {}", lat.trim(), lon.trim());
        let position = position::normalize(&raw_position).unwrap_or(raw_position);

        let nom = match &numero {
            Some(n) => format!("{} {} {}", kind, side, n),
            None => format!("{} {}", kind, side),
        };

        exemples.push(BoueeExemple {
            nom: nom.trim().to_string(),
            marque: format!("Latérale {}", side),
            position,
            numero,
        });

        if exemples.len() >= MAX_EXEMPLES {
            break;
        }
    }

    exemples
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::config::PatternConfig;

    fn row_regex() -> Regex {
        Regex::new(&PatternConfig::default().exemple_bouee).unwrap()
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
    fn test_sampling_caps_at_five() {
        let text = table_text(42);
        let exemples = sample_rows(&text, &row_regex());
        assert_eq!(exemples.len(), MAX_EXEMPLES);
        assert_eq!(exemples[0].nom, "Bouée bâbord 1");
        assert_eq!(exemples[0].marque, "Latérale bâbord");
        assert_eq!(exemples[0].numero.as_deref(), Some("1"));
    }

    #[test]
    fn test_sampling_keeps_what_it_finds() {
        let text = table_text(2);
        let exemples = sample_rows(&text, &row_regex());
        assert_eq!(exemples.len(), 2);
    }

    #[test]
    fn test_positions_are_normalized() {
        let text = "Balise tribord 7   48°22,150 N   4°30,000 O\n";
        let exemples = sample_rows(text, &row_regex());
        assert_eq!(exemples.len(), 1);
        assert_eq!(exemples[0].position, "48°22,150' N, 4°30,000' W");
    }
}
