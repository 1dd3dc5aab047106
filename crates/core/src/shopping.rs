//! Shopping list aggregation and rendering.
//!
//! A shopping list merges the ingredient lines of every recipe in a user's
//! cart. Lines are keyed by `(normalized name, measurement unit)`; amounts
//! under the same key are summed. The result is ordered by that key, so the
//! same cart always produces the same list.
//!
//! Both functions here are pure. Fetching the lines is the caller's job.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::Amount;

/// One ingredient line of one recipe, as read from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: Amount,
}

/// One merged row of a shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: u64,
}

/// Title-case every word of an ingredient name.
///
/// A letter is upper-cased when it starts the string or follows a
/// non-letter, and lower-cased otherwise.
///
/// ```
/// use pantry_core::shopping::normalize_name;
///
/// assert_eq!(normalize_name("brown SUGAR"), "Brown Sugar");
/// assert_eq!(normalize_name("half-and-half"), "Half-And-Half");
/// ```
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Merge ingredient lines into a sorted shopping list.
///
/// Input order does not matter. An empty input yields an empty list.
#[must_use]
pub fn aggregate<I>(lines: I) -> Vec<AggregatedLine>
where
    I: IntoIterator<Item = IngredientLine>,
{
    let mut totals: BTreeMap<(String, String), u64> = BTreeMap::new();
    for line in lines {
        let amount = u64::from(line.amount.get().unsigned_abs());
        *totals
            .entry((normalize_name(&line.name), line.measurement_unit))
            .or_default() += amount;
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), amount)| AggregatedLine {
            name,
            measurement_unit,
            amount,
        })
        .collect()
}

/// Render a shopping list as a UTF-8 text document.
///
/// The first line carries the date (`DD.MM.YYYY`); each following line is
/// `"{index}. {name} ({unit}) — {amount}"` with a 1-based index. Lines are
/// separated by `\n` with no trailing newline.
#[must_use]
pub fn render_text(lines: &[AggregatedLine], as_of: NaiveDate) -> Vec<u8> {
    let mut doc = format!("Shopping list for {}", as_of.format("%d.%m.%Y"));
    for (index, line) in lines.iter().enumerate() {
        doc.push('\n');
        doc.push_str(&format!(
            "{}. {} ({}) — {}",
            index + 1,
            line.name,
            line.measurement_unit,
            line.amount
        ));
    }
    doc.into_bytes()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i64) -> IngredientLine {
        IngredientLine {
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
            amount: Amount::new(amount).unwrap(),
        }
    }

    fn agg(name: &str, unit: &str, amount: u64) -> AggregatedLine {
        AggregatedLine {
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
            amount,
        }
    }

    #[test]
    fn test_merges_same_ingredient_across_recipes() {
        let cart = vec![
            line("Flour", "g", 200),
            line("Salt", "g", 5),
            line("Flour", "g", 100),
            line("Sugar", "g", 50),
        ];

        assert_eq!(
            aggregate(cart),
            vec![agg("Flour", "g", 300), agg("Salt", "g", 5), agg("Sugar", "g", 50)]
        );
    }

    #[test]
    fn test_empty_input_gives_empty_list() {
        assert!(aggregate(Vec::new()).is_empty());
    }

    #[test]
    fn test_output_sorted_regardless_of_input_order() {
        let forward = aggregate(vec![line("milk", "ml", 1), line("eggs", "pcs", 2)]);
        let backward = aggregate(vec![line("eggs", "pcs", 2), line("milk", "ml", 1)]);

        assert_eq!(forward, backward);
        assert_eq!(forward.first().unwrap().name, "Eggs");
    }

    #[test]
    fn test_name_case_is_normalized_before_merging() {
        let merged = aggregate(vec![line("olive oil", "ml", 10), line("OLIVE OIL", "ml", 15)]);
        assert_eq!(merged, vec![agg("Olive Oil", "ml", 25)]);
    }

    #[test]
    fn test_different_units_stay_separate() {
        let merged = aggregate(vec![line("Butter", "g", 50), line("Butter", "tbsp", 2)]);
        assert_eq!(merged, vec![agg("Butter", "g", 50), agg("Butter", "tbsp", 2)]);
    }

    #[test]
    fn test_sum_does_not_overflow_small_amounts() {
        let merged = aggregate(vec![line("Rice", "g", 32_767), line("rice", "g", 32_767)]);
        assert_eq!(merged, vec![agg("Rice", "g", 65_534)]);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("salt"), "Salt");
        assert_eq!(normalize_name("  two  words "), "  Two  Words ");
        assert_eq!(normalize_name("сливочное масло"), "Сливочное Масло");
        assert_eq!(normalize_name("7up"), "7Up");
    }

    #[test]
    fn test_render_text_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let doc = render_text(&[agg("Flour", "g", 300), agg("Salt", "g", 5)], date);

        assert_eq!(
            String::from_utf8(doc).unwrap(),
            "Shopping list for 09.03.2024\n1. Flour (g) — 300\n2. Salt (g) — 5"
        );
    }

    #[test]
    fn test_render_empty_list_is_header_only() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(render_text(&[], date), b"Shopping list for 31.12.2024".to_vec());
    }

    #[test]
    fn test_render_is_deterministic() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let lines = aggregate(vec![line("b", "g", 1), line("a", "g", 2)]);
        assert_eq!(render_text(&lines, date), render_text(&lines, date));
    }
}
