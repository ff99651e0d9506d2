//! Two-assessment skill comparison.
//!
//! A pure function over two documents and a selected tab: no I/O, no state,
//! no failure modes. Sparse or malformed input degrades to "absent" rather
//! than erroring, because historical assessments are routinely incomplete.

use super::skills::{SkillEntry, SkillGroupId, SkillSections, SkillTab};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One row of the comparison table: a skill present in either document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillComparisonRow {
    /// Stable flattened key, `tab.category.skillName`.
    pub key: String,
    /// Raw skill name, untransformed.
    pub label: String,
    /// Entry in the earlier document, if present.
    pub earlier: Option<SkillEntry>,
    /// Entry in the later document, if present.
    pub later: Option<SkillEntry>,
    /// rank(later) - rank(earlier); positive means improvement.
    pub diff: i32,
}

/// Comparison output: ordered rows plus the improvement tally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillComparison {
    pub rows: Vec<SkillComparisonRow>,
    pub improved: i64,
    pub declined: i64,
    pub unchanged: i64,
}

impl SkillComparison {
    fn empty() -> Self {
        Self {
            rows: Vec::new(),
            improved: 0,
            declined: 0,
            unchanged: 0,
        }
    }
}

/// Flatten one tab of a document into `(key, label, entry)` triples.
///
/// Groups are scanned in the fixed catalog order, entries within a group in
/// the group's own deterministic order. Entries with neither rating nor
/// comment are dropped here, not merely defaulted. If two groups of the same
/// tab share a (category, name) pair the first-seen entry wins.
fn flatten_tab(sections: &SkillSections, tab: SkillTab) -> Vec<(String, String, SkillEntry)> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut flat = Vec::new();

    for group in SkillGroupId::for_tab(tab) {
        for (name, entry) in sections.group(group) {
            if entry.is_empty() {
                continue;
            }
            let key = format!("{}.{}.{}", tab.as_str(), group.category(), name);
            if seen.insert(key.clone()) {
                flat.push((key, name.clone(), entry.clone()));
            }
        }
    }

    flat
}

/// Compare two assessment documents over one tab.
///
/// Rows are the union of skills present on either side, in first-seen order
/// from the earlier-then-later scan; a side missing a skill compares at rank
/// 0. Repeated calls with the same inputs yield identical output, and neither
/// input is modified.
pub fn compare(earlier: &SkillSections, later: &SkillSections, tab: SkillTab) -> SkillComparison {
    let earlier_flat = flatten_tab(earlier, tab);
    let later_flat = flatten_tab(later, tab);

    if earlier_flat.is_empty() && later_flat.is_empty() {
        return SkillComparison::empty();
    }

    let earlier_map: HashMap<&str, &SkillEntry> = earlier_flat
        .iter()
        .map(|(k, _, e)| (k.as_str(), e))
        .collect();
    let later_map: HashMap<&str, &SkillEntry> = later_flat
        .iter()
        .map(|(k, _, e)| (k.as_str(), e))
        .collect();

    // Union of keys, first-seen order across the earlier-then-later scan.
    let mut ordered_keys: Vec<(&str, &str)> = Vec::new();
    let mut in_union: HashSet<&str> = HashSet::new();
    for (key, label, _) in earlier_flat.iter().chain(later_flat.iter()) {
        if in_union.insert(key.as_str()) {
            ordered_keys.push((key.as_str(), label.as_str()));
        }
    }

    let mut rows = Vec::with_capacity(ordered_keys.len());
    let (mut improved, mut declined, mut unchanged) = (0i64, 0i64, 0i64);

    for (key, label) in ordered_keys {
        let earlier_entry = earlier_map.get(key).map(|e| (*e).clone());
        let later_entry = later_map.get(key).map(|e| (*e).clone());

        let earlier_rank = earlier_entry.as_ref().map_or(0, SkillEntry::rank);
        let later_rank = later_entry.as_ref().map_or(0, SkillEntry::rank);
        let diff = later_rank - earlier_rank;

        if diff > 0 {
            improved += 1;
        } else if diff < 0 {
            declined += 1;
        } else {
            unchanged += 1;
        }

        rows.push(SkillComparisonRow {
            key: key.to_string(),
            label: label.to_string(),
            earlier: earlier_entry,
            later: later_entry,
            diff,
        });
    }

    SkillComparison {
        rows,
        improved,
        declined,
        unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::assessment::skills::SkillEntry;

    fn with_batting_basic(name: &str, rating: Option<&str>, comment: Option<&str>) -> SkillSections {
        SkillSections::default().with_skill(
            SkillGroupId::CricketBattingBasics,
            name,
            SkillEntry::new(rating, comment),
        )
    }

    #[test]
    fn empty_documents_compare_to_empty_result() {
        let result = compare(
            &SkillSections::default(),
            &SkillSections::default(),
            SkillTab::Cricket,
        );
        assert!(result.rows.is_empty());
        assert_eq!(result.improved, 0);
        assert_eq!(result.declined, 0);
        assert_eq!(result.unchanged, 0);
    }

    #[test]
    fn grip_improvement_yields_one_improved_row() {
        let earlier = with_batting_basic("Grip", Some("DEVELOPING"), None);
        let later = with_batting_basic("Grip", Some("GOOD"), None);

        let result = compare(&earlier, &later, SkillTab::Cricket);

        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.key, "cricket.basics.Grip");
        assert_eq!(row.label, "Grip");
        assert_eq!(row.diff, 1); // 3 - 2
        assert_eq!(result.improved, 1);
        assert_eq!(result.declined, 0);
        assert_eq!(result.unchanged, 0);
    }

    #[test]
    fn skill_dropped_in_later_document_counts_as_declined() {
        let earlier = with_batting_basic("Footwork", Some("EXCELLENT"), None);
        let later = SkillSections::default();

        let result = compare(&earlier, &later, SkillTab::Cricket);

        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert!(row.later.is_none());
        assert_eq!(row.diff, -4); // 0 - 4
        assert_eq!(result.declined, 1);
        assert_eq!(result.improved, 0);
        assert_eq!(result.unchanged, 0);
    }

    #[test]
    fn comment_only_entries_compare_as_unchanged() {
        let earlier = with_batting_basic("Grip", None, Some("thumb position off"));
        let later = with_batting_basic("Grip", None, Some("thumb position off"));

        let result = compare(&earlier, &later, SkillTab::Cricket);

        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.diff, 0);
        assert_eq!(row.earlier.as_ref().unwrap().rank(), 0);
        assert_eq!(row.later.as_ref().unwrap().rank(), 0);
        assert_eq!(result.unchanged, 1);
    }

    #[test]
    fn unrecognized_rating_strings_rank_zero() {
        let earlier = with_batting_basic("Grip", Some("LEGENDARY"), None);
        let later = with_batting_basic("Grip", Some("GOOD"), None);

        let result = compare(&earlier, &later, SkillTab::Cricket);

        assert_eq!(result.rows[0].diff, 3); // 3 - 0
        assert_eq!(result.improved, 1);
    }

    #[test]
    fn compare_is_idempotent() {
        let earlier = with_batting_basic("Grip", Some("DEVELOPING"), None)
            .with_skill(
                SkillGroupId::CricketBowlingBasics,
                "Run Up",
                SkillEntry::new(Some("GOOD"), None),
            );
        let later = with_batting_basic("Grip", Some("EXCELLENT"), Some("much better"));

        let first = compare(&earlier, &later, SkillTab::Cricket);
        let second = compare(&earlier, &later, SkillTab::Cricket);
        assert_eq!(first, second);
    }

    #[test]
    fn swapping_sides_negates_diffs_and_swaps_tallies() {
        let a = with_batting_basic("Grip", Some("DEVELOPING"), None)
            .with_skill(
                SkillGroupId::CricketBattingBasics,
                "Stance",
                SkillEntry::new(Some("GOOD"), None),
            )
            .with_skill(
                SkillGroupId::MentalDiscipline,
                "Punctuality",
                SkillEntry::new(Some("GOOD"), None),
            );
        let b = with_batting_basic("Grip", Some("EXCELLENT"), None)
            .with_skill(
                SkillGroupId::CricketBattingBasics,
                "Stance",
                SkillEntry::new(Some("NEEDS_WORK"), None),
            );

        let forward = compare(&a, &b, SkillTab::Cricket);
        let backward = compare(&b, &a, SkillTab::Cricket);

        assert_eq!(forward.improved, backward.declined);
        assert_eq!(forward.declined, backward.improved);
        assert_eq!(forward.unchanged, backward.unchanged);

        for row in &forward.rows {
            let mirrored = backward
                .rows
                .iter()
                .find(|r| r.key == row.key)
                .expect("row missing after swap");
            assert_eq!(mirrored.diff, -row.diff);
        }
    }

    #[test]
    fn rows_only_cover_the_selected_tab() {
        let earlier = with_batting_basic("Grip", Some("GOOD"), None).with_skill(
            SkillGroupId::MentalDiscipline,
            "Punctuality",
            SkillEntry::new(Some("NEEDS_WORK"), None),
        );
        let later = earlier.clone();

        let cricket = compare(&earlier, &later, SkillTab::Cricket);
        assert_eq!(cricket.rows.len(), 1);
        assert!(cricket.rows[0].key.starts_with("cricket."));

        let mental = compare(&earlier, &later, SkillTab::Mental);
        assert_eq!(mental.rows.len(), 1);
        assert_eq!(mental.rows[0].key, "mental.discipline.Punctuality");
    }

    #[test]
    fn union_preserves_first_seen_order_earlier_then_later() {
        let earlier = SkillSections::default()
            .with_skill(
                SkillGroupId::CricketBattingBasics,
                "Grip",
                SkillEntry::new(Some("GOOD"), None),
            )
            .with_skill(
                SkillGroupId::CricketBattingBasics,
                "Stance",
                SkillEntry::new(Some("GOOD"), None),
            );
        let later = SkillSections::default()
            .with_skill(
                SkillGroupId::CricketBattingBasics,
                "Backlift",
                SkillEntry::new(Some("GOOD"), None),
            )
            .with_skill(
                SkillGroupId::CricketBattingBasics,
                "Grip",
                SkillEntry::new(Some("GOOD"), None),
            );

        let result = compare(&earlier, &later, SkillTab::Cricket);
        let keys: Vec<&str> = result.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "cricket.basics.Grip",
                "cricket.basics.Stance",
                "cricket.basics.Backlift",
            ]
        );
        assert_eq!(result.unchanged, 2);
        // Backlift is new on the later side: rank 0 -> 3
        assert_eq!(result.improved, 1);
    }

    #[test]
    fn all_ranks_stay_in_bounds() {
        let ratings = [
            Some("NEEDS_WORK"),
            Some("DEVELOPING"),
            Some("GOOD"),
            Some("EXCELLENT"),
            Some("???"),
            None,
        ];
        for rating in ratings {
            let doc = with_batting_basic("Grip", rating, Some("x"));
            let result = compare(&doc, &SkillSections::default(), SkillTab::Cricket);
            let rank = result.rows[0].earlier.as_ref().unwrap().rank();
            assert!((0..=4).contains(&rank));
        }
    }

    #[test]
    fn missing_subtree_behaves_as_empty_mapping() {
        // A document that never touched fitness compares cleanly on that tab.
        let earlier: SkillSections = serde_json::from_str("{}").unwrap();
        let later = SkillSections::default().with_skill(
            SkillGroupId::FitnessEndurance,
            "Aerobic Capacity",
            SkillEntry::new(Some("DEVELOPING"), None),
        );

        let result = compare(&earlier, &later, SkillTab::Fitness);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].key, "fitness.endurance.Aerobic Capacity");
        assert_eq!(result.rows[0].diff, 2);
        assert_eq!(result.improved, 1);
    }
}
