use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered rating scale used for individual skills and the overall grade.
///
/// The ordinal rank drives the comparison engine: an unset rating sits below
/// all four levels (rank 0) and is distinct from every explicit rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RatingValue {
    NeedsWork,
    Developing,
    Good,
    Excellent,
}

impl RatingValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingValue::NeedsWork => "NEEDS_WORK",
            RatingValue::Developing => "DEVELOPING",
            RatingValue::Good => "GOOD",
            RatingValue::Excellent => "EXCELLENT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "NEEDS_WORK" => Some(RatingValue::NeedsWork),
            "DEVELOPING" => Some(RatingValue::Developing),
            "GOOD" => Some(RatingValue::Good),
            "EXCELLENT" => Some(RatingValue::Excellent),
            _ => None,
        }
    }

    /// Ordinal rank 1-4. Rank 0 is reserved for "no rating".
    pub fn rank(&self) -> i32 {
        match self {
            RatingValue::NeedsWork => 1,
            RatingValue::Developing => 2,
            RatingValue::Good => 3,
            RatingValue::Excellent => 4,
        }
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rank of a raw rating string. Unrecognized or missing values rank 0 so that
/// partially populated or legacy documents compare instead of failing.
pub fn rating_rank(rating: Option<&str>) -> i32 {
    rating
        .and_then(RatingValue::from_str)
        .map(|r| r.rank())
        .unwrap_or(0)
}

/// The leaf unit of an assessment: an optional grade plus free-text comment.
///
/// Ratings are stored as raw strings and parsed on demand, so documents
/// written by older clients never fail to load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl SkillEntry {
    pub fn new(rating: Option<&str>, comment: Option<&str>) -> Self {
        Self {
            rating: rating.map(|s| s.to_string()),
            comment: comment.map(|s| s.to_string()),
        }
    }

    /// An entry with neither a rating nor a comment is equivalent to absent.
    pub fn is_empty(&self) -> bool {
        self.rating.as_deref().map_or(true, str::is_empty)
            && self.comment.as_deref().map_or(true, str::is_empty)
    }

    pub fn parsed_rating(&self) -> Option<RatingValue> {
        self.rating.as_deref().and_then(RatingValue::from_str)
    }

    /// Ordinal rank 0-4 of this entry's rating.
    pub fn rank(&self) -> i32 {
        rating_rank(self.rating.as_deref())
    }
}

/// Named skills within one (domain, tier) group.
pub type SkillGroup = BTreeMap<String, SkillEntry>;

/// Basics / intermediate / advanced tiers of one cricket domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TieredSkills {
    #[serde(default)]
    pub basics: SkillGroup,
    #[serde(default)]
    pub intermediate: SkillGroup,
    #[serde(default)]
    pub advanced: SkillGroup,
}

/// Cricket skill subtree: batting, bowling and wicket-keeping domains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CricketSkills {
    #[serde(default)]
    pub batting: TieredSkills,
    #[serde(default)]
    pub bowling: TieredSkills,
    #[serde(default)]
    pub wicket_keeping: TieredSkills,
    /// Only meaningful for all-rounders; cleared for every other role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_priority: Option<bool>,
}

/// Fielding subtree: drills common to everyone plus keeping-specific work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldingSkills {
    #[serde(default)]
    pub common: SkillGroup,
    #[serde(default)]
    pub wicket_keeping: SkillGroup,
}

/// Height/weight measurements with the derived BMI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    /// Derived from height and weight, never entered directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
}

impl BodyMetrics {
    /// Copy of these metrics with `bmi` recomputed from height and weight.
    pub fn with_derived_bmi(&self) -> Self {
        Self {
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            bmi: compute_bmi(self.height_cm, self.weight_kg),
        }
    }
}

/// weight(kg) / height(m)^2, rounded to one decimal place.
/// Absent unless both inputs are present and positive.
pub fn compute_bmi(height_cm: Option<f64>, weight_kg: Option<f64>) -> Option<f64> {
    match (height_cm, weight_kg) {
        (Some(h), Some(w)) if h > 0.0 && w > 0.0 && h.is_finite() && w.is_finite() => {
            let meters = h / 100.0;
            let bmi = w / (meters * meters);
            Some((bmi * 10.0).round() / 10.0)
        }
        _ => None,
    }
}

/// Fitness subtree: category skill groups plus body metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessSection {
    #[serde(default)]
    pub endurance: SkillGroup,
    #[serde(default)]
    pub speed_agility: SkillGroup,
    #[serde(default)]
    pub strength: SkillGroup,
    #[serde(default)]
    pub flexibility: SkillGroup,
    #[serde(default)]
    pub injury_tracker: SkillGroup,
    #[serde(default)]
    pub body_metrics: BodyMetrics,
}

/// Diet subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietSection {
    #[serde(default)]
    pub current_assessment: SkillGroup,
    #[serde(default)]
    pub recommended_plan: SkillGroup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_rating: Option<String>,
}

/// Free-text goal tracking attached to the mental subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalTracking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_goals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<String>,
}

/// Mental subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentalSection {
    #[serde(default)]
    pub discipline: SkillGroup,
    #[serde(default)]
    pub match_temperament: SkillGroup,
    #[serde(default)]
    pub team_behavior: SkillGroup,
    #[serde(default)]
    pub goal_tracking: GoalTracking,
}

/// The five top-level subtrees of one assessment document.
///
/// Every field defaults, so a document missing any subtree (drafts, legacy
/// records) deserializes to empty groups rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSections {
    #[serde(default)]
    pub cricket_skills: CricketSkills,
    #[serde(default)]
    pub fielding: FieldingSkills,
    #[serde(default)]
    pub fitness: FitnessSection,
    #[serde(default)]
    pub diet: DietSection,
    #[serde(default)]
    pub mental: MentalSection,
}

/// Category tab selecting one subtree for editing or comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillTab {
    Cricket,
    Fielding,
    Fitness,
    Diet,
    Mental,
}

impl SkillTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillTab::Cricket => "cricket",
            SkillTab::Fielding => "fielding",
            SkillTab::Fitness => "fitness",
            SkillTab::Diet => "diet",
            SkillTab::Mental => "mental",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cricket" => Some(SkillTab::Cricket),
            "fielding" => Some(SkillTab::Fielding),
            "fitness" => Some(SkillTab::Fitness),
            "diet" => Some(SkillTab::Diet),
            "mental" => Some(SkillTab::Mental),
            _ => None,
        }
    }
}

impl fmt::Display for SkillTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Address of one (domain, tier) skill group within the document.
///
/// The full set of groups is fixed at compile time; this enum is the only way
/// to address skill storage, which keeps non-skill fields (balance priority,
/// body metrics, goal tracking, diet notes) structurally separate from the
/// flattened skill space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillGroupId {
    CricketBattingBasics,
    CricketBattingIntermediate,
    CricketBattingAdvanced,
    CricketBowlingBasics,
    CricketBowlingIntermediate,
    CricketBowlingAdvanced,
    CricketKeepingBasics,
    CricketKeepingIntermediate,
    CricketKeepingAdvanced,
    FieldingCommon,
    FieldingKeeping,
    FitnessEndurance,
    FitnessSpeedAgility,
    FitnessStrength,
    FitnessFlexibility,
    FitnessInjuryTracker,
    DietCurrentAssessment,
    DietRecommendedPlan,
    MentalDiscipline,
    MentalMatchTemperament,
    MentalTeamBehavior,
}

impl SkillGroupId {
    /// The tab this group is rendered and compared under.
    pub fn tab(&self) -> SkillTab {
        use SkillGroupId::*;
        match self {
            CricketBattingBasics | CricketBattingIntermediate | CricketBattingAdvanced
            | CricketBowlingBasics | CricketBowlingIntermediate | CricketBowlingAdvanced
            | CricketKeepingBasics | CricketKeepingIntermediate | CricketKeepingAdvanced => {
                SkillTab::Cricket
            }
            FieldingCommon | FieldingKeeping => SkillTab::Fielding,
            FitnessEndurance | FitnessSpeedAgility | FitnessStrength | FitnessFlexibility
            | FitnessInjuryTracker => SkillTab::Fitness,
            DietCurrentAssessment | DietRecommendedPlan => SkillTab::Diet,
            MentalDiscipline | MentalMatchTemperament | MentalTeamBehavior => SkillTab::Mental,
        }
    }

    /// The category segment of the flattened comparison key
    /// (`tab.category.skillName`). For the cricket tab this is the tier, which
    /// is why batting and bowling basics share the `basics` segment.
    pub fn category(&self) -> &'static str {
        use SkillGroupId::*;
        match self {
            CricketBattingBasics | CricketBowlingBasics | CricketKeepingBasics => "basics",
            CricketBattingIntermediate | CricketBowlingIntermediate
            | CricketKeepingIntermediate => "intermediate",
            CricketBattingAdvanced | CricketBowlingAdvanced | CricketKeepingAdvanced => "advanced",
            FieldingCommon => "common",
            FieldingKeeping => "wicketKeeping",
            FitnessEndurance => "endurance",
            FitnessSpeedAgility => "speedAgility",
            FitnessStrength => "strength",
            FitnessFlexibility => "flexibility",
            FitnessInjuryTracker => "injuryTracker",
            DietCurrentAssessment => "currentAssessment",
            DietRecommendedPlan => "recommendedPlan",
            MentalDiscipline => "discipline",
            MentalMatchTemperament => "matchTemperament",
            MentalTeamBehavior => "teamBehavior",
        }
    }

    /// All groups in stable scan order (cricket domains batting -> bowling ->
    /// wicket-keeping, each basics -> intermediate -> advanced).
    pub fn all() -> &'static [SkillGroupId] {
        use SkillGroupId::*;
        &[
            CricketBattingBasics,
            CricketBattingIntermediate,
            CricketBattingAdvanced,
            CricketBowlingBasics,
            CricketBowlingIntermediate,
            CricketBowlingAdvanced,
            CricketKeepingBasics,
            CricketKeepingIntermediate,
            CricketKeepingAdvanced,
            FieldingCommon,
            FieldingKeeping,
            FitnessEndurance,
            FitnessSpeedAgility,
            FitnessStrength,
            FitnessFlexibility,
            FitnessInjuryTracker,
            DietCurrentAssessment,
            DietRecommendedPlan,
            MentalDiscipline,
            MentalMatchTemperament,
            MentalTeamBehavior,
        ]
    }

    /// Groups of one tab, in scan order.
    pub fn for_tab(tab: SkillTab) -> Vec<SkillGroupId> {
        Self::all()
            .iter()
            .copied()
            .filter(|g| g.tab() == tab)
            .collect()
    }
}

impl SkillSections {
    /// Borrow the skill group addressed by `group`.
    pub fn group(&self, group: SkillGroupId) -> &SkillGroup {
        use SkillGroupId::*;
        match group {
            CricketBattingBasics => &self.cricket_skills.batting.basics,
            CricketBattingIntermediate => &self.cricket_skills.batting.intermediate,
            CricketBattingAdvanced => &self.cricket_skills.batting.advanced,
            CricketBowlingBasics => &self.cricket_skills.bowling.basics,
            CricketBowlingIntermediate => &self.cricket_skills.bowling.intermediate,
            CricketBowlingAdvanced => &self.cricket_skills.bowling.advanced,
            CricketKeepingBasics => &self.cricket_skills.wicket_keeping.basics,
            CricketKeepingIntermediate => &self.cricket_skills.wicket_keeping.intermediate,
            CricketKeepingAdvanced => &self.cricket_skills.wicket_keeping.advanced,
            FieldingCommon => &self.fielding.common,
            FieldingKeeping => &self.fielding.wicket_keeping,
            FitnessEndurance => &self.fitness.endurance,
            FitnessSpeedAgility => &self.fitness.speed_agility,
            FitnessStrength => &self.fitness.strength,
            FitnessFlexibility => &self.fitness.flexibility,
            FitnessInjuryTracker => &self.fitness.injury_tracker,
            DietCurrentAssessment => &self.diet.current_assessment,
            DietRecommendedPlan => &self.diet.recommended_plan,
            MentalDiscipline => &self.mental.discipline,
            MentalMatchTemperament => &self.mental.match_temperament,
            MentalTeamBehavior => &self.mental.team_behavior,
        }
    }

    fn group_mut(&mut self, group: SkillGroupId) -> &mut SkillGroup {
        use SkillGroupId::*;
        match group {
            CricketBattingBasics => &mut self.cricket_skills.batting.basics,
            CricketBattingIntermediate => &mut self.cricket_skills.batting.intermediate,
            CricketBattingAdvanced => &mut self.cricket_skills.batting.advanced,
            CricketBowlingBasics => &mut self.cricket_skills.bowling.basics,
            CricketBowlingIntermediate => &mut self.cricket_skills.bowling.intermediate,
            CricketBowlingAdvanced => &mut self.cricket_skills.bowling.advanced,
            CricketKeepingBasics => &mut self.cricket_skills.wicket_keeping.basics,
            CricketKeepingIntermediate => &mut self.cricket_skills.wicket_keeping.intermediate,
            CricketKeepingAdvanced => &mut self.cricket_skills.wicket_keeping.advanced,
            FieldingCommon => &mut self.fielding.common,
            FieldingKeeping => &mut self.fielding.wicket_keeping,
            FitnessEndurance => &mut self.fitness.endurance,
            FitnessSpeedAgility => &mut self.fitness.speed_agility,
            FitnessStrength => &mut self.fitness.strength,
            FitnessFlexibility => &mut self.fitness.flexibility,
            FitnessInjuryTracker => &mut self.fitness.injury_tracker,
            DietCurrentAssessment => &mut self.diet.current_assessment,
            DietRecommendedPlan => &mut self.diet.recommended_plan,
            MentalDiscipline => &mut self.mental.discipline,
            MentalMatchTemperament => &mut self.mental.match_temperament,
            MentalTeamBehavior => &mut self.mental.team_behavior,
        }
    }

    /// Total lookup: the entry at (group, name), or an empty entry when the
    /// path is not populated. Never fails on sparse documents.
    pub fn skill(&self, group: SkillGroupId, name: &str) -> SkillEntry {
        self.group(group).get(name).cloned().unwrap_or_default()
    }

    /// Copy-on-write update: a new document with exactly (group, name)
    /// replaced and every sibling untouched. The receiver is not modified.
    pub fn with_skill(&self, group: SkillGroupId, name: &str, entry: SkillEntry) -> Self {
        let mut next = self.clone();
        next.group_mut(group).insert(name.to_string(), entry);
        next
    }

    /// Whether any group in the document holds a non-empty entry.
    pub fn has_any_skill(&self) -> bool {
        SkillGroupId::all()
            .iter()
            .any(|g| self.group(*g).values().any(|e| !e.is_empty()))
    }
}

/// Fixed catalog of known skill names per group. The editing surface offers
/// exactly these; the catalog is not user-extensible.
pub const SKILL_CATALOG: &[(SkillGroupId, &[&str])] = &[
    (
        SkillGroupId::CricketBattingBasics,
        &["Grip", "Stance", "Backlift", "Footwork", "Balance"],
    ),
    (
        SkillGroupId::CricketBattingIntermediate,
        &[
            "Drives",
            "Cuts & Pulls",
            "Shot Selection",
            "Running Between Wickets",
            "Playing Spin",
        ],
    ),
    (
        SkillGroupId::CricketBattingAdvanced,
        &[
            "Power Hitting",
            "Strike Rotation",
            "Playing Pace",
            "Innings Building",
        ],
    ),
    (
        SkillGroupId::CricketBowlingBasics,
        &["Run Up", "Bowling Action", "Release", "Follow Through"],
    ),
    (
        SkillGroupId::CricketBowlingIntermediate,
        &["Line & Length", "Pace Variation", "Swing", "Seam Position"],
    ),
    (
        SkillGroupId::CricketBowlingAdvanced,
        &["Yorkers", "Slower Balls", "Bouncers", "Death Bowling"],
    ),
    (
        SkillGroupId::CricketKeepingBasics,
        &["Stance & Ready Position", "Glove Work", "Footwork Behind Stumps"],
    ),
    (
        SkillGroupId::CricketKeepingIntermediate,
        &["Collection", "Standing Up", "Standing Back"],
    ),
    (
        SkillGroupId::CricketKeepingAdvanced,
        &["Leg Side Takes", "Stumpings", "Keeping to Spin"],
    ),
    (
        SkillGroupId::FieldingCommon,
        &[
            "Ground Fielding",
            "High Catching",
            "Flat Catching",
            "Throwing Accuracy",
            "Attacking the Ball",
        ],
    ),
    (
        SkillGroupId::FieldingKeeping,
        &["Diving", "Under Pressure Takes", "Run Out Awareness"],
    ),
    (
        SkillGroupId::FitnessEndurance,
        &["Aerobic Capacity", "Recovery Rate", "Long Spell Stamina"],
    ),
    (
        SkillGroupId::FitnessSpeedAgility,
        &["Sprint Speed", "Change of Direction", "Reaction Time"],
    ),
    (
        SkillGroupId::FitnessStrength,
        &["Core Strength", "Upper Body", "Lower Body"],
    ),
    (
        SkillGroupId::FitnessFlexibility,
        &["Shoulder Mobility", "Hip Mobility", "Hamstring Flexibility"],
    ),
    (
        SkillGroupId::FitnessInjuryTracker,
        &["Current Injuries", "Recurring Niggles", "Rehab Compliance"],
    ),
    (
        SkillGroupId::DietCurrentAssessment,
        &["Hydration", "Protein Intake", "Meal Timing", "Junk Food Habits"],
    ),
    (
        SkillGroupId::DietRecommendedPlan,
        &["Match Day Nutrition", "Training Day Nutrition", "Rest Day Nutrition"],
    ),
    (
        SkillGroupId::MentalDiscipline,
        &["Punctuality", "Practice Intensity", "Listening & Coachability"],
    ),
    (
        SkillGroupId::MentalMatchTemperament,
        &["Pressure Handling", "Focus & Concentration", "Body Language"],
    ),
    (
        SkillGroupId::MentalTeamBehavior,
        &["Supporting Teammates", "Communication", "Accepting Decisions"],
    ),
];

/// Catalog names for one group.
pub fn catalog_skills(group: SkillGroupId) -> &'static [&'static str] {
    SKILL_CATALOG
        .iter()
        .find(|(g, _)| *g == group)
        .map(|(_, names)| *names)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_order_and_ranks() {
        assert!(RatingValue::NeedsWork < RatingValue::Developing);
        assert!(RatingValue::Developing < RatingValue::Good);
        assert!(RatingValue::Good < RatingValue::Excellent);
        assert_eq!(RatingValue::NeedsWork.rank(), 1);
        assert_eq!(RatingValue::Excellent.rank(), 4);
    }

    #[test]
    fn rating_rank_treats_unknown_as_absent() {
        assert_eq!(rating_rank(None), 0);
        assert_eq!(rating_rank(Some("GOOD")), 3);
        assert_eq!(rating_rank(Some("AMAZING")), 0);
        assert_eq!(rating_rank(Some("good")), 0);
        assert_eq!(rating_rank(Some("")), 0);
    }

    #[test]
    fn empty_entry_detection() {
        assert!(SkillEntry::default().is_empty());
        assert!(SkillEntry::new(Some(""), Some("")).is_empty());
        assert!(!SkillEntry::new(Some("GOOD"), None).is_empty());
        assert!(!SkillEntry::new(None, Some("keep elbow up")).is_empty());
    }

    #[test]
    fn skill_lookup_on_empty_document_is_total() {
        let sections = SkillSections::default();
        for group in SkillGroupId::all() {
            let entry = sections.skill(*group, "Grip");
            assert!(entry.rating.is_none());
            assert!(entry.comment.is_none());
        }
    }

    #[test]
    fn with_skill_round_trips_and_preserves_siblings() {
        let base = SkillSections::default()
            .with_skill(
                SkillGroupId::CricketBattingBasics,
                "Stance",
                SkillEntry::new(Some("GOOD"), None),
            )
            .with_skill(
                SkillGroupId::FitnessStrength,
                "Core Strength",
                SkillEntry::new(Some("DEVELOPING"), Some("more planks")),
            );

        let updated = base.with_skill(
            SkillGroupId::CricketBattingBasics,
            "Grip",
            SkillEntry::new(Some("EXCELLENT"), None),
        );

        // Written path reads back
        assert_eq!(
            updated.skill(SkillGroupId::CricketBattingBasics, "Grip"),
            SkillEntry::new(Some("EXCELLENT"), None)
        );
        // Sibling paths untouched
        assert_eq!(
            updated.skill(SkillGroupId::CricketBattingBasics, "Stance"),
            SkillEntry::new(Some("GOOD"), None)
        );
        assert_eq!(
            updated.skill(SkillGroupId::FitnessStrength, "Core Strength"),
            SkillEntry::new(Some("DEVELOPING"), Some("more planks"))
        );
        // Copy-on-write: original unchanged
        assert!(base
            .skill(SkillGroupId::CricketBattingBasics, "Grip")
            .is_empty());
    }

    #[test]
    fn bmi_derivation() {
        assert_eq!(compute_bmi(Some(180.0), Some(81.0)), Some(25.0));
        assert_eq!(compute_bmi(None, Some(70.0)), None);
        assert_eq!(compute_bmi(Some(170.0), None), None);
        assert_eq!(compute_bmi(Some(0.0), Some(70.0)), None);
        // Rounded to one decimal
        assert_eq!(compute_bmi(Some(175.0), Some(70.0)), Some(22.9));
    }

    #[test]
    fn sections_survive_partial_json() {
        let sections: SkillSections = serde_json::from_str(
            r#"{"cricketSkills":{"batting":{"basics":{"Grip":{"rating":"GOOD"}}}}}"#,
        )
        .unwrap();
        assert_eq!(
            sections
                .skill(SkillGroupId::CricketBattingBasics, "Grip")
                .rating
                .as_deref(),
            Some("GOOD")
        );
        assert!(sections.fielding.common.is_empty());
        assert!(sections.fitness.body_metrics.bmi.is_none());
    }

    #[test]
    fn catalog_covers_every_group() {
        for group in SkillGroupId::all() {
            assert!(
                !catalog_skills(*group).is_empty(),
                "no catalog entry for {:?}",
                group
            );
        }
    }
}
