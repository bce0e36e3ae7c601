//! Rating categories and the read-time score aggregator.
//!
//! A review carries sixteen 1–5 sub-scores. Thirteen of them are scoring
//! categories that feed the overall score; the last three describe style and
//! are informational only. `micromanage` is asked on an inverted scale, so
//! every raw value `v` counts as `6 - v` wherever it is averaged.
//!
//! Averages are never exposed for a captain with fewer reviews than the
//! display threshold; [`RatingSummary::Hidden`] carries only the count.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest accepted sub-score.
pub const MIN_SCORE: i16 = 1;

/// Highest accepted sub-score.
pub const MAX_SCORE: i16 = 5;

/// Value used for a sub-score the client leaves out.
pub const NEUTRAL_SCORE: i16 = 3;

/// Minimum number of reviews before any average is shown.
pub const DEFAULT_MIN_DISPLAY_REVIEWS: usize = 3;

/// Number of categories that contribute to the overall score.
pub const SCORING_CATEGORY_COUNT: usize = 13;

// ---------------------------------------------------------------------------
// Category catalogue
// ---------------------------------------------------------------------------

/// Section of the rating form a category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    CrewCoordination,
    Airmanship,
    OverallImpression,
    Style,
}

/// A single rating category with its form copy.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RatingCategory {
    pub key: &'static str,
    pub label: &'static str,
    /// What 1 and 5 mean on this scale.
    pub hint: &'static str,
    pub group: CategoryGroup,
    /// Whether the category feeds the overall score.
    pub scoring: bool,
    /// Whether raw values are flipped (`6 - v`) before averaging.
    pub inverted: bool,
}

const fn category(
    key: &'static str,
    label: &'static str,
    hint: &'static str,
    group: CategoryGroup,
) -> RatingCategory {
    RatingCategory {
        key,
        label,
        hint,
        group,
        scoring: !matches!(group, CategoryGroup::Style),
        inverted: false,
    }
}

/// All sixteen categories in form order. The order matches
/// [`Scores::values`].
pub const CATEGORIES: [RatingCategory; 16] = [
    category(
        "crm_inclusion",
        "CRM & Inclusion",
        "1 = shuts FO out → 5 = collaborative",
        CategoryGroup::CrewCoordination,
    ),
    category(
        "communication",
        "Communication",
        "1 = poor/confusing → 5 = clear and timely",
        CategoryGroup::CrewCoordination,
    ),
    category(
        "easy_to_fly",
        "Easy to Fly With",
        "1 = difficult → 5 = low-friction and easygoing",
        CategoryGroup::CrewCoordination,
    ),
    RatingCategory {
        inverted: true,
        ..category(
            "micromanage",
            "Micromanagement (inverse)",
            "1 = nitpicks tasks → 5 = trusts appropriately",
            CategoryGroup::CrewCoordination,
        )
    },
    category(
        "workload_share",
        "Workload Sharing",
        "1 = leaves you hanging → 5 = pitches in",
        CategoryGroup::CrewCoordination,
    ),
    category(
        "helps_box",
        "Helps with Box Work",
        "1 = never helps → 5 = proactively helps",
        CategoryGroup::CrewCoordination,
    ),
    category(
        "helps_walk",
        "Helps with Walkaround",
        "1 = never helps → 5 = proactively helps",
        CategoryGroup::CrewCoordination,
    ),
    category(
        "skill_sop",
        "Skill / SOP Knowledge",
        "1 = sloppy/guessy → 5 = sharp & standard",
        CategoryGroup::Airmanship,
    ),
    category(
        "temperament",
        "Temperament / Stress Handling",
        "1 = easily frustrated → 5 = calm & steady",
        CategoryGroup::Airmanship,
    ),
    category(
        "respectfulness",
        "Respectfulness",
        "1 = rude/hostile → 5 = courteous/decent",
        CategoryGroup::Airmanship,
    ),
    category(
        "boundaries",
        "Professional Boundaries",
        "1 = makes people uncomfortable → 5 = appropriate & respectful",
        CategoryGroup::Airmanship,
    ),
    category(
        "cabin_respect",
        "Cabin Crew Respect",
        "1 = dismissive → 5 = consistently respectful",
        CategoryGroup::Airmanship,
    ),
    category(
        "would_fly_again",
        "Would Fly Again",
        "1 = would avoid → 5 = would gladly fly again",
        CategoryGroup::OverallImpression,
    ),
    category(
        "chattiness",
        "Chattiness",
        "1 = mostly reserved → 5 = very chatty",
        CategoryGroup::Style,
    ),
    category(
        "mentorship",
        "Mentorship / Coaching",
        "1 = no extra guidance → 5 = supportive teacher",
        CategoryGroup::Style,
    ),
    category(
        "humor_vibe",
        "Humor / Vibe",
        "1 = humorless/tense → 5 = positive, light-hearted",
        CategoryGroup::Style,
    ),
];

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

fn neutral_score() -> i16 {
    NEUTRAL_SCORE
}

/// The sixteen raw sub-scores of one review.
///
/// Missing fields deserialize to [`NEUTRAL_SCORE`]; out-of-range values are
/// caught by [`Scores::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Scores {
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub crm_inclusion: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub communication: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub easy_to_fly: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub micromanage: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub workload_share: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub helps_box: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub helps_walk: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub skill_sop: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub temperament: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub respectfulness: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub boundaries: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub cabin_respect: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub would_fly_again: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub chattiness: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub mentorship: i16,
    #[serde(default = "neutral_score")]
    #[validate(range(min = 1, max = 5))]
    pub humor_vibe: i16,
}

impl Default for Scores {
    fn default() -> Self {
        Self::uniform(NEUTRAL_SCORE)
    }
}

impl Scores {
    /// Every sub-score set to `value`.
    pub fn uniform(value: i16) -> Self {
        Self {
            crm_inclusion: value,
            communication: value,
            easy_to_fly: value,
            micromanage: value,
            workload_share: value,
            helps_box: value,
            helps_walk: value,
            skill_sop: value,
            temperament: value,
            respectfulness: value,
            boundaries: value,
            cabin_respect: value,
            would_fly_again: value,
            chattiness: value,
            mentorship: value,
            humor_vibe: value,
        }
    }

    /// Raw values in [`CATEGORIES`] order.
    pub fn values(&self) -> [i16; 16] {
        [
            self.crm_inclusion,
            self.communication,
            self.easy_to_fly,
            self.micromanage,
            self.workload_share,
            self.helps_box,
            self.helps_walk,
            self.skill_sop,
            self.temperament,
            self.respectfulness,
            self.boundaries,
            self.cabin_respect,
            self.would_fly_again,
            self.chattiness,
            self.mentorship,
            self.humor_vibe,
        ]
    }

    /// Reject any sub-score outside `[MIN_SCORE, MAX_SCORE]`.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        Ok(())
    }
}

/// Map a raw value onto the shared "higher is better" scale.
pub fn adjusted_value(category: &RatingCategory, raw: i16) -> f64 {
    if category.inverted {
        f64::from(MAX_SCORE + MIN_SCORE - raw)
    } else {
        f64::from(raw)
    }
}

/// Round to two decimal places for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Overall score of a single review (unrounded).
pub fn overall_for_review(scores: &Scores) -> f64 {
    let total: f64 = CATEGORIES
        .iter()
        .zip(scores.values())
        .filter(|(category, _)| category.scoring)
        .map(|(category, raw)| adjusted_value(category, raw))
        .sum();
    total / SCORING_CATEGORY_COUNT as f64
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Average of one category across a captain's reviews.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryAverage {
    pub key: &'static str,
    pub label: &'static str,
    pub group: CategoryGroup,
    pub scoring: bool,
    /// Rounded to two decimals.
    pub average: f64,
}

/// What may be shown about a captain's ratings.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "visibility", rename_all = "snake_case")]
pub enum RatingSummary {
    /// Too few reviews; only the count is exposed.
    Hidden { count: usize },
    /// Enough reviews to publish averages.
    Visible {
        count: usize,
        categories: Vec<CategoryAverage>,
        /// Mean of the scoring category averages, rounded to two decimals.
        overall: f64,
    },
}

impl RatingSummary {
    pub fn count(&self) -> usize {
        match self {
            RatingSummary::Hidden { count } | RatingSummary::Visible { count, .. } => *count,
        }
    }

    /// The overall score, if visible.
    pub fn overall(&self) -> Option<f64> {
        match self {
            RatingSummary::Hidden { .. } => None,
            RatingSummary::Visible { overall, .. } => Some(*overall),
        }
    }
}

/// Aggregate a captain's reviews.
///
/// Averages are produced only when `reviews.len() >= min_display` (and at
/// least one review exists). Category averages are rounded to two decimals
/// first; the overall is the mean of those rounded scoring averages, rounded
/// again.
pub fn summarize(reviews: &[Scores], min_display: usize) -> RatingSummary {
    let count = reviews.len();
    if count == 0 || count < min_display {
        return RatingSummary::Hidden { count };
    }

    let mut sums = [0.0_f64; 16];
    for scores in reviews {
        for (i, raw) in scores.values().into_iter().enumerate() {
            sums[i] += adjusted_value(&CATEGORIES[i], raw);
        }
    }

    let averages: Vec<f64> = sums.iter().map(|sum| round2(sum / count as f64)).collect();

    let overall = CATEGORIES
        .iter()
        .zip(&averages)
        .filter(|(category, _)| category.scoring)
        .map(|(_, avg)| avg)
        .sum::<f64>()
        / SCORING_CATEGORY_COUNT as f64;

    let categories = CATEGORIES
        .iter()
        .zip(averages)
        .map(|(category, avg)| CategoryAverage {
            key: category.key,
            label: category.label,
            group: category.group,
            scoring: category.scoring,
            average: avg,
        })
        .collect();

    RatingSummary::Visible {
        count,
        categories,
        overall: round2(overall),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn average_of(summary: &RatingSummary, key: &str) -> f64 {
        match summary {
            RatingSummary::Visible { categories, .. } => {
                categories.iter().find(|c| c.key == key).unwrap().average
            }
            RatingSummary::Hidden { .. } => panic!("summary is hidden"),
        }
    }

    #[test]
    fn catalogue_has_thirteen_scoring_categories() {
        assert_eq!(CATEGORIES.iter().filter(|c| c.scoring).count(), SCORING_CATEGORY_COUNT);
        assert_eq!(CATEGORIES.iter().filter(|c| c.inverted).count(), 1);
        assert_eq!(CATEGORIES[3].key, "micromanage");
    }

    #[test]
    fn perfect_captain_scores_five() {
        let scores = Scores {
            micromanage: 1,
            ..Scores::uniform(5)
        };
        let summary = summarize(&[scores, scores, scores], 3);
        assert_eq!(summary.overall(), Some(5.0));
        assert_eq!(average_of(&summary, "micromanage"), 5.0);
    }

    #[test]
    fn micromanage_is_inverted() {
        let scores = Scores::uniform(5);
        let summary = summarize(&[scores; 3], 3);
        assert_eq!(average_of(&summary, "micromanage"), 1.0);
        // 12 * 5 + 1 over 13
        assert_eq!(summary.overall(), Some(round2(61.0 / 13.0)));
    }

    #[test]
    fn style_categories_do_not_affect_overall() {
        let low_style = Scores {
            chattiness: 1,
            mentorship: 1,
            humor_vibe: 1,
            micromanage: 2,
            ..Scores::uniform(4)
        };
        let high_style = Scores {
            chattiness: 5,
            mentorship: 5,
            humor_vibe: 5,
            ..low_style
        };
        let a = summarize(&[low_style; 3], 3);
        let b = summarize(&[high_style; 3], 3);
        assert_eq!(a.overall(), b.overall());
        assert_eq!(average_of(&a, "chattiness"), 1.0);
        assert_eq!(average_of(&b, "chattiness"), 5.0);
    }

    #[test]
    fn overall_is_mean_of_category_averages() {
        let reviews = [
            Scores {
                crm_inclusion: 1,
                micromanage: 5,
                ..Scores::uniform(3)
            },
            Scores {
                crm_inclusion: 4,
                micromanage: 4,
                ..Scores::uniform(2)
            },
            Scores {
                crm_inclusion: 2,
                micromanage: 1,
                ..Scores::uniform(5)
            },
            Scores::uniform(4),
        ];
        let summary = summarize(&reviews, 3);

        let mut expected = 0.0;
        for (i, category) in CATEGORIES.iter().enumerate().filter(|(_, c)| c.scoring) {
            let sum: f64 = reviews
                .iter()
                .map(|r| adjusted_value(category, r.values()[i]))
                .sum();
            expected += round2(sum / reviews.len() as f64);
        }
        expected /= SCORING_CATEGORY_COUNT as f64;

        assert_eq!(summary.overall(), Some(round2(expected)));
        assert_eq!(average_of(&summary, "crm_inclusion"), round2(11.0 / 4.0));
        // inverted: (1 + 2 + 5 + 2) / 4
        assert_eq!(average_of(&summary, "micromanage"), 2.5);
    }

    #[test]
    fn overall_uses_rounded_category_averages() {
        // Eight categories average 4/3 (shown as 1.33), temperament 1, the
        // remaining four scoring categories 5. Unrounded that is 2.4359;
        // from the displayed averages it is 31.64 / 13 = 2.4338.
        let review = |first: i16| Scores {
            crm_inclusion: first,
            communication: first,
            easy_to_fly: first,
            micromanage: MAX_SCORE + MIN_SCORE - first,
            workload_share: first,
            helps_box: first,
            helps_walk: first,
            skill_sop: first,
            temperament: 1,
            ..Scores::uniform(5)
        };
        let summary = summarize(&[review(2), review(1), review(1)], 3);

        assert_eq!(average_of(&summary, "crm_inclusion"), 1.33);
        assert_eq!(average_of(&summary, "micromanage"), 1.33);
        assert_eq!(summary.overall(), Some(2.43));
    }

    #[test]
    fn per_review_overall_matches_summary_for_identical_reviews() {
        let scores = Scores {
            helps_box: 2,
            micromanage: 4,
            ..Scores::uniform(4)
        };
        let summary = summarize(&[scores; 5], 3);
        assert_eq!(summary.overall(), Some(round2(overall_for_review(&scores))));
    }

    #[test]
    fn below_threshold_exposes_only_count() {
        let scores = Scores::uniform(5);
        assert_matches!(summarize(&[], 3), RatingSummary::Hidden { count: 0 });
        assert_matches!(summarize(&[scores], 3), RatingSummary::Hidden { count: 1 });
        assert_matches!(summarize(&[scores; 2], 3), RatingSummary::Hidden { count: 2 });
        assert_matches!(summarize(&[scores; 3], 3), RatingSummary::Visible { count: 3, .. });
    }

    #[test]
    fn zero_threshold_never_divides_by_zero() {
        assert_matches!(summarize(&[], 0), RatingSummary::Hidden { count: 0 });
    }

    #[test]
    fn hidden_summary_serializes_without_averages() {
        let json = serde_json::to_value(summarize(&[Scores::uniform(5)], 3)).unwrap();
        assert_eq!(json["visibility"], "hidden");
        assert_eq!(json["count"], 1);
        assert!(json.get("overall").is_none());
        assert!(json.get("categories").is_none());
    }

    #[test]
    fn rounding_is_two_decimals() {
        assert_eq!(round2(4.666_666), 4.67);
        assert_eq!(round2(3.0), 3.0);
        assert_eq!(round2(2.344), 2.34);
    }

    #[test]
    fn out_of_range_scores_rejected() {
        assert!(Scores::uniform(3).check().is_ok());
        assert!(Scores { helps_walk: 0, ..Scores::uniform(3) }.check().is_err());
        assert!(Scores { humor_vibe: 6, ..Scores::uniform(3) }.check().is_err());
    }

    #[test]
    fn missing_scores_default_to_neutral() {
        assert_eq!(Scores::default(), Scores::uniform(NEUTRAL_SCORE));
    }
}
