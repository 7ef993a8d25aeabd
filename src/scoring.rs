//! Capital-based lead scoring and categorization.
//!
//! Pure functions, no I/O. The score is a lookup on the declared available
//! capital (first matching threshold in descending order wins); the category
//! is a coarser banding on the score. The two scales are independent and both
//! are fixed business rules.

use crate::models::LeadCategory;
use serde::Serialize;
use serde_json::{json, Value};

/// One row of the scoring table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreBand {
    /// Minimum capital (R$) to reach this band.
    pub min: i64,
    pub score: i32,
    pub label: &'static str,
}

/// Scoring table, descending by `min`. Order matters: the first band whose
/// threshold the capital reaches is selected.
pub const SCORING_TABLE: &[ScoreBand] = &[
    ScoreBand { min: 500_000, score: 95, label: "500k+" },
    ScoreBand { min: 300_000, score: 90, label: "300k-500k" },
    ScoreBand { min: 200_000, score: 80, label: "200k-300k" },
    ScoreBand { min: 150_000, score: 70, label: "150k-200k" },
    ScoreBand { min: 100_000, score: 60, label: "100k-150k" },
    ScoreBand { min: 80_000, score: 55, label: "80k-100k" },
    ScoreBand { min: 0, score: 50, label: "<80k" },
];

/// Score threshold for the `hot` category (inclusive).
pub const HOT_THRESHOLD: i32 = 80;
/// Score threshold for the `warm` category (inclusive).
pub const WARM_THRESHOLD: i32 = 60;

/// Computes the score for a declared capital amount (R$).
pub fn score_for_capital(capital: i64) -> i32 {
    SCORING_TABLE
        .iter()
        .find(|band| capital >= band.min)
        .map(|band| band.score)
        .unwrap_or(50)
}

/// Maps a score to its temperature bucket.
pub fn category_for_score(score: i32) -> LeadCategory {
    if score >= HOT_THRESHOLD {
        LeadCategory::Hot
    } else if score >= WARM_THRESHOLD {
        LeadCategory::Warm
    } else {
        LeadCategory::Cold
    }
}

/// Parses a free-text capital field ("R$ 250.000", "250000", "250k não")
/// by keeping only its digits. Unparseable or empty input yields 0.
pub fn parse_capital(raw: &str) -> i64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<i64>().unwrap_or(0)
}

/// Parses the capital and derives score and category in one call.
pub fn process_capital(raw: &str) -> (i64, i32, LeadCategory) {
    let capital = parse_capital(raw);
    let score = score_for_capital(capital);
    (capital, score, category_for_score(score))
}

/// Full scoring table with derived categories, for the diagnostics endpoint.
pub fn scoring_table() -> Vec<Value> {
    SCORING_TABLE
        .iter()
        .map(|band| {
            json!({
                "min": band.min,
                "score": band.score,
                "label": band.label,
                "categoria": category_for_score(band.score),
            })
        })
        .collect()
}
