use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind tag carried by code-similarity flags.
pub const SIMILAR_CODE: &str = "similar_code";

/// Two submissions whose normalized code is suspiciously alike.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarityFlag {
    pub id: String,
    pub kind: String,
    pub user_a: String,
    pub user_b: String,
    pub problem_id: String,
    pub round_id: String,
    /// Ratio in `0.0..=1.0`.
    pub similarity: f64,
    pub detected_at: DateTime<Utc>,
}

impl SimilarityFlag {
    pub fn similar_code(
        user_a: impl Into<String>,
        user_b: impl Into<String>,
        problem_id: impl Into<String>,
        round_id: impl Into<String>,
        similarity: f64,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            kind: SIMILAR_CODE.to_string(),
            user_a: user_a.into(),
            user_b: user_b.into(),
            problem_id: problem_id.into(),
            round_id: round_id.into(),
            similarity,
            detected_at,
        }
    }
}
