use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "similarity_flag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Always "similar_code" for now.
    pub kind: String,
    pub user_a: String,
    pub user_b: String,
    pub problem_id: String,
    pub round_id: String,
    pub similarity: f64,
    #[sea_orm(indexed)]
    pub detected_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for common::SimilarityFlag {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            kind: m.kind,
            user_a: m.user_a,
            user_b: m.user_b,
            problem_id: m.problem_id,
            round_id: m.round_id,
            similarity: m.similarity,
            detected_at: m.detected_at,
        }
    }
}
