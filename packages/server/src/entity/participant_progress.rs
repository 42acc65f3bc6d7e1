use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participant_progress")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: String,
    #[sea_orm(primary_key)]
    pub round_id: String,
    pub attended: bool,
    pub testcases_passed: i32,
    pub total_testcases: i32,
    pub score: i32,
    pub qualified: Option<bool>,
    pub last_submission_id: String,
    pub last_submission_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for common::ParticipantProgress {
    fn from(m: Model) -> Self {
        Self {
            user_id: m.user_id,
            round_id: m.round_id,
            attended: m.attended,
            testcases_passed: m.testcases_passed,
            total_testcases: m.total_testcases,
            score: m.score,
            qualified: m.qualified,
            last_submission_id: m.last_submission_id,
            last_submission_at: m.last_submission_at,
        }
    }
}
