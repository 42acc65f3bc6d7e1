use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(indexed)]
    pub user_id: String,
    pub problem_id: String,
    pub round_id: String,
    #[sea_orm(column_type = "Text")]
    pub code: String,
    pub language: String,
    #[sea_orm(indexed)]
    pub submitted_at: DateTimeUtc,
    pub testcases_passed: i32,
    pub total_testcases: i32,

    /// Per-testcase outcomes as a JSON array.
    #[sea_orm(column_type = "JsonBinary")]
    pub results: Json,
}

impl ActiveModelBehavior for ActiveModel {}
