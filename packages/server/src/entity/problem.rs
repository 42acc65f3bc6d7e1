use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "problem")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(indexed)]
    pub round_id: String,
    pub title: String,

    /// Testcases stored as a JSON array in judging order.
    #[sea_orm(column_type = "JsonBinary")]
    pub testcases: Json,
}

impl ActiveModelBehavior for ActiveModel {}
