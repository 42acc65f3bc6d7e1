use common::RoundState;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "round")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub state: RoundState,
    pub start_time: Option<DateTimeUtc>,
    pub end_time: Option<DateTimeUtc>,
    /// Seconds; zero disables expiry.
    pub duration: i64,
    /// Active milliseconds banked by pauses.
    pub elapsed_ms: i64,
    pub is_locked: bool,
    pub scheduled_start: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for common::Round {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            state: m.state,
            start_time: m.start_time,
            end_time: m.end_time,
            duration: m.duration,
            elapsed_ms: m.elapsed_ms,
            is_locked: m.is_locked,
            scheduled_start: m.scheduled_start,
        }
    }
}
