use sea_orm::entity::prelude::*;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rides")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub chapter_id: Option<Uuid>,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: OffsetDateTime,
    pub duration_minutes: Option<i32>,
    pub distance_km: Option<f64>,
    pub elevation_m: Option<i32>,
    pub pace: Option<String>,
    pub meeting_point: Option<String>,
    pub route_url: Option<String>,
    pub cancelled: bool,
    /// `NONE`, `WEEKLY`, `BIWEEKLY` or `MONTHLY`.
    pub recurrence: String,
    pub recurrence_series_id: Option<Uuid>,
    #[sea_orm(unique)]
    pub strava_event_id: Option<i64>,
    pub sync_hash: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::rsvp::Entity")]
    Rsvps,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::rsvp::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rsvps.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
