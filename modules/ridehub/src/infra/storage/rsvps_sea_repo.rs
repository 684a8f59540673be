use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::SeaRepository;
use crate::domain::error::DomainError;
use crate::domain::models::{Rsvp, RsvpCounts, RsvpStatus};
use crate::domain::repos::RsvpsRepository;
use crate::infra::storage::db::db_err;
use crate::infra::storage::entity::rsvp::{ActiveModel as RsvpAM, Column, Entity as RsvpEntity};
use crate::infra::storage::mapper::try_collect;

#[async_trait]
impl RsvpsRepository for SeaRepository {
    async fn find_rsvp<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ride_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Rsvp>, DomainError> {
        RsvpEntity::find()
            .filter(Column::RideId.eq(ride_id))
            .filter(Column::UserId.eq(user_id))
            .one(conn)
            .await
            .map_err(db_err)?
            .map(Rsvp::try_from)
            .transpose()
    }

    async fn list_rsvps<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ride_id: Uuid,
    ) -> Result<Vec<Rsvp>, DomainError> {
        let rows = RsvpEntity::find()
            .filter(Column::RideId.eq(ride_id))
            .order_by_asc(Column::CreatedAt)
            .all(conn)
            .await
            .map_err(db_err)?;
        try_collect(rows)
    }

    async fn count_rsvps<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ride_id: Uuid,
    ) -> Result<RsvpCounts, DomainError> {
        let statuses: Vec<String> = RsvpEntity::find()
            .select_only()
            .column(Column::Status)
            .filter(Column::RideId.eq(ride_id))
            .into_tuple()
            .all(conn)
            .await
            .map_err(db_err)?;

        let mut counts = RsvpCounts::default();
        for status in statuses {
            match RsvpStatus::parse(&status) {
                Some(RsvpStatus::Going) => counts.going += 1,
                Some(RsvpStatus::Maybe) => counts.maybe += 1,
                Some(RsvpStatus::NotGoing) => counts.not_going += 1,
                None => tracing::warn!(%ride_id, status, "skipping unreadable rsvp status"),
            }
        }
        Ok(counts)
    }

    async fn upsert_rsvp<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        rsvp: Rsvp,
    ) -> Result<Rsvp, DomainError> {
        let existing = RsvpEntity::find()
            .filter(Column::RideId.eq(rsvp.ride_id))
            .filter(Column::UserId.eq(rsvp.user_id))
            .one(conn)
            .await
            .map_err(db_err)?;

        let saved = if let Some(existing) = existing {
            let mut am = existing.into_active_model();
            am.status = Set(rsvp.status.as_str().to_owned());
            am.updated_at = Set(rsvp.updated_at);
            am.update(conn).await.map_err(db_err)?
        } else {
            RsvpAM {
                id: Set(rsvp.id),
                ride_id: Set(rsvp.ride_id),
                user_id: Set(rsvp.user_id),
                status: Set(rsvp.status.as_str().to_owned()),
                created_at: Set(rsvp.created_at),
                updated_at: Set(rsvp.updated_at),
            }
            .insert(conn)
            .await
            .map_err(db_err)?
        };
        saved.try_into()
    }

    async fn delete_rsvp<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ride_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, DomainError> {
        let res = RsvpEntity::delete_many()
            .filter(Column::RideId.eq(ride_id))
            .filter(Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }
}
