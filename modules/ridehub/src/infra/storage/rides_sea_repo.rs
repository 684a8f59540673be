use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use super::SeaRepository;
use crate::domain::error::DomainError;
use crate::domain::models::{Page, Ride, RideFilter};
use crate::domain::repos::RidesRepository;
use crate::infra::storage::db::db_err;
use crate::infra::storage::entity::ride::{ActiveModel as RideAM, Column, Entity as RideEntity};
use crate::infra::storage::entity::{comment, rsvp};
use crate::infra::storage::mapper::try_collect;

#[async_trait]
impl RidesRepository for SeaRepository {
    async fn find_ride<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Ride>, DomainError> {
        RideEntity::find_by_id(id)
            .one(conn)
            .await
            .map_err(db_err)?
            .map(Ride::try_from)
            .transpose()
    }

    async fn list_rides<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        filter: &RideFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Page<Ride>, DomainError> {
        let mut select = RideEntity::find();
        if let Some(chapter_id) = filter.chapter_id {
            select = select.filter(Column::ChapterId.eq(chapter_id));
        }
        if let Some(from) = filter.from {
            select = select.filter(Column::StartTime.gte(from));
        }
        if let Some(to) = filter.to {
            select = select.filter(Column::StartTime.lte(to));
        }
        if !filter.include_cancelled {
            select = select.filter(Column::Cancelled.eq(false));
        }

        let total = select.clone().count(conn).await.map_err(db_err)?;
        let rows = select
            .order_by_asc(Column::StartTime)
            .order_by_asc(Column::Id)
            .limit(limit)
            .offset(offset)
            .all(conn)
            .await
            .map_err(db_err)?;

        Ok(Page {
            items: try_collect(rows)?,
            limit,
            offset,
            total,
        })
    }

    async fn list_series<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        series_id: Uuid,
    ) -> Result<Vec<Ride>, DomainError> {
        let rows = RideEntity::find()
            .filter(Column::RecurrenceSeriesId.eq(series_id))
            .order_by_asc(Column::StartTime)
            .all(conn)
            .await
            .map_err(db_err)?;
        try_collect(rows)
    }

    async fn find_ride_by_strava_event<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        strava_event_id: i64,
    ) -> Result<Option<Ride>, DomainError> {
        RideEntity::find()
            .filter(Column::StravaEventId.eq(strava_event_id))
            .one(conn)
            .await
            .map_err(db_err)?
            .map(Ride::try_from)
            .transpose()
    }

    async fn list_chapter_ride_ids<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
    ) -> Result<Vec<Uuid>, DomainError> {
        RideEntity::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::ChapterId.eq(chapter_id))
            .into_tuple::<Uuid>()
            .all(conn)
            .await
            .map_err(db_err)
    }

    async fn insert_rides<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        rides: Vec<Ride>,
    ) -> Result<Vec<Ride>, DomainError> {
        for ride in &rides {
            let _ = RideAM::from(ride.clone()).insert(conn).await.map_err(db_err)?;
        }
        Ok(rides)
    }

    async fn update_ride<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ride: Ride,
    ) -> Result<Ride, DomainError> {
        let id = ride.id;
        RideAM::from(ride)
            .update(conn)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => DomainError::not_found("Ride", id),
                other => db_err(other),
            })?
            .try_into()
    }

    async fn delete_rides<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ids: &[Uuid],
    ) -> Result<u64, DomainError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let rsvps = rsvp::Entity::delete_many()
            .filter(rsvp::Column::RideId.is_in(ids.iter().copied()))
            .exec(conn)
            .await
            .map_err(db_err)?;
        let comments = comment::Entity::delete_many()
            .filter(comment::Column::RideId.is_in(ids.iter().copied()))
            .exec(conn)
            .await
            .map_err(db_err)?;
        let rides = RideEntity::delete_many()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .exec(conn)
            .await
            .map_err(db_err)?;

        tracing::debug!(
            rides = rides.rows_affected,
            rsvps = rsvps.rows_affected,
            comments = comments.rows_affected,
            "deleted rides with dependents"
        );
        Ok(rides.rows_affected)
    }
}
