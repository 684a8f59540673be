#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use time::{Duration, OffsetDateTime};

use ridehub::domain::error::DomainError;
use ridehub::domain::models::{PageRequest, RideFilter, RidePatch, RsvpStatus, SeriesScope};
use ridehub::domain::recurrence::Cadence;
use support::{chapter, harness, new_ride, single_ride, user};

fn next_week() -> OffsetDateTime {
    (OffsetDateTime::now_utc() + Duration::days(7))
        .replace_nanosecond(0)
        .unwrap()
}

#[tokio::test]
async fn weekly_series_shares_one_series_id() {
    let h = harness().await;
    let alice = user(&h.svc, "alice@example.com").await;
    let ch = chapter(&h.svc, alice, "Oakland").await;

    let start = next_week();
    let mut req = new_ride(Some(ch.id), "Saturday Social", start);
    req.recurrence = Cadence::Weekly;
    req.recurrence_count = Some(4);
    let created = h.svc.rides.create_ride(alice, req).await.unwrap();

    assert_eq!(created.rides.len(), 4);
    assert!(!created.truncated);
    let series = created.rides[0].recurrence_series_id;
    assert!(series.is_some());
    assert!(created.rides.iter().all(|r| r.recurrence_series_id == series));
    assert_eq!(created.rides[3].start_time, start + Duration::weeks(3));
    assert!(created.rides.iter().all(|r| r.recurrence == Cadence::Weekly));
}

#[tokio::test]
async fn series_is_capped_and_reported() {
    let h = harness().await;
    let alice = user(&h.svc, "alice@example.com").await;

    let mut req = new_ride(None, "Forever Ride", next_week());
    req.recurrence = Cadence::Weekly;
    req.recurrence_count = Some(500);
    let created = h.svc.rides.create_ride(alice, req).await.unwrap();

    // The harness caps series at 10 occurrences.
    assert_eq!(created.rides.len(), 10);
    assert!(created.truncated);
}

#[tokio::test]
async fn recurring_ride_without_bound_is_invalid() {
    let h = harness().await;
    let alice = user(&h.svc, "alice@example.com").await;

    let mut req = new_ride(None, "Open Ended", next_week());
    req.recurrence = Cadence::Monthly;
    let err = h.svc.rides.create_ride(alice, req).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }), "got {err:?}");
}

#[tokio::test]
async fn chapter_rides_need_an_admin() {
    let h = harness().await;
    let alice = user(&h.svc, "alice@example.com").await;
    let bob = user(&h.svc, "bob@example.com").await;
    let ch = chapter(&h.svc, alice, "Oakland").await;
    h.svc.chapters.join(bob, ch.id).await.unwrap();

    let err = h
        .svc
        .rides
        .create_ride(bob, new_ride(Some(ch.id), "Rogue Ride", next_week()))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }), "got {err:?}");

    // Personal rides are open to everyone.
    let ride = single_ride(&h.svc, bob, None).await;
    assert_eq!(ride.created_by, bob);
    assert_eq!(ride.chapter_id, None);
    assert_eq!(ride.recurrence_series_id, None);
}

#[tokio::test]
async fn deleting_future_keeps_earlier_rides() {
    let h = harness().await;
    let alice = user(&h.svc, "alice@example.com").await;
    let ch = chapter(&h.svc, alice, "Oakland").await;

    let mut req = new_ride(Some(ch.id), "Tuesday Tempo", next_week());
    req.recurrence = Cadence::Biweekly;
    req.recurrence_count = Some(5);
    let created = h.svc.rides.create_ride(alice, req).await.unwrap();

    let third = &created.rides[2];
    let deleted = h
        .svc
        .rides
        .delete_ride(alice, third.id, SeriesScope::Future)
        .await
        .unwrap();
    assert_eq!(deleted, 3);

    let remaining = h
        .svc
        .rides
        .list_rides(
            RideFilter {
                chapter_id: Some(ch.id),
                ..RideFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    let ids: Vec<_> = remaining.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, [created.rides[0].id, created.rides[1].id]);
}

#[tokio::test]
async fn series_edit_applies_to_every_ride_but_rejects_time_moves() {
    let h = harness().await;
    let alice = user(&h.svc, "alice@example.com").await;

    let mut req = new_ride(None, "Lunch Loop", next_week());
    req.recurrence = Cadence::Weekly;
    req.recurrence_count = Some(3);
    let created = h.svc.rides.create_ride(alice, req).await.unwrap();
    let first = created.rides[0].id;

    let err = h
        .svc
        .rides
        .update_ride(
            alice,
            first,
            RidePatch {
                start_time: Some(next_week() + Duration::hours(1)),
                ..RidePatch::default()
            },
            SeriesScope::Series,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }), "got {err:?}");

    let updated = h
        .svc
        .rides
        .update_ride(
            alice,
            first,
            RidePatch {
                title: Some("Long Lunch Loop".to_owned()),
                ..RidePatch::default()
            },
            SeriesScope::Series,
        )
        .await
        .unwrap();
    assert_eq!(updated.len(), 3);
    assert!(updated.iter().all(|r| r.title == "Long Lunch Loop"));

    // Start times are untouched by a series edit.
    let starts: Vec<_> = updated.iter().map(|r| r.start_time).collect();
    let original: Vec<_> = created.rides.iter().map(|r| r.start_time).collect();
    assert_eq!(starts, original);
}

#[tokio::test]
async fn series_scope_on_a_lone_ride_may_move_its_start() {
    let h = harness().await;
    let alice = user(&h.svc, "alice@example.com").await;
    let ride = single_ride(&h.svc, alice, None).await;
    let later = ride.start_time + Duration::hours(2);

    for scope in [SeriesScope::Series, SeriesScope::Future] {
        let updated = h
            .svc
            .rides
            .update_ride(
                alice,
                ride.id,
                RidePatch {
                    start_time: Some(later),
                    ..RidePatch::default()
                },
                scope,
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].start_time, later);
    }
}

#[tokio::test]
async fn strangers_cannot_edit_rides() {
    let h = harness().await;
    let alice = user(&h.svc, "alice@example.com").await;
    let mallory = user(&h.svc, "mallory@example.com").await;
    let ride = single_ride(&h.svc, alice, None).await;

    let err = h
        .svc
        .rides
        .delete_ride(mallory, ride.id, SeriesScope::Single)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }), "got {err:?}");
}

#[tokio::test]
async fn rsvp_upserts_and_counts() {
    let h = harness().await;
    let alice = user(&h.svc, "alice@example.com").await;
    let bob = user(&h.svc, "bob@example.com").await;
    let ride = single_ride(&h.svc, alice, None).await;

    h.svc.rides.set_rsvp(alice, ride.id, "going").await.unwrap();
    h.svc.rides.set_rsvp(bob, ride.id, "maybe").await.unwrap();
    let changed = h.svc.rides.set_rsvp(bob, ride.id, "GOING").await.unwrap();
    assert_eq!(changed.status, RsvpStatus::Going);

    let details = h.svc.rides.get_ride(Some(bob), ride.id).await.unwrap();
    assert_eq!(details.rsvp_counts.going, 2);
    assert_eq!(details.rsvp_counts.maybe, 0);
    assert_eq!(details.my_rsvp, Some(RsvpStatus::Going));
    assert_eq!(h.svc.rides.list_rsvps(ride.id).await.unwrap().len(), 2);

    h.svc.rides.remove_rsvp(bob, ride.id).await.unwrap();
    let err = h.svc.rides.remove_rsvp(bob, ride.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn cancelled_rides_refuse_rsvps_and_leave_listings() {
    let h = harness().await;
    let alice = user(&h.svc, "alice@example.com").await;
    let ride = single_ride(&h.svc, alice, None).await;

    h.svc
        .rides
        .update_ride(
            alice,
            ride.id,
            RidePatch {
                cancelled: Some(true),
                ..RidePatch::default()
            },
            SeriesScope::Single,
        )
        .await
        .unwrap();

    let err = h
        .svc
        .rides
        .set_rsvp(alice, ride.id, "going")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }), "got {err:?}");

    let listed = h
        .svc
        .rides
        .list_rides(RideFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert!(listed.items.is_empty());

    let with_cancelled = h
        .svc
        .rides
        .list_rides(
            RideFilter {
                include_cancelled: true,
                ..RideFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(with_cancelled.total, 1);
}

#[tokio::test]
async fn comments_belong_to_their_author() {
    let h = harness().await;
    let alice = user(&h.svc, "alice@example.com").await;
    let bob = user(&h.svc, "bob@example.com").await;
    let ride = single_ride(&h.svc, alice, None).await;

    let comment = h
        .svc
        .comments
        .add_comment(bob, ride.id, "  See you there  ")
        .await
        .unwrap();
    assert_eq!(comment.body, "See you there");

    let err = h
        .svc
        .comments
        .edit_comment(alice, comment.id, "hijacked")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }), "got {err:?}");

    let edited = h
        .svc
        .comments
        .edit_comment(bob, comment.id, "Running late")
        .await
        .unwrap();
    assert_eq!(edited.body, "Running late");

    let err = h
        .svc
        .comments
        .add_comment(bob, ride.id, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }), "got {err:?}");

    // Creating a personal ride grants no say over other people's comments.
    let err = h
        .svc
        .comments
        .delete_comment(alice, comment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }), "got {err:?}");

    h.svc.comments.delete_comment(bob, comment.id).await.unwrap();
    assert!(h.svc.comments.list_comments(ride.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn chapter_admins_moderate_comments() {
    let h = harness().await;
    let alice = user(&h.svc, "alice@example.com").await;
    let bob = user(&h.svc, "bob@example.com").await;
    let carol = user(&h.svc, "carol@example.com").await;
    let ch = chapter(&h.svc, alice, "Oakland").await;
    let ride = single_ride(&h.svc, alice, Some(ch.id)).await;

    let comment = h
        .svc
        .comments
        .add_comment(bob, ride.id, "Flat tyre, start without me")
        .await
        .unwrap();

    let err = h
        .svc
        .comments
        .delete_comment(carol, comment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }), "got {err:?}");

    h.svc
        .comments
        .delete_comment(alice, comment.id)
        .await
        .unwrap();
    assert!(h.svc.comments.list_comments(ride.id).await.unwrap().is_empty());
}
