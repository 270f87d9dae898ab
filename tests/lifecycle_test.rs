///! Lifecycle engine tests against a mock database.
///!
///! These drive `create_bid` and `hire_bid` through `sea_orm::MockDatabase`,
///! covering the precondition ordering, the hire transaction, and the
///! race-loss path where the status-guarded gig update matches zero rows.
///!
///! Run with: `cargo test --test lifecycle_test`
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use bidboard_backend::error::AppError;
use bidboard_backend::lifecycle;
use bidboard_backend::models::bids::{self, BidStatus, CreateBid};
use bidboard_backend::models::gigs::{self, GigStatus, UpdateGig};
use bidboard_backend::notify::server::NotifyServer;

fn open_gig(owner_id: Uuid) -> gigs::Model {
    gigs::Model {
        id: Uuid::new_v4(),
        title: "Build a landing page".to_string(),
        description: "Single page, responsive".to_string(),
        budget: 500.0,
        status: GigStatus::Open,
        owner_id,
        assignee_id: None,
        created_at: chrono::Utc::now(),
    }
}

fn pending_bid(gig_id: Uuid, bidder_id: Uuid) -> bids::Model {
    bids::Model {
        id: Uuid::new_v4(),
        gig_id,
        bidder_id,
        message: "I can do this in a week".to_string(),
        price: 400.0,
        status: BidStatus::Pending,
        created_at: chrono::Utc::now(),
    }
}

fn bid_input(message: &str, price: f64) -> CreateBid {
    CreateBid {
        message: message.to_string(),
        price,
    }
}

// ── create_bid preconditions, first failure wins ──

#[tokio::test]
async fn create_bid_on_missing_gig_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<gigs::Model>::new()])
        .into_connection();

    let err = lifecycle::create_bid(&db, Uuid::new_v4(), Uuid::new_v4(), bid_input("hi", 10.0))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn create_bid_on_assigned_gig_is_invalid_state() {
    let owner = Uuid::new_v4();
    let assignee = Uuid::new_v4();
    let gig = gigs::Model {
        status: GigStatus::Assigned,
        assignee_id: Some(assignee),
        ..open_gig(owner)
    };
    let gig_id = gig.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![gig]])
        .into_connection();

    let err = lifecycle::create_bid(&db, gig_id, Uuid::new_v4(), bid_input("hi", 10.0))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn bidding_on_own_gig_is_forbidden_regardless_of_fields() {
    let owner = Uuid::new_v4();
    let gig = open_gig(owner);
    let gig_id = gig.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![gig]])
        .into_connection();

    // Even a malformed bid fails on the ownership check first.
    let err = lifecycle::create_bid(&db, gig_id, owner, bid_input("", -5.0))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn second_bid_by_same_bidder_is_a_conflict() {
    let owner = Uuid::new_v4();
    let bidder = Uuid::new_v4();
    let gig = open_gig(owner);
    let gig_id = gig.id;
    let existing = pending_bid(gig_id, bidder);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![gig]])
        .append_query_results([vec![existing]])
        .into_connection();

    let err = lifecycle::create_bid(&db, gig_id, bidder, bid_input("again", 300.0))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn empty_message_is_invalid_input() {
    let gig = open_gig(Uuid::new_v4());
    let gig_id = gig.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![gig]])
        .append_query_results([Vec::<bids::Model>::new()])
        .into_connection();

    let err = lifecycle::create_bid(&db, gig_id, Uuid::new_v4(), bid_input("   ", 10.0))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn negative_price_is_invalid_input() {
    let gig = open_gig(Uuid::new_v4());
    let gig_id = gig.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![gig]])
        .append_query_results([Vec::<bids::Model>::new()])
        .into_connection();

    let err = lifecycle::create_bid(&db, gig_id, Uuid::new_v4(), bid_input("fair offer", -1.0))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn create_bid_stores_a_pending_bid() {
    let owner = Uuid::new_v4();
    let bidder = Uuid::new_v4();
    let gig = open_gig(owner);
    let gig_id = gig.id;
    let stored = pending_bid(gig_id, bidder);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![gig]])
        .append_query_results([Vec::<bids::Model>::new()])
        .append_query_results([vec![stored]])
        .into_connection();

    let (bid, gig) = lifecycle::create_bid(
        &db,
        gig_id,
        bidder,
        bid_input("I can do this in a week", 400.0),
    )
    .await
    .expect("bid should be created");

    assert_eq!(bid.status, BidStatus::Pending);
    assert_eq!(bid.gig_id, gig.id);
    assert_eq!(bid.bidder_id, bidder);
    assert_eq!(gig.status, GigStatus::Open);
}

// ── hire_bid ──

#[tokio::test]
async fn hire_missing_bid_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<bids::Model>::new()])
        .into_connection();
    let notify = Arc::new(NotifyServer::new());

    let err = lifecycle::hire_bid(&db, &notify, Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn only_the_gig_owner_can_hire() {
    let owner = Uuid::new_v4();
    let bidder = Uuid::new_v4();
    let gig = open_gig(owner);
    let bid = pending_bid(gig.id, bidder);
    let bid_id = bid.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![bid]])
        .append_query_results([vec![gig]])
        .into_connection();
    let notify = Arc::new(NotifyServer::new());

    // Neither the bidder nor a stranger may hire.
    let err = lifecycle::hire_bid(&db, &notify, bid_id, bidder)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn hire_on_assigned_gig_is_invalid_state() {
    let owner = Uuid::new_v4();
    let winner = Uuid::new_v4();
    let loser = Uuid::new_v4();
    let gig = gigs::Model {
        status: GigStatus::Assigned,
        assignee_id: Some(winner),
        ..open_gig(owner)
    };
    let losing_bid = bids::Model {
        status: BidStatus::Rejected,
        ..pending_bid(gig.id, loser)
    };
    let bid_id = losing_bid.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![losing_bid]])
        .append_query_results([vec![gig]])
        .into_connection();
    let notify = Arc::new(NotifyServer::new());

    let err = lifecycle::hire_bid(&db, &notify, bid_id, owner)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn successful_hire_assigns_gig_and_notifies_the_bidder() {
    let owner = Uuid::new_v4();
    let bidder = Uuid::new_v4();
    let gig = open_gig(owner);
    let bid = pending_bid(gig.id, bidder);
    let bid_id = bid.id;
    let gig_id = gig.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![bid]])
        .append_query_results([vec![gig]])
        .append_exec_results([
            // conditional gig assignment claims the row
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            // winning bid moves to hired
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            // one sibling pending bid gets rejected
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();

    let notify = Arc::new(NotifyServer::new());
    let (_conn, mut rx) = notify.register(bidder).await;

    let (gig, bid) = lifecycle::hire_bid(&db, &notify, bid_id, owner)
        .await
        .expect("hire should succeed");

    assert_eq!(gig.status, GigStatus::Assigned);
    assert_eq!(gig.assignee_id, Some(bidder));
    assert_eq!(bid.status, BidStatus::Hired);

    // Delivery is spawned detached; give it a moment to land.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let event = rx.try_recv().expect("bidder should receive a hire event");
    let bidboard_backend::notify::protocol::ServerEvent::Hired {
        gig_id: event_gig,
        bid_id: event_bid,
        ..
    } = event;
    assert_eq!(event_gig, gig_id);
    assert_eq!(event_bid, bid_id);
}

#[tokio::test]
async fn losing_a_hire_race_fails_cleanly_without_notification() {
    let owner = Uuid::new_v4();
    let bidder = Uuid::new_v4();
    let gig = open_gig(owner);
    let bid = pending_bid(gig.id, bidder);
    let bid_id = bid.id;

    // The snapshot read still sees the gig open, but a concurrent hire
    // commits first: the guarded update matches zero rows.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![bid]])
        .append_query_results([vec![gig]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let notify = Arc::new(NotifyServer::new());
    let (_conn, mut rx) = notify.register(bidder).await;

    let err = lifecycle::hire_bid(&db, &notify, bid_id, owner)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidState(_)));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err(), "failed hire must not notify anyone");
}

// ── gig delete/update race with a concurrent hire ──

#[tokio::test]
async fn deleting_a_gig_that_just_got_assigned_is_invalid_state() {
    let owner = Uuid::new_v4();
    let gig = open_gig(owner);
    let gig_id = gig.id;

    // The snapshot read still sees the gig open, but a concurrent hire
    // commits first: the status-guarded delete matches zero rows.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![gig]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let err = lifecycle::delete_gig(&db, gig_id, owner).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn deleting_an_assigned_gig_is_refused_on_the_snapshot() {
    let owner = Uuid::new_v4();
    let gig = gigs::Model {
        status: GigStatus::Assigned,
        assignee_id: Some(Uuid::new_v4()),
        ..open_gig(owner)
    };
    let gig_id = gig.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![gig]])
        .into_connection();

    let err = lifecycle::delete_gig(&db, gig_id, owner).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn owner_can_delete_an_open_gig() {
    let owner = Uuid::new_v4();
    let gig = open_gig(owner);
    let gig_id = gig.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![gig]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    assert!(lifecycle::delete_gig(&db, gig_id, owner).await.is_ok());
}

#[tokio::test]
async fn editing_a_gig_that_just_got_assigned_is_invalid_state() {
    let owner = Uuid::new_v4();
    let gig = open_gig(owner);
    let gig_id = gig.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![gig]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let input = UpdateGig {
        title: Some("Fresh title".to_string()),
        description: None,
        budget: None,
    };
    let err = lifecycle::update_gig(&db, gig_id, owner, input)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn editing_an_open_gig_applies_the_fields() {
    let owner = Uuid::new_v4();
    let gig = open_gig(owner);
    let gig_id = gig.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![gig]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let input = UpdateGig {
        title: Some("Fresh title".to_string()),
        description: None,
        budget: Some(750.0),
    };
    let updated = lifecycle::update_gig(&db, gig_id, owner, input)
        .await
        .expect("edit should apply");

    assert_eq!(updated.title, "Fresh title");
    assert_eq!(updated.budget, 750.0);
    assert_eq!(updated.description, "Single page, responsive");
    assert_eq!(updated.status, GigStatus::Open);
}
