use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::bids::{self, BidStatus};
use crate::models::{gigs, users};

/// Insert a new bid with status `pending`.
///
/// The unique (gig_id, bidder_id) index is what actually enforces the
/// one-bid-per-bidder invariant: of two concurrent inserts for the same key,
/// the database rejects the second. Callers detect that via
/// `DbErr::sql_err()` and surface it as a duplicate-bid conflict.
pub async fn insert_bid(
    db: &DatabaseConnection,
    gig_id: Uuid,
    bidder_id: Uuid,
    message: String,
    price: f64,
) -> Result<bids::Model, DbErr> {
    let new_bid = bids::ActiveModel {
        id: Set(Uuid::new_v4()),
        gig_id: Set(gig_id),
        bidder_id: Set(bidder_id),
        message: Set(message),
        price: Set(price),
        status: Set(BidStatus::Pending),
        created_at: Set(chrono::Utc::now()),
    };

    new_bid.insert(db).await
}

/// Fetch a single bid by ID. Generic over the connection so the lifecycle
/// engine can read through a transaction handle.
pub async fn get_bid_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<bids::Model>, DbErr> {
    bids::Entity::find_by_id(id).one(conn).await
}

/// Fetch the bid one bidder placed on one gig, if any.
pub async fn find_by_gig_and_bidder(
    db: &DatabaseConnection,
    gig_id: Uuid,
    bidder_id: Uuid,
) -> Result<Option<bids::Model>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::GigId.eq(gig_id))
        .filter(bids::Column::BidderId.eq(bidder_id))
        .one(db)
        .await
}

/// Fetch all bids on a gig joined with their bidder, newest first.
pub async fn get_bids_by_gig_with_bidder(
    db: &DatabaseConnection,
    gig_id: Uuid,
) -> Result<Vec<(bids::Model, Option<users::Model>)>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::GigId.eq(gig_id))
        .find_also_related(users::Entity)
        .order_by_desc(bids::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch all bids placed by one bidder joined with each bid's gig,
/// newest first.
pub async fn get_bids_by_bidder_with_gig(
    db: &DatabaseConnection,
    bidder_id: Uuid,
) -> Result<Vec<(bids::Model, Option<gigs::Model>)>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::BidderId.eq(bidder_id))
        .find_also_related(gigs::Entity)
        .order_by_desc(bids::Column::CreatedAt)
        .all(db)
        .await
}

/// Move one pending bid to `hired`. The status guard makes this a no-op if
/// the bid already reached a terminal state.
pub async fn mark_hired_if_pending<C: ConnectionTrait>(
    conn: &C,
    bid_id: Uuid,
) -> Result<u64, DbErr> {
    let result = bids::Entity::update_many()
        .col_expr(bids::Column::Status, Expr::value(BidStatus::Hired))
        .filter(bids::Column::Id.eq(bid_id))
        .filter(bids::Column::Status.eq(BidStatus::Pending))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

/// Reject every still-pending bid on a gig except the winner. Bids that
/// already reached a terminal state are left untouched.
pub async fn reject_other_pending<C: ConnectionTrait>(
    conn: &C,
    gig_id: Uuid,
    winning_bid_id: Uuid,
) -> Result<u64, DbErr> {
    let result = bids::Entity::update_many()
        .col_expr(bids::Column::Status, Expr::value(BidStatus::Rejected))
        .filter(bids::Column::GigId.eq(gig_id))
        .filter(bids::Column::Id.ne(winning_bid_id))
        .filter(bids::Column::Status.eq(BidStatus::Pending))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}
