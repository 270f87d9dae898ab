use sea_orm::{DatabaseConnection, SqlErr, TransactionError, TransactionTrait};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::authorization::{GigRole, resolve_role};
use crate::db::bids as bid_db;
use crate::db::gigs as gig_db;
use crate::error::AppError;
use crate::models::bids::{self, BidStatus, CreateBid};
use crate::models::gigs::{self, GigStatus};
use crate::models::users;
use crate::notify::protocol::ServerEvent;
use crate::notify::server::NotifyServer;

/// Place a bid on an open gig.
///
/// Preconditions in order, first failure wins: gig exists, gig is open,
/// bidder is not the owner, no prior bid by this bidder, fields are valid.
/// The existence check alone is not race-free; the unique (gig_id,
/// bidder_id) index is what guarantees at most one of two concurrent
/// inserts succeeds, and its violation surfaces as the same conflict.
pub async fn create_bid(
    db: &DatabaseConnection,
    gig_id: Uuid,
    bidder_id: Uuid,
    input: CreateBid,
) -> Result<(bids::Model, gigs::Model), AppError> {
    let gig = gig_db::get_gig_by_id(db, gig_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Gig {gig_id} not found")))?;

    if gig.status != GigStatus::Open {
        return Err(AppError::InvalidState(
            "Gig is no longer open for bidding".to_string(),
        ));
    }
    if resolve_role(bidder_id, &gig, None) == GigRole::Owner {
        return Err(AppError::Forbidden(
            "You cannot bid on your own gig".to_string(),
        ));
    }
    if bid_db::find_by_gig_and_bidder(db, gig_id, bidder_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "You have already bid on this gig".to_string(),
        ));
    }
    if input.message.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Message cannot be empty".to_string(),
        ));
    }
    if !input.price.is_finite() || input.price < 0.0 {
        return Err(AppError::InvalidInput(
            "Price must be a non-negative number".to_string(),
        ));
    }

    let bid = bid_db::insert_bid(db, gig_id, bidder_id, input.message, input.price)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("You have already bid on this gig".to_string())
            }
            _ => AppError::from(e),
        })?;

    Ok((bid, gig))
}

/// Hire one bid: assign the gig, mark the bid hired, reject every other
/// pending bid on the gig — all in one transaction — then notify the
/// hired bidder outside of it.
///
/// Two concurrent hires on the same gig are decided by the status-guarded
/// gig update: the loser matches zero rows and aborts with `InvalidState`,
/// leaving its records untouched.
pub async fn hire_bid(
    db: &DatabaseConnection,
    notify: &Arc<NotifyServer>,
    bid_id: Uuid,
    actor: Uuid,
) -> Result<(gigs::Model, bids::Model), AppError> {
    let (gig, bid) = db
        .transaction::<_, (gigs::Model, bids::Model), AppError>(move |txn| {
            Box::pin(async move {
                let bid = bid_db::get_bid_by_id(txn, bid_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Bid {bid_id} not found")))?;

                let gig = gig_db::get_gig_by_id(txn, bid.gig_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Gig {} not found", bid.gig_id)))?;

                // Role is re-resolved on the transactional snapshot; the
                // caller's earlier read may be stale.
                if resolve_role(actor, &gig, Some(&bid)) != GigRole::Owner {
                    return Err(AppError::Forbidden(
                        "Only the gig owner can hire for this gig".to_string(),
                    ));
                }
                if gig.status != GigStatus::Open {
                    return Err(AppError::InvalidState(
                        "Gig has already been assigned".to_string(),
                    ));
                }

                let claimed = gig_db::assign_gig_if_open(txn, gig.id, bid.bidder_id).await?;
                if claimed == 0 {
                    // A concurrent hire committed between our read and the
                    // guarded update.
                    return Err(AppError::InvalidState(
                        "Gig has already been assigned".to_string(),
                    ));
                }

                let hired = bid_db::mark_hired_if_pending(txn, bid.id).await?;
                if hired == 0 {
                    // Cannot happen while the gig was still open; abort
                    // rather than hire a settled bid.
                    return Err(AppError::InvalidState(
                        "Bid is no longer pending".to_string(),
                    ));
                }

                let rejected = bid_db::reject_other_pending(txn, gig.id, bid.id).await?;
                tracing::debug!(gig_id = %gig.id, rejected, "rejected sibling bids");

                let gig = gigs::Model {
                    status: GigStatus::Assigned,
                    assignee_id: Some(bid.bidder_id),
                    ..gig
                };
                let bid = bids::Model {
                    status: BidStatus::Hired,
                    ..bid
                };
                Ok((gig, bid))
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => AppError::from(db_err),
            TransactionError::Transaction(app_err) => app_err,
        })?;

    tracing::info!(gig_id = %gig.id, bid_id = %bid.id, assignee = %bid.bidder_id, "gig assigned");

    // Fire-and-forget: the hire is committed whether or not this lands.
    let event = ServerEvent::Hired {
        message: format!("You have been hired for \"{}\"!", gig.title),
        gig_id: gig.id,
        gig_title: gig.title.clone(),
        bid_id: bid.id,
    };
    let notify = Arc::clone(notify);
    let bidder_id = bid.bidder_id;
    tokio::spawn(async move {
        notify.deliver(bidder_id, event).await;
    });

    Ok((gig, bid))
}

/// List a gig's bids joined with their bidders. Owner-only.
pub async fn bids_for_gig(
    db: &DatabaseConnection,
    gig_id: Uuid,
    actor: Uuid,
) -> Result<(gigs::Model, Vec<(bids::Model, Option<users::Model>)>), AppError> {
    let gig = gig_db::get_gig_by_id(db, gig_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Gig {gig_id} not found")))?;

    if resolve_role(actor, &gig, None) != GigRole::Owner {
        return Err(AppError::Forbidden(
            "Only the gig owner can view bids for this gig".to_string(),
        ));
    }

    let bids = bid_db::get_bids_by_gig_with_bidder(db, gig_id).await?;
    Ok((gig, bids))
}
