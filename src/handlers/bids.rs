use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::bids as bid_db;
use crate::db::users as user_db;
use crate::error::AppError;
use crate::lifecycle;
use crate::models::bids::{BidResponse, CreateBid};
use crate::notify::server::NotifyServer;

/// POST /api/gigs/{id}/bids — place a bid on an open gig.
pub async fn create_bid(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<CreateBid>,
) -> Result<HttpResponse, AppError> {
    let gig_id = path.into_inner();
    let (bid, gig) =
        lifecycle::create_bid(db.get_ref(), gig_id, user.0.id, body.into_inner()).await?;

    Ok(HttpResponse::Created().json(BidResponse::from_parts(bid, Some(user.0), Some(gig))))
}

/// GET /api/gigs/{id}/bids — list a gig's bids (owner only).
pub async fn get_bids_for_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let gig_id = path.into_inner();
    let (gig, rows) = lifecycle::bids_for_gig(db.get_ref(), gig_id, user.0.id).await?;

    let responses: Vec<BidResponse> = rows
        .into_iter()
        .map(|(bid, bidder)| BidResponse::from_parts(bid, bidder, Some(gig.clone())))
        .collect();

    Ok(HttpResponse::Ok().json(responses))
}

/// GET /api/bids/my — the authenticated user's bids with each bid's gig.
pub async fn get_my_bids(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let rows = bid_db::get_bids_by_bidder_with_gig(db.get_ref(), user.0.id).await?;

    let responses: Vec<BidResponse> = rows
        .into_iter()
        .map(|(bid, gig)| BidResponse::from_parts(bid, Some(user.0.clone()), gig))
        .collect();

    Ok(HttpResponse::Ok().json(responses))
}

/// POST /api/bids/{id}/hire — hire this bid (gig owner only).
///
/// On success the gig is assigned, every other pending bid on it is
/// rejected, and the hired bidder is notified over their live channel.
pub async fn hire_bid(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notify: web::Data<Arc<NotifyServer>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let bid_id = path.into_inner();
    let (gig, bid) = lifecycle::hire_bid(db.get_ref(), notify.get_ref(), bid_id, user.0.id).await?;

    let bidder = user_db::get_user_by_id(db.get_ref(), bid.bidder_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Bidder hired successfully",
        "data": BidResponse::from_parts(bid, bidder, Some(gig)),
    })))
}
