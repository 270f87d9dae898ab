use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::gigs as gig_db;
use crate::db::users as user_db;
use crate::error::AppError;
use crate::lifecycle;
use crate::models::gigs::{self, CreateGig, GigListQuery, GigResponse, UpdateGig};
use crate::models::users;

/// Fetch the assignee's display fields for a gig, if it has one.
async fn join_assignee(
    db: &DatabaseConnection,
    gig: &gigs::Model,
) -> Result<Option<users::Model>, AppError> {
    match gig.assignee_id {
        Some(assignee_id) => Ok(user_db::get_user_by_id(db, assignee_id).await?),
        None => Ok(None),
    }
}

/// Fetch the assignees of a whole listing in one query, keyed by user id.
async fn join_assignees(
    db: &DatabaseConnection,
    gigs: impl Iterator<Item = &gigs::Model>,
) -> Result<HashMap<Uuid, users::Model>, AppError> {
    let ids: Vec<Uuid> = gigs.filter_map(|g| g.assignee_id).collect();
    let users = user_db::get_users_by_ids(db, ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

/// GET /api/gigs?search=&status= — list gigs, newest first (requires authentication).
pub async fn get_gigs(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<GigListQuery>,
) -> Result<HttpResponse, AppError> {
    let rows = gig_db::list_gigs_with_owner(db.get_ref(), &query).await?;
    let assignees = join_assignees(db.get_ref(), rows.iter().map(|(g, _)| g)).await?;

    let responses: Vec<GigResponse> = rows
        .into_iter()
        .map(|(gig, owner)| {
            let assignee = gig.assignee_id.and_then(|id| assignees.get(&id).cloned());
            GigResponse::from_parts(gig, owner, assignee)
        })
        .collect();

    Ok(HttpResponse::Ok().json(responses))
}

/// GET /api/gigs/{id} — get a single gig (requires authentication).
pub async fn get_gig(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let gig = gig_db::get_gig_by_id(db.get_ref(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Gig {id} not found")))?;

    let owner = user_db::get_user_by_id(db.get_ref(), gig.owner_id).await?;
    let assignee = join_assignee(db.get_ref(), &gig).await?;

    Ok(HttpResponse::Ok().json(GigResponse::from_parts(gig, owner, assignee)))
}

/// POST /api/gigs — post a new gig (requires authentication).
pub async fn create_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateGig>,
) -> Result<HttpResponse, AppError> {
    let gig = lifecycle::create_gig(db.get_ref(), user.0.id, body.into_inner()).await?;

    Ok(HttpResponse::Created().json(GigResponse::from_parts(gig, Some(user.0), None)))
}

/// PUT /api/gigs/{id} — edit an open gig (owner only).
pub async fn update_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateGig>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let gig = lifecycle::update_gig(db.get_ref(), id, user.0.id, body.into_inner()).await?;

    // Only an open gig can be edited, so there is no assignee to join.
    Ok(HttpResponse::Ok().json(GigResponse::from_parts(gig, Some(user.0), None)))
}

/// DELETE /api/gigs/{id} — delete an open gig (owner only).
pub async fn delete_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    lifecycle::delete_gig(db.get_ref(), id, user.0.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Gig {id} deleted"),
    })))
}

/// GET /api/gigs/my/posted — gigs posted by the authenticated user.
pub async fn get_my_gigs(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let gigs = gig_db::get_gigs_by_owner(db.get_ref(), user.0.id).await?;
    let assignees = join_assignees(db.get_ref(), gigs.iter()).await?;

    let responses: Vec<GigResponse> = gigs
        .into_iter()
        .map(|gig| {
            let assignee = gig.assignee_id.and_then(|id| assignees.get(&id).cloned());
            GigResponse::from_parts(gig, Some(user.0.clone()), assignee)
        })
        .collect();

    Ok(HttpResponse::Ok().json(responses))
}
