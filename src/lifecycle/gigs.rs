use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::authorization::{GigRole, resolve_role};
use crate::db::gigs as gig_db;
use crate::error::AppError;
use crate::models::gigs::{self, CreateGig, GigStatus, UpdateGig};

/// Create a new gig owned by `owner_id`. Starts `open`.
pub async fn create_gig(
    db: &DatabaseConnection,
    owner_id: Uuid,
    input: CreateGig,
) -> Result<gigs::Model, AppError> {
    validate_title(&input.title)?;
    validate_description(&input.description)?;
    validate_budget(input.budget)?;

    Ok(gig_db::insert_gig(db, input, owner_id).await?)
}

/// Edit title/description/budget. Owner-only, and only while the gig is
/// still `open`.
///
/// The write itself carries the open-status guard, so an edit racing a hire
/// cannot land on a gig that became `assigned` after the snapshot read.
pub async fn update_gig(
    db: &DatabaseConnection,
    gig_id: Uuid,
    actor: Uuid,
    input: UpdateGig,
) -> Result<gigs::Model, AppError> {
    let gig = gig_db::get_gig_by_id(db, gig_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Gig {gig_id} not found")))?;

    if resolve_role(actor, &gig, None) != GigRole::Owner {
        return Err(AppError::Forbidden(
            "Only the gig owner can update this gig".to_string(),
        ));
    }
    if gig.status != GigStatus::Open {
        return Err(AppError::InvalidState(
            "Gig has already been assigned".to_string(),
        ));
    }

    if let Some(title) = input.title.as_deref() {
        validate_title(title)?;
    }
    if let Some(description) = input.description.as_deref() {
        validate_description(description)?;
    }
    if let Some(budget) = input.budget {
        validate_budget(budget)?;
    }

    if input.title.is_none() && input.description.is_none() && input.budget.is_none() {
        return Ok(gig);
    }

    let rows = gig_db::update_gig_fields_if_open(
        db,
        gig_id,
        input.title.clone(),
        input.description.clone(),
        input.budget,
    )
    .await?;
    if rows == 0 {
        // A concurrent hire assigned the gig after our read.
        return Err(AppError::InvalidState(
            "Gig has already been assigned".to_string(),
        ));
    }

    Ok(gigs::Model {
        title: input.title.unwrap_or(gig.title),
        description: input.description.unwrap_or(gig.description),
        budget: input.budget.unwrap_or(gig.budget),
        ..gig
    })
}

/// Delete a gig. Owner-only, and only while the gig is still `open`; the
/// gig's bids are removed with it by the FK cascade.
///
/// The delete statement carries the same open-status guard as the hire
/// claim: if a concurrent hire assigns the gig after the snapshot read,
/// the delete matches zero rows instead of cascading away the hired bid.
pub async fn delete_gig(db: &DatabaseConnection, gig_id: Uuid, actor: Uuid) -> Result<(), AppError> {
    let gig = gig_db::get_gig_by_id(db, gig_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Gig {gig_id} not found")))?;

    if resolve_role(actor, &gig, None) != GigRole::Owner {
        return Err(AppError::Forbidden(
            "Only the gig owner can delete this gig".to_string(),
        ));
    }
    if gig.status != GigStatus::Open {
        return Err(AppError::InvalidState(
            "An assigned gig cannot be deleted".to_string(),
        ));
    }

    let rows = gig_db::delete_gig_if_open(db, gig_id).await?;
    if rows == 0 {
        return Err(AppError::InvalidState(
            "An assigned gig cannot be deleted".to_string(),
        ));
    }

    tracing::info!(%gig_id, "gig deleted");
    Ok(())
}

fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Description cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_budget(budget: f64) -> Result<(), AppError> {
    if !budget.is_finite() || budget < 0.0 {
        return Err(AppError::InvalidInput(
            "Budget must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}
